//! Capture sessions and their serialized configuration queue.

mod capture_session;
mod mock;
mod queue;

pub use capture_session::{CaptureSession, OutputKind, SessionError, SessionId};
pub use mock::MockCaptureSession;
pub use queue::SessionQueue;
