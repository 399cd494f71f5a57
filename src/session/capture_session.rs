//! Capture session abstraction.

use crate::attributes::Resolution;
use crate::device::{CaptureDeviceInput, InputDescriptor};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while changing session topology.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("input rejected by session: {0}")]
    InputRejected(String),
    #[error("output rejected by session: {0}")]
    OutputRejected(String),
    #[error("no input available: {0}")]
    MissingInput(String),
}

/// Outputs a session can feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Photo,
    Video,
    /// Raw frame stream consumed by the preview renderer.
    FrameStream,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Photo => write!(f, "photo"),
            Self::Video => write!(f, "video"),
            Self::FrameStream => write!(f, "frame-stream"),
        }
    }
}

/// Process-unique identity of a session instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    /// Allocates the next identifier.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// A capture pipeline binding inputs to outputs.
///
/// Topology changes (`add_*`, `remove_*`, `start_running`) must only be
/// made from the session configuration queue. A stopped session is never
/// restarted: [`CaptureSession::renewed`] hands back a fresh instance.
pub trait CaptureSession: Send {
    fn id(&self) -> SessionId;
    fn is_running(&self) -> bool;

    /// Attached inputs, in attachment order.
    fn inputs(&self) -> Vec<InputDescriptor>;

    /// Attached outputs, in attachment order.
    fn outputs(&self) -> Vec<OutputKind>;

    fn add_input(&mut self, input: Arc<dyn CaptureDeviceInput>) -> Result<(), SessionError>;

    /// Detaches the input with the same kind and position, if attached.
    fn remove_input(&mut self, input: &dyn CaptureDeviceInput);

    fn add_output(&mut self, output: OutputKind) -> Result<(), SessionError>;
    fn remove_output(&mut self, output: OutputKind);

    fn resolution(&self) -> Resolution;
    fn set_resolution(&mut self, resolution: Resolution);

    fn start_running(&mut self);
    fn stop_running(&mut self);

    /// Stops this session and returns an empty, unstarted replacement.
    fn renewed(&mut self) -> Box<dyn CaptureSession>;

    /// True if nothing is attached and the session is not running.
    fn is_pristine(&self) -> bool {
        !self.is_running() && self.inputs().is_empty() && self.outputs().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ids_are_unique() {
        let a = SessionId::next();
        let b = SessionId::next();
        assert_ne!(a, b);
        assert!(b > a);
    }
}
