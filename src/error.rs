//! Error taxonomy surfaced by the session manager.

use crate::device::DeviceError;
use crate::session::SessionError;
use thiserror::Error;

/// Errors returned by [`CameraManager`](crate::CameraManager) operations.
///
/// Guard conditions (busy, unchanged value, missing capability) are not
/// errors; those calls return `Ok(())` without touching anything.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    #[error("camera or microphone access was denied")]
    PermissionDenied,
    #[error("cannot set up capture input: {0}")]
    CannotSetupInput(String),
    #[error("cannot set up capture output: {0}")]
    CannotSetupOutput(String),
    #[error("device configuration unavailable: {0}")]
    DeviceConfigurationUnavailable(String),
    #[error("session configuration queue is no longer running")]
    QueueClosed,
    #[error("session startup task failed: {0}")]
    StartupFailed(String),
}

impl CameraError {
    /// Returns true for the kinds a setup attachment failure may carry as-is.
    pub fn is_setup_kind(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied | Self::CannotSetupInput(_) | Self::CannotSetupOutput(_)
        )
    }

    /// Normalizes an attachment failure into a setup error kind.
    ///
    /// Errors that already carry a setup kind pass through unchanged,
    /// everything else becomes [`CameraError::CannotSetupInput`].
    pub fn into_setup_error(self) -> Self {
        if self.is_setup_kind() {
            self
        } else {
            Self::CannotSetupInput(self.to_string())
        }
    }
}

impl From<DeviceError> for CameraError {
    fn from(err: DeviceError) -> Self {
        Self::DeviceConfigurationUnavailable(err.to_string())
    }
}

impl From<SessionError> for CameraError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::OutputRejected(_) => Self::CannotSetupOutput(err.to_string()),
            SessionError::InputRejected(_) | SessionError::MissingInput(_) => {
                Self::CannotSetupInput(err.to_string())
            }
        }
    }
}
