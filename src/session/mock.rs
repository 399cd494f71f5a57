//! In-memory capture session.

use super::{CaptureSession, OutputKind, SessionError, SessionId};
use crate::attributes::{CameraPosition, Resolution};
use crate::device::{CaptureDeviceInput, InputDescriptor, MediaKind};
use std::sync::Arc;

/// Mock session that enforces the same attachment rules as a real one:
/// one input per kind and position, one output per kind.
pub struct MockCaptureSession {
    id: SessionId,
    running: bool,
    inputs: Vec<Arc<dyn CaptureDeviceInput>>,
    outputs: Vec<OutputKind>,
    resolution: Resolution,
    rejected_inputs: Vec<InputDescriptor>,
    rejected_outputs: Vec<OutputKind>,
}

impl MockCaptureSession {
    /// Creates an empty, stopped session.
    pub fn new() -> Self {
        Self {
            id: SessionId::next(),
            running: false,
            inputs: Vec::new(),
            outputs: Vec::new(),
            resolution: Resolution::default(),
            rejected_inputs: Vec::new(),
            rejected_outputs: Vec::new(),
        }
    }

    /// Refuses to attach the camera at `position`.
    pub fn rejecting_camera(mut self, position: CameraPosition) -> Self {
        self.rejected_inputs.push(InputDescriptor {
            kind: MediaKind::Video,
            position: Some(position),
        });
        self
    }

    /// Refuses to attach the given output.
    pub fn rejecting_output(mut self, output: OutputKind) -> Self {
        self.rejected_outputs.push(output);
        self
    }
}

impl Default for MockCaptureSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSession for MockCaptureSession {
    fn id(&self) -> SessionId {
        self.id
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn inputs(&self) -> Vec<InputDescriptor> {
        self.inputs.iter().map(|i| InputDescriptor::of(i.as_ref())).collect()
    }

    fn outputs(&self) -> Vec<OutputKind> {
        self.outputs.clone()
    }

    fn add_input(&mut self, input: Arc<dyn CaptureDeviceInput>) -> Result<(), SessionError> {
        let descriptor = InputDescriptor::of(input.as_ref());
        if self.rejected_inputs.contains(&descriptor) || self.inputs().contains(&descriptor) {
            return Err(SessionError::InputRejected(format!(
                "cannot add {} input ({:?})",
                descriptor.kind, descriptor.position
            )));
        }
        self.inputs.push(input);
        Ok(())
    }

    fn remove_input(&mut self, input: &dyn CaptureDeviceInput) {
        let descriptor = InputDescriptor::of(input);
        self.inputs
            .retain(|attached| InputDescriptor::of(attached.as_ref()) != descriptor);
    }

    fn add_output(&mut self, output: OutputKind) -> Result<(), SessionError> {
        if self.rejected_outputs.contains(&output) || self.outputs.contains(&output) {
            return Err(SessionError::OutputRejected(format!("cannot add {output} output")));
        }
        self.outputs.push(output);
        Ok(())
    }

    fn remove_output(&mut self, output: OutputKind) {
        self.outputs.retain(|attached| *attached != output);
    }

    fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn set_resolution(&mut self, resolution: Resolution) {
        self.resolution = resolution;
    }

    fn start_running(&mut self) {
        self.running = true;
    }

    fn stop_running(&mut self) {
        self.running = false;
    }

    fn renewed(&mut self) -> Box<dyn CaptureSession> {
        self.stop_running();
        Box::new(Self {
            rejected_inputs: self.rejected_inputs.clone(),
            rejected_outputs: self.rejected_outputs.clone(),
            ..Self::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceInput, MockCaptureDevice};

    fn back_input() -> Arc<dyn CaptureDeviceInput> {
        Arc::new(DeviceInput::camera(Arc::new(MockCaptureDevice::back())))
    }

    #[test]
    fn test_duplicate_input_rejected() {
        let mut session = MockCaptureSession::new();
        session.add_input(back_input()).unwrap();
        assert!(matches!(
            session.add_input(back_input()),
            Err(SessionError::InputRejected(_))
        ));
    }

    #[test]
    fn test_remove_input_by_descriptor() {
        let mut session = MockCaptureSession::new();
        session.add_input(back_input()).unwrap();
        session.remove_input(back_input().as_ref());
        assert!(session.inputs().is_empty());
    }

    #[test]
    fn test_renewed_session_is_fresh() {
        let mut session = MockCaptureSession::new().rejecting_output(OutputKind::Video);
        session.add_input(back_input()).unwrap();
        session.add_output(OutputKind::Photo).unwrap();
        session.start_running();

        let renewed = session.renewed();
        assert!(!session.is_running());
        assert_ne!(renewed.id(), session.id());
        assert!(renewed.is_pristine());

        let mut renewed = renewed;
        assert!(renewed.add_output(OutputKind::Video).is_err());
    }
}
