/// Observable state of the capture controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// No camera stream.
    Idle,
    /// Camera stream live, not recording.
    Previewing,
    /// Recording session active.
    Recording,
}
