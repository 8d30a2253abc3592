use crate::{Action, Operator};

/// Messages accepted by [`CaptureController::run`](crate::CaptureController::run).
#[derive(Debug, Clone)]
pub enum ControllerCommand {
    /// New action pushed by the station.
    Action(Action),
    /// Operator identity changed.
    SetOperator(Operator),
    /// Operator toggled "save to local".
    SetSaveToLocal(bool),
    /// Finish any recording, wait for uploads and release the camera.
    Shutdown,
}
