use serde::{Deserialize, Serialize};

/// What the station wants the recorder to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Begin a recording session.
    Start,
    /// Finish the session gracefully and upload it.
    Stop,
    /// Cancel the session. Finalizes exactly like `Stop`.
    #[default]
    Idle,
}

/// External instruction driving the capture state machine.
///
/// Pushed as a whole by the station; the controller reacts to changes of
/// `device_id` and `kind` relative to the previous action it saw.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    /// Selected camera device.
    pub device_id: String,
    /// Requested transition.
    #[serde(rename = "action")]
    pub kind: ActionKind,
    /// Barcode of the parcel being packed.
    pub tracking_code: String,
}

impl Action {
    /// Build an action for `device_id`.
    pub fn new(
        device_id: impl Into<String>,
        kind: ActionKind,
        tracking_code: impl Into<String>,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            kind,
            tracking_code: tracking_code.into(),
        }
    }

    /// Same action with a different kind.
    pub fn with_kind(&self, kind: ActionKind) -> Self {
        Self {
            kind,
            ..self.clone()
        }
    }
}
