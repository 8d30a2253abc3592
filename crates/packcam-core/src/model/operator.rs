use serde::{Deserialize, Serialize};

/// Logged-in operator as supplied by session management.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operator {
    /// Display name drawn on every frame.
    pub username: String,
    /// Trial accounts get a watermark and the trial upload token.
    pub is_trial: bool,
}

impl Operator {
    /// Create an operator record.
    pub fn new(username: impl Into<String>, is_trial: bool) -> Self {
        Self {
            username: username.into(),
            is_trial,
        }
    }
}
