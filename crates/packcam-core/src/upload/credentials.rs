use crate::Operator;

use std::fmt;

/// The two pre-provisioned upload tokens.
#[derive(Clone)]
pub struct UploadCredentials {
    standard: String,
    trial: String,
}

impl UploadCredentials {
    /// Pair a full-account token with a trial-account token.
    pub fn new(standard: impl Into<String>, trial: impl Into<String>) -> Self {
        Self {
            standard: standard.into(),
            trial: trial.into(),
        }
    }

    /// Token matching the operator's tier.
    pub fn token_for(&self, operator: &Operator) -> &str {
        if operator.is_trial {
            &self.trial
        } else {
            &self.standard
        }
    }
}

// Tokens never reach the logs.
impl fmt::Debug for UploadCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadCredentials")
            .field("standard", &"<redacted>")
            .field("trial", &"<redacted>")
            .finish()
    }
}
