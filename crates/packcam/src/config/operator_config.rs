use crate::config::default_user_id;

use packcam_core::Operator;
use serde::{Deserialize, Serialize};

/// The signed-in packer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorConfig {
    #[serde(default)]
    pub username: String,
    /// Trial accounts get the watermark and the trial upload token.
    #[serde(default)]
    pub is_trial: bool,
    /// Organization the transaction logs belong to.
    #[serde(default)]
    pub organization_id: u64,
    /// Backend user recorded on each transaction log.
    #[serde(default = "default_user_id")]
    pub user_id: u64,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            is_trial: false,
            organization_id: 0,
            user_id: default_user_id(),
        }
    }
}

impl OperatorConfig {
    pub fn operator(&self) -> Operator {
        Operator::new(self.username.clone(), self.is_trial)
    }
}
