//! Account and address routes.

use serde::{Deserialize, Serialize};

pub(crate) mod account;
pub(crate) mod addresses;

/// Plain confirmation response
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
