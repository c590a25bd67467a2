use serde::{Deserialize, Serialize};

pub use crate::model::ReminderSettingsUpdate as UpdateReminderSettingsRequest;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendReminderResponse {
    pub sent: bool,
    pub message: String,
}
