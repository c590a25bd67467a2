use serde::{Deserialize, Serialize};

mod auth;
pub use auth::*;
mod count;
pub use count::*;
mod cron;
pub use cron::*;
mod exercise;
pub use exercise::*;
mod log;
pub use log::*;
mod reminder;
pub use reminder::*;
mod stats;
pub use stats::*;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub const OK: SuccessResponse = SuccessResponse { success: true };
}
