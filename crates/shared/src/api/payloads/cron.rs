use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CronSkipReason {
    /// Reminders are off or there's no address
    NotConfigured,
    /// Outside the send window
    NotTime,
    /// Nothing is due today
    NoExercises,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CronResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<CronSkipReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent: Option<bool>,
}

impl CronResponse {
    pub fn skipped(reason: CronSkipReason) -> Self {
        Self { success: true, skipped: Some(reason), sent: None }
    }

    pub fn sent() -> Self {
        Self { success: true, skipped: None, sent: Some(true) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CronStatus {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_reasons_are_snake_case() {
        let json = serde_json::to_value(CronResponse::skipped(CronSkipReason::NotTime)).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "skipped": "not_time" }));

        let json = serde_json::to_value(CronResponse::sent()).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "sent": true }));
    }
}
