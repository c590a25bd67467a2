use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::log::parse_required_date;
use crate::{api::error::ValidationError, stats::DEFAULT_LOOKBACK_DAYS};

/// About ten years, enough for any history this app will hold
pub const MAX_LOOKBACK_DAYS: u32 = 3660;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsQuery {
    pub days: Option<String>,
    /// The client's local calendar date
    pub today: Option<String>,
}

impl StatsQuery {
    pub fn days(&self) -> Result<u32, ValidationError> {
        let Some(days) = self.days.as_deref() else {
            return Ok(DEFAULT_LOOKBACK_DAYS);
        };
        match days.trim().parse::<u32>() {
            Ok(days) if days <= MAX_LOOKBACK_DAYS => Ok(days),
            _ => Err(ValidationError::new(format!(
                "days must be a whole number from 0 to {MAX_LOOKBACK_DAYS}, got {days:?}"
            ))),
        }
    }

    pub fn today(&self) -> Result<NaiveDate, ValidationError> {
        parse_required_date("today", self.today.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_defaults_to_thirty() {
        let query = StatsQuery { today: Some("2024-03-05".to_owned()), ..Default::default() };
        assert_eq!(query.days().unwrap(), 30);
    }

    #[test]
    fn rejects_bad_days() {
        for days in ["-1", "abc", "99999"] {
            let query = StatsQuery { days: Some(days.to_owned()), today: None };
            assert!(query.days().is_err(), "{days}");
        }
    }

    #[test]
    fn today_is_required() {
        assert!(StatsQuery::default().today().is_err());
    }
}
