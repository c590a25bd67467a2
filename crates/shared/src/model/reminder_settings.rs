use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;
#[cfg(feature = "backend")]
use {
    crate::api::error::ServerError,
    exemplar::Model,
    rusqlite::{Connection, OptionalExtension},
    sea_query::{enum_def, Expr, OnConflict, Query, SqliteQueryBuilder},
    sea_query_rusqlite::RusqliteBinder,
};

use super::{ValidateModel, Validator};
use crate::api::error::ValidationError;

pub const DEFAULT_SETTINGS_KEY: &str = "default";
pub const DEFAULT_REMINDER_TIME: &str = "08:30";
pub const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";
pub const REMINDER_TIME_FORMAT: &str = "%H:%M";

/// How far either side of the configured time a reminder may still go out
pub const SEND_WINDOW_MINUTES: i64 = 5;
const MINUTES_PER_DAY: i64 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReminderSettingsError {
    #[error("Unknown timezone {0:?}")]
    InvalidTimezone(String),
    #[error("Reminder time {0:?} isn't HH:MM")]
    InvalidTime(String),
}

/// Stored settings are validated on the way in, so this only happens if the
/// row was edited by hand
impl<T> From<ReminderSettingsError> for crate::api::error::ServerError<T> {
    fn from(err: ReminderSettingsError) -> Self {
        crate::other_error!("Stored reminder settings are invalid: {err}")
    }
}

/// Who gets the daily reminder and when. Stored under
/// [`DEFAULT_SETTINGS_KEY`], the row is created at start up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "backend", derive(Model))]
#[cfg_attr(feature = "backend", table("reminder_settings"))]
#[cfg_attr(feature = "backend", check("../../../server/migrations/03-reminder_settings/up.sql"))]
#[cfg_attr(feature = "backend", enum_def)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSettings {
    pub key: String,
    /// Empty until the user sets one
    pub email: String,
    /// Local send time, `HH:MM`
    pub time: String,
    pub enabled: bool,
    /// IANA timezone name
    pub timezone: String,
    pub last_updated_date: DateTime<Utc>,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            key: DEFAULT_SETTINGS_KEY.to_owned(),
            email: String::new(),
            time: DEFAULT_REMINDER_TIME.to_owned(),
            enabled: false,
            timezone: DEFAULT_TIMEZONE.to_owned(),
            last_updated_date: Utc::now(),
        }
    }
}

/// Partial update, absent fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSettingsUpdate {
    pub email: Option<String>,
    pub time: Option<String>,
    pub enabled: Option<bool>,
    pub timezone: Option<String>,
}

fn parse_time(time: &str) -> Result<NaiveTime, ReminderSettingsError> {
    NaiveTime::parse_from_str(time.trim(), REMINDER_TIME_FORMAT)
        .map_err(|_| ReminderSettingsError::InvalidTime(time.to_owned()))
}

fn parse_timezone(timezone: &str) -> Result<Tz, ReminderSettingsError> {
    timezone
        .trim()
        .parse::<Tz>()
        .map_err(|_| ReminderSettingsError::InvalidTimezone(timezone.to_owned()))
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((user, domain)) => !user.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

impl ValidateModel for ReminderSettingsUpdate {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Validator::default();
        if let Some(email) = &self.email {
            let email = email.trim();
            v.check(email.is_empty() || looks_like_email(email), "email is not a valid address");
        }
        if let Some(time) = &self.time {
            v.check(parse_time(time).is_ok(), "time must be HH:MM");
        }
        if let Some(timezone) = &self.timezone {
            v.check(parse_timezone(timezone).is_ok(), "timezone must be an IANA timezone name");
        }
        v.finish()
    }
}

impl ReminderSettings {
    /// Applies a validated partial update. Returns true if anything changed
    pub fn apply(&mut self, update: ReminderSettingsUpdate) -> Result<bool, ValidationError> {
        update.validate()?;

        let before = self.clone();
        if let Some(email) = update.email {
            self.email = email.trim().to_owned();
        }
        if let Some(time) = update.time {
            self.time = time.trim().to_owned();
        }
        if let Some(enabled) = update.enabled {
            self.enabled = enabled;
        }
        if let Some(timezone) = update.timezone {
            self.timezone = timezone.trim().to_owned();
        }

        let dirty = *self != before;
        if dirty {
            self.last_updated_date = Utc::now();
        }
        Ok(dirty)
    }

    /// Reminders only go out when switched on and there's somewhere to send
    /// them
    pub fn is_configured(&self) -> bool {
        self.enabled && !self.email.is_empty()
    }

    pub fn tz(&self) -> Result<Tz, ReminderSettingsError> {
        parse_timezone(&self.timezone)
    }

    pub fn send_time(&self) -> Result<NaiveTime, ReminderSettingsError> {
        parse_time(&self.time)
    }

    /// The calendar date in the reminder's timezone at `now`
    pub fn local_today(&self, now: DateTime<Utc>) -> Result<NaiveDate, ReminderSettingsError> {
        Ok(now.with_timezone(&self.tz()?).date_naive())
    }

    /// Whether `now` falls within [`SEND_WINDOW_MINUTES`] of the configured
    /// local send time, wrapping around midnight
    pub fn is_within_send_window(&self, now: DateTime<Utc>) -> Result<bool, ReminderSettingsError> {
        let local = now.with_timezone(&self.tz()?);
        let send_time = self.send_time()?;

        let current = i64::from(local.hour()) * 60 + i64::from(local.minute());
        let configured = i64::from(send_time.hour()) * 60 + i64::from(send_time.minute());
        let diff = (current - configured).abs();

        Ok(diff <= SEND_WINDOW_MINUTES || diff >= MINUTES_PER_DAY - SEND_WINDOW_MINUTES)
    }
}

#[cfg(feature = "backend")]
impl ReminderSettings {
    /// Creates the default row if it doesn't exist yet. Safe to call on every
    /// start
    pub fn initialize<T>(conn: &Connection) -> Result<(), ServerError<T>> {
        let defaults = ReminderSettings::default();
        let (sql, values) = Query::insert()
            .into_table(ReminderSettingsIden::Table)
            .columns([
                ReminderSettingsIden::Key,
                ReminderSettingsIden::Email,
                ReminderSettingsIden::Time,
                ReminderSettingsIden::Enabled,
                ReminderSettingsIden::Timezone,
                ReminderSettingsIden::LastUpdatedDate,
            ])
            .values([
                defaults.key.into(),
                defaults.email.into(),
                defaults.time.into(),
                defaults.enabled.into(),
                defaults.timezone.into(),
                defaults.last_updated_date.into(),
            ])?
            .on_conflict(OnConflict::column(ReminderSettingsIden::Key).do_nothing().to_owned())
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let inserted = stmt.execute(&*values.as_params())?;
        if inserted > 0 {
            tracing::info!("Created default reminder settings");
        }

        Ok(())
    }

    pub fn fetch<T>(conn: &Connection) -> Result<ReminderSettings, ServerError<T>> {
        let (sql, values) = Query::select()
            .columns([
                ReminderSettingsIden::Key,
                ReminderSettingsIden::Email,
                ReminderSettingsIden::Time,
                ReminderSettingsIden::Enabled,
                ReminderSettingsIden::Timezone,
                ReminderSettingsIden::LastUpdatedDate,
            ])
            .from(ReminderSettingsIden::Table)
            .and_where(Expr::col(ReminderSettingsIden::Key).eq(DEFAULT_SETTINGS_KEY))
            .limit(1)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        stmt.query_row(&*values.as_params(), ReminderSettings::from_row)
            .optional()?
            .ok_or_else(|| crate::not_found_error!("Reminder settings haven't been initialized"))
    }

    pub fn update<T>(&self, conn: &Connection) -> Result<(), ServerError<T>> {
        let (sql, values) = Query::update()
            .table(ReminderSettingsIden::Table)
            .values([
                (ReminderSettingsIden::Email, self.email.clone().into()),
                (ReminderSettingsIden::Time, self.time.clone().into()),
                (ReminderSettingsIden::Enabled, self.enabled.into()),
                (ReminderSettingsIden::Timezone, self.timezone.clone().into()),
                (ReminderSettingsIden::LastUpdatedDate, self.last_updated_date.into()),
            ])
            .and_where(Expr::col(ReminderSettingsIden::Key).eq(self.key.as_str()))
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let changed = stmt.execute(&*values.as_params())?;
        if changed == 0 {
            return Err(crate::not_found_error!("Reminder settings {:?} don't exist", self.key));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn settings(time: &str, timezone: &str) -> ReminderSettings {
        ReminderSettings {
            email: "me@example.com".to_owned(),
            time: time.to_owned(),
            enabled: true,
            timezone: timezone.to_owned(),
            ..Default::default()
        }
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn defaults() {
        let s = ReminderSettings::default();
        assert_eq!(s.key, "default");
        assert_eq!(s.time, "08:30");
        assert_eq!(s.timezone, "America/Los_Angeles");
        assert!(!s.is_configured());
    }

    #[test]
    fn window_uses_local_time() {
        // PST is UTC-8 until the second Sunday of March
        let s = settings("08:30", "America/Los_Angeles");
        assert!(s.is_within_send_window(utc(2024, 3, 4, 16, 30)).unwrap());
        assert!(s.is_within_send_window(utc(2024, 3, 4, 16, 35)).unwrap());
        assert!(s.is_within_send_window(utc(2024, 3, 4, 16, 25)).unwrap());
        assert!(!s.is_within_send_window(utc(2024, 3, 4, 16, 36)).unwrap());
        assert!(!s.is_within_send_window(utc(2024, 3, 4, 8, 30)).unwrap());
    }

    #[test]
    fn window_wraps_midnight() {
        let s = settings("00:02", "UTC");
        assert!(s.is_within_send_window(utc(2024, 3, 4, 23, 59)).unwrap());
        assert!(!s.is_within_send_window(utc(2024, 3, 4, 23, 55)).unwrap());

        let s = settings("23:58", "UTC");
        assert!(s.is_within_send_window(utc(2024, 3, 5, 0, 1)).unwrap());
        assert!(!s.is_within_send_window(utc(2024, 3, 5, 0, 4)).unwrap());
    }

    #[test]
    fn local_today_follows_timezone() {
        let s = settings("08:30", "Pacific/Auckland");
        assert_eq!(
            s.local_today(utc(2024, 3, 4, 12, 0)).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );

        let s = settings("08:30", "America/Los_Angeles");
        assert_eq!(
            s.local_today(utc(2024, 3, 4, 5, 0)).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 3).unwrap()
        );
    }

    #[test]
    fn stored_garbage_is_an_error() {
        let s = settings("8.30", "Mars/Olympus_Mons");
        assert_eq!(
            s.local_today(utc(2024, 3, 4, 5, 0)),
            Err(ReminderSettingsError::InvalidTimezone("Mars/Olympus_Mons".to_owned()))
        );
        let s = settings("8.30", "UTC");
        assert_eq!(
            s.is_within_send_window(utc(2024, 3, 4, 5, 0)),
            Err(ReminderSettingsError::InvalidTime("8.30".to_owned()))
        );
    }

    #[test]
    fn apply_validates_everything() {
        let mut s = ReminderSettings::default();
        let err = s
            .apply(ReminderSettingsUpdate {
                email: Some("nope".to_owned()),
                time: Some("25:00".to_owned()),
                enabled: Some(true),
                timezone: Some("Nowhere/Special".to_owned()),
            })
            .unwrap_err();
        assert_eq!(err.error_messages.len(), 3);
        assert!(!s.enabled);

        let dirty = s
            .apply(ReminderSettingsUpdate {
                email: Some(" me@example.com ".to_owned()),
                enabled: Some(true),
                ..Default::default()
            })
            .unwrap();
        assert!(dirty);
        assert_eq!(s.email, "me@example.com");
        assert!(s.is_configured());
    }

    #[test]
    fn empty_email_clears_address() {
        let mut s = settings("08:30", "UTC");
        s.apply(ReminderSettingsUpdate { email: Some(String::new()), ..Default::default() })
            .unwrap();
        assert!(!s.is_configured());
    }
}
