mod exercise;
pub use exercise::*;

mod daily_log;
pub use daily_log::*;

mod reminder_settings;
pub use reminder_settings::*;

mod exercise_media;
pub use exercise_media::*;

use crate::api::error::ValidationError;

pub trait ValidateModel {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Collects validation failures so the client sees all of them at once
#[derive(Debug, Default)]
pub(crate) struct Validator {
    error_messages: Vec<String>,
}

impl Validator {
    pub fn check<S: Into<String>>(&mut self, ok: bool, message: S) -> &mut Self {
        if !ok {
            self.error_messages.push(message.into());
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), ValidationError> {
        if self.error_messages.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { error_messages: std::mem::take(&mut self.error_messages) })
        }
    }
}
