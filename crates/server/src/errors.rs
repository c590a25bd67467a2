use deadpool_sqlite::HookError;
use shared::api::error::{Nothing, ServerError};

/// Wraps a failure while setting up a pooled connection so deadpool can report
/// it
pub fn hook_error(err: ServerError<Nothing>) -> HookError {
    HookError::Message(err.to_string())
}
