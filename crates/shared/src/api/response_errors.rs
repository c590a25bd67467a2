use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error::{Nothing, ServerError};
use crate::types::Uuid;

macro_rules! response_error {
    ($name:ident {
        $(
            #[code($variant_code:expr)]
            $variant:ident
            $({ $($var_struct_body_tt:tt)* })?
        ,)*
    }) => {

        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
        pub enum $name {
            $(
                #[error("{}::{}: {:?}", stringify!($name), stringify!($variant), self)]
                $variant $({
                    $($var_struct_body_tt)*
                })?,
            )*
        }

        impl From<$name> for ServerError<$name> {
            fn from(inner: $name) -> Self {
                let code = match &inner {
                    $( $name::$variant { .. } => $variant_code, )*
                };
                Self::Inner { code, inner }
            }
        }
    };
}

response_error!(AuthError {
    #[code(StatusCode::INTERNAL_SERVER_ERROR)]
    PasswordNotConfigured,
    #[code(StatusCode::UNAUTHORIZED)]
    InvalidPassword,
});

response_error!(CronError {
    #[code(StatusCode::INTERNAL_SERVER_ERROR)]
    SecretNotConfigured,
    #[code(StatusCode::UNAUTHORIZED)]
    InvalidSecret,
});

response_error!(LogError {
    #[code(StatusCode::NOT_FOUND)]
    UnknownExercise { exercise_id: Uuid },
});

response_error!(StatsError {
    #[code(StatusCode::BAD_REQUEST)]
    InvalidRange { message: String },
});

// Aliases used to allow future expansion of the errors without having to go
// back and update all routes that use them
pub type FetchError = Nothing;
pub type ExerciseError = Nothing;
pub type MediaError = Nothing;
pub type ReminderError = Nothing;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_carry_their_status_code() {
        let e: ServerError<AuthError> = AuthError::InvalidPassword.into();
        assert_eq!(e.status_code(), StatusCode::UNAUTHORIZED);

        let e: ServerError<AuthError> = AuthError::PasswordNotConfigured.into();
        assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let e: ServerError<LogError> =
            LogError::UnknownExercise { exercise_id: Uuid::new_v4() }.into();
        assert_eq!(e.status_code(), StatusCode::NOT_FOUND);
    }
}
