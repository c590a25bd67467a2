use const_format::concatcp;

pub mod error;
pub mod payloads;
pub mod response_errors;

pub const API_BASE_PATH: &str = "/api/";

/// Header the cron runner authenticates with (`Bearer <secret>`)
pub const CRON_AUTH_HEADER: &str = "authorization";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Object {
    Ping,
    Auth,
    Exercises,
    ExerciseId,
    ExerciseMedia,
    Logs,
    Stats,
    Reminders,
    SendReminder,
    Cron,
}

impl Object {
    pub const fn path(&self) -> &str {
        use Object::*;
        match self {
            Ping => concatcp!(API_BASE_PATH, "ping"),
            Auth => concatcp!(API_BASE_PATH, "auth"),
            Exercises => concatcp!(API_BASE_PATH, "exercises"),
            ExerciseId => concatcp!(API_BASE_PATH, "exercises/:id"),
            ExerciseMedia => concatcp!(API_BASE_PATH, "exercises/:id/media"),
            Logs => concatcp!(API_BASE_PATH, "logs"),
            Stats => concatcp!(API_BASE_PATH, "stats"),
            Reminders => concatcp!(API_BASE_PATH, "reminders"),
            SendReminder => concatcp!(API_BASE_PATH, "reminders/send"),
            Cron => concatcp!(API_BASE_PATH, "cron"),
        }
    }

    /// Path with the `:id` placeholder filled in
    pub fn id_path<D: std::fmt::Display>(&self, id: D) -> String {
        self.path().replace(":id", &id.to_string())
    }
}
