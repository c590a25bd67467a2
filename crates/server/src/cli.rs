use clap::Parser;

use crate::integrations::{RESEND_API_URL, UNSPLASH_SEARCH_URL, YOUTUBE_SEARCH_URL};

#[derive(Debug, Clone, Parser)]
#[clap(name = "pt-tracker server")]
pub struct Cli {
    #[clap(long, env, default_value = "pt-tracker.sqlite")]
    pub sqlite_connection_string: String,
    #[clap(long, env, default_value = "8080")]
    pub port: u16,
    #[clap(long, env, default_value = "127.0.0.1")]
    pub bind_addr: String,

    /// Shared password that unlocks the app. Logging in fails until it's set
    #[arg(long, env)]
    pub app_password: Option<String>,
    /// Bearer token the scheduler must present to `/api/cron`
    #[arg(long, env)]
    pub cron_secret: Option<String>,
    #[clap(long, env, default_value = "false")]
    pub secure_sessions: bool,
    #[arg(long, env, default_value = "30")]
    pub session_expiry_days: i64,

    #[arg(long, env)]
    pub resend_api_key: Option<String>,
    #[arg(long, env, default_value = "PT Tracker <onboarding@resend.dev>")]
    pub reminder_from_address: String,
    #[arg(long, env)]
    pub youtube_api_key: Option<String>,
    #[arg(long, env)]
    pub unsplash_access_key: Option<String>,
    #[arg(long, env, default_value = RESEND_API_URL)]
    pub resend_api_url: String,
    #[arg(long, env, default_value = YOUTUBE_SEARCH_URL)]
    pub youtube_search_url: String,
    #[arg(long, env, default_value = UNSPLASH_SEARCH_URL)]
    pub unsplash_search_url: String,
    /// Timeout for calls to email and media search providers
    #[arg(long, env, default_value = "10")]
    pub http_timeout_seconds: u64,

    /// Deletes the database before starting the main program for debug purposes
    #[arg(long, env, default_value = "false")]
    pub debug_delete_database: bool,
}

impl Cli {
    /// Defaults with every secret unset. Doesn't look at the environment so
    /// a developer's `.env` can't leak into tests
    #[cfg(test)]
    pub fn for_test() -> Self {
        Cli {
            sqlite_connection_string: "pt-tracker.sqlite".to_owned(),
            port: 8080,
            bind_addr: "127.0.0.1".to_owned(),
            app_password: None,
            cron_secret: None,
            secure_sessions: false,
            session_expiry_days: 30,
            resend_api_key: None,
            reminder_from_address: "PT Tracker <onboarding@resend.dev>".to_owned(),
            youtube_api_key: None,
            unsplash_access_key: None,
            resend_api_url: RESEND_API_URL.to_owned(),
            youtube_search_url: YOUTUBE_SEARCH_URL.to_owned(),
            unsplash_search_url: UNSPLASH_SEARCH_URL.to_owned(),
            http_timeout_seconds: 10,
            debug_delete_database: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_ignores_the_environment() {
        std::env::set_var("APP_PASSWORD", "from the environment");
        std::env::set_var("CRON_SECRET", "from the environment");

        let parsed = Cli::parse_from(["pt-tracker"]);
        let args = Cli::for_test();

        std::env::remove_var("APP_PASSWORD");
        std::env::remove_var("CRON_SECRET");

        assert_eq!(parsed.app_password.as_deref(), Some("from the environment"));
        assert_eq!(parsed.cron_secret.as_deref(), Some("from the environment"));
        assert_eq!(args.app_password, None);
        assert_eq!(args.cron_secret, None);
        assert_eq!(args.resend_api_key, None);
        assert_eq!(args.youtube_api_key, None);
        assert_eq!(args.unsplash_access_key, None);
    }
}
