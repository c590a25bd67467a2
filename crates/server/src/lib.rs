use axum::Router;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tower_sessions::{cookie::{time::Duration, SameSite}, Expiry, SessionManagerLayer};
use tracing::Level;

pub mod db;

mod errors;
pub use errors::*;

mod session;
pub use session::*;

mod state;
pub use state::*;

mod extract;
pub use extract::*;

pub mod cli;
pub mod integrations;
pub mod reminders;
pub mod routes;
pub mod session_store;

use session_store::SqliteSessionStore;

/// The full application: api routes, cookie sessions stored in the app's
/// database and request tracing
pub fn app(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(SqliteSessionStore::new(state.pool.clone()))
        .with_secure(state.args.secure_sessions)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::days(state.args.session_expiry_days)));

    routes::router()
        .layer(session_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
