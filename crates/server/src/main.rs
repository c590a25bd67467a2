use std::{
    net::{IpAddr, SocketAddr},
    path::Path,
    str::FromStr,
    sync::Arc,
    time::Duration,
};

use clap::Parser;
use server::{app, cli::Cli, db, session_store::SqliteSessionStore, AppState};
use shared::*;
use tokio::net::TcpListener;
use tower_sessions::ExpiredDeletion;
use tracing::{debug, info, warn};

const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Removes the database and the WAL files sqlite keeps next to it
fn delete_database(connection_string: &str) -> Result<(), std::io::Error> {
    for suffix in ["", "-wal", "-shm"] {
        let path = format!("{connection_string}{suffix}");
        if Path::new(&path).exists() {
            warn!(%path, "Deleting database file");
            std::fs::remove_file(&path)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    load_dotenv()?;
    configure_tracing();

    let args = Cli::parse();
    debug!(
        database = %args.sqlite_connection_string,
        password_set = args.app_password.is_some(),
        cron_secret_set = args.cron_secret.is_some(),
        email_configured = args.resend_api_key.is_some(),
        "Starting"
    );

    if args.debug_delete_database {
        delete_database(&args.sqlite_connection_string)?;
    }

    // Run the migrations synchronously before creating the pool or launching the server
    let ran = db::run_migrations(&args.sqlite_connection_string)?;
    info!("Ran {ran} db migrations");

    // Create a database pool to add into the app state
    let pool = db::create_pool(&args.sqlite_connection_string)?;

    let store = SqliteSessionStore::new(pool.clone());
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = store.delete_expired().await {
                warn!("Failed to delete expired sessions: {e}");
            }
        }
    });

    let socket = SocketAddr::new(IpAddr::from_str(&args.bind_addr)?, args.port);
    let state = AppState::new(pool, Arc::new(args))?;

    let listener = TcpListener::bind(socket).await?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
