//! `tower-sessions` store backed by the app's own SQLite pool, so sessions
//! survive restarts without a second database

use axum::async_trait;
use deadpool_sqlite::{Object, Pool};
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use tower_sessions::{
    cookie::time::OffsetDateTime,
    session::{Id, Record},
    session_store, ExpiredDeletion, SessionStore,
};
use tracing::debug;

#[derive(Debug, Error)]
pub enum SqliteSessionStoreError {
    #[error("Deadpool interact error: {0}")]
    DeadpoolInteract(#[from] deadpool_sqlite::InteractError),
    #[error("Deadpool pool error: {0}")]
    DeadpoolPool(#[from] deadpool_sqlite::PoolError),
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
    #[error("Serde json decode error: {0}")]
    JsonDecode(serde_json::Error),
    #[error("Serde json encode error: {0}")]
    JsonEncode(serde_json::Error),
}

impl From<SqliteSessionStoreError> for session_store::Error {
    fn from(err: SqliteSessionStoreError) -> Self {
        use session_store::Error;
        use SqliteSessionStoreError::*;

        match err {
            JsonEncode(inner) => Error::Encode(inner.to_string()),
            JsonDecode(inner) => Error::Decode(inner.to_string()),
            other => Error::Backend(other.to_string()),
        }
    }
}

const EXISTS_SQL: &str = "SELECT 1 FROM session WHERE id = ?1";
const INSERT_SQL: &str = "INSERT INTO session (id, data, expiry_date) VALUES (?1, ?2, ?3)";
const UPSERT_SQL: &str = r#"
    INSERT INTO session (id, data, expiry_date) VALUES (?1, ?2, ?3)
    ON CONFLICT (id) DO UPDATE SET
        data = excluded.data,
        expiry_date = excluded.expiry_date
"#;
const LOAD_SQL: &str = "SELECT data FROM session WHERE id = ?1 AND expiry_date > ?2";
const DELETE_SQL: &str = "DELETE FROM session WHERE id = ?1";
const DELETE_EXPIRED_SQL: &str = "DELETE FROM session WHERE expiry_date < ?1";

/// Stores sessions in the `session` table created by the migrations
#[derive(Debug, Clone)]
pub struct SqliteSessionStore {
    pool: Pool,
}

impl SqliteSessionStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn get_conn(&self) -> Result<Object, SqliteSessionStoreError> {
        Ok(self.pool.get().await?)
    }

    /// Runs `f` on a pooled connection, flattening both layers of errors
    async fn interact<F, R>(&self, f: F) -> Result<R, session_store::Error>
    where
        F: FnOnce(&mut Connection) -> Result<R, SqliteSessionStoreError> + Send + 'static,
        R: Send + 'static,
    {
        let conn = self.get_conn().await?;
        let r = conn
            .interact(f)
            .await
            .map_err(SqliteSessionStoreError::from)??;
        Ok(r)
    }
}

fn encode(record: &Record) -> Result<(String, Vec<u8>, i64), SqliteSessionStoreError> {
    let payload = serde_json::to_vec(record).map_err(SqliteSessionStoreError::JsonEncode)?;
    Ok((record.id.to_string(), payload, record.expiry_date.unix_timestamp()))
}

#[async_trait]
impl ExpiredDeletion for SqliteSessionStore {
    async fn delete_expired(&self) -> Result<(), session_store::Error> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let deleted = self
            .interact(move |conn| Ok(conn.prepare_cached(DELETE_EXPIRED_SQL)?.execute(params![now])?))
            .await?;
        debug!(deleted, "Deleted expired sessions");
        Ok(())
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn create(&self, record: &mut Record) -> Result<(), session_store::Error> {
        let (_, payload, expiry) = encode(record)?;
        let mut id = record.id.clone();

        let id = self
            .interact(move |conn| {
                let tx = conn.transaction()?;
                {
                    let mut exists = tx.prepare_cached(EXISTS_SQL)?;
                    // Re-key until the id is unique
                    while exists.exists(params![id.to_string()])? {
                        id = Id::default();
                    }
                    tx.prepare_cached(INSERT_SQL)?
                        .execute(params![id.to_string(), payload, expiry])?;
                }
                tx.commit()?;
                Ok(id)
            })
            .await?;

        // The payload was encoded with the old id, load() overwrites it with
        // the row's key
        record.id = id;
        Ok(())
    }

    async fn save(&self, record: &Record) -> Result<(), session_store::Error> {
        let (id, payload, expiry) = encode(record)?;
        self.interact(move |conn| {
            conn.prepare_cached(UPSERT_SQL)?.execute(params![id, payload, expiry])?;
            Ok(())
        })
        .await
    }

    async fn load(&self, id: &Id) -> Result<Option<Record>, session_store::Error> {
        let id_string = id.to_string();
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let payload = self
            .interact(move |conn| {
                Ok(conn
                    .prepare_cached(LOAD_SQL)?
                    .query_row(params![id_string, now], |row| row.get::<_, Vec<u8>>(0))
                    .optional()?)
            })
            .await?;

        let record = payload
            .map(|data| serde_json::from_slice::<Record>(&data))
            .transpose()
            .map_err(SqliteSessionStoreError::JsonDecode)?
            .map(|mut record| {
                record.id = id.clone();
                record
            });
        Ok(record)
    }

    async fn delete(&self, id: &Id) -> Result<(), session_store::Error> {
        let id = id.to_string();
        self.interact(move |conn| {
            conn.prepare_cached(DELETE_SQL)?.execute(params![id])?;
            Ok(())
        })
        .await
    }
}
