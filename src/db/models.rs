use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Most records returned for a single session lookup.
pub const SESSION_HISTORY_LIMIT: i64 = 1000;

/// Most records returned by the recent-history listing.
pub const RECENT_SESSIONS_LIMIT: i64 = 100;

/// One solved question. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub session_id: String,
    pub question: String,
    pub solution: String,
    pub model_provider: String,
    pub model_name: String,
    pub timestamp: String,
}

impl SessionRecord {
    pub fn new(
        session_id: String,
        question: String,
        solution: String,
        model_provider: String,
        model_name: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id,
            question,
            solution,
            model_provider,
            model_name,
            timestamp: format_timestamp(created_at),
        }
    }

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            question: row.try_get("question")?,
            solution: row.try_get("solution")?,
            model_provider: row.try_get("model_provider")?,
            model_name: row.try_get("model_name")?,
            timestamp: row.try_get("timestamp")?,
        })
    }
}

/// Fixed-width RFC 3339 so that string order matches time order.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, false)
}

pub async fn init_db(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let schema = include_str!("schema.sql");
    sqlx::raw_sql(schema).execute(pool).await?;
    Ok(())
}

pub async fn insert_session(pool: &SqlitePool, record: &SessionRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO sessions (
            id, session_id, question, solution,
            model_provider, model_name, timestamp
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.id)
    .bind(&record.session_id)
    .bind(&record.question)
    .bind(&record.solution)
    .bind(&record.model_provider)
    .bind(&record.model_name)
    .bind(&record.timestamp)
    .execute(pool)
    .await?;

    Ok(())
}

/// All records sharing `session_id`, in insertion order.
pub async fn get_sessions_by_id(
    pool: &SqlitePool,
    session_id: &str,
    limit: i64,
) -> Result<Vec<SessionRecord>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, session_id, question, solution, model_provider, model_name, timestamp
        FROM sessions
        WHERE session_id = ?
        ORDER BY rowid ASC
        LIMIT ?
        "#,
    )
    .bind(session_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(SessionRecord::from_row).collect()
}

pub async fn get_recent_sessions(
    pool: &SqlitePool,
    limit: i64,
) -> Result<Vec<SessionRecord>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, session_id, question, solution, model_provider, model_name, timestamp
        FROM sessions
        ORDER BY timestamp DESC, rowid DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(SessionRecord::from_row).collect()
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    // Every in-memory connection is its own database, so pin the pool to one.
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    init_db(&pool).await.unwrap();
    pool
}
