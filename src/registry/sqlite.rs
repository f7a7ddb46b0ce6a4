use super::LinkRegistry;
use crate::{
    error::LinkError,
    models::{self, Link},
};
use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

const LINK_COLUMNS: &str =
    "id, code, target_url, total_clicks, last_clicked, created_at, updated_at";

// ── Pool setup ─────────────────────────────────────────────────────────────

/// Open (creating if missing) the SQLite database at `database_url` and apply
/// the embedded migrations.
pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(
            database_url
                .parse::<SqliteConnectOptions>()?
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal),
        )
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}

// ── Registry ───────────────────────────────────────────────────────────────

/// Registry backed by the `links` table.
///
/// Every operation is one SQL statement: uniqueness comes from the UNIQUE
/// constraint on `code`, and visits use `total_clicks = total_clicks + 1`.
#[derive(Clone, Debug)]
pub struct SqliteRegistry {
    pool: SqlitePool,
}

impl SqliteRegistry {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRegistry for SqliteRegistry {
    async fn create(&self, code: &str, target_url: &str) -> Result<Link, LinkError> {
        let link = Link::new(code, target_url);

        let inserted: Link = sqlx::query_as(&format!(
            "INSERT INTO links (id, code, target_url, total_clicks, last_clicked, created_at, updated_at)
             VALUES (?1, ?2, ?3, 0, NULL, ?4, ?4)
             RETURNING {LINK_COLUMNS}"
        ))
        .bind(&link.id)
        .bind(&link.code)
        .bind(&link.target_url)
        .bind(link.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => LinkError::CodeConflict,
            other => LinkError::StoreUnavailable(other),
        })?;

        Ok(inserted)
    }

    async fn get(&self, code: &str) -> Result<Link, LinkError> {
        let link: Option<Link> =
            sqlx::query_as(&format!("SELECT {LINK_COLUMNS} FROM links WHERE code = ?1"))
                .bind(code)
                .fetch_optional(&self.pool)
                .await?;

        link.ok_or(LinkError::NotFound)
    }

    async fn list_all(&self) -> Result<Vec<Link>, LinkError> {
        let links: Vec<Link> = sqlx::query_as(&format!(
            "SELECT {LINK_COLUMNS} FROM links ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(links)
    }

    async fn record_visit(&self, code: &str) -> Result<Link, LinkError> {
        let link: Option<Link> = sqlx::query_as(&format!(
            "UPDATE links
             SET total_clicks = total_clicks + 1, last_clicked = ?1, updated_at = ?1
             WHERE code = ?2
             RETURNING {LINK_COLUMNS}"
        ))
        .bind(models::now())
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        link.ok_or(LinkError::NotFound)
    }

    async fn delete(&self, code: &str) -> Result<(), LinkError> {
        let affected = sqlx::query("DELETE FROM links WHERE code = ?1")
            .bind(code)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if affected > 0 {
            Ok(())
        } else {
            Err(LinkError::NotFound)
        }
    }
}
