//! SQLite-backed audit log of failed attempts and claim outcomes.
//!
//! Handles connection and migrations. Inserts and queries live in `records`.

use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::path::Path;

/// Percent-encode a path for use in a sqlite:// URI so spaces and special chars don't break parsing.
fn path_to_sqlite_uri(path: &Path) -> String {
    let s = path.to_string_lossy();
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            '&' => out.push_str("%26"),
            c => out.push(c),
        }
    }
    format!("sqlite://{}", out)
}

/// Handle to the audit database, stored under the XDG state directory:
/// `~/.local/state/claim-retry/audit.db`.
#[derive(Clone)]
pub struct AuditDb {
    pub(crate) pool: Pool<Sqlite>,
}

impl AuditDb {
    /// Open (or create) the default audit database and run migrations.
    pub async fn open_default() -> Result<Self> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("claim-retry")?;
        let db_path = xdg_dirs.get_state_home().join("claim-retry").join("audit.db");
        Self::open_at(db_path).await
    }

    /// Open (or create) the database at a specific path. Creates parent dirs if needed.
    pub async fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let uri = path_to_sqlite_uri(path) + "?mode=rwc";
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect(&uri)
            .await?;
        let db = AuditDb { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<()> {
        // - `environment_json` holds device/wallet info as JSON.
        // - `last_prediction` is NULL when the claim was never analysed.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS retry_attempts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                claim_id TEXT NOT NULL,
                timestamp_ms INTEGER NOT NULL,
                category TEXT NOT NULL,
                error_message TEXT NOT NULL,
                error_hash TEXT NOT NULL,
                strategy_action TEXT NOT NULL,
                tier TEXT NOT NULL,
                token_id INTEGER NOT NULL,
                xp_earned INTEGER NOT NULL,
                requires_proof INTEGER NOT NULL,
                environment_json TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_retry_attempts_claim
                ON retry_attempts (claim_id, timestamp_ms);
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS claim_outcomes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                claim_id TEXT NOT NULL,
                outcome TEXT NOT NULL,
                attempts INTEGER NOT NULL,
                last_prediction REAL,
                resolved_at_ms INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
/// Open an in-memory database for tests (no disk I/O).
pub(crate) async fn open_memory() -> Result<AuditDb> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    let db = AuditDb { pool };
    db.migrate().await?;
    Ok(db)
}
