//! Audit inserts and queries.

use anyhow::Result;
use serde::Serialize;
use sqlx::Row;

use super::db::AuditDb;
use crate::claim::{BadgeTier, EnvironmentContext, RetryAttempt};
use crate::retry::ErrorCategory;
use crate::service::{error_fingerprint, ClaimOutcome, ClaimResolution};

/// One row of `retry_attempts`, as read back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditedAttempt {
    pub id: i64,
    pub claim_id: String,
    pub timestamp_ms: u64,
    pub category: ErrorCategory,
    pub error_message: String,
    pub error_hash: String,
    pub strategy_action: String,
    pub tier: BadgeTier,
    pub token_id: u64,
    pub requires_proof: bool,
    pub environment: EnvironmentContext,
}

fn action_name(attempt: &RetryAttempt) -> Result<String> {
    // Reuse the serde name so the column matches JSON output.
    let value = serde_json::to_value(attempt.strategy.action)?;
    Ok(value.as_str().unwrap_or_default().to_string())
}

impl AuditDb {
    pub async fn record_attempt(&self, attempt: &RetryAttempt) -> Result<i64> {
        let environment_json = serde_json::to_string(&attempt.environment)?;
        let row_id = sqlx::query(
            r#"
            INSERT INTO retry_attempts (
                claim_id, timestamp_ms, category, error_message, error_hash,
                strategy_action, tier, token_id, xp_earned, requires_proof,
                environment_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&attempt.claim_id)
        .bind(attempt.timestamp_ms as i64)
        .bind(attempt.category.as_str())
        .bind(&attempt.raw_error_message)
        .bind(error_fingerprint(&attempt.raw_error_message))
        .bind(action_name(attempt)?)
        .bind(attempt.badge.tier.as_str())
        .bind(attempt.badge.token_id as i64)
        .bind(attempt.badge.xp_earned as i64)
        .bind(attempt.badge.requires_proof)
        .bind(environment_json)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(row_id)
    }

    pub async fn record_outcome(&self, resolution: &ClaimResolution) -> Result<i64> {
        let row_id = sqlx::query(
            r#"
            INSERT INTO claim_outcomes (
                claim_id, outcome, attempts, last_prediction, resolved_at_ms
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&resolution.claim_id)
        .bind(resolution.outcome.as_str())
        .bind(resolution.attempts as i64)
        .bind(resolution.last_prediction)
        .bind(resolution.resolved_at_ms as i64)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(row_id)
    }

    /// All recorded attempts for a claim, oldest first.
    pub async fn attempts_for_claim(&self, claim_id: &str) -> Result<Vec<AuditedAttempt>> {
        let rows = sqlx::query(
            r#"
            SELECT id, claim_id, timestamp_ms, category, error_message, error_hash,
                   strategy_action, tier, token_id, requires_proof, environment_json
            FROM retry_attempts
            WHERE claim_id = ?1
            ORDER BY timestamp_ms ASC, id ASC
            "#,
        )
        .bind(claim_id)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let category: String = row.get("category");
            let tier: String = row.get("tier");
            let environment_json: Option<String> = row.get("environment_json");
            let environment: EnvironmentContext = environment_json
                .as_deref()
                .map(serde_json::from_str::<EnvironmentContext>)
                .transpose()?
                .unwrap_or_default();
            out.push(AuditedAttempt {
                id: row.get("id"),
                claim_id: row.get("claim_id"),
                timestamp_ms: row.get::<i64, _>("timestamp_ms") as u64,
                category: category.parse().unwrap_or(ErrorCategory::UnknownError),
                error_message: row.get("error_message"),
                error_hash: row.get("error_hash"),
                strategy_action: row.get("strategy_action"),
                tier: tier.parse().unwrap_or_default(),
                token_id: row.get::<i64, _>("token_id") as u64,
                requires_proof: row.get("requires_proof"),
                environment,
            });
        }
        Ok(out)
    }

    /// Attempt counts per category, most frequent first.
    pub async fn category_counts(&self) -> Result<Vec<(ErrorCategory, i64)>> {
        let rows = sqlx::query(
            r#"
            SELECT category, COUNT(*) AS n
            FROM retry_attempts
            GROUP BY category
            ORDER BY n DESC, category ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let category: String = row.get("category");
                (
                    category.parse().unwrap_or(ErrorCategory::UnknownError),
                    row.get::<i64, _>("n"),
                )
            })
            .collect())
    }

    pub async fn outcome_counts(&self) -> Result<Vec<(ClaimOutcome, i64)>> {
        let rows = sqlx::query(
            r#"
            SELECT outcome, COUNT(*) AS n
            FROM claim_outcomes
            GROUP BY outcome
            ORDER BY outcome ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let outcome: String = row.get("outcome");
                // Unrecognised outcome strings count as abandoned.
                let outcome = outcome.parse().unwrap_or(ClaimOutcome::Abandoned);
                (outcome, row.get::<i64, _>("n"))
            })
            .collect())
    }
}
