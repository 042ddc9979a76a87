//! Persistent audit log of claim retries (SQLite via sqlx).
//!
//! Stores every failed attempt with its classification and badge context,
//! and the final outcome of each retried claim. The in-memory
//! `RetryService` stays the source of truth for decisions; this log is for
//! later inspection.

mod db;
mod records;

pub use db::AuditDb;
pub use records::AuditedAttempt;
