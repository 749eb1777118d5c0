//! # flowmail-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `flowmail-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `flowmail-app` (for port traits) and `flowmail-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod automation_repo;
mod error;
mod pool;
mod test_run_repo;

pub use automation_repo::SqliteAutomationRepository;
pub use error::StorageError;
pub use pool::{Config, Database};
pub use test_run_repo::SqliteTestRunRepository;

/// Text form used for every stored timestamp.
///
/// Fixed width, so lexical order in SQL matches chronological order.
fn encode_timestamp(ts: flowmail_domain::time::Timestamp) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true)
}

fn decode_timestamp(raw: &str) -> Result<flowmail_domain::time::Timestamp, sqlx::Error> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.to_utc())
        .map_err(|err| sqlx::Error::Decode(Box::new(err)))
}
