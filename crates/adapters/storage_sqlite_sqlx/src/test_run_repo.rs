//! `SQLite` implementation of [`TestRunRepository`] and [`RunTracker`].

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use flowmail_app::ports::{RunTracker, TestRunRepository};
use flowmail_domain::email::EmailAddress;
use flowmail_domain::error::FlowMailError;
use flowmail_domain::id::{AutomationId, TestRunId};
use flowmail_domain::test_run::{TestRun, TestRunStatus};
use flowmail_domain::time::Timestamp;

use crate::error::StorageError;
use crate::{decode_timestamp, encode_timestamp};

struct Wrapper(TestRun);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let automation_id: String = row.try_get("automation_id")?;
        let email: String = row.try_get("email")?;
        let status: String = row.try_get("status")?;
        let started_at: String = row.try_get("started_at")?;
        let finished_at: Option<String> = row.try_get("finished_at")?;

        Ok(Self(TestRun {
            id: TestRunId::from_str(&id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?,
            automation_id: AutomationId::from_str(&automation_id)
                .map_err(|err| sqlx::Error::Decode(Box::new(err)))?,
            email: EmailAddress::parse(&email).map_err(|err| sqlx::Error::Decode(Box::new(err)))?,
            status: TestRunStatus::from_str(&status)
                .map_err(|err| sqlx::Error::Decode(Box::new(err)))?,
            started_at: decode_timestamp(&started_at)?,
            finished_at: finished_at.as_deref().map(decode_timestamp).transpose()?,
        }))
    }
}

/// `SQLite`-backed test run repository.
///
/// Also implements [`RunTracker`]: the terminal update only matches rows
/// still in `running`, so a run transitions at most once.
pub struct SqliteTestRunRepository {
    pool: SqlitePool,
}

impl SqliteTestRunRepository {
    /// Create a new repository backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn finish(
        &self,
        id: TestRunId,
        status: TestRunStatus,
        at: Timestamp,
    ) -> Result<(), FlowMailError> {
        sqlx::query(
            "UPDATE test_runs SET status = ?, finished_at = ? WHERE id = ? AND status = 'running'",
        )
        .bind(status.as_str())
        .bind(encode_timestamp(at))
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(())
    }
}

impl TestRunRepository for SqliteTestRunRepository {
    async fn create(&self, run: TestRun) -> Result<TestRun, FlowMailError> {
        sqlx::query(
            "INSERT INTO test_runs (id, automation_id, email, status, started_at, finished_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(run.id.to_string())
        .bind(run.automation_id.to_string())
        .bind(run.email.as_str())
        .bind(run.status.as_str())
        .bind(encode_timestamp(run.started_at))
        .bind(run.finished_at.map(encode_timestamp))
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;

        Ok(run)
    }

    async fn get_by_id(&self, id: TestRunId) -> Result<Option<TestRun>, FlowMailError> {
        let row: Option<Wrapper> = sqlx::query_as("SELECT * FROM test_runs WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(row.map(|w| w.0))
    }

    async fn list_by_automation(
        &self,
        automation_id: AutomationId,
    ) -> Result<Vec<TestRun>, FlowMailError> {
        let rows: Vec<Wrapper> = sqlx::query_as(
            "SELECT * FROM test_runs WHERE automation_id = ? ORDER BY started_at DESC, rowid DESC",
        )
        .bind(automation_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}

impl RunTracker for SqliteTestRunRepository {
    async fn mark_finished(&self, id: TestRunId, finished_at: Timestamp) -> Result<(), FlowMailError> {
        self.finish(id, TestRunStatus::Finished, finished_at).await
    }

    async fn mark_cancelled(&self, id: TestRunId, at: Timestamp) -> Result<(), FlowMailError> {
        self.finish(id, TestRunStatus::Cancelled, at).await
    }
}
