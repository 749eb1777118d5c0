//! Test run — one execution of an automation against one recipient.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::email::EmailAddress;
use crate::id::{AutomationId, TestRunId};
use crate::time::{self, Timestamp};

/// Lifecycle of a test run.
///
/// A run starts as [`TestRunStatus::Running`] and moves to exactly one
/// terminal status. Terminal statuses never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestRunStatus {
    Running,
    Finished,
    Cancelled,
}

impl TestRunStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Finished => "finished",
            Self::Cancelled => "cancelled",
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl fmt::Display for TestRunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown test run status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for TestRunStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(Self::Running),
            "finished" => Ok(Self::Finished),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Persisted record of one execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRun {
    pub id: TestRunId,
    pub automation_id: AutomationId,
    pub email: EmailAddress,
    pub status: TestRunStatus,
    pub started_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<Timestamp>,
}

impl TestRun {
    /// A fresh run in the `running` state, started now.
    #[must_use]
    pub fn start(automation_id: AutomationId, email: EmailAddress) -> Self {
        Self {
            id: TestRunId::new(),
            automation_id,
            email,
            status: TestRunStatus::Running,
            started_at: time::now(),
            finished_at: None,
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == TestRunStatus::Running
    }
}
