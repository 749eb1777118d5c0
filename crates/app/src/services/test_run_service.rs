//! Test run service — start, inspect and cancel test runs.
//!
//! Starting a run persists a `running` record, then hands an owned snapshot
//! of the automation to a spawned task. The caller gets the record back
//! straight away; the task drives the [`ExecutionEngine`] and writes the
//! terminal status itself.

use std::sync::Arc;

use flowmail_domain::email::EmailAddress;
use flowmail_domain::error::{ConflictError, FlowMailError, NotFoundError};
use flowmail_domain::id::{AutomationId, TestRunId};
use flowmail_domain::test_run::TestRun;

use crate::execution_engine::ExecutionEngine;
use crate::ports::{AutomationRepository, Mailer, RunTracker, TestRunRepository};
use crate::run_registry::RunRegistry;

pub struct TestRunService<A, R, M, T> {
    automations: A,
    runs: R,
    engine: Arc<ExecutionEngine<M, T>>,
    registry: Arc<RunRegistry>,
}

impl<A, R, M, T> TestRunService<A, R, M, T>
where
    A: AutomationRepository,
    R: TestRunRepository,
    M: Mailer + Send + Sync + 'static,
    T: RunTracker + Send + Sync + 'static,
{
    pub fn new(
        automations: A,
        runs: R,
        engine: Arc<ExecutionEngine<M, T>>,
        registry: Arc<RunRegistry>,
    ) -> Self {
        Self {
            automations,
            runs,
            engine,
            registry,
        }
    }

    /// Validate `email`, record a new run and start executing it in the background.
    ///
    /// # Errors
    ///
    /// Returns [`FlowMailError::Validation`] for a blank or malformed address,
    /// [`FlowMailError::NotFound`] for an unknown automation, or a storage error.
    #[tracing::instrument(skip(self, email))]
    pub async fn start_test_run(
        &self,
        automation_id: AutomationId,
        email: &str,
    ) -> Result<TestRun, FlowMailError> {
        let recipient = EmailAddress::parse(email)?;
        let automation = self
            .automations
            .get_by_id(automation_id)
            .await?
            .ok_or_else(|| NotFoundError {
                entity: "Automation",
                id: automation_id.to_string(),
            })?;

        let run = self
            .runs
            .create(TestRun::start(automation_id, recipient.clone()))
            .await?;
        let run_id = run.id;
        let cancel = self.registry.register(run_id);
        let engine = Arc::clone(&self.engine);
        let registry = Arc::clone(&self.registry);

        tokio::spawn(async move {
            engine
                .run(&automation, &recipient, run_id, &cancel, || {
                    registry.close(run_id);
                })
                .await;
            registry.remove(run_id);
        });
        tracing::info!(run_id = %run_id, "test run started");

        Ok(run)
    }

    /// # Errors
    ///
    /// Returns [`FlowMailError::NotFound`] for an unknown run, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn get_test_run(&self, id: TestRunId) -> Result<TestRun, FlowMailError> {
        self.runs.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Test run",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// Runs of one automation, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`FlowMailError::NotFound`] for an unknown automation, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn list_test_runs(
        &self,
        automation_id: AutomationId,
    ) -> Result<Vec<TestRun>, FlowMailError> {
        if self.automations.get_by_id(automation_id).await?.is_none() {
            return Err(NotFoundError {
                entity: "Automation",
                id: automation_id.to_string(),
            }
            .into());
        }
        self.runs.list_by_automation(automation_id).await
    }

    /// Ask a live run to stop.
    ///
    /// The run's own task records the `cancelled` status once it notices.
    ///
    /// # Errors
    ///
    /// Returns [`FlowMailError::NotFound`] for an unknown run and
    /// [`FlowMailError::Conflict`] when the run is no longer live.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_test_run(&self, id: TestRunId) -> Result<TestRun, FlowMailError> {
        let run = self.get_test_run(id).await?;
        if !run.is_running() || !self.registry.cancel(id) {
            return Err(ConflictError::RunNotLive.into());
        }
        tracing::info!("cancellation requested");
        Ok(run)
    }
}
