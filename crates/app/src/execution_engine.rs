//! Execution engine — walks an automation graph for one recipient.
//!
//! A run starts at the `start` step and visits one step at a time:
//! actions send mail, delays suspend the task, conditions pick a branch.
//! It stops at `end`, at a step with nowhere to go, after
//! [`EngineConfig::max_steps`] steps, or when its token is cancelled.
//!
//! The engine never returns an error. Send failures are logged and the run
//! moves on; the outcome lands in the [`RunTracker`] exactly once.

use flowmail_domain::automation::condition;
use flowmail_domain::automation::{Automation, MessageContext, StepKind};
use flowmail_domain::email::EmailAddress;
use flowmail_domain::id::TestRunId;
use flowmail_domain::time;
use tokio_util::sync::CancellationToken;

use crate::ports::{Mailer, RunTracker};

/// Subject used for every email an action step sends.
pub const DEFAULT_SUBJECT: &str = "FlowMail Automation";
/// Steps a single run may visit before it is stopped as looping.
pub const DEFAULT_MAX_STEPS: usize = 1000;

/// Tunables for [`ExecutionEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub subject: String,
    pub max_steps: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            subject: DEFAULT_SUBJECT.to_string(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// How a run terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Reached an `end` step.
    ReachedEnd,
    /// Stopped at a step with no resolvable next step.
    DeadEnd,
    /// Visited [`EngineConfig::max_steps`] steps without terminating.
    StepLimit,
    /// The run's cancellation token fired.
    Cancelled,
    /// The graph has no `start` step; nothing ran and nothing was recorded.
    NoStart,
}

/// Drives runs against a [`Mailer`] and records results through a [`RunTracker`].
pub struct ExecutionEngine<M, T> {
    mailer: M,
    tracker: T,
    config: EngineConfig,
}

impl<M, T> ExecutionEngine<M, T>
where
    M: Mailer + Send + Sync,
    T: RunTracker + Send + Sync,
{
    pub fn new(mailer: M, tracker: T, config: EngineConfig) -> Self {
        Self {
            mailer,
            tracker,
            config,
        }
    }

    /// Run `automation` for `recipient` and record the outcome under `run_id`.
    pub async fn execute(
        &self,
        automation: &Automation,
        recipient: &EmailAddress,
        run_id: TestRunId,
        cancel: &CancellationToken,
    ) -> RunOutcome {
        self.run(automation, recipient, run_id, cancel, || {}).await
    }

    /// Like [`ExecutionEngine::execute`], calling `release` once the walk
    /// stops and before the outcome is recorded.
    ///
    /// A cancel that lands between the walk and `release` still records the
    /// run as cancelled, so a caller that stops accepting cancels in
    /// `release` never acknowledges one for a run recorded as finished.
    #[tracing::instrument(
        name = "run",
        skip_all,
        fields(run_id = %run_id, automation_id = %automation.id)
    )]
    pub async fn run(
        &self,
        automation: &Automation,
        recipient: &EmailAddress,
        run_id: TestRunId,
        cancel: &CancellationToken,
        release: impl FnOnce() + Send,
    ) -> RunOutcome {
        let mut outcome = self.walk(automation, recipient, cancel).await;
        release();
        if outcome != RunOutcome::NoStart && cancel.is_cancelled() {
            outcome = RunOutcome::Cancelled;
        }
        tracing::info!(?outcome, "run terminated");
        self.record(run_id, outcome).await;
        outcome
    }

    async fn walk(
        &self,
        automation: &Automation,
        recipient: &EmailAddress,
        cancel: &CancellationToken,
    ) -> RunOutcome {
        let graph = automation.graph();
        let Some(mut current) = graph.start() else {
            tracing::warn!("automation has no start step");
            return RunOutcome::NoStart;
        };

        let mut visited = 0;
        loop {
            if cancel.is_cancelled() {
                return RunOutcome::Cancelled;
            }
            if visited >= self.config.max_steps {
                tracing::warn!(max_steps = self.config.max_steps, "step limit reached");
                return RunOutcome::StepLimit;
            }
            visited += 1;
            tracing::debug!(step_id = %current.id, kind = current.data.name(), "visiting step");

            match &current.data {
                StepKind::End { .. } => return RunOutcome::ReachedEnd,
                StepKind::Start { .. } => {}
                StepKind::Action { message, .. } => {
                    let body = message.as_deref().unwrap_or_default();
                    if let Err(err) = self
                        .mailer
                        .send(recipient, &self.config.subject, body)
                        .await
                    {
                        tracing::warn!(step_id = %current.id, error = ?err, "failed to send email");
                    }
                }
                StepKind::Delay(spec) => {
                    let wait = spec.duration(time::now());
                    tracing::debug!(step_id = %current.id, wait_ms = wait.as_millis(), "delaying");
                    tokio::select! {
                        () = cancel.cancelled() => return RunOutcome::Cancelled,
                        () = tokio::time::sleep(wait) => {}
                    }
                }
                StepKind::Condition { rules, .. } => {
                    let context = MessageContext::sample_for(recipient);
                    let rules = rules.as_deref().unwrap_or_default();
                    let result = condition::evaluate(rules, &context);
                    tracing::debug!(step_id = %current.id, result, "condition evaluated");
                    match graph.next_conditional_step(&current.id, result) {
                        Some(next) => {
                            current = next;
                            continue;
                        }
                        None => return RunOutcome::DeadEnd,
                    }
                }
            }

            match graph.next_step(&current.id) {
                Some(next) => current = next,
                None => return RunOutcome::DeadEnd,
            }
        }
    }

    async fn record(&self, run_id: TestRunId, outcome: RunOutcome) {
        let now = time::now();
        let result = match outcome {
            RunOutcome::NoStart => return,
            RunOutcome::Cancelled => self.tracker.mark_cancelled(run_id, now).await,
            RunOutcome::ReachedEnd | RunOutcome::DeadEnd | RunOutcome::StepLimit => {
                self.tracker.mark_finished(run_id, now).await
            }
        };
        if let Err(err) = result {
            tracing::error!(error = ?err, "failed to record run outcome");
        }
    }
}
