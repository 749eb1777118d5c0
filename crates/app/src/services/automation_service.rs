//! Automation service — use-cases for managing automations.

use flowmail_domain::automation::{self, Automation, Connection, Step};
use flowmail_domain::error::{FlowMailError, NotFoundError, ValidationError};
use flowmail_domain::id::AutomationId;

use crate::ports::AutomationRepository;

/// Input for [`AutomationService::create_automation`].
#[derive(Debug, Clone, Default)]
pub struct NewAutomation {
    pub name: String,
    pub nodes: Vec<Step>,
    pub edges: Vec<Connection>,
}

/// Partial update; `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct AutomationPatch {
    pub name: Option<String>,
    pub nodes: Option<Vec<Step>>,
    pub edges: Option<Vec<Connection>>,
}

/// Application service for automation CRUD operations.
pub struct AutomationService<R> {
    repo: R,
}

impl<R: AutomationRepository> AutomationService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Create a new automation after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`FlowMailError::Validation`] if invariants fail or the name
    /// is already taken, or a storage error propagated from the repository.
    #[tracing::instrument(skip(self, input), fields(automation_name = %input.name))]
    pub async fn create_automation(
        &self,
        input: NewAutomation,
    ) -> Result<Automation, FlowMailError> {
        let automation = Automation::builder()
            .name(input.name)
            .steps(input.nodes)
            .connections(input.edges)
            .build()?;
        self.ensure_name_free(&automation.name, None).await?;
        self.repo.create(automation).await
    }

    /// Look up an automation by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`FlowMailError::NotFound`] when no automation with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_automation(&self, id: AutomationId) -> Result<Automation, FlowMailError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// List all automations, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_automations(&self) -> Result<Vec<Automation>, FlowMailError> {
        self.repo.get_all().await
    }

    /// Apply `patch` to the stored automation.
    ///
    /// # Errors
    ///
    /// Returns [`FlowMailError::NotFound`] for an unknown id,
    /// [`FlowMailError::Validation`] if the result breaks an invariant or the
    /// new name belongs to another automation, or a storage error.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_automation(
        &self,
        id: AutomationId,
        patch: AutomationPatch,
    ) -> Result<Automation, FlowMailError> {
        let mut automation = self.get_automation(id).await?;
        if let Some(name) = patch.name {
            let name = automation::normalize_name(&name)?;
            self.ensure_name_free(&name, Some(id)).await?;
            automation.name = name;
        }
        if let Some(nodes) = patch.nodes {
            automation.nodes = nodes;
        }
        if let Some(edges) = patch.edges {
            automation.edges = edges;
        }
        automation.validate()?;
        self.repo.update(automation).await
    }

    /// Delete an automation by id.
    ///
    /// # Errors
    ///
    /// Returns [`FlowMailError::NotFound`] for an unknown id, or a storage
    /// error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_automation(&self, id: AutomationId) -> Result<(), FlowMailError> {
        self.get_automation(id).await?;
        self.repo.delete(id).await
    }

    async fn ensure_name_free(
        &self,
        name: &str,
        except: Option<AutomationId>,
    ) -> Result<(), FlowMailError> {
        match self.repo.find_by_name(name).await? {
            Some(existing) if Some(existing.id) != except => {
                Err(ValidationError::DuplicateName.into())
            }
            _ => Ok(()),
        }
    }
}

fn not_found(id: AutomationId) -> FlowMailError {
    NotFoundError {
        entity: "Automation",
        id: id.to_string(),
    }
    .into()
}
