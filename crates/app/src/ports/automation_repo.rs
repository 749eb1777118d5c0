//! Automation repository port — persistence for automations.

use std::future::Future;
use std::sync::Arc;

use flowmail_domain::automation::Automation;
use flowmail_domain::error::FlowMailError;
use flowmail_domain::id::AutomationId;

/// Repository for persisting and querying [`Automation`]s.
pub trait AutomationRepository {
    /// Create a new automation in storage.
    fn create(
        &self,
        automation: Automation,
    ) -> impl Future<Output = Result<Automation, FlowMailError>> + Send;

    /// Get an automation by its unique identifier.
    fn get_by_id(
        &self,
        id: AutomationId,
    ) -> impl Future<Output = Result<Option<Automation>, FlowMailError>> + Send;

    /// Get all automations, newest first.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Automation>, FlowMailError>> + Send;

    /// Find an automation whose name equals `name`, ignoring case.
    fn find_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Automation>, FlowMailError>> + Send;

    /// Update an existing automation.
    fn update(
        &self,
        automation: Automation,
    ) -> impl Future<Output = Result<Automation, FlowMailError>> + Send;

    /// Delete an automation by its unique identifier.
    fn delete(&self, id: AutomationId) -> impl Future<Output = Result<(), FlowMailError>> + Send;
}

impl<T: AutomationRepository + Send + Sync> AutomationRepository for Arc<T> {
    fn create(
        &self,
        automation: Automation,
    ) -> impl Future<Output = Result<Automation, FlowMailError>> + Send {
        (**self).create(automation)
    }

    fn get_by_id(
        &self,
        id: AutomationId,
    ) -> impl Future<Output = Result<Option<Automation>, FlowMailError>> + Send {
        (**self).get_by_id(id)
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Automation>, FlowMailError>> + Send {
        (**self).get_all()
    }

    fn find_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Automation>, FlowMailError>> + Send {
        (**self).find_by_name(name)
    }

    fn update(
        &self,
        automation: Automation,
    ) -> impl Future<Output = Result<Automation, FlowMailError>> + Send {
        (**self).update(automation)
    }

    fn delete(&self, id: AutomationId) -> impl Future<Output = Result<(), FlowMailError>> + Send {
        (**self).delete(id)
    }
}
