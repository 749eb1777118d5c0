//! Automation — a named email workflow graph.
//!
//! An automation is an ordered list of [`Step`]s joined by directed
//! [`Connection`]s. Execution starts at the `start` step and walks edges
//! until it reaches `end` or runs out of edges. The payload of each step
//! is a [`StepKind`]; the pure helpers used while walking live in
//! [`condition`], [`delay`], and [`graph`].

pub mod condition;
pub mod connection;
pub mod delay;
pub mod graph;
pub mod step;

pub use condition::{Field, JoinType, MessageContext, Operator, Rule};
pub use connection::{Branch, Connection};
pub use delay::{DelayMode, DelaySpec, TimeUnit};
pub use graph::Graph;
pub use step::{Position, Step, StepKind};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{FlowMailError, ValidationError};
use crate::id::AutomationId;
use crate::time::Timestamp;

/// Editor keys the model does not interpret, kept verbatim for round-trips.
pub type Extra = serde_json::Map<String, serde_json::Value>;

/// Longest accepted automation name, in characters.
pub const MAX_NAME_LEN: usize = 100;

/// A persisted workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Automation {
    pub id: AutomationId,
    pub name: String,
    pub nodes: Vec<Step>,
    pub edges: Vec<Connection>,
    pub created_at: Timestamp,
}

impl Automation {
    /// Create a builder for constructing an [`Automation`].
    #[must_use]
    pub fn builder() -> AutomationBuilder {
        AutomationBuilder::default()
    }

    /// Borrow the graph for lookups.
    #[must_use]
    pub fn graph(&self) -> Graph<'_> {
        Graph::new(&self.nodes, &self.edges)
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`FlowMailError::Validation`] when:
    /// - `name` is blank ([`ValidationError::EmptyName`])
    /// - `name` is longer than [`MAX_NAME_LEN`] ([`ValidationError::NameTooLong`])
    /// - two steps share an id ([`ValidationError::DuplicateStepId`])
    pub fn validate(&self) -> Result<(), FlowMailError> {
        validate_name(&self.name)?;
        let mut seen = HashSet::with_capacity(self.nodes.len());
        for step in &self.nodes {
            if !seen.insert(step.id.as_str()) {
                return Err(ValidationError::DuplicateStepId(step.id.clone()).into());
            }
        }
        Ok(())
    }
}

/// Trim `name` and check it is usable as an automation name.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyName`] or [`ValidationError::NameTooLong`].
pub fn normalize_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    validate_name(trimmed)?;
    Ok(trimmed.to_string())
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong { max: MAX_NAME_LEN });
    }
    Ok(())
}

/// Step-by-step builder for [`Automation`].
#[derive(Debug, Default)]
pub struct AutomationBuilder {
    id: Option<AutomationId>,
    name: Option<String>,
    nodes: Vec<Step>,
    edges: Vec<Connection>,
    created_at: Option<Timestamp>,
}

impl AutomationBuilder {
    #[must_use]
    pub fn id(mut self, id: AutomationId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.nodes.push(step);
        self
    }

    #[must_use]
    pub fn steps(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.nodes.extend(steps);
        self
    }

    #[must_use]
    pub fn connection(mut self, connection: Connection) -> Self {
        self.edges.push(connection);
        self
    }

    #[must_use]
    pub fn connections(mut self, connections: impl IntoIterator<Item = Connection>) -> Self {
        self.edges.extend(connections);
        self
    }

    #[must_use]
    pub fn created_at(mut self, ts: Timestamp) -> Self {
        self.created_at = Some(ts);
        self
    }

    /// Consume the builder, trim the name, validate, and return an [`Automation`].
    ///
    /// # Errors
    ///
    /// Returns [`FlowMailError::Validation`] if the name is unusable or step ids collide.
    pub fn build(self) -> Result<Automation, FlowMailError> {
        let automation = Automation {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default().trim().to_string(),
            nodes: self.nodes,
            edges: self.edges,
            created_at: self.created_at.unwrap_or_else(crate::time::now),
        };
        automation.validate()?;
        Ok(automation)
    }
}
