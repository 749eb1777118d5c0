//! Read-only lookup view over an automation's steps and connections.

use std::collections::HashMap;

use super::connection::{Branch, Connection};
use super::step::{Step, StepKind};

/// Indexed view of a step/connection snapshot.
///
/// Built once per run; every lookup is proportional to the out-degree of
/// the step asked about. Dangling connections resolve to `None`.
pub struct Graph<'a> {
    steps: &'a [Step],
    by_id: HashMap<&'a str, &'a Step>,
    outgoing: HashMap<&'a str, Vec<&'a Connection>>,
}

impl<'a> Graph<'a> {
    #[must_use]
    pub fn new(steps: &'a [Step], edges: &'a [Connection]) -> Self {
        let mut by_id = HashMap::with_capacity(steps.len());
        for step in steps {
            // First occurrence wins if ids collide.
            by_id.entry(step.id.as_str()).or_insert(step);
        }
        let mut outgoing: HashMap<&str, Vec<&Connection>> = HashMap::new();
        for edge in edges {
            outgoing.entry(edge.source.as_str()).or_default().push(edge);
        }
        Self {
            steps,
            by_id,
            outgoing,
        }
    }

    /// The first step of kind `start`, in node order.
    #[must_use]
    pub fn start(&self) -> Option<&'a Step> {
        self.steps
            .iter()
            .find(|step| matches!(step.data, StepKind::Start { .. }))
    }

    #[must_use]
    pub fn step(&self, id: &str) -> Option<&'a Step> {
        self.by_id.get(id).copied()
    }

    /// Target of the first connection leaving `from`.
    #[must_use]
    pub fn next_step(&self, from: &str) -> Option<&'a Step> {
        let edge = self.edges_from(from).first()?;
        self.step(&edge.target)
    }

    /// Target of the connection leaving condition step `from` for `result`.
    ///
    /// An edge tagged with the matching branch always wins. Failing that, a
    /// `true` result follows the untagged edge when it is the only one; a
    /// `false` result never follows an untagged edge.
    #[must_use]
    pub fn next_conditional_step(&self, from: &str, result: bool) -> Option<&'a Step> {
        let edges = self.edges_from(from);
        let wanted = Branch::for_result(result);
        if let Some(edge) = edges.iter().find(|edge| edge.branch() == wanted) {
            return self.step(&edge.target);
        }
        if !result {
            return None;
        }
        let mut defaults = edges.iter().filter(|edge| edge.branch() == Branch::Default);
        match (defaults.next(), defaults.next()) {
            (Some(edge), None) => self.step(&edge.target),
            _ => None,
        }
    }

    fn edges_from(&self, from: &str) -> &[&'a Connection] {
        self.outgoing.get(from).map(Vec::as_slice).unwrap_or_default()
    }
}
