//! Connection — a directed edge between two steps.

use serde::{Deserialize, Serialize};

use super::Extra;

/// An edge from `source` to `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Editor-assigned key, carried for round-tripping only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub source: String,
    pub target: String,
    /// Editor edge style (e.g. `smoothstep`), carried for round-tripping only.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    /// Output handle on a condition step. `"true"` / `"false"` select a
    /// branch; anything else (or nothing) is a default edge.
    #[serde(
        rename = "sourceHandle",
        alias = "branch",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub branch: Option<String>,
    /// Presentation keys such as `animated` and `targetHandle`.
    #[serde(flatten)]
    pub extra: Extra,
}

/// Interpretation of [`Connection::branch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    True,
    False,
    /// Untagged or tagged with an unrecognised handle.
    Default,
}

impl Branch {
    /// The explicit branch a condition result selects.
    #[must_use]
    pub fn for_result(result: bool) -> Self {
        if result { Self::True } else { Self::False }
    }
}

impl Connection {
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: None,
            source: source.into(),
            target: target.into(),
            style: None,
            branch: None,
            extra: Extra::new(),
        }
    }

    /// Tag this edge as the output for a condition result.
    #[must_use]
    pub fn on(mut self, result: bool) -> Self {
        self.branch = Some(result.to_string());
        self
    }

    #[must_use]
    pub fn branch(&self) -> Branch {
        match self.branch.as_deref() {
            Some("true") => Branch::True,
            Some("false") => Branch::False,
            _ => Branch::Default,
        }
    }
}
