//! Step — one typed node of an automation graph.

use serde::{Deserialize, Serialize};

use super::Extra;
use super::condition::Rule;
use super::delay::DelaySpec;

/// A node in the graph, as laid out by the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Unique within the owning automation.
    pub id: String,
    /// Editor renderer name (e.g. `actionNode`), stored but never interpreted.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub renderer: Option<String>,
    /// Editor canvas coordinates, stored but never interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// Kind-specific payload, tagged by `type`.
    pub data: StepKind,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Step {
    #[must_use]
    pub fn new(id: impl Into<String>, data: StepKind) -> Self {
        Self {
            id: id.into(),
            renderer: None,
            position: None,
            data,
            extra: Extra::new(),
        }
    }

    #[must_use]
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Position { x, y });
        self
    }
}

/// Canvas position of a step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// The payload of a step, one variant per step type.
///
/// Keys a variant does not model land in its `extra` map and are written
/// back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepKind {
    /// Entry point of the graph.
    Start {
        #[serde(flatten)]
        extra: Extra,
    },
    /// Normal termination point.
    End {
        #[serde(flatten)]
        extra: Extra,
    },
    /// Send one email to the run's recipient.
    Action {
        /// Missing reads as the empty string.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(flatten)]
        extra: Extra,
    },
    /// Suspend the run before continuing.
    Delay(DelaySpec),
    /// Branch on the outcome of a rule set.
    Condition {
        /// Missing reads as an empty rule set.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rules: Option<Vec<Rule>>,
        #[serde(flatten)]
        extra: Extra,
    },
}

impl StepKind {
    #[must_use]
    pub fn start() -> Self {
        Self::Start {
            extra: Extra::new(),
        }
    }

    #[must_use]
    pub fn end() -> Self {
        Self::End {
            extra: Extra::new(),
        }
    }

    #[must_use]
    pub fn action(message: impl Into<String>) -> Self {
        Self::Action {
            message: Some(message.into()),
            extra: Extra::new(),
        }
    }

    #[must_use]
    pub fn condition(rules: Vec<Rule>) -> Self {
        Self::Condition {
            rules: Some(rules),
            extra: Extra::new(),
        }
    }

    /// Short lowercase name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::End { .. } => "end",
            Self::Action { .. } => "action",
            Self::Delay(_) => "delay",
            Self::Condition { .. } => "condition",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::condition::{Field, JoinType, Operator};
    use crate::automation::delay::{DelayMode, TimeUnit};

    #[test]
    fn should_deserialize_editor_action_node() {
        let json = serde_json::json!({
            "id": "action-1",
            "position": {"x": 250.0, "y": 120.0},
            "data": {"type": "action", "message": "Welcome aboard"}
        });
        let step: Step = serde_json::from_value(json).unwrap();
        assert_eq!(step.id, "action-1");
        assert_eq!(step.position, Some(Position { x: 250.0, y: 120.0 }));
        assert_eq!(step.data, StepKind::action("Welcome aboard"));
    }

    #[test]
    fn should_tolerate_action_without_message() {
        let json = serde_json::json!({"id": "a", "data": {"type": "action"}});
        let step: Step = serde_json::from_value(json.clone()).unwrap();
        assert!(matches!(step.data, StepKind::Action { message: None, .. }));
        assert_eq!(serde_json::to_value(&step).unwrap(), json);
    }

    #[test]
    fn should_deserialize_relative_delay_node() {
        let json = serde_json::json!({
            "id": "delay-1",
            "data": {
                "type": "delay",
                "mode": "relative",
                "relativeValue": 2,
                "relativeUnit": "minutes"
            }
        });
        let step: Step = serde_json::from_value(json).unwrap();
        assert_eq!(
            step.data,
            StepKind::Delay(DelaySpec::relative(2, TimeUnit::Minutes))
        );
    }

    #[test]
    fn should_deserialize_absolute_delay_node() {
        let json = serde_json::json!({
            "id": "delay-2",
            "data": {
                "type": "delay",
                "mode": "absolute",
                "absoluteDateTime": "2030-05-01T09:00"
            }
        });
        let step: Step = serde_json::from_value(json).unwrap();
        let StepKind::Delay(spec) = step.data else {
            panic!("expected delay");
        };
        assert_eq!(spec.mode, Some(DelayMode::Absolute));
        assert_eq!(spec.absolute_date_time.as_deref(), Some("2030-05-01T09:00"));
    }

    #[test]
    fn should_accept_delay_node_without_mode() {
        let json = serde_json::json!({
            "id": "delay-3",
            "data": {"type": "delay", "relativeValue": 10, "relativeUnit": "minutes"}
        });
        let step: Step = serde_json::from_value(json.clone()).unwrap();
        let StepKind::Delay(spec) = &step.data else {
            panic!("expected delay");
        };
        assert_eq!(spec.mode, None);
        assert_eq!(serde_json::to_value(&step).unwrap(), json);
    }

    #[test]
    fn should_deserialize_condition_node_with_rules() {
        let json = serde_json::json!({
            "id": "cond-1",
            "data": {
                "type": "condition",
                "rules": [
                    {"id": "1", "field": "subject", "operator": "includes", "value": "urgent", "joinType": "AND"},
                    {"id": "2", "field": "from", "operator": "ends_with", "value": "@vip.com", "joinType": "OR"}
                ]
            }
        });
        let step: Step = serde_json::from_value(json).unwrap();
        let StepKind::Condition {
            rules: Some(rules), ..
        } = step.data
        else {
            panic!("expected condition with rules");
        };
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].field, Field::Subject);
        assert_eq!(rules[1].operator, Operator::EndsWith);
        assert_eq!(rules[1].join_type, Some(JoinType::Or));
    }

    #[test]
    fn should_deserialize_start_and_end_without_payload() {
        let start: Step =
            serde_json::from_value(serde_json::json!({"id": "start", "data": {"type": "start"}}))
                .unwrap();
        let end: Step =
            serde_json::from_value(serde_json::json!({"id": "end", "data": {"type": "end"}}))
                .unwrap();
        assert_eq!(start.data, StepKind::start());
        assert_eq!(end.data, StepKind::end());
    }

    #[test]
    fn should_reject_unknown_step_type() {
        let json = serde_json::json!({"id": "x", "data": {"type": "webhook"}});
        assert!(serde_json::from_value::<Step>(json).is_err());
    }

    #[test]
    fn should_omit_position_when_absent() {
        let step = Step::new("end", StepKind::end());
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json, serde_json::json!({"id": "end", "data": {"type": "end"}}));
    }

    #[test]
    fn should_keep_editor_renderer_name() {
        let json = serde_json::json!({"id": "a", "type": "actionNode", "data": {"type": "end"}});
        let step: Step = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(step.renderer.as_deref(), Some("actionNode"));
        assert_eq!(serde_json::to_value(&step).unwrap(), json);
    }

    #[test]
    fn should_write_back_unmodelled_node_and_payload_keys() {
        let json = serde_json::json!({
            "id": "action-1",
            "type": "actionNode",
            "position": {"x": 10.0, "y": 20.0},
            "width": 180,
            "selected": false,
            "data": {"type": "action", "message": "Hi", "label": "Send welcome"}
        });
        let step: Step = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(step.extra.get("width"), Some(&serde_json::json!(180)));
        assert_eq!(serde_json::to_value(&step).unwrap(), json);
    }
}
