//! Condition — rule sets evaluated against an email.

use serde::{Deserialize, Serialize};

use super::Extra;
use crate::email::EmailAddress;

/// One comparison inside a `condition` step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Editor-assigned key, carried for round-tripping only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub field: Field,
    pub operator: Operator,
    /// Missing reads as the empty string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// How this rule combines with the result so far. Ignored on the first
    /// rule; anything but `AND` means OR.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_type: Option<JoinType>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Rule {
    #[must_use]
    pub fn new(field: Field, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            id: None,
            field,
            operator,
            value: Some(value.into()),
            join_type: Some(JoinType::And),
            extra: Extra::new(),
        }
    }

    #[must_use]
    pub fn join(mut self, join_type: JoinType) -> Self {
        self.join_type = Some(join_type);
        self
    }

    /// Whether this rule is ANDed onto the result so far.
    #[must_use]
    pub fn joins_with_and(&self) -> bool {
        matches!(self.join_type, Some(JoinType::And))
    }

    /// Compare this rule against `context`, ignoring case.
    #[must_use]
    pub fn matches(&self, context: &MessageContext) -> bool {
        let actual = context.field(&self.field).to_lowercase();
        let expected = self.value.as_deref().unwrap_or_default().to_lowercase();
        match self.operator {
            Operator::Equals => actual == expected,
            Operator::NotEquals => actual != expected,
            Operator::Includes => actual.contains(&expected),
            Operator::StartsWith => actual.starts_with(&expected),
            Operator::EndsWith => actual.ends_with(&expected),
            Operator::Other(_) => false,
        }
    }
}

/// Email header or body a rule inspects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Subject,
    From,
    To,
    Body,
    Cc,
    Bcc,
    /// Unrecognised field, kept as sent; always reads as the empty string.
    #[serde(untagged)]
    Other(String),
}

/// String comparison applied by a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    NotEquals,
    Includes,
    StartsWith,
    EndsWith,
    /// Unrecognised operator, kept as sent; never matches.
    #[serde(untagged)]
    Other(String),
}

/// Boolean connective between a rule and the running result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinType {
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
    /// Unrecognised connective, kept as sent; combines as OR.
    #[serde(untagged)]
    Other(String),
}

/// The message a condition is evaluated against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContext {
    pub subject: String,
    pub from: String,
    pub to: String,
    pub body: String,
    pub cc: String,
    pub bcc: String,
}

impl MessageContext {
    /// A reproducible stand-in message for test runs.
    ///
    /// The subject keyword is `urgent` or `sale` when the recipient address
    /// contains that word (`urgent` wins), otherwise `test`.
    #[must_use]
    pub fn sample_for(recipient: &EmailAddress) -> Self {
        let address = recipient.as_str();
        let keyword = if address.contains("urgent") {
            "urgent"
        } else if address.contains("sale") {
            "sale"
        } else {
            "test"
        };
        Self {
            subject: format!("Test Subject with {keyword} keyword"),
            from: address.to_string(),
            to: "user@example.com".to_string(),
            body: "This is a test email body to check conditions".to_string(),
            cc: String::new(),
            bcc: String::new(),
        }
    }

    #[must_use]
    pub fn field(&self, field: &Field) -> &str {
        match field {
            Field::Subject => &self.subject,
            Field::From => &self.from,
            Field::To => &self.to,
            Field::Body => &self.body,
            Field::Cc => &self.cc,
            Field::Bcc => &self.bcc,
            Field::Other(_) => "",
        }
    }
}

/// Evaluate `rules` against `context`.
///
/// Folds strictly left to right: the first rule seeds the result, and each
/// later rule combines with the result so far using its own join type.
/// There is no AND-over-OR precedence. An empty rule set is `false`.
#[must_use]
pub fn evaluate(rules: &[Rule], context: &MessageContext) -> bool {
    let Some((first, rest)) = rules.split_first() else {
        return false;
    };
    rest.iter()
        .fold(first.matches(context), |acc, rule| {
            if rule.joins_with_and() {
                acc && rule.matches(context)
            } else {
                acc || rule.matches(context)
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> MessageContext {
        MessageContext {
            subject: "Big SALE today".to_string(),
            from: "Shop@Example.com".to_string(),
            to: "user@example.com".to_string(),
            body: "Hello there".to_string(),
            cc: String::new(),
            bcc: String::new(),
        }
    }

    fn always_true() -> Rule {
        Rule::new(Field::To, Operator::Equals, "user@example.com")
    }

    fn always_false() -> Rule {
        Rule::new(Field::To, Operator::Equals, "nobody@example.com")
    }

    #[test]
    fn should_return_false_for_empty_rule_set() {
        assert!(!evaluate(&[], &context()));
        assert!(!evaluate(&[], &MessageContext::default()));
    }

    #[test]
    fn should_compare_each_operator_case_insensitively() {
        let ctx = context();
        let cases = [
            (Field::Subject, Operator::Equals, "big sale TODAY", true),
            (Field::Subject, Operator::Equals, "big sale", false),
            (Field::From, Operator::NotEquals, "shop@example.com", false),
            (Field::From, Operator::NotEquals, "other@example.com", true),
            (Field::Subject, Operator::Includes, "sale", true),
            (Field::Subject, Operator::Includes, "urgent", false),
            (Field::From, Operator::StartsWith, "SHOP@", true),
            (Field::From, Operator::StartsWith, "example", false),
            (Field::From, Operator::EndsWith, "@EXAMPLE.COM", true),
            (Field::Body, Operator::EndsWith, "hello", false),
        ];
        for (field, operator, value, expected) in cases {
            let rule = Rule::new(field.clone(), operator.clone(), value);
            assert_eq!(
                evaluate(std::slice::from_ref(&rule), &ctx),
                expected,
                "{field:?} {operator:?} {value:?}"
            );
        }
    }

    #[test]
    fn should_read_empty_cc_and_bcc() {
        let ctx = context();
        assert!(evaluate(&[Rule::new(Field::Cc, Operator::Equals, "")], &ctx));
        assert!(evaluate(&[Rule::new(Field::Bcc, Operator::Equals, "")], &ctx));
    }

    #[test]
    fn should_treat_unknown_field_as_empty_string() {
        let json = serde_json::json!({"field": "reply_to", "operator": "equals", "value": ""});
        let rule: Rule = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(rule.field, Field::Other("reply_to".to_string()));
        assert_eq!(serde_json::to_value(&rule).unwrap(), json);
        assert!(evaluate(&[rule], &context()));
    }

    #[test]
    fn should_never_match_unknown_operator() {
        let json = serde_json::json!({"field": "subject", "operator": "matches_regex", "value": ".*"});
        let rule: Rule = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(rule.operator, Operator::Other("matches_regex".to_string()));
        assert_eq!(serde_json::to_value(&rule).unwrap(), json);
        assert!(!evaluate(&[rule], &context()));
    }

    #[test]
    fn should_read_missing_value_as_empty_string() {
        let json = serde_json::json!({"field": "cc", "operator": "equals"});
        let rule: Rule = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(rule.value, None);
        assert_eq!(serde_json::to_value(&rule).unwrap(), json);
        assert!(evaluate(&[rule], &context()));
    }

    #[test]
    fn should_combine_as_or_when_join_type_missing_or_unknown() {
        let ctx = context();
        let mut missing = always_true();
        missing.join_type = None;
        assert!(evaluate(&[always_false(), missing], &ctx));

        let odd: Rule = serde_json::from_value(serde_json::json!({
            "field": "to", "operator": "equals", "value": "user@example.com", "joinType": "XOR"
        }))
        .unwrap();
        assert_eq!(odd.join_type, Some(JoinType::Other("XOR".to_string())));
        assert!(evaluate(&[always_false(), odd], &ctx));

        // and neither ANDs: true with a false successor would be false
        let mut missing_false = always_false();
        missing_false.join_type = None;
        assert!(evaluate(&[always_true(), missing_false], &ctx));
    }

    #[test]
    fn should_fold_with_each_rules_own_join_type() {
        let ctx = context();
        // false OR true -> true
        assert!(evaluate(
            &[always_false(), always_true().join(JoinType::Or)],
            &ctx
        ));
        // true AND false -> false
        assert!(!evaluate(
            &[always_true(), always_false().join(JoinType::And)],
            &ctx
        ));
    }

    #[test]
    fn should_fold_left_to_right_without_and_precedence() {
        let ctx = context();
        // (true OR true) AND false == false, whereas true OR (true AND false) would be true.
        let rules = [
            always_true(),
            always_true().join(JoinType::Or),
            always_false().join(JoinType::And),
        ];
        assert!(!evaluate(&rules, &ctx));

        // (false AND true) OR true == true
        let rules = [
            always_false(),
            always_true().join(JoinType::And),
            always_true().join(JoinType::Or),
        ];
        assert!(evaluate(&rules, &ctx));
    }

    #[test]
    fn should_ignore_join_type_of_first_rule() {
        let ctx = context();
        assert!(evaluate(&[always_true().join(JoinType::And)], &ctx));
        assert!(!evaluate(&[always_false().join(JoinType::Or)], &ctx));
    }

    #[test]
    fn should_derive_urgent_sample_from_recipient() {
        let recipient = EmailAddress::parse("urgent.inbox@b.com").unwrap();
        let ctx = MessageContext::sample_for(&recipient);
        assert_eq!(ctx.subject, "Test Subject with urgent keyword");
        assert_eq!(ctx.from, "urgent.inbox@b.com");
        assert_eq!(ctx.to, "user@example.com");
        assert_eq!(ctx.body, "This is a test email body to check conditions");
        assert!(ctx.cc.is_empty() && ctx.bcc.is_empty());
    }

    #[test]
    fn should_prefer_urgent_over_sale_in_sample() {
        let recipient = EmailAddress::parse("sale-urgent@b.com").unwrap();
        let ctx = MessageContext::sample_for(&recipient);
        assert_eq!(ctx.subject, "Test Subject with urgent keyword");
    }

    #[test]
    fn should_derive_sale_and_default_samples() {
        let sale = EmailAddress::parse("sale@b.com").unwrap();
        let plain = EmailAddress::parse("a@b.com").unwrap();
        assert_eq!(
            MessageContext::sample_for(&sale).subject,
            "Test Subject with sale keyword"
        );
        assert_eq!(
            MessageContext::sample_for(&plain).subject,
            "Test Subject with test keyword"
        );
    }

    #[test]
    fn should_use_wire_names_for_join_type() {
        let json = serde_json::json!({
            "id": "r1", "field": "body", "operator": "includes", "value": "x", "joinType": "OR", "note": "kept"
        });
        let rule: Rule = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(rule.join_type, Some(JoinType::Or));
        assert_eq!(serde_json::to_value(&rule).unwrap(), json);
    }
}
