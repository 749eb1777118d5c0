//! Delay calculation for `delay` steps.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Number;

use super::Extra;
use crate::time::{self, Timestamp};

const MINUTE_MS: u64 = 60 * 1000;
const HOUR_MS: u64 = 60 * MINUTE_MS;
const DAY_MS: u64 = 24 * HOUR_MS;

/// How long a `delay` step suspends the run.
///
/// The editor keeps the fields of both modes while the user toggles
/// between them, so all of them are stored and `mode` picks the ones that
/// count at run time. Every field is optional on the wire: an incomplete
/// spec, or one without a known mode, waits zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelaySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<DelayMode>,
    /// Target as submitted by the client; parsed at run time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_value: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_unit: Option<TimeUnit>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Which half of a [`DelaySpec`] applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayMode {
    /// Wait until a wall-clock time.
    Absolute,
    /// Wait for a fixed amount of time.
    Relative,
    /// Unrecognised mode, kept as sent.
    #[serde(untagged)]
    Other(String),
}

/// Unit of a relative delay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Minutes,
    Hours,
    Days,
    /// Anything the editor sent that is not one of the above, kept as sent.
    #[serde(untagged)]
    Other(String),
}

impl TimeUnit {
    /// Milliseconds in one unit; zero for [`TimeUnit::Other`].
    #[must_use]
    pub fn millis(&self) -> u64 {
        match self {
            Self::Minutes => MINUTE_MS,
            Self::Hours => HOUR_MS,
            Self::Days => DAY_MS,
            Self::Other(_) => 0,
        }
    }
}

impl DelaySpec {
    /// Build a relative delay.
    #[must_use]
    pub fn relative(value: i64, unit: TimeUnit) -> Self {
        Self {
            mode: Some(DelayMode::Relative),
            relative_value: Some(Number::from(value)),
            relative_unit: Some(unit),
            ..Self::default()
        }
    }

    /// Build an absolute delay targeting `at`.
    #[must_use]
    pub fn absolute(at: Timestamp) -> Self {
        Self {
            mode: Some(DelayMode::Absolute),
            absolute_date_time: Some(at.to_rfc3339()),
            ..Self::default()
        }
    }

    /// Wait in milliseconds as seen from `now`. Never negative.
    #[must_use]
    pub fn millis(&self, now: Timestamp) -> u64 {
        match self.mode {
            Some(DelayMode::Absolute) => self.absolute_millis(now),
            Some(DelayMode::Relative) => self.relative_millis(),
            Some(DelayMode::Other(_)) | None => 0,
        }
    }

    /// Same as [`DelaySpec::millis`], as a [`Duration`].
    #[must_use]
    pub fn duration(&self, now: Timestamp) -> Duration {
        Duration::from_millis(self.millis(now))
    }

    fn absolute_millis(&self, now: Timestamp) -> u64 {
        self.absolute_date_time
            .as_deref()
            .and_then(time::parse_client_timestamp)
            .map_or(0, |target| {
                let ms = (target - now).num_milliseconds();
                u64::try_from(ms).unwrap_or(0)
            })
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    fn relative_millis(&self) -> u64 {
        let (Some(value), Some(unit)) = (&self.relative_value, &self.relative_unit) else {
            return 0;
        };
        if let Some(whole) = value.as_u64() {
            return whole.saturating_mul(unit.millis());
        }
        // Fractions and negatives; `as` saturates.
        match value.as_f64() {
            Some(amount) if amount > 0.0 => (amount * unit.millis() as f64) as u64,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone, Utc};

    fn fixed_now() -> Timestamp {
        Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap()
    }

    fn from_json(json: serde_json::Value) -> DelaySpec {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn should_multiply_relative_value_by_unit() {
        let now = fixed_now();
        assert_eq!(DelaySpec::relative(2, TimeUnit::Minutes).millis(now), 120_000);
        assert_eq!(DelaySpec::relative(3, TimeUnit::Hours).millis(now), 10_800_000);
        assert_eq!(DelaySpec::relative(1, TimeUnit::Days).millis(now), 86_400_000);
    }

    #[test]
    fn should_scale_fractional_relative_value() {
        let spec = from_json(
            serde_json::json!({"mode": "relative", "relativeValue": 1.5, "relativeUnit": "hours"}),
        );
        assert_eq!(spec.millis(fixed_now()), 5_400_000);
    }

    #[test]
    fn should_wait_zero_when_relative_fields_missing() {
        let now = fixed_now();
        let no_unit = from_json(serde_json::json!({"mode": "relative", "relativeValue": 5}));
        let no_value = from_json(serde_json::json!({"mode": "relative", "relativeUnit": "hours"}));
        assert_eq!(no_unit.millis(now), 0);
        assert_eq!(no_value.millis(now), 0);
    }

    #[test]
    fn should_wait_zero_for_unknown_unit() {
        let spec = from_json(
            serde_json::json!({"mode": "relative", "relativeValue": 4, "relativeUnit": "fortnights"}),
        );
        assert_eq!(spec.relative_unit, Some(TimeUnit::Other("fortnights".to_string())));
        assert_eq!(spec.millis(fixed_now()), 0);
    }

    #[test]
    fn should_wait_zero_without_mode_or_with_unknown_mode() {
        let now = fixed_now();
        let no_mode = from_json(serde_json::json!({"relativeValue": 4, "relativeUnit": "hours"}));
        assert_eq!(no_mode.mode, None);
        assert_eq!(no_mode.millis(now), 0);

        let odd_mode = from_json(
            serde_json::json!({"mode": "cron", "relativeValue": 4, "relativeUnit": "hours"}),
        );
        assert_eq!(odd_mode.mode, Some(DelayMode::Other("cron".to_string())));
        assert_eq!(odd_mode.millis(now), 0);
    }

    #[test]
    fn should_wait_zero_for_non_positive_relative_value() {
        let now = fixed_now();
        assert_eq!(DelaySpec::relative(0, TimeUnit::Days).millis(now), 0);
        assert_eq!(DelaySpec::relative(-3, TimeUnit::Days).millis(now), 0);
    }

    #[test]
    fn should_saturate_instead_of_overflowing() {
        let spec = DelaySpec::relative(i64::MAX, TimeUnit::Days);
        assert_eq!(spec.millis(fixed_now()), u64::MAX);
    }

    #[test]
    fn should_wait_until_absolute_target() {
        let now = fixed_now();
        let spec = DelaySpec::absolute(now + TimeDelta::seconds(90));
        assert_eq!(spec.millis(now), 90_000);
        assert_eq!(spec.duration(now), Duration::from_secs(90));
    }

    #[test]
    fn should_wait_zero_when_absolute_target_in_past() {
        let now = fixed_now();
        let spec = DelaySpec::absolute(now - TimeDelta::hours(1));
        assert_eq!(spec.millis(now), 0);
    }

    #[test]
    fn should_wait_zero_when_absolute_target_missing_or_unparseable() {
        let now = fixed_now();
        assert_eq!(from_json(serde_json::json!({"mode": "absolute"})).millis(now), 0);
        assert_eq!(
            from_json(serde_json::json!({"mode": "absolute", "absoluteDateTime": "soon"}))
                .millis(now),
            0
        );
    }

    #[test]
    fn should_use_only_the_fields_of_the_selected_mode() {
        let now = fixed_now();
        let spec = from_json(serde_json::json!({
            "mode": "absolute",
            "absoluteDateTime": "2030-01-01T12:01:00Z",
            "relativeValue": 3,
            "relativeUnit": "days"
        }));
        assert_eq!(spec.millis(now), 60_000);
    }

    #[test]
    fn should_not_increase_as_now_advances() {
        let target = fixed_now() + TimeDelta::minutes(10);
        let spec = DelaySpec::absolute(target);
        let mut previous = u64::MAX;
        for minutes in 0..15 {
            let now = fixed_now() + TimeDelta::minutes(minutes);
            let wait = spec.millis(now);
            assert!(wait <= previous);
            previous = wait;
        }
        assert_eq!(previous, 0);
    }

    #[test]
    fn should_return_same_result_for_same_inputs() {
        let now = fixed_now();
        let spec = DelaySpec::absolute(now + TimeDelta::minutes(3));
        assert_eq!(spec.millis(now), spec.millis(now));
    }

    #[test]
    fn should_keep_wire_names_when_serialized() {
        let json = serde_json::to_value(DelaySpec::relative(1, TimeUnit::Hours)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"mode": "relative", "relativeValue": 1, "relativeUnit": "hours"})
        );
    }

    #[test]
    fn should_keep_inactive_mode_fields_and_unknown_keys() {
        let json = serde_json::json!({
            "mode": "absolute",
            "absoluteDateTime": "2030-05-01T09:00",
            "relativeValue": 2,
            "relativeUnit": "weeks",
            "label": "Wait a bit"
        });
        let spec = from_json(json.clone());
        assert_eq!(serde_json::to_value(&spec).unwrap(), json);
    }
}
