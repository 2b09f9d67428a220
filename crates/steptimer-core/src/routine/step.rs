use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One named, timed unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    /// Duration in whole seconds, within `1..=MAX_STEP_SECONDS`.
    pub seconds: u64,
}

/// Longest accepted step: one day.
pub const MAX_STEP_SECONDS: u64 = 24 * 60 * 60;

impl Step {
    /// Validate user input and build a step.
    ///
    /// The name is trimmed and must be non-empty. The duration must be a
    /// finite number above zero and at most [`MAX_STEP_SECONDS`]; it is
    /// floored and clamped to at least 1.
    pub fn new(name: &str, seconds: f64) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyStepName);
        }
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(ValidationError::InvalidDuration(seconds.to_string()));
        }
        if seconds.floor() > MAX_STEP_SECONDS as f64 {
            return Err(ValidationError::DurationTooLong {
                got: seconds.to_string(),
                max: MAX_STEP_SECONDS,
            });
        }
        Ok(Self {
            name: name.to_string(),
            seconds: clamp_seconds(seconds),
        })
    }

    /// Like [`Step::new`] but takes the duration as typed text.
    pub fn parse(name: &str, seconds: &str) -> Result<Self, ValidationError> {
        let value: f64 = seconds
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidDuration(seconds.to_string()))?;
        Self::new(name, value)
    }

    /// Lenient decode of a stored step. Returns `None` for entries without a
    /// string name or with a non-numeric duration.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        let name = value.get("name")?.as_str()?;
        let seconds = numeric(value.get("seconds")?)?;
        Some(Self {
            name: name.to_string(),
            seconds: clamp_seconds(seconds),
        })
    }
}

/// Floor, then clamp into `1..=MAX_STEP_SECONDS`.
pub fn clamp_seconds(seconds: f64) -> u64 {
    if seconds.is_nan() || seconds < 1.0 {
        return 1;
    }
    if seconds >= MAX_STEP_SECONDS as f64 {
        return MAX_STEP_SECONDS;
    }
    seconds.floor() as u64
}

/// Total seconds over a sequence of steps. Saturates instead of wrapping.
pub fn total_seconds(steps: &[Step]) -> u64 {
    steps.iter().fold(0u64, |acc, s| acc.saturating_add(s.seconds))
}

/// Numbers and numeric strings, as stored data may contain either.
pub(crate) fn numeric(value: &serde_json::Value) -> Option<f64> {
    let n = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_trims_and_floors() {
        let step = Step::new("  Squats ", 45.9).unwrap();
        assert_eq!(step.name, "Squats");
        assert_eq!(step.seconds, 45);
    }

    #[test]
    fn new_clamps_fraction_below_one() {
        assert_eq!(Step::new("blink", 0.4).unwrap().seconds, 1);
    }

    #[test]
    fn new_rejects_bad_input() {
        assert_eq!(Step::new("   ", 10.0), Err(ValidationError::EmptyStepName));
        assert!(matches!(
            Step::new("x", 0.0),
            Err(ValidationError::InvalidDuration(_))
        ));
        assert!(matches!(
            Step::new("x", -3.0),
            Err(ValidationError::InvalidDuration(_))
        ));
        assert!(matches!(
            Step::new("x", f64::NAN),
            Err(ValidationError::InvalidDuration(_))
        ));
    }

    #[test]
    fn parse_rejects_non_numeric() {
        assert!(matches!(
            Step::parse("x", "abc"),
            Err(ValidationError::InvalidDuration(s)) if s == "abc"
        ));
        assert_eq!(Step::parse("x", " 90 ").unwrap().seconds, 90);
    }

    #[test]
    fn from_value_filters_and_clamps() {
        assert_eq!(
            Step::from_value(&json!({"name": "a", "seconds": 0})),
            Some(Step { name: "a".into(), seconds: 1 })
        );
        assert_eq!(
            Step::from_value(&json!({"name": "a", "seconds": "30.5"})),
            Some(Step { name: "a".into(), seconds: 30 })
        );
        assert_eq!(Step::from_value(&json!({"seconds": 10})), None);
        assert_eq!(Step::from_value(&json!({"name": "a", "seconds": "ten"})), None);
        assert_eq!(Step::from_value(&json!({"name": 3, "seconds": 10})), None);
        assert_eq!(Step::from_value(&json!(null)), None);
    }

    #[test]
    fn new_accepts_up_to_one_day() {
        assert_eq!(Step::new("x", 86_400.0).unwrap().seconds, MAX_STEP_SECONDS);
        assert_eq!(Step::new("x", 86_400.9).unwrap().seconds, MAX_STEP_SECONDS);
        assert!(matches!(
            Step::new("x", 86_401.0),
            Err(ValidationError::DurationTooLong { max: MAX_STEP_SECONDS, .. })
        ));
        assert!(matches!(
            Step::parse("x", "1e19"),
            Err(ValidationError::DurationTooLong { .. })
        ));
        assert!(matches!(
            Step::new("x", f64::INFINITY),
            Err(ValidationError::InvalidDuration(_))
        ));
    }

    #[test]
    fn stored_huge_durations_are_clamped() {
        assert_eq!(
            Step::from_value(&json!({"name": "a", "seconds": 1e19})),
            Some(Step { name: "a".into(), seconds: MAX_STEP_SECONDS })
        );
        assert_eq!(
            Step::from_value(&json!({"name": "a", "seconds": "18446744073709551615"})),
            Some(Step { name: "a".into(), seconds: MAX_STEP_SECONDS })
        );
        assert_eq!(clamp_seconds(f64::INFINITY), MAX_STEP_SECONDS);
    }

    #[test]
    fn total_saturates() {
        let huge = Step { name: "a".into(), seconds: u64::MAX };
        assert_eq!(total_seconds(&[huge.clone(), huge]), u64::MAX);
    }
}
