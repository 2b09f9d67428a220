use serde::{Deserialize, Serialize};

use super::step::Step;

/// How many times the step list is played back in one run. Always 1..=20.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i64", into = "u32")]
pub struct RepeatCount(u32);

impl RepeatCount {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 20;

    pub fn clamp(n: i64) -> Self {
        Self(n.clamp(Self::MIN as i64, Self::MAX as i64) as u32)
    }

    /// Parse typed input. Anything non-numeric falls back to 1.
    pub fn parse(input: &str) -> Self {
        match input.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Self::clamp(n.floor() as i64),
            _ => Self::default(),
        }
    }

    /// Lenient decode of a stored value.
    pub fn from_value(value: &serde_json::Value) -> Self {
        super::step::numeric(value)
            .map(|n| Self::clamp(n.floor() as i64))
            .unwrap_or_default()
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for RepeatCount {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl From<i64> for RepeatCount {
    fn from(n: i64) -> Self {
        Self::clamp(n)
    }
}

impl From<RepeatCount> for u32 {
    fn from(r: RepeatCount) -> Self {
        r.0
    }
}

impl std::fmt::Display for RepeatCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The run sequence: `steps` concatenated `repeat` times, in order.
pub fn expand(steps: &[Step], repeat: RepeatCount) -> Vec<Step> {
    let mut run = Vec::with_capacity(steps.len() * repeat.get() as usize);
    for _ in 0..repeat.get() {
        run.extend_from_slice(steps);
    }
    run
}
