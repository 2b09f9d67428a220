//! Session log: one entry per completed run, newest first, bounded.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::events::RunSummary;
use crate::format::{date_iso, display_time};

/// Maximum number of entries kept.
pub const HISTORY_LIMIT: usize = 20;

/// Title used when the run had no first step to name it after.
pub const FALLBACK_TITLE: &str = "ステップタイマー";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub title: String,
    pub total_steps: u64,
    pub total_seconds: u64,
    /// Display timestamp, `YYYY/MM/DD HH:MM`.
    pub time: String,
    #[serde(rename = "dateISO")]
    pub date_iso: String,
    pub memo: String,
}

impl LogEntry {
    /// Build an entry for a finished run. The memo starts empty.
    pub fn from_summary<Tz: TimeZone>(summary: &RunSummary, now: &DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let title = summary
            .title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(FALLBACK_TITLE);
        Self {
            title: title.to_string(),
            total_steps: summary.total_steps as u64,
            total_seconds: summary.total_seconds,
            time: display_time(now),
            date_iso: date_iso(now),
            memo: String::new(),
        }
    }

    pub fn with_memo(mut self, memo: Option<&str>) -> Self {
        self.memo = memo.map(str::trim).unwrap_or_default().to_string();
        self
    }

    /// Lenient decode of a stored entry. Non-objects are rejected; missing or
    /// non-numeric totals count as zero and missing strings as empty.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        let obj = value.as_object()?;
        let text = |key: &str| {
            obj.get(key)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };
        let count = |key: &str| {
            obj.get(key)
                .and_then(crate::routine::numeric)
                .filter(|n| *n > 0.0)
                .map(|n| n.floor() as u64)
                .unwrap_or(0)
        };
        let title = text("title");
        Some(Self {
            title: if title.is_empty() {
                FALLBACK_TITLE.to_string()
            } else {
                title
            },
            total_steps: count("totalSteps"),
            total_seconds: count("totalSeconds"),
            time: text("time"),
            date_iso: text("dateISO"),
            memo: text("memo"),
        })
    }
}

/// Aggregate of today's entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodayTotal {
    pub seconds: u64,
    pub sessions: usize,
}

impl TodayTotal {
    pub fn is_empty(&self) -> bool {
        self.sessions == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionLog {
    entries: Vec<LogEntry>,
}

impl SessionLog {
    /// Wrap loaded entries, keeping only the newest [`HISTORY_LIMIT`].
    pub fn new(mut entries: Vec<LogEntry>) -> Self {
        entries.truncate(HISTORY_LIMIT);
        Self { entries }
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prepend `entry`, discarding anything past the limit.
    pub fn push(&mut self, entry: LogEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_LIMIT);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn today_total(&self, today_iso: &str) -> TodayTotal {
        self.entries
            .iter()
            .filter(|e| e.date_iso == today_iso)
            .fold(TodayTotal::default(), |acc, e| TodayTotal {
                seconds: acc.seconds.saturating_add(e.total_seconds),
                sessions: acc.sessions + 1,
            })
    }
}
