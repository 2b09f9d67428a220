//! Typed persistence for the four application records.
//!
//! Loads never fail: a missing, unreadable or malformed record is logged and
//! replaced by its default. Saves log failures and return normally so the
//! in-memory state stays authoritative for the rest of the session.

use serde::Serialize;

use super::database::Database;
use crate::history::{LogEntry, SessionLog};
use crate::routine::{Preset, PresetBook, RepeatCount, Step};

pub const KEY_STEPS: &str = "steps_v1";
pub const KEY_PRESETS: &str = "presets_v1";
pub const KEY_LOGS: &str = "logs_v1";
pub const KEY_REPEAT: &str = "repeat_count_v1";

enum Record {
    Missing,
    Present(serde_json::Value),
    Unreadable,
}

pub struct Store {
    db: Database,
}

impl Store {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn load_steps(&self) -> Vec<Step> {
        match self.read(KEY_STEPS) {
            Record::Present(value) => filter_array(KEY_STEPS, &value, Step::from_value),
            Record::Missing | Record::Unreadable => Vec::new(),
        }
    }

    pub fn save_steps(&self, steps: &[Step]) {
        self.write(KEY_STEPS, steps);
    }

    /// First run (no record at all) installs the built-in presets.
    pub fn load_presets(&self) -> PresetBook {
        match self.read(KEY_PRESETS) {
            Record::Missing => PresetBook::builtin(),
            Record::Present(value) => {
                PresetBook::new(filter_array(KEY_PRESETS, &value, Preset::from_value))
            }
            Record::Unreadable => PresetBook::default(),
        }
    }

    pub fn save_presets(&self, presets: &PresetBook) {
        self.write(KEY_PRESETS, presets);
    }

    pub fn load_logs(&self) -> SessionLog {
        match self.read(KEY_LOGS) {
            Record::Present(value) => {
                SessionLog::new(filter_array(KEY_LOGS, &value, LogEntry::from_value))
            }
            Record::Missing | Record::Unreadable => SessionLog::default(),
        }
    }

    pub fn save_logs(&self, logs: &SessionLog) {
        self.write(KEY_LOGS, logs);
    }

    pub fn load_repeat(&self) -> RepeatCount {
        match self.read(KEY_REPEAT) {
            Record::Present(value) => RepeatCount::from_value(&value),
            Record::Missing | Record::Unreadable => RepeatCount::default(),
        }
    }

    pub fn save_repeat(&self, repeat: RepeatCount) {
        self.write(KEY_REPEAT, &repeat);
    }

    fn read(&self, key: &str) -> Record {
        let raw = match self.db.kv_get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Record::Missing,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read record, using default");
                return Record::Unreadable;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Record::Present(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "stored record is not valid JSON, using default");
                Record::Unreadable
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to serialize record");
                return;
            }
        };
        if let Err(e) = self.db.kv_set(key, &json) {
            tracing::warn!(key, error = %e, "failed to save record");
        }
    }
}

fn filter_array<T>(
    key: &str,
    value: &serde_json::Value,
    decode: impl Fn(&serde_json::Value) -> Option<T>,
) -> Vec<T> {
    let Some(items) = value.as_array() else {
        tracing::warn!(key, "stored record is not an array, using default");
        return Vec::new();
    };
    let decoded: Vec<T> = items.iter().filter_map(decode).collect();
    if decoded.len() != items.len() {
        tracing::debug!(key, dropped = items.len() - decoded.len(), "dropped malformed entries");
    }
    decoded
}
