use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::playback::Phase;

/// Identifies the playback context an asynchronous callback belongs to.
///
/// Handed out with every announcement request and countdown start. The
/// engine compares it against its current state when the callback comes
/// back and drops it silently if anything has changed since.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub generation: u64,
    pub index: usize,
}

/// Totals of a finished run, consumed by the session log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Name of the first run step, if any.
    pub title: Option<String>,
    pub total_steps: usize,
    pub total_seconds: u64,
}

/// Every playback state change produces one or more events.
///
/// Some of them are directives for the driver: `AnnouncementRequested`,
/// `SpeechCancelled`, `CountdownStarted` and `CountdownStopped` must be turned
/// into side effects, the rest only describe what happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    StepStarted {
        step_index: usize,
        step_name: String,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// Speak `text`; when `ticket` is present, report completion back with it.
    AnnouncementRequested {
        text: String,
        ticket: Option<Ticket>,
    },
    SpeechCancelled,
    CountdownStarted {
        ticket: Ticket,
    },
    CountdownStopped,
    Tick {
        step_index: usize,
        remaining_secs: u64,
    },
    TimerPaused {
        step_index: usize,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        step_index: usize,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerSkipped {
        from_step: usize,
        /// `None` when the skipped step was the last one.
        to_step: Option<usize>,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    RunCompleted {
        summary: RunSummary,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        step_index: Option<usize>,
        step_name: Option<String>,
        remaining_secs: u64,
        step_total_secs: u64,
        run_steps: usize,
        run_progress_pct: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Whether the event asks the driver for a side effect.
    pub fn is_directive(&self) -> bool {
        matches!(
            self,
            Event::AnnouncementRequested { .. }
                | Event::SpeechCancelled
                | Event::CountdownStarted { .. }
                | Event::CountdownStopped
        )
    }
}
