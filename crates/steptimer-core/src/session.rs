//! Application controller.
//!
//! Owns the routine data, the playback engine and the store, and exposes the
//! user-facing actions. Every mutation of steps, presets, logs or repeat
//! count is written through to the store immediately.
//!
//! Destructive actions do not mutate anything on their own. They park a
//! [`Pending`] request and return [`Outcome::Confirm`]; the UI answers with
//! [`Session::confirm`] or [`Session::decline`]. Only one request is parked
//! at a time, and a new one replaces the old (a replaced memo request is
//! recorded with an empty memo so the run is not lost).

use chrono::Local;
use serde::Serialize;

use crate::error::{CoreError, Result, ValidationError};
use crate::events::{Event, Ticket};
use crate::history::{LogEntry, SessionLog, TodayTotal};
use crate::playback::PlaybackEngine;
use crate::routine::{PresetBook, RepeatCount, Step};
use crate::storage::Store;

/// An action waiting for the user's decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Pending {
    OverwritePreset { name: String },
    LoadPreset { id: String, name: String },
    DeletePreset { id: String, name: String },
    ClearLogs,
    /// A finished run waiting for an optional memo before it is logged.
    Memo { entry: LogEntry },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Applied. Carries playback events the driver must act on, if any.
    Done(Vec<Event>),
    /// Parked until [`Session::confirm`] or [`Session::decline`].
    Confirm(Pending),
    /// Nothing to do.
    Unchanged,
}

/// Persisted application data.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub steps: Vec<Step>,
    pub presets: PresetBook,
    pub logs: SessionLog,
    pub repeat: RepeatCount,
}

pub struct Session {
    state: AppState,
    engine: PlaybackEngine,
    store: Store,
    pending: Option<Pending>,
    ask_memo: bool,
}

impl Session {
    /// Load all records from `store` and prepare an idle engine.
    pub fn open(store: Store) -> Self {
        let state = AppState {
            steps: store.load_steps(),
            presets: store.load_presets(),
            logs: store.load_logs(),
            repeat: store.load_repeat(),
        };
        tracing::debug!(
            steps = state.steps.len(),
            presets = state.presets.len(),
            logs = state.logs.len(),
            repeat = state.repeat.get(),
            "session loaded"
        );
        let engine = PlaybackEngine::new(&state.steps, state.repeat);
        Self {
            state,
            engine,
            store,
            pending: None,
            ask_memo: true,
        }
    }

    /// Whether a finished run waits for a memo before it is logged.
    pub fn set_ask_memo(&mut self, ask: bool) {
        self.ask_memo = ask;
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn steps(&self) -> &[Step] {
        &self.state.steps
    }

    pub fn presets(&self) -> &PresetBook {
        &self.state.presets
    }

    pub fn logs(&self) -> &SessionLog {
        &self.state.logs
    }

    pub fn repeat(&self) -> RepeatCount {
        self.state.repeat
    }

    pub fn engine(&self) -> &PlaybackEngine {
        &self.engine
    }

    pub fn pending(&self) -> Option<&Pending> {
        self.pending.as_ref()
    }

    pub fn today_total(&self) -> TodayTotal {
        self.state.logs.today_total(&crate::format::today_iso())
    }

    // ── Steps ────────────────────────────────────────────────────────

    /// Append a step. Stops any active run, since the run sequence changes.
    pub fn add_step(&mut self, name: &str, seconds: &str) -> Result<Vec<Event>> {
        let step = Step::parse(name, seconds)?;
        let events = self.stop_for_rebuild();
        self.state.steps.push(step);
        self.store.save_steps(&self.state.steps);
        self.rebuild()?;
        Ok(events)
    }

    /// Remove the step at `index` (0-based). Stops any active run.
    pub fn delete_step(&mut self, index: usize) -> Result<Vec<Event>> {
        let len = self.state.steps.len();
        if index >= len {
            return Err(ValidationError::NoSuchStep {
                position: index + 1,
                len,
            }
            .into());
        }
        let events = self.stop_for_rebuild();
        self.state.steps.remove(index);
        self.store.save_steps(&self.state.steps);
        self.rebuild()?;
        Ok(events)
    }

    /// Set the repeat count from typed input, clamping to 1..=20.
    pub fn set_repeat(&mut self, input: &str) -> Result<(RepeatCount, Vec<Event>)> {
        let repeat = RepeatCount::parse(input);
        let events = self.stop_for_rebuild();
        self.state.repeat = repeat;
        self.store.save_repeat(repeat);
        self.rebuild()?;
        Ok((repeat, events))
    }

    // ── Presets ──────────────────────────────────────────────────────

    /// Save the current steps as a preset. Needs confirmation when a preset
    /// with the same name exists.
    pub fn save_preset(&mut self, name: &str) -> Result<Outcome> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyPresetName.into());
        }
        if self.state.steps.is_empty() {
            return Err(ValidationError::NoSteps.into());
        }
        if self.state.presets.find_by_name(name).is_some() {
            return Ok(self.park(Pending::OverwritePreset {
                name: name.to_string(),
            }));
        }
        self.state.presets.upsert(name, &self.state.steps);
        self.store.save_presets(&self.state.presets);
        Ok(Outcome::Done(Vec::new()))
    }

    /// Replace the current steps with a preset's, after confirmation.
    pub fn load_preset(&mut self, key: &str) -> Result<Outcome> {
        let preset = self
            .state
            .presets
            .resolve(key)
            .ok_or_else(|| ValidationError::NoSuchPreset(key.to_string()))?;
        let pending = Pending::LoadPreset {
            id: preset.id.clone(),
            name: preset.name.clone(),
        };
        Ok(self.park(pending))
    }

    pub fn delete_preset(&mut self, key: &str) -> Result<Outcome> {
        let preset = self
            .state
            .presets
            .resolve(key)
            .ok_or_else(|| ValidationError::NoSuchPreset(key.to_string()))?;
        let pending = Pending::DeletePreset {
            id: preset.id.clone(),
            name: preset.name.clone(),
        };
        Ok(self.park(pending))
    }

    // ── Logs ─────────────────────────────────────────────────────────

    pub fn clear_logs(&mut self) -> Outcome {
        if self.state.logs.is_empty() {
            return Outcome::Unchanged;
        }
        self.park(Pending::ClearLogs)
    }

    /// Log the finished run waiting for a memo. Returns `false` when no run
    /// was waiting.
    pub fn submit_memo(&mut self, memo: Option<&str>) -> bool {
        match self.pending.take() {
            Some(Pending::Memo { entry }) => {
                self.record(entry.with_memo(memo));
                true
            }
            other => {
                self.pending = other;
                false
            }
        }
    }

    // ── Confirmation ─────────────────────────────────────────────────

    /// Apply the parked action.
    pub fn confirm(&mut self) -> Result<Outcome> {
        let Some(pending) = self.pending.take() else {
            return Ok(Outcome::Unchanged);
        };
        match pending {
            Pending::OverwritePreset { name } => {
                self.state.presets.upsert(&name, &self.state.steps);
                self.store.save_presets(&self.state.presets);
                Ok(Outcome::Done(Vec::new()))
            }
            Pending::LoadPreset { id, name } => {
                let steps = self
                    .state
                    .presets
                    .find_by_id(&id)
                    .map(|p| p.steps.clone())
                    .ok_or(ValidationError::NoSuchPreset(name))?;
                let events = self.stop_for_rebuild();
                self.state.steps = steps;
                self.store.save_steps(&self.state.steps);
                self.rebuild()?;
                Ok(Outcome::Done(events))
            }
            Pending::DeletePreset { id, .. } => {
                self.state.presets.remove(&id);
                self.store.save_presets(&self.state.presets);
                Ok(Outcome::Done(Vec::new()))
            }
            Pending::ClearLogs => {
                self.state.logs.clear();
                self.store.save_logs(&self.state.logs);
                Ok(Outcome::Done(Vec::new()))
            }
            Pending::Memo { entry } => {
                self.record(entry);
                Ok(Outcome::Done(Vec::new()))
            }
        }
    }

    /// Drop the parked action, leaving all state untouched. A declined memo
    /// still logs the run, with an empty memo.
    pub fn decline(&mut self) {
        if let Some(Pending::Memo { entry }) = self.pending.take() {
            self.record(entry);
        }
    }

    // ── Playback ─────────────────────────────────────────────────────

    pub fn start(&mut self, from: usize) -> Result<Vec<Event>> {
        self.require_steps()?;
        let events = self.engine.start(from)?;
        Ok(self.observe(events))
    }

    /// The start button: resume a paused step, or start from the top.
    pub fn start_or_resume(&mut self) -> Result<Vec<Event>> {
        self.require_steps()?;
        let events = self.engine.start_or_resume()?;
        Ok(self.observe(events))
    }

    pub fn pause(&mut self) -> Vec<Event> {
        self.engine.pause()
    }

    pub fn resume(&mut self) -> Vec<Event> {
        self.engine.resume()
    }

    pub fn reset(&mut self) -> Vec<Event> {
        self.engine.reset()
    }

    /// Skip the rest of the current step. Does nothing without steps.
    pub fn skip(&mut self) -> Result<Vec<Event>> {
        if self.state.steps.is_empty() {
            return Ok(Vec::new());
        }
        let events = self.engine.skip()?;
        Ok(self.observe(events))
    }

    pub fn tick(&mut self, generation: u64) -> Vec<Event> {
        let events = self.engine.tick(generation);
        self.observe(events)
    }

    pub fn announcement_finished(&mut self, ticket: Ticket) -> Vec<Event> {
        let events = self.engine.announcement_finished(ticket);
        self.observe(events)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn require_steps(&self) -> Result<(), ValidationError> {
        if self.state.steps.is_empty() {
            return Err(ValidationError::NoSteps);
        }
        Ok(())
    }

    /// Reset playback if a run is active so the run sequence may change.
    fn stop_for_rebuild(&mut self) -> Vec<Event> {
        if self.engine.is_active() {
            self.engine.reset()
        } else {
            Vec::new()
        }
    }

    fn rebuild(&mut self) -> Result<()> {
        self.engine
            .rebuild(&self.state.steps, self.state.repeat)
            .map_err(CoreError::from)
    }

    /// Hand completed runs to the log.
    fn observe(&mut self, events: Vec<Event>) -> Vec<Event> {
        for event in &events {
            if let Event::RunCompleted { summary, .. } = event {
                let entry = LogEntry::from_summary(summary, &Local::now());
                if self.ask_memo {
                    self.park(Pending::Memo { entry });
                } else {
                    self.record(entry);
                }
            }
        }
        events
    }

    fn park(&mut self, pending: Pending) -> Outcome {
        if let Some(Pending::Memo { entry }) = self.pending.take() {
            self.record(entry);
        }
        self.pending = Some(pending.clone());
        Outcome::Confirm(pending)
    }

    fn record(&mut self, entry: LogEntry) {
        tracing::info!(title = %entry.title, total_seconds = entry.total_seconds, "run logged");
        self.state.logs.push(entry);
        self.store.save_logs(&self.state.logs);
    }
}
