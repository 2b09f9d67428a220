//! Session playback engine.
//!
//! A pure state machine: no threads, no timers, no I/O. The driver feeds it
//! user commands, one-second ticks and announcement completions, and turns
//! the directive events it returns into side effects.
//!
//! ## Phases
//!
//! ```text
//! Idle -> Announcing -> Counting -> (next step: Announcing | Finished)
//!             |             |
//!             +--> Paused <-+        (resume -> Counting)
//! ```
//!
//! Every state-changing entry point bumps `generation`. Tickets captured by
//! pending callbacks carry the generation they were issued under, so a late
//! announcement completion or tick is recognised as stale and ignored.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::announce::phrases;
use crate::error::PlaybackError;
use crate::events::{Event, RunSummary, Ticket};
use crate::routine::{expand, total_seconds, RepeatCount, Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    /// The step announcement is being spoken; the countdown has not begun.
    Announcing,
    Counting,
    Paused,
    Finished,
}

#[derive(Debug, Clone)]
pub struct PlaybackEngine {
    run_steps: Vec<Step>,
    phase: Phase,
    current: Option<usize>,
    remaining_secs: u64,
    generation: u64,
}

impl Default for PlaybackEngine {
    fn default() -> Self {
        Self::new(&[], RepeatCount::default())
    }
}

impl PlaybackEngine {
    pub fn new(steps: &[Step], repeat: RepeatCount) -> Self {
        Self {
            run_steps: expand(steps, repeat),
            phase: Phase::Idle,
            current: None,
            remaining_secs: 0,
            generation: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn run_steps(&self) -> &[Step] {
        &self.run_steps
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.current.and_then(|i| self.run_steps.get(i))
    }

    /// A step is active while announcing, counting or paused.
    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// 0.0 .. 100.0 progress across the whole run, by seconds.
    pub fn run_progress_pct(&self) -> f64 {
        let total = total_seconds(&self.run_steps);
        if total == 0 {
            return 0.0;
        }
        let done = match (self.phase, self.current) {
            (Phase::Finished, _) => total,
            (_, Some(i)) => {
                let before = total_seconds(&self.run_steps[..i]);
                before + self.run_steps[i].seconds.saturating_sub(self.remaining_secs)
            }
            (_, None) => 0,
        };
        (done as f64 / total as f64 * 100.0).min(100.0)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            title: self.run_steps.first().map(|s| s.name.clone()),
            total_steps: self.run_steps.len(),
            total_seconds: total_seconds(&self.run_steps),
        }
    }

    pub fn snapshot(&self) -> Event {
        let step = self.current_step();
        Event::StateSnapshot {
            phase: self.phase,
            step_index: self.current,
            step_name: step.map(|s| s.name.clone()),
            remaining_secs: self.remaining_secs,
            step_total_secs: step.map(|s| s.seconds).unwrap_or(0),
            run_steps: self.run_steps.len(),
            run_progress_pct: self.run_progress_pct(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Recompute the run sequence. Rejected while a step is active.
    pub fn rebuild(&mut self, steps: &[Step], repeat: RepeatCount) -> Result<(), PlaybackError> {
        if let Some(index) = self.current {
            return Err(PlaybackError::RunActive { index });
        }
        self.run_steps = expand(steps, repeat);
        self.phase = Phase::Idle;
        self.remaining_secs = 0;
        self.generation += 1;
        Ok(())
    }

    /// Begin step `from`, cancelling whatever was in flight.
    pub fn start(&mut self, from: usize) -> Result<Vec<Event>, PlaybackError> {
        if self.run_steps.is_empty() {
            return Err(PlaybackError::EmptyRun);
        }
        if from >= self.run_steps.len() {
            return Err(PlaybackError::OutOfRange {
                index: from,
                len: self.run_steps.len(),
            });
        }
        let mut events = self.halt();
        self.begin_step(from, &mut events);
        Ok(events)
    }

    /// Resume a paused step with time left, otherwise start from the top.
    pub fn start_or_resume(&mut self) -> Result<Vec<Event>, PlaybackError> {
        if self.phase == Phase::Paused && self.remaining_secs > 0 {
            return Ok(self.resume());
        }
        self.start(0)
    }

    /// Called when the announcement issued with `ticket` has finished.
    pub fn announcement_finished(&mut self, ticket: Ticket) -> Vec<Event> {
        if self.phase != Phase::Announcing || !self.owns(ticket) {
            tracing::debug!(?ticket, generation = self.generation, "stale announcement completion");
            return Vec::new();
        }
        self.phase = Phase::Counting;
        vec![Event::CountdownStarted { ticket }]
    }

    /// One second elapsed on the countdown started under `generation`.
    pub fn tick(&mut self, generation: u64) -> Vec<Event> {
        let Some(index) = self.current else {
            return Vec::new();
        };
        if self.phase != Phase::Counting || generation != self.generation {
            tracing::debug!(generation, current = self.generation, "stale tick");
            return Vec::new();
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        let mut events = vec![Event::Tick {
            step_index: index,
            remaining_secs: self.remaining_secs,
        }];
        if self.remaining_secs == 0 {
            events.push(Event::CountdownStopped);
            self.advance(&mut events);
        }
        events
    }

    /// Halt the countdown and any announcement, keeping position and time.
    pub fn pause(&mut self) -> Vec<Event> {
        match (self.phase, self.current) {
            (Phase::Announcing | Phase::Counting, Some(index)) => {
                let mut events = self.halt();
                self.phase = Phase::Paused;
                events.push(Event::TimerPaused {
                    step_index: index,
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                });
                events
            }
            // Silences the closing message still being spoken.
            (Phase::Finished, _) => vec![Event::SpeechCancelled],
            _ => Vec::new(),
        }
    }

    /// Continue a paused step from its remaining time, without re-announcing.
    pub fn resume(&mut self) -> Vec<Event> {
        let Some(index) = self.current else {
            return Vec::new();
        };
        if self.phase != Phase::Paused || self.remaining_secs == 0 {
            return Vec::new();
        }
        self.generation += 1;
        self.phase = Phase::Counting;
        vec![
            Event::TimerResumed {
                step_index: index,
                remaining_secs: self.remaining_secs,
                at: Utc::now(),
            },
            Event::CountdownStarted {
                ticket: Ticket {
                    generation: self.generation,
                    index,
                },
            },
        ]
    }

    pub fn reset(&mut self) -> Vec<Event> {
        let mut events = self.halt();
        if self.phase == Phase::Finished {
            events.push(Event::SpeechCancelled);
        }
        self.phase = Phase::Idle;
        self.current = None;
        self.remaining_secs = 0;
        events.push(Event::TimerReset { at: Utc::now() });
        events
    }

    /// Jump to the next step, dropping the rest of the current one. From
    /// idle or finished this starts the run at step 0.
    pub fn skip(&mut self) -> Result<Vec<Event>, PlaybackError> {
        let Some(from) = self.current else {
            return self.start(0);
        };
        let mut events = self.halt();
        let next = from + 1;
        events.push(Event::TimerSkipped {
            from_step: from,
            to_step: (next < self.run_steps.len()).then_some(next),
            at: Utc::now(),
        });
        self.advance(&mut events);
        Ok(events)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn owns(&self, ticket: Ticket) -> bool {
        ticket.generation == self.generation && self.current == Some(ticket.index)
    }

    /// Invalidate outstanding tickets and emit directives to stop whatever
    /// is running.
    fn halt(&mut self) -> Vec<Event> {
        self.generation += 1;
        match self.phase {
            Phase::Counting => vec![Event::CountdownStopped],
            Phase::Announcing => vec![Event::SpeechCancelled],
            _ => Vec::new(),
        }
    }

    fn begin_step(&mut self, index: usize, events: &mut Vec<Event>) {
        let step = &self.run_steps[index];
        self.current = Some(index);
        self.remaining_secs = step.seconds;
        self.phase = Phase::Announcing;
        events.push(Event::StepStarted {
            step_index: index,
            step_name: step.name.clone(),
            duration_secs: step.seconds,
            at: Utc::now(),
        });
        events.push(Event::AnnouncementRequested {
            text: phrases::step_start(index + 1, &step.name, step.seconds),
            ticket: Some(Ticket {
                generation: self.generation,
                index,
            }),
        });
    }

    fn advance(&mut self, events: &mut Vec<Event>) {
        let next = self.current.map(|i| i + 1).unwrap_or(0);
        if next < self.run_steps.len() {
            self.generation += 1;
            self.begin_step(next, events);
            return;
        }
        self.generation += 1;
        self.current = None;
        self.remaining_secs = 0;
        self.phase = Phase::Finished;
        events.push(Event::AnnouncementRequested {
            text: phrases::RUN_FINISHED.to_string(),
            ticket: None,
        });
        events.push(Event::RunCompleted {
            summary: self.summary(),
            at: Utc::now(),
        });
    }
}
