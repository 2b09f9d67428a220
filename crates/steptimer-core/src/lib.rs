//! # steptimer Core Library
//!
//! Business logic for a spoken step timer: the user defines a sequence of
//! named, timed steps; a run plays them back (optionally repeated), announces
//! each step through text-to-speech, counts it down, advances automatically
//! and logs the completed run.
//!
//! ## Architecture
//!
//! - **Playback Engine**: a pure state machine over the expanded run. It never
//!   sleeps or speaks itself; it returns directive events for a driver
//! - **Runtime**: tokio driver that turns those directives into a ticker task
//!   and speech, and feeds the callbacks back in order
//! - **Session**: application controller owning steps, presets, logs and the
//!   repeat count, with an explicit confirmation protocol for destructive
//!   actions
//! - **Storage**: SQLite key/value records with lenient loading, and TOML
//!   configuration
//!
//! ## Key Components
//!
//! - [`PlaybackEngine`]: countdown / advance / repeat / announce cycle
//! - [`Session`]: user-facing actions
//! - [`Runner`]: async driver
//! - [`Store`]: persistence adapter

pub mod announce;
pub mod error;
pub mod events;
pub mod format;
pub mod history;
pub mod playback;
pub mod routine;
pub mod runtime;
pub mod session;
pub mod storage;
pub mod view;

pub use announce::{Announcer, CommandAnnouncer, SilentAnnouncer};
pub use error::{ConfigError, CoreError, PlaybackError, StorageError, ValidationError};
pub use events::{Event, RunSummary, Ticket};
pub use history::{LogEntry, SessionLog, TodayTotal};
pub use playback::{Phase, PlaybackEngine};
pub use routine::{Preset, PresetBook, RepeatCount, Step};
pub use runtime::{Command, Input, Runner};
pub use session::{Outcome, Pending, Session};
pub use storage::{Config, Database, Store};
