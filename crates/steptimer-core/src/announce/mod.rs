//! Announcement service: speaks a message and reports when it is done.
//!
//! Completion is delivered through a callback so the caller never blocks on
//! speech. Implementations must fire the callback at most once, and must not
//! fire it for an utterance that was cancelled.

mod command;
pub mod phrases;
mod voices;

pub use command::CommandAnnouncer;
pub use voices::{parse_espeak_voices, parse_say_voices, pick_voice, Voice};

use crate::storage::AnnounceConfig;

/// Called once when an utterance ends.
pub type Completion = Box<dyn FnOnce() + Send + 'static>;

pub trait Announcer: Send {
    /// Speak `text`, cancelling anything currently being spoken first.
    fn speak(&mut self, text: &str, on_done: Option<Completion>);

    /// Stop the current utterance, if any. Its completion does not fire.
    fn cancel(&mut self);

    /// Whether speech is actually produced.
    fn is_supported(&self) -> bool;
}

/// Used when speech is disabled or unavailable: nothing is spoken and the
/// completion fires immediately.
#[derive(Debug, Default)]
pub struct SilentAnnouncer;

impl Announcer for SilentAnnouncer {
    fn speak(&mut self, text: &str, on_done: Option<Completion>) {
        tracing::trace!(text, "speech unavailable, skipping");
        if let Some(done) = on_done {
            done();
        }
    }

    fn cancel(&mut self) {}

    fn is_supported(&self) -> bool {
        false
    }
}

/// Build the announcer described by the configuration.
pub fn from_config(config: &AnnounceConfig) -> Box<dyn Announcer> {
    if config.enabled {
        Box::new(CommandAnnouncer::new(
            &config.program,
            &config.language,
            config.rate,
        ))
    } else {
        Box::new(SilentAnnouncer)
    }
}
