mod engine;

pub use engine::{Phase, PlaybackEngine};
