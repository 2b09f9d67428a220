mod preset;
mod repeat;
mod step;

pub use preset::{builtin_presets, Preset, PresetBook, Upsert};
pub use repeat::{expand, RepeatCount};
pub use step::{clamp_seconds, total_seconds, Step, MAX_STEP_SECONDS};
pub(crate) use step::numeric;
