use clap::Subcommand;
use steptimer_core::view;

#[derive(Subcommand)]
pub enum PresetAction {
    /// List saved presets
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Save the current steps under a name
    Save {
        name: String,
        /// Overwrite an existing preset without asking
        #[arg(long, short)]
        yes: bool,
    },
    /// Replace the current steps with a preset's
    Load {
        /// Preset id or name
        preset: String,
        #[arg(long, short)]
        yes: bool,
    },
    /// Delete a preset
    Delete {
        /// Preset id or name
        preset: String,
        #[arg(long, short)]
        yes: bool,
    },
}

pub fn run(action: PresetAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = super::open_session()?;

    match action {
        PresetAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(session.presets())?);
                return Ok(());
            }
            if session.presets().is_empty() {
                println!("プリセットがありません");
            }
            for preset in session.presets().as_slice() {
                println!("{}  [{}]", view::preset_line(preset), preset.id);
            }
        }
        PresetAction::Save { name, yes } => {
            let outcome = session.save_preset(&name)?;
            if super::settle(&mut session, outcome, yes)? {
                println!("saved: {}", name.trim());
            }
        }
        PresetAction::Load { preset, yes } => {
            let outcome = session.load_preset(&preset)?;
            if super::settle(&mut session, outcome, yes)? {
                println!("loaded: {} steps", session.steps().len());
            }
        }
        PresetAction::Delete { preset, yes } => {
            let outcome = session.delete_preset(&preset)?;
            if super::settle(&mut session, outcome, yes)? {
                println!("deleted: {preset}");
            }
        }
    }
    Ok(())
}
