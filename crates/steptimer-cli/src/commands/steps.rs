use clap::Subcommand;
use steptimer_core::format::format_clock;
use steptimer_core::routine::total_seconds;
use steptimer_core::{view, ValidationError};

#[derive(Subcommand)]
pub enum StepsAction {
    /// Append a step
    Add {
        /// Step name (e.g. "スクワット")
        name: String,
        /// Duration in seconds; fractions are floored
        seconds: String,
    },
    /// List steps in order
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a step
    Delete {
        /// Position as shown by `steps list` (1-based)
        position: usize,
    },
}

pub fn run(action: StepsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = super::open_session()?;

    match action {
        StepsAction::Add { name, seconds } => {
            session.add_step(&name, &seconds)?;
            let index = session.steps().len() - 1;
            println!("added: {}", view::step_line(index, &session.steps()[index]));
        }
        StepsAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(session.steps())?);
                return Ok(());
            }
            if session.steps().is_empty() {
                println!("ステップがありません");
                return Ok(());
            }
            for (i, step) in session.steps().iter().enumerate() {
                println!("{}", view::step_line(i, step));
            }
            println!(
                "合計 {} × {}回",
                format_clock(total_seconds(session.steps())),
                session.repeat()
            );
        }
        StepsAction::Delete { position } => {
            let len = session.steps().len();
            let index = position
                .checked_sub(1)
                .ok_or(ValidationError::NoSuchStep { position, len })?;
            let name = session
                .steps()
                .get(index)
                .map(|s| s.name.clone())
                .ok_or(ValidationError::NoSuchStep { position, len })?;
            session.delete_step(index)?;
            println!("deleted: {name}");
        }
    }
    Ok(())
}
