pub mod completions;
pub mod config;
pub mod logs;
pub mod preset;
pub mod repeat;
pub mod run;
pub mod status;
pub mod steps;
pub mod voice;

use std::io::Write;

use steptimer_core::{view, Database, Outcome, Session, Store};

/// Open the session backed by the on-disk database.
pub fn open_session() -> Result<Session, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    Ok(Session::open(Store::new(db)))
}

/// Ask a yes/no question on stderr. Anything but `y`/`yes` is a no,
/// including a closed stdin.
pub fn ask_yes_no(question: &str) -> bool {
    eprint!("{question} [y/N] ");
    let _ = std::io::stderr().flush();
    let mut answer = String::new();
    match std::io::stdin().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

/// Resolve an outcome that may need the user's confirmation.
///
/// Returns whether the action was applied.
pub fn settle(
    session: &mut Session,
    outcome: Outcome,
    yes: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    match outcome {
        Outcome::Done(_) => Ok(true),
        Outcome::Unchanged => Ok(false),
        Outcome::Confirm(pending) => {
            if yes || ask_yes_no(&view::confirmation_prompt(&pending)) {
                session.confirm()?;
                Ok(true)
            } else {
                session.decline();
                println!("cancelled");
                Ok(false)
            }
        }
    }
}
