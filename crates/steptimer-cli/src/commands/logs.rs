use clap::Subcommand;
use steptimer_core::view;

#[derive(Subcommand)]
pub enum LogsAction {
    /// List completed runs, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Today's total time and session count
    Today {
        #[arg(long)]
        json: bool,
    },
    /// Delete all history
    Clear {
        #[arg(long, short)]
        yes: bool,
    },
}

pub fn run(action: LogsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = super::open_session()?;

    match action {
        LogsAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(session.logs())?);
                return Ok(());
            }
            if session.logs().is_empty() {
                println!("履歴はまだありません");
            }
            for entry in session.logs().entries() {
                let (main, meta) = view::log_lines(entry);
                println!("{main}\n  {meta}");
            }
        }
        LogsAction::Today { json } => {
            let total = session.today_total();
            if json {
                println!("{}", serde_json::to_string_pretty(&total)?);
            } else {
                println!("{}", view::today_total_line(&total));
            }
        }
        LogsAction::Clear { yes } => {
            let outcome = session.clear_logs();
            if super::settle(&mut session, outcome, yes)? {
                println!("history cleared");
            } else if session.logs().is_empty() {
                println!("履歴はまだありません");
            }
        }
    }
    Ok(())
}
