use clap::Subcommand;

#[derive(Subcommand)]
pub enum RepeatAction {
    /// Print the repeat count
    Show,
    /// Set the repeat count (clamped to 1..=20)
    Set {
        value: String,
    },
}

pub fn run(action: RepeatAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = super::open_session()?;

    match action {
        RepeatAction::Show => println!("{}", session.repeat()),
        RepeatAction::Set { value } => {
            let (repeat, _) = session.set_repeat(&value)?;
            println!("repeat: {repeat}");
        }
    }
    Ok(())
}
