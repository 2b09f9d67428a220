use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "steptimer", version, about = "Spoken step timer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Step list management
    Steps {
        #[command(subcommand)]
        action: commands::steps::StepsAction,
    },
    /// How many times the step list is played
    Repeat {
        #[command(subcommand)]
        action: commands::repeat::RepeatAction,
    },
    /// Saved step lists
    Preset {
        #[command(subcommand)]
        action: commands::preset::PresetAction,
    },
    /// Completed run history
    Logs {
        #[command(subcommand)]
        action: commands::logs::LogsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Speech output
    Voice {
        #[command(subcommand)]
        action: commands::voice::VoiceAction,
    },
    /// Print a summary of the current routine
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Play the routine in the foreground
    Run(commands::run::RunArgs),
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("STEPTIMER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Steps { action } => commands::steps::run(action),
        Commands::Repeat { action } => commands::repeat::run(action),
        Commands::Preset { action } => commands::preset::run(action),
        Commands::Logs { action } => commands::logs::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Voice { action } => commands::voice::run(action),
        Commands::Status { json } => commands::status::run(json),
        Commands::Run(args) => commands::run::run(args),
        Commands::Completions { shell } => commands::completions::run(shell, Cli::command()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
