//! Foreground playback.
//!
//! Drives a [`Runner`] on a tokio runtime and reads single-letter commands
//! from stdin, one per line. When stdin is closed the run simply plays out.

use std::io::{BufRead, Write};
use std::time::Duration;

use clap::Args;
use steptimer_core::announce::{self, Announcer, SilentAnnouncer};
use steptimer_core::format::format_clock;
use steptimer_core::{view, Command, Config, Event, Input, Pending, Phase, Runner, ValidationError};
use tokio::sync::mpsc;

/// How long the closing announcement may keep the process alive.
const CLOSING_TIMEOUT: Duration = Duration::from_secs(15);

const KEYS_HELP: &str = "p: 一時停止  r: 再開/スタート  s: スキップ  x: リセット  q: 終了";

#[derive(Args)]
pub struct RunArgs {
    /// Step to start from (1-based, within the repeated run)
    #[arg(long, default_value_t = 1)]
    from: usize,
    /// Memo to log with the run instead of asking
    #[arg(long, conflicts_with = "no_memo")]
    memo: Option<String>,
    /// Log the run without asking for a memo
    #[arg(long)]
    no_memo: bool,
    /// Do not speak, even if announcements are enabled
    #[arg(long)]
    silent: bool,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mut session = super::open_session()?;
    if session.steps().is_empty() {
        return Err(ValidationError::NoSteps.into());
    }
    let run_len = session.engine().run_steps().len();
    let from = args
        .from
        .checked_sub(1)
        .filter(|i| *i < run_len)
        .ok_or(ValidationError::NoSuchStep {
            position: args.from,
            len: run_len,
        })?;
    session.set_ask_memo(args.memo.is_some() || (config.session.ask_memo && !args.no_memo));

    let announcer: Box<dyn Announcer> = if args.silent {
        Box::new(SilentAnnouncer)
    } else {
        announce::from_config(&config.announce)
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let mut runner = Runner::new(session, announcer);
    runtime.block_on(drive(&mut runner, from, args.memo))
}

async fn drive(
    runner: &mut Runner,
    from: usize,
    memo: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut keys = spawn_key_reader();
    let mut keys_open = true;

    println!("{KEYS_HELP}");
    let events = runner.handle(Input::Command(Command::StartAt(from)))?;
    render(runner, &events);

    loop {
        tokio::select! {
            line = keys.recv(), if keys_open => {
                let Some(line) = line else {
                    keys_open = false;
                    continue;
                };
                let command = match line.trim() {
                    "p" => Command::Pause,
                    "r" => Command::Start,
                    "s" => Command::Skip,
                    "x" => Command::Reset,
                    "q" => break,
                    "" => continue,
                    other => {
                        eprintln!("unknown key '{other}' ({KEYS_HELP})");
                        continue;
                    }
                };
                let events = runner.handle(Input::Command(command))?;
                render(runner, &events);
            }
            input = runner.next_input() => {
                let Some(input) = input else { break };
                let events = runner.handle(input)?;
                render(runner, &events);
            }
        }

        if runner.session().engine().phase() == Phase::Finished {
            break;
        }
        if !keys_open && runner.session().engine().phase() == Phase::Idle {
            // Reset with no way left to restart.
            break;
        }
    }
    if runner.session().engine().phase() == Phase::Finished {
        runner.finish_speaking(CLOSING_TIMEOUT).await;
    }
    runner.shutdown();
    println!();

    if matches!(runner.session().pending(), Some(Pending::Memo { .. })) {
        let memo = match memo {
            Some(memo) => Some(memo),
            None if keys_open => {
                let entry_prompt = runner
                    .session()
                    .pending()
                    .map(view::confirmation_prompt)
                    .unwrap_or_default();
                print!("{entry_prompt}");
                let _ = std::io::stdout().flush();
                keys.recv().await
            }
            None => None,
        };
        runner.session_mut().submit_memo(memo.as_deref());
        println!("{}", view::today_total_line(&runner.session().today_total()));
    } else if runner.session().engine().phase() == Phase::Finished {
        println!("{}", view::today_total_line(&runner.session().today_total()));
    }
    Ok(())
}

/// Forward stdin lines from a dedicated thread. Reading stdin from the
/// runtime would keep it alive after the run ends.
fn spawn_key_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn render(runner: &Runner, events: &[Event]) {
    let engine = runner.session().engine();
    let total = engine.run_steps().len();
    for event in events {
        match event {
            Event::StepStarted {
                step_index,
                step_name,
                duration_secs,
                ..
            } => {
                println!(
                    "\n[{}/{}] {}  ({})",
                    step_index + 1,
                    total,
                    step_name,
                    format_clock(*duration_secs)
                );
            }
            Event::CountdownStarted { .. } | Event::Tick { .. } => {
                print!(
                    "\r  {} {}  {:>3.0}%\x1b[K",
                    view::timer_label(engine.phase()),
                    format_clock(engine.remaining_secs()),
                    engine.run_progress_pct()
                );
                let _ = std::io::stdout().flush();
            }
            Event::TimerPaused { .. } | Event::TimerResumed { .. } | Event::TimerReset { .. } => {
                let (_, status) = view::current_step_status(engine, true);
                println!("\n  {status}");
            }
            Event::RunCompleted { summary, .. } => {
                let (title, status) = view::current_step_status(engine, true);
                println!(
                    "\n{title}: {status} ({}ステップ / {})",
                    summary.total_steps,
                    format_clock(summary.total_seconds)
                );
            }
            _ => {}
        }
    }
}
