use std::time::Duration;

use clap::Subcommand;
use steptimer_core::announce::{self, phrases, pick_voice};
use steptimer_core::{Announcer, CommandAnnouncer, Config};
use tokio::sync::oneshot;

/// Upper bound on how long a test utterance may take.
const TEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Subcommand)]
pub enum VoiceAction {
    /// Speak a test sentence with the configured settings
    Test,
    /// List voices offered by the configured program
    List,
}

pub fn run(action: VoiceAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();

    match action {
        VoiceAction::Test => {
            let mut announcer = announce::from_config(&config.announce);
            if !announcer.is_supported() {
                println!("speech is disabled (announce.enabled = false)");
                return Ok(());
            }
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(async move {
                let (tx, rx) = oneshot::channel();
                announcer.speak(
                    phrases::VOICE_TEST,
                    Some(Box::new(move || {
                        let _ = tx.send(());
                    })),
                );
                if tokio::time::timeout(TEST_TIMEOUT, rx).await.is_err() {
                    announcer.cancel();
                    tracing::warn!("voice test timed out");
                }
            });
            println!("ok");
        }
        VoiceAction::List => {
            let announce = &config.announce;
            let announcer =
                CommandAnnouncer::new(&announce.program, &announce.language, announce.rate);
            let voices = announcer.voices();
            if voices.is_empty() {
                println!("no voices reported by {}", announce.program);
                return Ok(());
            }
            let preferred = pick_voice(&voices, &announce.language).map(|v| v.id.clone());
            for voice in &voices {
                let mark = if preferred.as_deref() == Some(voice.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!("{mark} {:<24} {}", voice.id, voice.language);
            }
        }
    }
    Ok(())
}
