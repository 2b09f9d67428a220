//! Speech through an external TTS program (`say`, `espeak-ng`, ...).
//!
//! Each utterance is a child process. A watcher task waits for it and fires
//! the completion; cancelling kills the child and drops the completion.
//! Must be used from within a tokio runtime.

use std::process::Stdio;
use std::sync::{Arc, Mutex};

use tokio::process::Command;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::voices::{parse_espeak_voices, parse_say_voices, pick_voice, Voice};
use super::{Announcer, Completion};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Say,
    Espeak,
    /// Unknown program: called with the text as its only argument.
    Plain,
}

impl Flavor {
    fn of(program: &str) -> Self {
        let base = std::path::Path::new(program)
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(program);
        if base == "say" {
            Flavor::Say
        } else if base.starts_with("espeak") {
            Flavor::Espeak
        } else {
            Flavor::Plain
        }
    }
}

pub struct CommandAnnouncer {
    program: String,
    flavor: Flavor,
    language: String,
    rate: u32,
    /// Filled at construction; refreshed in the background while empty.
    voices: Arc<Mutex<Vec<Voice>>>,
    refresh: Option<JoinHandle<()>>,
    /// Set once spawning the program has failed; speech is skipped afterwards.
    broken: bool,
    cancel_current: Option<oneshot::Sender<()>>,
}

type VoiceParser = fn(&str) -> Vec<Voice>;

/// Arguments that make the program list its voices, and the output parser.
fn voice_listing(flavor: Flavor) -> Option<(&'static [&'static str], VoiceParser)> {
    match flavor {
        Flavor::Say => {
            let args: &'static [&'static str] = &["-v", "?"];
            Some((args, parse_say_voices as VoiceParser))
        }
        Flavor::Espeak => {
            let args: &'static [&'static str] = &["--voices"];
            Some((args, parse_espeak_voices as VoiceParser))
        }
        Flavor::Plain => None,
    }
}

impl CommandAnnouncer {
    /// Create an announcer and query the installed voices once. Call this
    /// outside async code; the query blocks until the program answers.
    pub fn new(program: &str, language: &str, rate: u32) -> Self {
        let flavor = Flavor::of(program);
        Self {
            program: program.to_string(),
            flavor,
            language: language.to_string(),
            rate,
            voices: Arc::new(Mutex::new(query_voices_blocking(program, flavor))),
            refresh: None,
            broken: false,
            cancel_current: None,
        }
    }

    /// Installed voices known so far.
    pub fn voices(&self) -> Vec<Voice> {
        self.voices
            .lock()
            .map(|voices| voices.clone())
            .unwrap_or_default()
    }

    /// Re-query voices on the runtime without blocking it. At most one query
    /// runs at a time.
    fn refresh_voices(&mut self) {
        if self.refresh.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }
        let Some((args, parse)) = voice_listing(self.flavor) else {
            return;
        };
        let program = self.program.clone();
        let cache = Arc::clone(&self.voices);
        self.refresh = Some(tokio::spawn(async move {
            let output = Command::new(&program)
                .args(args)
                .stdin(Stdio::null())
                .stderr(Stdio::null())
                .output()
                .await;
            match output {
                Ok(out) if out.status.success() => {
                    let found = parse(&String::from_utf8_lossy(&out.stdout));
                    if !found.is_empty() {
                        if let Ok(mut voices) = cache.lock() {
                            *voices = found;
                        }
                    }
                }
                Ok(out) => {
                    tracing::debug!(program = %program, status = %out.status, "voice listing failed");
                }
                Err(e) => tracing::debug!(program = %program, error = %e, "voice listing failed"),
            }
        }));
    }

    fn command(&mut self, text: &str) -> Command {
        let known = self.voices();
        if known.is_empty() {
            self.refresh_voices();
        }
        let voice = pick_voice(&known, &self.language).map(|v| v.id.clone());
        let mut cmd = Command::new(&self.program);
        match self.flavor {
            Flavor::Say => {
                cmd.arg("-r").arg(self.rate.to_string());
                if let Some(voice) = voice {
                    cmd.arg("-v").arg(voice);
                }
            }
            Flavor::Espeak => {
                cmd.arg("-s").arg(self.rate.to_string());
                if let Some(voice) = voice {
                    cmd.arg("-v").arg(voice);
                }
            }
            Flavor::Plain => {}
        }
        cmd.arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

fn query_voices_blocking(program: &str, flavor: Flavor) -> Vec<Voice> {
    let Some((args, parse)) = voice_listing(flavor) else {
        return Vec::new();
    };
    let output = std::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output();
    match output {
        Ok(out) if out.status.success() => parse(&String::from_utf8_lossy(&out.stdout)),
        Ok(out) => {
            tracing::debug!(program, status = %out.status, "voice listing failed");
            Vec::new()
        }
        Err(e) => {
            tracing::debug!(program, error = %e, "voice listing failed");
            Vec::new()
        }
    }
}

impl Announcer for CommandAnnouncer {
    fn speak(&mut self, text: &str, on_done: Option<Completion>) {
        self.cancel();
        if self.broken {
            if let Some(done) = on_done {
                done();
            }
            return;
        }

        let mut child = match self.command(text).spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(program = %self.program, error = %e, "cannot start speech program, continuing silently");
                self.broken = true;
                if let Some(done) = on_done {
                    done();
                }
                return;
            }
        };

        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        self.cancel_current = Some(cancel_tx);
        tokio::spawn(async move {
            tokio::select! {
                status = child.wait() => {
                    if let Err(e) = status {
                        tracing::warn!(error = %e, "speech program did not exit cleanly");
                    }
                    if let Some(done) = on_done {
                        done();
                    }
                }
                _ = cancel_rx => {
                    let _ = child.kill().await;
                }
            }
        });
    }

    fn cancel(&mut self) {
        if let Some(tx) = self.cancel_current.take() {
            let _ = tx.send(());
        }
    }

    fn is_supported(&self) -> bool {
        !self.broken
    }
}
