//! Async driver for a [`Session`].
//!
//! Turns the engine's directive events into side effects: speech through an
//! [`Announcer`], and a one-second ticker task per countdown. Callbacks from
//! both come back as [`Input`]s on a single channel, so every state change
//! is applied in order on the caller's task.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::announce::{Announcer, Completion};
use crate::error::Result;
use crate::events::{Event, Ticket};
use crate::session::Session;

/// User commands accepted while a run is being driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Resume a paused step, otherwise start from the first step.
    Start,
    StartAt(usize),
    Pause,
    Resume,
    Reset,
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    /// One second elapsed on the countdown of the given generation.
    Tick(u64),
    SpeechDone(Ticket),
}

pub struct Runner {
    session: Session,
    announcer: Box<dyn Announcer>,
    tx: mpsc::UnboundedSender<Input>,
    rx: mpsc::UnboundedReceiver<Input>,
    ticker: Option<JoinHandle<()>>,
    tick_period: Duration,
    /// Resolves when the closing announcement ends or is cancelled.
    closing: Option<oneshot::Receiver<()>>,
}

impl Runner {
    pub fn new(session: Session, announcer: Box<dyn Announcer>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            session,
            announcer,
            tx,
            rx,
            ticker: None,
            tick_period: Duration::from_secs(1),
            closing: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn announcer_mut(&mut self) -> &mut dyn Announcer {
        self.announcer.as_mut()
    }

    /// Sender for feeding commands from another task.
    pub fn sender(&self) -> mpsc::UnboundedSender<Input> {
        self.tx.clone()
    }

    /// Wait for the next tick, speech completion or queued command.
    pub async fn next_input(&mut self) -> Option<Input> {
        self.rx.recv().await
    }

    /// Apply one input and return the resulting events, after their side
    /// effects have been started.
    pub fn handle(&mut self, input: Input) -> Result<Vec<Event>> {
        let events = match input {
            Input::Command(Command::Start) => self.session.start_or_resume()?,
            Input::Command(Command::StartAt(index)) => self.session.start(index)?,
            Input::Command(Command::Pause) => self.session.pause(),
            Input::Command(Command::Resume) => self.session.resume(),
            Input::Command(Command::Reset) => self.session.reset(),
            Input::Command(Command::Skip) => self.session.skip()?,
            Input::Tick(generation) => self.session.tick(generation),
            Input::SpeechDone(ticket) => self.session.announcement_finished(ticket),
        };
        self.dispatch(&events);
        Ok(events)
    }

    /// Carry out the directives among `events`.
    pub fn dispatch(&mut self, events: &[Event]) {
        for event in events.iter().filter(|e| e.is_directive()) {
            match event {
                Event::AnnouncementRequested { text, ticket } => {
                    let on_done = match ticket {
                        Some(t) => self.completion(*t),
                        None => self.closing_completion(),
                    };
                    self.announcer.speak(text, Some(on_done));
                }
                Event::SpeechCancelled => self.announcer.cancel(),
                Event::CountdownStarted { ticket } => self.start_ticker(ticket.generation),
                Event::CountdownStopped => self.stop_ticker(),
                _ => {}
            }
        }
    }

    /// Wait for the closing announcement of a finished run, giving up after
    /// `limit`. Returns at once when nothing is being spoken.
    pub async fn finish_speaking(&mut self, limit: Duration) {
        let Some(done) = self.closing.take() else {
            return;
        };
        if tokio::time::timeout(limit, done).await.is_err() {
            tracing::debug!(?limit, "closing announcement still running");
        }
    }

    /// Stop speech and ticking, e.g. before exiting.
    pub fn shutdown(&mut self) {
        self.stop_ticker();
        self.announcer.cancel();
    }

    fn completion(&self, ticket: Ticket) -> Completion {
        let tx = self.tx.clone();
        Box::new(move || {
            let _ = tx.send(Input::SpeechDone(ticket));
        })
    }

    fn closing_completion(&mut self) -> Completion {
        let (tx, rx) = oneshot::channel();
        self.closing = Some(rx);
        Box::new(move || {
            let _ = tx.send(());
        })
    }

    fn start_ticker(&mut self, generation: u64) {
        self.stop_ticker();
        let tx = self.tx.clone();
        let period = self.tick_period;
        let first = tokio::time::Instant::now() + period;
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(first, period);
            loop {
                interval.tick().await;
                if tx.send(Input::Tick(generation)).is_err() {
                    break;
                }
            }
        }));
    }

    fn stop_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }
}

impl Drop for Runner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::announce::SilentAnnouncer;
    use crate::playback::Phase;
    use crate::session::Pending;
    use crate::storage::{Database, Store};
    use std::sync::{Arc, Mutex};

    /// Records utterances; completions are fired by the test.
    #[derive(Clone, Default)]
    struct ScriptedAnnouncer {
        spoken: Arc<Mutex<Vec<String>>>,
        waiting: Arc<Mutex<Option<Completion>>>,
        cancels: Arc<Mutex<usize>>,
    }

    impl ScriptedAnnouncer {
        fn finish(&self) {
            if let Some(done) = self.waiting.lock().unwrap().take() {
                done();
            }
        }
    }

    impl Announcer for ScriptedAnnouncer {
        fn speak(&mut self, text: &str, on_done: Option<Completion>) {
            self.spoken.lock().unwrap().push(text.to_string());
            *self.waiting.lock().unwrap() = on_done;
        }

        fn cancel(&mut self) {
            *self.cancels.lock().unwrap() += 1;
        }

        fn is_supported(&self) -> bool {
            true
        }
    }

    fn runner(items: &[(&str, &str)], announcer: Box<dyn Announcer>) -> Runner {
        let mut session = Session::open(Store::new(Database::open_memory().unwrap()));
        for (name, secs) in items {
            session.add_step(name, secs).unwrap();
        }
        Runner::new(session, announcer)
    }

    async fn drive_until_finished(runner: &mut Runner) -> Vec<Event> {
        let mut seen = Vec::new();
        while runner.session().engine().phase() != Phase::Finished {
            let input = runner.next_input().await.expect("channel open");
            seen.extend(runner.handle(input).unwrap());
        }
        seen
    }

    #[tokio::test(start_paused = true)]
    async fn silent_run_plays_every_step_in_order() {
        let mut runner = runner(&[("a", "2"), ("b", "3")], Box::new(SilentAnnouncer));
        runner.session_mut().set_repeat("2").unwrap();

        let started = tokio::time::Instant::now();
        let mut events = runner.handle(Input::Command(Command::Start)).unwrap();
        events.extend(drive_until_finished(&mut runner).await);

        let visited: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                Event::StepStarted { step_index, .. } => Some(*step_index),
                _ => None,
            })
            .collect();
        assert_eq!(visited, vec![0, 1, 2, 3]);
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, Event::RunCompleted { .. }))
                .count(),
            1
        );
        assert_eq!(started.elapsed(), Duration::from_secs(10));
        assert!(matches!(runner.session().pending(), Some(Pending::Memo { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn closing_message_is_spoken_and_awaited() {
        let announcer = ScriptedAnnouncer::default();
        let mut runner = runner(&[("a", "1")], Box::new(announcer.clone()));

        runner.handle(Input::Command(Command::Start)).unwrap();
        announcer.finish();
        drive_until_finished(&mut runner).await;

        assert_eq!(
            announcer.spoken.lock().unwrap().last().map(String::as_str),
            Some(crate::announce::phrases::RUN_FINISHED)
        );
        assert_eq!(*announcer.cancels.lock().unwrap(), 0);

        // Still speaking: the wait is bounded.
        let started = tokio::time::Instant::now();
        runner.finish_speaking(Duration::from_secs(3)).await;
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn finish_speaking_returns_when_closing_message_ends() {
        let announcer = ScriptedAnnouncer::default();
        let mut runner = runner(&[("a", "1")], Box::new(announcer.clone()));

        runner.handle(Input::Command(Command::Start)).unwrap();
        announcer.finish();
        drive_until_finished(&mut runner).await;
        announcer.finish();

        let started = tokio::time::Instant::now();
        runner.finish_speaking(Duration::from_secs(30)).await;
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(*announcer.cancels.lock().unwrap(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn spoken_program_outlives_the_last_step() {
        use crate::announce::{phrases, CommandAnnouncer};
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("spoken.txt");
        let script = dir.path().join("speak.sh");
        std::fs::write(
            &script,
            format!("#!/bin/sh\nsleep 0.3\nprintf '%s\\n' \"$1\" >> '{}'\n", out.display()),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let announcer = CommandAnnouncer::new(script.to_str().unwrap(), "ja", 175);
        let mut runner = runner(&[("a", "1")], Box::new(announcer));
        runner.handle(Input::Command(Command::Start)).unwrap();
        tokio::time::timeout(Duration::from_secs(10), drive_until_finished(&mut runner))
            .await
            .expect("run finishes");
        runner.finish_speaking(Duration::from_secs(5)).await;
        runner.shutdown();

        let spoken = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = spoken.lines().collect();
        assert_eq!(
            lines,
            vec![phrases::step_start(1, "a", 1).as_str(), phrases::RUN_FINISHED]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_waits_for_announcement() {
        let announcer = ScriptedAnnouncer::default();
        let mut runner = runner(&[("a", "3")], Box::new(announcer.clone()));

        runner.handle(Input::Command(Command::Start)).unwrap();
        assert_eq!(announcer.spoken.lock().unwrap().len(), 1);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(runner.session().engine().remaining_secs(), 3);

        announcer.finish();
        let input = runner.next_input().await.unwrap();
        assert!(matches!(input, Input::SpeechDone(_)));
        runner.handle(input).unwrap();
        assert_eq!(runner.session().engine().phase(), Phase::Counting);

        let input = runner.next_input().await.unwrap();
        assert!(matches!(input, Input::Tick(_)));
        runner.handle(input).unwrap();
        assert_eq!(runner.session().engine().remaining_secs(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn late_completion_after_reset_is_ignored() {
        let announcer = ScriptedAnnouncer::default();
        let mut runner = runner(&[("a", "3")], Box::new(announcer.clone()));

        runner.handle(Input::Command(Command::Start)).unwrap();
        runner.handle(Input::Command(Command::Reset)).unwrap();
        assert_eq!(*announcer.cancels.lock().unwrap(), 1);

        announcer.finish();
        let input = runner.next_input().await.unwrap();
        assert!(runner.handle(input).unwrap().is_empty());
        assert_eq!(runner.session().engine().phase(), Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_stops_ticking_and_resume_continues() {
        let mut runner = runner(&[("a", "10")], Box::new(SilentAnnouncer));
        runner.handle(Input::Command(Command::Start)).unwrap();

        // Speech completion, then two ticks.
        for _ in 0..3 {
            let input = runner.next_input().await.unwrap();
            runner.handle(input).unwrap();
        }
        assert_eq!(runner.session().engine().remaining_secs(), 8);

        runner.handle(Input::Command(Command::Pause)).unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        // A tick may have been queued before the pause; it must be stale.
        while let Ok(input) = runner.rx.try_recv() {
            runner.handle(input).unwrap();
        }
        assert_eq!(runner.session().engine().remaining_secs(), 8);

        runner.handle(Input::Command(Command::Resume)).unwrap();
        let input = runner.next_input().await.unwrap();
        runner.handle(input).unwrap();
        assert_eq!(runner.session().engine().remaining_secs(), 7);
    }
}
