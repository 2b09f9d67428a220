//! Session state survives a restart, and damaged records degrade to defaults.

use steptimer_core::storage::{KEY_LOGS, KEY_PRESETS, KEY_REPEAT, KEY_STEPS};
use steptimer_core::{Database, Event, Outcome, Phase, Session, Store};

fn open(path: &std::path::Path) -> Session {
    Session::open(Store::new(Database::open_at(path).unwrap()))
}

/// Play the current run to its end without waiting on real time.
fn finish_run(session: &mut Session) {
    let mut events = session.start(0).unwrap();
    while session.engine().phase() != Phase::Finished {
        let ticket = events.iter().find_map(|e| match e {
            Event::AnnouncementRequested {
                ticket: Some(t), ..
            } => Some(*t),
            _ => None,
        });
        events = match (session.engine().phase(), ticket) {
            (Phase::Announcing, Some(t)) => session.announcement_finished(t),
            _ => {
                let generation = session.engine().generation();
                session.tick(generation)
            }
        };
    }
}

#[test]
fn mutations_are_persisted_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("steptimer.db");

    {
        let mut session = open(&path);
        session.add_step("洗い物をする", "120").unwrap();
        session.add_step("机を片付ける", "60.9").unwrap();
        session.set_repeat("50").unwrap();
        assert_eq!(session.save_preset("夜").unwrap(), Outcome::Done(Vec::new()));
        session.set_repeat("1").unwrap();
        finish_run(&mut session);
        assert!(session.submit_memo(Some("done")));
    }

    let session = open(&path);
    assert_eq!(session.steps().len(), 2);
    assert_eq!(session.steps()[1].seconds, 60);
    assert_eq!(session.repeat().get(), 1);
    assert_eq!(session.presets().len(), 4);
    assert!(session.presets().find_by_name("夜").is_some());
    assert_eq!(session.logs().len(), 1);
    assert_eq!(session.logs().entries()[0].total_seconds, 180);
    assert_eq!(session.logs().entries()[0].memo, "done");
    assert_eq!(session.engine().phase(), Phase::Idle);
}

#[test]
fn malformed_records_load_as_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("steptimer.db");
    {
        let db = Database::open_at(&path).unwrap();
        db.kv_set(KEY_STEPS, r#"[{"name":"ok","seconds":"0.5"},{"name":null,"seconds":3}]"#)
            .unwrap();
        db.kv_set(KEY_PRESETS, "not json").unwrap();
        db.kv_set(KEY_LOGS, r#"[{"title":"old","totalSeconds":30,"dateISO":"2000-01-01"},"junk"]"#)
            .unwrap();
        db.kv_set(KEY_REPEAT, r#""abc""#).unwrap();
    }

    let session = open(&path);
    assert_eq!(session.steps().len(), 1);
    assert_eq!(session.steps()[0].seconds, 1);
    assert!(session.presets().is_empty());
    assert_eq!(session.logs().len(), 1);
    assert_eq!(session.logs().entries()[0].total_seconds, 30);
    assert_eq!(session.repeat().get(), 1);
    assert!(session.today_total().is_empty());
}

#[test]
fn declining_a_destructive_action_changes_nothing_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("steptimer.db");
    {
        let mut session = open(&path);
        session.delete_preset("default-housework").unwrap();
        session.decline();
    }
    assert_eq!(open(&path).presets().len(), 3);
}
