//! Display texts for the front end. Pure functions over engine and data.

use crate::format::{format_clock, format_duration_ja};
use crate::history::{LogEntry, TodayTotal, FALLBACK_TITLE};
use crate::playback::{Phase, PlaybackEngine};
use crate::routine::{Preset, Step};
use crate::session::Pending;

/// Title and status line for the "current step" panel.
pub fn current_step_status(engine: &PlaybackEngine, has_steps: bool) -> (String, String) {
    match (engine.phase(), engine.current_step(), engine.current_index()) {
        (Phase::Announcing | Phase::Counting, Some(step), Some(i)) => (
            step_title(i, step),
            format!("残り {} 秒", engine.remaining_secs()),
        ),
        (Phase::Paused, Some(step), Some(i)) => (step_title(i, step), "一時停止中".to_string()),
        (Phase::Finished, _, _) => (
            "完了".to_string(),
            "全てのステップが終了しました。".to_string(),
        ),
        _ if has_steps => (
            "準備完了".to_string(),
            "スタートでステップ1から開始します。".to_string(),
        ),
        _ => (
            "まだ開始していません".to_string(),
            "ステップを作成して、スタートを押してください。".to_string(),
        ),
    }
}

/// Label shown above the clock.
pub fn timer_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Announcing => "読み上げ中...",
        Phase::Finished => "完了",
        _ => "残り時間",
    }
}

fn step_title(index: usize, step: &Step) -> String {
    format!("ステップ {}：{}", index + 1, step.name)
}

pub fn step_line(index: usize, step: &Step) -> String {
    format!("{:>2}. {}  ({} 秒)", index + 1, step.name, step.seconds)
}

pub fn preset_line(preset: &Preset) -> String {
    format!(
        "{}  {}ステップ / 合計 {}",
        preset.name,
        preset.steps.len(),
        format_clock(preset.total_seconds())
    )
}

/// Main line and meta line of a log entry.
pub fn log_lines(entry: &LogEntry) -> (String, String) {
    let title = if entry.title.is_empty() {
        FALLBACK_TITLE
    } else {
        entry.title.as_str()
    };
    let main = format!(
        "{}（{}ステップ / {}）",
        title,
        entry.total_steps,
        format_clock(entry.total_seconds)
    );
    let memo = entry.memo.trim();
    let meta = if memo.is_empty() {
        entry.time.clone()
    } else {
        format!("{}　メモ：{}", entry.time, memo)
    };
    (main, meta)
}

pub fn today_total_line(total: &TodayTotal) -> String {
    if total.is_empty() {
        "今日の合計：0秒".to_string()
    } else {
        format!(
            "今日の合計：{}（{}セッション）",
            format_duration_ja(total.seconds),
            total.sessions
        )
    }
}

/// Question to put to the user for a parked action.
pub fn confirmation_prompt(pending: &Pending) -> String {
    match pending {
        Pending::OverwritePreset { name } => {
            format!("同じ名前のプリセット \"{name}\" が存在します。上書きしますか？")
        }
        Pending::LoadPreset { name, .. } => {
            format!("\"{name}\" の内容で現在のステップを上書きします。よろしいですか？")
        }
        Pending::DeletePreset { name, .. } => {
            format!("プリセット \"{name}\" を削除します。よろしいですか？")
        }
        Pending::ClearLogs => "履歴をすべて削除します。よろしいですか？".to_string(),
        Pending::Memo { .. } => "今回のセッションのメモを入力（任意・空欄可）：".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routine::RepeatCount;

    fn engine() -> PlaybackEngine {
        PlaybackEngine::new(
            &[Step {
                name: "スクワット".into(),
                seconds: 60,
            }],
            RepeatCount::default(),
        )
    }

    #[test]
    fn status_follows_phase() {
        let mut e = engine();
        assert_eq!(current_step_status(&e, true).0, "準備完了");
        assert_eq!(current_step_status(&e, false).0, "まだ開始していません");

        e.start(0).unwrap();
        assert_eq!(
            current_step_status(&e, true),
            ("ステップ 1：スクワット".to_string(), "残り 60 秒".to_string())
        );
        assert_eq!(timer_label(e.phase()), "読み上げ中...");

        e.pause();
        assert_eq!(current_step_status(&e, true).1, "一時停止中");

        e.skip().unwrap();
        assert_eq!(current_step_status(&e, true).0, "完了");
        assert_eq!(timer_label(e.phase()), "完了");
    }

    #[test]
    fn today_total_zero_is_distinct() {
        assert_eq!(today_total_line(&TodayTotal::default()), "今日の合計：0秒");
        assert_eq!(
            today_total_line(&TodayTotal {
                seconds: 3661,
                sessions: 2
            }),
            "今日の合計：1時間1分1秒（2セッション）"
        );
    }

    #[test]
    fn log_lines_include_memo_only_when_present() {
        let mut entry = LogEntry {
            title: "a".into(),
            total_steps: 3,
            total_seconds: 65,
            time: "2024/05/01 08:00".into(),
            date_iso: "2024-05-01".into(),
            memo: String::new(),
        };
        assert_eq!(
            log_lines(&entry),
            ("a（3ステップ / 01:05）".to_string(), "2024/05/01 08:00".to_string())
        );
        entry.memo = " done ".into();
        assert_eq!(log_lines(&entry).1, "2024/05/01 08:00　メモ：done");
    }

    #[test]
    fn preset_line_shows_totals() {
        let preset = crate::routine::builtin_presets().remove(1);
        assert_eq!(preset_line(&preset), "筋トレルーティン  4ステップ / 合計 04:30");
    }
}
