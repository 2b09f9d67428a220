//! Spoken messages.

/// Announcement played before a step's countdown. `number` is 1-based.
pub fn step_start(number: usize, name: &str, seconds: u64) -> String {
    format!("ステップ{number}。{name}を開始します。時間は{seconds}秒です。")
}

pub const RUN_FINISHED: &str = "全てのステップが完了しました。お疲れさまでした。";

pub const VOICE_TEST: &str =
    "これはテストです。ステップ読み上げタイマーの音声確認を行っています。";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_start_mentions_number_name_and_duration() {
        assert_eq!(
            step_start(2, "プランク", 45),
            "ステップ2。プランクを開始します。時間は45秒です。"
        );
    }
}
