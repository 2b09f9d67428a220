//! Display helpers for durations and timestamps.

use chrono::{DateTime, Local, TimeZone};

/// `MM:SS`. Minutes are not wrapped at an hour, so 3661 renders as `61:01`.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Long-form duration such as `1時間1分1秒`.
///
/// Zero-valued units are omitted; a total of zero renders as `0秒`.
pub fn format_duration_ja(total_secs: u64) -> String {
    let h = total_secs / 3600;
    let m = (total_secs % 3600) / 60;
    let s = total_secs % 60;

    let mut out = String::new();
    if h > 0 {
        out.push_str(&format!("{h}時間"));
    }
    if m > 0 {
        out.push_str(&format!("{m}分"));
    }
    if s > 0 || out.is_empty() {
        out.push_str(&format!("{s}秒"));
    }
    out
}

/// Calendar date in `YYYY-MM-DD`, in the timezone of `now`.
pub fn date_iso<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%Y-%m-%d").to_string()
}

/// Human-readable timestamp `YYYY/MM/DD HH:MM`.
pub fn display_time<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%Y/%m/%d %H:%M").to_string()
}

pub fn today_iso() -> String {
    date_iso(&Local::now())
}
