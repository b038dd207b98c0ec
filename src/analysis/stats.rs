use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc, Weekday};
use serde::Serialize;
use serde_json::Value;

const DAY_NAMES: [&str; 7] = [
    "Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday",
];

/// Per-day aggregate for one week of entries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBucket {
    pub date: String,
    pub day_of_week: &'static str,
    pub mood_entries: usize,
    pub journal_entries: usize,
    pub average_mood: Option<f64>,
}

/// Per-week aggregate for one month of entries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekBucket {
    pub week_start: String,
    pub week_end: String,
    pub mood_entries: usize,
    pub journal_entries: usize,
    pub average_mood: Option<f64>,
}

/// Aggregate over a whole entry set. The mood figures serialize as null when
/// there are no mood entries at all.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total_mood_entries: usize,
    pub total_journal_entries: usize,
    pub average_mood: Option<f64>,
    pub highest_mood: Option<f64>,
    pub lowest_mood: Option<f64>,
}

/// Instant an entry happened, read from `timestamp` with `date` as the
/// fallback field. Entries without a parseable instant never land in any
/// bucket.
pub fn entry_instant(entry: &Value) -> Option<DateTime<Utc>> {
    let raw = entry
        .get("timestamp")
        .and_then(Value::as_str)
        .filter(|raw| !raw.is_empty())
        .or_else(|| entry.get("date").and_then(Value::as_str).filter(|raw| !raw.is_empty()))?;
    parse_instant(raw)
}

/// Accepts RFC 3339, a bare date (read as UTC midnight), or a naive
/// datetime (read as UTC).
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    None
}

/// Entries inside the half-open range `[start, end)`.
pub fn filter_range(entries: &[Value], start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Value> {
    entries
        .iter()
        .filter(|entry| entry_instant(entry).is_some_and(|instant| instant >= start && instant < end))
        .cloned()
        .collect()
}

/// Seven consecutive UTC days from `week_start`, each with entry counts and
/// the day's average mood.
pub fn day_breakdown(week_start: DateTime<Utc>, mood: &[Value], journal: &[Value]) -> Vec<DayBucket> {
    (0i64..7)
        .map(|offset| {
            let day_start = week_start + Duration::days(offset);
            let day_end = day_start + Duration::days(1);
            let day_mood = filter_range(mood, day_start, day_end);
            let journal_entries = filter_range(journal, day_start, day_end).len();

            DayBucket {
                date: iso_instant(day_start),
                day_of_week: day_name(day_start.weekday()),
                mood_entries: day_mood.len(),
                journal_entries,
                average_mood: average_mood(&day_mood),
            }
        })
        .collect()
}

/// Seven-day windows covering the month, starting from the Sunday on or
/// before `month_start` and running until `month_end` is passed.
pub fn weekly_breakdown(
    month_start: DateTime<Utc>,
    month_end: DateTime<Utc>,
    mood: &[Value],
    journal: &[Value],
) -> Vec<WeekBucket> {
    let mut week_start =
        month_start - Duration::days(month_start.weekday().num_days_from_sunday() as i64);
    let mut buckets = Vec::new();

    while week_start < month_end {
        let week_end = week_start + Duration::days(7);
        let week_mood = filter_range(mood, week_start, week_end);
        let journal_entries = filter_range(journal, week_start, week_end).len();

        buckets.push(WeekBucket {
            week_start: iso_instant(week_start),
            week_end: iso_instant(week_end),
            mood_entries: week_mood.len(),
            journal_entries,
            average_mood: average_mood(&week_mood),
        });

        week_start = week_end;
    }

    buckets
}

pub fn overall_stats(mood: &[Value], journal: &[Value]) -> OverallStats {
    let scores: Vec<f64> = mood.iter().map(entry_score).collect();
    let (average, highest, lowest) = if scores.is_empty() {
        (None, None, None)
    } else {
        let sum: f64 = scores.iter().sum();
        (
            Some(sum / scores.len() as f64),
            scores.iter().copied().reduce(f64::max),
            scores.iter().copied().reduce(f64::min),
        )
    };

    OverallStats {
        total_mood_entries: mood.len(),
        total_journal_entries: journal.len(),
        average_mood: average,
        highest_mood: highest,
        lowest_mood: lowest,
    }
}

/// Mood words as the client recorded them, `moodWord` with `mood` as the
/// fallback field.
pub fn mood_words(mood: &[Value]) -> Vec<String> {
    mood.iter()
        .filter_map(|entry| {
            entry
                .get("moodWord")
                .and_then(Value::as_str)
                .filter(|word| !word.is_empty())
                .or_else(|| entry.get("mood").and_then(Value::as_str).filter(|word| !word.is_empty()))
                .map(str::to_string)
        })
        .collect()
}

/// Short label per journal entry: the title, the first words of the content,
/// or a placeholder.
pub fn journal_themes(journal: &[Value]) -> Vec<String> {
    journal
        .iter()
        .map(|entry| {
            if let Some(title) = entry.get("title").and_then(Value::as_str).filter(|t| !t.is_empty()) {
                return title.to_string();
            }
            if let Some(content) =
                entry.get("content").and_then(Value::as_str).filter(|c| !c.is_empty())
            {
                let head: Vec<&str> = content.split(' ').take(5).collect();
                return format!("{}...", head.join(" "));
            }
            "Untitled entry".to_string()
        })
        .collect()
}

// Missing or non-numeric scores count as zero, matching how the client
// stores unscored entries.
fn entry_score(entry: &Value) -> f64 {
    entry.get("score").and_then(Value::as_f64).unwrap_or(0.0)
}

fn average_mood(entries: &[Value]) -> Option<f64> {
    if entries.is_empty() {
        return None;
    }
    let sum: f64 = entries.iter().map(entry_score).sum();
    Some(sum / entries.len() as f64)
}

fn day_name(day: Weekday) -> &'static str {
    DAY_NAMES[day.num_days_from_sunday() as usize]
}

fn iso_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}
