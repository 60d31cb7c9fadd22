//! Date parsing and ordering for the aggregate talk list.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use talksite_shared::TalkRecord;

/// Date-time layouts without an offset; read as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Date-only layouts; read as midnight UTC.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%B %d, %Y", "%d %B %Y"];

/// Sort key for a talk. Undated talks order after every dated one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DateKey {
    Dated(DateTime<Utc>),
    Undated,
}

/// Interpret a talk's `date` field as a UTC timestamp.
pub fn parse_talk_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// Sort key for one record.
///
/// A string `date` is parsed with [`parse_talk_date`]; a number is taken as
/// milliseconds since the Unix epoch. Anything else is undated.
pub fn date_key(talk: &TalkRecord) -> DateKey {
    let parsed = match talk.date() {
        Some(Value::String(raw)) => parse_talk_date(raw),
        Some(Value::Number(n)) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    };
    parsed.map_or(DateKey::Undated, DateKey::Dated)
}

/// Concatenate per-file record lists and order the result by date.
///
/// The sort is stable: talks with equal dates, and all undated talks, keep
/// the order they were loaded in.
pub fn aggregate<I>(batches: I) -> Vec<TalkRecord>
where
    I: IntoIterator<Item = Vec<TalkRecord>>,
{
    let mut keyed: Vec<(DateKey, TalkRecord)> = batches
        .into_iter()
        .flatten()
        .map(|talk| (date_key(&talk), talk))
        .collect();

    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, talk)| talk).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn talk(date: Option<&str>, speaker: &str) -> TalkRecord {
        let mut record: TalkRecord = [("speaker", speaker)].into_iter().collect();
        record.set("date", date.map(Value::from));
        record
    }

    fn speakers(talks: &[TalkRecord]) -> Vec<&str> {
        talks
            .iter()
            .filter_map(|t| t.get("speaker").and_then(Value::as_str))
            .collect()
    }

    #[test]
    fn parses_common_date_forms() {
        let midnight = parse_talk_date("2024-01-02").unwrap();
        assert_eq!(midnight.to_rfc3339(), "2024-01-02T00:00:00+00:00");

        let zoned = parse_talk_date("2024-01-02T15:00:00+02:00").unwrap();
        assert_eq!(zoned.to_rfc3339(), "2024-01-02T13:00:00+00:00");

        assert!(parse_talk_date("2024-01-02T15:00").is_some());
        assert!(parse_talk_date("2024-01-02 15:00:30").is_some());
        assert!(parse_talk_date(" 2024-01-02 ").is_some());
        assert_eq!(
            parse_talk_date("March 5, 2024"),
            parse_talk_date("2024-03-05")
        );
    }

    #[test]
    fn rejects_garbage_dates() {
        assert_eq!(parse_talk_date("TBA"), None);
        assert_eq!(parse_talk_date(""), None);
        assert_eq!(parse_talk_date("2024-13-40"), None);
    }

    #[test]
    fn dated_keys_sort_before_undated() {
        let dated = date_key(&talk(Some("2099-12-31"), "x"));
        let undated = date_key(&talk(Some("soon"), "y"));
        let missing = date_key(&talk(None, "z"));
        assert!(dated < undated);
        assert_eq!(undated, missing);
    }

    #[test]
    fn numeric_dates_are_epoch_millis() {
        let mut numeric = talk(None, "n");
        numeric.set("date", Some(json!(1704067200000_i64)));
        assert_eq!(date_key(&numeric), date_key(&talk(Some("2024-01-01"), "s")));

        let mut listed = talk(None, "l");
        listed.set("date", Some(json!(["2024-01-01"])));
        assert_eq!(date_key(&listed), DateKey::Undated);
    }

    #[test]
    fn sorts_across_files_by_date() {
        let kim = vec![talk(Some("2024-01-02"), "A"), talk(Some("2024-01-01"), "B")];
        let sergio = vec![talk(Some("2023-12-31"), "C"), talk(Some("2024-01-01T12:00:00Z"), "D")];

        let all = aggregate([kim, sergio]);
        assert_eq!(speakers(&all), ["C", "B", "D", "A"]);

        for pair in all.windows(2) {
            assert!(date_key(&pair[0]) <= date_key(&pair[1]));
        }
    }

    #[test]
    fn equal_dates_keep_load_order() {
        let first = vec![talk(Some("2024-01-01"), "first")];
        let second = vec![talk(Some("2024-01-01"), "second")];
        let all = aggregate([first, second]);
        assert_eq!(speakers(&all), ["first", "second"]);
    }

    #[test]
    fn undated_talks_go_last_in_load_order() {
        let batch = vec![
            talk(Some("TBA"), "tba"),
            talk(Some("2024-06-01"), "june"),
            talk(None, "none"),
            talk(Some("2024-01-01"), "jan"),
        ];
        let all = aggregate([batch]);
        assert_eq!(speakers(&all), ["jan", "june", "tba", "none"]);
    }
}
