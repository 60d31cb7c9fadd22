//! Talk record normalization.
//!
//! Resolves series-wide defaults onto each talk of an optimized document
//! and backfills the canonical `seriesLink` for every talk. Values are
//! never converted: whatever JSON a talk or series carries is what the
//! aggregate gets.

use serde_json::Value;

use talksite_shared::{SeriesDocument, SeriesInfo, TalkRecord, fields, is_truthy};

/// Inherited from the series when the talk has no truthy value.
const INHERITED: [&str; 6] = [
    fields::SPEAKER,
    fields::AFFILIATION,
    fields::PERSONAL_PAGE,
    fields::MAIL,
    fields::DESCRIPTION,
    fields::ABOUT,
];

/// Inherited like [`INHERITED`], but default to `""` instead of absent.
const MEETING: [&str; 3] = [fields::ZOOM_LINK, fields::MEETING_ID, fields::PASSCODE];

/// First truthy value of `primary`, then `fallback`, else `default`.
///
/// `null`, `false`, `0` and `""` count as absent.
pub fn coalesce(
    primary: Option<Value>,
    fallback: Option<&Value>,
    default: Option<Value>,
) -> Option<Value> {
    if is_truthy(primary.as_ref()) {
        return primary;
    }
    if is_truthy(fallback) {
        return fallback.cloned();
    }
    default
}

/// Canonical link for a series page: `<prefix>/<slug>/`.
pub fn series_link(link_prefix: &str, slug: &str) -> String {
    format!("{}/{slug}/", link_prefix.trim_end_matches('/'))
}

/// Flatten one classified document into output records.
///
/// Order is preserved. Unrecognized documents yield nothing.
pub fn normalize_document(document: SeriesDocument, link: &str) -> Vec<TalkRecord> {
    match document {
        SeriesDocument::Optimized { series, talks } => talks
            .into_iter()
            .map(|talk| apply_series_defaults(talk, &series, link))
            .collect(),
        SeriesDocument::FlatList(talks) => talks
            .into_iter()
            .map(|mut talk| {
                backfill_series_link(&mut talk, link);
                talk
            })
            .collect(),
        SeriesDocument::Unrecognized { .. } => Vec::new(),
    }
}

/// Fill a talk's absent fields from its series. `series` is always taken
/// from the series name, even if the talk names one.
fn apply_series_defaults(mut talk: TalkRecord, series: &SeriesInfo, link: &str) -> TalkRecord {
    talk.set(fields::SERIES, series.name().cloned());

    for key in INHERITED {
        let own = talk.get(key).cloned();
        talk.set(key, coalesce(own, series.get(key), None));
    }
    for key in MEETING {
        let own = talk.get(key).cloned();
        talk.set(key, coalesce(own, series.get(key), Some(Value::from(""))));
    }

    backfill_series_link(&mut talk, link);
    talk
}

fn backfill_series_link(talk: &mut TalkRecord, link: &str) {
    let own = talk.get(fields::SERIES_LINK).cloned();
    talk.set(fields::SERIES_LINK, coalesce(own, None, Some(Value::from(link))));
}
