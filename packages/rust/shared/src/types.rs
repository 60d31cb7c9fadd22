//! Core domain types for talk series and the aggregate talk list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// SeriesRegistry
// ---------------------------------------------------------------------------

/// Maps a series file stem (`kim` for `kim.json`) to its public URL slug.
///
/// Backed by a `BTreeMap` so listing and serialization are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesRegistry(pub BTreeMap<String, String>);

impl SeriesRegistry {
    /// Build a registry from `(stem, slug)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Slug registered for a file stem, if any.
    pub fn slug_for(&self, stem: &str) -> Option<&str> {
        self.0.get(stem).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(stem, slug)` pairs in stem order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// ---------------------------------------------------------------------------
// Field names
// ---------------------------------------------------------------------------

/// JSON keys shared by talk records and series objects.
pub mod fields {
    pub const DATE: &str = "date";
    pub const NAME: &str = "name";
    pub const SERIES: &str = "series";
    pub const SPEAKER: &str = "speaker";
    pub const AFFILIATION: &str = "affiliation";
    pub const PERSONAL_PAGE: &str = "personalPage";
    pub const MAIL: &str = "mail";
    pub const DESCRIPTION: &str = "description";
    pub const ABOUT: &str = "about";
    pub const ZOOM_LINK: &str = "zoomLink";
    pub const MEETING_ID: &str = "meetingId";
    pub const PASSCODE: &str = "passcode";
    pub const SERIES_LINK: &str = "seriesLink";
}

// ---------------------------------------------------------------------------
// SeriesInfo
// ---------------------------------------------------------------------------

/// Series-wide defaults from the `series` object of an optimized document.
///
/// Values are kept as raw JSON: a speaker may be a list, a meeting ID a
/// number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesInfo(pub Map<String, Value>);

impl SeriesInfo {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Display name of the series (`name`).
    pub fn name(&self) -> Option<&Value> {
        self.get(fields::NAME)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for SeriesInfo {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ---------------------------------------------------------------------------
// TalkRecord
// ---------------------------------------------------------------------------

/// One scheduled talk, as read from a series file and as written to the
/// aggregate.
///
/// Every key is kept, in input order, with its original JSON value.
/// Normalization only touches the keys listed in [`fields`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TalkRecord(pub Map<String, Value>);

impl TalkRecord {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set `key`, or drop it when `value` is `None`.
    ///
    /// An existing key keeps its position; a new key is appended.
    pub fn set(&mut self, key: &str, value: Option<Value>) {
        match value {
            Some(value) => {
                self.0.insert(key.to_string(), value);
            }
            None => {
                self.0.shift_remove(key);
            }
        }
    }

    /// Raw `date` value.
    pub fn date(&self) -> Option<&Value> {
        self.get(fields::DATE)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for TalkRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// JavaScript-style truthiness: `null`, `false`, `0`, `""` and a missing
/// value are falsy; arrays and objects are always truthy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

// ---------------------------------------------------------------------------
// SeriesDocument
// ---------------------------------------------------------------------------

/// A parsed series file, classified once at load time.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesDocument {
    /// `{"series": {...}, "talks": [...]}` with series-wide defaults.
    Optimized {
        series: SeriesInfo,
        talks: Vec<TalkRecord>,
    },
    /// A bare array of talks.
    FlatList(Vec<TalkRecord>),
    /// Any other JSON value; `kind` names what was found.
    Unrecognized { kind: &'static str },
}

impl SeriesDocument {
    /// Number of talks carried by the document (zero when unrecognized).
    pub fn talk_count(&self) -> usize {
        match self {
            Self::Optimized { talks, .. } => talks.len(),
            Self::FlatList(talks) => talks.len(),
            Self::Unrecognized { .. } => 0,
        }
    }
}
