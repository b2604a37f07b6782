//! Canonical collection item shared by the search adapters and the store.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Sentinel used for any text field a provider could not fill in.
pub const DATA_UNAVAILABLE: &str = "Data unavailable";

/// Cover shown when a provider has no artwork for an item.
pub const PLACEHOLDER_COVER_URL: &str = "https://placehold.co/400x600?text=No+Image";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
    Game,
    Album,
    Book,
}

impl MediaType {
    pub const ALL: [MediaType; 5] = [
        MediaType::Movie,
        MediaType::Tv,
        MediaType::Game,
        MediaType::Album,
        MediaType::Book,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
            MediaType::Game => "game",
            MediaType::Album => "album",
            MediaType::Book => "book",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(MediaType::Movie),
            "tv" => Ok(MediaType::Tv),
            "game" => Ok(MediaType::Game),
            "album" => Ok(MediaType::Album),
            "book" => Ok(MediaType::Book),
            other => Err(format!("Unknown media type: {}", other)),
        }
    }
}

/// Release year of an item.
///
/// Serialized as a plain number, or as the [`DATA_UNAVAILABLE`] string when
/// the provider gave no usable date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Year {
    Known(i32),
    #[default]
    Unavailable,
}

impl Year {
    /// Parses the leading four characters of a date-like string
    /// ("2005", "2005-01-01", "2005-01-01T08:00:00Z").
    pub fn from_date_like(raw: &str) -> Year {
        raw.get(..4)
            .and_then(|prefix| prefix.parse::<i32>().ok())
            .map(Year::Known)
            .unwrap_or(Year::Unavailable)
    }

    pub fn value(&self) -> Option<i32> {
        match self {
            Year::Known(year) => Some(*year),
            Year::Unavailable => None,
        }
    }
}

impl From<Option<i32>> for Year {
    fn from(value: Option<i32>) -> Self {
        value.map(Year::Known).unwrap_or(Year::Unavailable)
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Year::Known(year) => write!(f, "{}", year),
            Year::Unavailable => f.write_str(DATA_UNAVAILABLE),
        }
    }
}

impl Serialize for Year {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Year::Known(year) => serializer.serialize_i32(*year),
            Year::Unavailable => serializer.serialize_str(DATA_UNAVAILABLE),
        }
    }
}

impl<'de> Deserialize<'de> for Year {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawYear {
            Number(i64),
            Float(f64),
            Text(String),
            Missing(()),
        }

        Ok(match RawYear::deserialize(deserializer)? {
            RawYear::Number(n) => i32::try_from(n)
                .map(Year::Known)
                .unwrap_or(Year::Unavailable),
            // 2001.0 from a hand-edited file still names a year
            RawYear::Float(f) if f.fract() == 0.0 && f.abs() <= i32::MAX as f64 => {
                Year::Known(f as i32)
            }
            RawYear::Float(_) => Year::Unavailable,
            RawYear::Text(text) => Year::from_date_like(&text),
            RawYear::Missing(()) => Year::Unavailable,
        })
    }
}

/// A single entry of the personal collection, or a search result that can
/// become one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionItem {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub artist_or_producer: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cover_image_url: String,
    #[serde(default)]
    pub year: Year,
    #[serde(
        default = "Utc::now",
        serialize_with = "iso_timestamp::serialize",
        deserialize_with = "iso_timestamp::deserialize_or_now"
    )]
    pub imported_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
}

/// `#[serde(default)]` covers a missing field; this also covers an explicit null.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Ids are strings, but hand-edited export files sometimes carry numbers.
fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Text(text) => Ok(text),
        RawId::Number(number) => Ok(number.to_string()),
    }
}

/// RFC 3339 with millisecond precision and a `Z` suffix, the same shape a
/// browser's `Date.toISOString()` produces.
pub mod iso_timestamp {
    use super::*;

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc))
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(de::Error::custom)
    }

    /// Like [`deserialize`], but a null stands for "imported just now".
    pub fn deserialize_or_now<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => parse(&raw).map_err(de::Error::custom),
            None => Ok(Utc::now()),
        }
    }
}

/// Ordering applied to a list of collection items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Most recently imported first.
    Added,
    /// Alphabetical by title.
    Title,
    /// Newest release first, unknown years last.
    #[default]
    Year,
}

impl SortOrder {
    pub fn sort(&self, items: &mut [CollectionItem]) {
        match self {
            SortOrder::Added => items.sort_by(|a, b| b.imported_at.cmp(&a.imported_at)),
            SortOrder::Title => items.sort_by(|a, b| {
                a.title
                    .to_lowercase()
                    .cmp(&b.title.to_lowercase())
                    .then_with(|| a.title.cmp(&b.title))
            }),
            // None sorts below every Some, so descending puts unknown years last
            SortOrder::Year => items.sort_by(|a, b| b.year.value().cmp(&a.year.value())),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "added" => Ok(SortOrder::Added),
            "title" => Ok(SortOrder::Title),
            "year" => Ok(SortOrder::Year),
            other => Err(format!("Unknown sort order: {}", other)),
        }
    }
}
