//! Turns loosely-populated provider records into [`CollectionItem`]s.

use chrono::Utc;

use super::models::{CollectionItem, MediaType, Year, DATA_UNAVAILABLE, PLACEHOLDER_COVER_URL};

/// Marker some providers send instead of leaving the artwork field empty.
const NO_IMAGE_MARKER: &str = "N/A";

/// Builds a canonical item, substituting fallbacks for anything missing.
///
/// Never fails: empty or absent text becomes [`DATA_UNAVAILABLE`], missing art
/// becomes [`PLACEHOLDER_COVER_URL`], and a year that does not start with four
/// digits becomes [`Year::Unavailable`].
pub fn normalize(
    id: impl Into<String>,
    media_type: MediaType,
    title: Option<&str>,
    artist: Option<&str>,
    image_url: Option<&str>,
    raw_year: Option<&str>,
) -> CollectionItem {
    CollectionItem {
        id: id.into(),
        media_type,
        title: text_or_unavailable(title),
        artist_or_producer: text_or_unavailable(artist),
        cover_image_url: match image_url {
            Some(url) if !url.is_empty() && url != NO_IMAGE_MARKER => url.to_string(),
            _ => PLACEHOLDER_COVER_URL.to_string(),
        },
        year: raw_year
            .filter(|raw| !raw.is_empty())
            .map(Year::from_date_like)
            .unwrap_or(Year::Unavailable),
        imported_at: Utc::now(),
        notes: String::new(),
    }
}

fn text_or_unavailable(value: Option<&str>) -> String {
    match value {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => DATA_UNAVAILABLE.to_string(),
    }
}
