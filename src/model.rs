//! Typed model of the Last.fm responses used by this crate.
//!
//! The wire format is JSON converted from XML, so numbers arrive as strings,
//! text content lives under `#text` and attributes under `@attr`. Wire structs
//! mirror that shape; the public types below are the validated projection.

use crate::{LastFmError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

// ================================================================================================
// TRACK METADATA
// ================================================================================================

/// Image size variants published by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSize {
    Small,
    Medium,
    Large,
    ExtraLarge,
}

/// A cover image variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Image {
    pub size: ImageSize,
    #[serde(rename = "#text")]
    pub url: String,
}

/// The artist of a scrobbled track.
///
/// `mbid` is the MusicBrainz identifier. The provider sends an empty string
/// when it has none; that is kept as `Some("")` and is distinct from `None`
/// (field absent).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Artist {
    #[serde(rename = "#text")]
    pub name: String,
    #[serde(default)]
    pub mbid: Option<String>,
}

/// The album of a scrobbled track. Both fields may be empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Album {
    #[serde(rename = "#text")]
    pub name: String,
    #[serde(default)]
    pub mbid: Option<String>,
}

/// One play from a user's history.
///
/// # Examples
///
/// ```rust
/// use lastfm_history::{Album, Artist, Track};
/// use chrono::{TimeZone, Utc};
///
/// let track = Track {
///     name: "The Only Way I Can Love You".to_string(),
///     mbid: None,
///     url: "https://www.last.fm/music/Suede".to_string(),
///     artist: Artist { name: "Suede".to_string(), mbid: None },
///     album: Album { name: "".to_string(), mbid: Some("".to_string()) },
///     images: vec![],
///     played_at: Utc.timestamp_opt(1711782712, 0).unwrap(),
/// };
/// assert_eq!(format!("{track}"), "Suede - The Only Way I Can Love You");
/// ```
///
/// Tracks serialize with these field names; they are built from the wire
/// format by [`RecentTracksPage::parse`], not deserialized directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Track {
    pub name: String,
    /// MusicBrainz track identifier, if the provider sent the field
    pub mbid: Option<String>,
    /// Canonical Last.fm page of the track
    pub url: String,
    pub artist: Artist,
    pub album: Album,
    pub images: Vec<Image>,
    /// When the play happened
    pub played_at: DateTime<Utc>,
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.album.name.is_empty() {
            write!(f, "{} - {}", self.artist.name, self.name)
        } else {
            write!(f, "{} - {} [{}]", self.artist.name, self.name, self.album.name)
        }
    }
}

// ================================================================================================
// PAGES
// ================================================================================================

/// Pagination attributes of a recent-tracks page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageAttributes {
    /// Current page number (1-indexed)
    #[serde(deserialize_with = "de::u32_from_any")]
    pub page: u32,
    /// Page size the provider applied
    #[serde(rename = "perPage", deserialize_with = "de::u32_from_any")]
    pub per_page: u32,
    /// Owner of the history
    pub user: String,
    /// Number of plays in the whole window
    #[serde(deserialize_with = "de::u64_from_any")]
    pub total: u64,
    /// Number of pages in the whole window; 0 when the window is empty
    #[serde(rename = "totalPages", deserialize_with = "de::u32_from_any")]
    pub total_pages: u32,
}

/// One page of `user.getRecentTracks`.
///
/// `raw_body` is the response body exactly as received and is what gets
/// persisted; `tracks` and `attributes` are its typed projection. Plays that
/// are still in progress ("now playing") are not part of `tracks`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentTracksPage {
    pub raw_body: String,
    pub tracks: Vec<Track>,
    pub attributes: PageAttributes,
    /// Round trip time of the request that produced this page
    pub elapsed: Duration,
}

impl RecentTracksPage {
    /// Parse a response body into a page.
    ///
    /// Any mismatch with the expected shape yields
    /// [`LastFmError::MalformedResponse`] carrying the body.
    pub fn parse(raw_body: String) -> Result<Self> {
        let response: ApiRecentTracksResponse = match serde_json::from_str(&raw_body) {
            Ok(response) => response,
            Err(e) => return Err(malformed(e.to_string(), raw_body)),
        };

        let attributes = response.recenttracks.attr;
        if attributes.page == 0 {
            return Err(malformed("page number 0 in pagination attributes", raw_body));
        }
        if attributes.total_pages > 0 && attributes.page > attributes.total_pages {
            let reason = format!(
                "page {} exceeds total pages {}",
                attributes.page, attributes.total_pages
            );
            return Err(malformed(reason, raw_body));
        }

        let mut tracks = Vec::new();
        for api_track in response.recenttracks.track.into_vec() {
            if api_track.is_now_playing() {
                log::debug!("Skipping now playing track '{}'", api_track.name);
                continue;
            }
            match api_track.into_track() {
                Ok(track) => tracks.push(track),
                Err(reason) => return Err(malformed(reason, raw_body)),
            }
        }

        Ok(Self {
            raw_body,
            tracks,
            attributes,
            elapsed: Duration::ZERO,
        })
    }

    pub fn page(&self) -> u32 {
        self.attributes.page
    }

    pub fn total_pages(&self) -> u32 {
        self.attributes.total_pages
    }

    /// Whether the provider reports pages after this one.
    pub fn has_next_page(&self) -> bool {
        self.attributes.page < self.attributes.total_pages
    }
}

fn malformed(reason: impl Into<String>, body: String) -> LastFmError {
    LastFmError::MalformedResponse {
        reason: reason.into(),
        body,
    }
}

// ================================================================================================
// AUTH RESPONSES
// ================================================================================================

/// Output of `auth.getToken`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Output of `auth.getSession`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionResponse {
    pub session: Session,
}

/// An authorized session.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Session {
    /// User name the session belongs to
    pub name: String,
    /// The session key, sent as `sk` on authenticated calls
    pub key: String,
    /// 1 if the user is a subscriber
    #[serde(deserialize_with = "de::u32_from_any")]
    pub subscriber: u32,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("name", &self.name)
            .field("key", &"<redacted>")
            .field("subscriber", &self.subscriber)
            .finish()
    }
}

/// Explicit error payload, e.g. `{"error": 10, "message": "Invalid API key"}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiErrorPayload {
    #[serde(deserialize_with = "de::u32_from_any")]
    pub error: u32,
    pub message: String,
}

// ================================================================================================
// WIRE TYPES
// ================================================================================================

#[derive(Deserialize)]
struct ApiRecentTracksResponse {
    recenttracks: ApiRecentTracks,
}

#[derive(Deserialize)]
struct ApiRecentTracks {
    track: OneOrMany<ApiTrack>,
    #[serde(rename = "@attr")]
    attr: PageAttributes,
}

/// A single-track page may arrive as an object instead of a list.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

#[derive(Deserialize)]
struct ApiTrack {
    name: String,
    #[serde(default)]
    mbid: Option<String>,
    url: String,
    artist: Artist,
    album: Album,
    #[serde(rename = "image", default)]
    images: Vec<Image>,
    date: Option<ApiDate>,
    #[serde(rename = "@attr")]
    attr: Option<ApiTrackAttr>,
}

#[derive(Deserialize)]
struct ApiDate {
    #[serde(deserialize_with = "de::i64_from_any")]
    uts: i64,
}

#[derive(Deserialize)]
struct ApiTrackAttr {
    nowplaying: Option<String>,
}

impl ApiTrack {
    fn is_now_playing(&self) -> bool {
        self.attr
            .as_ref()
            .and_then(|attr| attr.nowplaying.as_deref())
            == Some("true")
    }

    fn into_track(self) -> std::result::Result<Track, String> {
        let uts = self
            .date
            .ok_or_else(|| format!("track '{}' has no date", self.name))?
            .uts;
        let played_at = DateTime::from_timestamp(uts, 0)
            .ok_or_else(|| format!("track '{}' has out of range timestamp {uts}", self.name))?;

        Ok(Track {
            name: self.name,
            mbid: self.mbid,
            url: self.url,
            artist: self.artist,
            album: self.album,
            images: self.images,
            played_at,
        })
    }
}

mod de {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        Number(i64),
        String(String),
    }

    fn parse<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<i64> + std::str::FromStr,
    {
        use serde::de::Error;

        match StringOrNumber::deserialize(deserializer)? {
            StringOrNumber::Number(n) => {
                T::try_from(n).map_err(|_| D::Error::custom(format!("number {n} out of range")))
            }
            StringOrNumber::String(s) => s
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("expected a number, got '{s}'"))),
        }
    }

    pub fn u32_from_any<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<u32, D::Error> {
        parse(d)
    }

    pub fn u64_from_any<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<u64, D::Error> {
        parse(d)
    }

    pub fn i64_from_any<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<i64, D::Error> {
        parse(d)
    }
}
