use crate::{LastFmError, Result};
use http_types::Url;

/// Default root of the Last.fm web service.
pub const DEFAULT_BASE_URL: &str = "https://ws.audioscrobbler.com/";

/// Page where a user authorizes a desktop-application token.
pub const DEFAULT_AUTH_URL: &str = "https://www.last.fm/api/auth/";

/// Largest page size the provider honors for `user.getRecentTracks`.
pub const MAX_PAGE_LIMIT: u32 = 200;

/// Default pause between page requests, in milliseconds.
pub const DEFAULT_PAUSE_MILLIS: i64 = 1000;

/// Client configuration.
///
/// Credentials are kept separately in [`crate::Credentials`]; this struct only
/// holds where requests go and how large pages are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Root URL of the web service; requests go to `{base_url}2.0/`
    pub base_url: String,
    /// Authorization page presented to the user during the handshake
    pub auth_url: String,
    /// Page size requested from `user.getRecentTracks`
    pub page_limit: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            page_limit: MAX_PAGE_LIMIT,
        }
    }
}

impl ClientConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the client at another service root (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Use another authorization page.
    pub fn with_auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into();
        self
    }

    /// The API endpoint, `{base_url}` joined with `2.0/`.
    pub fn endpoint(&self) -> Result<Url> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| LastFmError::Config(format!("Invalid base URL '{}': {e}", self.base_url)))?;
        base.join("2.0/")
            .map_err(|e| LastFmError::Config(format!("Invalid base URL '{}': {e}", self.base_url)))
    }

    /// The URL the user must visit to authorize `token`.
    pub fn authorization_url(&self, api_key: &str, token: &str) -> Result<Url> {
        let mut url = Url::parse(&self.auth_url)
            .map_err(|e| LastFmError::Config(format!("Invalid auth URL '{}': {e}", self.auth_url)))?;
        url.query_pairs_mut()
            .append_pair("api_key", api_key)
            .append_pair("token", token);
        Ok(url)
    }
}
