use thiserror::Error;

/// Error types for Last.fm API operations.
///
/// Every failure aborts the current operation and is reported to the immediate
/// caller. Nothing in this crate retries on its own: re-running a download is
/// safe because page fetches are idempotent and page files are overwritten by
/// name.
///
/// # Error Handling Examples
///
/// ```rust,no_run
/// use lastfm_history::{DateWindow, LastFmApiClient, LastFmApiClientImpl, LastFmError};
/// use lastfm_history::{ClientConfig, Credentials};
///
/// #[tokio::main]
/// async fn main() {
///     let client = LastFmApiClientImpl::new(
///         Box::new(http_client::native::NativeClient::new()),
///         Credentials::new("key", "secret").with_session_key("sk"),
///         ClientConfig::default(),
///     );
///     let window = DateWindow::from_dates(
///         chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
///         chrono::NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
///     )
///     .unwrap();
///
///     match client.get_recent_tracks_page("rj", &window, Some(1)).await {
///         Ok(page) => println!("{} tracks", page.tracks.len()),
///         Err(LastFmError::Provider { code: Some(29), .. }) => eprintln!("Rate limited"),
///         Err(e @ LastFmError::MalformedResponse { .. }) => {
///             eprintln!("{e}: {}", e.raw_body().unwrap_or_default())
///         }
///         Err(e) => eprintln!("Other error: {e}"),
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum LastFmError {
    /// The caller passed an argument outside the accepted domain.
    ///
    /// Examples are a page number of 0, a negative pause, or a window whose end
    /// precedes its start. These fail before any request is issued.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The provider answered with a non-2xx status or an explicit error payload.
    ///
    /// `code` is the provider's numeric error code when the body carried one
    /// (for instance 29 for rate limiting, 9 for an invalid session key).
    #[error("Provider error (HTTP {http_status}, code {code:?}): {message}")]
    Provider {
        /// HTTP status of the response
        http_status: u16,
        /// Provider error code, if the body contained one
        code: Option<u32>,
        /// Provider error message, or the HTTP reason when there was none
        message: String,
    },

    /// The response body did not match the expected schema.
    ///
    /// The raw body is kept for diagnostics, see [`LastFmError::raw_body`].
    #[error("Malformed response: {reason}")]
    MalformedResponse {
        /// What did not match
        reason: String,
        /// The body exactly as received
        body: String,
    },

    /// The token/session handshake failed and must be restarted from scratch.
    #[error("Authentication failed (code {code:?}): {message}")]
    AuthFailed {
        /// Provider error code, if any
        code: Option<u32>,
        /// Provider error message
        message: String,
    },

    /// HTTP/network related errors.
    ///
    /// This includes connection failures, timeouts, DNS errors, and other
    /// low-level networking issues. Transient and permanent failures are not
    /// distinguished.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Invalid process configuration, detected before any request is made.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system I/O errors while persisting pages.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LastFmError {
    /// The raw response body attached to a [`LastFmError::MalformedResponse`].
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            LastFmError::MalformedResponse { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Convert a provider failure into the handshake-specific error.
    ///
    /// Errors that did not come from the provider are passed through unchanged.
    pub(crate) fn into_auth_failure(self) -> Self {
        match self {
            LastFmError::Provider { code, message, .. } => LastFmError::AuthFailed { code, message },
            LastFmError::MalformedResponse { reason, .. } => LastFmError::AuthFailed {
                code: None,
                message: reason,
            },
            other => other,
        }
    }
}
