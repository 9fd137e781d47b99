//! Client for the Last.fm web API that downloads a user's listening history.
//!
//! Requests are signed with the application secret ([`sign`]), a session key is
//! obtained once through the desktop authorization handshake ([`authorize`]),
//! and history is fetched page by page ([`RecentTracksPages`]) with a pause
//! between requests. Each page body is stored verbatim ([`PageWriter`]).

pub mod api;
pub mod auth;
pub mod config;
pub mod credentials;
pub mod download;
pub mod error;
pub mod events;
pub mod iterator;
pub mod model;
pub mod request;
pub mod signature;
pub mod window;

pub use api::{LastFmApiClient, LastFmApiClientImpl};
pub use auth::{authorize, exchange_token, request_token, AuthorizationPrompt, IssuedToken};
pub use config::ClientConfig;
pub use credentials::Credentials;
pub use download::{download_pages, DownloadSummary, PageWriter};
pub use error::LastFmError;
pub use events::{ClientEvent, ClientEventReceiver, RequestInfo, SharedEventBroadcaster};
pub use iterator::{AsyncPaginatedIterator, RecentTracksPages};
pub use model::{Album, Artist, Image, ImageSize, PageAttributes, RecentTracksPage, Session, Track};
pub use request::{ApiMethod, SignedRequest};
pub use signature::sign;
pub use window::{split_window, split_window_by_days, DateWindow, WindowBound, WindowSplit};

#[cfg(feature = "mock")]
pub use api::MockLastFmApiClient;

pub type Result<T> = std::result::Result<T, LastFmError>;
