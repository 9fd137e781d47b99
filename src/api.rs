use crate::config::ClientConfig;
use crate::credentials::Credentials;
use crate::events::{ClientEvent, ClientEventReceiver, RequestInfo, SharedEventBroadcaster};
use crate::iterator::RecentTracksPages;
use crate::model::{ApiErrorPayload, RecentTracksPage, Session, SessionResponse, TokenResponse};
use crate::request::{params, ApiMethod, Params, SignedRequest};
use crate::window::DateWindow;
use crate::{LastFmError, Result};
use async_trait::async_trait;
use http_client::{HttpClient, Request};
use http_types::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};

// =============================================================================
// LastFmApiClient trait and implementation
// =============================================================================

/// Signed calls to the Last.fm web API.
///
/// This is the seam the pagination driver and the authorization handshake are
/// written against. With the `mock` feature enabled, `MockLastFmApiClient` is
/// generated for it.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait(?Send)]
pub trait LastFmApiClient {
    /// Fetch one page of `user`'s plays inside `window`.
    ///
    /// `page` defaults to 1 and must be at least 1.
    async fn get_recent_tracks_page(
        &self,
        user: &str,
        window: &DateWindow,
        page: Option<u32>,
    ) -> Result<RecentTracksPage>;

    /// Request a one-time token (`auth.getToken`).
    async fn get_token(&self) -> Result<String>;

    /// Exchange an authorized token for a session (`auth.getSession`).
    async fn get_session(&self, token: &str) -> Result<Session>;

    /// The page where a user authorizes `token` for this application.
    fn authorization_url(&self, token: &str) -> Result<String>;
}

#[derive(Clone)]
pub struct LastFmApiClientImpl {
    client: Arc<dyn HttpClient + Send + Sync>,
    credentials: Credentials,
    config: ClientConfig,
    broadcaster: Arc<SharedEventBroadcaster>,
}

impl LastFmApiClientImpl {
    pub fn new(
        client: Box<dyn HttpClient + Send + Sync>,
        credentials: Credentials,
        config: ClientConfig,
    ) -> Self {
        Self {
            client: Arc::from(client),
            credentials,
            config,
            broadcaster: Arc::new(SharedEventBroadcaster::new()),
        }
    }

    pub fn subscribe(&self) -> ClientEventReceiver {
        self.broadcaster.subscribe()
    }

    pub fn latest_event(&self) -> Option<ClientEvent> {
        self.broadcaster.latest_event()
    }

    pub fn broadcaster(&self) -> Arc<SharedEventBroadcaster> {
        Arc::clone(&self.broadcaster)
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// All pages of `user`'s plays inside `window`, fetched lazily with
    /// `pause_millis` between requests.
    pub fn recent_tracks(
        &self,
        user: &str,
        window: DateWindow,
        pause_millis: i64,
    ) -> Result<RecentTracksPages<Self>> {
        Ok(RecentTracksPages::new(self.clone(), user, window, pause_millis)?
            .with_broadcaster(self.broadcaster()))
    }

    /// Send a signed GET and return the body of a successful response.
    async fn send_signed(&self, request: SignedRequest) -> Result<(String, Duration)> {
        let url = request.to_url(&self.config.endpoint()?);
        let request_info = RequestInfo::from_url_and_method(&url, "GET");
        let request_start = Instant::now();

        log::debug!("Sending {}", request_info.short_description());
        self.broadcaster
            .broadcast_event(ClientEvent::RequestStarted {
                request: request_info.clone(),
            });

        let mut response = self
            .client
            .send(Request::new(Method::Get, url))
            .await
            .map_err(|e| LastFmError::Http(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .body_bytes()
            .await
            .map_err(|e| LastFmError::Http(e.to_string()))?;
        let elapsed = request_start.elapsed();

        self.broadcaster
            .broadcast_event(ClientEvent::RequestCompleted {
                request: request_info,
                status_code: status.into(),
                duration_ms: elapsed.as_millis() as u64,
            });

        let body = decode_body(bytes)?;
        let body = check_response(status, body)?;
        Ok((body, elapsed))
    }

    async fn call<T: DeserializeOwned>(&self, method: ApiMethod, call_params: Params) -> Result<T> {
        let request = SignedRequest::build(&self.credentials, method, call_params);
        let (body, _) = self.send_signed(request).await?;
        parse_json(body)
    }
}

#[async_trait(?Send)]
impl LastFmApiClient for LastFmApiClientImpl {
    async fn get_recent_tracks_page(
        &self,
        user: &str,
        window: &DateWindow,
        page: Option<u32>,
    ) -> Result<RecentTracksPage> {
        let page = validate_page(page)?;

        let request = SignedRequest::build(
            &self.credentials,
            ApiMethod::UserGetRecentTracks,
            params([
                ("user", Some(user.to_string())),
                ("from", Some(window.start().timestamp().to_string())),
                ("to", Some(window.end().timestamp().to_string())),
                ("page", Some(page.to_string())),
                ("limit", Some(self.config.page_limit.to_string())),
            ]),
        );

        let (body, elapsed) = self.send_signed(request).await?;
        let mut recent_tracks = RecentTracksPage::parse(body)?;
        recent_tracks.elapsed = elapsed;

        log::debug!(
            "Recent tracks page {}/{} for '{}' took {:.3} seconds",
            recent_tracks.page(),
            recent_tracks.total_pages(),
            user,
            elapsed.as_secs_f64()
        );

        Ok(recent_tracks)
    }

    async fn get_token(&self) -> Result<String> {
        let response: TokenResponse = self.call(ApiMethod::AuthGetToken, Params::new()).await?;
        Ok(response.token)
    }

    async fn get_session(&self, token: &str) -> Result<Session> {
        let response: SessionResponse = self
            .call(ApiMethod::AuthGetSession, params([("token", Some(token))]))
            .await?;
        Ok(response.session)
    }

    fn authorization_url(&self, token: &str) -> Result<String> {
        Ok(self
            .config
            .authorization_url(self.credentials.api_key(), token)?
            .to_string())
    }
}

/// Resolve the optional page argument, rejecting 0.
pub fn validate_page(page: Option<u32>) -> Result<u32> {
    match page {
        None => Ok(1),
        Some(0) => Err(LastFmError::InvalidArgument(
            "page must be greater than or equal to 1".to_string(),
        )),
        Some(page) => Ok(page),
    }
}

/// Decode a response body as UTF-8.
///
/// A body that is not valid UTF-8 was still delivered by the provider, so it is
/// reported as [`LastFmError::MalformedResponse`] with a lossy copy of the bytes.
pub fn decode_body(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| {
        let body = String::from_utf8_lossy(e.as_bytes()).into_owned();
        LastFmError::MalformedResponse {
            reason: format!("response body is not valid UTF-8: {}", e.utf8_error()),
            body,
        }
    })
}

/// Turn explicit error payloads and non-2xx statuses into [`LastFmError::Provider`].
pub fn check_response(status: StatusCode, body: String) -> Result<String> {
    if let Ok(payload) = serde_json::from_str::<ApiErrorPayload>(&body) {
        return Err(LastFmError::Provider {
            http_status: status.into(),
            code: Some(payload.error),
            message: payload.message,
        });
    }

    if !status.is_success() {
        return Err(LastFmError::Provider {
            http_status: status.into(),
            code: None,
            message: status.canonical_reason().to_string(),
        });
    }

    Ok(body)
}

fn parse_json<T: DeserializeOwned>(body: String) -> Result<T> {
    match serde_json::from_str(&body) {
        Ok(value) => Ok(value),
        Err(e) => Err(LastFmError::MalformedResponse {
            reason: e.to_string(),
            body,
        }),
    }
}
