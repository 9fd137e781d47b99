use super::ApiArgs;
use lastfm_history::{ClientConfig, Credentials, LastFmApiClientImpl};

/// Build a client over the native HTTP backend.
pub fn create_client(
    api: &ApiArgs,
    session_key: Option<&str>,
    config: ClientConfig,
) -> LastFmApiClientImpl {
    let mut credentials = Credentials::new(&api.api_key, &api.secret);
    if let Some(key) = session_key {
        credentials = credentials.with_session_key(key);
    }

    let http_client = http_client::native::NativeClient::new();
    let client = LastFmApiClientImpl::new(
        Box::new(http_client),
        credentials,
        config.with_base_url(&api.base_url),
    );

    log::debug!(
        "Client for {} ({}, {} plays per page)",
        client.config().base_url,
        if client.credentials().is_authorized() {
            "with session key"
        } else {
            "without session key"
        },
        client.config().page_limit
    );
    client
}
