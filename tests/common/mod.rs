#![allow(dead_code)]
use http_client_vcr::{NoOpClient, VcrClient, VcrMode};
use lastfm_history::{
    ClientConfig, ClientEvent, ClientEventReceiver, Credentials, LastFmApiClientImpl,
};

pub const API_KEY: &str = "test_api_key";
pub const SECRET: &str = "test_secret";
pub const SESSION_KEY: &str = "test_session_key";

pub const SUEDE_PAGE: &str = include_str!("../fixtures/recent_tracks_suede.json");

/// A VCR client replaying `tests/fixtures/{test_name}.yaml`.
///
/// Requests without a recorded interaction fail; nothing reaches the network.
pub async fn create_vcr_client(test_name: &str) -> Result<VcrClient, Box<dyn std::error::Error>> {
    let cassette_path = format!("tests/fixtures/{test_name}.yaml");

    // Fail fast instead of recording into a fresh cassette
    if !std::path::Path::new(&cassette_path).exists() {
        return Err(format!("No cassette found at '{cassette_path}'").into());
    }

    let vcr_client = VcrClient::builder(&cassette_path)
        .inner_client(Box::new(NoOpClient::new()))
        .mode(VcrMode::Replay)
        .build()
        .await?;

    Ok(vcr_client)
}

/// An authorized client replaying `test_name`.
pub async fn create_authorized_vcr_test_client(
    test_name: &str,
) -> Result<LastFmApiClientImpl, Box<dyn std::error::Error>> {
    let vcr_client = create_vcr_client(test_name).await?;
    Ok(LastFmApiClientImpl::new(
        Box::new(vcr_client),
        Credentials::new(API_KEY, SECRET).with_session_key(SESSION_KEY),
        ClientConfig::default(),
    ))
}

/// A client without a session key replaying `test_name`, as used during the handshake.
pub async fn create_unauthorized_vcr_test_client(
    test_name: &str,
) -> Result<LastFmApiClientImpl, Box<dyn std::error::Error>> {
    let vcr_client = create_vcr_client(test_name).await?;
    Ok(LastFmApiClientImpl::new(
        Box::new(vcr_client),
        Credentials::new(API_KEY, SECRET),
        ClientConfig::default(),
    ))
}

/// Every request announced on `events` so far, as its query parameters.
pub fn started_requests(events: &mut ClientEventReceiver) -> Vec<Vec<(String, String)>> {
    let mut requests = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let ClientEvent::RequestStarted { request } = event {
            requests.push(request.query_params);
        }
    }
    requests
}

/// The value of `key` in each of `requests`.
pub fn param_values(requests: &[Vec<(String, String)>], key: &str) -> Vec<String> {
    requests
        .iter()
        .filter_map(|params| params.iter().find(|(k, _)| k == key))
        .map(|(_, v)| v.clone())
        .collect()
}
