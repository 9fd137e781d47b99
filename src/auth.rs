//! Desktop-application authorization: token → user approval → session key.
//!
//! See <https://www.last.fm/api/desktopauth>.

use crate::api::LastFmApiClient;
use crate::model::Session;
use crate::Result;
use async_trait::async_trait;

/// A token the provider issued and the user still has to approve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    /// Page where the user approves the token
    pub authorization_url: String,
}

/// The point where the handshake waits for the user.
///
/// Implementations show `token.authorization_url` to the user and return once
/// the user says they approved it. There is no timeout; returning an error
/// aborts the handshake.
#[async_trait(?Send)]
pub trait AuthorizationPrompt {
    async fn confirm(&self, token: &IssuedToken) -> Result<()>;
}

/// Step one: obtain a one-time token (`auth.getToken`).
///
/// Any failure reported by the provider becomes [`crate::LastFmError::AuthFailed`].
pub async fn request_token<C: LastFmApiClient + ?Sized>(client: &C) -> Result<IssuedToken> {
    let token = client
        .get_token()
        .await
        .map_err(|e| e.into_auth_failure())?;
    let authorization_url = client.authorization_url(&token)?;
    log::info!("Obtained authorization token");

    Ok(IssuedToken {
        token,
        authorization_url,
    })
}

/// Step two: exchange an approved token for a session (`auth.getSession`).
///
/// A token can be exchanged once; on failure the whole handshake starts over
/// with [`request_token`].
pub async fn exchange_token<C: LastFmApiClient + ?Sized>(
    client: &C,
    token: IssuedToken,
) -> Result<Session> {
    let session = client
        .get_session(&token.token)
        .await
        .map_err(|e| e.into_auth_failure())?;
    log::info!("Authorized session for user '{}'", session.name);
    Ok(session)
}

/// Run the whole handshake, suspending on `prompt` between the two steps.
///
/// # Examples
///
/// ```rust,no_run
/// use lastfm_history::{
///     authorize, AuthorizationPrompt, ClientConfig, Credentials, IssuedToken, LastFmApiClientImpl,
/// };
///
/// struct PrintOnly;
///
/// #[async_trait::async_trait(?Send)]
/// impl AuthorizationPrompt for PrintOnly {
///     async fn confirm(&self, token: &IssuedToken) -> lastfm_history::Result<()> {
///         println!("Approve {} then wait", token.authorization_url);
///         tokio::time::sleep(std::time::Duration::from_secs(60)).await;
///         Ok(())
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let client = LastFmApiClientImpl::new(
///     Box::new(http_client::native::NativeClient::new()),
///     Credentials::new("api_key", "secret"),
///     ClientConfig::default(),
/// );
/// let session = authorize(&client, &PrintOnly).await?;
/// println!("session for {}", session.name);
/// # Ok::<(), lastfm_history::LastFmError>(())
/// # });
/// ```
pub async fn authorize<C, P>(client: &C, prompt: &P) -> Result<Session>
where
    C: LastFmApiClient + ?Sized,
    P: AuthorizationPrompt + ?Sized,
{
    let token = request_token(client).await?;
    prompt.confirm(&token).await?;
    exchange_token(client, token).await
}
