use std::fmt;

/// Application and user credentials for the Last.fm web API.
///
/// The API key is public. The shared secret is only ever used to compute
/// request signatures and is never sent. The session key represents a user
/// authorization and is obtained once through [`crate::authorize`].
///
/// The [`Debug`] implementation redacts the secret and the session key so a
/// `Credentials` value can be logged safely.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    secret: String,
    session_key: Option<String>,
}

impl Credentials {
    /// Credentials for unauthenticated calls (the token handshake).
    pub fn new(api_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret: secret.into(),
            session_key: None,
        }
    }

    /// Attach a session key, making calls authenticated (`sk` is sent).
    pub fn with_session_key(mut self, session_key: impl Into<String>) -> Self {
        self.session_key = Some(session_key.into());
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn session_key(&self) -> Option<&str> {
        self.session_key.as_deref()
    }

    pub fn is_authorized(&self) -> bool {
        self.session_key.is_some()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("secret", &"<redacted>")
            .field("session_key", &self.session_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
