use super::utils::create_client;
use super::ApiArgs;
use async_trait::async_trait;
use lastfm_history::{authorize, AuthorizationPrompt, ClientConfig, IssuedToken};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Asks on stderr and waits for a line on stdin.
struct ConsolePrompt;

#[async_trait(?Send)]
impl AuthorizationPrompt for ConsolePrompt {
    async fn confirm(&self, token: &IssuedToken) -> lastfm_history::Result<()> {
        eprintln!(
            "Go to {} and press return after you log in.",
            token.authorization_url
        );

        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await?;
        Ok(())
    }
}

/// Handle the auth command
pub async fn handle_auth_command(
    api: &ApiArgs,
    auth_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = create_client(api, None, ClientConfig::new().with_auth_url(auth_url));

    let session = authorize(&client, &ConsolePrompt).await?;
    eprintln!("✅ Authorized as '{}'", session.name);
    println!("{}", session.key);

    Ok(())
}
