pub mod auth;
pub mod download;
pub mod utils;

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use lastfm_history::config::{DEFAULT_AUTH_URL, DEFAULT_BASE_URL, DEFAULT_PAUSE_MILLIS};
use std::path::PathBuf;

/// Application credentials shared by every subcommand
#[derive(Args, Debug)]
pub struct ApiArgs {
    /// Application API key
    #[arg(long, env = "LASTFM_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Application shared secret
    #[arg(long, env = "LASTFM_SECRET", hide_env_values = true)]
    pub secret: String,

    /// Base URL of the web API
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Authorize this application and print a session key
    ///
    /// Opens the desktop authorization flow: a token is requested, you approve
    /// it in the browser, and the token is exchanged for a session key. The key
    /// is printed on stdout so it can be captured into LASTFM_SESSION_KEY.
    ///
    /// Usage examples:
    /// # Print a session key
    /// lastfm-history auth --api-key KEY --secret SECRET
    ///
    /// # Capture it for later downloads
    /// export LASTFM_SESSION_KEY=$(lastfm-history auth)
    Auth {
        #[command(flatten)]
        api: ApiArgs,

        /// Page where the user approves the token
        #[arg(long, default_value = DEFAULT_AUTH_URL)]
        auth_url: String,
    },

    /// Download a user's plays between two dates
    ///
    /// Every page of `user.getRecentTracks` is written verbatim to its own file
    /// in the destination directory. Both dates are inclusive and interpreted
    /// in UTC.
    ///
    /// Usage examples:
    /// # Download March 2024 into ./history
    /// lastfm-history download --user rj --from 2024-03-01 --to 2024-03-31 --dest-dir history
    ///
    /// # Split a year into weekly windows
    /// lastfm-history download --user rj --from 2023-01-01 --to 2023-12-31 --split-days 7
    ///
    /// # Resume an interrupted download at page 12
    /// lastfm-history download --user rj --from 2024-03-01 --to 2024-03-31 --start-page 12
    Download {
        #[command(flatten)]
        api: ApiArgs,

        /// Session key obtained with the `auth` subcommand
        #[arg(long, env = "LASTFM_SESSION_KEY", hide_env_values = true)]
        session: String,

        /// User whose history is downloaded
        #[arg(long)]
        user: String,

        /// First day to download (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,

        /// Last day to download (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,

        /// Milliseconds to wait between requests
        #[arg(long, default_value_t = DEFAULT_PAUSE_MILLIS, allow_negative_numbers = true)]
        pause: i64,

        /// Existing directory the pages are written to
        #[arg(long, default_value = ".")]
        dest_dir: PathBuf,

        /// Download in windows of this many days (at least 2)
        #[arg(long, conflicts_with = "start_page")]
        split_days: Option<u32>,

        /// Page to resume from
        #[arg(long)]
        start_page: Option<u32>,
    },
}

/// Execute the appropriate command handler based on the parsed command
pub async fn execute_command(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Auth { api, auth_url } => auth::handle_auth_command(&api, &auth_url).await,

        Commands::Download {
            api,
            session,
            user,
            from,
            to,
            pause,
            dest_dir,
            split_days,
            start_page,
        } => {
            let plan = download::DownloadPlan {
                user,
                from,
                to,
                pause_millis: pause,
                dest_dir,
                split_days,
                start_page,
            };
            download::handle_download_command(&api, &session, plan).await
        }
    }
}
