use super::utils::create_client;
use super::ApiArgs;
use chrono::{NaiveDate, TimeDelta};
use lastfm_history::{download_pages, split_window_by_days, ClientConfig, DateWindow, PageWriter};
use std::path::PathBuf;
use std::time::Duration;

pub struct DownloadPlan {
    pub user: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub pause_millis: i64,
    pub dest_dir: PathBuf,
    pub split_days: Option<u32>,
    pub start_page: Option<u32>,
}

impl DownloadPlan {
    /// The windows to download, in order.
    fn windows(&self) -> lastfm_history::Result<Vec<DateWindow>> {
        match self.split_days {
            None => Ok(vec![DateWindow::from_dates(self.from, self.to)?]),
            Some(days) => split_window_by_days(self.from, self.to, TimeDelta::days(days.into()))?
                .map(|(start, end)| DateWindow::from_dates(start, end))
                .collect(),
        }
    }
}

/// Handle the download command
pub async fn handle_download_command(
    api: &ApiArgs,
    session_key: &str,
    plan: DownloadPlan,
) -> Result<(), Box<dyn std::error::Error>> {
    let writer = PageWriter::new(&plan.dest_dir)?;
    let windows = plan.windows()?;
    let client = create_client(api, Some(session_key), ClientConfig::default());

    log::info!(
        "Downloading plays of '{}' from {} to {} in {} window(s) into {}",
        plan.user,
        plan.from,
        plan.to,
        windows.len(),
        writer.dest_dir().display()
    );

    let mut total_pages = 0;
    let mut total_tracks = 0;

    for (index, window) in windows.into_iter().enumerate() {
        if index > 0 && plan.pause_millis > 0 {
            tokio::time::sleep(Duration::from_millis(plan.pause_millis as u64)).await;
        }

        let mut pages = client.recent_tracks(&plan.user, window, plan.pause_millis)?;
        if let Some(start_page) = plan.start_page {
            pages = pages.with_starting_page(start_page)?;
        }

        let summary = download_pages(&mut pages, &writer).await?;
        log::info!(
            "Window {} to {}: {} page(s), {} track(s)",
            window.start(),
            window.end(),
            summary.pages_written,
            summary.tracks
        );
        total_pages += summary.pages_written;
        total_tracks += summary.tracks;
    }

    println!("✅ Downloaded {total_pages} page(s) with {total_tracks} track(s)");

    Ok(())
}
