//! Persisting recent-tracks pages to disk.

use crate::api::LastFmApiClient;
use crate::iterator::{AsyncPaginatedIterator, RecentTracksPages};
use crate::model::RecentTracksPage;
use crate::window::DateWindow;
use crate::{LastFmError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes each page's raw body to its own file in an existing directory.
///
/// File names are derived from the window and the page number only, so
/// re-running a download overwrites the same files.
#[derive(Debug, Clone)]
pub struct PageWriter {
    dest_dir: PathBuf,
}

impl PageWriter {
    /// Fails with [`LastFmError::Config`] if `dest_dir` is not an existing directory.
    pub fn new(dest_dir: impl Into<PathBuf>) -> Result<Self> {
        let dest_dir = dest_dir.into();
        if !dest_dir.is_dir() {
            return Err(LastFmError::Config(format!(
                "Directory does not exist: {}",
                dest_dir.display()
            )));
        }
        Ok(Self { dest_dir })
    }

    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    /// Where page `page` of `window` is stored.
    pub fn page_path(&self, window: &DateWindow, page: u32) -> PathBuf {
        self.dest_dir.join(window.page_file_name(page))
    }

    /// Write the page body verbatim, replacing any previous file.
    pub fn write_page(&self, window: &DateWindow, page: &RecentTracksPage) -> Result<PathBuf> {
        let path = self.page_path(window, page.page());
        fs::write(&path, page.raw_body.as_bytes())?;
        log::debug!("Wrote {} bytes to {}", page.raw_body.len(), path.display());
        Ok(path)
    }
}

/// Summary of a finished window download.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub pages_written: u32,
    pub tracks: usize,
    pub files: Vec<PathBuf>,
}

/// Drain `pages` into `writer`, one file per page.
///
/// The first error stops the download; pages already written stay on disk.
pub async fn download_pages<C: LastFmApiClient>(
    pages: &mut RecentTracksPages<C>,
    writer: &PageWriter,
) -> Result<DownloadSummary> {
    let window = *pages.window();
    let mut summary = DownloadSummary::default();

    while let Some(page) = pages.next().await? {
        let path = writer.write_page(&window, &page)?;
        log::info!(
            "Saved page {}/{} ({} tracks) to {}",
            page.page(),
            page.total_pages(),
            page.tracks.len(),
            path.display()
        );
        summary.pages_written += 1;
        summary.tracks += page.tracks.len();
        summary.files.push(path);
    }

    Ok(summary)
}
