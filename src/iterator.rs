use crate::api::{validate_page, LastFmApiClient};
use crate::events::{ClientEvent, SharedEventBroadcaster};
use crate::model::RecentTracksPage;
use crate::window::DateWindow;
use crate::{LastFmError, Result};

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Async iterator trait for paginated Last.fm data.
///
/// Iterators are single-pass: items are produced in order, once, and an
/// exhausted or failed iterator cannot be restarted.
#[async_trait(?Send)]
pub trait AsyncPaginatedIterator<T> {
    /// Fetch the next item from the iterator.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(item))` - Next item in the sequence
    /// - `Ok(None)` - No more items available
    /// - `Err(...)` - Network or parsing error occurred; the sequence ends here
    async fn next(&mut self) -> Result<Option<T>>;

    /// Collect all remaining items into a Vec.
    ///
    /// **Warning**: This method will fetch ALL remaining pages. Use
    /// [`take`](Self::take) for bounded collection.
    async fn collect_all(&mut self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }

    /// Take up to n items from the iterator.
    ///
    /// # Arguments
    ///
    /// * `n` - Maximum number of items to collect
    async fn take(&mut self, n: usize) -> Result<Vec<T>> {
        let mut items = Vec::new();
        for _ in 0..n {
            match self.next().await? {
                Some(item) => items.push(item),
                None => break,
            }
        }
        Ok(items)
    }

    /// Get the page number of the most recently fetched page (0 before the first fetch).
    fn current_page(&self) -> u32;

    /// Get the total number of pages, if known.
    ///
    /// This information is not available until at least one page has been fetched.
    fn total_pages(&self) -> Option<u32> {
        None
    }
}

/// Lazily fetches every page of a user's plays inside a window.
///
/// Each call to [`next`](AsyncPaginatedIterator::next) performs at most one
/// request. Before every request after the first one the iterator sleeps for
/// the configured pause, which keeps the request rate under the provider's
/// limits. The number of pages is taken from the first fetched page and is
/// not re-read from later pages.
///
/// # Examples
///
/// ```rust,no_run
/// use lastfm_history::{
///     AsyncPaginatedIterator, ClientConfig, Credentials, DateWindow, LastFmApiClientImpl,
/// };
/// use chrono::NaiveDate;
///
/// # tokio_test::block_on(async {
/// let client = LastFmApiClientImpl::new(
///     Box::new(http_client::native::NativeClient::new()),
///     Credentials::new("api_key", "secret").with_session_key("session_key"),
///     ClientConfig::default(),
/// );
/// let window = DateWindow::from_dates(
///     NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
/// )?;
///
/// let mut pages = client.recent_tracks("rj", window, 1000)?;
/// while let Some(page) = pages.next().await? {
///     println!("page {}/{}: {} tracks", page.page(), page.total_pages(), page.tracks.len());
/// }
/// # Ok::<(), lastfm_history::LastFmError>(())
/// # });
/// ```
pub struct RecentTracksPages<C: LastFmApiClient> {
    client: C,
    user: String,
    window: DateWindow,
    pause: Duration,
    next_page: u32,
    last_page: u32,
    total_pages: Option<u32>,
    finished: bool,
    broadcaster: Option<Arc<SharedEventBroadcaster>>,
}

#[async_trait(?Send)]
impl<C: LastFmApiClient> AsyncPaginatedIterator<RecentTracksPage> for RecentTracksPages<C> {
    async fn next(&mut self) -> Result<Option<RecentTracksPage>> {
        if self.finished {
            return Ok(None);
        }

        if let Some(total_pages) = self.total_pages {
            if self.next_page > total_pages {
                self.finished = true;
                return Ok(None);
            }
            self.pause_before(total_pages).await;
        }

        let result = self
            .client
            .get_recent_tracks_page(&self.user, &self.window, Some(self.next_page))
            .await;

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                log::warn!(
                    "Fetching page {} of recent tracks for '{}' failed: {e}",
                    self.next_page,
                    self.user
                );
                self.finished = true;
                return Err(e);
            }
        };

        let total_pages = *self.total_pages.get_or_insert(page.total_pages());
        if page.total_pages() != total_pages {
            log::debug!(
                "Page {} reports {} total pages, keeping {} from the first page",
                self.next_page,
                page.total_pages(),
                total_pages
            );
        }

        self.last_page = self.next_page;
        self.next_page += 1;
        if self.last_page >= total_pages {
            self.finished = true;
        }

        Ok(Some(page))
    }

    fn current_page(&self) -> u32 {
        self.last_page
    }

    fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }
}

impl<C: LastFmApiClient> RecentTracksPages<C> {
    /// Create a new iterator starting from page 1.
    ///
    /// `pause_millis` is the delay between requests; 0 disables pacing and a
    /// negative value fails with [`LastFmError::InvalidArgument`] before any
    /// request is made.
    pub fn new(client: C, user: &str, window: DateWindow, pause_millis: i64) -> Result<Self> {
        let pause_millis = u64::try_from(pause_millis).map_err(|_| {
            LastFmError::InvalidArgument(format!(
                "pause must be greater than or equal to 0, got {pause_millis}"
            ))
        })?;

        Ok(Self {
            client,
            user: user.to_string(),
            window,
            pause: Duration::from_millis(pause_millis),
            next_page: 1,
            last_page: 0,
            total_pages: None,
            finished: false,
            broadcaster: None,
        })
    }

    /// Resume from a specific page (1-indexed) instead of page 1.
    ///
    /// The first page fetched still supplies the total page count. Useful for
    /// continuing an interrupted download.
    pub fn with_starting_page(mut self, starting_page: u32) -> Result<Self> {
        self.next_page = validate_page(Some(starting_page))?;
        Ok(self)
    }

    /// Report pauses on `broadcaster` as [`ClientEvent::PageDelay`].
    pub fn with_broadcaster(mut self, broadcaster: Arc<SharedEventBroadcaster>) -> Self {
        self.broadcaster = Some(broadcaster);
        self
    }

    pub fn window(&self) -> &DateWindow {
        &self.window
    }

    async fn pause_before(&self, total_pages: u32) {
        if self.pause.is_zero() {
            return;
        }

        log::debug!(
            "Sleeping for {} milliseconds before page {}/{}",
            self.pause.as_millis(),
            self.next_page,
            total_pages
        );
        if let Some(broadcaster) = &self.broadcaster {
            broadcaster.broadcast_event(ClientEvent::PageDelay {
                next_page: self.next_page,
                total_pages,
                delay_ms: self.pause.as_millis() as u64,
            });
        }
        tokio::time::sleep(self.pause).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PageAttributes, Session};
    use chrono::NaiveDate;
    use std::cell::RefCell;

    /// Serves pages with fixed `total_pages` values and records requested page numbers.
    struct FakeClient {
        totals: Vec<u32>,
        fail_on: Option<u32>,
        requested: RefCell<Vec<u32>>,
    }

    impl FakeClient {
        fn new(totals: Vec<u32>) -> Self {
            Self {
                totals,
                fail_on: None,
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    #[async_trait(?Send)]
    impl<'a> LastFmApiClient for &'a FakeClient {
        async fn get_recent_tracks_page(
            &self,
            user: &str,
            _window: &DateWindow,
            page: Option<u32>,
        ) -> Result<RecentTracksPage> {
            let page = validate_page(page)?;
            self.requested.borrow_mut().push(page);
            if self.fail_on == Some(page) {
                return Err(LastFmError::Http("connection reset".to_string()));
            }
            let total_pages = self.totals[(page - 1) as usize];
            Ok(RecentTracksPage {
                raw_body: format!("page {page}"),
                tracks: Vec::new(),
                attributes: PageAttributes {
                    page,
                    per_page: 200,
                    user: user.to_string(),
                    total: 0,
                    total_pages,
                },
                elapsed: Duration::ZERO,
            })
        }

        async fn get_token(&self) -> Result<String> {
            unreachable!()
        }

        async fn get_session(&self, _token: &str) -> Result<Session> {
            unreachable!()
        }

        fn authorization_url(&self, _token: &str) -> Result<String> {
            unreachable!()
        }
    }

    fn window() -> DateWindow {
        DateWindow::from_dates(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_stops_at_reported_total() {
        let client = FakeClient::new(vec![3, 3, 3, 3]);
        let mut pages = RecentTracksPages::new(&client, "rj", window(), 0).unwrap();

        let collected = pages.collect_all().await.unwrap();
        assert_eq!(
            collected.iter().map(|p| p.page()).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(*client.requested.borrow(), vec![1, 2, 3]);
        assert_eq!(pages.current_page(), 3);
        assert_eq!(pages.total_pages(), Some(3));

        // Exhausted: no further requests
        assert!(pages.next().await.unwrap().is_none());
        assert_eq!(client.requested.borrow().len(), 3);
    }

    #[tokio::test]
    async fn test_single_page_and_empty_window() {
        let client = FakeClient::new(vec![1]);
        let mut pages = RecentTracksPages::new(&client, "rj", window(), 0).unwrap();
        assert_eq!(pages.collect_all().await.unwrap().len(), 1);
        assert_eq!(*client.requested.borrow(), vec![1]);

        let client = FakeClient::new(vec![0]);
        let mut pages = RecentTracksPages::new(&client, "rj", window(), 0).unwrap();
        assert_eq!(pages.collect_all().await.unwrap().len(), 1);
        assert_eq!(*client.requested.borrow(), vec![1]);
    }

    #[tokio::test]
    async fn test_first_page_total_is_trusted() {
        // Later pages claim more pages exist; only the first answer counts
        let client = FakeClient::new(vec![2, 5, 5, 5, 5]);
        let mut pages = RecentTracksPages::new(&client, "rj", window(), 0).unwrap();
        assert_eq!(pages.collect_all().await.unwrap().len(), 2);
        assert_eq!(*client.requested.borrow(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_negative_pause_rejected_before_requests() {
        let client = FakeClient::new(vec![1]);
        let result = RecentTracksPages::new(&client, "rj", window(), -1);
        assert!(matches!(result, Err(LastFmError::InvalidArgument(_))));
        assert!(client.requested.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_error_terminates_sequence() {
        let mut client = FakeClient::new(vec![4, 4, 4, 4]);
        client.fail_on = Some(2);
        let mut pages = RecentTracksPages::new(&client, "rj", window(), 0).unwrap();

        assert!(pages.next().await.unwrap().is_some());
        assert!(matches!(pages.next().await, Err(LastFmError::Http(_))));
        assert!(pages.next().await.unwrap().is_none());
        assert_eq!(*client.requested.borrow(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_resume_from_page() {
        let client = FakeClient::new(vec![4, 4, 4, 4]);
        let mut pages = RecentTracksPages::new(&client, "rj", window(), 0)
            .unwrap()
            .with_starting_page(3)
            .unwrap();
        let collected = pages.collect_all().await.unwrap();
        assert_eq!(collected.len(), 2);
        assert_eq!(*client.requested.borrow(), vec![3, 4]);

        let result = RecentTracksPages::new(&client, "rj", window(), 0)
            .unwrap()
            .with_starting_page(0);
        assert!(matches!(result, Err(LastFmError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_pause_between_pages_only() {
        let client = FakeClient::new(vec![3, 3, 3]);
        let broadcaster = Arc::new(SharedEventBroadcaster::new());
        let mut pages = RecentTracksPages::new(&client, "rj", window(), 20)
            .unwrap()
            .with_broadcaster(Arc::clone(&broadcaster));

        let start = std::time::Instant::now();
        pages.collect_all().await.unwrap();
        let elapsed = start.elapsed();

        // Two pauses: before page 2 and before page 3
        assert!(elapsed >= Duration::from_millis(40));
        assert_eq!(
            broadcaster.latest_event(),
            Some(ClientEvent::PageDelay {
                next_page: 3,
                total_pages: 3,
                delay_ms: 20,
            })
        );
    }

    #[tokio::test]
    async fn test_take_is_bounded() {
        let client = FakeClient::new(vec![10; 10]);
        let mut pages = RecentTracksPages::new(&client, "rj", window(), 0).unwrap();
        let first_two = pages.take(2).await.unwrap();
        assert_eq!(first_two.len(), 2);
        assert_eq!(*client.requested.borrow(), vec![1, 2]);
    }
}
