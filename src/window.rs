//! Date windows: the time bounds of a history request.

use crate::{LastFmError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};

/// strftime pattern used when a window is embedded in a file name.
pub const FILE_NAME_TIME_FORMAT: &str = "%Y-%m-%dT%H%M%S";

/// An inclusive `[start, end]` range of instants. `end >= start` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end < start {
            return Err(LastFmError::InvalidArgument(format!(
                "window end {end} is before start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// The window covering whole calendar days, from the first instant of
    /// `from` to the last instant of `to` (UTC).
    pub fn from_dates(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        let last_instant = NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999)
            .ok_or_else(|| LastFmError::InvalidArgument("invalid end of day".to_string()))?;
        Self::new(
            from.and_time(NaiveTime::MIN).and_utc(),
            to.and_time(last_instant).and_utc(),
        )
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// File name for one page of this window, e.g.
    /// `tracks_2024-03-01T000000_2024-03-31T235959_0001.json`.
    pub fn page_file_name(&self, page: u32) -> String {
        format!(
            "tracks_{}_{}_{:04}.json",
            self.start.format(FILE_NAME_TIME_FORMAT),
            self.end.format(FILE_NAME_TIME_FORMAT),
            page
        )
    }
}

/// A point in time that can be moved by a [`TimeDelta`] without panicking.
///
/// Shifting past the representable range yields `None`.
pub trait WindowBound: Copy + Ord {
    fn shift_forward(self, delta: TimeDelta) -> Option<Self>;
    fn shift_back(self, delta: TimeDelta) -> Option<Self>;
}

impl WindowBound for NaiveDate {
    fn shift_forward(self, delta: TimeDelta) -> Option<Self> {
        self.checked_add_signed(delta)
    }

    fn shift_back(self, delta: TimeDelta) -> Option<Self> {
        self.checked_sub_signed(delta)
    }
}

impl WindowBound for NaiveDateTime {
    fn shift_forward(self, delta: TimeDelta) -> Option<Self> {
        self.checked_add_signed(delta)
    }

    fn shift_back(self, delta: TimeDelta) -> Option<Self> {
        self.checked_sub_signed(delta)
    }
}

impl WindowBound for DateTime<Utc> {
    fn shift_forward(self, delta: TimeDelta) -> Option<Self> {
        self.checked_add_signed(delta)
    }

    fn shift_back(self, delta: TimeDelta) -> Option<Self> {
        self.checked_sub_signed(delta)
    }
}

/// Lazy iterator over consecutive inclusive sub-windows, see [`split_window`].
#[derive(Debug, Clone)]
pub struct WindowSplit<T> {
    next_start: Option<T>,
    end: T,
    interval: TimeDelta,
    epsilon: TimeDelta,
}

/// Divide `[start, end]` into consecutive windows of at most `interval`.
///
/// Every window but the last ends `epsilon` before the next one starts, so
/// neighbouring windows never share their boundary instant; the last window is
/// clipped to `end`. With calendar dates and the default one-day epsilon this
/// yields week-style ranges:
///
/// ```rust
/// use chrono::{NaiveDate, TimeDelta};
/// use lastfm_history::split_window;
///
/// let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
/// let windows: Vec<_> = split_window(d(1), d(31), TimeDelta::days(7), TimeDelta::days(1))
///     .unwrap()
///     .collect();
/// assert_eq!(windows[0], (d(1), d(7)));
/// assert_eq!(windows[4], (d(29), d(31)));
/// ```
///
/// Fails with [`LastFmError::InvalidArgument`] when `end < start`, when
/// `interval` is not positive, or when `epsilon` is negative or not smaller
/// than `interval`.
pub fn split_window<T>(
    start: T,
    end: T,
    interval: TimeDelta,
    epsilon: TimeDelta,
) -> Result<WindowSplit<T>>
where
    T: WindowBound,
{
    if end < start {
        return Err(LastFmError::InvalidArgument(
            "split end is before start".to_string(),
        ));
    }
    if interval <= TimeDelta::zero() {
        return Err(LastFmError::InvalidArgument(format!(
            "split interval must be positive, got {interval}"
        )));
    }
    if epsilon < TimeDelta::zero() || epsilon >= interval {
        return Err(LastFmError::InvalidArgument(format!(
            "split epsilon {epsilon} must be in [0, {interval})"
        )));
    }

    Ok(WindowSplit {
        next_start: Some(start),
        end,
        interval,
        epsilon,
    })
}

/// [`split_window`] with the default one-day epsilon.
pub fn split_window_by_days<T>(start: T, end: T, interval: TimeDelta) -> Result<WindowSplit<T>>
where
    T: WindowBound,
{
    split_window(start, end, interval, TimeDelta::days(1))
}

impl<T> Iterator for WindowSplit<T>
where
    T: WindowBound,
{
    type Item = (T, T);

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next_start.take()?;
        let following = match start.shift_forward(self.interval) {
            Some(following) if following <= self.end => following,
            _ => return Some((start, self.end)),
        };

        match following.shift_back(self.epsilon) {
            Some(candidate_end) if candidate_end < self.end => {
                self.next_start = Some(following);
                Some((start, candidate_end))
            }
            _ => Some((start, self.end)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    #[test]
    fn test_split_march_by_weeks() {
        let windows: Vec<_> = split_window_by_days(d(3, 1), d(3, 31), TimeDelta::days(7))
            .unwrap()
            .collect();
        assert_eq!(
            windows,
            vec![
                (d(3, 1), d(3, 7)),
                (d(3, 8), d(3, 14)),
                (d(3, 15), d(3, 21)),
                (d(3, 22), d(3, 28)),
                (d(3, 29), d(3, 31)),
            ]
        );
    }

    #[test]
    fn test_split_is_contiguous_without_overlap() {
        let windows: Vec<_> = split_window_by_days(d(1, 1), d(12, 31), TimeDelta::days(30))
            .unwrap()
            .collect();
        assert_eq!(windows.first().unwrap().0, d(1, 1));
        assert_eq!(windows.last().unwrap().1, d(12, 31));
        for pair in windows.windows(2) {
            assert!(pair[0].0 <= pair[0].1);
            assert_eq!(pair[0].1 + TimeDelta::days(1), pair[1].0);
        }
        assert!(windows
            .iter()
            .all(|(s, e)| *e - *s <= TimeDelta::days(30)));
    }

    #[test]
    fn test_split_exact_multiple() {
        let windows: Vec<_> = split_window_by_days(d(3, 1), d(3, 14), TimeDelta::days(7))
            .unwrap()
            .collect();
        assert_eq!(windows, vec![(d(3, 1), d(3, 7)), (d(3, 8), d(3, 14))]);
    }

    #[test]
    fn test_split_single_day() {
        let windows: Vec<_> = split_window_by_days(d(3, 5), d(3, 5), TimeDelta::days(7))
            .unwrap()
            .collect();
        assert_eq!(windows, vec![(d(3, 5), d(3, 5))]);
    }

    #[test]
    fn test_split_near_end_of_calendar() {
        let start = NaiveDate::MAX - TimeDelta::days(3);
        let windows: Vec<_> = split_window_by_days(start, NaiveDate::MAX, TimeDelta::days(7))
            .unwrap()
            .collect();
        assert_eq!(windows, vec![(start, NaiveDate::MAX)]);

        let start = NaiveDate::MAX - TimeDelta::days(10);
        let windows: Vec<_> = split_window_by_days(start, NaiveDate::MAX, TimeDelta::days(7))
            .unwrap()
            .collect();
        assert_eq!(
            windows,
            vec![
                (start, start + TimeDelta::days(6)),
                (start + TimeDelta::days(7), NaiveDate::MAX),
            ]
        );

        let last = NaiveDate::MAX.and_time(NaiveTime::MIN).and_utc();
        let windows: Vec<_> = split_window(last, last, TimeDelta::days(1), TimeDelta::seconds(1))
            .unwrap()
            .collect();
        assert_eq!(windows, vec![(last, last)]);
    }

    #[test]
    fn test_split_instants_with_second_epsilon() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 2, 23, 59, 59).unwrap();
        let windows: Vec<_> = split_window(start, end, TimeDelta::days(1), TimeDelta::seconds(1))
            .unwrap()
            .collect();
        assert_eq!(
            windows,
            vec![
                (start, Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 59).unwrap()),
                (Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap(), end),
            ]
        );
    }

    #[test]
    fn test_split_rejects_bad_arguments() {
        assert!(matches!(
            split_window_by_days(d(3, 2), d(3, 1), TimeDelta::days(7)),
            Err(LastFmError::InvalidArgument(_))
        ));
        assert!(matches!(
            split_window_by_days(d(3, 1), d(3, 2), TimeDelta::zero()),
            Err(LastFmError::InvalidArgument(_))
        ));
        assert!(matches!(
            split_window(d(3, 1), d(3, 2), TimeDelta::days(1), TimeDelta::days(1)),
            Err(LastFmError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_window_requires_ordered_bounds() {
        assert!(matches!(
            DateWindow::from_dates(d(3, 2), d(3, 1)),
            Err(LastFmError::InvalidArgument(_))
        ));
        assert!(DateWindow::from_dates(d(3, 1), d(3, 1)).is_ok());
    }

    #[test]
    fn test_page_file_name() {
        let window = DateWindow::from_dates(d(3, 1), d(3, 31)).unwrap();
        assert_eq!(
            window.page_file_name(1),
            "tracks_2024-03-01T000000_2024-03-31T235959_0001.json"
        );
        assert_eq!(
            window.page_file_name(123),
            "tracks_2024-03-01T000000_2024-03-31T235959_0123.json"
        );
        assert_eq!(
            window.page_file_name(12345),
            "tracks_2024-03-01T000000_2024-03-31T235959_12345.json"
        );
    }
}
