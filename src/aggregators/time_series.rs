use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::FlowError;

/**
 * Mechanic:
* - Anchor the window at "now" truncated to the top of the hour, so every request
*   served inside the same hour sees the same boundaries
* - Walk backwards from the anchor in fixed width steps, one bucket per step
* - Bucket 0 is the most recent one, the last bucket is the oldest
 */

pub const BUCKET_WIDTH_MINUTES: i64 = 15;

pub fn default_bucket_width() -> TimeDelta {
    TimeDelta::minutes(BUCKET_WIDTH_MINUTES)
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WindowKey {
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "12h")]
    TwelveHours,
    #[serde(rename = "24h")]
    TwentyFourHours,
}

impl WindowKey {
    pub const ALL: [WindowKey; 4] = [
        WindowKey::OneHour,
        WindowKey::SixHours,
        WindowKey::TwelveHours,
        WindowKey::TwentyFourHours,
    ];

    pub fn duration(&self) -> TimeDelta {
        match self {
            WindowKey::OneHour => TimeDelta::hours(1),
            WindowKey::SixHours => TimeDelta::hours(6),
            WindowKey::TwelveHours => TimeDelta::hours(12),
            WindowKey::TwentyFourHours => TimeDelta::hours(24),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WindowKey::OneHour => "1h",
            WindowKey::SixHours => "6h",
            WindowKey::TwelveHours => "12h",
            WindowKey::TwentyFourHours => "24h",
        }
    }

    /// The widest window, which bounds how far back upstream data is useful.
    pub fn longest() -> WindowKey {
        WindowKey::TwentyFourHours
    }
}

impl fmt::Display for WindowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WindowKey {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1h" => Ok(WindowKey::OneHour),
            "6h" => Ok(WindowKey::SixHours),
            "12h" => Ok(WindowKey::TwelveHours),
            "24h" => Ok(WindowKey::TwentyFourHours),
            other => Err(FlowError::invalid_window(format!(
                "'{}'. Expected: 1h, 6h, 12h or 24h",
                other
            ))),
        }
    }
}

/// Half-open interval `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bucket {
    /// Position inside the window, 0 being the most recent bucket
    pub index: usize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Bucket {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

/// Top of the hour containing `now`.
pub fn truncate_to_hour(now: DateTime<Utc>) -> DateTime<Utc> {
    now.duration_trunc(TimeDelta::hours(1)).unwrap_or(now)
}

/// Splits the window ending at the truncated `now` into buckets, most recent first.
pub fn build_buckets(
    now: DateTime<Utc>,
    window_duration: TimeDelta,
    bucket_width: TimeDelta,
) -> Result<Vec<Bucket>, FlowError> {
    let width_ms = bucket_width.num_milliseconds();
    let window_ms = window_duration.num_milliseconds();

    if width_ms <= 0 {
        return Err(FlowError::invalid_window(format!(
            "bucket width must be positive, got {}ms",
            width_ms
        )));
    }

    if window_ms <= 0 || window_ms % width_ms != 0 {
        return Err(FlowError::invalid_window(format!(
            "window of {}ms is not an exact multiple of the {}ms bucket width",
            window_ms, width_ms
        )));
    }

    let anchor = truncate_to_hour(now);
    let count = (window_ms / width_ms) as usize;

    let buckets = (0..count)
        .map(|index| {
            let end = anchor - bucket_width * index as i32;
            Bucket {
                index,
                start: end - bucket_width,
                end,
            }
        })
        .collect();

    Ok(buckets)
}

/// Buckets for one of the named windows at the default width.
pub fn buckets_for_window(now: DateTime<Utc>, window: WindowKey) -> Result<Vec<Bucket>, FlowError> {
    build_buckets(now, window.duration(), default_bucket_width())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, h, m, s).unwrap()
    }

    #[test]
    fn test_bucket_counts_per_window() {
        let now = at(12, 0, 0);
        let expected = [
            (WindowKey::OneHour, 4),
            (WindowKey::SixHours, 24),
            (WindowKey::TwelveHours, 48),
            (WindowKey::TwentyFourHours, 96),
        ];

        for (window, count) in expected {
            let buckets = buckets_for_window(now, window).unwrap();
            assert_eq!(buckets.len(), count, "window {}", window);
        }
    }

    #[test]
    fn test_buckets_are_contiguous_and_most_recent_first() {
        let now = at(12, 0, 0);
        let buckets = buckets_for_window(now, WindowKey::TwentyFourHours).unwrap();

        assert_eq!(buckets[0].end, now);
        assert_eq!(buckets.last().unwrap().start, now - TimeDelta::hours(24));

        for (i, pair) in buckets.windows(2).enumerate() {
            assert_eq!(pair[0].index, i);
            assert_eq!(pair[1].end, pair[0].start);
            assert_eq!(pair[0].end - pair[0].start, default_bucket_width());
        }
    }

    #[test]
    fn test_one_hour_example_boundaries() {
        let buckets = buckets_for_window(at(1, 0, 0), WindowKey::OneHour).unwrap();
        let spans: Vec<(DateTime<Utc>, DateTime<Utc>)> =
            buckets.iter().map(|b| (b.start, b.end)).collect();

        assert_eq!(
            spans,
            vec![
                (at(0, 45, 0), at(1, 0, 0)),
                (at(0, 30, 0), at(0, 45, 0)),
                (at(0, 15, 0), at(0, 30, 0)),
                (at(0, 0, 0), at(0, 15, 0)),
            ]
        );
    }

    #[test]
    fn test_same_hour_yields_identical_boundaries() {
        let early = buckets_for_window(at(9, 1, 12), WindowKey::SixHours).unwrap();
        let late = buckets_for_window(at(9, 59, 59), WindowKey::SixHours).unwrap();

        assert_eq!(early, late);
        assert_eq!(early[0].end, at(9, 0, 0));
    }

    #[test]
    fn test_half_open_membership() {
        let bucket = buckets_for_window(at(1, 0, 0), WindowKey::OneHour).unwrap()[3];

        assert!(bucket.contains(at(0, 0, 0)));
        assert!(bucket.contains(at(0, 14, 59)));
        assert!(!bucket.contains(at(0, 15, 0)));
    }

    #[test]
    fn test_rejects_non_multiple_window() {
        let res = build_buckets(at(1, 0, 0), TimeDelta::minutes(50), default_bucket_width());
        assert!(matches!(res, Err(FlowError::InvalidWindow(_))));

        let res = build_buckets(at(1, 0, 0), TimeDelta::hours(1), TimeDelta::zero());
        assert!(matches!(res, Err(FlowError::InvalidWindow(_))));
    }

    #[test]
    fn test_window_key_parsing() {
        assert_eq!("12h".parse::<WindowKey>().unwrap(), WindowKey::TwelveHours);
        assert_eq!(" 24H ".parse::<WindowKey>().unwrap(), WindowKey::TwentyFourHours);
        assert!(matches!(
            "2d".parse::<WindowKey>(),
            Err(FlowError::InvalidWindow(_))
        ));
    }
}
