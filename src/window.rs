//! Recency windows, snapshot filenames and the clock.
//!
//! Snapshot files are named `YYYY-MM-DD-<category>.json`. The date is a
//! plain calendar date: it is parsed into a [`NaiveDate`] and compared
//! against the UTC "today", never converted through a local-time timestamp.
//! This keeps a file written just after midnight UTC from sliding to the
//! previous day for readers west of Greenwich.

use chrono::{Local, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static SNAPSHOT_FILENAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2})-([A-Za-z0-9_-]+)\.json$").expect("static regex")
});

/// Which recency window a snapshot date is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    /// Today or yesterday.
    Daily,
    /// Today or any of the seven preceding days.
    Weekly,
}

impl WindowKind {
    /// Number of days back from today that still qualify.
    pub fn days(self) -> i64 {
        match self {
            WindowKind::Daily => 1,
            WindowKind::Weekly => 7,
        }
    }
}

/// Whether `date` lies inside the `kind` window ending at `today`.
///
/// The lower boundary is inclusive. Dates after `today` qualify as well.
pub fn qualifies(date: NaiveDate, kind: WindowKind, today: NaiveDate) -> bool {
    match today.checked_sub_days(chrono::Days::new(kind.days() as u64)) {
        Some(earliest) => date >= earliest,
        None => true,
    }
}

/// Source of "today" for the resolver.
///
/// Window checks use [`Clock::today_utc`]; the direct filename probe uses
/// [`Clock::today_local`] to guess names the way a local cron job would
/// have written them.
pub trait Clock {
    fn today_utc(&self) -> NaiveDate;
    fn today_local(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today_utc(&self) -> NaiveDate {
        Utc::now().date_naive()
    }

    fn today_local(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to fixed dates, for tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub utc: NaiveDate,
    pub local: NaiveDate,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            utc: today,
            local: today,
        }
    }
}

impl Clock for FixedClock {
    fn today_utc(&self) -> NaiveDate {
        self.utc
    }

    fn today_local(&self) -> NaiveDate {
        self.local
    }
}

/// Parsed parts of a snapshot filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotName {
    pub date: NaiveDate,
    pub category: String,
}

/// Split `YYYY-MM-DD-<category>.json` into its date and category.
///
/// Returns `None` for anything that does not match the pattern or names an
/// impossible calendar date (e.g. `2025-02-30`).
pub fn parse_snapshot_filename(name: &str) -> Option<SnapshotName> {
    let caps = SNAPSHOT_FILENAME.captures(name)?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(SnapshotName {
        date,
        category: caps[4].to_string(),
    })
}

/// Date portion of a snapshot filename, if it has one.
pub fn filename_date(name: &str) -> Option<NaiveDate> {
    parse_snapshot_filename(name).map(|n| n.date)
}

pub fn snapshot_filename(date: NaiveDate, category: &str) -> String {
    format!("{}-{}.json", date.format("%Y-%m-%d"), category)
}

/// Category names end up in file paths and URL segments, so only a
/// conservative alphabet is accepted.
pub fn is_valid_category(category: &str) -> bool {
    !category.is_empty()
        && category
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_daily_boundary_is_inclusive() {
        let today = d(2025, 8, 27);
        assert!(qualifies(d(2025, 8, 27), WindowKind::Daily, today));
        assert!(qualifies(d(2025, 8, 26), WindowKind::Daily, today));
        assert!(!qualifies(d(2025, 8, 25), WindowKind::Daily, today));
    }

    #[test]
    fn test_weekly_boundary_is_inclusive() {
        let today = d(2025, 8, 27);
        assert!(qualifies(d(2025, 8, 20), WindowKind::Weekly, today));
        assert!(!qualifies(d(2025, 8, 19), WindowKind::Weekly, today));
    }

    #[test]
    fn test_window_crosses_month_and_year() {
        assert!(qualifies(d(2024, 12, 31), WindowKind::Daily, d(2025, 1, 1)));
        assert!(!qualifies(d(2024, 12, 30), WindowKind::Daily, d(2025, 1, 1)));
        assert!(qualifies(d(2024, 2, 29), WindowKind::Weekly, d(2024, 3, 7)));
        assert!(!qualifies(d(2024, 2, 28), WindowKind::Weekly, d(2024, 3, 7)));
    }

    #[test]
    fn test_future_dates_qualify() {
        assert!(qualifies(d(2025, 8, 28), WindowKind::Daily, d(2025, 8, 27)));
    }

    #[test]
    fn test_window_is_monotonic() {
        let today = d(2025, 3, 1);
        for kind in [WindowKind::Daily, WindowKind::Weekly] {
            let dates: Vec<NaiveDate> = (0..30)
                .map(|i| d(2025, 2, 1) + chrono::Days::new(i))
                .collect();
            for &a in &dates {
                for &b in &dates {
                    if a >= b && qualifies(b, kind, today) {
                        assert!(qualifies(a, kind, today), "{a} should qualify if {b} does");
                    }
                }
            }
        }
    }

    #[test]
    fn test_parse_snapshot_filename() {
        let parsed = parse_snapshot_filename("2025-08-27-healthcare.json").unwrap();
        assert_eq!(parsed.date, d(2025, 8, 27));
        assert_eq!(parsed.category, "healthcare");

        let dashed = parse_snapshot_filename("2025-01-05-world-news.json").unwrap();
        assert_eq!(dashed.category, "world-news");
    }

    #[test]
    fn test_parse_rejects_bad_names() {
        assert_eq!(parse_snapshot_filename("2025-02-30-general.json"), None);
        assert_eq!(parse_snapshot_filename("2025-8-27-general.json"), None);
        assert_eq!(parse_snapshot_filename("latest-general.json"), None);
        assert_eq!(parse_snapshot_filename("2025-08-27-general.json.bak"), None);
        assert_eq!(parse_snapshot_filename("data/2025-08-27-general.json"), None);
    }

    #[test]
    fn test_snapshot_filename_round_trip() {
        let name = snapshot_filename(d(2025, 1, 9), "general");
        assert_eq!(name, "2025-01-09-general.json");
        assert_eq!(filename_date(&name), Some(d(2025, 1, 9)));
    }

    #[test]
    fn test_is_valid_category() {
        assert!(is_valid_category("healthcare"));
        assert!(is_valid_category("world_news-2"));
        assert!(!is_valid_category(""));
        assert!(!is_valid_category("../secrets"));
        assert!(!is_valid_category("a b"));
    }

    #[test]
    fn test_fixed_clock_can_split_utc_and_local() {
        let clock = FixedClock {
            utc: d(2025, 8, 27),
            local: d(2025, 8, 26),
        };
        assert_eq!(clock.today_utc(), d(2025, 8, 27));
        assert_eq!(clock.today_local(), d(2025, 8, 26));
    }
}
