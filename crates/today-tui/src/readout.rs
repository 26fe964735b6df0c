#![forbid(unsafe_code)]

//! Clock readout formatting.
//!
//! Pure date arithmetic for the post-login screen: wall-clock time,
//! percent-of-year elapsed to 7 decimal places, and day-of-year. The same
//! text is drawn on screen and mirrored into the terminal title.

use std::time::Duration;

use time::{Date, Month, OffsetDateTime, UtcOffset};

/// Which readout is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadoutMode {
    #[default]
    Time,
    Percent,
    Days,
}

impl ReadoutMode {
    /// Cycle to the next mode: time → percent → days → time.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Time => Self::Percent,
            Self::Percent => Self::Days,
            Self::Days => Self::Time,
        }
    }

    /// Refresh cadence: the percent readout moves in its 7th decimal place
    /// every few milliseconds, the others once per second.
    #[must_use]
    pub const fn tick_interval(self) -> Duration {
        match self {
            Self::Percent => Duration::from_millis(100),
            Self::Time | Self::Days => Duration::from_millis(1000),
        }
    }

    /// Label of the mode the toggle switches to next.
    #[must_use]
    pub const fn toggle_hint(self) -> &'static str {
        match self {
            Self::Time => "%",
            Self::Percent => "D",
            Self::Days => "T",
        }
    }
}

/// Capture the local UTC offset.
///
/// On Unix this is only sound before threads exist, so the app calls it once
/// at startup and carries the result. Falls back to UTC when indeterminate.
#[must_use]
pub fn capture_local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

/// `h:mm:ss am/pm`, hour unpadded, 12-hour clock.
#[must_use]
pub fn clock_text(now: OffsetDateTime) -> String {
    let hour24 = now.hour();
    let hour12 = match hour24 % 12 {
        0 => 12,
        h => h,
    };
    let meridiem = if hour24 < 12 { "am" } else { "pm" };
    format!(
        "{hour12}:{:02}:{:02} {meridiem}",
        now.minute(),
        now.second()
    )
}

/// Percent of the current year elapsed, to 7 decimal places (digits only,
/// no `%`).
#[must_use]
pub fn year_percent_text(now: OffsetDateTime) -> String {
    let start = year_start(now.year(), now.offset());
    let end = year_start(now.year() + 1, now.offset());
    let span = (end - start).whole_nanoseconds() as f64;
    let elapsed = (now - start).whole_nanoseconds() as f64;
    format!("{:.7}", elapsed / span * 100.0)
}

/// Day of the current year, 1-based.
#[must_use]
pub fn day_of_year(now: OffsetDateTime) -> u16 {
    now.ordinal()
}

/// The readout for a mode, as drawn on screen and mirrored to the title.
#[must_use]
pub fn readout_text(mode: ReadoutMode, now: OffsetDateTime) -> String {
    match mode {
        ReadoutMode::Time => clock_text(now),
        ReadoutMode::Percent => format!("{}%", year_percent_text(now)),
        ReadoutMode::Days => day_of_year(now).to_string(),
    }
}

/// Midnight, January 1st of `year` at the given offset.
fn year_start(year: i32, offset: UtcOffset) -> OffsetDateTime {
    Date::from_calendar_date(year, Month::January, 1)
        .expect("January 1st exists in every year")
        .midnight()
        .assume_offset(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(
        year: i32,
        month: Month,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> OffsetDateTime {
        Date::from_calendar_date(year, month, day)
            .expect("test date is valid")
            .with_hms(hour, minute, second)
            .expect("test time is valid")
            .assume_utc()
    }

    #[test]
    fn clock_text_is_twelve_hour() {
        assert_eq!(clock_text(at(2026, Month::March, 5, 0, 0, 0)), "12:00:00 am");
        assert_eq!(clock_text(at(2026, Month::March, 5, 12, 0, 0)), "12:00:00 pm");
        assert_eq!(clock_text(at(2026, Month::March, 5, 15, 7, 9)), "3:07:09 pm");
        assert_eq!(clock_text(at(2026, Month::March, 5, 9, 59, 59)), "9:59:59 am");
    }

    #[test]
    fn year_percent_at_boundaries() {
        assert_eq!(
            year_percent_text(at(2025, Month::January, 1, 0, 0, 0)),
            "0.0000000"
        );
        // One day into a 365-day year: 100/365.
        assert_eq!(
            year_percent_text(at(2025, Month::January, 2, 0, 0, 0)),
            "0.2739726"
        );
        // The last second of the year stays below 100.
        let almost = year_percent_text(at(2025, Month::December, 31, 23, 59, 59));
        assert!(almost.starts_with("99.99999"), "got {almost}");
    }

    #[test]
    fn year_percent_honors_leap_years() {
        // One day into 2024 (366 days): 100/366.
        assert_eq!(
            year_percent_text(at(2024, Month::January, 2, 0, 0, 0)),
            "0.2732240"
        );
    }

    #[test]
    fn day_of_year_counts_from_one() {
        assert_eq!(day_of_year(at(2025, Month::January, 1, 8, 0, 0)), 1);
        assert_eq!(day_of_year(at(2025, Month::December, 31, 8, 0, 0)), 365);
        assert_eq!(day_of_year(at(2024, Month::December, 31, 8, 0, 0)), 366);
    }

    #[test]
    fn modes_cycle() {
        let mut mode = ReadoutMode::Time;
        mode = mode.next();
        assert_eq!(mode, ReadoutMode::Percent);
        mode = mode.next();
        assert_eq!(mode, ReadoutMode::Days);
        mode = mode.next();
        assert_eq!(mode, ReadoutMode::Time);
    }

    #[test]
    fn percent_mode_ticks_faster() {
        assert_eq!(
            ReadoutMode::Percent.tick_interval(),
            Duration::from_millis(100)
        );
        assert_eq!(ReadoutMode::Time.tick_interval(), Duration::from_millis(1000));
        assert_eq!(ReadoutMode::Days.tick_interval(), Duration::from_millis(1000));
    }

    #[test]
    fn readout_text_matches_mode() {
        let afternoon = at(2025, Month::January, 2, 15, 7, 9);
        assert_eq!(readout_text(ReadoutMode::Time, afternoon), "3:07:09 pm");
        assert_eq!(readout_text(ReadoutMode::Days, afternoon), "2");
        let midnight = at(2025, Month::January, 2, 0, 0, 0);
        assert_eq!(readout_text(ReadoutMode::Percent, midnight), "0.2739726%");
    }

    #[test]
    fn toggle_hint_names_next_mode() {
        assert_eq!(ReadoutMode::Time.toggle_hint(), "%");
        assert_eq!(ReadoutMode::Percent.toggle_hint(), "D");
        assert_eq!(ReadoutMode::Days.toggle_hint(), "T");
    }
}
