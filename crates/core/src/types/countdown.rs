//! Countdown arithmetic for the launch landing page.
//!
//! The browser ticker in `static/js/countdown.js` mirrors [`TimeLeft::until`]
//! so the server-rendered first frame and the client updates agree.

use chrono::{DateTime, Utc};

const MS_PER_SECOND: i64 = 1000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Whole days, hours, minutes and seconds remaining before a target instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeLeft {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeLeft {
    /// Time remaining from `now` until `target`.
    ///
    /// Returns all zeros once the target has passed.
    #[must_use]
    pub fn until(target: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let diff = (target - now).num_milliseconds();
        if diff <= 0 {
            return Self::default();
        }
        Self {
            days: diff / MS_PER_DAY,
            hours: (diff / MS_PER_HOUR) % 24,
            minutes: (diff / MS_PER_MINUTE) % 60,
            seconds: (diff / MS_PER_SECOND) % 60,
        }
    }

    /// Whether the countdown has finished.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.days + self.hours + self.minutes + self.seconds <= 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn launch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 9, 17, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_until_splits_components() {
        let now = launch()
            - Duration::days(2)
            - Duration::hours(3)
            - Duration::minutes(4)
            - Duration::seconds(5)
            - Duration::milliseconds(600);
        let left = TimeLeft::until(launch(), now);
        assert_eq!(
            left,
            TimeLeft {
                days: 2,
                hours: 3,
                minutes: 4,
                seconds: 5
            }
        );
        assert!(!left.is_done());
    }

    #[test]
    fn test_sub_second_remainder_is_done() {
        let left = TimeLeft::until(launch(), launch() - Duration::milliseconds(999));
        assert_eq!(left, TimeLeft::default());
        assert!(left.is_done());
    }

    #[test]
    fn test_past_target_is_done() {
        let left = TimeLeft::until(launch(), launch() + Duration::hours(1));
        assert!(left.is_done());
    }
}
