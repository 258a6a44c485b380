use crate::time::duration_until_next_utc_midnight;
use std::fmt;
use time::{Date, OffsetDateTime};

/// Number of free lookups per UTC day.
pub const DEFAULT_DAILY_LIMIT: u32 = 2_500;

/// Locally tracked usage of the geocoding provider.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuotaState {
    pub api_key: String,
    /// `None` if the counter was never reset.
    pub last_reset: Option<Date>,
    pub usage: u32,
}

impl QuotaState {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn needs_reset(&self, today: Date) -> bool {
        self.last_reset != Some(today)
    }

    /// Resets the counter if the UTC day changed.
    ///
    /// Returns `true` if the state has been modified.
    pub fn roll_over(&mut self, today: Date) -> bool {
        if !self.needs_reset(today) {
            return false;
        }
        self.last_reset = Some(today);
        self.usage = 0;
        true
    }

    pub fn increment_usage(&mut self) {
        self.usage = self.usage.saturating_add(1);
    }

    pub fn remaining(&self, limit: u32) -> u32 {
        limit.saturating_sub(self.usage)
    }

    pub fn is_exhausted(&self, limit: u32) -> bool {
        self.remaining(limit) == 0
    }
}

/// Time left until the provider resets its daily counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeUntilReset {
    pub hours: u32,
    pub minutes: u32,
}

impl TimeUntilReset {
    pub fn from_now(now: OffsetDateTime) -> Self {
        let seconds = duration_until_next_utc_midnight(now)
            .whole_seconds()
            .max(0);
        let seconds = u32::try_from(seconds).unwrap_or(u32::MAX);
        Self {
            hours: seconds / 3600,
            minutes: (seconds % 3600) / 60,
        }
    }
}

impl fmt::Display for TimeUntilReset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} hour(s) and {} minute(s)",
            self.hours, self.minutes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn roll_over_on_new_day() {
        let mut state = QuotaState {
            api_key: "key".into(),
            last_reset: Some(date!(2024 - 03 - 09)),
            usage: 500,
        };
        assert!(state.roll_over(date!(2024 - 03 - 10)));
        assert_eq!(0, state.usage);
        assert_eq!(Some(date!(2024 - 03 - 10)), state.last_reset);
    }

    #[test]
    fn no_roll_over_on_same_day() {
        let mut state = QuotaState {
            api_key: "key".into(),
            last_reset: Some(date!(2024 - 03 - 10)),
            usage: 42,
        };
        assert!(!state.roll_over(date!(2024 - 03 - 10)));
        assert_eq!(42, state.usage);
    }

    #[test]
    fn never_reset_counter_rolls_over() {
        let mut state = QuotaState::default();
        assert!(state.roll_over(date!(2024 - 03 - 10)));
    }

    #[test]
    fn remaining_lookups() {
        let mut state = QuotaState::default();
        assert_eq!(2_500, state.remaining(DEFAULT_DAILY_LIMIT));
        state.usage = 2_499;
        assert!(!state.is_exhausted(DEFAULT_DAILY_LIMIT));
        state.increment_usage();
        assert_eq!(0, state.remaining(DEFAULT_DAILY_LIMIT));
        state.usage = 3_000;
        assert_eq!(0, state.remaining(DEFAULT_DAILY_LIMIT));
        assert!(state.is_exhausted(DEFAULT_DAILY_LIMIT));
    }

    #[test]
    fn time_until_reset_at_half_past_eleven() {
        let t = TimeUntilReset::from_now(datetime!(2024-03-10 23:30 UTC));
        assert_eq!(TimeUntilReset { hours: 0, minutes: 30 }, t);
        assert_eq!("0 hour(s) and 30 minute(s)", t.to_string());
    }

    #[test]
    fn time_until_reset_at_midnight() {
        let t = TimeUntilReset::from_now(datetime!(2024-03-10 0:00 UTC));
        assert_eq!(TimeUntilReset { hours: 24, minutes: 0 }, t);
    }

    #[test]
    fn api_key_presence() {
        let mut state = QuotaState::default();
        assert!(!state.has_api_key());
        state.api_key = "  ".into();
        assert!(!state.has_api_key());
        state.api_key = "abc".into();
        assert!(state.has_api_key());
    }
}
