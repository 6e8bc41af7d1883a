//! Fixed daily refresh schedule.
//!
//! The aggregate feed is not refreshed on a rolling TTL. It expires at fixed
//! wall-clock hours in a named timezone (by default 08:00 and 20:00 in
//! `America/Sao_Paulo`), and this module computes those boundaries.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;

use crate::config::ScheduleConfig;
use crate::{Result, SubfeedError};

/// Lower bound for [`ScheduleClock::ms_until_next_update`].
pub const MIN_UPDATE_DELAY_MS: u64 = 1000;

/// Computes the last and next scheduled update instants.
///
/// `last <= now < next` holds for every instant. The boundary is inclusive
/// for `last` and exclusive for `next`, so at exactly 08:00 the last update
/// is 08:00 and the next one is 20:00.
#[derive(Debug, Clone)]
pub struct ScheduleClock {
    tz: Tz,
    /// Sorted, deduplicated, non-empty, each < 24.
    hours: Vec<u32>,
}

impl ScheduleClock {
    /// Create a clock for the given IANA timezone and update hours.
    pub fn new(timezone: &str, hours: &[u32]) -> Result<Self> {
        let tz: Tz = timezone
            .parse()
            .map_err(|_| SubfeedError::Config(format!("unknown timezone: {timezone}")))?;

        let mut hours = hours.to_vec();
        hours.sort_unstable();
        hours.dedup();

        if hours.is_empty() {
            return Err(SubfeedError::Config(
                "at least one update hour is required".to_string(),
            ));
        }
        if let Some(hour) = hours.iter().find(|h| **h >= 24) {
            return Err(SubfeedError::Config(format!("invalid update hour: {hour}")));
        }

        Ok(Self { tz, hours })
    }

    /// Create a clock from the `[schedule]` config section.
    pub fn from_config(config: &ScheduleConfig) -> Result<Self> {
        Self::new(&config.timezone, &config.update_hours)
    }

    /// The timezone the update hours are expressed in.
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// The configured update hours, ascending.
    pub fn hours(&self) -> &[u32] {
        &self.hours
    }

    pub fn last_scheduled_time(&self) -> DateTime<Utc> {
        self.last_scheduled_time_at(Utc::now())
    }

    pub fn next_scheduled_time(&self) -> DateTime<Utc> {
        self.next_scheduled_time_at(Utc::now())
    }

    pub fn ms_until_next_update(&self) -> u64 {
        self.ms_until_next_update_at(Utc::now())
    }

    /// Most recent scheduled instant at or before `now`.
    pub fn last_scheduled_time_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local = now.with_timezone(&self.tz);
        let date = local.date_naive();
        let hour = local.hour();

        let candidate = match self.hours.iter().rev().find(|h| **h <= hour) {
            Some(h) => self.to_instant(date, *h),
            None => self.to_instant(previous_day(date), self.last_hour()),
        };

        if candidate <= now {
            return candidate;
        }
        // A DST gap can shift the converted boundary past `now`.
        self.candidates_around(date)
            .filter(|t| *t <= now)
            .max()
            .unwrap_or(candidate)
    }

    /// Soonest scheduled instant strictly after `now`.
    pub fn next_scheduled_time_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local = now.with_timezone(&self.tz);
        let date = local.date_naive();
        let hour = local.hour();

        let candidate = match self.hours.iter().find(|h| **h > hour) {
            Some(h) => self.to_instant(date, *h),
            None => self.to_instant(next_day(date), self.first_hour()),
        };

        if candidate > now {
            return candidate;
        }
        self.candidates_around(date)
            .filter(|t| *t > now)
            .min()
            .unwrap_or(candidate)
    }

    /// Milliseconds until the next scheduled update, never below one second.
    pub fn ms_until_next_update_at(&self, now: DateTime<Utc>) -> u64 {
        let ms = (self.next_scheduled_time_at(now) - now).num_milliseconds();
        u64::try_from(ms)
            .unwrap_or(0)
            .max(MIN_UPDATE_DELAY_MS)
    }

    fn first_hour(&self) -> u32 {
        self.hours[0]
    }

    fn last_hour(&self) -> u32 {
        self.hours[self.hours.len() - 1]
    }

    /// Convert a wall-clock `(date, hour)` in the clock's timezone to an instant.
    ///
    /// Starts from the instant that has the same fields in UTC, looks at what
    /// local time that instant actually is, and shifts by the difference. The
    /// second pass settles the case where the first shift crossed an offset
    /// change.
    fn to_instant(&self, date: NaiveDate, hour: u32) -> DateTime<Utc> {
        let target = NaiveDateTime::new(date, NaiveTime::MIN) + Duration::hours(i64::from(hour));
        let mut guess = target.and_utc();
        for _ in 0..2 {
            let observed = guess.with_timezone(&self.tz).naive_local();
            guess += target - observed;
        }
        guess
    }

    fn candidates_around(&self, date: NaiveDate) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        (-2i64..=2).flat_map(move |offset| {
            let day = date + Duration::days(offset);
            self.hours.iter().map(move |h| self.to_instant(day, *h))
        })
    }
}

fn previous_day(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(date)
}

fn next_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date)
}
