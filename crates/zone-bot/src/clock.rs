//! Session clock.
//!
//! Turns wall-clock instants into once-per-day session triggers. Every
//! engine event polls the clock first, so a new local date is observed on
//! the first event of the day, whatever its kind.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};
use zone_core::SessionSchedule;

/// Session transition due at a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockTrigger {
    /// First event of a local date.
    NewDay(NaiveDate),
    /// Zone computation is due.
    ZoneCalc,
    /// Started past the zone computation grace window.
    LateStart,
    /// Flatten and block entries.
    SessionEnd,
}

#[derive(Debug, Clone)]
pub struct SessionClock {
    schedule: SessionSchedule,
    date: Option<NaiveDate>,
    zone_calc_fired: bool,
    session_end_fired: bool,
}

impl SessionClock {
    pub fn new(schedule: SessionSchedule) -> Self {
        Self {
            schedule,
            date: None,
            zone_calc_fired: false,
            session_end_fired: false,
        }
    }

    /// Triggers due at `now`, in order. Each fires at most once per date.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Vec<ClockTrigger> {
        let mut triggers = Vec::new();
        let local = self.schedule.local(now);
        let date = local.date();
        let time = local.time();

        if self.date != Some(date) {
            info!(%date, previous = ?self.date, "New session date");
            self.date = Some(date);
            self.zone_calc_fired = false;
            self.session_end_fired = false;
            triggers.push(ClockTrigger::NewDay(date));
        }

        if !self.zone_calc_fired && time >= self.schedule.zone_calc_time {
            self.zone_calc_fired = true;
            if time > self.schedule.market_close {
                debug!(%time, "Market closed, zone computation skipped");
            } else if self.schedule.within_zone_calc_grace(now) {
                triggers.push(ClockTrigger::ZoneCalc);
            } else {
                triggers.push(ClockTrigger::LateStart);
            }
        }

        if !self.session_end_fired && time >= self.schedule.session_end_time {
            self.session_end_fired = true;
            triggers.push(ClockTrigger::SessionEnd);
        }

        triggers
    }

    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    #[must_use]
    pub fn schedule(&self) -> &SessionSchedule {
        &self.schedule
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn ist(day: u32, hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
        FixedOffset::east_opt(330 * 60)
            .unwrap()
            .with_ymd_and_hms(2024, 1, day, hour, min, sec)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_full_day_sequence() {
        let mut clock = SessionClock::new(SessionSchedule::default());

        assert_eq!(clock.poll(ist(18, 9, 15, 0)), vec![ClockTrigger::NewDay(date(18))]);
        assert!(clock.poll(ist(18, 9, 15, 59)).is_empty());
        assert_eq!(clock.poll(ist(18, 9, 16, 0)), vec![ClockTrigger::ZoneCalc]);
        assert!(clock.poll(ist(18, 9, 16, 1)).is_empty());
        assert!(clock.poll(ist(18, 14, 59, 59)).is_empty());
        assert_eq!(clock.poll(ist(18, 15, 0, 0)), vec![ClockTrigger::SessionEnd]);
        assert!(clock.poll(ist(18, 15, 10, 0)).is_empty());

        assert_eq!(clock.poll(ist(19, 9, 0, 0)), vec![ClockTrigger::NewDay(date(19))]);
        assert_eq!(clock.date(), Some(date(19)));
    }

    #[test]
    fn test_late_start_is_reported() {
        let mut clock = SessionClock::new(SessionSchedule::default());
        assert_eq!(
            clock.poll(ist(18, 10, 30, 0)),
            vec![ClockTrigger::NewDay(date(18)), ClockTrigger::LateStart]
        );
    }

    #[test]
    fn test_start_within_grace_computes() {
        let mut clock = SessionClock::new(SessionSchedule::default());
        assert_eq!(
            clock.poll(ist(18, 9, 16, 45)),
            vec![ClockTrigger::NewDay(date(18)), ClockTrigger::ZoneCalc]
        );
    }

    #[test]
    fn test_start_after_session_end() {
        let mut clock = SessionClock::new(SessionSchedule::default());
        assert_eq!(
            clock.poll(ist(18, 15, 5, 0)),
            vec![
                ClockTrigger::NewDay(date(18)),
                ClockTrigger::LateStart,
                ClockTrigger::SessionEnd
            ]
        );
        // After market close nothing is computed
        let mut clock = SessionClock::new(SessionSchedule::default());
        assert_eq!(
            clock.poll(ist(18, 20, 0, 0)),
            vec![ClockTrigger::NewDay(date(18)), ClockTrigger::SessionEnd]
        );
    }
}
