//! Trading session schedule.
//!
//! Provides exchange-local time conversion and session phase classification.
//! All engine timestamps are UTC; the schedule is expressed in exchange-local
//! wall-clock time through a fixed UTC offset (IST has no DST).

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Session phase at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Before market open or after market close.
    Inactive,
    /// Market open, zones not yet due.
    Setup,
    /// Between zone computation and session end.
    Trading,
    /// After session end, before market close.
    Closing,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inactive => write!(f, "Inactive"),
            Self::Setup => write!(f, "Setup"),
            Self::Trading => write!(f, "Trading"),
            Self::Closing => write!(f, "Closing"),
        }
    }
}

/// Exchange-local session times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSchedule {
    #[serde(default = "default_market_open")]
    pub market_open: NaiveTime,
    #[serde(default = "default_zone_calc_time")]
    pub zone_calc_time: NaiveTime,
    /// Zones are not computed later than this many seconds after
    /// `zone_calc_time`.
    #[serde(default = "default_zone_calc_grace_secs")]
    pub zone_calc_grace_secs: u32,
    #[serde(default = "default_session_end_time")]
    pub session_end_time: NaiveTime,
    #[serde(default = "default_market_close")]
    pub market_close: NaiveTime,
    /// Exchange offset from UTC in minutes (IST = 330).
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
}

fn default_market_open() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 15, 0).unwrap_or(NaiveTime::MIN)
}

fn default_zone_calc_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 16, 0).unwrap_or(NaiveTime::MIN)
}

fn default_zone_calc_grace_secs() -> u32 {
    60
}

fn default_session_end_time() -> NaiveTime {
    NaiveTime::from_hms_opt(15, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn default_market_close() -> NaiveTime {
    NaiveTime::from_hms_opt(15, 30, 0).unwrap_or(NaiveTime::MIN)
}

fn default_utc_offset_minutes() -> i32 {
    330
}

impl Default for SessionSchedule {
    fn default() -> Self {
        Self {
            market_open: default_market_open(),
            zone_calc_time: default_zone_calc_time(),
            zone_calc_grace_secs: default_zone_calc_grace_secs(),
            session_end_time: default_session_end_time(),
            market_close: default_market_close(),
            utc_offset_minutes: default_utc_offset_minutes(),
        }
    }
}

impl SessionSchedule {
    /// Check ordering: open ≤ zone calc < session end ≤ close.
    pub fn validate(&self) -> Result<()> {
        if self.market_open > self.zone_calc_time {
            return Err(CoreError::InvalidConfig(
                "zone_calc_time must not be before market_open".into(),
            ));
        }
        if self.zone_calc_time >= self.session_end_time {
            return Err(CoreError::InvalidConfig(
                "session_end_time must be after zone_calc_time".into(),
            ));
        }
        if self.session_end_time > self.market_close {
            return Err(CoreError::InvalidConfig(
                "market_close must not be before session_end_time".into(),
            ));
        }
        self.offset()?;
        Ok(())
    }

    fn offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            CoreError::InvalidConfig(format!(
                "utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            ))
        })
    }

    /// Exchange-local wall-clock time of a UTC instant.
    #[must_use]
    pub fn local(&self, at: DateTime<Utc>) -> NaiveDateTime {
        match self.offset() {
            Ok(offset) => at.with_timezone(&offset).naive_local(),
            Err(_) => at.naive_utc(),
        }
    }

    /// Exchange-local trading date of a UTC instant.
    #[must_use]
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        self.local(at).date()
    }

    /// Session phase at a UTC instant.
    #[must_use]
    pub fn phase_at(&self, at: DateTime<Utc>) -> SessionPhase {
        let t = self.local(at).time();
        if t < self.market_open || t > self.market_close {
            SessionPhase::Inactive
        } else if t < self.zone_calc_time {
            SessionPhase::Setup
        } else if t < self.session_end_time {
            SessionPhase::Trading
        } else {
            SessionPhase::Closing
        }
    }

    /// True while zones may still be computed for the day.
    #[must_use]
    pub fn within_zone_calc_grace(&self, at: DateTime<Utc>) -> bool {
        let t = self.local(at).time();
        let elapsed = t.signed_duration_since(self.zone_calc_time);
        elapsed >= chrono::Duration::zero()
            && elapsed <= chrono::Duration::seconds(i64::from(self.zone_calc_grace_secs))
    }
}
