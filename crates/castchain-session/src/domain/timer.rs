//! Turn clock derived from a shared epoch.
//!
//! Remaining time is always recomputed from the turn's epoch and the
//! current instant, never counted down locally, so participants that
//! joined late or were descheduled converge on the same value.

use chrono::{DateTime, TimeDelta, Utc};

use super::settings::Limit;

/// Clock for the running turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTimer {
    epoch: DateTime<Utc>,
    limit: Limit,
    bonus_secs: u32,
}

impl RoundTimer {
    /// Starts a turn at `epoch`. `limit` is in seconds.
    #[must_use]
    pub const fn start(epoch: DateTime<Utc>, limit: Limit) -> Self {
        Self {
            epoch,
            limit,
            bonus_secs: 0,
        }
    }

    /// Begins a new turn with a new epoch and no bonus.
    pub fn restart(&mut self, epoch: DateTime<Utc>) {
        self.epoch = epoch;
        self.bonus_secs = 0;
    }

    /// Adds bonus seconds to this turn's limit.
    pub fn extend(&mut self, bonus_secs: u32) {
        self.bonus_secs = self.bonus_secs.saturating_add(bonus_secs);
    }

    #[must_use]
    pub const fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    #[must_use]
    pub const fn limit(&self) -> Limit {
        self.limit
    }

    #[must_use]
    pub const fn bonus_secs(&self) -> u32 {
        self.bonus_secs
    }

    /// Instant the turn runs out, or `None` for an unlimited clock.
    #[must_use]
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        match self.limit {
            Limit::Unlimited => None,
            Limit::Limited(secs) => {
                let total = i64::from(secs) + i64::from(self.bonus_secs);
                Some(self.epoch + TimeDelta::seconds(total))
            }
        }
    }

    /// `limit + bonus - (now - epoch)`, floored at zero. `None` when unlimited.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.deadline()
            .map(|deadline| (deadline - now).max(TimeDelta::zero()))
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.deadline().is_some_and(|deadline| now >= deadline)
    }
}
