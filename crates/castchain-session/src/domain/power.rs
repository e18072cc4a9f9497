//! Limited-use powers: cast reveal, turn pass and time extension.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::participants::PlayerRole;
use super::settings::Limit;
use crate::error::ValidationError;

/// The three powers a player can spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerKind {
    /// Show the cast of the most recent item.
    Reveal,
    /// Hand the turn to the opponent.
    Pass,
    /// Add bonus seconds to the running turn.
    Extend,
}

impl fmt::Display for PowerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Reveal => "reveal",
            Self::Pass => "pass",
            Self::Extend => "extend",
        };
        f.write_str(name)
    }
}

/// Remaining uses of each power for one player.
///
/// A `Limited` counter only ever goes down, one per successful use, and
/// never below zero. `Unlimited` never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerBudget {
    pub reveal: Limit,
    pub pass: Limit,
    pub extend: Limit,
}

impl PowerBudget {
    #[must_use]
    pub const fn new(reveal: Limit, pass: Limit, extend: Limit) -> Self {
        Self {
            reveal,
            pass,
            extend,
        }
    }

    /// Remaining uses of `kind`.
    #[must_use]
    pub const fn remaining(&self, kind: PowerKind) -> Limit {
        match kind {
            PowerKind::Reveal => self.reveal,
            PowerKind::Pass => self.pass,
            PowerKind::Extend => self.extend,
        }
    }

    /// Spends one use of `kind`, returning the reduced budget.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::ResourceDepleted` when no use is left.
    pub fn consume(self, kind: PowerKind) -> Result<Self, ValidationError> {
        let next = match self.remaining(kind) {
            Limit::Unlimited => Limit::Unlimited,
            Limit::Limited(0) => return Err(ValidationError::ResourceDepleted(kind)),
            Limit::Limited(n) => Limit::Limited(n - 1),
        };

        let mut budget = self;
        match kind {
            PowerKind::Reveal => budget.reveal = next,
            PowerKind::Pass => budget.pass = next,
            PowerKind::Extend => budget.extend = next,
        }
        Ok(budget)
    }
}

/// Both players' budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerBudgets {
    pub host: PowerBudget,
    pub guest: PowerBudget,
}

impl PowerBudgets {
    /// Every player starts from the same budget.
    #[must_use]
    pub const fn uniform(budget: PowerBudget) -> Self {
        Self {
            host: budget,
            guest: budget,
        }
    }

    #[must_use]
    pub const fn for_role(&self, role: PlayerRole) -> PowerBudget {
        match role {
            PlayerRole::Host => self.host,
            PlayerRole::Guest => self.guest,
        }
    }

    pub fn set(&mut self, role: PlayerRole, budget: PowerBudget) {
        match role {
            PlayerRole::Host => self.host = budget,
            PlayerRole::Guest => self.guest = budget,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_decrements_only_the_requested_kind() {
        // Arrange
        let budget = PowerBudget::new(Limit::Limited(2), Limit::Limited(1), Limit::Unlimited);

        // Act
        let after = budget.consume(PowerKind::Reveal).unwrap();

        // Assert
        assert_eq!(after.reveal, Limit::Limited(1));
        assert_eq!(after.pass, Limit::Limited(1));
        assert_eq!(after.extend, Limit::Unlimited);
    }

    #[test]
    fn test_consume_fails_at_zero_and_leaves_budget_intact() {
        // Arrange
        let budget = PowerBudget::new(Limit::Limited(0), Limit::Limited(1), Limit::Limited(1));

        // Act
        let result = budget.consume(PowerKind::Reveal);

        // Assert
        assert_eq!(
            result.unwrap_err(),
            ValidationError::ResourceDepleted(PowerKind::Reveal)
        );
        assert_eq!(budget.reveal, Limit::Limited(0));
    }

    #[test]
    fn test_unlimited_never_depletes() {
        let mut budget = PowerBudget::new(Limit::Unlimited, Limit::Unlimited, Limit::Unlimited);

        for _ in 0..100 {
            budget = budget.consume(PowerKind::Pass).unwrap();
        }

        assert_eq!(budget.pass, Limit::Unlimited);
    }

    #[test]
    fn test_limited_budget_runs_out_after_exact_count() {
        let mut budget = PowerBudget::new(Limit::Limited(1), Limit::Limited(1), Limit::Limited(2));

        budget = budget.consume(PowerKind::Extend).unwrap();
        budget = budget.consume(PowerKind::Extend).unwrap();

        assert_eq!(budget.extend, Limit::Limited(0));
        assert!(budget.consume(PowerKind::Extend).is_err());
    }

    #[test]
    fn test_budgets_are_tracked_per_role() {
        let start = PowerBudget::new(Limit::Limited(1), Limit::Limited(1), Limit::Limited(1));
        let mut budgets = PowerBudgets::uniform(start);

        budgets.set(PlayerRole::Guest, start.consume(PowerKind::Pass).unwrap());

        assert_eq!(budgets.for_role(PlayerRole::Host).pass, Limit::Limited(1));
        assert_eq!(budgets.for_role(PlayerRole::Guest).pass, Limit::Limited(0));
    }
}
