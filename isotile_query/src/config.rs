// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Search grid constants and budgets.

use isotile_world::BoxSize;

use crate::error::ConfigError;

/// Spacing of the search grid in pixels: a quarter tile.
pub const DIV_SIZE: i32 = 16;

/// Cost of an orthogonal grid step.
pub const STEP_COST: u32 = 16;

/// Cost of a diagonal grid step, `16·√2` rounded.
pub const DIAGONAL_COST: u32 = 23;

/// Movers smaller than this are searched as if they were this size.
pub const MIN_MOVER_SIZE: BoxSize = BoxSize::new(32, 32);

/// Default distance under which a grid node counts as reaching the goal.
pub const DEFAULT_GOAL_TOLERANCE: u32 = 24;

/// Smallest goal tolerance that reaches a goal anywhere between grid nodes.
pub const MIN_GOAL_TOLERANCE: u32 = 12;

/// Budgets for one path search.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchConfig {
    /// Paths costing this much or more are abandoned.
    pub max_cost: u32,
    /// Most nodes expanded before giving up.
    pub max_nodes: usize,
    /// A node closer than this to the goal may finish the path.
    pub goal_tolerance: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_cost: 4096,
            max_nodes: 1 << 18,
            goal_tolerance: DEFAULT_GOAL_TOLERANCE,
        }
    }
}

impl SearchConfig {
    /// Check that the budgets can produce a path at all.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_cost == 0 {
            return Err(ConfigError::ZeroCostBudget);
        }
        if self.max_nodes == 0 {
            return Err(ConfigError::ZeroNodeBudget);
        }
        if self.goal_tolerance < MIN_GOAL_TOLERANCE {
            return Err(ConfigError::GoalToleranceTooSmall {
                tolerance: self.goal_tolerance,
                min: MIN_GOAL_TOLERANCE,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(SearchConfig::default().validate(), Ok(()));
    }

    #[test]
    fn bad_budgets_are_rejected() {
        let c = SearchConfig {
            max_cost: 0,
            ..SearchConfig::default()
        };
        assert_eq!(c.validate(), Err(ConfigError::ZeroCostBudget));
        let c = SearchConfig {
            max_nodes: 0,
            ..SearchConfig::default()
        };
        assert_eq!(c.validate(), Err(ConfigError::ZeroNodeBudget));
        let c = SearchConfig {
            goal_tolerance: 4,
            ..SearchConfig::default()
        };
        let err = c.validate().expect_err("tolerance too small");
        assert_eq!(
            err.to_string(),
            "goal_tolerance 4 is below the minimum of 12"
        );
    }

    #[test]
    fn diagonal_cost_covers_the_diagonal() {
        let diagonal = f64::from(STEP_COST) * core::f64::consts::SQRT_2;
        assert!(f64::from(DIAGONAL_COST) >= diagonal);
        assert_eq!(f64::from(DIAGONAL_COST), diagonal.round());
    }
}
