// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors from building a searcher.

use core::fmt;

/// A [`SearchConfig`](crate::SearchConfig) that cannot drive a search.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `max_cost` is zero, so not even the start could be kept.
    ZeroCostBudget,
    /// `max_nodes` is zero, so nothing could be expanded.
    ZeroNodeBudget,
    /// Some positions would be farther from every grid node than the tolerance.
    GoalToleranceTooSmall {
        /// Configured tolerance.
        tolerance: u32,
        /// Smallest tolerance that reaches every position.
        min: u32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroCostBudget => f.write_str("max_cost must be positive"),
            Self::ZeroNodeBudget => f.write_str("max_nodes must be positive"),
            Self::GoalToleranceTooSmall { tolerance, min } => {
                write!(f, "goal_tolerance {tolerance} is below the minimum of {min}")
            }
        }
    }
}

impl core::error::Error for ConfigError {}
