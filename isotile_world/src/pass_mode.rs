// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! How much a collider lets through.

use bitflags::bitflags;

/// How a collider interacts with movers, projectiles, and sight.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PassMode {
    /// Blocks everything.
    Blocked,
    /// Blocks movement and projectiles; sight passes.
    SeeThrough,
    /// Blocks movement only.
    ShootThrough,
    /// Blocks nothing. Never stored in a collision index.
    Pass,
}

bitflags! {
    /// Kinds of traffic a collider can stop.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct Blocks: u8 {
        /// Walking movers.
        const MOVEMENT = 1 << 0;
        /// Projectiles.
        const PROJECTILES = 1 << 1;
        /// Line of sight.
        const SIGHT = 1 << 2;
    }
}

impl PassMode {
    /// What this mode stops.
    pub const fn blocks(self) -> Blocks {
        match self {
            Self::Blocked => Blocks::all(),
            Self::SeeThrough => Blocks::MOVEMENT.union(Blocks::PROJECTILES),
            Self::ShootThrough => Blocks::MOVEMENT,
            Self::Pass => Blocks::empty(),
        }
    }

    /// Whether this mode stops anything at all.
    pub const fn is_blocking(self) -> bool {
        !matches!(self, Self::Pass)
    }
}
