// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Payloads stored with every collision box.

use crate::coords::LocalCoords;
use crate::pass_mode::PassMode;

/// Identifier of an object placed in the world.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectId(pub u64);

/// Which piece of a tile a geometry box came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeometryPart {
    /// The ground of the tile.
    Ground,
    /// The wall along the tile's north edge.
    WallNorth,
    /// The wall along the tile's west edge.
    WallWest,
}

/// What produced a collision box.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collider {
    /// Static tile geometry.
    Geometry {
        /// Tile within the owning chunk.
        tile: LocalCoords,
        /// Ground or wall.
        part: GeometryPart,
    },
    /// An object.
    Object(ObjectId),
}

/// Payload of one entry in a chunk's collision index.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollisionTag {
    /// Source of the box.
    pub collider: Collider,
    /// How much the box lets through.
    pub pass: PassMode,
}

impl CollisionTag {
    /// Tag for tile geometry.
    pub const fn geometry(tile: LocalCoords, part: GeometryPart, pass: PassMode) -> Self {
        Self {
            collider: Collider::Geometry { tile, part },
            pass,
        }
    }

    /// Tag for an object.
    pub const fn object(id: ObjectId, pass: PassMode) -> Self {
        Self {
            collider: Collider::Object(id),
            pass,
        }
    }

    /// The owning object, if the box belongs to one.
    pub const fn object_id(&self) -> Option<ObjectId> {
        match self.collider {
            Collider::Object(id) => Some(id),
            Collider::Geometry { .. } => None,
        }
    }

    /// Whether the box belongs to `own`. Geometry belongs to nobody.
    pub fn is_owned_by(&self, own: Option<ObjectId>) -> bool {
        own.is_some() && self.object_id() == own
    }
}
