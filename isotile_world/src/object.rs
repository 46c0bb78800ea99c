// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Objects placed on tiles, and the boxes they contribute to collision.

use kurbo::Rect;

use crate::bbox::{BoxSize, object_box};
use crate::collision::{CollisionTag, ObjectId};
use crate::coords::{ChunkCoords, LocalCoords, PixelOffset, Point};
use crate::pass_mode::PassMode;

/// The closed set of object variants.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ObjectKind {
    /// Furniture, doors, rocks. Dynamic scenery (doors) moves or changes
    /// often enough to be indexed incrementally.
    Scenery {
        /// Whether the collision box is maintained incrementally.
        dynamic: bool,
    },
    /// A moving creature. Always dynamic.
    Critter,
    /// A light source. Never collides.
    Light,
    /// A cut-out in the terrain. Never collides itself; a physics hole
    /// removes its area from ground and wall boxes.
    Hole {
        /// Whether the hole cuts collision geometry.
        affects_physics: bool,
    },
}

/// Everything needed to place an object except its id and position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectProto {
    /// Variant.
    pub kind: ObjectKind,
    /// Displacement of the collision box center from the object's position.
    pub bbox_offset: PixelOffset,
    /// Collision box size.
    pub bbox_size: BoxSize,
    /// How much the collision box lets through.
    pub pass: PassMode,
}

impl ObjectProto {
    /// A prototype with a full-tile box that blocks movement and projectiles.
    pub const fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            bbox_offset: PixelOffset::new(0, 0),
            bbox_size: BoxSize::new(64, 64),
            pass: PassMode::SeeThrough,
        }
    }

    /// Static scenery.
    pub const fn scenery(pass: PassMode, bbox_size: BoxSize) -> Self {
        Self {
            pass,
            bbox_size,
            ..Self::new(ObjectKind::Scenery { dynamic: false })
        }
    }

    /// A critter.
    pub const fn critter(bbox_size: BoxSize) -> Self {
        Self {
            bbox_size,
            pass: PassMode::Blocked,
            ..Self::new(ObjectKind::Critter)
        }
    }

    /// A hole of the given size.
    pub const fn hole(bbox_size: BoxSize, affects_physics: bool) -> Self {
        Self {
            bbox_size,
            pass: PassMode::Pass,
            ..Self::new(ObjectKind::Hole { affects_physics })
        }
    }

    /// Replace the box offset.
    pub const fn with_bbox_offset(mut self, bbox_offset: PixelOffset) -> Self {
        self.bbox_offset = bbox_offset;
        self
    }

    /// Whether boxes of this prototype are maintained incrementally.
    pub const fn is_dynamic(&self) -> bool {
        match self.kind {
            ObjectKind::Critter => true,
            ObjectKind::Scenery { dynamic } => dynamic,
            ObjectKind::Light | ObjectKind::Hole { .. } => false,
        }
    }

    /// Collision box of an instance at `local` + `offset`, if it has one.
    pub fn collision_box(&self, local: LocalCoords, offset: PixelOffset) -> Option<Rect> {
        match self.kind {
            ObjectKind::Light | ObjectKind::Hole { .. } => None,
            ObjectKind::Scenery { .. } | ObjectKind::Critter => {
                if !self.pass.is_blocking() || self.bbox_size.is_empty() {
                    return None;
                }
                Some(object_box(local, offset, self.bbox_offset, self.bbox_size))
            }
        }
    }
}

/// An object living in a chunk.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Object {
    id: ObjectId,
    local: LocalCoords,
    offset: PixelOffset,
    proto: ObjectProto,
}

impl Object {
    pub(crate) fn new(id: ObjectId, at: Point, proto: ObjectProto) -> Self {
        Self {
            id,
            local: at.local(),
            offset: at.offset(),
            proto,
        }
    }

    /// Identifier.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Tile the object stands on.
    pub fn local(&self) -> LocalCoords {
        self.local
    }

    /// Offset from the tile center, normalized.
    pub fn offset(&self) -> PixelOffset {
        self.offset
    }

    /// Position, given the owning chunk.
    pub fn position(&self, chunk: ChunkCoords) -> Point {
        Point::new(chunk, self.local, self.offset)
    }

    /// Prototype the object was made from.
    pub fn proto(&self) -> &ObjectProto {
        &self.proto
    }

    /// Variant.
    pub fn kind(&self) -> ObjectKind {
        self.proto.kind
    }

    /// How much the collision box lets through.
    pub fn pass(&self) -> PassMode {
        self.proto.pass
    }

    /// Whether the collision box is maintained incrementally.
    pub fn is_dynamic(&self) -> bool {
        self.proto.is_dynamic()
    }

    /// Collision box in the owning chunk's frame, if the object collides.
    pub fn collision_box(&self) -> Option<Rect> {
        self.proto.collision_box(self.local, self.offset)
    }

    /// Area this object cuts out of terrain, if it is a physics hole.
    pub fn hole_box(&self) -> Option<Rect> {
        match self.proto.kind {
            ObjectKind::Hole {
                affects_physics: true,
            } if !self.proto.bbox_size.is_empty() => Some(object_box(
                self.local,
                self.offset,
                self.proto.bbox_offset,
                self.proto.bbox_size,
            )),
            _ => None,
        }
    }

    /// Payload for this object's collision entry.
    pub fn tag(&self) -> CollisionTag {
        CollisionTag::object(self.id, self.proto.pass)
    }

    pub(crate) fn set_position(&mut self, at: Point) {
        self.local = at.local();
        self.offset = at.offset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_blocking_sized_bodies_collide() {
        let at = Point::at_tile(ChunkCoords::new(0, 0, 0), LocalCoords::new(2, 3));
        let rock = Object::new(
            ObjectId(1),
            at,
            ObjectProto::scenery(PassMode::Blocked, BoxSize::new(32, 16)),
        );
        assert_eq!(
            rock.collision_box(),
            Some(Rect::new(112.0, 184.0, 144.0, 200.0))
        );
        let rug = Object::new(
            ObjectId(2),
            at,
            ObjectProto::scenery(PassMode::Pass, BoxSize::new(64, 64)),
        );
        assert_eq!(rug.collision_box(), None);
        let light = Object::new(ObjectId(3), at, ObjectProto::new(ObjectKind::Light));
        assert_eq!(light.collision_box(), None);
        let hole = Object::new(ObjectId(4), at, ObjectProto::hole(BoxSize::new(8, 8), true));
        assert_eq!(hole.collision_box(), None);
        assert_eq!(hole.hole_box(), Some(Rect::new(124.0, 188.0, 132.0, 196.0)));
        assert!(!hole.is_dynamic());
        assert!(Object::new(ObjectId(5), at, ObjectProto::critter(BoxSize::new(32, 32))).is_dynamic());
    }
}
