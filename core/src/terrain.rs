//! Terrain identifier table and the pure classifier built on top of it.
//!
//! Terrain ids are partitioned into contiguous ranges. Within the wall, floor,
//! destination floor and box ranges the offset from the range start encodes a
//! sub-type, which is how destination floors declare the boxes they accept.

use serde::{Deserialize, Serialize};

/// Maximum number of distinct box sub-types the id table can address.
pub const MAX_BOX_TYPES: u32 = 128;

/// Tile id used by the interchange format to mark the player entity.
///
/// The interchange format shifts every internal id by one and reserves the
/// first id past the destination box range for the player sprite sheet.
pub const PLAYER_TILE_ID: u32 = TerrainId::LAST_DESTINATION_BOX.get() + 2;

/// Numeric code describing the static background of a cell.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TerrainId(u32);

impl TerrainId {
    /// Void cell that is not part of the playable level.
    pub const EMPTY: Self = Self(0);
    /// First id of the wall range.
    pub const FIRST_WALL: Self = Self(1);
    /// Last id of the wall range.
    pub const LAST_WALL: Self = Self(255);
    /// First id of the plain floor range.
    pub const FIRST_FLOOR: Self = Self(256);
    /// Last id of the plain floor range.
    pub const LAST_FLOOR: Self = Self(511);
    /// First id of the special floor range.
    pub const FIRST_SPECIAL_FLOOR: Self = Self(512);
    /// Last id of the special floor range.
    pub const LAST_SPECIAL_FLOOR: Self = Self(639);
    /// First id of the destination floor range.
    pub const FIRST_DESTINATION_FLOOR: Self = Self(640);
    /// Last id of the destination floor range.
    pub const LAST_DESTINATION_FLOOR: Self = Self(767);
    /// First id of the box sprite range.
    pub const FIRST_BOX: Self = Self(768);
    /// Last id of the box sprite range.
    pub const LAST_BOX: Self = Self(895);
    /// First id of the settled box sprite range.
    pub const FIRST_DESTINATION_BOX: Self = Self(896);
    /// Last id of the settled box sprite range.
    pub const LAST_DESTINATION_BOX: Self = Self(1023);

    /// Wraps a raw numeric terrain id.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the raw numeric id.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Builds the destination floor id that accepts boxes of `sub_type`.
    #[must_use]
    pub const fn destination_floor(sub_type: u32) -> Self {
        Self(Self::FIRST_DESTINATION_FLOOR.0 + sub_type)
    }

    /// Builds the box sprite id for the provided sub-type.
    #[must_use]
    pub const fn box_sprite(sub_type: u32) -> Self {
        Self(Self::FIRST_BOX.0 + sub_type)
    }

    /// Classifies the id into exactly one terrain category.
    #[must_use]
    pub const fn class(self) -> TerrainClass {
        classify(self)
    }

    /// Reports whether entities may stand on this terrain.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        is_walkable(self)
    }

    const fn within(self, first: Self, last: Self) -> bool {
        first.0 <= self.0 && self.0 <= last.0
    }
}

/// Semantic category of a terrain id, carrying the sub-type where one exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TerrainClass {
    /// Void outside the playable area, also used for unknown ids.
    Empty,
    /// Impassable wall.
    Wall(u32),
    /// Plain walkable floor.
    Floor(u32),
    /// Walkable floor with a special sprite but no gameplay meaning.
    SpecialFloor(u32),
    /// Walkable floor that accepts boxes of the carried sub-type.
    DestinationFloor(u32),
    /// Box sprite id, only meaningful for interchange entity layers.
    Box(u32),
    /// Settled box sprite id, only meaningful for interchange entity layers.
    DestinationBox(u32),
}

/// Maps a terrain id onto its category.
#[must_use]
pub const fn classify(id: TerrainId) -> TerrainClass {
    if id.within(TerrainId::FIRST_WALL, TerrainId::LAST_WALL) {
        TerrainClass::Wall(id.0 - TerrainId::FIRST_WALL.0)
    } else if id.within(TerrainId::FIRST_FLOOR, TerrainId::LAST_FLOOR) {
        TerrainClass::Floor(id.0 - TerrainId::FIRST_FLOOR.0)
    } else if id.within(TerrainId::FIRST_SPECIAL_FLOOR, TerrainId::LAST_SPECIAL_FLOOR) {
        TerrainClass::SpecialFloor(id.0 - TerrainId::FIRST_SPECIAL_FLOOR.0)
    } else if id.within(
        TerrainId::FIRST_DESTINATION_FLOOR,
        TerrainId::LAST_DESTINATION_FLOOR,
    ) {
        TerrainClass::DestinationFloor(id.0 - TerrainId::FIRST_DESTINATION_FLOOR.0)
    } else if id.within(TerrainId::FIRST_BOX, TerrainId::LAST_BOX) {
        TerrainClass::Box(id.0 - TerrainId::FIRST_BOX.0)
    } else if id.within(TerrainId::FIRST_DESTINATION_BOX, TerrainId::LAST_DESTINATION_BOX) {
        TerrainClass::DestinationBox(id.0 - TerrainId::FIRST_DESTINATION_BOX.0)
    } else {
        TerrainClass::Empty
    }
}

/// Floor, special floor and destination floor are contiguous and walkable.
#[must_use]
pub const fn is_walkable(id: TerrainId) -> bool {
    id.within(TerrainId::FIRST_FLOOR, TerrainId::LAST_DESTINATION_FLOOR)
}

/// Sub-type accepted by a destination floor, `None` for every other terrain.
#[must_use]
pub const fn destination_sub_type(id: TerrainId) -> Option<u32> {
    match classify(id) {
        TerrainClass::DestinationFloor(sub_type) => Some(sub_type),
        _ => None,
    }
}
