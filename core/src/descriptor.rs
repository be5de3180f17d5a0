//! Plain data describing a level before it is instantiated by the world.

use serde::{Deserialize, Serialize};

use crate::{EntityKind, TerrainId};

/// Complete description of a level as stored on disk.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDescriptor {
    /// Human readable title of the level.
    pub name: String,
    /// Free-form text shown before the level starts.
    pub description: String,
    /// Name of the sprite sheet used to draw the terrain.
    pub tileset: String,
    /// Terrain layout of the level.
    pub world: WorldDescriptor,
    /// Entities placed on top of the terrain, in load order.
    pub entities: Vec<EntityDescriptor>,
}

/// Dimensions and row-major terrain ids of a level.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldDescriptor {
    /// Number of columns in the grid.
    pub width: u32,
    /// Number of rows in the grid.
    pub height: u32,
    /// Terrain ids laid out row by row, `width` ids per row.
    pub terrain: Vec<TerrainId>,
}

impl WorldDescriptor {
    /// Number of cells the declared dimensions describe.
    ///
    /// Returns `None` when the product does not fit in memory addressing.
    #[must_use]
    pub fn declared_cells(&self) -> Option<usize> {
        let width = usize::try_from(self.width).ok()?;
        let height = usize::try_from(self.height).ok()?;
        width.checked_mul(height)
    }

    /// Reports whether the terrain sequence matches the declared dimensions.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.declared_cells() == Some(self.terrain.len())
    }

    /// Terrain id stored at the provided column and row, if inside the grid.
    #[must_use]
    pub fn terrain_at(&self, column: u32, row: u32) -> Option<TerrainId> {
        if column >= self.width || row >= self.height {
            return None;
        }
        let index = usize::try_from(row)
            .ok()?
            .checked_mul(usize::try_from(self.width).ok()?)?
            .checked_add(usize::try_from(column).ok()?)?;
        self.terrain.get(index).copied()
    }
}

/// Entity record as written in level documents.
///
/// The raw tag is kept verbatim so documents round-trip even when they carry
/// tags the engine does not recognise.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    /// Type tag such as `player`, `box` or `box3`.
    pub tag: String,
    /// Column of the entity, may be out of range in hand-edited documents.
    pub x: i32,
    /// Row of the entity, may be out of range in hand-edited documents.
    pub y: i32,
}

impl EntityDescriptor {
    /// Creates a descriptor whose tag is derived from the provided kind.
    #[must_use]
    pub fn new(kind: EntityKind, x: i32, y: i32) -> Self {
        Self {
            tag: kind.tag(),
            x,
            y,
        }
    }

    /// Parses the tag into an entity kind, `None` when unrecognised.
    #[must_use]
    pub fn kind(&self) -> Option<EntityKind> {
        EntityKind::from_tag(&self.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BoxType;

    #[test]
    fn consistency_requires_exact_terrain_length() {
        let mut world = WorldDescriptor {
            width: 3,
            height: 2,
            terrain: vec![TerrainId::EMPTY; 6],
        };
        assert!(world.is_consistent());
        let _ = world.terrain.pop();
        assert!(!world.is_consistent());
    }

    #[test]
    fn terrain_at_rejects_row_wraparound() {
        let world = WorldDescriptor {
            width: 2,
            height: 2,
            terrain: (0..4).map(TerrainId::new).collect(),
        };
        assert_eq!(world.terrain_at(1, 1), Some(TerrainId::new(3)));
        assert_eq!(world.terrain_at(2, 0), None);
        assert_eq!(world.terrain_at(0, 2), None);
    }

    #[test]
    fn entity_descriptor_tags_follow_kind() {
        let player = EntityDescriptor::new(EntityKind::Player, 1, 2);
        let typed = EntityDescriptor::new(EntityKind::Box(BoxType::new(3)), 0, 0);
        assert_eq!(player.tag, "player");
        assert_eq!(typed.tag, "box3");
        assert_eq!(typed.kind(), Some(EntityKind::Box(BoxType::new(3))));
    }
}
