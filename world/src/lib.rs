#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level state management for Boxoban.
//!
//! A [`World`] is built once from a [`LevelDescriptor`] and then mutated only
//! through [`apply`]. Every move request resolves synchronously to a walk, a
//! push or a block; the resulting [`Event`] stream is what systems and
//! presentation layers observe.

use std::{fmt, time::Duration};

use boxoban_core::{
    CellCoord, Command, Direction, EntityId, EntityKind, Event, LevelDescriptor, MoveOutcome,
    TerrainClass,
};
use thiserror::Error;
use tracing::{debug, warn};

mod entities;
mod grid;
mod movement;
mod victory;

pub use entities::MoveInFlight;

use entities::Entity;
use grid::LevelGrid;
use victory::VictoryEvaluator;

/// Tunables applied while a level is running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldConfig {
    /// Simulated time a moved entity stays in flight before it may move again.
    ///
    /// Zero makes every move complete instantly.
    pub slide_duration: Duration,
}

impl WorldConfig {
    /// Creates a configuration with the provided slide duration.
    #[must_use]
    pub const fn new(slide_duration: Duration) -> Self {
        Self { slide_duration }
    }
}

/// Reasons a level descriptor cannot be turned into a world.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The terrain sequence does not match the declared dimensions.
    #[error("world declares {width}x{height} cells but the terrain holds {terrain} ids")]
    MalformedLevel {
        /// Declared number of columns.
        width: u32,
        /// Declared number of rows.
        height: u32,
        /// Number of terrain ids actually present.
        terrain: usize,
    },
}

/// Represents the authoritative Boxoban level state.
#[derive(Debug)]
pub struct World {
    name: String,
    description: String,
    tileset: String,
    config: WorldConfig,
    grid: LevelGrid,
    entities: Vec<Entity>,
    victory: VictoryEvaluator,
}

impl World {
    /// Builds a fresh world from the descriptor.
    ///
    /// Entities whose tag is unknown, whose position is off the grid or not
    /// walkable, or whose cell is already taken are skipped.
    pub fn load(descriptor: &LevelDescriptor, config: WorldConfig) -> Result<Self, LoadError> {
        let layout = &descriptor.world;
        if !layout.is_consistent() {
            return Err(LoadError::MalformedLevel {
                width: layout.width,
                height: layout.height,
                terrain: layout.terrain.len(),
            });
        }

        let mut grid = LevelGrid::new(layout.width, layout.height, layout.terrain.clone());
        let mut entities: Vec<Entity> = Vec::new();

        for (index, record) in descriptor.entities.iter().enumerate() {
            let Some(kind) = record.kind() else {
                warn!(index, tag = %record.tag, "skipping entity with unknown type tag");
                continue;
            };
            let Some(cell) =
                CellCoord::from_signed(record.x, record.y).filter(|cell| grid.contains(*cell))
            else {
                warn!(index, x = record.x, y = record.y, "skipping entity outside the world");
                continue;
            };
            if !grid.is_walkable(cell) {
                warn!(index, x = record.x, y = record.y, "skipping entity on solid terrain");
                continue;
            }
            if grid.occupant(cell).is_some() {
                warn!(index, x = record.x, y = record.y, "skipping entity on occupied cell");
                continue;
            }
            let Ok(raw_id) = u32::try_from(entities.len()) else {
                warn!(index, "entity id space exhausted");
                break;
            };

            let id = EntityId::new(raw_id);
            grid.occupy(cell, id);
            let mut entity = Entity::new(id, kind, cell);
            let _ = entity.enter_cell(cell, grid.terrain(cell));
            entities.push(entity);
        }

        let victory = VictoryEvaluator::primed(&entities);
        debug!(
            name = %descriptor.name,
            width = layout.width,
            height = layout.height,
            entities = entities.len(),
            "level loaded"
        );

        Ok(Self {
            name: descriptor.name.clone(),
            description: descriptor.description.clone(),
            tileset: descriptor.tileset.clone(),
            config,
            grid,
            entities,
            victory,
        })
    }

    /// Resolves one move request and broadcasts its events.
    ///
    /// Events are emitted in the order box moved, box settled, mover moved,
    /// move resolved, and finally victory when the move solved the level.
    pub fn request_move(
        &mut self,
        entity: EntityId,
        direction: Direction,
        out_events: &mut Vec<Event>,
    ) -> MoveOutcome {
        let resolution = self.resolve_move(entity, direction, out_events);
        out_events.push(Event::MoveResolved {
            entity,
            direction,
            outcome: resolution.outcome,
        });
        if resolution.settled && self.victory.check(&self.entities) {
            out_events.push(Event::Victory);
        }
        resolution.outcome
    }

    fn advance_time(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        out_events.push(Event::TimeAdvanced { dt });
        let slide = self.config.slide_duration;
        for entity in self.entities.iter_mut() {
            if entity.advance_slide(dt, slide) {
                out_events.push(Event::MoveCompleted {
                    entity: entity.id,
                    cell: entity.cell,
                });
            }
        }
    }

    fn entity_index(&self, entity: EntityId) -> Option<usize> {
        self.entities.iter().position(|candidate| candidate.id == entity)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::RequestMove { entity, direction } => {
            let _ = world.request_move(entity, direction, out_events);
        }
        Command::Tick { dt } => world.advance_time(dt, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use boxoban_core::{CellCoord, EntityId, EntityKind, EntitySnapshot, TerrainId};

    use super::{victory, MoveInFlight, World, WorldConfig};

    /// Title of the loaded level.
    #[must_use]
    pub fn name(world: &World) -> &str {
        &world.name
    }

    /// Description of the loaded level.
    #[must_use]
    pub fn description(world: &World) -> &str {
        &world.description
    }

    /// Tileset the level should be drawn with.
    #[must_use]
    pub fn tileset(world: &World) -> &str {
        &world.tileset
    }

    /// Configuration the world was loaded with.
    #[must_use]
    pub fn config(world: &World) -> WorldConfig {
        world.config
    }

    /// Provides the number of columns and rows of the grid.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        world.grid.dimensions()
    }

    /// Terrain id of the cell, `None` outside the grid.
    #[must_use]
    pub fn terrain(world: &World, cell: CellCoord) -> Option<TerrainId> {
        world.grid.terrain(cell)
    }

    /// Returns the entity occupying the provided cell, if any.
    #[must_use]
    pub fn occupant(world: &World, cell: CellCoord) -> Option<EntityId> {
        world.grid.occupant(cell)
    }

    /// Captures a snapshot of a single entity.
    #[must_use]
    pub fn entity(world: &World, entity: EntityId) -> Option<EntitySnapshot> {
        world
            .entities
            .iter()
            .find(|candidate| candidate.id == entity)
            .map(snapshot)
    }

    /// Captures snapshots of every entity ordered by identifier.
    #[must_use]
    pub fn entities(world: &World) -> Vec<EntitySnapshot> {
        world.entities.iter().map(snapshot).collect()
    }

    /// First player placed in the level.
    #[must_use]
    pub fn player(world: &World) -> Option<EntityId> {
        world
            .entities
            .iter()
            .find(|entity| entity.kind == EntityKind::Player)
            .map(|entity| entity.id)
    }

    /// Reports whether the entity is still sliding into its cell.
    #[must_use]
    pub fn is_moving(world: &World, entity: EntityId) -> bool {
        in_flight(world, entity).is_some()
    }

    /// Slide currently animating the entity, if any.
    #[must_use]
    pub fn in_flight(world: &World, entity: EntityId) -> Option<MoveInFlight> {
        world
            .entities
            .iter()
            .find(|candidate| candidate.id == entity)
            .and_then(|candidate| candidate.in_flight)
    }

    /// Reports whether every box rests on a compatible destination.
    ///
    /// Levels without boxes are never solved.
    #[must_use]
    pub fn is_victory(world: &World) -> bool {
        victory::all_boxes_settled(&world.entities)
    }

    fn snapshot(entity: &super::Entity) -> EntitySnapshot {
        EntitySnapshot {
            id: entity.id,
            kind: entity.kind,
            cell: entity.cell,
            at_destination: entity.at_destination,
            moving: entity.is_moving(),
        }
    }
}

/// Renders the live level with classic text-map glyphs.
impl fmt::Display for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (columns, _) = self.grid.dimensions();
        let mut line = String::new();
        for cell in self.grid.cells() {
            let goal = matches!(
                self.grid.terrain(cell).map(|terrain| terrain.class()),
                Some(TerrainClass::DestinationFloor(_))
            );
            let occupant = self
                .grid
                .occupant(cell)
                .and_then(|id| self.entity_index(id))
                .map(|index| self.entities[index].kind);
            let glyph = match (occupant, goal) {
                (Some(EntityKind::Player), false) => '@',
                (Some(EntityKind::Player), true) => '+',
                (Some(EntityKind::Box(_)), false) => '$',
                (Some(EntityKind::Box(_)), true) => '*',
                (None, true) => '.',
                (None, false) => match self.grid.terrain(cell).map(|terrain| terrain.class()) {
                    Some(TerrainClass::Wall(_)) => '#',
                    _ => ' ',
                },
            };
            line.push(glyph);
            if cell.column() + 1 == columns {
                writeln!(f, "{}", line.trim_end())?;
                line.clear();
            }
        }
        Ok(())
    }
}
