#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Boxoban engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired moves, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Level data travels as a [`LevelDescriptor`]
//! produced by the format adapters and consumed once by the world.

use std::time::Duration;

use serde::{Deserialize, Serialize};

mod descriptor;
mod terrain;

pub use descriptor::{EntityDescriptor, LevelDescriptor, WorldDescriptor};
pub use terrain::{
    classify, destination_sub_type, is_walkable, TerrainClass, TerrainId, MAX_BOX_TYPES,
    PLAYER_TILE_ID,
};

/// Tag used by level documents for the player entity.
pub const PLAYER_TAG: &str = "player";

/// Tag prefix used by level documents for box entities.
pub const BOX_TAG: &str = "box";

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests that an entity move a single cell in the specified direction.
    RequestMove {
        /// Identifier of the entity attempting to move.
        entity: EntityId,
        /// Direction of travel for the attempted move.
        direction: Direction,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Reports how a move request was resolved. Emitted for every request.
    MoveResolved {
        /// Entity named in the request.
        entity: EntityId,
        /// Direction named in the request.
        direction: Direction,
        /// Resolution of the request.
        outcome: MoveOutcome,
    },
    /// Confirms that an entity changed cells.
    EntityMoved {
        /// Identifier of the entity that moved.
        entity: EntityId,
        /// Cell the entity occupied before moving.
        from: CellCoord,
        /// Cell the entity occupies after moving.
        to: CellCoord,
        /// Outcome of the move that displaced the entity.
        outcome: MoveOutcome,
    },
    /// Announces the destination status of a box after it entered a cell.
    BoxSettled {
        /// Identifier of the box.
        entity: EntityId,
        /// Whether the box now rests on a compatible destination.
        at_destination: bool,
    },
    /// Confirms that an in-flight move finished sliding.
    MoveCompleted {
        /// Identifier of the entity that came to rest.
        entity: EntityId,
        /// Cell the entity rests on.
        cell: CellCoord,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Every box in the level rests on a compatible destination.
    Victory,
}

/// Resolution of a single move request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveOutcome {
    /// The mover stepped into an empty walkable cell.
    Walked,
    /// The mover displaced a box and stepped into its former cell.
    Pushed,
    /// Nothing changed.
    Blocked(BlockReason),
}

impl MoveOutcome {
    /// Reports whether the outcome changed the level.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked(_))
    }
}

/// Reasons a move request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockReason {
    /// The target cell, or the cell beyond a pushed box, cannot be entered.
    Obstructed,
    /// The mover, or the box it would push, is still sliding.
    InFlight,
    /// No entity with the provided identifier exists.
    UnknownEntity,
    /// The entity exists but cannot initiate moves on its own.
    NotControllable,
}

/// Cardinal movement directions available to entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// All directions in clockwise order starting at north.
    pub const ALL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Column and row delta applied by a single step.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Converts signed document coordinates, rejecting negative values.
    #[must_use]
    pub fn from_signed(x: i32, y: i32) -> Option<Self> {
        Some(Self::new(u32::try_from(x).ok()?, u32::try_from(y).ok()?))
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Cell one step away in the provided direction.
    ///
    /// Only underflow is rejected here; the upper bound belongs to the grid.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (dx, dy) = direction.offset();
        let column = self.column.checked_add_signed(dx)?;
        let row = self.row.checked_add_signed(dy)?;
        Some(Self::new(column, row))
    }
}

/// Unique identifier assigned to an entity when a level is loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Sub-type of a box, matched against destination floor sub-types.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BoxType(u16);

impl BoxType {
    /// Box that fits every destination.
    pub const GENERIC: Self = Self(0);

    /// Creates a box type from its numeric sub-type.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the numeric sub-type.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }

    /// Reports whether a destination floor of `sub_type` accepts this box.
    #[must_use]
    pub const fn accepts(&self, sub_type: u32) -> bool {
        self.0 == Self::GENERIC.0 || self.0 as u32 == sub_type
    }
}

/// Kinds of entities that can occupy a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// The pusher controlled by input.
    Player,
    /// A pushable box of the provided sub-type.
    Box(BoxType),
}

impl EntityKind {
    /// Parses a level document type tag.
    ///
    /// Tags are case-insensitive: `player`, `box` and `box` followed by a
    /// decimal sub-type. Anything else yields `None`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.to_ascii_lowercase();
        if tag == PLAYER_TAG {
            return Some(Self::Player);
        }
        let suffix = tag.strip_prefix(BOX_TAG)?;
        if suffix.is_empty() {
            return Some(Self::Box(BoxType::GENERIC));
        }
        if !suffix.bytes().all(|byte| byte.is_ascii_digit()) {
            return None;
        }
        suffix.parse().ok().map(|value| Self::Box(BoxType::new(value)))
    }

    /// Canonical document tag for the kind.
    #[must_use]
    pub fn tag(&self) -> String {
        match self {
            Self::Player => PLAYER_TAG.to_owned(),
            Self::Box(box_type) if *box_type == BoxType::GENERIC => BOX_TAG.to_owned(),
            Self::Box(box_type) => format!("{BOX_TAG}{}", box_type.get()),
        }
    }

    /// Reports whether the kind is a box of any sub-type.
    #[must_use]
    pub const fn is_box(&self) -> bool {
        matches!(self, Self::Box(_))
    }
}

/// Immutable representation of a single entity's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntitySnapshot {
    /// Unique identifier assigned to the entity.
    pub id: EntityId,
    /// Kind of the entity.
    pub kind: EntityKind,
    /// Grid cell currently occupied by the entity.
    pub cell: CellCoord,
    /// Whether the entity is a box resting on a compatible destination.
    pub at_destination: bool,
    /// Whether the entity is still sliding into its cell.
    pub moving: bool,
}

/// Steps and whole seconds spent solving a level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Score {
    /// Number of moves that changed the level.
    pub steps: u32,
    /// Whole seconds elapsed while playing.
    pub seconds: u32,
}

impl Score {
    /// Creates a new score.
    #[must_use]
    pub const fn new(steps: u32, seconds: u32) -> Self {
        Self { steps, seconds }
    }

    /// Fewer steps wins; equal steps fall back to fewer seconds.
    #[must_use]
    pub const fn is_better_than(&self, other: &Self) -> bool {
        self.steps < other.steps || (self.steps == other.steps && self.seconds < other.seconds)
    }
}
