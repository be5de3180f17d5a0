use std::time::Duration;

use boxoban_core::{destination_sub_type, CellCoord, EntityId, EntityKind, TerrainId};

/// Slide between two cells that presentation layers may still be animating.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveInFlight {
    /// Cell the entity left.
    pub from: CellCoord,
    /// Cell the entity logically occupies already.
    pub to: CellCoord,
    /// Simulated time spent sliding so far.
    pub elapsed: Duration,
}

#[derive(Clone, Debug)]
pub(crate) struct Entity {
    pub(crate) id: EntityId,
    pub(crate) kind: EntityKind,
    pub(crate) cell: CellCoord,
    pub(crate) at_destination: bool,
    pub(crate) in_flight: Option<MoveInFlight>,
}

impl Entity {
    pub(crate) fn new(id: EntityId, kind: EntityKind, cell: CellCoord) -> Self {
        Self {
            id,
            kind,
            cell,
            at_destination: false,
            in_flight: None,
        }
    }

    pub(crate) fn is_moving(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Leaves the current cell, returning whether the box was settled there.
    pub(crate) fn exit_cell(&mut self) -> bool {
        std::mem::replace(&mut self.at_destination, false)
    }

    /// Enters `cell` and recomputes the destination status against `terrain`.
    pub(crate) fn enter_cell(&mut self, cell: CellCoord, terrain: Option<TerrainId>) -> bool {
        self.cell = cell;
        self.at_destination = match (self.kind, terrain.and_then(destination_sub_type)) {
            (EntityKind::Box(box_type), Some(sub_type)) => box_type.accepts(sub_type),
            _ => false,
        };
        self.at_destination
    }

    /// Starts a slide unless the configured slide is instantaneous.
    pub(crate) fn begin_slide(&mut self, from: CellCoord, to: CellCoord, slide: Duration) {
        self.in_flight = (!slide.is_zero()).then_some(MoveInFlight {
            from,
            to,
            elapsed: Duration::ZERO,
        });
    }

    /// Accumulates `dt` and reports whether the slide just finished.
    pub(crate) fn advance_slide(&mut self, dt: Duration, slide: Duration) -> bool {
        let Some(flight) = self.in_flight.as_mut() else {
            return false;
        };
        flight.elapsed = flight.elapsed.saturating_add(dt);
        if flight.elapsed >= slide {
            self.in_flight = None;
            true
        } else {
            false
        }
    }
}
