//! Move resolution: walk, push or block, applied atomically.

use boxoban_core::{BlockReason, CellCoord, Direction, EntityId, EntityKind, Event, MoveOutcome};

use crate::World;

/// Result of resolving a request before the outcome is broadcast.
pub(crate) struct Resolution {
    pub(crate) outcome: MoveOutcome,
    /// A pushed box entered a destination that accepts it.
    pub(crate) settled: bool,
}

impl Resolution {
    fn blocked(reason: BlockReason) -> Self {
        Self {
            outcome: MoveOutcome::Blocked(reason),
            settled: false,
        }
    }
}

impl World {
    /// Decides the outcome of a move and mutates occupancy when it is legal.
    ///
    /// A blocked outcome leaves the world untouched. A push moves the box
    /// first so that its events precede the pusher's.
    pub(crate) fn resolve_move(
        &mut self,
        entity: EntityId,
        direction: Direction,
        out_events: &mut Vec<Event>,
    ) -> Resolution {
        let Some(mover) = self.entity_index(entity) else {
            return Resolution::blocked(BlockReason::UnknownEntity);
        };
        if self.entities[mover].kind != EntityKind::Player {
            return Resolution::blocked(BlockReason::NotControllable);
        }
        if self.entities[mover].is_moving() {
            return Resolution::blocked(BlockReason::InFlight);
        }

        let from = self.entities[mover].cell;
        let Some(target) = self.walkable_neighbor(from, direction) else {
            return Resolution::blocked(BlockReason::Obstructed);
        };

        let Some(occupant) = self.grid.occupant(target) else {
            let _ = self.relocate(mover, target, MoveOutcome::Walked, out_events);
            return Resolution {
                outcome: MoveOutcome::Walked,
                settled: false,
            };
        };

        let Some(pushed) = self.entity_index(occupant) else {
            return Resolution::blocked(BlockReason::Obstructed);
        };
        if !self.entities[pushed].kind.is_box() {
            return Resolution::blocked(BlockReason::Obstructed);
        }
        if self.entities[pushed].is_moving() {
            return Resolution::blocked(BlockReason::InFlight);
        }

        let Some(beyond) = self.walkable_neighbor(target, direction) else {
            return Resolution::blocked(BlockReason::Obstructed);
        };
        if self.grid.occupant(beyond).is_some() {
            return Resolution::blocked(BlockReason::Obstructed);
        }

        let settled = self.relocate(pushed, beyond, MoveOutcome::Pushed, out_events);
        let _ = self.relocate(mover, target, MoveOutcome::Pushed, out_events);
        Resolution {
            outcome: MoveOutcome::Pushed,
            settled,
        }
    }

    /// Moves the entity at `index` into `to`, returning whether a box settled.
    fn relocate(
        &mut self,
        index: usize,
        to: CellCoord,
        outcome: MoveOutcome,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let slide = self.config.slide_duration;
        let terrain = self.grid.terrain(to);
        let Some(entity) = self.entities.get_mut(index) else {
            return false;
        };

        let from = entity.cell;
        self.grid.vacate(from);
        self.grid.occupy(to, entity.id);
        if entity.exit_cell() {
            self.victory.rearm();
        }
        let at_destination = entity.enter_cell(to, terrain);
        entity.begin_slide(from, to, slide);

        out_events.push(Event::EntityMoved {
            entity: entity.id,
            from,
            to,
            outcome,
        });

        if entity.kind.is_box() {
            out_events.push(Event::BoxSettled {
                entity: entity.id,
                at_destination,
            });
            at_destination
        } else {
            false
        }
    }

    fn walkable_neighbor(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        self.grid
            .neighbor(cell, direction)
            .filter(|next| self.grid.is_walkable(*next))
    }
}
