use tracing::info;

use crate::entities::Entity;

/// Announces victory once per transition into the all-settled state.
#[derive(Clone, Copy, Debug)]
pub(crate) struct VictoryEvaluator {
    announced: bool,
}

impl VictoryEvaluator {
    /// A level that starts solved counts as already announced.
    pub(crate) fn primed(entities: &[Entity]) -> Self {
        Self {
            announced: all_boxes_settled(entities),
        }
    }

    /// Called whenever a settled box leaves its destination.
    pub(crate) fn rearm(&mut self) {
        self.announced = false;
    }

    /// Returns `true` exactly when victory should be signalled now.
    pub(crate) fn check(&mut self, entities: &[Entity]) -> bool {
        if self.announced || !all_boxes_settled(entities) {
            return false;
        }
        self.announced = true;
        info!(boxes = box_count(entities), "every box rests on a destination");
        true
    }
}

/// Levels without boxes never count as solved.
pub(crate) fn all_boxes_settled(entities: &[Entity]) -> bool {
    let mut boxes = entities.iter().filter(|entity| entity.kind.is_box()).peekable();
    boxes.peek().is_some() && boxes.all(|entity| entity.at_destination)
}

fn box_count(entities: &[Entity]) -> usize {
    entities.iter().filter(|entity| entity.kind.is_box()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxoban_core::{BoxType, CellCoord, EntityId, EntityKind};

    fn entity(kind: EntityKind, at_destination: bool) -> Entity {
        let mut entity = Entity::new(EntityId::new(0), kind, CellCoord::new(0, 0));
        entity.at_destination = at_destination;
        entity
    }

    #[test]
    fn zero_boxes_is_not_victory() {
        let entities = vec![entity(EntityKind::Player, false)];
        assert!(!all_boxes_settled(&entities));
        let mut evaluator = VictoryEvaluator::primed(&entities);
        assert!(!evaluator.check(&entities));
    }

    #[test]
    fn announces_once_until_rearmed() {
        let mut entities = vec![
            entity(EntityKind::Box(BoxType::GENERIC), false),
            entity(EntityKind::Box(BoxType::GENERIC), true),
        ];
        let mut evaluator = VictoryEvaluator::primed(&entities);
        assert!(!evaluator.check(&entities));

        entities[0].at_destination = true;
        assert!(evaluator.check(&entities));
        assert!(!evaluator.check(&entities));

        evaluator.rearm();
        assert!(evaluator.check(&entities));
    }

    #[test]
    fn solved_start_is_not_announced() {
        let entities = vec![entity(EntityKind::Box(BoxType::GENERIC), true)];
        let mut evaluator = VictoryEvaluator::primed(&entities);
        assert!(!evaluator.check(&entities));
    }
}
