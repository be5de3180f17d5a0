use boxoban_core::{
    BlockReason, BoxType, CellCoord, Command, Direction, EntityDescriptor, EntityId, EntityKind,
    Event, LevelDescriptor, MoveOutcome, TerrainId, WorldDescriptor,
};
use boxoban_world::{self as world, query, World, WorldConfig};

const F: TerrainId = TerrainId::FIRST_FLOOR;
const W: TerrainId = TerrainId::FIRST_WALL;
const D: TerrainId = TerrainId::FIRST_DESTINATION_FLOOR;

fn level(width: u32, terrain: Vec<TerrainId>, entities: Vec<(EntityKind, i32, i32)>) -> World {
    let height = terrain.len() as u32 / width;
    let descriptor = LevelDescriptor {
        name: "Rules".to_owned(),
        description: String::new(),
        tileset: "TilesetWorld1".to_owned(),
        world: WorldDescriptor {
            width,
            height,
            terrain,
        },
        entities: entities
            .into_iter()
            .map(|(kind, x, y)| EntityDescriptor::new(kind, x, y))
            .collect(),
    };
    World::load(&descriptor, WorldConfig::default()).expect("level loads")
}

fn step(world: &mut World, direction: Direction) -> Vec<Event> {
    let mut events = Vec::new();
    let entity = query::player(world).expect("player present");
    world::apply(world, Command::RequestMove { entity, direction }, &mut events);
    events
}

fn outcome(events: &[Event]) -> MoveOutcome {
    events
        .iter()
        .find_map(|event| match event {
            Event::MoveResolved { outcome, .. } => Some(*outcome),
            _ => None,
        })
        .expect("every request is resolved")
}

fn cell_of(world: &World, entity: u32) -> CellCoord {
    query::entity(world, EntityId::new(entity))
        .expect("entity exists")
        .cell
}

fn generic() -> EntityKind {
    EntityKind::Box(BoxType::GENERIC)
}

#[test]
fn push_moves_box_one_cell_further() {
    let mut world = level(
        4,
        vec![F, F, F, F],
        vec![(EntityKind::Player, 0, 0), (generic(), 1, 0)],
    );

    let events = step(&mut world, Direction::East);

    assert_eq!(outcome(&events), MoveOutcome::Pushed);
    assert_eq!(cell_of(&world, 0), CellCoord::new(1, 0));
    assert_eq!(cell_of(&world, 1), CellCoord::new(2, 0));
    assert_eq!(query::occupant(&world, CellCoord::new(0, 0)), None);
}

#[test]
fn push_into_wall_changes_nothing() {
    let mut world = level(
        3,
        vec![W, F, F],
        vec![(EntityKind::Player, 2, 0), (generic(), 1, 0)],
    );

    let events = step(&mut world, Direction::West);

    assert_eq!(
        outcome(&events),
        MoveOutcome::Blocked(BlockReason::Obstructed)
    );
    assert_eq!(events.len(), 1);
    assert_eq!(cell_of(&world, 0), CellCoord::new(2, 0));
    assert_eq!(cell_of(&world, 1), CellCoord::new(1, 0));
}

#[test]
fn walking_moves_only_the_player() {
    let mut world = level(3, vec![F, F, F], vec![(EntityKind::Player, 0, 0)]);

    let events = step(&mut world, Direction::East);

    assert_eq!(outcome(&events), MoveOutcome::Walked);
    assert_eq!(cell_of(&world, 0), CellCoord::new(1, 0));
    assert!(events
        .iter()
        .all(|event| !matches!(event, Event::BoxSettled { .. })));
}

#[test]
fn victory_fires_once_for_two_boxes() {
    let mut world = level(
        4,
        vec![D, F, F, F, D, F, F, F],
        vec![
            (generic(), 1, 0),
            (generic(), 1, 1),
            (EntityKind::Player, 2, 0),
        ],
    );

    let script = [
        (Direction::West, MoveOutcome::Pushed),
        (Direction::East, MoveOutcome::Walked),
        (Direction::South, MoveOutcome::Walked),
        (Direction::West, MoveOutcome::Pushed),
    ];
    let mut victories = Vec::new();
    for (index, (direction, expected)) in script.into_iter().enumerate() {
        let events = step(&mut world, direction);
        assert_eq!(outcome(&events), expected, "step {index}");
        if events.contains(&Event::Victory) {
            victories.push(index);
        }
    }

    assert_eq!(victories, vec![3]);
    assert!(query::is_victory(&world));
    assert_eq!(cell_of(&world, 0), CellCoord::new(0, 0));
    assert_eq!(cell_of(&world, 1), CellCoord::new(0, 1));

    let after = step(&mut world, Direction::East);
    assert!(!after.contains(&Event::Victory));
}

#[test]
fn mismatched_box_type_never_settles() {
    let mut world = level(
        3,
        vec![TerrainId::destination_floor(1), F, F],
        vec![
            (EntityKind::Box(BoxType::new(2)), 1, 0),
            (EntityKind::Player, 2, 0),
        ],
    );

    let events = step(&mut world, Direction::West);

    assert_eq!(outcome(&events), MoveOutcome::Pushed);
    assert!(events.contains(&Event::BoxSettled {
        entity: EntityId::new(0),
        at_destination: false,
    }));
    assert!(!events.contains(&Event::Victory));
    assert!(!query::is_victory(&world));
}

#[test]
fn leaving_and_reentering_destination_rearms_victory() {
    let mut terrain = vec![F; 16];
    terrain[5] = D;
    let mut world = level(
        4,
        terrain,
        vec![(generic(), 2, 1), (EntityKind::Player, 3, 1)],
    );

    let script = [
        Direction::West,
        Direction::North,
        Direction::West,
        Direction::South,
        Direction::East,
        Direction::South,
        Direction::South,
        Direction::West,
        Direction::North,
    ];
    let mut victories = Vec::new();
    for (index, direction) in script.into_iter().enumerate() {
        let events = step(&mut world, direction);
        assert!(!outcome(&events).is_blocked(), "step {index} blocked");
        if index == 3 {
            assert!(events.contains(&Event::BoxSettled {
                entity: EntityId::new(0),
                at_destination: false,
            }));
        }
        if events.contains(&Event::Victory) {
            victories.push(index);
        }
    }

    assert_eq!(victories, vec![0, 8]);
    assert_eq!(cell_of(&world, 0), CellCoord::new(1, 1));
}

#[test]
fn solved_level_is_not_announced_on_load() {
    let mut world = level(
        3,
        vec![D, F, F],
        vec![(generic(), 0, 0), (EntityKind::Player, 1, 0)],
    );
    assert!(query::is_victory(&world));

    let walk = step(&mut world, Direction::East);
    assert_eq!(outcome(&walk), MoveOutcome::Walked);
    assert!(!walk.contains(&Event::Victory));
}

#[test]
fn level_without_boxes_never_wins() {
    let mut world = level(3, vec![D, F, D], vec![(EntityKind::Player, 1, 0)]);

    let events = step(&mut world, Direction::West);

    assert_eq!(outcome(&events), MoveOutcome::Walked);
    assert!(!events.contains(&Event::Victory));
    assert!(!query::is_victory(&world));
}
