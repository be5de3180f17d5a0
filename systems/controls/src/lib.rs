#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Translates raw frame input into move commands for the player.
//!
//! Keyboard input wins over the pointer within a frame. A pointer press that
//! is released without dragging selects a direction from where it landed
//! relative to the player; a drag pans the view instead.

use boxoban_core::{Command, Direction, EntityId};

/// Accumulated drag, in screen units, that turns a click into a pan.
pub const PAN_THRESHOLD: f32 = 4.0;

/// Keys the level screen reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Moves the player north.
    Up,
    /// Moves the player east.
    Right,
    /// Moves the player south.
    Down,
    /// Moves the player west.
    Left,
    /// Requests the pause screen.
    Escape,
}

/// Position on screen, with `y` growing upward.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScreenPoint {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate, growing upward.
    pub y: f32,
}

impl ScreenPoint {
    /// Creates a new screen point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn offset_from(self, origin: Self) -> Self {
        Self::new(self.x - origin.x, self.y - origin.y)
    }
}

/// Raw input sampled for a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Key pressed during the frame, if any.
    pub key: Option<Key>,
    /// Pointer button went down during the frame.
    pub pointer_pressed: bool,
    /// Pointer button went up during the frame.
    pub pointer_released: bool,
    /// Pointer button is currently held.
    pub pointer_held: bool,
    /// Pointer position for the frame.
    pub pointer: Option<ScreenPoint>,
    /// Screen position of the centre of the player's cell.
    pub player_centre: Option<ScreenPoint>,
}

/// Side effects of a frame that are not world commands.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameResponse {
    /// Pointer drag to apply to the view this frame.
    pub pan: ScreenPoint,
    /// The player asked to pause the level.
    pub pause_requested: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum PointerState {
    #[default]
    Idle,
    Held {
        last: ScreenPoint,
        dragged: ScreenPoint,
    },
    SkipUntilUp,
}

/// Pure system turning frame input into [`Command::RequestMove`] values.
#[derive(Debug, Default)]
pub struct Controls {
    pointer: PointerState,
}

impl Controls {
    /// Creates a controls system with no pointer interaction in progress.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignores the pointer until its button is next seen released.
    ///
    /// Used when returning from an overlay whose click must not leak into
    /// the level.
    pub fn skip_pointer_until_up(&mut self) {
        self.pointer = PointerState::SkipUntilUp;
    }

    /// Consumes one frame of input, emitting at most one move command.
    pub fn handle(
        &mut self,
        input: &FrameInput,
        player: Option<EntityId>,
        out: &mut Vec<Command>,
    ) -> FrameResponse {
        let mut response = FrameResponse::default();

        if let Some(key) = input.key {
            match key_direction(key) {
                Some(direction) => push_move(player, direction, out),
                None => response.pause_requested = true,
            }
            if self.pointer != PointerState::SkipUntilUp {
                self.pointer = PointerState::Idle;
            }
            return response;
        }

        if self.pointer == PointerState::SkipUntilUp {
            if !input.pointer_held {
                self.pointer = PointerState::Idle;
            }
            return response;
        }

        if input.pointer_pressed {
            if let Some(position) = input.pointer {
                self.pointer = PointerState::Held {
                    last: position,
                    dragged: ScreenPoint::default(),
                };
            }
        }

        if input.pointer_released {
            if let PointerState::Held { last, dragged } = self.pointer {
                if !is_pan(dragged) {
                    let release = input.pointer.unwrap_or(last);
                    if let Some(centre) = input.player_centre {
                        push_move(player, pointer_direction(release.offset_from(centre)), out);
                    }
                }
            }
            self.pointer = PointerState::Idle;
            return response;
        }

        if let (PointerState::Held { last, dragged }, Some(position)) =
            (self.pointer, input.pointer)
        {
            let delta = position.offset_from(last);
            self.pointer = PointerState::Held {
                last: position,
                dragged: ScreenPoint::new(dragged.x + delta.x, dragged.y + delta.y),
            };
            response.pan = delta;
        }

        response
    }
}

/// Maps an offset from the player's centre onto the dominant axis.
///
/// Ties resolve horizontally.
#[must_use]
pub fn pointer_direction(offset: ScreenPoint) -> Direction {
    if offset.x.abs() < offset.y.abs() {
        if offset.y < 0.0 {
            Direction::South
        } else {
            Direction::North
        }
    } else if offset.x < 0.0 {
        Direction::West
    } else {
        Direction::East
    }
}

fn is_pan(dragged: ScreenPoint) -> bool {
    dragged.x.abs() >= PAN_THRESHOLD || dragged.y.abs() >= PAN_THRESHOLD
}

fn key_direction(key: Key) -> Option<Direction> {
    match key {
        Key::Up => Some(Direction::North),
        Key::Right => Some(Direction::East),
        Key::Down => Some(Direction::South),
        Key::Left => Some(Direction::West),
        Key::Escape => None,
    }
}

fn push_move(player: Option<EntityId>, direction: Direction, out: &mut Vec<Command>) {
    if let Some(entity) = player {
        out.push(Command::RequestMove { entity, direction });
    }
}
