//! Classic ASCII Sokoban maps.

use std::{fmt, str::FromStr};

use boxoban_core::{
    BoxType, EntityDescriptor, EntityKind, LevelDescriptor, TerrainId, WorldDescriptor,
};
use thiserror::Error;
use tracing::debug;

use crate::LevelDefaults;

/// Cell of a text map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Glyph {
    /// `#`
    Wall,
    /// `.`
    Goal,
    /// ` `, also read from `-` and `_`.
    Floor,
    /// `+`
    PlayerOnGoal,
    /// `*`
    BoxOnGoal,
    /// `@`
    Player,
    /// `$`
    Box,
    /// `?`, cells outside the level.
    Void,
}

impl Glyph {
    /// Reads a glyph from its map character.
    #[must_use]
    pub const fn from_char(character: char) -> Option<Self> {
        Some(match character {
            '#' => Self::Wall,
            '.' => Self::Goal,
            ' ' | '-' | '_' => Self::Floor,
            '+' => Self::PlayerOnGoal,
            '*' => Self::BoxOnGoal,
            '@' => Self::Player,
            '$' => Self::Box,
            '?' => Self::Void,
            _ => return None,
        })
    }

    /// Canonical character of the glyph.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Wall => '#',
            Self::Goal => '.',
            Self::Floor => ' ',
            Self::PlayerOnGoal => '+',
            Self::BoxOnGoal => '*',
            Self::Player => '@',
            Self::Box => '$',
            Self::Void => '?',
        }
    }

    /// Terrain id emitted for the glyph.
    #[must_use]
    pub const fn terrain(self) -> TerrainId {
        match self {
            Self::Wall => TerrainId::FIRST_WALL,
            Self::Goal | Self::PlayerOnGoal | Self::BoxOnGoal => {
                TerrainId::FIRST_DESTINATION_FLOOR
            }
            Self::Floor | Self::Player | Self::Box => TerrainId::FIRST_FLOOR,
            Self::Void => TerrainId::EMPTY,
        }
    }

    /// Entity standing on the glyph, if any.
    #[must_use]
    pub const fn entity(self) -> Option<EntityKind> {
        match self {
            Self::Player | Self::PlayerOnGoal => Some(EntityKind::Player),
            Self::Box | Self::BoxOnGoal => Some(EntityKind::Box(BoxType::GENERIC)),
            _ => None,
        }
    }

    const fn is_boundary(self) -> bool {
        matches!(self, Self::Wall | Self::Void)
    }
}

/// Errors raised while reading a text map.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TextMapError {
    /// The input holds no map at all.
    #[error("text map is empty")]
    EmptyInput,
    /// A line of the input cannot be part of a map.
    #[error("line {line}: {detail}")]
    MalformedMap {
        /// One-based line number.
        line: usize,
        /// What is wrong with the line.
        detail: String,
    },
}

/// Rectangular grid of glyphs read from a text map.
///
/// Rows shorter than the longest one are padded with [`Glyph::Void`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextMap {
    width: usize,
    height: usize,
    glyphs: Vec<Glyph>,
}

impl TextMap {
    /// Reads a map with one line per row.
    ///
    /// A single trailing empty line is ignored; any other empty line is an
    /// error.
    pub fn parse(text: &str) -> Result<Self, TextMapError> {
        if text.is_empty() {
            return Err(TextMapError::EmptyInput);
        }

        let mut lines: Vec<&str> = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();
        if lines.len() > 1 && lines.last().is_some_and(|line| line.is_empty()) {
            let _ = lines.pop();
        }

        let mut rows = Vec::with_capacity(lines.len());
        for (index, line) in lines.iter().enumerate() {
            if line.is_empty() {
                return Err(TextMapError::MalformedMap {
                    line: index + 1,
                    detail: "empty line".to_owned(),
                });
            }
            let row = line
                .chars()
                .enumerate()
                .map(|(column, character)| {
                    Glyph::from_char(character).ok_or_else(|| TextMapError::MalformedMap {
                        line: index + 1,
                        detail: format!("unknown glyph `{character}` at column {}", column + 1),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row);
        }

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let height = rows.len();
        let mut glyphs = Vec::with_capacity(width * height);
        for mut row in rows {
            row.resize(width, Glyph::Void);
            glyphs.extend(row);
        }
        Ok(Self {
            width,
            height,
            glyphs,
        })
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Glyph at the provided column and row.
    #[must_use]
    pub fn glyph(&self, column: usize, row: usize) -> Option<Glyph> {
        if column >= self.width || row >= self.height {
            return None;
        }
        self.glyphs.get(row * self.width + column).copied()
    }

    /// Turns floor outside the playable area into void.
    ///
    /// A zone of connected plain floor is voided unless it touches a goal, a
    /// player or a box. Walls, void and the map edge bound zones. Returns the
    /// number of cells voided; running it again voids nothing.
    pub fn clear_exterior(&mut self) -> usize {
        let mut visited: Vec<bool> = self.glyphs.iter().map(|g| g.is_boundary()).collect();
        let mut zone = Vec::new();
        let mut worklist = Vec::new();
        let mut voided = 0;

        for start in 0..self.glyphs.len() {
            if visited[start] {
                continue;
            }
            visited[start] = true;
            if self.glyphs[start] != Glyph::Floor {
                continue;
            }

            zone.clear();
            worklist.push(start);
            let mut holds_content = false;
            while let Some(index) = worklist.pop() {
                zone.push(index);
                for neighbor in self.neighbors(index) {
                    match self.glyphs[neighbor] {
                        Glyph::Floor if !visited[neighbor] => {
                            visited[neighbor] = true;
                            worklist.push(neighbor);
                        }
                        Glyph::Floor | Glyph::Wall | Glyph::Void => {}
                        _ => holds_content = true,
                    }
                }
            }

            if !holds_content {
                for &index in &zone {
                    self.glyphs[index] = Glyph::Void;
                }
                voided += zone.len();
            }
        }

        debug!(voided, "cleared exterior floor");
        voided
    }

    /// Converts the map into a level, placing entities in row-major order.
    #[must_use]
    pub fn to_descriptor(&self, defaults: &LevelDefaults) -> LevelDescriptor {
        let mut entities = Vec::new();
        for row in 0..self.height {
            for column in 0..self.width {
                let kind = self.glyph(column, row).and_then(Glyph::entity);
                if let (Some(kind), Ok(x), Ok(y)) =
                    (kind, i32::try_from(column), i32::try_from(row))
                {
                    entities.push(EntityDescriptor::new(kind, x, y));
                }
            }
        }

        LevelDescriptor {
            name: defaults.name.clone(),
            description: defaults.description.clone(),
            tileset: defaults.tileset.clone(),
            world: WorldDescriptor {
                width: u32::try_from(self.width).unwrap_or(u32::MAX),
                height: u32::try_from(self.height).unwrap_or(u32::MAX),
                terrain: self.glyphs.iter().map(|glyph| glyph.terrain()).collect(),
            },
            entities,
        }
    }

    fn neighbors(&self, index: usize) -> impl Iterator<Item = usize> {
        let column = index % self.width;
        let row = index / self.width;
        let width = self.width;
        [
            (row > 0).then(|| index - width),
            (column + 1 < width).then_some(index + 1),
            (row + 1 < self.height).then_some(index + width),
            (column > 0).then(|| index - 1),
        ]
        .into_iter()
        .flatten()
    }
}

impl FromStr for TextMap {
    type Err = TextMapError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl fmt::Display for TextMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.glyphs.chunks(self.width.max(1)) {
            let line: String = row.iter().map(|glyph| glyph.as_char()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Reads a text map, clears its exterior and converts it into a level.
pub fn import_text_map(
    text: &str,
    defaults: &LevelDefaults,
) -> Result<LevelDescriptor, TextMapError> {
    let mut map = TextMap::parse(text)?;
    debug!(map = %map, "raw text map");
    let _ = map.clear_exterior();
    debug!(map = %map, "final text map");
    Ok(map.to_descriptor(defaults))
}
