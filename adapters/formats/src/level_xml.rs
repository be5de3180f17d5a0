//! Level XML document read by the game at runtime.

use std::fmt::Write as _;

use boxoban_core::{EntityDescriptor, LevelDescriptor, TerrainId, WorldDescriptor};
use quick_xml::{events::Event, DeError, Reader};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::serialize_document;

/// How terrain tokens that are not decimal ids are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// Replaces the token with the empty terrain id and keeps going.
    #[default]
    Lenient,
    /// Rejects the document.
    Strict,
}

/// Level decoded from a document, with the number of repaired terrain tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedLevel {
    /// Decoded level.
    pub level: LevelDescriptor,
    /// Terrain tokens replaced with the empty id during a lenient parse.
    pub recovered_tokens: usize,
}

/// Errors raised while reading or writing level documents.
#[derive(Debug, Error)]
pub enum LevelFormatError {
    /// The document is not well-formed or misses required parts.
    #[error("malformed level document: {0}")]
    Xml(#[from] DeError),
    /// A terrain token is not a decimal id and the parse was strict.
    #[error("terrain token {index} (`{token}`) is not a terrain id")]
    InvalidTerrainToken {
        /// Position of the token in the terrain sequence.
        index: usize,
        /// The offending text.
        token: String,
    },
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LevelDocument {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tileset: String,
    world: WorldElement,
    #[serde(default)]
    entities: EntityList,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct WorldElement {
    #[serde(rename = "@width")]
    width: u32,
    #[serde(rename = "@height")]
    height: u32,
    #[serde(rename = "$text", default)]
    terrain: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct EntityList {
    #[serde(rename = "entity", default)]
    entries: Vec<EntityElement>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EntityElement {
    #[serde(rename = "@type")]
    tag: String,
    #[serde(rename = "@x")]
    x: i32,
    #[serde(rename = "@y")]
    y: i32,
}

/// Text of the metadata elements under `<level>`, read without trimming.
///
/// The structured decoder strips edge whitespace from element text, so the
/// metadata strings are collected again from the raw event stream.
#[derive(Debug, Default)]
struct VerbatimText {
    name: Option<String>,
    description: Option<String>,
    tileset: Option<String>,
}

impl VerbatimText {
    fn read(text: &str) -> Result<Self, DeError> {
        let mut reader = Reader::from_str(text);
        let _ = reader.config_mut().trim_text(false);

        let mut verbatim = Self::default();
        let mut depth = 0_usize;
        let mut element: Option<Vec<u8>> = None;
        let mut value = String::new();
        loop {
            match reader.read_event().map_err(DeError::from)? {
                Event::Start(start) => {
                    depth += 1;
                    if depth == 2 && verbatim.slot(start.name().as_ref()).is_some() {
                        element = Some(start.name().as_ref().to_vec());
                        value.clear();
                    }
                }
                Event::Text(content) if depth == 2 && element.is_some() => {
                    value.push_str(&content.unescape().map_err(DeError::from)?);
                }
                Event::CData(data) if depth == 2 && element.is_some() => {
                    value.push_str(&String::from_utf8_lossy(&data));
                }
                Event::End(_) => {
                    if depth == 2 {
                        if let Some(name) = element.take() {
                            if let Some(slot) = verbatim.slot(&name) {
                                *slot = Some(std::mem::take(&mut value));
                            }
                        }
                    }
                    depth = depth.saturating_sub(1);
                }
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(verbatim)
    }

    fn slot(&mut self, element: &[u8]) -> Option<&mut Option<String>> {
        match element {
            b"name" => Some(&mut self.name),
            b"description" => Some(&mut self.description),
            b"tileset" => Some(&mut self.tileset),
            _ => None,
        }
    }
}

/// Decodes a level document.
///
/// The terrain token count is not checked against the declared dimensions;
/// the world rejects inconsistent levels when they are loaded.
pub fn parse_level(text: &str, mode: ParseMode) -> Result<ParsedLevel, LevelFormatError> {
    let document: LevelDocument = quick_xml::de::from_str(text)?;
    let verbatim = VerbatimText::read(text)?;

    let mut recovered_tokens = 0;
    let mut terrain = Vec::new();
    for (index, token) in document.world.terrain.split_whitespace().enumerate() {
        match token.parse::<u32>() {
            Ok(id) => terrain.push(TerrainId::new(id)),
            Err(_) if mode == ParseMode::Lenient => {
                warn!(index, token, "unreadable terrain token replaced with empty terrain");
                recovered_tokens += 1;
                terrain.push(TerrainId::EMPTY);
            }
            Err(_) => {
                return Err(LevelFormatError::InvalidTerrainToken {
                    index,
                    token: token.to_owned(),
                })
            }
        }
    }

    let entities = document
        .entities
        .entries
        .into_iter()
        .map(|entry| EntityDescriptor {
            tag: entry.tag,
            x: entry.x,
            y: entry.y,
        })
        .collect();

    Ok(ParsedLevel {
        level: LevelDescriptor {
            name: verbatim.name.unwrap_or(document.name),
            description: verbatim.description.unwrap_or(document.description),
            tileset: verbatim.tileset.unwrap_or(document.tileset),
            world: WorldDescriptor {
                width: document.world.width,
                height: document.world.height,
                terrain,
            },
            entities,
        },
        recovered_tokens,
    })
}

/// Encodes a level as a tab-indented UTF-8 document.
pub fn write_level(level: &LevelDescriptor) -> Result<String, LevelFormatError> {
    let document = LevelDocument {
        name: level.name.clone(),
        description: level.description.clone(),
        tileset: level.tileset.clone(),
        world: WorldElement {
            width: level.world.width,
            height: level.world.height,
            terrain: format_terrain(&level.world),
        },
        entities: EntityList {
            entries: level
                .entities
                .iter()
                .map(|entity| EntityElement {
                    tag: entity.tag.clone(),
                    x: entity.x,
                    y: entity.y,
                })
                .collect(),
        },
    };
    Ok(serialize_document(&document, "level")?)
}

/// Lays out terrain ids as zero-padded rows of `width` tokens.
///
/// The block starts with a newline so the first row lines up with the rest.
#[must_use]
pub fn format_terrain(world: &WorldDescriptor) -> String {
    let mut text = String::from("\n");
    let width = usize::try_from(world.width).unwrap_or(usize::MAX).max(1);
    for row in world.terrain.chunks(width) {
        for (column, id) in row.iter().enumerate() {
            if column > 0 {
                text.push(' ');
            }
            let _ = write!(text, "{:04}", id.get());
        }
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxoban_core::{BoxType, EntityKind};

    const DOCUMENT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<level>
	<name>First steps</name>
	<description>Push it.</description>
	<tileset>TilesetWorld2</tileset>
	<world width="3" height="2">
0001 0256 0640
0001 0001 0001
</world>
	<entities>
		<entity type="player" x="1" y="0"/>
		<entity type="box3" x="2" y="0"/>
		<entity type="ghost" x="0" y="0"/>
	</entities>
</level>
"#;

    #[test]
    fn parses_every_field() {
        let parsed = parse_level(DOCUMENT, ParseMode::Strict).expect("document parses");
        let level = parsed.level;
        assert_eq!(parsed.recovered_tokens, 0);
        assert_eq!(level.name, "First steps");
        assert_eq!(level.description, "Push it.");
        assert_eq!(level.tileset, "TilesetWorld2");
        assert_eq!((level.world.width, level.world.height), (3, 2));
        assert_eq!(
            level.world.terrain_at(2, 0),
            Some(TerrainId::FIRST_DESTINATION_FLOOR)
        );
        assert_eq!(level.entities.len(), 3);
        assert_eq!(level.entities[1].kind(), Some(EntityKind::Box(BoxType::new(3))));
        assert_eq!(level.entities[2].kind(), None);
    }

    #[test]
    fn lenient_parse_replaces_bad_tokens() {
        let damaged = DOCUMENT.replace("0256", "x256");
        let parsed = parse_level(&damaged, ParseMode::Lenient).expect("lenient parse");
        assert_eq!(parsed.recovered_tokens, 1);
        assert_eq!(parsed.level.world.terrain[1], TerrainId::EMPTY);
        assert!(parsed.level.world.is_consistent());
    }

    #[test]
    fn strict_parse_reports_bad_tokens() {
        let damaged = DOCUMENT.replace("0640", "-640");
        match parse_level(&damaged, ParseMode::Strict) {
            Err(LevelFormatError::InvalidTerrainToken { index, token }) => {
                assert_eq!(index, 2);
                assert_eq!(token, "-640");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_world_is_an_error() {
        let result = parse_level("<level><name>x</name></level>", ParseMode::Lenient);
        assert!(matches!(result, Err(LevelFormatError::Xml(_))));
    }

    #[test]
    fn terrain_rows_are_zero_padded() {
        let world = WorldDescriptor {
            width: 2,
            height: 2,
            terrain: vec![
                TerrainId::FIRST_WALL,
                TerrainId::FIRST_FLOOR,
                TerrainId::EMPTY,
                TerrainId::LAST_DESTINATION_FLOOR,
            ],
        };
        assert_eq!(format_terrain(&world), "\n0001 0256\n0000 0767\n");
    }

    #[test]
    fn written_documents_parse_back() {
        let level = parse_level(DOCUMENT, ParseMode::Strict)
            .expect("document parses")
            .level;
        let written = write_level(&level).expect("level writes");
        assert!(written.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<level>"));
        assert!(written.contains("\n\t<name>First steps</name>"));

        let reparsed = parse_level(&written, ParseMode::Strict).expect("written level parses");
        assert_eq!(reparsed.level, level);
    }

    #[test]
    fn empty_entity_list_round_trips() {
        let level = LevelDescriptor {
            name: "Bare".to_owned(),
            description: "Nothing to push".to_owned(),
            tileset: "TilesetWorld1".to_owned(),
            world: WorldDescriptor {
                width: 1,
                height: 1,
                terrain: vec![TerrainId::FIRST_FLOOR],
            },
            entities: Vec::new(),
        };
        let written = write_level(&level).expect("level writes");
        let reparsed = parse_level(&written, ParseMode::Strict).expect("written level parses");
        assert_eq!(reparsed.level, level);
    }

    #[test]
    fn metadata_keeps_edge_whitespace() {
        let mut level = parse_level(DOCUMENT, ParseMode::Strict)
            .expect("document parses")
            .level;
        level.name = "  Padded  ".to_owned();
        level.description = "Line one\nLine two ".to_owned();
        level.tileset = "\tTilesetWorld3".to_owned();

        let written = write_level(&level).expect("level writes");
        let reparsed = parse_level(&written, ParseMode::Strict).expect("written level parses");
        assert_eq!(reparsed.level.name, "  Padded  ");
        assert_eq!(reparsed.level.description, "Line one\nLine two ");
        assert_eq!(reparsed.level.tileset, "\tTilesetWorld3");
        assert_eq!(reparsed.level, level);
    }

    #[test]
    fn escaped_metadata_is_unescaped() {
        let document = DOCUMENT.replace(
            "<name>First steps</name>",
            "<name> Boxes &amp; <![CDATA[<goals>]]> </name>",
        );
        let level = parse_level(&document, ParseMode::Strict)
            .expect("document parses")
            .level;
        assert_eq!(level.name, " Boxes & <goals> ");
    }
}
