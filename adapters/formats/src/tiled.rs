//! Tiled TMX maps used to edit levels.
//!
//! A level maps onto two tile layers. The terrain layer stores every terrain
//! id shifted by one, because Tiled reserves gid 0 for cells without a tile;
//! both gid 0 and gid 1 read back as empty terrain. The entities layer draws
//! boxes with their box sprite ids and the player with the first tile of the
//! character tileset.

use boxoban_core::{
    BoxType, EntityDescriptor, EntityKind, LevelDescriptor, TerrainId, WorldDescriptor,
    MAX_BOX_TYPES, PLAYER_TILE_ID,
};
use quick_xml::DeError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{serialize_document, LevelDefaults};

const TERRAIN_LAYER: &str = "Terrain";
const ENTITIES_LAYER: &str = "Entities";
const FLIP_FLAGS: u32 = 0xE000_0000;
// Smallest gid that only an entity tile can carry.
const FIRST_ENTITY_GID: u32 = TerrainId::FIRST_BOX.get() + 1;

/// Errors raised while converting between TMX maps and levels.
#[derive(Debug, Error)]
pub enum TiledError {
    /// The document is not a well-formed TMX map.
    #[error("malformed tmx document: {0}")]
    Xml(#[from] DeError),
    /// No layer is free of entity tiles.
    #[error("no terrain layer found")]
    NoTerrainLayer,
    /// No layer holds entity tiles.
    #[error("no entities layer found")]
    NoEntitiesLayer,
    /// No tileset uses an image of the world tileset width.
    #[error("no world tileset found")]
    NoTilesetFound,
    /// A layer does not hold one tile per map cell.
    #[error("layer `{layer}` holds {actual} tiles, expected {expected}")]
    LayerSizeMismatch {
        /// Name of the layer.
        layer: String,
        /// Cells in the map.
        expected: usize,
        /// Tiles found in the layer.
        actual: usize,
    },
    /// A box sub-type has no sprite in the box tile range.
    #[error("box type {0} has no tile")]
    BoxTypeOutOfRange(u16),
    /// The character tileset starts inside the world tile range.
    #[error("character tileset gid {0} overlaps the world tileset")]
    CharsetOverlapsWorld(u32),
    /// Layer data uses an encoding or compression that is not supported.
    #[error("layer `{layer}` uses unsupported encoding `{encoding}`")]
    UnsupportedEncoding {
        /// Name of the layer.
        layer: String,
        /// Encoding, and compression when present.
        encoding: String,
    },
    /// A CSV layer token is not a gid.
    #[error("layer `{layer}` holds invalid gid `{token}`")]
    InvalidGid {
        /// Name of the layer.
        layer: String,
        /// The offending text.
        token: String,
    },
}

/// Tile sizes and tileset layout shared by the importer and the exporter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TiledSettings {
    /// Tile width in pixels.
    pub tile_width: u32,
    /// Tile height in pixels.
    pub tile_height: u32,
    /// Width of the world tileset image, used to recognise it on import.
    pub world_image_width: u32,
    /// Height of the world tileset image.
    pub world_image_height: u32,
    /// Name of the character tileset.
    pub charset_name: String,
    /// First gid of the character tileset.
    pub charset_first_gid: u32,
    /// Width of the character tileset image.
    pub charset_image_width: u32,
    /// Height of the character tileset image.
    pub charset_image_height: u32,
}

impl Default for TiledSettings {
    fn default() -> Self {
        Self {
            tile_width: 16,
            tile_height: 16,
            world_image_width: 512,
            world_image_height: 512,
            charset_name: "Charset".to_owned(),
            charset_first_gid: PLAYER_TILE_ID,
            charset_image_width: 256,
            charset_image_height: 256,
        }
    }
}

/// Root `<map>` element of a TMX document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TiledMap {
    /// TMX format version.
    #[serde(rename = "@version", default)]
    pub version: String,
    /// Map orientation, always orthogonal for levels.
    #[serde(rename = "@orientation", default)]
    pub orientation: String,
    /// Order in which Tiled draws tiles.
    #[serde(rename = "@renderorder", default)]
    pub render_order: String,
    /// Columns in the map.
    #[serde(rename = "@width")]
    pub width: u32,
    /// Rows in the map.
    #[serde(rename = "@height")]
    pub height: u32,
    /// Tile width in pixels.
    #[serde(rename = "@tilewidth", default)]
    pub tile_width: u32,
    /// Tile height in pixels.
    #[serde(rename = "@tileheight", default)]
    pub tile_height: u32,
    /// Custom map properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    /// Tilesets referenced by the map.
    #[serde(rename = "tileset", default)]
    pub tilesets: Vec<Tileset>,
    /// Tile layers; object groups are ignored.
    #[serde(rename = "layer", default)]
    pub layers: Vec<Layer>,
}

/// `<properties>` bag.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
    /// Entries in document order.
    #[serde(rename = "property", default)]
    pub entries: Vec<Property>,
}

/// Named string property.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Property name.
    #[serde(rename = "@name")]
    pub name: String,
    /// Property value.
    #[serde(rename = "@value", default)]
    pub value: String,
}

/// Embedded tileset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tileset {
    /// Gid of the first tile.
    #[serde(rename = "@firstgid")]
    pub first_gid: u32,
    /// Tileset name.
    #[serde(rename = "@name", default)]
    pub name: String,
    /// Tile width in pixels.
    #[serde(rename = "@tilewidth", default)]
    pub tile_width: u32,
    /// Tile height in pixels.
    #[serde(rename = "@tileheight", default)]
    pub tile_height: u32,
    /// Source image, absent for external tilesets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<TilesetImage>,
}

/// Image backing a tileset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilesetImage {
    /// Image path relative to the map.
    #[serde(rename = "@source")]
    pub source: String,
    /// Image width in pixels.
    #[serde(rename = "@width", default)]
    pub width: u32,
    /// Image height in pixels.
    #[serde(rename = "@height", default)]
    pub height: u32,
}

/// Tile layer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    /// Layer name.
    #[serde(rename = "@name", default)]
    pub name: String,
    /// Columns in the layer.
    #[serde(rename = "@width", default)]
    pub width: u32,
    /// Rows in the layer.
    #[serde(rename = "@height", default)]
    pub height: u32,
    /// Tile gids.
    #[serde(default)]
    pub data: LayerData,
}

/// Tile gids of a layer, as tile elements or as CSV text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerData {
    /// Encoding of the text content, `csv` or absent for tile elements.
    #[serde(rename = "@encoding", default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    /// Compression of the text content.
    #[serde(rename = "@compression", default, skip_serializing_if = "Option::is_none")]
    pub compression: Option<String>,
    /// Tile elements, row-major.
    #[serde(rename = "tile", default)]
    pub tiles: Vec<LayerTile>,
    /// Encoded text content.
    #[serde(rename = "$text", default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Single `<tile>` element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerTile {
    /// Global tile id, 0 for an empty cell.
    #[serde(rename = "@gid", default)]
    pub gid: u32,
}

impl Layer {
    fn gids(&self) -> Result<Vec<u32>, TiledError> {
        let data = &self.data;
        let unsupported = |encoding: &str| TiledError::UnsupportedEncoding {
            layer: self.name.clone(),
            encoding: encoding.to_owned(),
        };
        if let Some(compression) = &data.compression {
            return Err(unsupported(compression));
        }
        let gids = match data.encoding.as_deref() {
            None => data.tiles.iter().map(|tile| tile.gid).collect(),
            Some(encoding) if encoding.eq_ignore_ascii_case("csv") => data
                .text
                .as_deref()
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(|token| {
                    token.parse::<u32>().map_err(|_| TiledError::InvalidGid {
                        layer: self.name.clone(),
                        token: token.to_owned(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(encoding) => return Err(unsupported(encoding)),
        };
        Ok(gids.into_iter().map(|gid| gid & !FLIP_FLAGS).collect())
    }
}

impl TiledMap {
    fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .as_ref()?
            .entries
            .iter()
            .find(|property| property.name.eq_ignore_ascii_case(name))
            .map(|property| property.value.as_str())
            .filter(|value| !value.is_empty())
    }

    fn cells(&self) -> usize {
        usize::try_from(u64::from(self.width) * u64::from(self.height)).unwrap_or(usize::MAX)
    }
}

impl TiledSettings {
    fn check_charset(&self) -> Result<(), TiledError> {
        if self.charset_first_gid < PLAYER_TILE_ID {
            return Err(TiledError::CharsetOverlapsWorld(self.charset_first_gid));
        }
        Ok(())
    }
}

/// Reads a TMX document.
pub fn read_tmx(text: &str) -> Result<TiledMap, TiledError> {
    Ok(quick_xml::de::from_str(text)?)
}

/// Writes a TMX document.
pub fn write_tmx(map: &TiledMap) -> Result<String, TiledError> {
    Ok(serialize_document(map, "map")?)
}

/// Converts a TMX map into a level.
///
/// The terrain layer is the first layer without entity tiles and the
/// entities layer the first one with them. Layers that cannot be decoded or
/// do not cover the map are skipped; their error is reported only when no
/// usable terrain or entities layer remains. Missing name and description
/// properties fall back to `defaults`.
pub fn import_tmx(
    map: &TiledMap,
    defaults: &LevelDefaults,
    settings: &TiledSettings,
) -> Result<LevelDescriptor, TiledError> {
    settings.check_charset()?;
    let tileset = map
        .tilesets
        .iter()
        .find(|tileset| {
            tileset
                .image
                .as_ref()
                .is_some_and(|image| image.width == settings.world_image_width)
        })
        .ok_or(TiledError::NoTilesetFound)?;

    let expected = map.cells();
    let mut decoded = Vec::with_capacity(map.layers.len());
    let mut skipped = None;
    for layer in &map.layers {
        let checked = layer.gids().and_then(|gids| {
            if gids.len() == expected {
                Ok(gids)
            } else {
                Err(TiledError::LayerSizeMismatch {
                    layer: layer.name.clone(),
                    expected,
                    actual: gids.len(),
                })
            }
        });
        match checked {
            Ok(gids) => decoded.push((layer, gids)),
            Err(err) => {
                warn!(layer = %layer.name, %err, "tmx layer skipped");
                let _ = skipped.get_or_insert(err);
            }
        }
    }

    let holds_entities = |gids: &[u32]| gids.iter().any(|&gid| gid >= FIRST_ENTITY_GID);
    let terrain_layer = decoded.iter().find(|(_, gids)| !holds_entities(gids));
    let entities_layer = decoded.iter().find(|(_, gids)| holds_entities(gids));
    let ((terrain_layer, terrain_gids), (entities_layer, entity_gids)) =
        match (terrain_layer, entities_layer) {
            (Some(terrain), Some(entities)) => (terrain, entities),
            (None, _) => return Err(skipped.unwrap_or(TiledError::NoTerrainLayer)),
            (_, None) => return Err(skipped.unwrap_or(TiledError::NoEntitiesLayer)),
        };
    debug!(
        terrain = %terrain_layer.name,
        entities = %entities_layer.name,
        tileset = %tileset.name,
        "located tmx layers"
    );

    let terrain = terrain_gids
        .iter()
        .map(|&gid| TerrainId::new(gid.saturating_sub(1)))
        .collect();

    let width = map.width.max(1);
    let mut entities = Vec::new();
    for (index, &gid) in (0_u32..).zip(entity_gids) {
        let Some(kind) = entity_for_gid(gid, settings) else {
            continue;
        };
        if let (Ok(x), Ok(y)) = (i32::try_from(index % width), i32::try_from(index / width)) {
            entities.push(EntityDescriptor::new(kind, x, y));
        }
    }

    Ok(LevelDescriptor {
        name: map.property("name").unwrap_or(defaults.name.as_str()).to_owned(),
        description: map
            .property("description")
            .unwrap_or(defaults.description.as_str())
            .to_owned(),
        tileset: if tileset.name.is_empty() {
            defaults.tileset.clone()
        } else {
            tileset.name.clone()
        },
        world: WorldDescriptor {
            width: map.width,
            height: map.height,
            terrain,
        },
        entities,
    })
}

/// Converts a level into a TMX map with a terrain and an entities layer.
///
/// Entities with an unknown tag or outside the grid are left out.
pub fn export_tmx(
    level: &LevelDescriptor,
    settings: &TiledSettings,
) -> Result<TiledMap, TiledError> {
    settings.check_charset()?;
    let world = &level.world;
    let expected = world.declared_cells().unwrap_or(usize::MAX);
    if !world.is_consistent() {
        return Err(TiledError::LayerSizeMismatch {
            layer: TERRAIN_LAYER.to_owned(),
            expected,
            actual: world.terrain.len(),
        });
    }

    let terrain = world
        .terrain
        .iter()
        .map(|id| id.get().saturating_add(1))
        .collect::<Vec<_>>();

    let mut entities = vec![0; expected];
    for entity in &level.entities {
        let Some(kind) = entity.kind() else {
            warn!(tag = %entity.tag, "entity with unknown tag left out of tmx export");
            continue;
        };
        let gid = match kind {
            EntityKind::Player => settings.charset_first_gid,
            EntityKind::Box(box_type) => {
                if u32::from(box_type.get()) >= MAX_BOX_TYPES {
                    return Err(TiledError::BoxTypeOutOfRange(box_type.get()));
                }
                TerrainId::box_sprite(u32::from(box_type.get())).get() + 1
            }
        };
        let slot = cell_index(world, entity.x, entity.y);
        match slot.and_then(|index| entities.get_mut(index)) {
            Some(cell) => *cell = gid,
            None => warn!(
                x = entity.x,
                y = entity.y,
                "entity outside the grid left out of tmx export"
            ),
        }
    }

    let properties = Properties {
        entries: vec![
            Property {
                name: "Name".to_owned(),
                value: level.name.clone(),
            },
            Property {
                name: "Description".to_owned(),
                value: level.description.clone(),
            },
        ],
    };

    Ok(TiledMap {
        version: "1.0".to_owned(),
        orientation: "orthogonal".to_owned(),
        render_order: "right-down".to_owned(),
        width: world.width,
        height: world.height,
        tile_width: settings.tile_width,
        tile_height: settings.tile_height,
        properties: Some(properties),
        tilesets: vec![
            Tileset {
                first_gid: 1,
                name: level.tileset.clone(),
                tile_width: settings.tile_width,
                tile_height: settings.tile_height,
                image: Some(TilesetImage {
                    source: format!("{}.png", level.tileset),
                    width: settings.world_image_width,
                    height: settings.world_image_height,
                }),
            },
            Tileset {
                first_gid: settings.charset_first_gid,
                name: settings.charset_name.clone(),
                tile_width: settings.tile_width,
                tile_height: settings.tile_height,
                image: Some(TilesetImage {
                    source: format!("{}.png", settings.charset_name),
                    width: settings.charset_image_width,
                    height: settings.charset_image_height,
                }),
            },
        ],
        layers: vec![
            tile_layer(TERRAIN_LAYER, world, terrain),
            tile_layer(ENTITIES_LAYER, world, entities),
        ],
    })
}

fn entity_for_gid(gid: u32, settings: &TiledSettings) -> Option<EntityKind> {
    if gid >= settings.charset_first_gid {
        return Some(EntityKind::Player);
    }
    let id = gid.checked_sub(1)?;
    let box_of = |first: TerrainId| {
        u16::try_from(id - first.get())
            .ok()
            .map(|sub_type| EntityKind::Box(BoxType::new(sub_type)))
    };
    if (TerrainId::FIRST_BOX.get()..=TerrainId::LAST_BOX.get()).contains(&id) {
        box_of(TerrainId::FIRST_BOX)
    } else if (TerrainId::FIRST_DESTINATION_BOX.get()..=TerrainId::LAST_DESTINATION_BOX.get())
        .contains(&id)
    {
        box_of(TerrainId::FIRST_DESTINATION_BOX)
    } else {
        None
    }
}

fn cell_index(world: &WorldDescriptor, x: i32, y: i32) -> Option<usize> {
    let column = u32::try_from(x).ok()?;
    let row = u32::try_from(y).ok()?;
    if column >= world.width || row >= world.height {
        return None;
    }
    usize::try_from(u64::from(row) * u64::from(world.width) + u64::from(column)).ok()
}

fn tile_layer(name: &str, world: &WorldDescriptor, gids: Vec<u32>) -> Layer {
    Layer {
        name: name.to_owned(),
        width: world.width,
        height: world.height,
        data: LayerData {
            tiles: gids.into_iter().map(|gid| LayerTile { gid }).collect(),
            ..LayerData::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv_map(terrain: &str, entities: &str) -> TiledMap {
        let layer = |name: &str, text: &str| Layer {
            name: name.to_owned(),
            width: 3,
            height: 2,
            data: LayerData {
                encoding: Some("csv".to_owned()),
                text: Some(text.to_owned()),
                ..LayerData::default()
            },
        };
        TiledMap {
            width: 3,
            height: 2,
            tilesets: vec![Tileset {
                first_gid: 1,
                name: "TilesetWorld3".to_owned(),
                image: Some(TilesetImage {
                    source: "TilesetWorld3.png".to_owned(),
                    width: 512,
                    height: 512,
                }),
                ..Tileset::default()
            }],
            layers: vec![layer("Things", entities), layer("Ground", terrain)],
            ..TiledMap::default()
        }
    }

    #[test]
    fn layers_are_found_by_content() {
        let map = csv_map("2,257,642,\n2,2,2", "1025,0,769,\n0,0,900");
        let level = import_tmx(&map, &LevelDefaults::default(), &TiledSettings::default())
            .expect("map imports");

        assert_eq!(level.tileset, "TilesetWorld3");
        assert_eq!(level.name, "{TODO:LEVEL_NAME}");
        assert_eq!(level.world.terrain_at(1, 0), Some(TerrainId::FIRST_FLOOR));
        assert_eq!(
            level.world.terrain_at(2, 0),
            Some(TerrainId::destination_floor(1))
        );
        let placed: Vec<(Option<EntityKind>, i32, i32)> = level
            .entities
            .iter()
            .map(|entity| (entity.kind(), entity.x, entity.y))
            .collect();
        assert_eq!(
            placed,
            [
                (Some(EntityKind::Player), 0, 0),
                (Some(EntityKind::Box(BoxType::GENERIC)), 2, 0),
                (Some(EntityKind::Box(BoxType::new(3))), 2, 1),
            ]
        );
    }

    #[test]
    fn empty_gids_stay_empty_terrain() {
        let map = csv_map("0,257,0,2,2,2", "1025,0,0,0,0,0");
        let level = import_tmx(&map, &LevelDefaults::default(), &TiledSettings::default())
            .expect("map imports");
        assert_eq!(level.world.terrain[0], TerrainId::EMPTY);
        assert_eq!(level.world.terrain[1], TerrainId::FIRST_FLOOR);
    }

    #[test]
    fn properties_are_case_insensitive() {
        let mut map = csv_map("2,2,2,2,2,2", "1025,0,0,0,0,0");
        map.properties = Some(Properties {
            entries: vec![
                Property {
                    name: "NAME".to_owned(),
                    value: "Cellar".to_owned(),
                },
                Property {
                    name: "description".to_owned(),
                    value: String::new(),
                },
            ],
        });
        let defaults = LevelDefaults::default();
        let level =
            import_tmx(&map, &defaults, &TiledSettings::default()).expect("map imports");
        assert_eq!(level.name, "Cellar");
        assert_eq!(level.description, defaults.description);
    }

    #[test]
    fn structural_failures_are_reported() {
        let settings = TiledSettings::default();
        let defaults = LevelDefaults::default();

        let no_entities = csv_map("2,2,2,2,2,2", "2,2,2,2,2,2");
        assert!(matches!(
            import_tmx(&no_entities, &defaults, &settings),
            Err(TiledError::NoEntitiesLayer)
        ));

        let no_terrain = csv_map("1025,2,2,2,2,2", "1025,2,2,2,2,2");
        assert!(matches!(
            import_tmx(&no_terrain, &defaults, &settings),
            Err(TiledError::NoTerrainLayer)
        ));

        let mut no_tileset = csv_map("2,2,2,2,2,2", "1025,0,0,0,0,0");
        no_tileset.tilesets[0].image = None;
        assert!(matches!(
            import_tmx(&no_tileset, &defaults, &settings),
            Err(TiledError::NoTilesetFound)
        ));

        let short = csv_map("2,2,2,2,2", "1025,0,0,0,0,0");
        assert!(matches!(
            import_tmx(&short, &defaults, &settings),
            Err(TiledError::LayerSizeMismatch { expected: 6, actual: 5, .. })
        ));
    }

    #[test]
    fn compressed_layers_are_unsupported() {
        let mut map = csv_map("2,2,2,2,2,2", "1025,0,0,0,0,0");
        map.layers[1].data.encoding = Some("base64".to_owned());
        map.layers[1].data.compression = Some("zlib".to_owned());
        assert!(matches!(
            import_tmx(&map, &LevelDefaults::default(), &TiledSettings::default()),
            Err(TiledError::UnsupportedEncoding { .. })
        ));
    }

    #[test]
    fn flipped_tiles_keep_their_id() {
        let map = csv_map("2147483650,2,2,2,2,2", "1025,0,0,0,0,0");
        let level = import_tmx(&map, &LevelDefaults::default(), &TiledSettings::default())
            .expect("map imports");
        assert_eq!(level.world.terrain[0], TerrainId::FIRST_WALL);
    }

    #[test]
    fn export_encodes_boxes_and_player() {
        let level = LevelDescriptor {
            name: "Pair".to_owned(),
            description: "Two boxes".to_owned(),
            tileset: "TilesetWorld1".to_owned(),
            world: WorldDescriptor {
                width: 3,
                height: 1,
                terrain: vec![
                    TerrainId::EMPTY,
                    TerrainId::FIRST_FLOOR,
                    TerrainId::FIRST_WALL,
                ],
            },
            entities: vec![
                EntityDescriptor::new(EntityKind::Player, 0, 0),
                EntityDescriptor::new(EntityKind::Box(BoxType::new(3)), 1, 0),
                EntityDescriptor::new(EntityKind::Box(BoxType::GENERIC), 2, 0),
                EntityDescriptor::new(EntityKind::Player, 5, 0),
            ],
        };
        let map = export_tmx(&level, &TiledSettings::default()).expect("level exports");

        let gids = |layer: &Layer| {
            layer
                .data
                .tiles
                .iter()
                .map(|tile| tile.gid)
                .collect::<Vec<_>>()
        };
        assert_eq!(gids(&map.layers[0]), [1, 257, 2]);
        assert_eq!(gids(&map.layers[1]), [1025, 772, 769]);
        let world_image = map.tilesets[0].image.as_ref();
        assert_eq!(
            world_image.map(|image| image.source.as_str()),
            Some("TilesetWorld1.png")
        );
        assert_eq!(map.tilesets[1].first_gid, 1025);
    }

    #[test]
    fn imported_maps_export_the_same_terrain() {
        let map = csv_map("1,257,642,\n2,1,2", "1025,0,769,\n0,0,900");
        let level = import_tmx(&map, &LevelDefaults::default(), &TiledSettings::default())
            .expect("map imports");
        assert_eq!(level.world.terrain[0], TerrainId::EMPTY);

        let exported = export_tmx(&level, &TiledSettings::default()).expect("level exports");
        let terrain = exported.layers[0].gids().expect("terrain decodes");
        assert_eq!(terrain, [1, 257, 642, 2, 1, 2]);
        let entities = exported.layers[1].gids().expect("entities decode");
        assert_eq!(entities, [1025, 0, 769, 0, 0, 772]);
    }

    #[test]
    fn undecodable_extra_layers_are_skipped() {
        let mut map = csv_map("2,257,2,2,2,2", "1025,0,769,0,0,0");
        let mut decoration = map.layers[1].clone();
        decoration.name = "Decoration".to_owned();
        decoration.data.encoding = Some("base64".to_owned());
        decoration.data.text = Some("AAAAAA==".to_owned());
        let mut partial = map.layers[1].clone();
        partial.name = "Partial".to_owned();
        partial.data.text = Some("2,2".to_owned());
        map.layers.insert(0, decoration);
        map.layers.push(partial);

        let level = import_tmx(&map, &LevelDefaults::default(), &TiledSettings::default())
            .expect("map imports");
        assert_eq!(level.world.terrain_at(1, 0), Some(TerrainId::FIRST_FLOOR));
        assert_eq!(level.entities.len(), 2);
    }

    #[test]
    fn player_gid_follows_the_charset_setting() {
        let settings = TiledSettings {
            charset_first_gid: 2049,
            ..TiledSettings::default()
        };
        let map = csv_map("2,2,2,2,2,2", "2049,1025,769,0,0,0");
        let level =
            import_tmx(&map, &LevelDefaults::default(), &settings).expect("map imports");
        let kinds: Vec<Option<EntityKind>> =
            level.entities.iter().map(EntityDescriptor::kind).collect();
        assert_eq!(
            kinds,
            [Some(EntityKind::Player), Some(EntityKind::Box(BoxType::GENERIC))]
        );

        let exported = export_tmx(&level, &settings).expect("level exports");
        let entities = exported.layers[1].gids().expect("entities decode");
        assert_eq!(entities, [2049, 0, 769, 0, 0, 0]);
        assert_eq!(exported.tilesets[1].first_gid, 2049);
    }

    #[test]
    fn charset_inside_world_tiles_is_rejected() {
        let settings = TiledSettings {
            charset_first_gid: 900,
            ..TiledSettings::default()
        };
        let map = csv_map("2,2,2,2,2,2", "900,0,0,0,0,0");
        assert!(matches!(
            import_tmx(&map, &LevelDefaults::default(), &settings),
            Err(TiledError::CharsetOverlapsWorld(900))
        ));
        let level = LevelDescriptor {
            world: WorldDescriptor {
                width: 1,
                height: 1,
                terrain: vec![TerrainId::FIRST_FLOOR],
            },
            ..LevelDescriptor::default()
        };
        assert!(matches!(
            export_tmx(&level, &settings),
            Err(TiledError::CharsetOverlapsWorld(900))
        ));
    }

    #[test]
    fn export_rejects_boxes_without_sprite() {
        let level = LevelDescriptor {
            world: WorldDescriptor {
                width: 1,
                height: 1,
                terrain: vec![TerrainId::FIRST_FLOOR],
            },
            entities: vec![EntityDescriptor::new(EntityKind::Box(BoxType::new(128)), 0, 0)],
            ..LevelDescriptor::default()
        };
        assert!(matches!(
            export_tmx(&level, &TiledSettings::default()),
            Err(TiledError::BoxTypeOutOfRange(128))
        ));
    }
}
