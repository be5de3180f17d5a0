#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! On-disk representations of Boxoban levels.
//!
//! Three formats are supported: the level XML document loaded by the game,
//! classic ASCII text maps, and Tiled TMX maps used as an editing format.
//! Every conversion goes through [`boxoban_core::LevelDescriptor`].

mod level_xml;
mod text_map;
mod tiled;

pub use level_xml::{
    format_terrain, parse_level, write_level, LevelFormatError, ParseMode, ParsedLevel,
};
pub use text_map::{import_text_map, Glyph, TextMap, TextMapError};
pub use tiled::{
    export_tmx, import_tmx, read_tmx, write_tmx, Layer, LayerData, LayerTile, Properties,
    Property, TiledError, TiledMap, TiledSettings, Tileset, TilesetImage,
};

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";

/// Metadata given to levels whose source format does not carry it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelDefaults {
    /// Name written when the source has none.
    pub name: String,
    /// Description written when the source has none.
    pub description: String,
    /// Terrain tileset written when the source has none.
    pub tileset: String,
}

impl Default for LevelDefaults {
    fn default() -> Self {
        Self {
            name: "{TODO:LEVEL_NAME}".to_owned(),
            description: "{TODO:LEVEL_DESCRIPTION}".to_owned(),
            tileset: "TilesetWorld1".to_owned(),
        }
    }
}

fn serialize_document<T: serde::Serialize>(
    value: &T,
    root: &str,
) -> Result<String, quick_xml::DeError> {
    let mut body = String::new();
    let mut serializer = quick_xml::se::Serializer::with_root(&mut body, Some(root))?;
    let _ = serializer.indent('\t', 1);
    let _ = value.serialize(serializer)?;

    let mut document = String::with_capacity(XML_DECLARATION.len() + body.len() + 1);
    document.push_str(XML_DECLARATION);
    document.push_str(&body);
    document.push('\n');
    Ok(document)
}
