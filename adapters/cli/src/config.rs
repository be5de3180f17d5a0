use std::{fs, path::Path};

use anyhow::{Context, Result};
use boxoban_formats::{LevelDefaults, TiledSettings};
use serde::Deserialize;

/// Environment variable naming the optional TOML configuration file.
pub(crate) const CONFIG_ENV: &str = "BOXOBAN_TOOLS_CONFIG";

/// Conversion settings, every field optional in the TOML file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ToolsConfig {
    level: LevelSection,
    tiled: TiledSection,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LevelSection {
    name: String,
    description: String,
    tileset: String,
}

impl Default for LevelSection {
    fn default() -> Self {
        let defaults = LevelDefaults::default();
        Self {
            name: defaults.name,
            description: defaults.description,
            tileset: defaults.tileset,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TiledSection {
    tile_width: u32,
    tile_height: u32,
    world_image_width: u32,
    world_image_height: u32,
    charset_name: String,
    charset_first_gid: u32,
    charset_image_width: u32,
    charset_image_height: u32,
}

impl Default for TiledSection {
    fn default() -> Self {
        let settings = TiledSettings::default();
        Self {
            tile_width: settings.tile_width,
            tile_height: settings.tile_height,
            world_image_width: settings.world_image_width,
            world_image_height: settings.world_image_height,
            charset_name: settings.charset_name,
            charset_first_gid: settings.charset_first_gid,
            charset_image_width: settings.charset_image_width,
            charset_image_height: settings.charset_image_height,
        }
    }
}

impl ToolsConfig {
    /// Loads the file named by [`CONFIG_ENV`], or the built-in defaults.
    pub(crate) fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("failed to parse config {}", path.display()))
    }

    fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub(crate) fn level_defaults(&self) -> LevelDefaults {
        LevelDefaults {
            name: self.level.name.clone(),
            description: self.level.description.clone(),
            tileset: self.level.tileset.clone(),
        }
    }

    pub(crate) fn tiled_settings(&self) -> TiledSettings {
        let tiled = &self.tiled;
        TiledSettings {
            tile_width: tiled.tile_width,
            tile_height: tiled.tile_height,
            world_image_width: tiled.world_image_width,
            world_image_height: tiled.world_image_height,
            charset_name: tiled.charset_name.clone(),
            charset_first_gid: tiled.charset_first_gid,
            charset_image_width: tiled.charset_image_width,
            charset_image_height: tiled.charset_image_height,
        }
    }
}
