use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use boxoban_core::LevelDescriptor;
use boxoban_formats::{
    export_tmx, import_text_map, import_tmx, parse_level, read_tmx, write_level, write_tmx,
    ParseMode,
};
use boxoban_world::{query, World, WorldConfig};
use tracing::{info, warn};

use crate::config::ToolsConfig;

/// Conversion selected by the first command-line argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Mode {
    /// `-tmx`: Tiled map to level document.
    TmxToXml,
    /// `-txt`: text map to level document.
    TxtToXml,
    /// `-txt2tmx`: text map to Tiled map.
    TxtToTmx,
    /// `-xml2tmx`: level document to Tiled map.
    XmlToTmx,
    /// `-show`: prints a level document as a text map.
    Show,
}

impl Mode {
    pub(crate) fn from_flag(flag: &str) -> Option<Self> {
        match flag {
            "-tmx" => Some(Self::TmxToXml),
            "-txt" => Some(Self::TxtToXml),
            "-txt2tmx" => Some(Self::TxtToTmx),
            "-xml2tmx" => Some(Self::XmlToTmx),
            "-show" => Some(Self::Show),
            _ => None,
        }
    }

    fn output_extension(self) -> Option<&'static str> {
        match self {
            Self::TmxToXml | Self::TxtToXml => Some("xml"),
            Self::TxtToTmx | Self::XmlToTmx => Some("tmx"),
            Self::Show => None,
        }
    }

    /// Output written when none is given: the input stem in the working directory.
    pub(crate) fn default_output(self, input: &Path) -> Option<PathBuf> {
        let extension = self.output_extension()?;
        let mut name = input.file_stem().map(OsString::from).unwrap_or_default();
        name.push(".");
        name.push(extension);
        Some(PathBuf::from(name))
    }
}

/// Runs a conversion, writing its result to `output` or printing it for `-show`.
pub(crate) fn run(
    mode: Mode,
    input: &Path,
    output: Option<&Path>,
    config: &ToolsConfig,
) -> Result<()> {
    let source = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;

    let document = match mode {
        Mode::TmxToXml => {
            let map = read_tmx(&source)?;
            write_level(&import_tmx(
                &map,
                &config.level_defaults(),
                &config.tiled_settings(),
            )?)?
        }
        Mode::TxtToXml => write_level(&import_text_map(&source, &config.level_defaults())?)?,
        Mode::TxtToTmx => {
            let level = import_text_map(&source, &config.level_defaults())?;
            write_tmx(&export_tmx(&level, &config.tiled_settings())?)?
        }
        Mode::XmlToTmx => {
            let level = read_level(&source)?;
            write_tmx(&export_tmx(&level, &config.tiled_settings())?)?
        }
        Mode::Show => {
            print!("{}", show(&read_level(&source)?)?);
            return Ok(());
        }
    };

    let output = output
        .map(Path::to_path_buf)
        .or_else(|| mode.default_output(input))
        .context("no output path for conversion")?;
    fs::write(&output, document)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(input = %input.display(), output = %output.display(), ?mode, "level converted");
    Ok(())
}

fn read_level(source: &str) -> Result<LevelDescriptor> {
    let parsed = parse_level(source, ParseMode::Lenient)?;
    if parsed.recovered_tokens > 0 {
        warn!(
            recovered = parsed.recovered_tokens,
            "level document holds unreadable terrain tokens"
        );
    }
    Ok(parsed.level)
}

/// Loads the level into a world and renders it with its metadata.
pub(crate) fn show(level: &LevelDescriptor) -> Result<String> {
    let world = World::load(level, WorldConfig::default())
        .with_context(|| format!("level `{}` cannot be loaded", level.name))?;
    let (columns, rows) = query::dimensions(&world);
    let boxes = query::entities(&world)
        .iter()
        .filter(|snapshot| snapshot.kind.is_box())
        .count();
    Ok(format!(
        "{}\n{}\n{columns}x{rows}, {boxes} boxes\n{world}",
        query::name(&world),
        query::description(&world),
    ))
}
