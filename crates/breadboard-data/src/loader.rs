//! File discovery, format detection and deserialization for data files,
//! plus the top-level loader for a data directory.
//!
//! A data directory looks like:
//!
//! ```text
//! data/
//!   ic/                 one datasheet per file (*.ron, *.toml, *.json)
//!   simulation.ron      optional; SimConfig (any of the three formats)
//! ```

use std::path::{Path, PathBuf};

use breadboard_core::ic::DatasheetError;
use breadboard_core::sim::SimConfig;
use serde::de::DeserializeOwned;

use crate::catalog::IcCatalog;

// ===========================================================================
// Errors
// ===========================================================================

#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required file or directory was not found.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: &'static str, dir: PathBuf },

    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// Two datasheets declare the same chip name.
    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    #[error("no datasheet for chip '{0}'")]
    UnknownChip(String),

    /// The file parsed but describes an impossible chip.
    #[error("invalid datasheet in {file}: {source}")]
    InvalidDatasheet {
        file: PathBuf,
        #[source]
        source: DatasheetError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

impl Format {
    pub const EXTENSIONS: [&'static str; 3] = ["ron", "toml", "json"];
}

/// Detect the format of a file from its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Look for `{base_name}.ron`, `.toml` or `.json` in `dir`.
///
/// Returns `Ok(None)` if there is none, or `ConflictingFormats` if more
/// than one exists.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in Format::EXTENSIONS {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Data files directly inside `dir`, sorted by path. Files with other
/// extensions are ignored.
pub fn list_data_files(dir: &Path) -> Result<Vec<PathBuf>, DataLoadError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && detect_format(&path).is_ok() {
            files.push(path);
        } else {
            log::debug!("skipping {}", path.display());
        }
    }
    files.sort();
    Ok(files)
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Deserialize `content` in `format`. `file` is only used for errors.
pub fn deserialize_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    file: &Path,
) -> Result<T, DataLoadError> {
    let parse_error = |detail: String| DataLoadError::Parse {
        file: file.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
    }
}

/// Read a file and deserialize it according to its extension.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    deserialize_str(&content, format, path)
}

// ===========================================================================
// Data directory
// ===========================================================================

/// Everything loaded from a data directory.
#[derive(Debug, Clone)]
pub struct BreadboardData {
    pub catalog: IcCatalog,
    pub config: SimConfig,
}

/// Load `simulation.{ron,toml,json}` from `dir`, or the defaults if absent.
pub fn load_sim_config(dir: &Path) -> Result<SimConfig, DataLoadError> {
    match find_data_file(dir, "simulation")? {
        Some(path) => deserialize_file(&path),
        None => Ok(SimConfig::default()),
    }
}

/// Load the chip catalog from `dir/ic/` and the simulation settings.
pub fn load_breadboard_data(dir: &Path) -> Result<BreadboardData, DataLoadError> {
    let ic_dir = dir.join("ic");
    if !ic_dir.is_dir() {
        return Err(DataLoadError::MissingRequired {
            file: "ic",
            dir: dir.to_path_buf(),
        });
    }
    let catalog = IcCatalog::load_dir(&ic_dir)?;
    let config = load_sim_config(dir)?;
    log::debug!(
        "loaded {} datasheets from {}, max_iterations={}",
        catalog.len(),
        dir.display(),
        config.max_iterations
    );
    Ok(BreadboardData { catalog, config })
}

// ===========================================================================
// Tests
// ===========================================================================
