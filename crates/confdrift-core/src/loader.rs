//! Loading configuration documents from disk.
//!
//! The loader is the boundary between raw files and the drift engine: it
//! detects the format from the file extension, delegates parsing to
//! `serde_yaml`/`serde_json`, converts the parsed value into a canonical
//! [`ConfigNode`] tree, and enforces the engine's one precondition — the
//! document root is a mapping. Every failure is classified as a
//! [`LoadError`]; the engine itself has no error paths.
//!
//! An empty YAML document (or an explicit top-level `null`) loads as an
//! empty mapping rather than failing, so a freshly created config file can
//! be compared before anyone has written to it. Empty JSON has no such
//! reading and stays a syntax error.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::node::{ConfigNode, NodeError};

/// Supported on-disk document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    /// YAML (`.yaml`, `.yml`).
    Yaml,
    /// JSON (`.json`).
    Json,
}

impl DocumentFormat {
    /// Detects the format from a lowercased file extension.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Yaml => "YAML",
            Self::Json => "JSON",
        }
    }
}

/// Classified failures while loading a configuration document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    /// The path does not exist or is not a regular file.
    #[error("configuration file not found: {}", .path.display())]
    NotFound {
        /// The path that was requested.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("cannot read configuration file {}: {source}", .path.display())]
    Unreadable {
        /// The path that was requested.
        path: PathBuf,
        /// The underlying I/O failure.
        source: std::io::Error,
    },

    /// The file extension maps to no supported format.
    #[error("unsupported file extension {extension:?} for {}: supported extensions are .yaml, .yml, .json", .path.display())]
    UnsupportedFormat {
        /// The path that was requested.
        path: PathBuf,
        /// The extension found (empty if none).
        extension: String,
    },

    /// The document is not well-formed for its format, including YAML
    /// mappings with non-string keys.
    #[error("invalid {} syntax{}: {message}", .format.name(), location_suffix(.line, .column))]
    Syntax {
        /// The format being parsed.
        format: DocumentFormat,
        /// The parser's own description of the problem.
        message: String,
        /// 1-based line, when the parser reports a location.
        line: Option<usize>,
        /// 1-based column, when the parser reports a location.
        column: Option<usize>,
    },

    /// The document parsed but its root is not a mapping.
    #[error("document root must be a mapping, found {found}")]
    NonMappingRoot {
        /// Kind of the root node actually found.
        found: &'static str,
    },
}

fn location_suffix(line: &Option<usize>, column: &Option<usize>) -> String {
    match (line, column) {
        (Some(line), Some(column)) => format!(" at line {line} column {column}"),
        (Some(line), None) => format!(" at line {line}"),
        _ => String::new(),
    }
}

/// Loads a configuration file into a mapping-rooted [`ConfigNode`] tree.
///
/// # Errors
///
/// Returns a classified [`LoadError`]: `NotFound` for missing or non-file
/// paths, `UnsupportedFormat` for unknown extensions, `Unreadable` for I/O
/// failures, `Syntax` for malformed content, and `NonMappingRoot` when the
/// document's top level is not a mapping.
pub fn load(path: &Path) -> Result<ConfigNode, LoadError> {
    let format = validate_path(path)?;
    let content = fs::read_to_string(path).map_err(|source| LoadError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), format = format.name(), "read configuration file");

    let node = match format {
        DocumentFormat::Yaml => load_yaml_str(&content)?,
        DocumentFormat::Json => load_json_str(&content)?,
    };
    info!(path = %path.display(), format = format.name(), "loaded configuration document");
    Ok(node)
}

/// Validates existence and extension, returning the detected format.
fn validate_path(path: &Path) -> Result<DocumentFormat, LoadError> {
    if !path.is_file() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    DocumentFormat::from_extension(&extension).ok_or_else(|| LoadError::UnsupportedFormat {
        path: path.to_path_buf(),
        extension,
    })
}

/// Parses YAML content into a mapping-rooted tree.
///
/// An empty document or top-level `null` loads as an empty mapping.
///
/// # Errors
///
/// Returns [`LoadError::Syntax`] for malformed YAML or non-string mapping
/// keys, [`LoadError::NonMappingRoot`] for sequence or scalar roots.
pub fn load_yaml_str(content: &str) -> Result<ConfigNode, LoadError> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|error| LoadError::Syntax {
            format: DocumentFormat::Yaml,
            message: error.to_string(),
            line: error.location().map(|l| l.line()),
            column: error.location().map(|l| l.column()),
        })?;

    if value.is_null() {
        warn!("YAML document is empty, loading as empty mapping");
        return Ok(ConfigNode::Mapping(Vec::new()));
    }

    let node = ConfigNode::from_yaml(value).map_err(|error| match error {
        NodeError::UnsupportedKey { .. } => LoadError::Syntax {
            format: DocumentFormat::Yaml,
            message: error.to_string(),
            line: None,
            column: None,
        },
    })?;
    require_mapping_root(node)
}

/// Parses JSON content into a mapping-rooted tree.
///
/// # Errors
///
/// Returns [`LoadError::Syntax`] for malformed JSON (including an empty
/// document), [`LoadError::NonMappingRoot`] for array or scalar roots.
pub fn load_json_str(content: &str) -> Result<ConfigNode, LoadError> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|error| LoadError::Syntax {
            format: DocumentFormat::Json,
            message: error.to_string(),
            line: Some(error.line()),
            column: Some(error.column()),
        })?;
    require_mapping_root(ConfigNode::from_json(value))
}

fn require_mapping_root(node: ConfigNode) -> Result<ConfigNode, LoadError> {
    if node.is_mapping() {
        Ok(node)
    } else {
        Err(LoadError::NonMappingRoot {
            found: node.kind_name(),
        })
    }
}
