//! Configuration drift detection between hierarchical documents.
//!
//! Given two configuration files — say a staging and a production
//! environment — this crate reports exactly what differs between them:
//! every added key, removed key, modified value, and type change, each
//! addressed by its full path from the document root.
//!
//! # Components
//!
//! - [`loader`]: parses YAML or JSON files into canonical [`ConfigNode`]
//!   trees and guarantees a mapping root, classifying every failure as a
//!   [`LoadError`].
//! - [`engine`]: the drift engine. [`compare`] recursively walks two trees
//!   and produces a deterministic, path-addressed [`DriftReport`].
//!
//! The engine consumes already-parsed trees, performs no I/O, never mutates
//! its inputs, and has no failure paths for well-formed documents.
//!
//! # Example
//!
//! ```
//! use confdrift_core::{compare, load_yaml_str};
//!
//! let base = load_yaml_str("server:\n  port: 8080\n").unwrap();
//! let target = load_yaml_str("server:\n  port: 9090\n").unwrap();
//!
//! let report = compare(&base, &target);
//! assert_eq!(report.modified.len(), 1);
//! assert_eq!(report.modified[0].path.to_string(), "server.port");
//! ```
//!
//! # Non-goals
//!
//! No schema validation, no semantic understanding of specific keys, no
//! merging or patch generation, no persistence of historical reports.

pub mod engine;
pub mod loader;
pub mod node;
pub mod path;

pub use engine::{compare, DriftEntry, DriftKind, DriftReport};
pub use loader::{load, load_json_str, load_yaml_str, DocumentFormat, LoadError};
pub use node::{ConfigNode, NodeError, Scalar, ScalarKind};
pub use path::{Path, PathSegment};
