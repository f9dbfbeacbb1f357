//! Canonical representation of parsed configuration documents.
//!
//! Every loaded document, regardless of its on-disk format, is converted into
//! a [`ConfigNode`] tree before the drift engine sees it. The type is a
//! closed tagged variant so that every comparison site matches exhaustively:
//! adding a new node kind forces every consumer to handle it at compile time
//! instead of discovering it through runtime type inspection.
//!
//! # Mapping Keys
//!
//! Mapping keys are strings, unique within a mapping, and preserved in
//! insertion (document) order. YAML allows non-string keys; those are
//! rejected during conversion rather than stringified, because collapsing
//! typed keys to strings can collide (integer `123` vs string `"123"`) and
//! silently lose entries.
//!
//! # Numbers
//!
//! Integers are stored as [`Scalar::Int`] (`i64`) or [`Scalar::Uint`] (`u64`
//! values above `i64::MAX`). Both are the same *scalar kind* — the split
//! exists only to cover the full range without falling back to floats — and
//! they compare numerically across the split. Floats compare by exact
//! equality; there is no tolerance. This is a documented limitation, not a
//! bug: a drift report must never hide a real difference behind an epsilon.

use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Errors that can occur while converting a parsed document into a
/// [`ConfigNode`] tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NodeError {
    /// A mapping key that is not a string was encountered.
    ///
    /// Non-string keys cannot be reliably represented: stringifying them can
    /// collide with genuine string keys and would violate the key-uniqueness
    /// contract.
    #[error("unsupported mapping key: {key_type} keys cannot be represented")]
    UnsupportedKey {
        /// The kind of key that was encountered (e.g. "integer", "sequence").
        key_type: &'static str,
    },
}

/// One value within a parsed configuration tree.
#[derive(Debug, Clone)]
pub enum ConfigNode {
    /// Key/value pairs. Keys are unique; insertion order is preserved for
    /// deterministic reporting but is irrelevant to equality.
    Mapping(Vec<(String, ConfigNode)>),

    /// Ordered list of nodes. Order is significant.
    Sequence(Vec<ConfigNode>),

    /// A leaf value.
    Scalar(Scalar),
}

/// A leaf configuration value.
#[derive(Debug, Clone)]
pub enum Scalar {
    /// Explicit null (`null`/`~` in YAML, `null` in JSON).
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer above `i64::MAX`.
    Uint(u64),
    /// Floating-point number.
    Float(f64),
    /// String.
    Str(String),
}

/// The five scalar kinds used for type-change detection.
///
/// `Int` and `Uint` both report [`ScalarKind::Integer`]; the representation
/// split is invisible to drift classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Null.
    Null,
    /// Boolean.
    Bool,
    /// Integer (signed or unsigned representation).
    Integer,
    /// Floating-point number.
    Float,
    /// String.
    String,
}

impl ScalarKind {
    /// Human-readable kind name for messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Scalar {
    /// Returns the scalar kind used for type-change classification.
    #[must_use]
    pub const fn kind(&self) -> ScalarKind {
        match self {
            Self::Null => ScalarKind::Null,
            Self::Bool(_) => ScalarKind::Bool,
            Self::Int(_) | Self::Uint(_) => ScalarKind::Integer,
            Self::Float(_) => ScalarKind::Float,
            Self::Str(_) => ScalarKind::String,
        }
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Uint(a), Self::Uint(b)) => a == b,
            // Integers compare numerically across the representation split.
            (Self::Int(a), Self::Uint(b)) | (Self::Uint(b), Self::Int(a)) => {
                u64::try_from(*a).is_ok_and(|a| a == *b)
            },
            // Exact float equality; NaN is never equal to anything.
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl ConfigNode {
    /// Returns `true` if this node is a mapping.
    #[must_use]
    pub const fn is_mapping(&self) -> bool {
        matches!(self, Self::Mapping(_))
    }

    /// Human-readable kind name for messages: the variant name for
    /// collections, the scalar kind for leaves.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Mapping(_) => "mapping",
            Self::Sequence(_) => "sequence",
            Self::Scalar(s) => s.kind().name(),
        }
    }

    /// Looks up a key in a mapping node.
    ///
    /// Returns `None` for missing keys and for non-mapping nodes.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ConfigNode> {
        match self {
            Self::Mapping(entries) => mapping_get(entries, key),
            Self::Sequence(_) | Self::Scalar(_) => None,
        }
    }

    /// Converts a parsed YAML value into a canonical node.
    ///
    /// YAML tags are stripped and the tagged value converted as-is; tags
    /// carry no drift meaning.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::UnsupportedKey`] if any mapping in the tree has
    /// a non-string key.
    pub fn from_yaml(value: serde_yaml::Value) -> Result<Self, NodeError> {
        match value {
            serde_yaml::Value::Null => Ok(Self::Scalar(Scalar::Null)),
            serde_yaml::Value::Bool(b) => Ok(Self::Scalar(Scalar::Bool(b))),
            serde_yaml::Value::Number(n) => Ok(Self::Scalar(yaml_number(&n))),
            serde_yaml::Value::String(s) => Ok(Self::Scalar(Scalar::Str(s))),
            serde_yaml::Value::Sequence(items) => items
                .into_iter()
                .map(Self::from_yaml)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Sequence),
            serde_yaml::Value::Mapping(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (key, value) in map {
                    let serde_yaml::Value::String(key) = key else {
                        return Err(NodeError::UnsupportedKey {
                            key_type: yaml_kind_name(&key),
                        });
                    };
                    entries.push((key, Self::from_yaml(value)?));
                }
                Ok(Self::Mapping(entries))
            },
            serde_yaml::Value::Tagged(tagged) => Self::from_yaml(tagged.value),
        }
    }

    /// Converts a parsed JSON value into a canonical node.
    ///
    /// Infallible: JSON object keys are always strings.
    #[must_use]
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Scalar(Scalar::Null),
            serde_json::Value::Bool(b) => Self::Scalar(Scalar::Bool(b)),
            serde_json::Value::Number(n) => Self::Scalar(json_number(&n)),
            serde_json::Value::String(s) => Self::Scalar(Scalar::Str(s)),
            serde_json::Value::Array(items) => {
                Self::Sequence(items.into_iter().map(Self::from_json).collect())
            },
            serde_json::Value::Object(map) => Self::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from_json(value)))
                    .collect(),
            ),
        }
    }
}

/// Linear lookup over mapping entries. Keys are unique, so first match wins.
pub(crate) fn mapping_get<'a>(
    entries: &'a [(String, ConfigNode)],
    key: &str,
) -> Option<&'a ConfigNode> {
    entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

fn yaml_number(n: &serde_yaml::Number) -> Scalar {
    if let Some(i) = n.as_i64() {
        Scalar::Int(i)
    } else if let Some(u) = n.as_u64() {
        Scalar::Uint(u)
    } else {
        Scalar::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

fn json_number(n: &serde_json::Number) -> Scalar {
    if let Some(i) = n.as_i64() {
        Scalar::Int(i)
    } else if let Some(u) = n.as_u64() {
        Scalar::Uint(u)
    } else {
        Scalar::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

fn yaml_kind_name(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "boolean",
        serde_yaml::Value::Number(_) => "number",
        serde_yaml::Value::String(_) => "string",
        serde_yaml::Value::Sequence(_) => "sequence",
        serde_yaml::Value::Mapping(_) => "mapping",
        serde_yaml::Value::Tagged(_) => "tagged",
    }
}

impl PartialEq for ConfigNode {
    /// Structural value equality. Mapping entry order is irrelevant;
    /// sequence order is significant.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Mapping(a), Self::Mapping(b)) => {
                // Keys are unique on both sides, so equal length plus every
                // `a` entry matched in `b` implies a bijection.
                a.len() == b.len()
                    && a.iter()
                        .all(|(key, value)| mapping_get(b, key).is_some_and(|v| v == value))
            },
            (Self::Sequence(a), Self::Sequence(b)) => a == b,
            (Self::Scalar(a), Self::Scalar(b)) => a == b,
            _ => false,
        }
    }
}

impl Serialize for ConfigNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Mapping(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            },
            Self::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            },
            Self::Scalar(scalar) => scalar.serialize(serializer),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Uint(u) => serializer.serialize_u64(*u),
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::Str(s) => serializer.serialize_str(s),
        }
    }
}

impl fmt::Display for ConfigNode {
    /// Compact flow-style rendering for report lines.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mapping(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            },
            Self::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            },
            Self::Scalar(scalar) => write!(f, "{scalar}"),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Uint(u) => write!(f, "{u}"),
            // Debug formatting keeps the decimal point (`1.0`, not `1`), so
            // floats stay visually distinct from integers.
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Str(s) => write!(f, "{s:?}"),
        }
    }
}
