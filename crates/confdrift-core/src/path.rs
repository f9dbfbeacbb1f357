//! Stable addressing of nodes within a configuration tree.
//!
//! A [`Path`] is the ordered sequence of mapping keys and sequence indices
//! leading from the document root to a node. Two paths are equal iff their
//! segment sequences are equal elementwise. Paths are built fresh during
//! each comparison and carry no references into the input trees.

use std::fmt;

use serde::Serialize;

/// One step in a [`Path`]: a mapping key or a sequence index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// A mapping key.
    Key(String),
    /// A zero-based sequence index.
    Index(usize),
}

impl PathSegment {
    /// Builds a key segment.
    pub fn key(key: impl Into<String>) -> Self {
        Self::Key(key.into())
    }
}

/// Location of a node relative to the document root.
///
/// The root itself is the empty path; the drift engine only ever reports
/// entries at least one segment deep, since both roots are mappings.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// The empty path addressing the document root.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Returns a new path with `segment` appended. The receiver is not
    /// modified; child paths are fresh values.
    #[must_use]
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    /// The path's segments, root first.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Returns `true` for the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl From<Vec<PathSegment>> for Path {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }
}

impl FromIterator<PathSegment> for Path {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Path {
    /// Dotted keys, bracketed indices: `server.listeners[2].port`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("(root)");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                },
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}
