//! Item paths: lookup keys for nodes in the scene graph.
//!
//! A path is an ordered list of segments rendered as `window/panel/button`.
//! It owns no UI node; the [`Scene`](crate::Scene) resolves it on the UI
//! thread each time a command runs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::result::{MarionetteError, MarionetteResult};

/// Separator between path segments
pub const SEPARATOR: char = '/';

/// Immutable, order-preserving path to an item in the UI tree.
///
/// Serializes as its segment list, so paths built with
/// [`ItemPath::from_segments`] round-trip even when a segment contains
/// [`SEPARATOR`].
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemPath {
    segments: Vec<String>,
}

impl ItemPath {
    /// Build a path from already split segments
    #[must_use]
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a path strictly.
    ///
    /// A single leading separator is accepted. Empty input and empty
    /// segments (`a//b`, trailing `/`) are rejected.
    pub fn parse(s: &str) -> MarionetteResult<Self> {
        let body = s.strip_prefix(SEPARATOR).unwrap_or(s);
        if body.is_empty() {
            return Err(MarionetteError::invalid_path("path is empty"));
        }
        let mut segments = Vec::new();
        for (index, segment) in body.split(SEPARATOR).enumerate() {
            if segment.is_empty() {
                return Err(MarionetteError::invalid_path(format!(
                    "empty segment at position {index} in {s:?}"
                )));
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    /// Path segments, root first
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the path has no segments
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Name of the top-level item (usually a window)
    #[must_use]
    pub fn root_item_name(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    /// Name of the addressed item
    #[must_use]
    pub fn leaf_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The path with the first `offset` segments removed
    #[must_use]
    pub fn sub_path(&self, offset: usize) -> Self {
        Self {
            segments: self.segments.iter().skip(offset).cloned().collect(),
        }
    }

    /// The path of the parent item, if any
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.segments.split_last()?;
        Some(Self {
            segments: rest.to_vec(),
        })
    }

    /// A new path addressing `name` below this one
    #[must_use]
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self { segments }
    }

    /// Whether `self` is `other` or lies below it
    #[must_use]
    pub fn starts_with(&self, other: &Self) -> bool {
        self.segments.starts_with(&other.segments)
    }
}

impl fmt::Display for ItemPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.segments.iter().enumerate() {
            if index > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl FromStr for ItemPath {
    type Err = MarionetteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Lenient conversion for test scripts: empty segments are skipped
impl From<&str> for ItemPath {
    fn from(s: &str) -> Self {
        Self {
            segments: s
                .split(SEPARATOR)
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

impl TryFrom<String> for ItemPath {
    type Error = MarionetteError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ItemPath> for String {
    fn from(path: ItemPath) -> Self {
        path.to_string()
    }
}
