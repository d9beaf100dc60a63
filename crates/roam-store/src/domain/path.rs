//! Dotted setting paths
//!
//! `"Group.Sub.UsersImage"` names the leaf key `UsersImage` inside the
//! container `Group/Sub`. A single segment names a leaf key directly under the
//! scope root. Segments are non-empty ASCII of at most 255 characters.

use crate::error::StoreError;
use std::fmt;
use std::str::FromStr;

/// Separator between path segments.
pub const PATH_SEPARATOR: char = '.';

/// Longest allowed container or key name, in characters.
pub const MAX_SEGMENT_LEN: usize = 255;

/// A validated setting path.
///
/// Invariant: at least one segment, and no segment is empty or longer than
/// [`MAX_SEGMENT_LEN`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SettingPath {
    segments: Vec<String>,
}

impl SettingPath {
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        if raw.is_empty() {
            return Err(StoreError::invalid_path(raw, "path is empty"));
        }

        let mut segments = Vec::new();
        for (index, segment) in raw.split(PATH_SEPARATOR).enumerate() {
            if segment.is_empty() {
                return Err(StoreError::invalid_path(
                    raw,
                    format!("segment {index} is empty"),
                ));
            }
            if !segment.is_ascii() {
                return Err(StoreError::invalid_path(
                    raw,
                    format!("segment {index} is not ASCII"),
                ));
            }
            if segment.len() > MAX_SEGMENT_LEN {
                return Err(StoreError::invalid_path(
                    raw,
                    format!("segment {index} exceeds {MAX_SEGMENT_LEN} characters"),
                ));
            }
            segments.push(segment.to_string());
        }

        Ok(Self { segments })
    }

    /// Container names to walk from the scope root, outermost first.
    pub fn containers(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    /// Name of the value inside the innermost container.
    pub fn leaf_key(&self) -> &str {
        // parse() guarantees at least one segment
        &self.segments[self.segments.len() - 1]
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.containers().len()
    }
}

impl FromStr for SettingPath {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for SettingPath {
    type Error = StoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl fmt::Display for SettingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{PATH_SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}
