//! Points and ranges over text leaves.
//!
//! Offsets count chars, not bytes.

use crate::error::ModelError;
use crate::path::Path;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A caret position: a leaf path plus a char offset into its text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub path: Path,
    pub offset: usize,
}

impl Point {
    pub fn new(path: impl Into<Path>, offset: usize) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }

    pub fn compare(&self, other: &Point) -> Ordering {
        match self.path.compare(&other.path) {
            Ordering::Equal if self.path == other.path => self.offset.cmp(&other.offset),
            ordering => ordering,
        }
    }

    pub fn is_before(&self, other: &Point) -> bool {
        self.compare(other) == Ordering::Less
    }

    pub fn is_after(&self, other: &Point) -> bool {
        self.compare(other) == Ordering::Greater
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.offset)
    }
}

impl FromStr for Point {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, offset) = s
            .trim()
            .rsplit_once(':')
            .ok_or_else(|| ModelError::invalid_path(s, "expected <path>:<offset>"))?;
        let offset = offset
            .parse::<usize>()
            .map_err(|_| ModelError::invalid_path(s, "offset is not a number"))?;
        Ok(Point::new(path.parse::<Path>()?, offset))
    }
}

/// An anchor/focus pair. The anchor is where the selection started, so a
/// backward range has its focus before its anchor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub anchor: Point,
    pub focus: Point,
}

impl Range {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn is_expanded(&self) -> bool {
        !self.is_collapsed()
    }

    pub fn is_backward(&self) -> bool {
        self.anchor.is_after(&self.focus)
    }

    /// `(start, end)` in document order.
    pub fn edges(&self) -> (Point, Point) {
        if self.is_backward() {
            (self.focus.clone(), self.anchor.clone())
        } else {
            (self.anchor.clone(), self.focus.clone())
        }
    }

    pub fn start(&self) -> Point {
        self.edges().0
    }

    pub fn end(&self) -> Point {
        self.edges().1
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_collapsed() {
            write!(f, "{}", self.anchor)
        } else {
            write!(f, "{}..{}", self.anchor, self.focus)
        }
    }
}

impl FromStr for Range {
    type Err = ModelError;

    /// Accepts `path:offset` for a caret or `path:offset..path:offset`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once("..") {
            Some((anchor, focus)) => Ok(Range::new(anchor.parse()?, focus.parse()?)),
            None => Ok(Range::collapsed(s.parse()?)),
        }
    }
}
