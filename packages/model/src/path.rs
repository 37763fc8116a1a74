//! Node addressing.
//!
//! A [`Path`] is the list of child indices walked from the document root to a
//! node. The empty path is the root itself, `[0]` is the first top-level
//! block, `[0, 2]` its third child and so on.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<usize>);

impl Path {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Index of the node within its parent, `None` for the root.
    pub fn index(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn parent(&self) -> Option<Path> {
        self.0
            .split_last()
            .map(|(_, prefix)| Path(prefix.to_vec()))
    }

    pub fn child(&self, index: usize) -> Path {
        let mut indices = self.0.clone();
        indices.push(index);
        Path(indices)
    }

    /// Path of the same node shifted to `index` within its parent.
    pub fn sibling(&self, index: usize) -> Option<Path> {
        let mut indices = self.0.clone();
        *indices.last_mut()? = index;
        Some(Path(indices))
    }

    pub fn next(&self) -> Option<Path> {
        let index = self.index()?;
        self.sibling(index + 1)
    }

    pub fn previous(&self) -> Option<Path> {
        let index = self.index()?;
        if index == 0 {
            return None;
        }
        self.sibling(index - 1)
    }

    /// Appends `rest` to this path.
    pub fn join(&self, rest: &[usize]) -> Path {
        let mut indices = self.0.clone();
        indices.extend_from_slice(rest);
        Path(indices)
    }

    /// Strict ancestry: a path is not its own ancestor.
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }

    /// True when `other` is this node or one of its descendants.
    pub fn contains(&self, other: &Path) -> bool {
        other.0.starts_with(&self.0)
    }

    pub fn is_sibling_of(&self, other: &Path) -> bool {
        match (self.0.split_last(), other.0.split_last()) {
            (Some((a, pa)), Some((b, pb))) => pa == pb && a != b,
            _ => false,
        }
    }

    /// True when this path ends before `other` at this path's own depth,
    /// i.e. the node precedes `other` (or its ancestor) among siblings.
    pub fn ends_before(&self, other: &Path) -> bool {
        match self.0.split_last() {
            Some((&last, prefix)) => {
                other.0.len() > prefix.len()
                    && other.0.starts_with(prefix)
                    && last < other.0[prefix.len()]
            }
            None => false,
        }
    }

    /// Like [`Path::ends_before`] but also true when both sit at the same
    /// index at this depth.
    pub fn ends_at_or_before(&self, other: &Path) -> bool {
        match self.0.split_last() {
            Some((&last, prefix)) => {
                other.0.len() > prefix.len()
                    && other.0.starts_with(prefix)
                    && last <= other.0[prefix.len()]
            }
            None => false,
        }
    }

    pub fn common_ancestor(&self, other: &Path) -> Path {
        let shared = self
            .0
            .iter()
            .zip(other.0.iter())
            .take_while(|(a, b)| a == b)
            .count();
        Path(self.0[..shared].to_vec())
    }

    /// Document-order comparison. Ancestors compare equal to their
    /// descendants.
    pub fn compare(&self, other: &Path) -> Ordering {
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            match a.cmp(b) {
                Ordering::Equal => continue,
                ordering => return ordering,
            }
        }
        Ordering::Equal
    }

    /// Ancestor paths from the root down, excluding this path.
    pub fn ancestors(&self) -> Vec<Path> {
        (0..self.0.len()).map(|len| Path(self.0[..len].to_vec())).collect()
    }

    pub fn into_inner(self) -> Vec<usize> {
        self.0
    }
}

impl Deref for Path {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for Path {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl From<&[usize]> for Path {
    fn from(indices: &[usize]) -> Self {
        Self(indices.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Path {
    fn from(indices: [usize; N]) -> Self {
        Self(indices.to_vec())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

impl FromStr for Path {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Path::root());
        }
        trimmed
            .split('.')
            .map(|part| {
                part.parse::<usize>()
                    .map_err(|_| ModelError::invalid_path(s, format!("'{}' is not an index", part)))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_and_siblings() {
        let path = Path::from([1, 2, 3]);
        assert_eq!(path.parent(), Some(Path::from([1, 2])));
        assert_eq!(path.next(), Some(Path::from([1, 2, 4])));
        assert_eq!(path.previous(), Some(Path::from([1, 2, 2])));
        assert_eq!(Path::from([0]).previous(), None);
        assert_eq!(Path::root().parent(), None);
        assert_eq!(Path::root().next(), None);
    }

    #[test]
    fn test_ancestry() {
        let parent = Path::from([1]);
        let child = Path::from([1, 0]);
        assert!(parent.is_ancestor_of(&child));
        assert!(!child.is_ancestor_of(&parent));
        assert!(!parent.is_ancestor_of(&parent));
        assert!(parent.contains(&parent));
        assert!(Path::root().is_ancestor_of(&parent));
    }

    #[test]
    fn test_ends_before() {
        assert!(Path::from([0]).ends_before(&Path::from([1, 4])));
        assert!(!Path::from([1]).ends_before(&Path::from([1, 4])));
        assert!(Path::from([1]).ends_at_or_before(&Path::from([1, 4])));
        assert!(!Path::from([0, 3]).ends_before(&Path::from([1])));
    }

    #[test]
    fn test_compare_document_order() {
        assert_eq!(Path::from([0, 1]).compare(&Path::from([1])), Ordering::Less);
        assert_eq!(Path::from([2]).compare(&Path::from([1, 5])), Ordering::Greater);
        assert_eq!(Path::from([1]).compare(&Path::from([1, 5])), Ordering::Equal);
    }

    #[test]
    fn test_common_ancestor() {
        let a = Path::from([0, 1, 2]);
        let b = Path::from([0, 3]);
        assert_eq!(a.common_ancestor(&b), Path::from([0]));
    }

    #[test]
    fn test_display_and_parse() {
        let path = Path::from([0, 12, 3]);
        assert_eq!(path.to_string(), "0.12.3");
        assert_eq!("0.12.3".parse::<Path>().unwrap(), path);
        assert_eq!("".parse::<Path>().unwrap(), Path::root());
        assert!("0.x".parse::<Path>().is_err());
    }
}
