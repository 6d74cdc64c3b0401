use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Position inside a feature's nested geometry.
///
/// An empty path addresses the feature's root geometry. Each entry
/// descends one level: `[j, k]` is ring `k` of polygon `j` of a
/// multi-polygon. Paths are values: extending one always produces a new
/// path, the original is never touched.
///
/// The textual form joins entries with `/` (`"2/5"`); the root path is the
/// empty string.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexPath(Vec<usize>);

impl IndexPath {
    /// The root path (empty).
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns `true` if this path addresses the root geometry.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of levels below the root.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// A new path one level deeper.
    pub fn child(&self, index: usize) -> Self {
        let mut entries = Vec::with_capacity(self.0.len() + 1);
        entries.extend_from_slice(&self.0);
        entries.push(index);
        Self(entries)
    }

    /// A new path with `suffix` appended.
    pub fn join(&self, suffix: &IndexPath) -> Self {
        let mut entries = Vec::with_capacity(self.0.len() + suffix.0.len());
        entries.extend_from_slice(&self.0);
        entries.extend_from_slice(&suffix.0);
        Self(entries)
    }

    /// The path one level up, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, head) = self.0.split_last()?;
        Some(Self(head.to_vec()))
    }

    /// The deepest entry, or `None` for the root.
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }
}

impl From<Vec<usize>> for IndexPath {
    fn from(entries: Vec<usize>) -> Self {
        Self(entries)
    }
}

impl From<&[usize]> for IndexPath {
    fn from(entries: &[usize]) -> Self {
        Self(entries.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for IndexPath {
    fn from(entries: [usize; N]) -> Self {
        Self(entries.to_vec())
    }
}

impl fmt::Debug for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IndexPath({:?})", self.0)
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for entry in &self.0 {
            if !first {
                f.write_str("/")?;
            }
            write!(f, "{entry}")?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for IndexPath {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        s.split('/')
            .map(|segment| {
                segment
                    .parse::<usize>()
                    .map_err(|_| TypeError::InvalidIndex(segment.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn root_is_empty() {
        let root = IndexPath::root();
        assert!(root.is_root());
        assert_eq!(root.depth(), 0);
        assert_eq!(root.last(), None);
        assert_eq!(root.parent(), None);
        assert_eq!(root, IndexPath::default());
    }

    #[test]
    fn child_does_not_mutate_original() {
        let base = IndexPath::from([2]);
        let deeper = base.child(5);
        assert_eq!(base.as_slice(), &[2]);
        assert_eq!(deeper.as_slice(), &[2, 5]);
        assert_eq!(deeper.parent(), Some(base));
    }

    #[test]
    fn join_concatenates() {
        let a = IndexPath::from([1, 2]);
        let b = IndexPath::from([3]);
        assert_eq!(a.join(&b), IndexPath::from([1, 2, 3]));
        assert_eq!(a.join(&IndexPath::root()), a);
    }

    #[test]
    fn text_form() {
        assert_eq!(IndexPath::from([2, 5]).to_string(), "2/5");
        assert_eq!(IndexPath::root().to_string(), "");
        assert_eq!("0/1/2".parse::<IndexPath>().unwrap(), IndexPath::from([0, 1, 2]));
        assert_eq!("".parse::<IndexPath>().unwrap(), IndexPath::root());
    }

    #[test]
    fn negative_segment_rejected() {
        assert_eq!(
            "1/-3".parse::<IndexPath>(),
            Err(TypeError::InvalidIndex("-3".into()))
        );
        assert!("a".parse::<IndexPath>().is_err());
        assert!("1//2".parse::<IndexPath>().is_err());
    }

    #[test]
    fn serde_is_plain_array() {
        let path = IndexPath::from([4, 0]);
        assert_eq!(serde_json::to_string(&path).unwrap(), "[4,0]");
        assert!(serde_json::from_str::<IndexPath>("[-1]").is_err());
    }

    proptest! {
        #[test]
        fn text_form_parses_back(entries in proptest::collection::vec(0usize..10_000, 0..6)) {
            let path = IndexPath::from(entries);
            let parsed: IndexPath = path.to_string().parse().unwrap();
            prop_assert_eq!(parsed, path);
        }

        #[test]
        fn child_extends_by_one(entries in proptest::collection::vec(0usize..100, 0..6), index in 0usize..100) {
            let path = IndexPath::from(entries);
            let child = path.child(index);
            prop_assert_eq!(child.depth(), path.depth() + 1);
            prop_assert_eq!(child.last(), Some(index));
            prop_assert_eq!(child.parent(), Some(path));
        }
    }
}
