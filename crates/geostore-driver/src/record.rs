//! Stored feature records.
//!
//! A [`FeatureRecord`] is what the bundled backends keep per identifier: a
//! geometry tree plus the attribute bag. The tree is made of coordinate
//! sequences (points, line strings, rings) and collections of nodes
//! (polygons, multi-geometries, geometry collections), addressed by the
//! entries of an index path.
//!
//! Addressing rules:
//! - a fresh record holds an empty coordinate sequence;
//! - descending into an empty coordinate sequence on a write promotes it to
//!   an empty collection;
//! - on a creating write, an entry equal to the member count appends a new
//!   member, and every level below it is created as well (its entries must
//!   then be `0`);
//! - anything else out of range fails with `IndexOutOfRange`.
//!
//! Every mutating operation validates its path before touching the tree, so
//! a failed write leaves the record unchanged.

use geo::{BoundingRect, Coord, LineString, Rect};
use geostore_types::Attributes;
use serde::{Deserialize, Serialize};

use crate::error::{DriverError, DriverResult};

/// Shape of a geometry node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Coordinates,
    Collection,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Coordinates => write!(f, "coordinates"),
            Self::Collection => write!(f, "collection"),
        }
    }
}

/// One node of a stored geometry tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryNode {
    Coordinates(Vec<Coord<f64>>),
    Collection(Vec<GeometryNode>),
}

impl Default for GeometryNode {
    fn default() -> Self {
        Self::empty()
    }
}

fn descend_into_sequence() -> DriverError {
    DriverError::unsupported("descend into a coordinate sequence")
}

fn coordinates_of_collection() -> DriverError {
    DriverError::unsupported("coordinate access on a collection")
}

fn split_slot(path: &[usize]) -> DriverResult<(&[usize], usize)> {
    match path.split_last() {
        Some((&slot, node)) => Ok((node, slot)),
        None => Err(DriverError::unsupported(
            "coordinate operation without a coordinate index",
        )),
    }
}

impl GeometryNode {
    /// An empty coordinate sequence.
    pub fn empty() -> Self {
        Self::Coordinates(Vec::new())
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Coordinates(_) => NodeKind::Coordinates,
            Self::Collection(_) => NodeKind::Collection,
        }
    }

    /// Number of direct members; `0` for a coordinate sequence.
    pub fn member_count(&self) -> usize {
        match self {
            Self::Coordinates(_) => 0,
            Self::Collection(members) => members.len(),
        }
    }

    /// Number of coordinates at or below this node.
    pub fn coordinate_count(&self) -> usize {
        match self {
            Self::Coordinates(coords) => coords.len(),
            Self::Collection(members) => members.iter().map(Self::coordinate_count).sum(),
        }
    }

    /// All coordinates at or below this node, depth first.
    pub fn coordinates(&self) -> Vec<Coord<f64>> {
        let mut out = Vec::with_capacity(self.coordinate_count());
        self.collect_coordinates(&mut out);
        out
    }

    fn collect_coordinates(&self, out: &mut Vec<Coord<f64>>) {
        match self {
            Self::Coordinates(coords) => out.extend_from_slice(coords),
            Self::Collection(members) => {
                for member in members {
                    member.collect_coordinates(out);
                }
            }
        }
    }

    /// Bounding box of all coordinates at or below this node.
    pub fn envelope(&self) -> Option<Rect<f64>> {
        LineString::new(self.coordinates()).bounding_rect()
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// The existing node at `path`.
    pub fn node(&self, path: &[usize]) -> DriverResult<&GeometryNode> {
        let mut node = self;
        for &index in path {
            node = match node {
                Self::Collection(members) => members.get(index).ok_or(
                    DriverError::IndexOutOfRange {
                        index,
                        len: members.len(),
                    },
                )?,
                Self::Coordinates(coords) if coords.is_empty() => {
                    return Err(DriverError::IndexOutOfRange { index, len: 0 })
                }
                Self::Coordinates(_) => return Err(descend_into_sequence()),
            };
        }
        Ok(node)
    }

    fn node_mut(&mut self, path: &[usize]) -> DriverResult<&mut GeometryNode> {
        let mut node = self;
        for &index in path {
            node = match node {
                Self::Collection(members) => {
                    let len = members.len();
                    members
                        .get_mut(index)
                        .ok_or(DriverError::IndexOutOfRange { index, len })?
                }
                Self::Coordinates(coords) if coords.is_empty() => {
                    return Err(DriverError::IndexOutOfRange { index, len: 0 })
                }
                Self::Coordinates(_) => return Err(descend_into_sequence()),
            };
        }
        Ok(node)
    }

    /// Check that a creating write may address `path`.
    fn check_create_path(&self, path: &[usize]) -> DriverResult<()> {
        let mut node = self;
        for (depth, &index) in path.iter().enumerate() {
            let members: &[GeometryNode] = match node {
                Self::Collection(members) => members.as_slice(),
                Self::Coordinates(coords) if coords.is_empty() => &[],
                Self::Coordinates(_) => return Err(descend_into_sequence()),
            };
            match members.get(index) {
                Some(member) => node = member,
                None if index == members.len() => {
                    // Everything below a new member is new as well.
                    return match path[depth + 1..].iter().find(|&&i| i != 0) {
                        Some(&index) => Err(DriverError::IndexOutOfRange { index, len: 0 }),
                        None => Ok(()),
                    };
                }
                None => {
                    return Err(DriverError::IndexOutOfRange {
                        index,
                        len: members.len(),
                    })
                }
            }
        }
        Ok(())
    }

    /// The node at `path`, promoting empty sequences and appending a last
    /// member as needed.
    fn node_for_create(&mut self, path: &[usize]) -> DriverResult<&mut GeometryNode> {
        self.check_create_path(path)?;
        let mut node = self;
        for &index in path {
            if matches!(node, Self::Coordinates(coords) if coords.is_empty()) {
                *node = Self::Collection(Vec::new());
            }
            node = match node {
                Self::Collection(members) => {
                    let len = members.len();
                    if index == len {
                        members.push(Self::empty());
                    }
                    members
                        .get_mut(index)
                        .ok_or(DriverError::IndexOutOfRange { index, len })?
                }
                Self::Coordinates(_) => return Err(descend_into_sequence()),
            };
        }
        Ok(node)
    }

    fn sequence(&self, path: &[usize]) -> DriverResult<&Vec<Coord<f64>>> {
        match self.node(path)? {
            Self::Coordinates(coords) => Ok(coords),
            Self::Collection(_) => Err(coordinates_of_collection()),
        }
    }

    fn sequence_mut(&mut self, path: &[usize]) -> DriverResult<&mut Vec<Coord<f64>>> {
        match self.node_mut(path)? {
            Self::Coordinates(coords) => Ok(coords),
            Self::Collection(_) => Err(coordinates_of_collection()),
        }
    }

    fn sequence_for_create(&mut self, path: &[usize]) -> DriverResult<&mut Vec<Coord<f64>>> {
        match self.node_for_create(path)? {
            Self::Coordinates(coords) => Ok(coords),
            Self::Collection(_) => Err(coordinates_of_collection()),
        }
    }

    // -----------------------------------------------------------------------
    // Slot operations (path = node path + coordinate index)
    // -----------------------------------------------------------------------

    pub fn coordinate(&self, path: &[usize]) -> DriverResult<Coord<f64>> {
        let (node, slot) = split_slot(path)?;
        let coords = self.sequence(node)?;
        coords.get(slot).copied().ok_or(DriverError::IndexOutOfRange {
            index: slot,
            len: coords.len(),
        })
    }

    pub fn insert_coordinate(&mut self, path: &[usize], coord: Coord<f64>) -> DriverResult<()> {
        let (node, slot) = split_slot(path)?;
        let coords = self.sequence_mut(node)?;
        if slot > coords.len() {
            return Err(DriverError::IndexOutOfRange {
                index: slot,
                len: coords.len(),
            });
        }
        coords.insert(slot, coord);
        Ok(())
    }

    pub fn set_coordinate(&mut self, path: &[usize], coord: Coord<f64>) -> DriverResult<()> {
        let (node, slot) = split_slot(path)?;
        let coords = self.sequence_mut(node)?;
        let len = coords.len();
        let target = coords
            .get_mut(slot)
            .ok_or(DriverError::IndexOutOfRange { index: slot, len })?;
        *target = coord;
        Ok(())
    }

    pub fn remove_coordinate(&mut self, path: &[usize]) -> DriverResult<()> {
        let (node, slot) = split_slot(path)?;
        let coords = self.sequence_mut(node)?;
        if slot >= coords.len() {
            return Err(DriverError::IndexOutOfRange {
                index: slot,
                len: coords.len(),
            });
        }
        coords.remove(slot);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Node operations
    // -----------------------------------------------------------------------

    pub fn append_coordinates(&mut self, path: &[usize], new: &[Coord<f64>]) -> DriverResult<()> {
        self.sequence_for_create(path)?.extend_from_slice(new);
        Ok(())
    }

    pub fn replace_coordinates(&mut self, path: &[usize], new: &[Coord<f64>]) -> DriverResult<()> {
        let coords = self.sequence_mut(path)?;
        coords.clear();
        coords.extend_from_slice(new);
        Ok(())
    }

    /// Clear the contents of the node at `path`.
    pub fn clear(&mut self, path: &[usize]) -> DriverResult<()> {
        match self.node_mut(path)? {
            Self::Coordinates(coords) => coords.clear(),
            Self::Collection(members) => members.clear(),
        }
        Ok(())
    }
}

/// Everything a backend stores for one feature.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub geometry: GeometryNode,
    #[serde(default)]
    pub attributes: Attributes,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }
}
