//! Stable ID newtype for registered classes and interfaces.
//!
//! A [`ClassId`] is a thin wrapper over `u32` so that a class handle cannot be
//! confused with any other integer index.

use std::fmt;

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

/// Class or interface identity within a [`ClassRegistry`](crate::ClassRegistry).
/// Maps to a petgraph `NodeIndex<u32>` in the inheritance graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassId(pub u32);

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

// Bridge between ClassId and petgraph's NodeIndex<u32>.

impl From<NodeIndex<u32>> for ClassId {
    fn from(idx: NodeIndex<u32>) -> Self {
        ClassId(idx.index() as u32)
    }
}

impl From<ClassId> for NodeIndex<u32> {
    fn from(id: ClassId) -> Self {
        NodeIndex::new(id.0 as usize)
    }
}
