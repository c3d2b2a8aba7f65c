//! Topology type definitions.
//!
//! The router/subnet graph is bipartite: every edge joins a router to a
//! subnet. Traversal works over a single tagged node type so one walk can
//! alternate between the two kinds.

use std::fmt;

/// Re-export ids from the scenario model to keep a single definition
pub use crate::scenario::{RouterId, SubnetId};

/// A vertex of the bipartite router/subnet graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Node {
    Router(RouterId),
    Subnet(SubnetId),
}

impl Node {
    /// Returns the router id if this is a router node
    pub fn as_router(&self) -> Option<RouterId> {
        match self {
            Self::Router(id) => Some(*id),
            Self::Subnet(_) => None,
        }
    }

    /// Returns the subnet id if this is a subnet node
    pub fn as_subnet(&self) -> Option<SubnetId> {
        match self {
            Self::Subnet(id) => Some(*id),
            Self::Router(_) => None,
        }
    }

    pub fn is_router(&self) -> bool {
        matches!(self, Self::Router(_))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Router(id) => write!(f, "router {}", id),
            Self::Subnet(id) => write!(f, "subnet {}", id),
        }
    }
}
