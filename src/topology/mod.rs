//! Network topology module.
//!
//! This module contains the router/subnet connectivity graph, the tagged
//! node type it is walked with, and path resolution between subnets.

pub mod types;
pub mod graph;
pub mod path;

// Re-export key types and functions for easier access
pub use types::Node;
pub use graph::{Topology, TopologyError};
pub use path::{resolve_path, Path, PathError, RouterHop};
