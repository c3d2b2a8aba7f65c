//! Path resolution over the router/subnet tree.
//!
//! A depth-first walk from the source subnet records, for every node it
//! reaches, the node it was reached from. Walking those parent links back
//! from the target yields the unique path, which is then reversed so it
//! reads source first.

use std::collections::{HashMap, HashSet};

use crate::topology::graph::Topology;
use crate::topology::types::{Node, RouterId, SubnetId};

#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum PathError {
    #[error("subnet {0} does not exist in the topology")]
    UnknownSubnet(SubnetId),
    #[error("no path from subnet {from} to subnet {to}")]
    Unreachable { from: SubnetId, to: SubnetId },
}

/// One router on a path, with the subnets on either side of it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterHop {
    pub router: RouterId,
    /// Subnet nearer the source
    pub prev: SubnetId,
    /// Subnet nearer the target
    pub next: SubnetId,
}

/// Alternating hop sequence `subnet, router, subnet, ..., subnet`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    hops: Vec<Node>,
}

impl Path {
    pub fn hops(&self) -> &[Node] {
        &self.hops
    }

    pub fn source(&self) -> SubnetId {
        self.hops.first().and_then(Node::as_subnet).unwrap_or_default()
    }

    pub fn target(&self) -> SubnetId {
        self.hops.last().and_then(Node::as_subnet).unwrap_or_default()
    }

    /// Number of routers traversed
    pub fn router_count(&self) -> usize {
        self.hops.len() / 2
    }

    /// Router hops in path order, nearest the source first
    pub fn router_hops(&self) -> impl Iterator<Item = RouterHop> + '_ {
        self.hops.windows(3).step_by(2).filter_map(|window| match window {
            [Node::Subnet(prev), Node::Router(router), Node::Subnet(next)] => Some(RouterHop {
                router: *router,
                prev: *prev,
                next: *next,
            }),
            _ => None,
        })
    }
}

/// Depth-first walk from `start`, returning the parent of every reached node.
///
/// The start node has no entry. When `stop` is given the walk ends as soon as
/// that node has been reached. Neighbors are explored in link declaration
/// order.
pub fn traverse(topology: &Topology, start: Node, stop: Option<Node>) -> HashMap<Node, Node> {
    let mut parents = HashMap::new();
    let mut visited = HashSet::from([start]);
    let mut stack = vec![start];

    while let Some(node) = stack.pop() {
        if Some(node) == stop {
            break;
        }
        // Reversed so the first declared neighbor is popped first
        for neighbor in topology.neighbors(node).into_iter().rev() {
            if visited.insert(neighbor) {
                parents.insert(neighbor, node);
                stack.push(neighbor);
            }
        }
    }

    parents
}

/// Find the unique path from `source` to `target`.
///
/// `source == target` gives the single-subnet path with no router hops.
pub fn resolve_path(topology: &Topology, source: SubnetId, target: SubnetId) -> Result<Path, PathError> {
    for subnet in [source, target] {
        if !topology.contains(Node::Subnet(subnet)) {
            return Err(PathError::UnknownSubnet(subnet));
        }
    }

    let start = Node::Subnet(source);
    let goal = Node::Subnet(target);
    if start == goal {
        return Ok(Path { hops: vec![start] });
    }

    let parents = traverse(topology, start, Some(goal));
    let unreachable = PathError::Unreachable { from: source, to: target };

    let mut hops = vec![goal];
    let mut current = goal;
    while current != start {
        current = *parents.get(&current).ok_or_else(|| unreachable.clone())?;
        hops.push(current);
    }
    hops.reverse();

    Ok(Path { hops })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{chain, network};

    /// Star of three routers around subnet 0, each with a leaf subnet,
    /// plus a second tier behind router 2.
    fn branching() -> Topology {
        let net = network(
            4,
            6,
            &[
                (0, "a0", 0),
                (0, "a1", 1),
                (1, "b0", 0),
                (1, "b1", 2),
                (2, "c0", 0),
                (2, "c1", 3),
                (3, "d0", 3),
                (3, "d1", 4),
                (3, "d2", 5),
            ],
        );
        Topology::build(&net).unwrap()
    }

    fn assert_well_formed(path: &Path, source: SubnetId, target: SubnetId) {
        let hops = path.hops();
        assert_eq!(hops.first(), Some(&Node::Subnet(source)));
        assert_eq!(hops.last(), Some(&Node::Subnet(target)));
        for (i, hop) in hops.iter().enumerate() {
            assert_eq!(hop.is_router(), i % 2 == 1, "hop {} of {:?} has wrong kind", i, hops);
        }
        let unique: HashSet<_> = hops.iter().collect();
        assert_eq!(unique.len(), hops.len(), "path {:?} repeats a node", hops);
    }

    #[test]
    fn test_chain_path() {
        let topology = Topology::build(&chain(3)).unwrap();
        let path = resolve_path(&topology, 0, 3).unwrap();

        assert_eq!(
            path.hops(),
            &[
                Node::Subnet(0),
                Node::Router(0),
                Node::Subnet(1),
                Node::Router(1),
                Node::Subnet(2),
                Node::Router(2),
                Node::Subnet(3),
            ]
        );
        assert_eq!(path.router_count(), 3);
        assert_eq!((path.source(), path.target()), (0, 3));

        let hops: Vec<RouterHop> = path.router_hops().collect();
        assert_eq!(hops[0], RouterHop { router: 0, prev: 0, next: 1 });
        assert_eq!(hops[2], RouterHop { router: 2, prev: 2, next: 3 });
    }

    #[test]
    fn test_reverse_direction() {
        let topology = Topology::build(&chain(2)).unwrap();
        let path = resolve_path(&topology, 2, 0).unwrap();
        let hops: Vec<RouterHop> = path.router_hops().collect();
        assert_eq!(
            hops,
            vec![
                RouterHop { router: 1, prev: 2, next: 1 },
                RouterHop { router: 0, prev: 1, next: 0 },
            ]
        );
    }

    #[test]
    fn test_all_pairs_well_formed() {
        let topology = branching();
        for source in 0..6 {
            for target in 0..6 {
                let path = resolve_path(&topology, source, target).unwrap();
                assert_well_formed(&path, source, target);
            }
        }

        let path = resolve_path(&topology, 1, 5).unwrap();
        let routers: Vec<RouterId> = path.router_hops().map(|h| h.router).collect();
        assert_eq!(routers, vec![0, 2, 3]);
    }

    #[test]
    fn test_self_path_has_no_routers() {
        let topology = branching();
        let path = resolve_path(&topology, 4, 4).unwrap();
        assert_eq!(path.hops(), &[Node::Subnet(4)]);
        assert_eq!(path.router_count(), 0);
        assert_eq!(path.router_hops().count(), 0);
    }

    #[test]
    fn test_unreachable_reports_both_subnets() {
        let net = network(2, 4, &[(0, "eth0", 0), (0, "eth1", 1), (1, "eth0", 2), (1, "eth1", 3)]);
        let topology = Topology::build(&net).unwrap();

        let err = resolve_path(&topology, 0, 3).unwrap_err();
        assert_eq!(err, PathError::Unreachable { from: 0, to: 3 });
        assert_eq!(err.to_string(), "no path from subnet 0 to subnet 3");
    }

    #[test]
    fn test_unknown_subnet() {
        let topology = Topology::build(&chain(1)).unwrap();
        assert_eq!(resolve_path(&topology, 0, 9).unwrap_err(), PathError::UnknownSubnet(9));
    }

    #[test]
    fn test_traverse_records_parents() {
        let topology = branching();
        let parents = traverse(&topology, Node::Subnet(0), None);

        // Every node but the start is reached exactly once
        assert_eq!(parents.len(), 4 + 6 - 1);
        assert!(!parents.contains_key(&Node::Subnet(0)));
        assert_eq!(parents[&Node::Router(3)], Node::Subnet(3));
        assert_eq!(parents[&Node::Subnet(5)], Node::Router(3));
    }
}
