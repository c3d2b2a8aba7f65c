//! Router/subnet connectivity graph.
//!
//! Built once per scenario from the network's links. Holds the bipartite
//! adjacency in both directions and the interface index used to name the
//! ingress and egress side of every rule.

use std::collections::HashMap;

use log::debug;

use crate::scenario::Network;
use crate::topology::types::{Node, RouterId, SubnetId};

/// Structural errors in a network's link list
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("link #{link} references router {router}, but the network has {count} routers")]
    UnknownRouter {
        link: usize,
        router: RouterId,
        count: usize,
    },
    #[error("link #{link} references subnet {subnet}, but the network has {count} subnets")]
    UnknownSubnet {
        link: usize,
        subnet: SubnetId,
        count: usize,
    },
    #[error("router {router} is linked to subnet {subnet} more than once (links #{first} and #{second})")]
    DuplicateLink {
        router: RouterId,
        subnet: SubnetId,
        first: usize,
        second: usize,
    },
    #[error("link #{link} between router {router} and subnet {subnet} closes a cycle; the topology must be a tree")]
    Cycle {
        link: usize,
        router: RouterId,
        subnet: SubnetId,
    },
}

/// Adjacency and interface lookup for one network
#[derive(Debug, Clone)]
pub struct Topology {
    /// Router id -> linked subnets, in link declaration order
    router_adj: Vec<Vec<SubnetId>>,
    /// Subnet id -> linked routers, in link declaration order
    subnet_adj: Vec<Vec<RouterId>>,
    /// (router, subnet) -> (interface name, link index)
    interfaces: HashMap<(RouterId, SubnetId), (String, usize)>,
}

impl Topology {
    /// Build the adjacency and interface index from a network's links.
    ///
    /// Rejects links to nonexistent routers or subnets, duplicate
    /// (router, subnet) links, and any link that would close a cycle.
    pub fn build(network: &Network) -> Result<Self, TopologyError> {
        let router_count = network.routers.len();
        let subnet_count = network.subnets.len();

        let mut router_adj: Vec<Vec<SubnetId>> = vec![Vec::new(); router_count];
        let mut subnet_adj: Vec<Vec<RouterId>> = vec![Vec::new(); subnet_count];
        let mut interfaces: HashMap<(RouterId, SubnetId), (String, usize)> =
            HashMap::with_capacity(network.links.len());
        let mut components = DisjointSets::new(router_count + subnet_count);

        for (index, link) in network.links.iter().enumerate() {
            let (router, subnet) = (link.router_id, link.subnet_id);

            if router >= router_count {
                return Err(TopologyError::UnknownRouter { link: index, router, count: router_count });
            }
            if subnet >= subnet_count {
                return Err(TopologyError::UnknownSubnet { link: index, subnet, count: subnet_count });
            }
            if let Some((_, first)) = interfaces.get(&(router, subnet)) {
                return Err(TopologyError::DuplicateLink { router, subnet, first: *first, second: index });
            }

            // Routers occupy [0, R), subnets [R, R + S)
            if !components.union(router, router_count + subnet) {
                return Err(TopologyError::Cycle { link: index, router, subnet });
            }

            router_adj[router].push(subnet);
            subnet_adj[subnet].push(router);
            interfaces.insert((router, subnet), (link.interface_id.clone(), index));
        }

        debug!(
            "Built topology: {} routers, {} subnets, {} links",
            router_count,
            subnet_count,
            interfaces.len()
        );

        Ok(Self { router_adj, subnet_adj, interfaces })
    }

    pub fn router_count(&self) -> usize {
        self.router_adj.len()
    }

    pub fn subnet_count(&self) -> usize {
        self.subnet_adj.len()
    }

    /// Whether the node's id is in range for its kind
    pub fn contains(&self, node: Node) -> bool {
        match node {
            Node::Router(id) => id < self.router_count(),
            Node::Subnet(id) => id < self.subnet_count(),
        }
    }

    /// Subnets a router is attached to
    pub fn subnets_of(&self, router: RouterId) -> &[SubnetId] {
        self.router_adj.get(router).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Routers attached to a subnet
    pub fn routers_of(&self, subnet: SubnetId) -> &[RouterId] {
        self.subnet_adj.get(subnet).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Neighbors of a node; always of the opposite kind
    pub fn neighbors(&self, node: Node) -> Vec<Node> {
        match node {
            Node::Router(id) => self.subnets_of(id).iter().copied().map(Node::Subnet).collect(),
            Node::Subnet(id) => self.routers_of(id).iter().copied().map(Node::Router).collect(),
        }
    }

    /// Name of the router's interface on the given subnet
    pub fn interface(&self, router: RouterId, subnet: SubnetId) -> Option<&str> {
        self.interfaces.get(&(router, subnet)).map(|(name, _)| name.as_str())
    }
}

/// Union-find over router and subnet nodes, used for cycle detection
struct DisjointSets {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSets {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Merge the sets of `a` and `b`; false if they were already joined
    fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{chain, network};

    #[test]
    fn test_build_adjacency() {
        let net = network(2, 3, &[(0, "eth0", 0), (0, "eth1", 1), (1, "ge-0", 1), (1, "ge-1", 2)]);
        let topology = Topology::build(&net).unwrap();

        assert_eq!(topology.router_count(), 2);
        assert_eq!(topology.subnet_count(), 3);
        assert_eq!(topology.subnets_of(0), &[0, 1]);
        assert_eq!(topology.routers_of(1), &[0, 1]);
        assert_eq!(topology.routers_of(2), &[1]);
        assert_eq!(
            topology.neighbors(Node::Subnet(1)),
            vec![Node::Router(0), Node::Router(1)]
        );
    }

    #[test]
    fn test_interface_index() {
        let topology = Topology::build(&chain(2)).unwrap();
        assert_eq!(topology.interface(0, 0), Some("eth0"));
        assert_eq!(topology.interface(0, 1), Some("eth1"));
        assert_eq!(topology.interface(1, 1), Some("eth0"));
        assert_eq!(topology.interface(1, 2), Some("eth1"));
        assert_eq!(topology.interface(0, 2), None);
    }

    #[test]
    fn test_unlinked_nodes_are_allowed() {
        // A forest: subnet 2 and router 1 are isolated
        let net = network(2, 3, &[(0, "eth0", 0), (0, "eth1", 1)]);
        let topology = Topology::build(&net).unwrap();
        assert!(topology.subnets_of(1).is_empty());
        assert!(topology.routers_of(2).is_empty());
        assert!(topology.contains(Node::Router(1)));
        assert!(!topology.contains(Node::Subnet(3)));
    }

    #[test]
    fn test_unknown_ids_rejected() {
        let net = network(1, 1, &[(0, "eth0", 0), (3, "eth1", 0)]);
        assert_eq!(
            Topology::build(&net).unwrap_err(),
            TopologyError::UnknownRouter { link: 1, router: 3, count: 1 }
        );

        let net = network(1, 1, &[(0, "eth0", 4)]);
        assert_eq!(
            Topology::build(&net).unwrap_err(),
            TopologyError::UnknownSubnet { link: 0, subnet: 4, count: 1 }
        );
    }

    #[test]
    fn test_duplicate_link_rejected() {
        let net = network(1, 2, &[(0, "eth0", 0), (0, "eth1", 1), (0, "eth2", 0)]);
        assert_eq!(
            Topology::build(&net).unwrap_err(),
            TopologyError::DuplicateLink { router: 0, subnet: 0, first: 0, second: 2 }
        );
    }

    #[test]
    fn test_cycle_rejected() {
        // Two routers both joining subnets 0 and 1 give two paths S0 -> S1
        let net = network(2, 2, &[(0, "eth0", 0), (0, "eth1", 1), (1, "eth0", 0), (1, "eth1", 1)]);
        let err = Topology::build(&net).unwrap_err();
        assert_eq!(err, TopologyError::Cycle { link: 3, router: 1, subnet: 1 });
        assert!(err.to_string().contains("must be a tree"));
    }
}
