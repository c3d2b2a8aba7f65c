//! Fixtures shared by unit tests.

use crate::scenario::{
    Communication, Direction, Link, Network, Protocol, Router, RouterId, Subnet, SubnetId,
};

/// Build a network with `routers` routers and `subnets` /24 subnets
/// (`10.0.<id>.0/24`) joined by the given `(router, interface, subnet)` links.
pub(crate) fn network(routers: usize, subnets: usize, links: &[(RouterId, &str, SubnetId)]) -> Network {
    Network {
        routers: (0..routers).map(|id| Router { id }).collect(),
        subnets: (0..subnets)
            .map(|id| Subnet {
                id,
                address: format!("10.0.{}.0", id),
                prefix: 24,
            })
            .collect(),
        links: links
            .iter()
            .map(|&(router_id, interface, subnet_id)| Link {
                router_id,
                interface_id: interface.to_string(),
                ip: format!("10.0.{}.{}", subnet_id, router_id + 1),
                subnet_id,
            })
            .collect(),
    }
}

/// Chain `S0 - R0 - S1 - R1 - ... - S(n)`; router `i` uses `eth0` toward
/// subnet `i` and `eth1` toward subnet `i + 1`.
pub(crate) fn chain(routers: usize) -> Network {
    let links: Vec<(RouterId, &str, SubnetId)> = (0..routers)
        .flat_map(|r| [(r, "eth0", r), (r, "eth1", r + 1)])
        .collect();
    network(routers, routers + 1, &links)
}

pub(crate) fn tcp(
    source: SubnetId,
    target: SubnetId,
    sports: (u16, u16),
    dports: (u16, u16),
    direction: Direction,
) -> Communication {
    Communication {
        source_subnet_id: source,
        target_subnet_id: target,
        protocol: Protocol::Tcp,
        source_port_start: sports.0,
        source_port_end: sports.1,
        target_port_start: dports.0,
        target_port_end: dports.1,
        direction,
    }
}

pub(crate) fn icmp(source: SubnetId, target: SubnetId, direction: Direction) -> Communication {
    Communication {
        source_subnet_id: source,
        target_subnet_id: target,
        protocol: Protocol::Icmp,
        source_port_start: 0,
        source_port_end: 0,
        target_port_start: 0,
        target_port_end: 0,
        direction,
    }
}
