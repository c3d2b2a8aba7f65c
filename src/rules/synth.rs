//! Rule synthesis.
//!
//! Turns one communication and its resolved path into the FORWARD rules
//! each router on the path needs. For every router hop the ingress
//! interface faces the subnet nearer the source and the egress interface
//! faces the subnet nearer the target.

use std::fmt;

use crate::scenario::{Communication, Protocol, RouterId, Subnet, SubnetId};
use crate::topology::{Path, RouterHop, Topology};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("router {router} has no interface on subnet {subnet}")]
    MissingInterface { router: RouterId, subnet: SubnetId },
    #[error("subnet {0} is not defined in the network")]
    UnknownSubnet(SubnetId),
}

/// Connection-tracking states a rule accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    /// Packets opening or continuing a flow
    NewEstablished,
    /// Packets of an already established flow only
    Established,
}

impl ConnState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnState::NewEstablished => "NEW,ESTABLISHED",
            ConnState::Established => "ESTABLISHED",
        }
    }
}

/// Inclusive port range, rendered as `start:end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    pub start: u16,
    pub end: u16,
}

impl PortRange {
    pub fn new(start: u16, end: u16) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// Source and destination port match of a tcp/udp rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortMatch {
    pub sport: PortRange,
    pub dport: PortRange,
}

/// One `-A FORWARD ... -j ACCEPT` rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub protocol: Protocol,
    /// `None` for icmp
    pub ports: Option<PortMatch>,
    /// Source network in CIDR notation
    pub source: String,
    /// Destination network in CIDR notation
    pub destination: String,
    pub ingress: String,
    pub egress: String,
    pub state: ConnState,
}

impl Rule {
    /// The rule matching replies to this one: addresses, ports and
    /// interfaces swapped.
    pub fn reversed(&self, state: ConnState) -> Rule {
        Rule {
            protocol: self.protocol,
            ports: self.ports.map(|p| PortMatch { sport: p.dport, dport: p.sport }),
            source: self.destination.clone(),
            destination: self.source.clone(),
            ingress: self.egress.clone(),
            egress: self.ingress.clone(),
            state,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-A FORWARD -p {}", self.protocol)?;
        if let Some(ports) = &self.ports {
            write!(f, " --sport {} --dport {}", ports.sport, ports.dport)?;
        }
        write!(
            f,
            " -s {} -d {} -i {} -o {} -m state --state {} -j ACCEPT",
            self.source,
            self.destination,
            self.ingress,
            self.egress,
            self.state.as_str()
        )
    }
}

/// Rules for one communication, tagged with the router that carries them.
///
/// Hops come in path order; at each hop the forward rule precedes the
/// reverse rule of a bidirectional flow. A communication from a subnet to
/// itself crosses no router and yields nothing.
pub fn synthesize_rules(
    comm: &Communication,
    path: &Path,
    subnets: &[Subnet],
    topology: &Topology,
) -> Result<Vec<(RouterId, Rule)>, RuleError> {
    let source = subnet_cidr(subnets, comm.source_subnet_id)?;
    let destination = subnet_cidr(subnets, comm.target_subnet_id)?;

    let ports = comm.protocol.has_ports().then(|| PortMatch {
        sport: PortRange::new(comm.source_port_start, comm.source_port_end),
        dport: PortRange::new(comm.target_port_start, comm.target_port_end),
    });

    // icmp replies are tracked as new exchanges, so they may open state too
    let reverse_state = match comm.protocol {
        Protocol::Tcp | Protocol::Udp => ConnState::Established,
        Protocol::Icmp => ConnState::NewEstablished,
    };

    let mut rules = Vec::with_capacity(path.router_count() * 2);
    for hop in path.router_hops() {
        let (ingress, egress) = hop_interfaces(topology, &hop)?;
        let forward = Rule {
            protocol: comm.protocol,
            ports,
            source: source.clone(),
            destination: destination.clone(),
            ingress: ingress.to_string(),
            egress: egress.to_string(),
            state: ConnState::NewEstablished,
        };

        if comm.is_bidirectional() {
            let reverse = forward.reversed(reverse_state);
            rules.push((hop.router, forward));
            rules.push((hop.router, reverse));
        } else {
            rules.push((hop.router, forward));
        }
    }

    Ok(rules)
}

fn subnet_cidr(subnets: &[Subnet], id: SubnetId) -> Result<String, RuleError> {
    subnets
        .get(id)
        .map(Subnet::cidr)
        .ok_or(RuleError::UnknownSubnet(id))
}

fn hop_interfaces<'a>(topology: &'a Topology, hop: &RouterHop) -> Result<(&'a str, &'a str), RuleError> {
    let lookup = |subnet| {
        topology
            .interface(hop.router, subnet)
            .ok_or(RuleError::MissingInterface { router: hop.router, subnet })
    };
    Ok((lookup(hop.prev)?, lookup(hop.next)?))
}
