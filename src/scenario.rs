use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::validation::{
    validate_interface_name, validate_link_address, validate_port_range, validate_subnet_address,
};

/// Dense index of a router within its network
pub type RouterId = usize;

/// Dense index of a subnet within its network
pub type SubnetId = usize;

/// Transport protocol a communication is restricted to
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
}

impl Protocol {
    /// Name used by iptables `-p`
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
            Protocol::Icmp => "icmp",
        }
    }

    /// Whether rules for this protocol carry `--sport`/`--dport` matches
    pub fn has_ports(&self) -> bool {
        matches!(self, Protocol::Tcp | Protocol::Udp)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether return traffic of a communication is permitted as well
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Unidirectional,
    Bidirectional,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Router {
    pub id: RouterId,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Subnet {
    pub id: SubnetId,
    /// IPv4 network address, e.g. "10.0.1.0"
    pub address: String,
    /// CIDR prefix length (0-32)
    pub prefix: u8,
}

impl Subnet {
    /// Network in `address/prefix` notation as used by `-s`/`-d`
    pub fn cidr(&self) -> String {
        format!("{}/{}", self.address, self.prefix)
    }
}

/// Attachment of a router interface to a subnet
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub router_id: RouterId,
    pub interface_id: String,
    /// Address of the router's interface on the subnet
    pub ip: String,
    pub subnet_id: SubnetId,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Network {
    #[serde(default)]
    pub routers: Vec<Router>,
    #[serde(default)]
    pub subnets: Vec<Subnet>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// A flow to permit between two subnets
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Communication {
    pub source_subnet_id: SubnetId,
    pub target_subnet_id: SubnetId,
    pub protocol: Protocol,
    #[serde(default)]
    pub source_port_start: u16,
    #[serde(default)]
    pub source_port_end: u16,
    #[serde(default)]
    pub target_port_start: u16,
    #[serde(default)]
    pub target_port_end: u16,
    pub direction: Direction,
}

impl Communication {
    pub fn is_bidirectional(&self) -> bool {
        self.direction == Direction::Bidirectional
    }
}

/// One scenario document: a network plus the flows to realize on it
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ScenarioInput {
    pub network: Network,
    #[serde(default)]
    pub communications: Vec<Communication>,
}

impl ScenarioInput {
    /// Validate ids, addresses and port ranges.
    ///
    /// Structural properties of the link graph (dangling link ids, duplicate
    /// links, cycles) are checked when the topology is built.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let network = &self.network;

        for (position, router) in network.routers.iter().enumerate() {
            if router.id != position {
                return Err(ValidationError::NonDenseId {
                    kind: "router",
                    position,
                    id: router.id,
                });
            }
        }

        for (position, subnet) in network.subnets.iter().enumerate() {
            if subnet.id != position {
                return Err(ValidationError::NonDenseId {
                    kind: "subnet",
                    position,
                    id: subnet.id,
                });
            }
            validate_subnet_address(&subnet.address, subnet.prefix)
                .map_err(|reason| ValidationError::InvalidSubnet { id: subnet.id, reason })?;
        }

        for (index, link) in network.links.iter().enumerate() {
            validate_interface_name(&link.interface_id)
                .map_err(|reason| ValidationError::InvalidLink { index, reason })?;
            validate_link_address(&link.ip)
                .map_err(|reason| ValidationError::InvalidLink { index, reason })?;
        }

        let subnet_count = network.subnets.len();
        for (index, comm) in self.communications.iter().enumerate() {
            for (role, id) in [("source", comm.source_subnet_id), ("target", comm.target_subnet_id)] {
                if id >= subnet_count {
                    return Err(ValidationError::InvalidCommunication {
                        index,
                        reason: format!("{} subnet {} does not exist", role, id),
                    });
                }
            }

            if comm.protocol.has_ports() {
                validate_port_range(comm.source_port_start, comm.source_port_end)
                    .and_then(|_| validate_port_range(comm.target_port_start, comm.target_port_end))
                    .map_err(|reason| ValidationError::InvalidCommunication { index, reason })?;
            }
        }

        Ok(())
    }

    pub fn router_count(&self) -> usize {
        self.network.routers.len()
    }
}

/// Scenario validation errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{kind} at position {position} has id {id}; ids must match list position")]
    NonDenseId {
        kind: &'static str,
        position: usize,
        id: usize,
    },
    #[error("Invalid subnet {id}: {reason}")]
    InvalidSubnet { id: SubnetId, reason: String },
    #[error("Invalid link #{index}: {reason}")]
    InvalidLink { index: usize, reason: String },
    #[error("Invalid communication #{index}: {reason}")]
    InvalidCommunication { index: usize, reason: String },
}
