//! # iptgen - Per-router firewall rule generation from network intent
//!
//! This library compiles a declarative network description (routers,
//! subnets and the links between them) together with a list of permitted
//! flows into one iptables-restore rule set per router. Every rule set is
//! default-deny; the only accepted traffic is what the flows ask for.
//!
//! ## Overview
//!
//! For every communication the compiler finds the unique path between the
//! source and target subnets and, at each router on that path, emits a
//! stateful FORWARD accept rule bound to the interface facing the source
//! (ingress) and the interface facing the target (egress). Bidirectional
//! flows get a matching rule for the return direction.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - `scenario`: Scenario data model (network + communications) and validation
//! - `scenario_loader`: Scenario file loading and input directory discovery
//! - `topology`: Router/subnet graph, tree validation and path resolution
//! - `rules`: Rule synthesis per path and per-router rule-set rendering
//! - `utils`: IPv4 helpers and field validation
//! - `orchestrator`: Per-scenario pipeline and parallel batch execution
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use iptgen::orchestrator::{run_batch, CompileOptions};
//! use std::path::Path;
//!
//! let report = run_batch(Path::new("scenarios"), Path::new("rules"), &CompileOptions::default())?;
//!
//! // rules/<scenario id>/<router id> now holds each router's rule set
//! println!("{} scenarios compiled", report.succeeded.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Scenario Format
//!
//! ```json
//! {
//!   "network": {
//!     "routers": [{"id": 0}],
//!     "subnets": [{"id": 0, "address": "10.0.0.0", "prefix": 24},
//!                 {"id": 1, "address": "10.0.1.0", "prefix": 24}],
//!     "links": [{"routerId": 0, "interfaceId": "eth0", "ip": "10.0.0.1", "subnetId": 0},
//!               {"routerId": 0, "interfaceId": "eth1", "ip": "10.0.1.1", "subnetId": 1}]
//!   },
//!   "communications": [{
//!     "sourceSubnetId": 0, "targetSubnetId": 1, "protocol": "tcp",
//!     "sourcePortStart": 1024, "sourcePortEnd": 2048,
//!     "targetPortStart": 80, "targetPortEnd": 80,
//!     "direction": "unidirectional"
//!   }]
//! }
//! ```
//!
//! The router/subnet graph must be a tree (or a forest): a topology with
//! more than one path between two subnets is rejected.
//!
//! ## Error Handling
//!
//! Pipeline stages return typed `thiserror` errors; file and batch level
//! functions return `color_eyre` reports carrying the offending path.

pub mod scenario;
pub mod scenario_loader;
pub mod topology;
pub mod rules;
pub mod utils;
pub mod orchestrator;

#[cfg(test)]
mod test_support;
