//! Firewall rule generation.
//!
//! `synth` builds the FORWARD rules for one communication along its path;
//! `ruleset` collects them per router and renders iptables-restore documents.

pub mod ruleset;
pub mod synth;

pub use ruleset::{render_ruleset, RuleBook};
pub use synth::{synthesize_rules, ConnState, PortMatch, PortRange, Rule, RuleError};
