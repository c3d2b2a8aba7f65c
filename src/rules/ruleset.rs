//! Per-router rule accumulation and rule-set rendering.

use crate::rules::synth::Rule;
use crate::scenario::RouterId;

/// Preamble of every rule set: a permissive, empty nat table followed by a
/// filter table that drops everything by default.
const RULESET_HEADER: &str = "*nat
:OUTPUT ACCEPT [0:0]
:PREROUTING ACCEPT [0:0]
:POSTROUTING ACCEPT [0:0]

COMMIT

*filter
:INPUT DROP [0:0]
:OUTPUT DROP [0:0]
:FORWARD DROP [0:0]
";

const RULESET_FOOTER: &str = "\nCOMMIT\n";

/// Ordered rule buffer for every router of a scenario
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleBook {
    buffers: Vec<Vec<Rule>>,
}

impl RuleBook {
    /// An empty book with one buffer per router
    pub fn new(router_count: usize) -> Self {
        Self {
            buffers: vec![Vec::new(); router_count],
        }
    }

    pub fn router_count(&self) -> usize {
        self.buffers.len()
    }

    /// Append one rule to a router's buffer.
    ///
    /// Returns false, leaving the book unchanged, if the router is unknown.
    pub fn push(&mut self, router: RouterId, rule: Rule) -> bool {
        match self.buffers.get_mut(router) {
            Some(buffer) => {
                buffer.push(rule);
                true
            }
            None => false,
        }
    }

    /// Append a communication's rules, preserving their order
    pub fn extend<I>(&mut self, rules: I) -> usize
    where
        I: IntoIterator<Item = (RouterId, Rule)>,
    {
        let mut appended = 0;
        for (router, rule) in rules {
            if self.push(router, rule) {
                appended += 1;
            }
        }
        appended
    }

    pub fn rules_for(&self, router: RouterId) -> &[Rule] {
        self.buffers.get(router).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn total_rules(&self) -> usize {
        self.buffers.iter().map(Vec::len).sum()
    }

    /// Complete rule-set document for one router
    pub fn render(&self, router: RouterId) -> String {
        render_ruleset(self.rules_for(router))
    }

    /// Documents for every router in id order, including routers with no rules
    pub fn documents(&self) -> impl Iterator<Item = (RouterId, String)> + '_ {
        (0..self.buffers.len()).map(move |router| (router, self.render(router)))
    }
}

/// Wrap ACCEPT rules in the default-deny skeleton
pub fn render_ruleset(rules: &[Rule]) -> String {
    let mut document = String::from(RULESET_HEADER);
    for rule in rules {
        document.push_str(&rule.to_string());
        document.push('\n');
    }
    document.push_str(RULESET_FOOTER);
    document
}
