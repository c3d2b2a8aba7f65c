//! Scenario validation utilities.
//!
//! This module provides the field-level checks used when validating a
//! scenario document. Each check returns a human-readable reason on failure
//! so the caller can attach the offending entity.

use crate::utils::ip_utils::{host_bits_set, is_valid_ipv4, MAX_IPV4_PREFIX};

/// Validate a subnet's network address and prefix length
///
/// Checks for:
/// - A well-formed dotted-quad IPv4 address
/// - A prefix length between 0 and 32
///
/// An address with host bits set is accepted (the rule text carries it as
/// written) but logged, since iptables masks it silently.
///
/// # Examples
/// ```
/// use iptgen::utils::validation::validate_subnet_address;
///
/// assert!(validate_subnet_address("10.0.1.0", 24).is_ok());
/// assert!(validate_subnet_address("10.0.1.0", 33).is_err());
/// assert!(validate_subnet_address("10.0.1", 24).is_err());
/// ```
pub fn validate_subnet_address(address: &str, prefix: u8) -> Result<(), String> {
    if !is_valid_ipv4(address) {
        return Err(format!("'{}' is not a valid IPv4 address", address));
    }

    if prefix > MAX_IPV4_PREFIX {
        return Err(format!("prefix /{} out of valid range (must be 0-32)", prefix));
    }

    if host_bits_set(address, prefix)? {
        log::warn!(
            "Subnet address {}/{} has host bits set; iptables will mask it to the network address",
            address, prefix
        );
    }

    Ok(())
}

/// Validate the interface address of a link
pub fn validate_link_address(ip: &str) -> Result<(), String> {
    if is_valid_ipv4(ip) {
        Ok(())
    } else {
        Err(format!("'{}' is not a valid IPv4 address", ip))
    }
}

/// Longest interface name the kernel accepts (IFNAMSIZ minus the NUL)
pub const MAX_INTERFACE_NAME_LEN: usize = 15;

/// Validate an interface name before it is written into `-i`/`-o`
///
/// Rejects empty names, names longer than 15 bytes, and names containing
/// whitespace, control characters or `/`, none of which the kernel allows.
///
/// # Examples
/// ```
/// use iptgen::utils::validation::validate_interface_name;
///
/// assert!(validate_interface_name("eth0").is_ok());
/// assert!(validate_interface_name("eth0 -j ACCEPT").is_err());
/// ```
pub fn validate_interface_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("interfaceId cannot be empty".to_string());
    }
    if name.len() > MAX_INTERFACE_NAME_LEN {
        return Err(format!(
            "interface name {:?} is longer than {} bytes",
            name, MAX_INTERFACE_NAME_LEN
        ));
    }
    if let Some(c) = name.chars().find(|c| c.is_whitespace() || c.is_control() || *c == '/') {
        return Err(format!("interface name {:?} contains invalid character {:?}", name, c));
    }
    Ok(())
}

/// Validate an inclusive port range
///
/// # Examples
/// ```
/// use iptgen::utils::validation::validate_port_range;
///
/// assert!(validate_port_range(80, 80).is_ok());
/// assert!(validate_port_range(2048, 1024).is_err());
/// ```
pub fn validate_port_range(start: u16, end: u16) -> Result<(), String> {
    if start > end {
        return Err(format!("port range {}:{} is inverted", start, end));
    }
    Ok(())
}
