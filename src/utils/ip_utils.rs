//! IPv4 helpers used by scenario validation.

use std::net::Ipv4Addr;

/// Longest valid IPv4 prefix
pub const MAX_IPV4_PREFIX: u8 = 32;

/// Check if a string is a valid IPv4 address
pub fn is_valid_ipv4(ip: &str) -> bool {
    ip.parse::<Ipv4Addr>().is_ok()
}

/// Netmask for a prefix length, e.g. 24 -> 255.255.255.0
pub fn prefix_to_mask(prefix: u8) -> Result<u32, String> {
    match prefix {
        0 => Ok(0),
        1..=MAX_IPV4_PREFIX => Ok(u32::MAX << (32 - u32::from(prefix))),
        _ => Err(format!("prefix /{} out of valid range (must be 0-32)", prefix)),
    }
}

/// Check whether an address has bits set outside its network prefix
pub fn host_bits_set(address: &str, prefix: u8) -> Result<bool, String> {
    let addr = address
        .parse::<Ipv4Addr>()
        .map_err(|_| "Invalid IPv4 address".to_string())?;
    let mask = prefix_to_mask(prefix)?;
    Ok(u32::from(addr) & !mask != 0)
}
