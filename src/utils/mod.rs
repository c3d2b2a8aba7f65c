//! Shared utilities: IPv4 helpers and field validation.

pub mod ip_utils;
pub mod validation;

pub use validation::{validate_interface_name, validate_link_address, validate_port_range, validate_subnet_address};
