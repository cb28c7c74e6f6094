//! IP reputation check
//!
//! Payments in this deployment always originate from routable public
//! addresses; private, loopback, and reserved ranges indicate header
//! spoofing or a misconfigured proxy and are treated as suspicious.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Whether the source address falls in a non-routable or reserved range
///
/// Unparseable input is suspicious by definition.
pub fn is_suspicious_ip(ip: &str) -> bool {
    match ip.trim().parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => is_suspicious_v4(&v4),
        Ok(IpAddr::V6(v6)) => is_suspicious_v6(&v6),
        Err(_) => true,
    }
}

fn is_suspicious_v4(ip: &Ipv4Addr) -> bool {
    let octets = ip.octets();

    ip.is_unspecified()
        || ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_broadcast()
        || ip.is_documentation()
        // Carrier-grade NAT, 100.64.0.0/10
        || (octets[0] == 100 && (octets[1] & 0xc0) == 64)
        // Reserved, 240.0.0.0/4
        || octets[0] >= 240
}

fn is_suspicious_v6(ip: &Ipv6Addr) -> bool {
    let segments = ip.segments();

    ip.is_unspecified()
        || ip.is_loopback()
        // Unique local, fc00::/7
        || (segments[0] & 0xfe00) == 0xfc00
        // Link local, fe80::/10
        || (segments[0] & 0xffc0) == 0xfe80
}
