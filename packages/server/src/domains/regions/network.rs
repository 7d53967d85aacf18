use std::net::IpAddr;

use ipnet::IpNet;
use lazy_static::lazy_static;

lazy_static! {
    /// Address blocks assigned to Kurdistan Region ISPs.
    static ref KURDISTAN_RANGES: Vec<IpNet> = ["104.28.0.0/20", "185.11.0.0/20", "37.237.0.0/16"]
        .iter()
        .filter_map(|cidr| cidr.parse().ok())
        .collect();
}

/// Whether an address string falls inside a Kurdistan range. Malformed
/// addresses are never Kurdistan.
pub fn is_kurdistan_ip(ip: &str) -> bool {
    ip.trim()
        .parse::<IpAddr>()
        .map(|addr| is_kurdistan_addr(&addr))
        .unwrap_or(false)
}

pub fn is_kurdistan_addr(addr: &IpAddr) -> bool {
    KURDISTAN_RANGES.iter().any(|net| net.contains(addr))
}
