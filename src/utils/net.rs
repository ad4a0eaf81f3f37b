//! Local network address helpers.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

/// Public address used only to select an outbound route; no packet is sent.
const ROUTE_PROBE: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)), 80);

/// Source address the OS would use for outbound traffic.
///
/// Connecting a UDP socket only consults the routing table, so this is cheap
/// and works offline as long as a default route exists.
pub fn outbound_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect(ROUTE_PROBE).ok()?;
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) if !ip.is_loopback() && !ip.is_unspecified() => Some(ip),
        _ => None,
    }
}

/// Host to print for LAN access, falling back to `localhost`.
pub fn lan_host() -> String {
    outbound_ipv4().map_or_else(|| "localhost".to_string(), |ip| ip.to_string())
}

/// Host to print for local access for a given bind interface.
pub fn local_host(interface: IpAddr) -> String {
    if interface.is_unspecified() || interface.is_loopback() {
        "localhost".to_string()
    } else {
        interface.to_string()
    }
}
