//! Local network helpers
//!
//! Used by the binaries to show the address other devices should send to,
//! and to warn when no network route exists. Nothing here ever blocks a
//! transfer: a LAN without a gateway, or a peer on this machine, still works.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

/// Probe destination used to pick the outbound interface
///
/// Connecting a UDP socket sends nothing; it only asks the OS for a route.
const ROUTE_PROBE_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)), 80);

/// Address other devices on the network would use to reach this one
///
/// Returns `None` when there is no non-loopback route.
pub fn local_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect(ROUTE_PROBE_ADDR).ok()?;
    let ip = socket.local_addr().ok()?.ip();

    if ip.is_loopback() || ip.is_unspecified() {
        log::debug!("No usable local address (route probe gave {ip})");
        return None;
    }
    Some(ip)
}

/// Whether the device has a route off this machine
///
/// Advisory only. A LAN without a default gateway reports false here even
/// though peers on it are reachable.
pub fn is_connected() -> bool {
    local_ip().is_some()
}

/// Whether `host` names this machine, so no network is needed to reach it
///
/// Accepts `localhost` and loopback literals, bracketed IPv6 included.
pub fn is_loopback_host(host: &str) -> bool {
    let host = host.trim();
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .is_ok_and(|ip| ip.is_loopback())
}

/// Whether to warn that peers may be unreachable
///
/// A loopback target never needs the network, so only other targets are
/// checked against [`is_connected`].
pub fn should_warn_offline(target_is_loopback: bool) -> bool {
    !target_is_loopback && !is_connected()
}

/// Address to show users for a receiver bound to `bound`
///
/// A wildcard bind is replaced by [`local_ip`] when one is available.
pub fn display_addr(bound: SocketAddr) -> SocketAddr {
    if bound.ip().is_unspecified()
        && let Some(ip) = local_ip()
    {
        return SocketAddr::new(ip, bound.port());
    }
    bound
}
