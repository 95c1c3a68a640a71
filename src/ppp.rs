//! Glue between an `embassy-net-ppp` runner and the event boundary.

use embassy_net_ppp::Ipv4Status;
use no_std_net::Ipv4Addr;

use crate::event::{EventLoop, IpEvent, IpInfo, NetEvent};

/// Translate the IPCP result of a PPP session into an IP event.
pub fn ipv4_event(status: &Ipv4Status) -> IpEvent {
    ipcp_event(
        status.address.map(|a| a.0),
        status.peer_address.map(|a| a.0),
        status.dns_servers.map(|dns| dns.map(|a| a.0)),
    )
}

/// PPP links are point to point, so the netmask is a host mask and the peer
/// is the gateway.
fn ipcp_event(
    address: Option<[u8; 4]>,
    peer: Option<[u8; 4]>,
    dns: [Option<[u8; 4]>; 2],
) -> IpEvent {
    let Some(address) = address else {
        warn!("PPP did not provide an IP address.");
        return IpEvent::LostIp;
    };

    IpEvent::GotIp(IpInfo {
        ip: Ipv4Addr::from(address),
        netmask: Ipv4Addr::BROADCAST,
        gateway: peer.map(Ipv4Addr::from).unwrap_or(Ipv4Addr::UNSPECIFIED),
        dns: dns.map(|d| d.map(Ipv4Addr::from)),
    })
}

/// `on_ipv4_up` callback for `embassy_net_ppp::Runner::run`, posting every
/// IPCP result to `events`.
pub fn forward_ipv4_status<'a, const N: usize>(
    events: &'a EventLoop<'a, N>,
) -> impl FnMut(Ipv4Status) + Copy + 'a {
    move |status: Ipv4Status| {
        debug!("IPCP up");
        events.post(&NetEvent::Ip(ipv4_event(&status)));
    }
}
