use crate::transport::READ_BUF_LEN;
use crate::{Error, Transport};
use arp_packets::{EthernetFrame, HardwareAddr, Operation, Packet, ARP_ETHER_TYPE};
use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

///
/// An ARP client, which can broadcast requests on a [`Transport`] to
/// resolve the hardware address belonging to an IPv4 address.
///
pub struct Client {
    hardware_addr: HardwareAddr,
    ip: Ipv4Addr,
    transport: Arc<dyn Transport>,
}

impl Client {
    ///
    /// Creates a client bound to a local hardware address, the first IPv4
    /// address found in `addrs`, and a transport. Fails with
    /// [`Error::NoIpv4Addr`] when `addrs` holds no IPv4 address.
    ///
    /// The hardware address and candidate addresses come from whatever
    /// interface discovery the caller uses; on Linux the `arp-afpacket`
    /// crate supplies both alongside the transport.
    ///
    pub fn new(
        hardware_addr: HardwareAddr,
        addrs: &[IpAddr],
        transport: Arc<dyn Transport>,
    ) -> Result<Client, Error> {
        let ip = first_ipv4_addr(addrs)?;
        Ok(Client {
            hardware_addr,
            ip,
            transport,
        })
    }

    pub fn hardware_addr(&self) -> &HardwareAddr {
        &self.hardware_addr
    }

    pub fn ip(&self) -> Ipv4Addr {
        self.ip
    }

    ///
    /// Performs an ARP request: broadcasts "who has `ip`?" and blocks until
    /// the matching reply arrives, returning the hardware address it
    /// carries.
    ///
    /// ARP has no transaction id, so the reply is correlated purely by
    /// filtering: frames that are not ARP, not addressed to this client, or
    /// replies about some other exchange are skipped. A transport error
    /// (including an expired read timeout) or an undecodable frame aborts
    /// the call; there is no retry at this layer.
    ///
    pub fn request(&self, ip: Ipv4Addr) -> Result<HardwareAddr, Error> {
        // Ask for `ip` with a broadcast target, from our own addresses
        let packet = Packet::new(
            Operation::Request,
            self.hardware_addr.clone(),
            IpAddr::V4(self.ip),
            HardwareAddr::broadcast(),
            IpAddr::V4(ip),
        )?;
        let payload = packet.marshal();

        let broadcast = HardwareAddr::broadcast();
        let frame =
            EthernetFrame::encapsulate(&broadcast, &self.hardware_addr, ARP_ETHER_TYPE, &payload)?;
        self.transport.send(&frame, &broadcast)?;

        let mut buf = vec![0u8; READ_BUF_LEN];
        loop {
            let (n, _peer) = self.transport.receive(&mut buf)?;
            let frame = EthernetFrame::decapsulate(&buf[..n])?;

            if frame.ether_type() != ARP_ETHER_TYPE {
                continue;
            }
            // Ignore frames not addressed to us
            if frame.dest_mac() != &self.hardware_addr {
                continue;
            }

            let reply = Packet::unmarshal(frame.payload())?;
            if reply.operation != Operation::Reply {
                continue;
            }
            // Someone else's exchange
            if reply.target_ip != self.ip || reply.target_hardware_addr != self.hardware_addr {
                continue;
            }

            trace!(ip = %ip, hardware_addr = %reply.sender_hardware_addr, "resolved");
            return Ok(reply.sender_hardware_addr);
        }
    }

    /// Bounds future receive loop reads; an expired timeout surfaces as the
    /// transport's I/O error from [`Client::request`].
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.transport.set_read_timeout(timeout)
    }

    /// Bounds future request sends.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.transport.set_write_timeout(timeout)
    }

    /// Closes the underlying transport, stopping all ARP traffic.
    pub fn close(&self) -> io::Result<()> {
        self.transport.close()
    }
}

/// Picks the first IPv4 address out of a set of candidate addresses.
fn first_ipv4_addr(addrs: &[IpAddr]) -> Result<Ipv4Addr, Error> {
    addrs
        .iter()
        .find_map(|addr| match addr {
            IpAddr::V4(v4) => Some(*v4),
            IpAddr::V6(_) => None,
        })
        .ok_or(Error::NoIpv4Addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_ipv4_addr_skips_ipv6() {
        let addrs = vec![
            IpAddr::V6("fe80::1".parse().unwrap()),
            IpAddr::V4(Ipv4Addr::new(192, 168, 1, 10)),
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
        ];
        assert_eq!(
            first_ipv4_addr(&addrs).unwrap(),
            Ipv4Addr::new(192, 168, 1, 10)
        );
    }

    #[test]
    fn first_ipv4_addr_requires_ipv4() {
        let addrs = vec![IpAddr::V6("fe80::1".parse().unwrap())];
        assert!(matches!(first_ipv4_addr(&addrs), Err(Error::NoIpv4Addr)));
        assert!(matches!(first_ipv4_addr(&[]), Err(Error::NoIpv4Addr)));
    }
}
