use crate::Error;
use arp_packets::{EthernetFrame, HardwareAddr, Operation, Packet, ARP_ETHER_TYPE};
use std::net::Ipv4Addr;

///
/// A processed ARP request received by a server: the operation plus sender
/// and target addressing, projected out of the decoded packet for handler
/// consumption.
///
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Request {
    pub operation: Operation,
    pub sender_hardware_addr: HardwareAddr,
    pub sender_ip: Ipv4Addr,
    pub target_hardware_addr: HardwareAddr,
    pub target_ip: Ipv4Addr,
}

impl From<Packet> for Request {
    fn from(p: Packet) -> Request {
        Request {
            operation: p.operation,
            sender_hardware_addr: p.sender_hardware_addr,
            sender_ip: p.sender_ip,
            target_hardware_addr: p.target_hardware_addr,
            target_ip: p.target_ip,
        }
    }
}

/// Unmarshals a raw Ethernet frame and the ARP packet it carries into a
/// Request. Frames without the ARP EtherType fail with
/// [`Error::NotArpPacket`]; callers treat that as "ignore this frame".
pub(crate) fn parse_request(buf: &[u8]) -> Result<Request, Error> {
    let frame = EthernetFrame::decapsulate(buf)?;

    if frame.ether_type() != ARP_ETHER_TYPE {
        return Err(Error::NotArpPacket);
    }

    let packet = Packet::unmarshal(frame.payload())?;
    Ok(Request::from(packet))
}
