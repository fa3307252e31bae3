use arp_packets::PacketError;
use std::io;
use thiserror::Error;

/// Errors raised by the ARP client and server.
#[derive(Debug, Error)]
pub enum Error {
    /// A wire codec refused to encode or decode.
    #[error(transparent)]
    Packet(#[from] PacketError),

    /// The frame carried something other than ARP. Receive paths treat
    /// this as "ignore the frame", not as a fault.
    #[error("invalid ARP packet")]
    NotArpPacket,

    /// The configured address source offered no IPv4 address.
    #[error("no IPv4 address available for interface")]
    NoIpv4Addr,

    /// The underlying transport failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}
