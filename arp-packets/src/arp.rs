use crate::{HardwareAddr, PacketError, IPV4_ETHER_TYPE};
use std::convert::TryInto;
use std::net::{IpAddr, Ipv4Addr};

/// An ARP operation, such as request or reply.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Operation {
    Request,
    Reply,
    /// An operation code this crate does not interpret, carried as-is.
    Other(u16),
}

impl From<u16> for Operation {
    fn from(value: u16) -> Operation {
        match value {
            1 => Operation::Request,
            2 => Operation::Reply,
            other => Operation::Other(other),
        }
    }
}

impl Operation {
    pub fn as_u16(self) -> u16 {
        match self {
            Operation::Request => 1,
            Operation::Reply => 2,
            Operation::Other(other) => other,
        }
    }
}

// hardware type 1 = Ethernet (10Mb), the conventional value for
// locally constructed packets
const ETHERNET_HARDWARE_TYPE: u16 = 1;

const FIXED_HEADER_LEN: usize = 8;

///
/// A raw ARP packet, as described in RFC 826
/// https://tools.ietf.org/html/rfc826
///
/// The two length fields are declared, not assumed: they are populated from
/// the validated operand lengths at construction and checked against the
/// real buffer length when decoding.
///
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Packet {
    /// IANA-assigned hardware type.
    pub hardware_type: u16,
    /// Internetwork protocol the request is intended for; the IPv4
    /// EtherType for packets built by this crate.
    pub protocol_type: u16,
    /// Length of the sender and target hardware addresses.
    pub hardware_addr_len: u8,
    /// Length of the sender and target protocol addresses.
    pub protocol_addr_len: u8,
    pub operation: Operation,
    pub sender_hardware_addr: HardwareAddr,
    pub sender_ip: Ipv4Addr,
    pub target_hardware_addr: HardwareAddr,
    pub target_ip: Ipv4Addr,
}

impl Packet {
    ///
    /// Creates a new Packet from an operation and sender/target address
    /// pairs.
    ///
    /// Fails with `InvalidHardwareAddr` if either hardware address is empty
    /// or the two disagree in length, and with `InvalidIp` if either IP
    /// address is not IPv4.
    ///
    pub fn new(
        operation: Operation,
        sender_hardware_addr: HardwareAddr,
        sender_ip: IpAddr,
        target_hardware_addr: HardwareAddr,
        target_ip: IpAddr,
    ) -> Result<Packet, PacketError> {
        if sender_hardware_addr.is_empty() || target_hardware_addr.is_empty() {
            return Err(PacketError::InvalidHardwareAddr);
        }
        // Equal lengths, not necessarily 6: this is what permits
        // non-Ethernet fabrics while still catching configuration errors.
        if sender_hardware_addr.len() != target_hardware_addr.len() {
            return Err(PacketError::InvalidHardwareAddr);
        }

        let sender_ip = as_ipv4(sender_ip)?;
        let target_ip = as_ipv4(target_ip)?;

        Ok(Packet {
            hardware_type: ETHERNET_HARDWARE_TYPE,
            protocol_type: IPV4_ETHER_TYPE,
            hardware_addr_len: sender_hardware_addr.len() as u8,
            protocol_addr_len: 4,
            operation,
            sender_hardware_addr,
            sender_ip,
            target_hardware_addr,
            target_ip,
        })
    }

    ///
    /// Serializes the packet to its wire form, big-endian throughout:
    ///
    /// 2 bytes: hardware type
    /// 2 bytes: protocol type
    /// 1 byte : hardware address length
    /// 1 byte : protocol address length
    /// 2 bytes: operation
    /// N bytes: sender hardware address
    /// 4 bytes: sender protocol address
    /// N bytes: target hardware address
    /// 4 bytes: target protocol address
    ///
    pub fn marshal(&self) -> Vec<u8> {
        let hlen = self.hardware_addr_len as usize;
        let plen = self.protocol_addr_len as usize;

        let mut b = Vec::with_capacity(FIXED_HEADER_LEN + 2 * hlen + 2 * plen);
        b.extend_from_slice(&self.hardware_type.to_be_bytes());
        b.extend_from_slice(&self.protocol_type.to_be_bytes());
        b.push(self.hardware_addr_len);
        b.push(self.protocol_addr_len);
        b.extend_from_slice(&self.operation.as_u16().to_be_bytes());
        b.extend_from_slice(self.sender_hardware_addr.as_bytes());
        b.extend_from_slice(&self.sender_ip.octets());
        b.extend_from_slice(self.target_hardware_addr.as_bytes());
        b.extend_from_slice(&self.target_ip.octets());
        b
    }

    ///
    /// Decodes a packet from its wire form. Trailing bytes beyond the
    /// declared total length (link-layer padding) are ignored. Every
    /// variable-length field is copied out of `buf`, so the returned packet
    /// owns independent storage.
    ///
    pub fn unmarshal(buf: &[u8]) -> Result<Packet, PacketError> {
        if buf.len() < FIXED_HEADER_LEN {
            return Err(PacketError::TruncatedInput {
                needed: FIXED_HEADER_LEN,
                have: buf.len(),
            });
        }

        let hardware_type = u16::from_be_bytes(buf[0..2].try_into().unwrap());
        let protocol_type = u16::from_be_bytes(buf[2..4].try_into().unwrap());
        let hardware_addr_len = buf[4];
        let protocol_addr_len = buf[5];
        let operation = Operation::from(u16::from_be_bytes(buf[6..8].try_into().unwrap()));

        let hlen = hardware_addr_len as usize;
        let plen = protocol_addr_len as usize;

        // The length fields come off the wire; never trust them past the
        // end of the buffer.
        let needed = FIXED_HEADER_LEN + 2 * hlen + 2 * plen;
        if buf.len() < needed {
            return Err(PacketError::TruncatedInput {
                needed,
                have: buf.len(),
            });
        }

        // This crate only speaks IPv4 on the protocol side.
        if plen != 4 {
            return Err(PacketError::InvalidIp);
        }

        let mut n = FIXED_HEADER_LEN;
        let sender_hardware_addr = HardwareAddr::from(&buf[n..n + hlen]);
        n += hlen;
        let sender_ip = read_ipv4(&buf[n..n + plen]);
        n += plen;
        let target_hardware_addr = HardwareAddr::from(&buf[n..n + hlen]);
        n += hlen;
        let target_ip = read_ipv4(&buf[n..n + plen]);

        Ok(Packet {
            hardware_type,
            protocol_type,
            hardware_addr_len,
            protocol_addr_len,
            operation,
            sender_hardware_addr,
            sender_ip,
            target_hardware_addr,
            target_ip,
        })
    }
}

fn as_ipv4(addr: IpAddr) -> Result<Ipv4Addr, PacketError> {
    match addr {
        IpAddr::V4(v4) => Ok(v4),
        IpAddr::V6(_) => Err(PacketError::InvalidIp),
    }
}

fn read_ipv4(octets: &[u8]) -> Ipv4Addr {
    let octets: [u8; 4] = octets.try_into().unwrap();
    Ipv4Addr::from(octets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ipv4(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(a, b, c, d))
    }

    #[test]
    fn operation_codes() {
        assert_eq!(Operation::from(1), Operation::Request);
        assert_eq!(Operation::from(2), Operation::Reply);
        assert_eq!(Operation::from(3), Operation::Other(3));
        assert_eq!(Operation::Other(0xffff).as_u16(), 0xffff);
        assert_eq!(Operation::Request.as_u16(), 1);
        assert_eq!(Operation::Reply.as_u16(), 2);
    }

    #[test]
    fn new_packet_populates_header() {
        let p = Packet::new(
            Operation::Request,
            HardwareAddr::from([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]),
            ipv4(192, 168, 1, 10),
            HardwareAddr::broadcast(),
            ipv4(192, 168, 1, 1),
        )
        .unwrap();

        assert_eq!(p.hardware_type, 1);
        assert_eq!(p.protocol_type, IPV4_ETHER_TYPE);
        assert_eq!(p.hardware_addr_len, 6);
        assert_eq!(p.protocol_addr_len, 4);
    }

    #[test]
    fn new_packet_rejects_empty_hardware_addr() {
        let err = Packet::new(
            Operation::Request,
            HardwareAddr::new(vec![]),
            ipv4(192, 168, 1, 10),
            HardwareAddr::broadcast(),
            ipv4(192, 168, 1, 1),
        )
        .unwrap_err();
        assert_eq!(err, PacketError::InvalidHardwareAddr);
    }

    #[test]
    fn new_packet_rejects_mismatched_hardware_addr_lengths() {
        // 20-byte InfiniBand sender against a 6-byte Ethernet target
        let err = Packet::new(
            Operation::Request,
            HardwareAddr::new(vec![1; 20]),
            ipv4(192, 168, 1, 10),
            HardwareAddr::broadcast(),
            ipv4(192, 168, 1, 1),
        )
        .unwrap_err();
        assert_eq!(err, PacketError::InvalidHardwareAddr);
    }

    #[test]
    fn new_packet_rejects_ipv6() {
        let v6 = IpAddr::V6("::1".parse().unwrap());

        let err = Packet::new(
            Operation::Request,
            HardwareAddr::broadcast(),
            v6,
            HardwareAddr::broadcast(),
            ipv4(192, 168, 1, 1),
        )
        .unwrap_err();
        assert_eq!(err, PacketError::InvalidIp);

        let err = Packet::new(
            Operation::Request,
            HardwareAddr::broadcast(),
            ipv4(192, 168, 1, 10),
            HardwareAddr::broadcast(),
            v6,
        )
        .unwrap_err();
        assert_eq!(err, PacketError::InvalidIp);
    }

    #[test]
    fn marshal_known_bytes() {
        let p = Packet::new(
            Operation::Request,
            HardwareAddr::from([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]),
            ipv4(192, 168, 1, 10),
            HardwareAddr::from([0xde, 0xad, 0xbe, 0xef, 0xde, 0xad]),
            ipv4(192, 168, 1, 1),
        )
        .unwrap();

        let want: Vec<u8> = vec![
            0, 1, // hardware type
            0x08, 0x00, // protocol type
            6, // hardware address length
            4, // protocol address length
            0, 1, // operation
            0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff, // sender hardware address
            192, 168, 1, 10, // sender protocol address
            0xde, 0xad, 0xbe, 0xef, 0xde, 0xad, // target hardware address
            192, 168, 1, 1, // target protocol address
        ];
        assert_eq!(p.marshal(), want);
    }

    #[test]
    fn unmarshal_known_bytes() {
        let b: Vec<u8> = vec![
            0, 1, 0x08, 0x00, 6, 4, 0, 2, 1, 2, 3, 4, 5, 6, 10, 0, 0, 1, 10, 9, 8, 7, 6, 5, 10, 0,
            0, 2,
        ];
        let p = Packet::unmarshal(&b).unwrap();
        assert_eq!(p.hardware_type, 1);
        assert_eq!(p.protocol_type, IPV4_ETHER_TYPE);
        assert_eq!(p.hardware_addr_len, 6);
        assert_eq!(p.protocol_addr_len, 4);
        assert_eq!(p.operation, Operation::Reply);
        assert_eq!(p.sender_hardware_addr, HardwareAddr::from([1, 2, 3, 4, 5, 6]));
        assert_eq!(p.sender_ip, Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(p.target_hardware_addr, HardwareAddr::from([10, 9, 8, 7, 6, 5]));
        assert_eq!(p.target_ip, Ipv4Addr::new(10, 0, 0, 2));
    }

    #[test]
    fn round_trip_ethernet_length() {
        let p = Packet::new(
            Operation::Reply,
            HardwareAddr::from([0xde, 0xad, 0xbe, 0xef, 0xde, 0xad]),
            ipv4(192, 168, 1, 1),
            HardwareAddr::from([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]),
            ipv4(192, 168, 1, 10),
        )
        .unwrap();

        let b = p.marshal();
        assert_eq!(b.len(), 28);
        assert_eq!(Packet::unmarshal(&b).unwrap(), p);
    }

    #[test]
    fn round_trip_infiniband_length() {
        let sender: Vec<u8> = (0..20).collect();
        let target: Vec<u8> = (20..40).collect();

        let p = Packet::new(
            Operation::Request,
            HardwareAddr::new(sender),
            ipv4(10, 0, 0, 1),
            HardwareAddr::new(target),
            ipv4(10, 0, 0, 2),
        )
        .unwrap();
        assert_eq!(p.hardware_addr_len, 20);

        let b = p.marshal();
        assert_eq!(b.len(), 8 + 2 * 20 + 2 * 4);
        assert_eq!(Packet::unmarshal(&b).unwrap(), p);
    }

    #[test]
    fn unmarshal_ignores_trailing_padding() {
        let p = Packet::new(
            Operation::Request,
            HardwareAddr::from([1, 2, 3, 4, 5, 6]),
            ipv4(10, 0, 0, 1),
            HardwareAddr::broadcast(),
            ipv4(10, 0, 0, 2),
        )
        .unwrap();

        // Minimum Ethernet payloads get padded out by the link layer
        let mut b = p.marshal();
        b.extend_from_slice(&[0; 18]);
        assert_eq!(Packet::unmarshal(&b).unwrap(), p);
    }

    #[test]
    fn unmarshal_short_header() {
        assert_eq!(
            Packet::unmarshal(&[0, 1, 0x08, 0x00, 6, 4, 0]),
            Err(PacketError::TruncatedInput { needed: 8, have: 7 })
        );
    }

    #[test]
    fn unmarshal_declared_lengths_exceed_buffer() {
        // Header declares 255-byte hardware addresses, but only 40 bytes
        // of payload follow; decoding must refuse rather than read past
        // the end.
        let mut b: Vec<u8> = vec![0, 1, 0x08, 0x00, 255, 4, 0, 1];
        b.extend_from_slice(&[0; 40]);

        assert_eq!(
            Packet::unmarshal(&b),
            Err(PacketError::TruncatedInput {
                needed: 8 + 2 * 255 + 2 * 4,
                have: 48,
            })
        );
    }

    #[test]
    fn unmarshal_rejects_non_ipv4_protocol_length() {
        // 16-byte protocol addresses (IPv6-shaped) are not decodable here
        let mut b: Vec<u8> = vec![0, 1, 0x86, 0xdd, 6, 16, 0, 1];
        b.extend_from_slice(&[0; 2 * 6 + 2 * 16]);

        assert_eq!(Packet::unmarshal(&b), Err(PacketError::InvalidIp));
    }
}
