use crate::{HardwareAddr, PacketError};
use std::convert::TryInto;

pub const ARP_ETHER_TYPE: u16 = 0x0806;
pub const IPV4_ETHER_TYPE: u16 = 0x0800;

// Ethernet II frames must be at least the header, which is 14 bytes
// 0                    6                    12                      14
// |---6 byte Dest_MAC--|---6 byte Src_MAC---|--2 Byte EtherType---|
const HEADER_LEN: usize = 14;

const MAC_LEN: usize = 6;

///
/// A decoded Ethernet II frame. The decoded value owns copies of its header
/// fields and payload, so it stays valid after the receive buffer is reused.
///
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EthernetFrame {
    dest_mac: HardwareAddr,
    src_mac: HardwareAddr,
    ether_type: u16,
    payload: Vec<u8>,
}

impl EthernetFrame {
    ///
    /// Builds the raw bytes of an Ethernet II frame carrying `payload`.
    /// Both addresses must be 6-byte Ethernet addresses.
    ///
    pub fn encapsulate(
        dest_mac: &HardwareAddr,
        src_mac: &HardwareAddr,
        ether_type: u16,
        payload: &[u8],
    ) -> Result<Vec<u8>, PacketError> {
        if dest_mac.len() != MAC_LEN || src_mac.len() != MAC_LEN {
            return Err(PacketError::InvalidHardwareAddr);
        }

        let mut data = Vec::with_capacity(HEADER_LEN + payload.len());
        data.extend_from_slice(dest_mac.as_bytes());
        data.extend_from_slice(src_mac.as_bytes());
        data.extend_from_slice(&ether_type.to_be_bytes());
        data.extend_from_slice(payload);
        Ok(data)
    }

    ///
    /// Decodes an Ethernet II frame from raw bytes. Anything past the header
    /// is the payload, which may include link-layer padding.
    ///
    pub fn decapsulate(buf: &[u8]) -> Result<EthernetFrame, PacketError> {
        if buf.len() < HEADER_LEN {
            return Err(PacketError::TruncatedInput {
                needed: HEADER_LEN,
                have: buf.len(),
            });
        }

        Ok(EthernetFrame {
            dest_mac: HardwareAddr::from(&buf[0..6]),
            src_mac: HardwareAddr::from(&buf[6..12]),
            ether_type: u16::from_be_bytes(buf[12..14].try_into().unwrap()),
            payload: buf[HEADER_LEN..].to_vec(),
        })
    }

    pub fn dest_mac(&self) -> &HardwareAddr {
        &self.dest_mac
    }

    pub fn src_mac(&self) -> &HardwareAddr {
        &self.src_mac
    }

    pub fn ether_type(&self) -> u16 {
        self.ether_type
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decapsulate_frame() {
        let data: Vec<u8> = vec![
            0xde, 0xad, 0xbe, 0xef, 0xff, 0xff, 1, 2, 3, 4, 5, 6, 0x08, 0x06, 0xaa, 0xbb,
        ];
        let frame = EthernetFrame::decapsulate(&data).unwrap();
        assert_eq!(
            frame.dest_mac(),
            &HardwareAddr::from([0xde, 0xad, 0xbe, 0xef, 0xff, 0xff])
        );
        assert_eq!(frame.src_mac(), &HardwareAddr::from([1, 2, 3, 4, 5, 6]));
        assert_eq!(frame.ether_type(), ARP_ETHER_TYPE);
        assert_eq!(frame.payload(), [0xaa, 0xbb]);
    }

    #[test]
    fn decapsulate_too_short() {
        let data: Vec<u8> = vec![0xde, 0xad, 0xbe, 0xef, 0xff, 0xff, 1, 2, 3, 4, 5, 6];
        assert_eq!(
            EthernetFrame::decapsulate(&data),
            Err(PacketError::TruncatedInput {
                needed: 14,
                have: 12
            })
        );
    }

    #[test]
    fn encapsulate_round_trip() {
        let dest = HardwareAddr::broadcast();
        let src = HardwareAddr::from([1, 2, 3, 4, 5, 6]);
        let payload: Vec<u8> = vec![9, 8, 7];

        let data = EthernetFrame::encapsulate(&dest, &src, ARP_ETHER_TYPE, &payload).unwrap();
        assert_eq!(data.len(), 17);

        let frame = EthernetFrame::decapsulate(&data).unwrap();
        assert_eq!(frame.dest_mac(), &dest);
        assert_eq!(frame.src_mac(), &src);
        assert_eq!(frame.ether_type(), ARP_ETHER_TYPE);
        assert_eq!(frame.payload(), payload.as_slice());
    }

    #[test]
    fn encapsulate_rejects_non_ethernet_addrs() {
        let too_long = HardwareAddr::new(vec![0xff; 20]);
        let src = HardwareAddr::from([1, 2, 3, 4, 5, 6]);
        assert_eq!(
            EthernetFrame::encapsulate(&too_long, &src, ARP_ETHER_TYPE, &[]),
            Err(PacketError::InvalidHardwareAddr)
        );
        assert_eq!(
            EthernetFrame::encapsulate(&src, &too_long, ARP_ETHER_TYPE, &[]),
            Err(PacketError::InvalidHardwareAddr)
        );
    }
}
