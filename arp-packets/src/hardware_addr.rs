use std::fmt;

///
/// A link-layer hardware address. Ethernet addresses are 6 bytes, but other
/// fabrics use different lengths (InfiniBand uses 20), so storage is
/// variable length. Most significant byte is 0th.
///
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct HardwareAddr {
    bytes: Vec<u8>,
}

impl HardwareAddr {
    pub fn new(bytes: Vec<u8>) -> HardwareAddr {
        HardwareAddr { bytes }
    }

    /// The Ethernet broadcast address, ff:ff:ff:ff:ff:ff.
    pub fn broadcast() -> HardwareAddr {
        HardwareAddr {
            bytes: vec![0xff; 6],
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<[u8; 6]> for HardwareAddr {
    fn from(bytes: [u8; 6]) -> HardwareAddr {
        HardwareAddr::new(bytes.to_vec())
    }
}

impl From<&[u8]> for HardwareAddr {
    fn from(bytes: &[u8]) -> HardwareAddr {
        HardwareAddr::new(bytes.to_vec())
    }
}

impl fmt::Display for HardwareAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, byte) in self.bytes.iter().enumerate() {
            if i > 0 {
                write!(f, ":")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let addr = HardwareAddr::from([0xde, 0xad, 0xbe, 0xef, 0xde, 0xad]);
        assert_eq!(addr.to_string(), "de:ad:be:ef:de:ad");
    }

    #[test]
    fn broadcast() {
        let addr = HardwareAddr::broadcast();
        assert_eq!(addr.len(), 6);
        assert_eq!(addr.as_bytes(), [0xff; 6]);
    }
}
