use thiserror::Error;

/// Errors raised by the wire codecs in this crate.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PacketError {
    /// A hardware address was empty, or the sender and target hardware
    /// addresses disagree in length.
    #[error("invalid hardware address")]
    InvalidHardwareAddr,

    /// An address in an IPv4 slot was not a 4-byte IPv4 address.
    #[error("invalid IPv4 address")]
    InvalidIp,

    /// The buffer ended before the structure it declares did.
    #[error("truncated input: need {needed} bytes, have {have}")]
    TruncatedInput { needed: usize, have: usize },
}
