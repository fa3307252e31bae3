//! An ARP client and server, as described in RFC 826.
//!
//! The wire codecs live in the `arp-packets` crate and are re-exported
//! here; this crate adds the transport contract, the request/reply
//! correlation engine ([`Client`]), and the dispatch engine ([`Server`],
//! [`ServeMux`]).

mod client;
pub use self::client::*;

mod error;
pub use self::error::*;

mod handler;
pub use self::handler::*;

mod mux;
pub use self::mux::*;

mod request;
pub use self::request::*;

mod server;
pub use self::server::*;

mod transport;
pub use self::transport::*;

pub use arp_packets::{
    EthernetFrame, HardwareAddr, Operation, Packet, PacketError, ARP_ETHER_TYPE, IPV4_ETHER_TYPE,
};
