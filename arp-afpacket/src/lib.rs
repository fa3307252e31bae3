//! A Linux `AF_PACKET` implementation of the [`arp::Transport`] contract,
//! bound to one interface and filtered to ARP traffic, plus discovery of
//! that interface's hardware and IPv4 addresses.
#![cfg(target_os = "linux")]

mod linux;
mod socket;

pub use socket::RawSocket;
