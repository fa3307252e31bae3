use arp_packets::HardwareAddr;
use std::io;
use std::time::Duration;

// Enough for an Ethernet frame carrying an ARP payload, with room to
// spare for longer hardware addresses.
pub(crate) const READ_BUF_LEN: usize = 128;

///
/// A link-layer datagram transport carrying whole frames, addressed by
/// hardware address.
///
/// Methods take `&self`: a server shares one transport between its receive
/// loop and the response senders handed to in-flight handlers, so
/// implementations keep any mutable state behind interior mutability.
///
/// End-of-stream on `receive` is reported as an error of kind
/// [`io::ErrorKind::UnexpectedEof`], distinct from every other I/O failure.
///
pub trait Transport: Send + Sync {
    /// Writes a single frame addressed to `peer`, returning the number of
    /// bytes written.
    fn send(&self, frame: &[u8], peer: &HardwareAddr) -> io::Result<usize>;

    /// Blocks until the next inbound frame arrives, filling `buf` and
    /// returning the frame length and the peer it came from.
    fn receive(&self, buf: &mut [u8]) -> io::Result<(usize, HardwareAddr)>;

    /// Stops sending and receiving frames.
    fn close(&self) -> io::Result<()>;

    /// Bounds future `receive` calls. A read blocked past the timeout fails
    /// with the implementation's timeout error instead of blocking forever;
    /// `None` removes the bound.
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;

    /// Bounds future `send` calls, as `set_read_timeout` does for reads.
    fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;
}
