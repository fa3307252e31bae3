use crate::request::parse_request;
use crate::transport::READ_BUF_LEN;
use crate::{Error, Handler, Transport};
use arp_packets::{EthernetFrame, HardwareAddr, Packet, ARP_ETHER_TYPE};
use std::io;
use std::sync::Arc;
use std::thread;
use tracing::{debug, trace};

///
/// An ARP server. It accepts inbound frames from a [`Transport`], parses
/// each one on its own thread, and invokes the configured [`Handler`] with
/// the request and a [`ResponseSender`] bound to the requesting peer.
///
pub struct Server {
    handler: Arc<dyn Handler>,
}

impl Server {
    /// Creates a server that serves every parsed request with `handler`.
    /// Route by operation by passing a [`crate::ServeMux`] here.
    pub fn new<H>(handler: H) -> Server
    where
        H: Handler + 'static,
    {
        Server {
            handler: Arc::new(handler),
        }
    }

    ///
    /// Accepts inbound frames from `transport` until it fails, handling
    /// each one on an independent thread. Malformed or non-ARP traffic is
    /// dropped without being surfaced here; only the transport ends the
    /// loop. End-of-stream is a clean stop (`Ok`), any other transport
    /// error is returned.
    ///
    pub fn serve(&self, transport: Arc<dyn Transport>) -> Result<(), Error> {
        let mut buf = vec![0u8; READ_BUF_LEN];
        loop {
            let (n, peer) = match transport.receive(&mut buf) {
                Ok(received) => received,
                Err(ref err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                    debug!("transport reached end of stream, stopping server");
                    return Ok(());
                }
                Err(err) => return Err(err.into()),
            };

            // Each datagram gets its own copy of the bytes and its own
            // thread, so a stalled handler never blocks this loop.
            let conn = Conn {
                transport: Arc::clone(&transport),
                handler: Arc::clone(&self.handler),
                peer,
                buf: buf[..n].to_vec(),
            };
            thread::spawn(move || conn.serve());
        }
    }
}

/// One in-flight inbound datagram.
struct Conn {
    transport: Arc<dyn Transport>,
    handler: Arc<dyn Handler>,
    peer: HardwareAddr,
    buf: Vec<u8>,
}

impl Conn {
    fn serve(self) {
        let request = match parse_request(&self.buf) {
            Ok(request) => request,
            Err(err) => {
                // Non-ARP and undecodable frames are normal broadcast
                // noise, dropped here without touching the accept loop
                trace!(%err, "dropping unusable frame");
                return;
            }
        };

        let w = ResponseSender::new(self.transport, self.peer);
        self.handler.serve_arp(&w, &request);
    }
}

///
/// Lets a handler send reply packets addressed back to the datagram it is
/// serving. The sender is bound to the peer address the request arrived
/// from; send failures are returned to the handler and never retried.
///
pub struct ResponseSender {
    transport: Arc<dyn Transport>,
    peer: HardwareAddr,
}

impl ResponseSender {
    pub(crate) fn new(transport: Arc<dyn Transport>, peer: HardwareAddr) -> ResponseSender {
        ResponseSender { transport, peer }
    }

    /// Marshals `packet`, wraps it in an Ethernet frame addressed from the
    /// packet's sender to its target (the reply's destination is the
    /// original requester), and writes it to the bound peer. Returns the
    /// number of bytes written.
    pub fn send(&self, packet: &Packet) -> Result<usize, Error> {
        let payload = packet.marshal();
        let frame = EthernetFrame::encapsulate(
            &packet.target_hardware_addr,
            &packet.sender_hardware_addr,
            ARP_ETHER_TYPE,
            &payload,
        )?;

        Ok(self.transport.send(&frame, &self.peer)?)
    }
}
