use crate::{Handler, HandlerFunc, Request, ResponseSender};
use arp_packets::Operation;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::trace;

///
/// An ARP request multiplexer, which implements [`Handler`]. ServeMux
/// matches handlers based on the request's [`Operation`], enabling different
/// handlers to be used for different kinds of ARP traffic.
///
/// Registration and dispatch may happen concurrently: dispatch takes a read
/// lock, registration a write lock, so many requests can be routed at once
/// while registrations stay atomic.
///
pub struct ServeMux {
    handlers: RwLock<HashMap<Operation, Box<dyn Handler>>>,
}

impl ServeMux {
    pub fn new() -> ServeMux {
        ServeMux {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a handler for an operation, replacing any handler already
    /// registered for it.
    pub fn handle<H>(&self, operation: Operation, handler: H)
    where
        H: Handler + 'static,
    {
        self.handlers
            .write()
            .unwrap()
            .insert(operation, Box::new(handler));
    }

    /// Registers a plain function or closure for an operation, wrapping it
    /// in a [`HandlerFunc`].
    pub fn handle_func<F>(&self, operation: Operation, f: F)
    where
        F: Fn(&ResponseSender, &Request) + Send + Sync + 'static,
    {
        self.handle(operation, HandlerFunc(f));
    }
}

impl Default for ServeMux {
    fn default() -> ServeMux {
        ServeMux::new()
    }
}

impl Handler for ServeMux {
    /// Routes the request to the handler registered for its operation. An
    /// operation with no registered handler is dropped without invoking
    /// anything.
    fn serve_arp(&self, w: &ResponseSender, r: &Request) {
        let handlers = self.handlers.read().unwrap();
        match handlers.get(&r.operation) {
            Some(handler) => handler.serve_arp(w, r),
            None => trace!(operation = ?r.operation, "no handler registered, dropping request"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Transport;
    use arp_packets::HardwareAddr;
    use std::io;
    use std::net::Ipv4Addr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct NullTransport;

    impl Transport for NullTransport {
        fn send(&self, frame: &[u8], _peer: &HardwareAddr) -> io::Result<usize> {
            Ok(frame.len())
        }
        fn receive(&self, _buf: &mut [u8]) -> io::Result<(usize, HardwareAddr)> {
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "closed"))
        }
        fn close(&self) -> io::Result<()> {
            Ok(())
        }
        fn set_read_timeout(&self, _timeout: Option<Duration>) -> io::Result<()> {
            Ok(())
        }
        fn set_write_timeout(&self, _timeout: Option<Duration>) -> io::Result<()> {
            Ok(())
        }
    }

    fn stub_request(operation: Operation) -> Request {
        Request {
            operation,
            sender_hardware_addr: HardwareAddr::from([1, 2, 3, 4, 5, 6]),
            sender_ip: Ipv4Addr::new(10, 0, 0, 1),
            target_hardware_addr: HardwareAddr::broadcast(),
            target_ip: Ipv4Addr::new(10, 0, 0, 2),
        }
    }

    #[test]
    fn routes_by_operation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);

        let mux = ServeMux::new();
        mux.handle_func(Operation::Reply, move |_w, _r| {
            counted.fetch_add(1, Ordering::SeqCst);
        });

        let w = ResponseSender::new(Arc::new(NullTransport), HardwareAddr::broadcast());

        // Only Reply is registered: a Request must not invoke anything
        mux.serve_arp(&w, &stub_request(Operation::Request));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        mux.serve_arp(&w, &stub_request(Operation::Reply));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn last_registration_wins() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let mux = ServeMux::new();
        {
            let first = Arc::clone(&first);
            mux.handle_func(Operation::Request, move |_w, _r| {
                first.fetch_add(1, Ordering::SeqCst);
            });
        }
        {
            let second = Arc::clone(&second);
            mux.handle_func(Operation::Request, move |_w, _r| {
                second.fetch_add(1, Ordering::SeqCst);
            });
        }

        let w = ResponseSender::new(Arc::new(NullTransport), HardwareAddr::broadcast());
        mux.serve_arp(&w, &stub_request(Operation::Request));

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }
}
