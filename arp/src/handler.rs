use crate::{Request, ResponseSender};

///
/// Serves ARP requests. Implementations receive each parsed inbound
/// [`Request`] and may write zero or more reply packets through the
/// [`ResponseSender`], which is bound to the requesting peer.
///
/// Handler failures have no return channel here; a handler that needs to
/// report one does so through its own side channel.
///
pub trait Handler: Send + Sync {
    fn serve_arp(&self, w: &ResponseSender, r: &Request);
}

///
/// An adapter which allows normal functions and closures to be used as ARP
/// handlers: `HandlerFunc(f)` is a [`Handler`] that calls `f`.
///
pub struct HandlerFunc<F>(pub F);

impl<F> Handler for HandlerFunc<F>
where
    F: Fn(&ResponseSender, &Request) + Send + Sync,
{
    fn serve_arp(&self, w: &ResponseSender, r: &Request) {
        (self.0)(w, r)
    }
}
