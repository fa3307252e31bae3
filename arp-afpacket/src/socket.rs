use crate::linux;
use arp::Transport;
use arp_packets::HardwareAddr;
use std::io;
use std::mem::{self, MaybeUninit};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;

///
/// An `AF_PACKET` socket bound to one network interface and filtered to ARP
/// traffic by the kernel, together with the addresses discovered on that
/// interface. Implements [`arp::Transport`].
///
pub struct RawSocket {
    // -1 once closed; send/receive on a closed socket fail instead of
    // touching a reused descriptor
    fd: AtomicI32,
    ifindex: libc::c_int,
    hardware_addr: HardwareAddr,
    ip: Option<Ipv4Addr>,
}

impl RawSocket {
    ///
    /// Opens a raw ARP socket and binds it to the named interface,
    /// recording the interface's hardware address and IPv4 address (if it
    /// has one) along the way.
    ///
    pub fn bind(interface: &str) -> io::Result<RawSocket> {
        if interface.len() >= libc::IFNAMSIZ {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "interface name too long",
            ));
        }

        // FFI below: failures follow the libc convention of a negative
        // return plus errno, surfaced via last_os_error. No Rust-owned
        // memory is handed to the kernel beyond the stack buffers filled
        // in here.
        let fd = unsafe {
            let fd = libc::socket(
                libc::AF_PACKET,
                libc::SOCK_RAW,
                (libc::ETH_P_ARP as u16).to_be() as libc::c_int,
            );
            if fd < 0 {
                return Err(io::Error::last_os_error());
            }
            fd
        };

        let socket = unsafe {
            // ifreq carries the interface name in; each ioctl fills one
            // union member out.
            // man 7 netdevice
            let mut ifr: linux::ifreq = MaybeUninit::zeroed().assume_init();
            for (dst, src) in ifr
                .ifr_ifrn
                .ifrn_name
                .iter_mut()
                .zip(interface.as_bytes())
            {
                *dst = *src as libc::c_char;
            }

            if libc::ioctl(fd, linux::SIOCGIFINDEX, &mut ifr) < 0 {
                let err = io::Error::last_os_error();
                libc::close(fd);
                return Err(err);
            }
            let ifindex = ifr.ifr_ifru.ifru_ivalue;

            if libc::ioctl(fd, linux::SIOCGIFHWADDR, &mut ifr) < 0 {
                let err = io::Error::last_os_error();
                libc::close(fd);
                return Err(err);
            }
            let sa_data = ifr.ifr_ifru.ifru_hwaddr.sa_data;
            let hardware_addr =
                HardwareAddr::new(sa_data[..6].iter().map(|b| *b as u8).collect());

            // An interface with no IPv4 address is usable for serving, so
            // a failure here only leaves the address empty
            let ip = if libc::ioctl(fd, linux::SIOCGIFADDR, &mut ifr) < 0 {
                None
            } else {
                let sin = &ifr.ifr_ifru.ifru_addr as *const libc::sockaddr
                    as *const libc::sockaddr_in;
                Some(Ipv4Addr::from(u32::from_be((*sin).sin_addr.s_addr)))
            };

            // man 7 packet regarding sockaddr_ll
            let mut ll: libc::sockaddr_ll = MaybeUninit::zeroed().assume_init();
            ll.sll_family = libc::AF_PACKET as libc::c_ushort;
            ll.sll_protocol = (libc::ETH_P_ARP as u16).to_be();
            ll.sll_ifindex = ifindex;
            if libc::bind(
                fd,
                &ll as *const libc::sockaddr_ll as *const libc::sockaddr,
                mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t,
            ) < 0
            {
                let err = io::Error::last_os_error();
                libc::close(fd);
                return Err(err);
            }

            RawSocket {
                fd: AtomicI32::new(fd),
                ifindex,
                hardware_addr,
                ip,
            }
        };

        Ok(socket)
    }

    /// The hardware address of the bound interface.
    pub fn hardware_addr(&self) -> HardwareAddr {
        self.hardware_addr.clone()
    }

    /// The addresses discovered on the bound interface, in the shape
    /// [`arp::Client::new`] expects.
    pub fn addrs(&self) -> Vec<IpAddr> {
        self.ip.iter().map(|ip| IpAddr::V4(*ip)).collect()
    }

    fn fd(&self) -> io::Result<libc::c_int> {
        let fd = self.fd.load(Ordering::SeqCst);
        if fd < 0 {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "socket closed"));
        }
        Ok(fd)
    }

    fn set_timeout(&self, option: libc::c_int, timeout: Option<Duration>) -> io::Result<()> {
        let fd = self.fd()?;

        // A zeroed timeval clears the timeout
        let mut tv: libc::timeval = unsafe { MaybeUninit::zeroed().assume_init() };
        if let Some(timeout) = timeout {
            tv.tv_sec = timeout.as_secs() as libc::time_t;
            tv.tv_usec = timeout.subsec_micros() as libc::suseconds_t;
        }

        let ret = unsafe {
            libc::setsockopt(
                fd,
                libc::SOL_SOCKET,
                option,
                &tv as *const libc::timeval as *const libc::c_void,
                mem::size_of::<libc::timeval>() as libc::socklen_t,
            )
        };
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn peer_sockaddr(&self, peer: &HardwareAddr) -> io::Result<libc::sockaddr_ll> {
        let mut ll: libc::sockaddr_ll = unsafe { MaybeUninit::zeroed().assume_init() };
        if peer.len() > ll.sll_addr.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "peer hardware address too long for sockaddr_ll",
            ));
        }

        ll.sll_family = libc::AF_PACKET as libc::c_ushort;
        ll.sll_protocol = (libc::ETH_P_ARP as u16).to_be();
        ll.sll_ifindex = self.ifindex;
        ll.sll_halen = peer.len() as libc::c_uchar;
        ll.sll_addr[..peer.len()].copy_from_slice(peer.as_bytes());
        Ok(ll)
    }
}

impl Transport for RawSocket {
    fn send(&self, frame: &[u8], peer: &HardwareAddr) -> io::Result<usize> {
        let fd = self.fd()?;
        let ll = self.peer_sockaddr(peer)?;

        let bytes = unsafe {
            libc::sendto(
                fd,
                frame.as_ptr() as *const libc::c_void,
                frame.len(),
                0,
                &ll as *const libc::sockaddr_ll as *const libc::sockaddr,
                mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t,
            )
        };
        if bytes < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(bytes as usize)
    }

    fn receive(&self, buf: &mut [u8]) -> io::Result<(usize, HardwareAddr)> {
        let fd = self.fd()?;

        let mut ll = MaybeUninit::<libc::sockaddr_ll>::zeroed();
        let mut addrlen = mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t;

        let bytes = unsafe {
            libc::recvfrom(
                fd,
                buf.as_mut_ptr() as *mut libc::c_void,
                buf.len(),
                0,
                ll.as_mut_ptr() as *mut libc::sockaddr,
                &mut addrlen,
            )
        };
        if bytes < 0 {
            return Err(io::Error::last_os_error());
        }

        let ll = unsafe { ll.assume_init() };
        let halen = usize::from(ll.sll_halen).min(ll.sll_addr.len());
        let peer = HardwareAddr::new(ll.sll_addr[..halen].to_vec());
        Ok((bytes as usize, peer))
    }

    fn close(&self) -> io::Result<()> {
        let fd = self.fd.swap(-1, Ordering::SeqCst);
        if fd >= 0 {
            let ret = unsafe { libc::close(fd) };
            if ret < 0 {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(())
    }

    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.set_timeout(libc::SO_RCVTIMEO, timeout)
    }

    fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.set_timeout(libc::SO_SNDTIMEO, timeout)
    }
}

impl Drop for RawSocket {
    fn drop(&mut self) {
        let fd = self.fd.swap(-1, Ordering::SeqCst);
        if fd >= 0 {
            unsafe {
                libc::close(fd);
            }
        }
    }
}
