//! Answers ARP requests on behalf of a configured IPv4 address, using proxy
//! ARP to claim the address for this machine.

#[cfg(target_os = "linux")]
fn main() {
    linux::run()
}

#[cfg(not(target_os = "linux"))]
fn main() {
    eprintln!("proxy-arpd requires Linux AF_PACKET sockets");
    std::process::exit(1);
}

#[cfg(target_os = "linux")]
mod linux {
    use arp::{HardwareAddr, Operation, Packet, Request, ResponseSender, ServeMux, Server};
    use arp_afpacket::RawSocket;
    use clap::{App, Arg};
    use std::net::{IpAddr, Ipv4Addr};
    use std::process;
    use std::sync::Arc;
    use tracing::{info, warn};

    pub fn run() {
        tracing_subscriber::fmt::init();

        let matches = App::new("proxy-arpd")
            .about("answers ARP requests on behalf of a designated IPv4 address")
            .arg(
                Arg::with_name("interface")
                    .short("i")
                    .long("interface")
                    .takes_value(true)
                    .default_value("eth0")
                    .help("network interface to use for ARP traffic"),
            )
            .arg(
                Arg::with_name("ip")
                    .long("ip")
                    .takes_value(true)
                    .required(true)
                    .help("IPv4 address for device to proxy ARP on behalf of"),
            )
            .get_matches();

        let interface = matches.value_of("interface").unwrap();
        let proxy_ip: Ipv4Addr = match matches.value_of("ip").unwrap().parse() {
            Ok(ip) => ip,
            Err(_) => {
                eprintln!("invalid IPv4 address: {:?}", matches.value_of("ip").unwrap());
                process::exit(1);
            }
        };

        let socket = match RawSocket::bind(interface) {
            Ok(socket) => socket,
            Err(err) => {
                eprintln!("could not open ARP socket on {}: {}", interface, err);
                process::exit(1);
            }
        };
        let local_hw = socket.hardware_addr();

        // Answer requests that claim proxy_ip for this machine; everything
        // else is left for the real owner to answer
        let mux = ServeMux::new();
        {
            let local_hw = local_hw.clone();
            mux.handle_func(Operation::Request, move |w: &ResponseSender, r: &Request| {
                // Ignore requests which are neither broadcast nor bound
                // directly for this machine
                if r.target_hardware_addr != HardwareAddr::broadcast()
                    && r.target_hardware_addr != local_hw
                {
                    return;
                }

                info!(
                    "request: who-has {}?  tell {} ({})",
                    r.target_ip, r.sender_ip, r.sender_hardware_addr
                );

                if r.target_ip != proxy_ip {
                    return;
                }

                let reply = match Packet::new(
                    Operation::Reply,
                    local_hw.clone(),
                    IpAddr::V4(proxy_ip),
                    r.sender_hardware_addr.clone(),
                    IpAddr::V4(r.sender_ip),
                ) {
                    Ok(reply) => reply,
                    Err(err) => {
                        warn!(%err, "could not build reply");
                        return;
                    }
                };

                info!("  reply: {} is-at {}", proxy_ip, local_hw);
                if let Err(err) = w.send(&reply) {
                    warn!(%err, "could not send reply");
                }
            });
        }

        info!(%interface, ip = %proxy_ip, hardware_addr = %local_hw, "proxying ARP");
        let server = Server::new(mux);
        if let Err(err) = server.serve(Arc::new(socket)) {
            eprintln!("serve: {}", err);
            process::exit(1);
        }
    }
}
