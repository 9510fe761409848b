use std::io;
use std::net::{IpAddr, SocketAddr, UdpSocket};

use socket2::{Domain, Protocol, Socket, Type};

fn new_socket(addr: &SocketAddr) -> io::Result<Socket> {
    let sock = Socket::new(Domain::for_address(*addr), Type::DGRAM, Some(Protocol::UDP))?;
    sock.set_reuse_address(true)?;
    Ok(sock)
}

/// Unbound sending socket able to reach `remote`.
pub fn new_tx(remote: &SocketAddr) -> io::Result<UdpSocket> {
    let sock = new_socket(remote)?;
    if matches!(remote.ip(), IpAddr::V4(ip) if ip.is_broadcast()) {
        sock.set_broadcast(true)?;
    }
    Ok(sock.into())
}

/// Receiving socket bound to `local`.
pub fn new_rx(local: &SocketAddr) -> io::Result<UdpSocket> {
    let sock = new_socket(local)?;
    sock.bind(&(*local).into())?;
    Ok(sock.into())
}
