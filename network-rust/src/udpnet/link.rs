/// ----- LINK MODULE -----
/// Bridges crossbeam channels to JSON datagrams. One `tx` thread per outbound
/// logical channel, one `rx` thread per inbound one.

use std::net::{SocketAddr, UdpSocket};
use std::str;

use crossbeam_channel::{Receiver, Sender};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use super::sock;

/// Largest payload a UDP datagram can carry over IPv4.
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
    #[error("receiving channel closed")]
    ChannelClosed,
}

#[derive(Debug, Error)]
enum PacketError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("packet is not utf-8: {0}")]
    Utf8(#[from] str::Utf8Error),
    #[error("packet is not a valid message: {0}")]
    Json(#[from] serde_json::Error),
}

/// Sends everything received on `ch` to `remote`.
///
/// Returns `Err` when creating the socket fails and `Ok` once every sender of
/// `ch` has been dropped. Send failures after that are logged and skipped.
pub fn tx<T: Serialize>(remote: SocketAddr, ch: Receiver<T>) -> Result<(), LinkError> {
    let s = sock::new_tx(&remote)?;
    for data in ch.iter() {
        let serialized = match serde_json::to_string(&data) {
            Ok(serialized) => serialized,
            Err(e) => {
                warn!("Unable to serialize message for {}: {}", remote, e);
                continue;
            }
        };
        if serialized.len() > MAX_DATAGRAM_SIZE {
            warn!(
                "Dropping {} byte message for {}, larger than one datagram",
                serialized.len(),
                remote
            );
            continue;
        }
        if let Err(e) = s.send_to(serialized.as_bytes(), remote) {
            warn!("Unable to send packet to {}, {}", remote, e);
        }
    }
    debug!("Link to {} closed", remote);
    Ok(())
}

/// Binds `local` and forwards every well-formed message to `ch`.
///
/// Returns `Err` when binding fails or when the receiving side of `ch` is gone.
/// Malformed packets are logged and dropped.
pub fn rx<T: DeserializeOwned>(local: SocketAddr, ch: Sender<T>) -> Result<(), LinkError> {
    let s = sock::new_rx(&local)?;
    rx_on(s, ch)
}

/// Same as `rx` on an already bound socket.
pub fn rx_on<T: DeserializeOwned>(s: UdpSocket, ch: Sender<T>) -> Result<(), LinkError> {
    let mut buf = vec![0; MAX_DATAGRAM_SIZE];
    loop {
        match parse_packet(&s, &mut buf) {
            Ok(d) => ch.send(d).map_err(|_| LinkError::ChannelClosed)?,
            Err(e) => warn!("Received bad packet: {}", e),
        }
    }
}

fn parse_packet<T: DeserializeOwned>(s: &UdpSocket, buf: &mut [u8]) -> Result<T, PacketError> {
    let n = s.recv(buf)?;
    let msg = str::from_utf8(&buf[..n])?;
    Ok(serde_json::from_str::<T>(msg)?)
}
