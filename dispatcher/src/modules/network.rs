/// ----- NETWORK MODULE -----
/// Connects the dispatcher loops to the other processes: floor requests and
/// elevator reports come in, assignments and completion reports go out.

use std::error::Error;
use std::net::SocketAddr;
use std::process;
use std::thread::Builder;

use crossbeam_channel::{unbounded, Receiver};
use log::error;
use network_rust::udpnet;
use serde::de::DeserializeOwned;
use serde::Serialize;

use shared_resources::config::NetworkConfig;

use super::subsystem::DispatcherChannels;

pub fn init(network_config: &NetworkConfig) -> Result<DispatcherChannels, Box<dyn Error>> {
    Ok(DispatcherChannels {
        floor_request_rx: spawn_rx("floor_request_receiver", network_config.floor_request_addr()?)?,
        arrival_rx: spawn_rx("arrival_receiver", network_config.arrival_addr()?)?,
        assigned_tx: spawn_tx("pending_request_sender", network_config.pending_request_addr()?)?,
        completed_tx: spawn_tx("completed_sender", network_config.completed_addr()?)?,
    })
}

fn spawn_rx<T>(name: &str, addr: SocketAddr) -> std::io::Result<Receiver<T>>
where
    T: DeserializeOwned + Send + 'static,
{
    let (tx, rx) = unbounded::<T>();
    Builder::new().name(format!("{}_udp", name)).spawn(move || {
        if let Err(e) = udpnet::link::rx(addr, tx) {
            // crash if the link cannot be kept up, there is no one to hand it to
            error!("Link on {} failed: {}", addr, e);
            process::exit(1);
        }
    })?;
    Ok(rx)
}

fn spawn_tx<T>(name: &str, addr: SocketAddr) -> std::io::Result<crossbeam_channel::Sender<T>>
where
    T: Serialize + Send + 'static,
{
    let (tx, rx) = unbounded::<T>();
    Builder::new().name(format!("{}_udp", name)).spawn(move || {
        if let Err(e) = udpnet::link::tx(addr, rx) {
            error!("Link to {} failed: {}", addr, e);
            process::exit(1);
        }
    })?;
    Ok(tx)
}
