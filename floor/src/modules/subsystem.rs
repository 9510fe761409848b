/// ----- FLOOR SUBSYSTEM -----
/// Plays the parsed requests into the dispatcher at a fixed pace and logs the
/// completion reports that come back.

use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use log::{info, warn};

use shared_resources::request::ElevatorRequest;

/// Sends every request, waiting `interval` between two of them. Returns how
/// many were handed over.
pub fn feed(requests: &[ElevatorRequest], interval: Duration, request_tx: &Sender<ElevatorRequest>) -> usize {
    let mut sent = 0;
    for (i, request) in requests.iter().enumerate() {
        if i > 0 {
            thread::sleep(interval);
        }
        info!("Floor {} requests {}", request.source_floor(), request);
        if request_tx.send(request.clone()).is_err() {
            warn!("Dispatcher link closed after {} request(s)", sent);
            break;
        }
        sent += 1;
    }
    sent
}

/// Logs completion reports until `expected` distinct requests have been
/// reported or the stream closes. Returns the reported requests.
pub fn collect_completions(completed_rx: &Receiver<ElevatorRequest>, expected: usize) -> Vec<ElevatorRequest> {
    let mut completed: Vec<ElevatorRequest> = Vec::new();
    while completed.len() < expected {
        let Ok(request) = completed_rx.recv() else {
            warn!("Completion stream closed with {} of {} reported", completed.len(), expected);
            break;
        };
        if completed.contains(&request) {
            continue;
        }
        info!(
            "Request from floor {} to floor {} completed ({} of {})",
            request.source_floor(),
            request.destination_floor(),
            completed.len() + 1,
            expected
        );
        completed.push(request);
    }
    completed
}
