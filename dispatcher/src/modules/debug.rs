/// ----- DEBUG MODULE -----
/// Redraws the dispatcher console whenever the registry or the dispatcher
/// state changes.

use std::time::Duration;

use crossbeam_channel::tick;
use log::warn;

use crate::utilities::context::DispatcherContext;
use crate::utilities::debug::Debug;

pub fn main(ctx: &DispatcherContext) {
    let timer = tick(Duration::from_millis(250));
    let mut debug = Debug::new(ctx.num_elevators());
    let mut last_drawn = None;

    while ctx.is_running() && timer.recv().is_ok() {
        let snapshot = (ctx.state(), ctx.pending_requests().len(), ctx.statuses());
        if last_drawn.as_ref() == Some(&snapshot) {
            continue;
        }
        if let Err(e) = debug.printstatus(snapshot.0, snapshot.1, &snapshot.2) {
            warn!("Unable to draw status console: {}", e);
            return;
        }
        last_drawn = Some(snapshot);
    }
}
