use std::sync::Arc;

use log::{debug, warn};
use tokio::time::sleep;

use crate::concepts::route::RoutingTable;
use crate::convergence::ConvergenceTracker;
use crate::framework::{RouterLog, SimParams};
use crate::router::{NodeId, Router};
use crate::transport::Transport;

/// What a router task reports once it terminated
#[derive(Clone, Debug)]
pub struct RouterOutcome {
    pub address: NodeId,
    pub table: RoutingTable,
    /// number of rounds the router ran, including the final one
    pub iterations: u64,
}

/// Moves every queued packet of the router into the transport
fn flush<L: RouterLog>(router: &mut Router<L>, transport: &Transport) {
    for packet in router.outbound_packets.drain(..) {
        if let Err(err) = transport.send(packet) {
            // the packet is dropped, the round structure must not be broken by one router leaving
            warn!("[{}] {err}", router.address);
        }
    }
}

/// Runs one router until every router in the simulation has converged.
///
/// Each round is split by two barriers: scheduled broadcasts are all enqueued before anyone
/// drains, and every convergence flag is written before anyone reads the global predicate.
pub async fn run_router<L: RouterLog>(
    mut router: Router<L>,
    transport: Arc<Transport>,
    tracker: Arc<ConvergenceTracker>,
    params: SimParams,
) -> RouterOutcome {
    loop {
        router.begin_round();
        router.broadcast();
        flush(&mut router, &transport);

        if !params.round_interval.is_zero() {
            sleep(params.round_interval).await;
        }
        tracker.wait_round().await;

        for packet in transport.drain(&router.address) {
            // integrity errors are already in the router's log, keep going
            if let Err(err) = router.handle_vector(&packet.vector) {
                debug!("[{}] dropped vector: {err}", router.address);
            }
            // triggered updates leave right away
            flush(&mut router, &transport);
        }

        let converged = router.finish_round();
        tracker.set_converged(&router.address, converged);
        tracker.wait_round().await;

        // every router evaluates this between the same two barriers, so they all agree.
        // all flags set means nobody sent a triggered update, the transport is then empty too.
        if tracker.all_converged() && transport.in_flight() == 0 {
            router.terminate();
            break;
        }
    }

    debug!(
        "[{}] terminated after {} iterations",
        router.address,
        router.iteration()
    );
    let address = router.address.clone();
    let iterations = router.iteration();
    RouterOutcome {
        address,
        iterations,
        table: router.into_table(),
    }
}
