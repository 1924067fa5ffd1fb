use crate::concepts::neighbour::Neighbour;
use crate::concepts::packet::{DistanceVector, OutboundPacket};
use crate::concepts::route::RoutingTable;
use crate::feedback::RoutingError;
use crate::framework::RouterLog;
use crate::logging::timestamped;
use crate::util::{fmt_metric, sum_inf};
use educe::Educe;
use log::{error, trace};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};

/// Address of a router, MUST be unique within a topology
pub type NodeId = String;
/// Cost of a link or a path, lower is better
pub type Metric = u32;

pub const INF: Metric = Metric::MAX;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RouterState {
    /// the last round changed the table, or no round has finished yet
    Running,
    /// the last round did not change the table
    ConvergedLocal,
    /// every router converged, this router will not send or receive anymore
    Terminated,
}

/// The state of a single distance vector router.
///
/// The router does not perform any I/O. Vectors that should be sent are written to
/// `outbound_packets`, and received vectors are fed in through [`Router::handle_vector`].
#[derive(Educe)]
#[educe(Debug)]
pub struct Router<L: RouterLog> {
    pub address: NodeId,
    /// direct neighbours, fixed at creation
    pub links: BTreeMap<NodeId, Neighbour>,
    pub outbound_packets: Vec<OutboundPacket>,
    table: RoutingTable,
    /// destinations updated since the table was last logged
    updated: BTreeSet<NodeId>,
    /// whether the current round changed the table
    changed: bool,
    state: RouterState,
    iteration: u64,
    #[educe(Debug(ignore))]
    log: L,
}

impl<L: RouterLog> Router<L> {
    /// Creates a router that knows every node in `nodes` but can only reach its neighbours
    pub fn new<'a>(
        address: NodeId,
        neighbours: impl IntoIterator<Item = Neighbour>,
        nodes: impl IntoIterator<Item = &'a NodeId>,
        log: L,
    ) -> Self {
        let links: BTreeMap<NodeId, Neighbour> = neighbours
            .into_iter()
            .map(|neigh| (neigh.addr.clone(), neigh))
            .collect();

        let mut table = RoutingTable::unreachable(nodes);
        for neigh in links.values() {
            table.set(neigh.addr.clone(), neigh.link_cost);
        }
        table.set(address.clone(), 0);

        Self {
            address,
            links,
            outbound_packets: Vec::new(),
            table,
            updated: BTreeSet::new(),
            changed: false,
            state: RouterState::Running,
            iteration: 0,
            log,
        }
    }

    pub fn table(&self) -> &RoutingTable {
        &self.table
    }

    pub fn metric_to(&self, dest: &str) -> Metric {
        self.table.metric_to(dest)
    }

    pub fn state(&self) -> RouterState {
        self.state
    }

    /// number of rounds finished so far
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// destinations whose metric changed since the table was last logged
    pub fn updated(&self) -> &BTreeSet<NodeId> {
        &self.updated
    }

    /// Consumes the router, returning its final table
    pub fn into_table(self) -> RoutingTable {
        self.table
    }

    // region Logging

    fn log(&mut self, message: &str) {
        trace!("[{}] {message}", self.address);
        self.log.write_line(&timestamped(message));
    }

    fn log_routing_table(&mut self) {
        let mut lines = vec!["Routing Table:".to_string()];
        for (dest, metric) in &self.table {
            let flag = if self.updated.contains(dest) { "*" } else { "" };
            lines.push(format!("  {dest}: {} {flag}", fmt_metric(*metric)));
        }
        for line in lines {
            self.log(&line);
        }
        self.updated.clear();
    }

    // endregion

    // region Round

    /// Starts a new round: logs the table (marking what changed since the last round)
    pub fn begin_round(&mut self) {
        debug_assert_eq!(self.table.get(&self.address), Some(0));
        let msg = format!("Router {} running iteration {}", self.address, self.iteration);
        self.log(&msg);
        self.log_routing_table();
        self.changed = false;
    }

    /// Ends the round, returns true if the table did not change during it
    pub fn finish_round(&mut self) -> bool {
        let converged = !self.changed;
        if converged {
            if self.state != RouterState::ConvergedLocal {
                let msg = format!(
                    "Router {} converged locally in iteration {}",
                    self.address, self.iteration
                );
                self.log(&msg);
            }
            self.state = RouterState::ConvergedLocal;
        } else {
            if self.state == RouterState::ConvergedLocal {
                let msg = format!(
                    "Router {} received new routes in iteration {}, no longer converged",
                    self.address, self.iteration
                );
                self.log(&msg);
            }
            self.state = RouterState::Running;
        }
        self.iteration += 1;
        self.log.flush();
        converged
    }

    /// Stops the router for good, it will not broadcast again
    pub fn terminate(&mut self) {
        self.state = RouterState::Terminated;
        self.outbound_packets.clear();
        let msg = format!(
            "All routers have converged, router {} terminating after {} iterations",
            self.address, self.iteration
        );
        self.log(&msg);
        self.log.flush();
    }

    // endregion

    // region Exchange

    /// writes a snapshot of the current table to the outbound packet queue for all neighbours
    pub fn broadcast(&mut self) {
        if self.state == RouterState::Terminated {
            return;
        }
        let vector = DistanceVector::new(self.address.clone(), self.table.clone());
        let dests: Vec<NodeId> = self.links.keys().cloned().collect();
        for dest in dests {
            let msg = format!("Sent distance vector to {dest}: {}", vector.table);
            self.log(&msg);
            self.outbound_packets.push(OutboundPacket {
                sender: self.address.clone(),
                dest,
                vector: vector.clone(),
            });
        }
    }

    /// Applies a neighbour's vector to the table.
    ///
    /// Returns whether any destination improved. If one did, the new table is broadcast
    /// immediately rather than waiting for the next round.
    pub fn handle_vector(&mut self, vector: &DistanceVector) -> Result<bool, RoutingError> {
        if self.state == RouterState::Terminated {
            return Ok(false);
        }
        let sender = &vector.origin;
        self.log(&format!("Received distance vector from {sender}"));

        let Some(via) = self.table.get(sender) else {
            let err = RoutingError::UnknownSender {
                router: self.address.clone(),
                sender: sender.clone(),
            };
            error!(
                "Rejected distance vector from {} at {}, sender is not a known router",
                json!(sender),
                json!(self.address)
            );
            self.log(&format!("Error: {err}"));
            return Err(err);
        };

        let mut updated = false;
        for (dest, cost) in vector.table.iter() {
            let candidate = sum_inf(via, *cost);
            let current = self.table.metric_to(dest);
            self.log(&format!(
                "Calculating cost to {dest}: current cost = {}, new cost via {sender} = {} + {} = {}",
                fmt_metric(current),
                fmt_metric(via),
                fmt_metric(*cost),
                fmt_metric(candidate)
            ));

            if candidate < current {
                self.table.set(dest.clone(), candidate);
                self.updated.insert(dest.clone());
                updated = true;
                self.log(&format!(
                    "Updated cost to {dest}: {} -> {}",
                    fmt_metric(current),
                    fmt_metric(candidate)
                ));
            } else if current == INF {
                let msg = format!("Dest {dest} remains unreachable for {}", self.address);
                self.log(&msg);
            }
        }

        if updated {
            self.changed = true;
            self.log(&format!("Table changed by vector from {sender}, sending triggered update"));
            self.broadcast();
        }
        Ok(updated)
    }

    // endregion
}
