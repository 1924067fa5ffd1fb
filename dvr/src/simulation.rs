use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use anyhow::{anyhow, Context};
use log::info;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use crate::concepts::route::RoutingTable;
use crate::convergence::ConvergenceTracker;
use crate::framework::{LogFactory, SimParams};
use crate::node::run_router;
use crate::router::{Metric, NodeId, Router, INF};
use crate::topology::Topology;
use crate::transport::Transport;
use crate::util::fmt_metric;

/// Runs one router task per node of a topology until the whole network converged
#[derive(Clone, Debug)]
pub struct Simulation {
    topology: Topology,
    params: SimParams,
}

/// Final state of a converged simulation
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationReport {
    /// rounds every router went through, the last one being the quiet round
    pub rounds: u64,
    pub tables: BTreeMap<NodeId, RoutingTable>,
}

/// A routing table entry that differs from the true shortest path
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Mismatch {
    pub router: NodeId,
    pub dest: NodeId,
    pub expected: Metric,
    pub actual: Metric,
}

impl Display for Mismatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "router {} has cost {} to {}, shortest path is {}",
            self.router,
            fmt_metric(self.actual),
            self.dest,
            fmt_metric(self.expected)
        )
    }
}

impl Simulation {
    pub fn new(topology: Topology, params: SimParams) -> Self {
        Self { topology, params }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Starts every router concurrently and waits until all of them terminated.
    ///
    /// Logs are opened before any router starts, failing to open one aborts the simulation.
    pub async fn run<F: LogFactory>(&self, logs: &F) -> anyhow::Result<SimulationReport> {
        let nodes = self.topology.nodes();
        if nodes.is_empty() {
            info!("Topology has no routers, nothing to simulate");
            return Ok(SimulationReport::default());
        }

        let mut routers = Vec::with_capacity(nodes.len());
        for node in nodes {
            let log = logs
                .open(node)
                .with_context(|| format!("Failed to open log for router {node}"))?;
            routers.push(Router::new(
                node.clone(),
                self.topology.neighbours_of(node),
                nodes,
                log,
            ));
        }

        let transport = Arc::new(Transport::new(nodes));
        let tracker = Arc::new(ConvergenceTracker::new(nodes));

        info!("Starting {} routers", routers.len());
        let mut tasks = JoinSet::new();
        for router in routers {
            tasks.spawn(run_router(
                router,
                transport.clone(),
                tracker.clone(),
                self.params.clone(),
            ));
        }

        let mut report = SimulationReport::default();
        while let Some(res) = tasks.join_next().await {
            let outcome = match res {
                Ok(outcome) => outcome,
                Err(err) => {
                    // the others would wait for it at the next barrier forever
                    tasks.abort_all();
                    return Err(anyhow!(err).context("Router task failed"));
                }
            };
            report.rounds = report.rounds.max(outcome.iterations);
            report.tables.insert(outcome.address, outcome.table);
        }

        info!("All routers have converged after {} rounds", report.rounds);
        Ok(report)
    }
}

impl SimulationReport {
    pub fn table_of(&self, node: &str) -> Option<&RoutingTable> {
        self.tables.get(node)
    }

    /// Compares every table against Dijkstra over the same topology
    pub fn mismatches(&self, topology: &Topology) -> Vec<Mismatch> {
        let mut mismatches = Vec::new();
        for (router, expected) in topology.shortest_paths() {
            let actual = self.tables.get(&router);
            for (dest, metric) in &expected {
                let found = actual.map_or(INF, |t| t.metric_to(dest));
                if found != *metric {
                    mismatches.push(Mismatch {
                        router: router.clone(),
                        dest: dest.clone(),
                        expected: *metric,
                        actual: found,
                    });
                }
            }
        }
        mismatches
    }
}
