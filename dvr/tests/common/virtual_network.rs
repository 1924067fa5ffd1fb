use std::collections::BTreeMap;

use dvr::concepts::packet::OutboundPacket;
use dvr::feedback::RoutingError;
use dvr::framework::LogFactory;
use dvr::logging::{MemoryLog, MemoryLogFactory};
use dvr::router::{Metric, NodeId, Router};
use dvr::topology::Topology;

/// A lock-step network: every tick is one round of every router, packets sent during a
/// round's delivery phase arrive in the next tick
pub struct VirtualSystem {
    pub routers: Vec<Router<MemoryLog>>,
    pub logs: MemoryLogFactory,
    /// packets waiting for delivery, by destination
    pub packets: BTreeMap<NodeId, Vec<OutboundPacket>>,
    /// metric of (router, dest) at the end of every tick
    pub history: BTreeMap<(NodeId, NodeId), Vec<Metric>>,
    pub errors: Vec<RoutingError>,
}

impl VirtualSystem {
    pub fn create(topology: &Topology) -> VirtualSystem {
        let logs = MemoryLogFactory::new();
        let routers = topology
            .nodes()
            .iter()
            .map(|id| {
                let log = logs.open(id).unwrap();
                Router::new(id.clone(), topology.neighbours_of(id), topology.nodes(), log)
            })
            .collect();
        VirtualSystem {
            routers,
            logs,
            packets: Default::default(),
            history: Default::default(),
            errors: Vec::new(),
        }
    }

    pub fn get_node(&self, node: &str) -> &Router<MemoryLog> {
        self.routers
            .iter()
            .find(|r| r.address == node)
            .unwrap_or_else(|| panic!("No node {node} found"))
    }

    pub fn get_metric_to(&self, cur: &str, dest: &str) -> Metric {
        self.get_node(cur).metric_to(dest)
    }

    pub fn history_of(&self, cur: &str, dest: &str) -> &[Metric] {
        self.history
            .get(&(cur.to_string(), dest.to_string()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Puts a packet on the wire, as if some router had sent it
    pub fn inject(&mut self, packet: OutboundPacket) {
        self.packets.entry(packet.dest.clone()).or_default().push(packet);
    }

    pub fn flush_packets(&mut self) {
        for router in &mut self.routers {
            for packet in router.outbound_packets.drain(..) {
                self.packets.entry(packet.dest.clone()).or_default().push(packet);
            }
        }
    }

    /// Runs one round, returns true if every router went through it without changes
    pub fn tick(&mut self) -> bool {
        for router in &mut self.routers {
            router.begin_round();
            router.broadcast();
        }
        self.flush_packets();

        let mut inbox = std::mem::take(&mut self.packets);
        for router in &mut self.routers {
            for packet in inbox.remove(&router.address).unwrap_or_default() {
                if let Err(err) = router.handle_vector(&packet.vector) {
                    self.errors.push(err);
                }
            }
        }
        // triggered updates, delivered next tick
        self.flush_packets();

        let converged: Vec<bool> = self.routers.iter_mut().map(|r| r.finish_round()).collect();
        for router in &self.routers {
            for (dest, metric) in router.table() {
                self.history
                    .entry((router.address.clone(), dest.clone()))
                    .or_default()
                    .push(*metric);
            }
        }
        converged.into_iter().all(|x| x) && self.packets.is_empty()
    }

    pub fn tick_n(&mut self, times: usize) {
        for _ in 0..times {
            self.tick();
        }
    }

    /// Ticks until a quiet round, returns the number of rounds it took
    pub fn converge(&mut self, max_rounds: usize) -> usize {
        for round in 1..=max_rounds {
            if self.tick() {
                return round;
            }
        }
        panic!("network did not converge within {max_rounds} rounds");
    }

    pub fn tables(&self) -> BTreeMap<NodeId, dvr::concepts::route::RoutingTable> {
        self.routers
            .iter()
            .map(|r| (r.address.clone(), r.table().clone()))
            .collect()
    }
}
