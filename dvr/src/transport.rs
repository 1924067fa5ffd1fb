use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::concepts::packet::OutboundPacket;
use crate::feedback::RoutingError;
use crate::router::NodeId;

/// Reliable in-memory transport shared by every router.
///
/// Each router owns one unbounded inbox, so packets from the same sender arrive in the
/// order they were sent, and a packet is drained by exactly one router.
#[derive(Debug)]
pub struct Transport {
    inboxes: HashMap<NodeId, (Sender<OutboundPacket>, Receiver<OutboundPacket>)>,
    in_flight: AtomicUsize,
}

impl Transport {
    pub fn new<'a>(nodes: impl IntoIterator<Item = &'a NodeId>) -> Self {
        Self {
            inboxes: nodes
                .into_iter()
                .map(|node| (node.clone(), unbounded()))
                .collect(),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Enqueues a packet for its destination, never blocks
    pub fn send(&self, packet: OutboundPacket) -> Result<(), RoutingError> {
        let Some((tx, _)) = self.inboxes.get(&packet.dest) else {
            return Err(RoutingError::UnknownReceiver {
                sender: packet.sender,
                dest: packet.dest,
            });
        };
        // count before sending, so the receiver can never decrement first
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        if let Err(err) = tx.send(packet) {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            return Err(RoutingError::ChannelClosed { dest: err.0.dest });
        }
        Ok(())
    }

    /// Takes every packet currently waiting for `node`.
    ///
    /// Packets that arrive while draining are left for the next call.
    pub fn drain(&self, node: &str) -> Vec<OutboundPacket> {
        let Some((_, rx)) = self.inboxes.get(node) else {
            return Vec::new();
        };
        let available = rx.len();
        let packets: Vec<OutboundPacket> = (0..available).map_while(|_| rx.try_recv().ok()).collect();
        self.in_flight.fetch_sub(packets.len(), Ordering::SeqCst);
        packets
    }

    /// Number of packets sent but not drained yet
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Number of packets waiting for `node`
    pub fn pending_for(&self, node: &str) -> usize {
        self.inboxes.get(node).map_or(0, |(_, rx)| rx.len())
    }
}
