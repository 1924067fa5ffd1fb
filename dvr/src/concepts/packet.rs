use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::concepts::route::RoutingTable;
use crate::router::NodeId;

/// A snapshot of a router's table, taken when it was broadcast.
///
/// The table is shared behind an [`Arc`], so broadcasting the same snapshot to every
/// neighbour does not copy it.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DistanceVector {
    /// the router that advertised this vector
    pub origin: NodeId,
    pub table: Arc<RoutingTable>,
}

impl DistanceVector {
    pub fn new(origin: NodeId, table: RoutingTable) -> Self {
        Self {
            origin,
            table: Arc::new(table),
        }
    }
}

/// A vector waiting to be handed to the transport
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OutboundPacket {
    // from this router
    pub sender: NodeId,
    // to this neighbour
    pub dest: NodeId,
    pub vector: DistanceVector,
}
