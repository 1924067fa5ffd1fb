#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::router::{Metric, NodeId};

/// A router directly connected to us over a single link
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Neighbour {
    /// the routing network address of the neighbour
    pub addr: NodeId,
    /// Direct link-cost to this neighbour. Lower is better.
    /// Fixed for the lifetime of the router.
    pub link_cost: Metric,
}

impl Neighbour {
    pub fn new(addr: impl Into<NodeId>, link_cost: Metric) -> Self {
        Self {
            addr: addr.into(),
            link_cost,
        }
    }
}
