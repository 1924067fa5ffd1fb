use thiserror::Error;

use crate::router::{Metric, NodeId};

/// Errors raised while routers exchange distance vectors.
/// None of these stop the simulation by themselves.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum RoutingError {
    /// The vector was advertised by a node we have never heard of.
    /// This can only be caused by a misconfigured transport, the vector is dropped.
    #[error("Sender '{sender}' not found in routing table of router '{router}'")]
    UnknownSender { router: NodeId, sender: NodeId },
    /// A packet was addressed to a router that has no inbound channel
    #[error("No router '{dest}' is attached to the transport (sent by '{sender}')")]
    UnknownReceiver { sender: NodeId, dest: NodeId },
    /// The inbound channel of a router was closed while packets were still being sent
    #[error("Channel to router '{dest}' is closed")]
    ChannelClosed { dest: NodeId },
}

/// Although this is an error enum, these should be treated as warnings.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum RoutingWarning {
    /// A zero cost link makes both ends indistinguishable for routing purposes.
    #[error("Link {a} <-> {b} has a metric of zero")]
    MetricIsZero { a: NodeId, b: NodeId },
}

/// Fatal configuration errors, raised before any router is started
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum TopologyError {
    #[error("Topology is missing the {0} line")]
    MissingLine(&'static str),
    #[error("Invalid router count '{0}'")]
    InvalidCount(String),
    #[error("Expected {expected} routers, but {found} were listed")]
    CountMismatch { expected: usize, found: usize },
    #[error("Router '{0}' is listed more than once")]
    DuplicateNode(NodeId),
    #[error("Line {line}: expected '<router> <router> <cost>', got '{content}'")]
    MalformedLink { line: usize, content: String },
    #[error("Line {line}: invalid link cost '{cost}'")]
    InvalidCost { line: usize, cost: String },
    #[error("Link {a} <-> {b} references unknown router '{unknown}'")]
    UnknownNode {
        a: NodeId,
        b: NodeId,
        unknown: NodeId,
    },
    #[error("Router '{0}' cannot link to itself")]
    SelfLoop(NodeId),
    #[error("Link {a} <-> {b} has cost {cost}, which is reserved for unreachable routes")]
    CostTooLarge { a: NodeId, b: NodeId, cost: Metric },
}
