//! dvr simulates the distance vector routing protocol.
//!
//! Every router runs as its own task, knows only its direct neighbours, and exchanges
//! distance vectors over a shared in-memory [`transport::Transport`] until no table changes
//! anymore. The [`router::Router`] itself does no I/O and can be driven by hand.

pub mod concepts;
pub mod convergence;
pub mod feedback;
pub mod framework;
pub mod logging;
pub mod node;
pub mod router;
pub mod simulation;
pub mod topology;
pub mod transport;
pub mod util;
