use std::io;
use std::time::Duration;

use crate::router::NodeId;

/// Receives the event log of a single router.
///
/// Every line is complete and already timestamped, the sink only has to store it.
pub trait RouterLog: Send + 'static {
    fn write_line(&mut self, line: &str);

    /// Called when a round ends, buffered sinks should persist what they hold
    fn flush(&mut self) {}
}

/// Opens one [`RouterLog`] per router when a simulation starts
pub trait LogFactory {
    type Log: RouterLog;
    fn open(&self, node: &NodeId) -> io::Result<Self::Log>;
}

/// Simulation Parameters
#[derive(Clone, Debug)]
pub struct SimParams {
    /// pause taken by every router before it waits for the round barrier.
    /// the barrier alone is enough for correctness, this only paces the simulation.
    pub round_interval: Duration,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            round_interval: Duration::ZERO,
        }
    }
}

impl SimParams {
    pub fn with_round_interval(mut self, interval: Duration) -> Self {
        self.round_interval = interval;
        self
    }
}
