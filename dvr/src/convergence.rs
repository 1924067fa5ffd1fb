use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use log::warn;
use tokio::sync::Barrier;

use crate::router::NodeId;

/// Shared record of which routers believe they have converged.
///
/// Each router only ever writes its own flag. Reads of the global predicate are only
/// meaningful between two [`ConvergenceTracker::wait_round`] calls, where no router is
/// writing.
#[derive(Debug)]
pub struct ConvergenceTracker {
    flags: Mutex<BTreeMap<NodeId, bool>>,
    /// number of `true` flags, kept in step with `flags` under its lock
    converged: AtomicUsize,
    total: usize,
    barrier: Barrier,
}

impl ConvergenceTracker {
    pub fn new<'a>(nodes: impl IntoIterator<Item = &'a NodeId>) -> Self {
        let flags: BTreeMap<NodeId, bool> = nodes.into_iter().map(|n| (n.clone(), false)).collect();
        let total = flags.len();
        Self {
            flags: Mutex::new(flags),
            converged: AtomicUsize::new(0),
            total,
            // a barrier of zero behaves like one, there is nobody to wait for anyway
            barrier: Barrier::new(total.max(1)),
        }
    }

    /// Records whether `node` converged in the round it just finished
    pub fn set_converged(&self, node: &str, converged: bool) {
        let mut flags = self.flags.lock().unwrap_or_else(|e| e.into_inner());
        let Some(flag) = flags.get_mut(node) else {
            warn!("Ignoring convergence flag of unknown router {node}");
            return;
        };
        if *flag != converged {
            *flag = converged;
            if converged {
                self.converged.fetch_add(1, Ordering::SeqCst);
            } else {
                self.converged.fetch_sub(1, Ordering::SeqCst);
            }
        }
    }

    pub fn is_converged(&self, node: &str) -> bool {
        let flags = self.flags.lock().unwrap_or_else(|e| e.into_inner());
        flags.get(node).copied().unwrap_or(false)
    }

    /// true once every router reported a round without changes
    pub fn all_converged(&self) -> bool {
        self.converged.load(Ordering::SeqCst) == self.total
    }

    pub fn converged_count(&self) -> usize {
        self.converged.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> BTreeMap<NodeId, bool> {
        self.flags.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Waits until every router reached the same point of the round
    pub async fn wait_round(&self) {
        self.barrier.wait().await;
    }
}
