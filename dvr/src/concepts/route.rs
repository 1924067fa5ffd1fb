use std::collections::btree_map::Iter;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::router::{Metric, NodeId, INF};
use crate::util::fmt_metric;

/// Best known cost to every destination, ordered by address.
///
/// Destinations with no known path hold [`INF`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct RoutingTable {
    routes: BTreeMap<NodeId, Metric>,
}

impl RoutingTable {
    /// Creates a table with every destination unreachable
    pub fn unreachable<'a>(nodes: impl IntoIterator<Item = &'a NodeId>) -> Self {
        Self {
            routes: nodes.into_iter().map(|n| (n.clone(), INF)).collect(),
        }
    }

    pub fn get(&self, dest: &str) -> Option<Metric> {
        self.routes.get(dest).copied()
    }

    /// Returns the metric to `dest`, [`INF`] if the destination is not known at all
    pub fn metric_to(&self, dest: &str) -> Metric {
        self.get(dest).unwrap_or(INF)
    }

    pub fn contains(&self, dest: &str) -> bool {
        self.routes.contains_key(dest)
    }

    pub fn set(&mut self, dest: NodeId, metric: Metric) {
        self.routes.insert(dest, metric);
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, NodeId, Metric> {
        self.routes.iter()
    }
}

impl<'a> IntoIterator for &'a RoutingTable {
    type Item = (&'a NodeId, &'a Metric);
    type IntoIter = Iter<'a, NodeId, Metric>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<(NodeId, Metric)> for RoutingTable {
    fn from_iter<I: IntoIterator<Item = (NodeId, Metric)>>(iter: I) -> Self {
        Self {
            routes: iter.into_iter().collect(),
        }
    }
}

impl Display for RoutingTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let entries: Vec<String> = self
            .routes
            .iter()
            .map(|(dest, metric)| format!("{dest}: {}", fmt_metric(*metric)))
            .collect();
        write!(f, "{{{}}}", entries.join(", "))
    }
}
