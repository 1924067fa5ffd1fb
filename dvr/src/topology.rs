use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use log::warn;

use crate::concepts::neighbour::Neighbour;
use crate::concepts::route::RoutingTable;
use crate::feedback::{RoutingWarning, TopologyError};
use crate::router::{Metric, NodeId, INF};
use crate::util::sum_inf;

/// A static network: routers and the bidirectional links between them
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Topology {
    nodes: Vec<NodeId>,
    /// keyed by (smaller, larger) address
    links: BTreeMap<(NodeId, NodeId), Metric>,
}

impl Topology {
    /// Creates a topology without links, router ids must be unique
    pub fn new(nodes: impl IntoIterator<Item = impl Into<NodeId>>) -> Result<Self, TopologyError> {
        let mut seen = BTreeSet::new();
        let mut list = Vec::new();
        for node in nodes {
            let node = node.into();
            if !seen.insert(node.clone()) {
                return Err(TopologyError::DuplicateNode(node));
            }
            list.push(node);
        }
        Ok(Self {
            nodes: list,
            links: BTreeMap::new(),
        })
    }

    /// Builds a topology from string slices, handy for fixtures
    pub fn from_links(nodes: &[&str], links: &[(&str, &str, Metric)]) -> Result<Self, TopologyError> {
        let mut topology = Self::new(nodes.iter().copied())?;
        for (a, b, cost) in links {
            topology.add_link(a, b, *cost)?;
        }
        Ok(topology)
    }

    /// Adds (or replaces) the link between `a` and `b`
    pub fn add_link(&mut self, a: &str, b: &str, cost: Metric) -> Result<Option<RoutingWarning>, TopologyError> {
        for end in [a, b] {
            if !self.contains(end) {
                return Err(TopologyError::UnknownNode {
                    a: a.to_string(),
                    b: b.to_string(),
                    unknown: end.to_string(),
                });
            }
        }
        if a == b {
            return Err(TopologyError::SelfLoop(a.to_string()));
        }
        if cost == INF {
            return Err(TopologyError::CostTooLarge {
                a: a.to_string(),
                b: b.to_string(),
                cost,
            });
        }
        let key = if a < b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        };
        self.links.insert(key, cost);

        if cost == 0 {
            let warning = RoutingWarning::MetricIsZero {
                a: a.to_string(),
                b: b.to_string(),
            };
            warn!("{warning}");
            return Ok(Some(warning));
        }
        Ok(None)
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn contains(&self, node: &str) -> bool {
        self.nodes.iter().any(|n| n == node)
    }

    pub fn links(&self) -> impl Iterator<Item = (&NodeId, &NodeId, Metric)> {
        self.links.iter().map(|((a, b), cost)| (a, b, *cost))
    }

    pub fn link_cost(&self, a: &str, b: &str) -> Option<Metric> {
        let (x, y) = if a < b { (a, b) } else { (b, a) };
        self.links.get(&(x.to_string(), y.to_string())).copied()
    }

    /// The neighbour set of `node`, ordered by address
    pub fn neighbours_of(&self, node: &str) -> Vec<Neighbour> {
        self.links
            .iter()
            .filter_map(|((a, b), cost)| {
                if a == node {
                    Some(Neighbour::new(b.clone(), *cost))
                } else if b == node {
                    Some(Neighbour::new(a.clone(), *cost))
                } else {
                    None
                }
            })
            .collect()
    }

    // region Parsing

    /// Parses the textual topology format:
    ///
    /// ```text
    /// 3
    /// A B C
    /// A B 2
    /// B C 3
    /// EOF
    /// ```
    ///
    /// The first line is the router count, the second the router ids, then one link per line.
    /// A trailing `EOF` line is optional. Blank lines are ignored.
    pub fn parse(input: &str) -> Result<Self, TopologyError> {
        let mut lines = input
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty())
            .collect::<Vec<_>>();

        if matches!(lines.last(), Some((_, last)) if last.eq_ignore_ascii_case("EOF")) {
            lines.pop();
        }
        let mut lines = lines.into_iter();

        let (_, count) = lines.next().ok_or(TopologyError::MissingLine("router count"))?;
        let count =
            usize::from_str(count).map_err(|_| TopologyError::InvalidCount(count.to_string()))?;
        let (_, ids) = lines.next().ok_or(TopologyError::MissingLine("router list"))?;
        let ids: Vec<&str> = ids.split_whitespace().collect();
        if ids.len() != count {
            return Err(TopologyError::CountMismatch {
                expected: count,
                found: ids.len(),
            });
        }

        let mut topology = Self::new(ids)?;
        for (line, content) in lines {
            let parts: Vec<&str> = content.split_whitespace().collect();
            let [a, b, cost] = parts[..] else {
                return Err(TopologyError::MalformedLink {
                    line,
                    content: content.to_string(),
                });
            };
            let cost = Metric::from_str(cost).map_err(|_| TopologyError::InvalidCost {
                line,
                cost: cost.to_string(),
            })?;
            topology.add_link(a, b, cost)?;
        }
        Ok(topology)
    }

    /// Reads and parses a topology file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let input = fs::read_to_string(path)
            .with_context(|| format!("Failed to read topology file {}", path.display()))?;
        let topology = Self::parse(&input)
            .with_context(|| format!("Invalid topology file {}", path.display()))?;
        Ok(topology)
    }

    // endregion

    // region Reference

    /// Single source shortest paths from `source` (Dijkstra), unreachable routers hold [`INF`]
    pub fn shortest_from(&self, source: &str) -> RoutingTable {
        let mut dist: BTreeMap<&str, Metric> = self.nodes.iter().map(|n| (n.as_str(), INF)).collect();
        let mut heap = BinaryHeap::new();
        if dist.contains_key(source) {
            dist.insert(source, 0);
            heap.push(Reverse((0, source)));
        }

        let adjacency = self.adjacency();
        while let Some(Reverse((cost, node))) = heap.pop() {
            if cost > dist[node] {
                continue;
            }
            for &(next, link) in adjacency.get(node).into_iter().flatten() {
                let candidate = sum_inf(cost, link);
                if candidate < dist[next] {
                    dist.insert(next, candidate);
                    heap.push(Reverse((candidate, next)));
                }
            }
        }
        dist.into_iter().map(|(n, m)| (n.to_string(), m)).collect()
    }

    /// Shortest path tables for every router
    pub fn shortest_paths(&self) -> BTreeMap<NodeId, RoutingTable> {
        self.nodes
            .iter()
            .map(|n| (n.clone(), self.shortest_from(n)))
            .collect()
    }

    fn adjacency(&self) -> BTreeMap<&str, Vec<(&str, Metric)>> {
        let mut adj: BTreeMap<&str, Vec<(&str, Metric)>> = BTreeMap::new();
        for ((a, b), cost) in &self.links {
            adj.entry(a.as_str()).or_default().push((b.as_str(), *cost));
            adj.entry(b.as_str()).or_default().push((a.as_str(), *cost));
        }
        adj
    }

    // endregion
}
