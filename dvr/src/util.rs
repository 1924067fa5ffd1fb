use crate::router::{Metric, INF};
use std::cmp::min;

/// Adds two metrics, treating [`INF`] as absorbing.
///
/// Finite sums never reach [`INF`], they are capped at `INF - 1` instead.
///
/// # Examples
///
/// ```
/// use dvr::router::INF;
/// assert_eq!(dvr::util::sum_inf(2, 3), 5);
/// assert_eq!(dvr::util::sum_inf(2, INF), INF);
/// assert_eq!(dvr::util::sum_inf(INF - 1, 7), INF - 1);
/// ```
pub fn sum_inf(cost_a: Metric, cost_b: Metric) -> Metric {
    if cost_a == INF || cost_b == INF {
        INF
    } else {
        min((INF - 1) as u64, cost_a as u64 + cost_b as u64) as Metric
    }
}

/// Renders a metric for logs, `inf` for unreachable
pub fn fmt_metric(metric: Metric) -> String {
    if metric == INF {
        "inf".to_string()
    } else {
        metric.to_string()
    }
}
