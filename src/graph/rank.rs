//! Import centrality ranking.
//!
//! Authority flows from an importer to the file it imports: a file imported
//! by many files, or by important files, ranks high. Scores are computed by
//! power iteration over the incoming view of the graph:
//!
//! ```text
//! next[v] = (1 - d) / n + d * sum(score[u] / out_degree[u] for u importing v)
//! ```
//!
//! Nodes with no outgoing edges do not hand their mass to anyone; it is not
//! spread over the graph. Final scores are divided by the maximum, so the top
//! file has rank 1.0.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::IngestConfig;
use crate::graph::ImportGraph;

/// Default node count from which the per-node update runs in parallel.
pub const PARALLEL_THRESHOLD: usize = 2048;

/// Decimal places kept in the top-K list.
const DISPLAY_PRECISION: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct RankConfig {
    pub damping: f64,
    pub max_iterations: usize,
    pub epsilon: f64,
    pub top_k: usize,
    /// Below this node count the per-node update runs sequentially
    pub parallel_threshold: usize,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            max_iterations: 50,
            epsilon: 1e-6,
            top_k: 20,
            parallel_threshold: PARALLEL_THRESHOLD,
        }
    }
}

impl From<&IngestConfig> for RankConfig {
    fn from(config: &IngestConfig) -> Self {
        Self {
            damping: config.damping,
            max_iterations: config.max_iterations,
            epsilon: config.convergence_epsilon,
            top_k: config.top_files_count,
            parallel_threshold: PARALLEL_THRESHOLD,
        }
    }
}

/// A top-ranked file with its rank rounded for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedFile {
    pub path: String,
    pub rank: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankResult {
    /// Normalized score per node id
    pub scores: HashMap<String, f64>,
    pub iterations: usize,
    /// False if `max_iterations` ran out before the change fell below epsilon
    pub converged: bool,
    /// Highest scores first; ties keep node order
    pub top_files: Vec<RankedFile>,
}

impl RankResult {
    fn empty() -> Self {
        Self {
            scores: HashMap::new(),
            iterations: 0,
            converged: true,
            top_files: Vec::new(),
        }
    }
}

/// Rank every node of `graph` and write the normalized score to `GraphNode::rank`.
///
/// Never fails. Cycles either converge or exhaust `max_iterations`; the
/// outcome is deterministic for a given graph and config. All iteration
/// state is local to the call.
pub fn rank_graph(graph: &mut ImportGraph, config: &RankConfig) -> RankResult {
    let n = graph.node_count();
    if n == 0 {
        return RankResult::empty();
    }

    let (mut scores, iterations, converged) =
        power_iterate(&graph.incoming, &graph.outgoing, config);

    let max = scores.iter().cloned().fold(0.0_f64, f64::max);
    if max > 0.0 {
        for score in scores.iter_mut() {
            *score /= max;
        }
    }

    for (node, &score) in graph.nodes.iter_mut().zip(&scores) {
        node.rank = score;
    }

    let mut order: Vec<usize> = (0..n).collect();
    // Stable sort keeps node order among equal scores.
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    let top_files = order
        .into_iter()
        .take(config.top_k)
        .map(|i| RankedFile {
            path: graph.nodes[i].id.clone(),
            rank: round_rank(scores[i]),
        })
        .collect();

    log::info!(
        "Ranked {} nodes: {} iterations, converged: {}",
        n,
        iterations,
        converged
    );

    RankResult {
        scores: graph
            .nodes
            .iter()
            .map(|node| (node.id.clone(), node.rank))
            .collect(),
        iterations,
        converged,
        top_files,
    }
}

/// Raw (unnormalized) scores, iterations run, and whether they converged.
fn power_iterate(
    incoming: &[Vec<usize>],
    outgoing: &[Vec<usize>],
    config: &RankConfig,
) -> (Vec<f64>, usize, bool) {
    let n = incoming.len();
    let base = (1.0 - config.damping) / n as f64;
    let out_degree: Vec<f64> = outgoing.iter().map(|targets| targets.len() as f64).collect();

    let mut scores = vec![1.0 / n as f64; n];
    let mut next = vec![0.0; n];
    let mut iterations = 0;
    let mut converged = false;

    let update = |v: usize, scores: &[f64]| -> f64 {
        let inflow: f64 = incoming[v]
            .iter()
            .map(|&u| scores[u] / out_degree[u])
            .sum();
        base + config.damping * inflow
    };

    while iterations < config.max_iterations {
        iterations += 1;

        if n >= config.parallel_threshold {
            next.par_iter_mut()
                .enumerate()
                .for_each(|(v, slot)| *slot = update(v, &scores));
        } else {
            for (v, slot) in next.iter_mut().enumerate() {
                *slot = update(v, &scores);
            }
        }

        let max_change = scores
            .iter()
            .zip(&next)
            .map(|(old, new)| (new - old).abs())
            .fold(0.0_f64, f64::max);

        std::mem::swap(&mut scores, &mut next);

        if max_change < config.epsilon {
            converged = true;
            break;
        }
    }

    (scores, iterations, converged)
}

fn round_rank(score: f64) -> f64 {
    (score * DISPLAY_PRECISION).round() / DISPLAY_PRECISION
}
