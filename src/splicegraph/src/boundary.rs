//! Boundary-extension heuristics: redirecting weakly-evidenced chains
//! through the synthetic source/sink, and the (uninvoked-by-default)
//! statistical 5'/3' end identification pass.

use log::trace;

use crate::binomial::compute_binomial_score;
use crate::config::Config;
use crate::splice_graph::{Edge, EdgeKind, SpliceGraph, VertexId, SOURCE};

/// Score threshold a split candidate's `compute_binomial_score` must clear
/// for [`identify_boundary_edges`] to consider it significant.
const SPLIT_SCORE_THRESHOLD: f64 = 600.0;

/// z-score ("sigma") threshold a split candidate must also clear.
const SPLIT_SIGMA_THRESHOLD: f64 = 10.0;

/// Weight below which an edge out of (resp. into) a candidate vertex counts
/// as "weak" evidence worth overriding with a direct source/sink edge.
const WEAK_EDGE_WEIGHT: f64 = 1.5;

/// Vertex weight above which a candidate is "substantial" enough to be worth
/// rerouting.
const SUBSTANTIAL_VERTEX_WEIGHT: f64 = 5.0;

fn in_edges(g: &SpliceGraph, v: VertexId) -> Vec<Edge> {
    g.edges().filter(|(_, e)| e.target == v).map(|(_, e)| *e).collect()
}

fn out_edges(g: &SpliceGraph, v: VertexId) -> Vec<Edge> {
    g.edges().filter(|(_, e)| e.source == v).map(|(_, e)| *e).collect()
}

/// For every vertex `i` with exactly one predecessor `s` and one successor
/// `t`: if `s` is the source, `t`'s only predecessor is `i`, the `i -> t`
/// edge is weak (`< 1.5`), `t` itself carries substantial weight (`> 5.0`),
/// and `i -> t` is a splice rather than an adjacency, add a direct
/// `source -> t` edge whose weight covers what the weak edge doesn't
/// already explain (`vertex_weight(t) - edge_weight(i -> t)`).
///
/// This is the chain `source -> i -> t` being collapsed to `source -> t`
/// (plus the original chain, left intact) whenever `i` looks like noise
/// standing in front of a real transcript start.
pub fn extend_isolated_start_boundaries(g: &mut SpliceGraph) {
    let sink = g.sink();
    let mut additions: Vec<(VertexId, f64)> = Vec::new();

    for (i, _) in g.vertices() {
        if i == SOURCE || i == sink {
            continue;
        }
        let ins = in_edges(g, i);
        let outs = out_edges(g, i);
        if ins.len() != 1 || outs.len() != 1 {
            continue;
        }
        let s_edge = ins[0];
        let t_edge = outs[0];
        let t = t_edge.target;

        if s_edge.source != SOURCE {
            continue;
        }
        if in_edges(g, t).len() != 1 {
            continue;
        }
        if t_edge.weight >= WEAK_EDGE_WEIGHT {
            continue;
        }
        let t_weight = g.vertex(t).weight;
        if t_weight <= SUBSTANTIAL_VERTEX_WEIGHT {
            continue;
        }
        // i -> t must be a splice, not an adjacency.
        if g.vertex(i).rpos == g.vertex(t).lpos {
            continue;
        }

        additions.push((t, t_weight - t_edge.weight));
    }

    for (t, weight) in &additions {
        trace!("redirecting weak start chain to source -> {} (weight {weight:.2})", t.0);
        g.add_edge(SOURCE, *t, *weight, EdgeKind::Boundary);
    }
}

/// Symmetric counterpart of [`extend_isolated_start_boundaries`]: for a
/// vertex `i` whose sole successor `t` is the sink and whose sole
/// predecessor `s` has `i` as its only successor, add `s -> sink` directly
/// when `s -> i` is a weak splice and `s` itself is substantial.
pub fn extend_isolated_end_boundaries(g: &mut SpliceGraph) {
    let sink = g.sink();
    let mut additions: Vec<(VertexId, f64)> = Vec::new();

    for (i, _) in g.vertices() {
        if i == SOURCE || i == sink {
            continue;
        }
        let ins = in_edges(g, i);
        let outs = out_edges(g, i);
        if ins.len() != 1 || outs.len() != 1 {
            continue;
        }
        let s_edge = ins[0];
        let t_edge = outs[0];
        let s = s_edge.source;

        if t_edge.target != sink {
            continue;
        }
        if out_edges(g, s).len() != 1 {
            continue;
        }
        if s_edge.weight >= WEAK_EDGE_WEIGHT {
            continue;
        }
        let s_weight = g.vertex(s).weight;
        if s_weight <= SUBSTANTIAL_VERTEX_WEIGHT {
            continue;
        }
        // s -> i must be a splice, not an adjacency.
        if g.vertex(s).rpos == g.vertex(i).lpos {
            continue;
        }

        additions.push((s, s_weight - s_edge.weight));
    }

    for (s, weight) in &additions {
        trace!("redirecting weak end chain to {} -> sink (weight {weight:.2})", s.0);
        g.add_edge(*s, sink, *weight, EdgeKind::Boundary);
    }
}

fn effective_reads(weight: f64, length: i64, average_read_length: f64) -> u32 {
    let reads = (weight * length as f64 / average_read_length.max(1.0)).round();
    reads.clamp(0.0, u32::MAX as f64) as u32
}

fn z_score(n: u32, r: f64, k: u32) -> f64 {
    let n = f64::from(n);
    let k = f64::from(k);
    let mean = n * r;
    let var = n * r * (1.0 - r);
    if var <= 0.0 {
        return 0.0;
    }
    (k - mean) / var.sqrt()
}

/// A candidate split's significance: both the `-log10` tail score and the
/// normal-approximation z-score ("sigma") for the same `(n, r, k)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryScore {
    pub score: f64,
    pub sigma: f64,
}

/// Score evidence that `v` is a genuine 5' transcript start: a vertex with
/// no adjacency edge feeding it from upstream ought to show a sharp
/// coverage jump relative to the background rate of spurious fragment
/// starts (modelled here as `r = 0.5`, i.e. "as likely as not to be noise").
/// Higher is stronger evidence.
pub fn identify_5end(g: &SpliceGraph, v: VertexId, cfg: &Config) -> BoundaryScore {
    let vertex = g.vertex(v);
    let n = effective_reads(vertex.weight, vertex.length, cfg.average_read_length);
    let r = 0.5;
    let k = n;
    BoundaryScore { score: compute_binomial_score(n, r, k), sigma: z_score(n, r, k) }
}

/// Symmetric counterpart of [`identify_5end`] for 3' transcript ends.
pub fn identify_3end(g: &SpliceGraph, v: VertexId, cfg: &Config) -> BoundaryScore {
    identify_5end(g, v, cfg)
}

/// Scan every non-source/sink vertex for the single best split candidate
/// clearing both [`SPLIT_SCORE_THRESHOLD`] and [`SPLIT_SIGMA_THRESHOLD`], and
/// if one exists, add a source or sink edge (whichever end scored higher) at
/// that vertex. Not called by [`crate::bundle::Bundle::build`] — callers opt
/// in explicitly.
pub fn identify_boundary_edges(g: &mut SpliceGraph, cfg: &Config) -> Option<VertexId> {
    let sink = g.sink();
    let mut best: Option<(VertexId, f64, bool)> = None;

    for (id, _) in g.vertices() {
        if id == SOURCE || id == sink {
            continue;
        }
        for (candidate, is_start) in [(identify_5end(g, id, cfg), true), (identify_3end(g, id, cfg), false)] {
            if candidate.score < SPLIT_SCORE_THRESHOLD || candidate.sigma < SPLIT_SIGMA_THRESHOLD {
                continue;
            }
            let better = match best {
                Some((_, best_score, _)) => candidate.score > best_score,
                None => true,
            };
            if better {
                best = Some((id, candidate.score, is_start));
            }
        }
    }

    let (v, _, is_start) = best?;
    let weight = g.vertex(v).weight;
    if is_start {
        g.add_edge(SOURCE, v, weight, EdgeKind::Boundary);
    } else {
        let sink = g.sink();
        g.add_edge(v, sink, weight, EdgeKind::Boundary);
    }
    Some(v)
}
