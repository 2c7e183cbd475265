//! Hyperedges: multi-exon paths witnessed by a single read or read pair, and
//! their materialization against a [`SpliceGraph`]'s edge set.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::splice_graph::{EdgeId, SpliceGraph, VertexId};

/// Fold one qname group's accumulated pexon-index run into the node tally:
/// sorted, deduplicated, and shifted by +1 to splice-graph vertex numbering
/// (`SpliceGraph::vertex_of_pexon`), per §4.11 — "Node map keys: sorted,
/// unique, +1-shifted lists". Lists whose *unique* length is below 2 carry no
/// path information and are dropped, not stored. Ported from
/// `hyper_set.cc::add_node_list`.
fn add_node_list(tally: &mut BTreeMap<Vec<usize>, u32>, acc: &[usize]) {
    let unique: BTreeSet<usize> = acc.iter().copied().collect();
    if unique.len() < 2 {
        return;
    }
    let shifted: Vec<usize> = unique.into_iter().map(|v| v + 1).collect();
    *tally.entry(shifted).or_insert(0) += 1;
}

/// Aggregate per-qname pexon-index runs into a node-list tally.
///
/// `segments` is, per alignment record (one entry per read *or* per mate of a
/// pair, already grouped so records sharing a `qname` are contiguous — the
/// caller sorts, this function does not), the ascending run of pexon indices
/// that alignment's matched intervals fall into.
///
/// Within one qname group, runs are concatenated in order, *unless* the gap
/// between the end of the accumulated run and the start of the next segment
/// is inconsistent (`acc.last() + 1 < next.first()`), in which case the
/// accumulator is discarded outright (not recorded as a hyperedge of its
/// own) and restarts from the new segment — two segments of the same read
/// pair that don't abut or overlap don't describe one contiguous path, and
/// the discarded prefix carries no independent evidence either. Only the
/// run still standing at the end of a qname group is ever flushed, into
/// [`add_node_list`], which sorts, dedupes, and +1-shifts it before it
/// becomes a tally key.
///
/// This is the aggregator actually used by the pipeline; the older,
/// single-hit-per-hyperedge approach (`build_hyper_edges1` below) produces
/// strictly poorer node lists and exists only for a comparison test.
pub fn build_hyper_edges2(segments: impl IntoIterator<Item = (String, Vec<usize>)>) -> BTreeMap<Vec<usize>, u32> {
    let mut grouped: Vec<(String, Vec<usize>)> = segments.into_iter().collect();
    grouped.sort_by(|a, b| a.0.cmp(&b.0));

    let mut tally: BTreeMap<Vec<usize>, u32> = BTreeMap::new();
    let mut i = 0;
    while i < grouped.len() {
        let qname = grouped[i].0.clone();
        let mut acc: Vec<usize> = Vec::new();
        while i < grouped.len() && grouped[i].0 == qname {
            let sp = std::mem::take(&mut grouped[i].1);
            if !sp.is_empty() {
                if let (Some(&last), Some(&first)) = (acc.last(), sp.first()) {
                    if last + 1 < first {
                        acc.clear();
                    }
                }
                acc.extend(sp);
            }
            i += 1;
        }
        add_node_list(&mut tally, &acc);
    }

    tally
}

/// The superseded single-hit aggregator: one node list per alignment record,
/// with no cross-mate merging. Kept only so a test can demonstrate that
/// [`build_hyper_edges2`] recovers strictly more (and longer) node lists from
/// paired evidence than this naive approach would.
#[allow(dead_code)]
fn build_hyper_edges1(segments: impl IntoIterator<Item = (String, Vec<usize>)>) -> BTreeMap<Vec<usize>, u32> {
    let mut tally: BTreeMap<Vec<usize>, u32> = BTreeMap::new();
    for (_, sp) in segments {
        add_node_list(&mut tally, &sp);
    }
    tally
}

/// Maps a splice-graph's `(source, target)` pairs to their [`EdgeId`], so a
/// node list's consecutive vertex pairs can be resolved to the edge ids they
/// traverse.
#[derive(Debug, Clone, Default)]
pub struct EdgeIndex {
    by_endpoints: HashMap<(VertexId, VertexId), EdgeId>,
}

impl EdgeIndex {
    pub fn build(g: &SpliceGraph) -> Self {
        let mut by_endpoints = HashMap::new();
        for (id, e) in g.edges() {
            by_endpoints.insert((e.source, e.target), id);
        }
        Self { by_endpoints }
    }

    pub fn get(&self, source: VertexId, target: VertexId) -> Option<EdgeId> {
        self.by_endpoints.get(&(source, target)).copied()
    }
}

/// The starting index of `needle` as a consecutive run within `haystack`, or
/// `None` if it doesn't appear as one.
fn consecutive_subset(haystack: &[EdgeId], needle: &[EdgeId]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// The materialized, purified set of hyperedges for one bundle: the raw
/// +1-shifted node-list tally (kept for inspection, e.g. [`crate`]'s `dump`
/// command), each surviving list's real splice-graph edge-id path, and the
/// inverted index from edge id to the hyperedges that traverse it.
#[derive(Debug, Clone, Default)]
pub struct HyperSet {
    nodes: BTreeMap<Vec<usize>, u32>,
    edges: Vec<Vec<EdgeId>>,
    e2s: HashMap<EdgeId, HashSet<usize>>,
}

impl HyperSet {
    /// Materialize `nodes` against `g`'s edges, keeping only lists meeting
    /// `min_router_count` and whose every consecutive vertex pair is a real
    /// edge, then [`purify`] the result and rebuild the inverted index
    /// against the post-purify, reindexed edge list.
    ///
    /// [`purify`]: HyperSet::purify
    pub fn build(nodes: BTreeMap<Vec<usize>, u32>, g: &SpliceGraph, min_router_count: u32) -> Self {
        let index = EdgeIndex::build(g);
        let mut hs = Self { nodes, ..Self::default() };
        hs.build_edges(&index, min_router_count);
        hs.build_index();
        hs.purify();
        hs.build_index();
        hs
    }

    /// The raw, sorted-unique, +1-shifted node lists and their support
    /// counts, before materialization and purification.
    pub fn nodes(&self) -> &BTreeMap<Vec<usize>, u32> {
        &self.nodes
    }

    pub fn edges(&self) -> &[Vec<EdgeId>] {
        &self.edges
    }

    pub fn e2s(&self) -> &HashMap<EdgeId, HashSet<usize>> {
        &self.e2s
    }

    /// Resolve every sufficiently-supported node list's vertex run to the
    /// splice-graph edge ids it traverses. A list is dropped outright (not
    /// kept as `None`) if its count is below `min_router_count` or it skips
    /// over a gap the splice graph has no direct edge for — the splice
    /// graph and the node lists were built from inconsistent inputs. Ported
    /// from `hyper_set.cc::build_edges`.
    fn build_edges(&mut self, index: &EdgeIndex, min_router_count: u32) {
        self.edges.clear();
        for (vv, &c) in &self.nodes {
            if c < min_router_count {
                continue;
            }
            let mut ve = Vec::with_capacity(vv.len().saturating_sub(1));
            let mut ok = true;
            for w in vv.windows(2) {
                match index.get(VertexId(w[0]), VertexId(w[1])) {
                    Some(e) => ve.push(e),
                    None => {
                        ok = false;
                        break;
                    }
                }
            }
            if ok {
                self.edges.push(ve);
            }
        }
    }

    /// Rebuild `e2s` from scratch against the current `edges`. Ported from
    /// `hyper_set.cc::build_index`.
    fn build_index(&mut self) {
        self.e2s.clear();
        for (i, v) in self.edges.iter().enumerate() {
            for &e in v {
                self.e2s.entry(e).or_default().insert(i);
            }
        }
    }

    /// The hyperedge indices whose edge list contains every edge in `v`,
    /// found by sequentially intersecting each edge's `e2s` entry. Empty if
    /// `v` is empty or any of its edges is unwitnessed. Ported from
    /// `hyper_set.cc::get_intersection`.
    pub fn get_intersection(&self, v: &[EdgeId]) -> HashSet<usize> {
        let Some((first, rest)) = v.split_first() else {
            return HashSet::new();
        };
        let Some(mut ss) = self.e2s.get(first).cloned() else {
            return HashSet::new();
        };
        for e in rest {
            let Some(s) = self.e2s.get(e) else {
                return HashSet::new();
            };
            ss = ss.intersection(s).copied().collect();
        }
        ss
    }

    /// Every edge that immediately follows `e` in some hyperedge. Ported
    /// from `hyper_set.cc::get_successors`.
    pub fn get_successors(&self, e: EdgeId) -> HashSet<EdgeId> {
        let mut out = HashSet::new();
        let Some(owners) = self.e2s.get(&e) else {
            return out;
        };
        for &k in owners {
            let v = &self.edges[k];
            for (i, &x) in v.iter().enumerate() {
                if x == e && i + 1 < v.len() {
                    out.insert(v[i + 1]);
                }
            }
        }
        out
    }

    /// Symmetric counterpart of [`HyperSet::get_successors`].
    pub fn get_predecessors(&self, e: EdgeId) -> HashSet<EdgeId> {
        let mut out = HashSet::new();
        let Some(owners) = self.e2s.get(&e) else {
            return out;
        };
        for &k in owners {
            let v = &self.edges[k];
            for (i, &x) in v.iter().enumerate() {
                if x == e && i >= 1 {
                    out.insert(v[i - 1]);
                }
            }
        }
        out
    }

    /// For every splice-graph edge incoming to vertex `x`, every (edge,
    /// successor) pair the hyperedge set witnesses for it. Ported from
    /// `hyper_set.cc::get_routes`.
    pub fn get_routes(&self, x: VertexId, g: &SpliceGraph) -> Vec<(EdgeId, EdgeId)> {
        let mut out = Vec::new();
        for (id, e) in g.edges() {
            if e.target != x {
                continue;
            }
            for s in self.get_successors(id) {
                out.push((id, s));
            }
        }
        out
    }

    /// Replace every consecutive occurrence of `v` across all hyperedges
    /// with the single edge `e` (used when the underlying splice graph's
    /// edges are merged). Ported from `hyper_set.cc::replace`.
    pub fn replace(&mut self, v: &[EdgeId], e: EdgeId) {
        if v.is_empty() {
            return;
        }
        let owners = self.get_intersection(v);
        for k in owners {
            let b = consecutive_subset(&self.edges[k], v).expect("get_intersection guarantees v is a consecutive run");
            self.edges[k][b] = e;
            self.edges[k].drain(b + 1..b + v.len());
            for &x in v {
                self.e2s.get_mut(&x).expect("edge in v must already be indexed").remove(&k);
            }
            self.e2s.entry(e).or_default().insert(k);
        }
    }

    /// Drop edge `e` from every hyperedge that contains it. `e` must sit at
    /// the head or tail of each — an interior occurrence would break the
    /// run's contiguity and is a programming error, not a recoverable case.
    /// Ported from `hyper_set.cc::remove`.
    pub fn remove(&mut self, e: EdgeId) {
        let Some(owners) = self.e2s.get(&e).cloned() else {
            return;
        };
        for k in owners {
            let vv = &mut self.edges[k];
            assert!(!vv.is_empty());
            if vv.first() == Some(&e) {
                vv.remove(0);
            } else if vv.last() == Some(&e) {
                vv.pop();
            } else {
                panic!("edge {e:?} occurs in the interior of hyperedge {k}, not at a head or tail");
            }
        }
        self.e2s.remove(&e);
    }

    /// True iff some hyperedge containing `e` does not have `e` at its left
    /// terminal.
    pub fn left_extend(&self, e: EdgeId) -> bool {
        let Some(owners) = self.e2s.get(&e) else {
            return false;
        };
        owners.iter().any(|&k| self.edges[k].first() != Some(&e))
    }

    /// Symmetric counterpart of [`HyperSet::left_extend`].
    pub fn right_extend(&self, e: EdgeId) -> bool {
        let Some(owners) = self.e2s.get(&e) else {
            return false;
        };
        owners.iter().any(|&k| self.edges[k].last() != Some(&e))
    }

    /// Drop any hyperedge whose full edge set is also contained, as a
    /// consecutive run, in some *other* hyperedge — i.e. it adds no path
    /// information the other one didn't already carry. Ported directly from
    /// `hyper_set.cc::purify`: an edge list survives only if the set of
    /// hyperedges containing every one of its edges has size 1 (itself).
    fn purify(&mut self) {
        let mut keep = Vec::with_capacity(self.edges.len());
        for (i, v) in self.edges.iter().enumerate() {
            let s = self.get_intersection(v);
            debug_assert!(s.contains(&i), "a hyperedge's own edges must always intersect back to itself");
            keep.push(s.len() < 2);
        }
        let mut idx = 0;
        self.edges.retain(|_| {
            let k = keep[idx];
            idx += 1;
            k
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pexon::{Pexon, PexonBoundary};

    #[test]
    fn contiguous_segments_of_one_qname_merge() {
        let segments = vec![("r1".to_string(), vec![0, 1]), ("r1".to_string(), vec![1, 2])];
        let nodes = build_hyper_edges2(segments);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes.into_iter().next().unwrap().0, vec![1, 2, 3]);
    }

    #[test]
    fn inconsistent_gap_discards_the_stale_prefix_not_emits_it() {
        // pexon 0..1, then a gap to 5..6: the mate pair is inconsistent, so
        // the [0, 1] prefix is dropped entirely rather than kept as its own
        // node list; only the run still accumulating at qname-group end
        // (here just [5, 6], shifted to [6, 7]) is flushed.
        let segments = vec![("r1".to_string(), vec![0, 1]), ("r1".to_string(), vec![5, 6])];
        let nodes = build_hyper_edges2(segments);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes.into_iter().next().unwrap().0, vec![6, 7]);
    }

    #[test]
    fn single_exon_skip_gap_is_consistent_and_merges() {
        // last=3 (0-based pexon 3), next.first()=4: 3 + 1 < 4 is false, so
        // this is a single-exon-skip gap and the runs concatenate.
        let segments = vec![("r1".to_string(), vec![2, 3]), ("r1".to_string(), vec![4, 5])];
        let nodes = build_hyper_edges2(segments);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes.into_iter().next().unwrap().0, vec![3, 4, 5, 6]);
    }

    #[test]
    fn single_vertex_segments_are_dropped() {
        let segments = vec![("r1".to_string(), vec![3])];
        let nodes = build_hyper_edges2(segments);
        assert!(nodes.is_empty());
    }

    #[test]
    fn duplicate_pexon_hits_across_overlapping_mates_do_not_pass_the_unique_length_check() {
        // two overlapping mates both landing fully in pexon 5: the raw
        // accumulator is [5, 5, 5, 5], but its *unique* length is 1, so no
        // node list is recorded at all.
        let segments = vec![("r1".to_string(), vec![5, 5]), ("r1".to_string(), vec![5, 5])];
        let nodes = build_hyper_edges2(segments);
        assert!(nodes.is_empty());
    }

    #[test]
    fn differently_duplicated_but_set_equal_accumulators_tally_to_the_same_key() {
        // [2,3,3,4] and [2,3,4] have the same unique, sorted, shifted form
        // ([3,4,5]) and must aggregate into one tally entry, not two.
        let segments = vec![
            ("r1".to_string(), vec![2, 3]),
            ("r1".to_string(), vec![3, 4]),
            ("r2".to_string(), vec![2, 3, 4]),
        ];
        let nodes = build_hyper_edges2(segments);
        assert_eq!(nodes.len(), 1);
        let (list, count) = nodes.into_iter().next().unwrap();
        assert_eq!(list, vec![3, 4, 5]);
        assert_eq!(count, 2);
    }

    #[test]
    fn build_hyper_edges2_outperforms_the_naive_single_hit_version() {
        let segments = vec![("r1".to_string(), vec![0, 1]), ("r1".to_string(), vec![1, 2, 3])];
        let merged = build_hyper_edges2(segments.clone());
        let naive = build_hyper_edges1(segments);
        let longest_merged = merged.keys().map(|v| v.len()).max().unwrap_or(0);
        let longest_naive = naive.keys().map(|v| v.len()).max().unwrap_or(0);
        assert!(longest_merged > longest_naive);
    }

    fn pexon(lpos: i64, rpos: i64, ltype: PexonBoundary, rtype: PexonBoundary) -> Pexon {
        Pexon { lpos, rpos, ltype, rtype, ave: 1.0, dev: 1.0 }
    }

    /// Four contiguous pexons (indices 0..3, vertices 1..4), linked by
    /// adjacency edges, so node lists over those vertex ids materialize to
    /// real edges.
    fn four_pexon_graph() -> SpliceGraph {
        let pexons = vec![
            pexon(0, 10, PexonBoundary::StartBoundary, PexonBoundary::Internal),
            pexon(10, 20, PexonBoundary::Internal, PexonBoundary::Internal),
            pexon(20, 30, PexonBoundary::Internal, PexonBoundary::Internal),
            pexon(30, 40, PexonBoundary::Internal, PexonBoundary::EndBoundary),
        ];
        SpliceGraph::build(&pexons, &[])
    }

    #[test]
    fn build_materializes_shifted_node_lists_to_real_edge_ids() {
        let g = four_pexon_graph();
        let index = EdgeIndex::build(&g);
        // pexons [0, 1] (vertices 1, 2) is the real adjacency edge between
        // the first two pexons.
        let e01 = index.get(VertexId(1), VertexId(2)).expect("adjacency edge must exist");

        let mut nodes = BTreeMap::new();
        nodes.insert(vec![1, 2], 3);
        let hs = HyperSet::build(nodes, &g, 1);

        assert_eq!(hs.edges(), &[vec![e01]]);
    }

    #[test]
    fn build_drops_a_node_list_whose_consecutive_pair_has_no_real_edge() {
        let g = four_pexon_graph();
        let mut nodes = BTreeMap::new();
        // vertices 1 and 4 (pexons 0 and 3) are not directly linked.
        nodes.insert(vec![1, 4], 3);
        let hs = HyperSet::build(nodes, &g, 1);
        assert!(hs.edges().is_empty());
    }

    #[test]
    fn purify_drops_subpaths_contained_in_a_longer_hyperedge() {
        let g = four_pexon_graph();
        let mut nodes = BTreeMap::new();
        nodes.insert(vec![1, 2], 3);
        nodes.insert(vec![1, 2, 3], 5);
        let hs = HyperSet::build(nodes, &g, 1);
        assert_eq!(hs.edges().len(), 1);
        assert_eq!(hs.edges()[0].len(), 2);
    }

    #[test]
    fn purify_keeps_edges_with_no_superseding_hyperedge() {
        let g = four_pexon_graph();
        let mut nodes = BTreeMap::new();
        nodes.insert(vec![1, 2], 3);
        nodes.insert(vec![3, 4], 2);
        let hs = HyperSet::build(nodes, &g, 1);
        assert_eq!(hs.edges().len(), 2);
    }

    #[test]
    fn get_intersection_matches_e2s_for_a_single_edge() {
        let g = four_pexon_graph();
        let mut nodes = BTreeMap::new();
        nodes.insert(vec![1, 2, 3], 3);
        let hs = HyperSet::build(nodes, &g, 1);
        let e = hs.edges()[0][0];
        assert_eq!(hs.get_intersection(&[e]), hs.e2s()[&e].clone());
    }

    #[test]
    fn remove_only_affects_head_or_tail() {
        let g = four_pexon_graph();
        let mut nodes = BTreeMap::new();
        nodes.insert(vec![1, 2, 3, 4], 3);
        let mut hs = HyperSet::build(nodes, &g, 1);
        let run = hs.edges()[0].clone();
        let (head, mid, tail) = (run[0], run[1], run[2]);

        hs.remove(head);
        assert_eq!(hs.edges()[0], vec![mid, tail]);
    }

    #[test]
    #[should_panic(expected = "interior")]
    fn remove_panics_on_an_interior_occurrence() {
        let g = four_pexon_graph();
        let mut nodes = BTreeMap::new();
        nodes.insert(vec![1, 2, 3, 4], 3);
        let mut hs = HyperSet::build(nodes, &g, 1);
        let mid = hs.edges()[0][1];
        hs.remove(mid);
    }

    #[test]
    fn left_and_right_extend() {
        let g = four_pexon_graph();
        let mut nodes = BTreeMap::new();
        nodes.insert(vec![1, 2, 3, 4], 3);
        let hs = HyperSet::build(nodes, &g, 1);
        let run = hs.edges()[0].clone();
        assert!(!hs.left_extend(run[0]));
        assert!(hs.left_extend(run[1]));
        assert!(!hs.right_extend(run[2]));
        assert!(hs.right_extend(run[1]));
    }

    #[test]
    fn successors_and_predecessors() {
        let g = four_pexon_graph();
        let mut nodes = BTreeMap::new();
        nodes.insert(vec![1, 2, 3], 1);
        let hs = HyperSet::build(nodes, &g, 1);
        let run = hs.edges()[0].clone();
        assert_eq!(hs.get_successors(run[0]), HashSet::from([run[1]]));
        assert_eq!(hs.get_predecessors(run[1]), HashSet::from([run[0]]));
    }

    #[test]
    fn empty_hyperset_has_no_edges_or_index() {
        let hs = HyperSet::default();
        assert!(hs.edges().is_empty());
        assert!(hs.e2s().is_empty());
        assert!(hs.nodes().is_empty());
    }
}
