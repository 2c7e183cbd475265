//! The bundle pipeline: the single entry point tying every other module
//! together, in the strict leaf-to-root order of §2.

use log::{debug, trace};

use crate::boundary::{extend_isolated_end_boundaries, extend_isolated_start_boundaries};
use crate::config::Config;
use crate::hit::Hit;
use crate::hyper::{build_hyper_edges2, HyperSet};
use crate::interval_map::IntervalMap;
use crate::junction::{build_junctions, Junction};
use crate::junction_graph::JunctionGraph;
use crate::pexon::{Pexon, PexonMap};
use crate::region::{build_regions, segment};
use crate::splice_graph::SpliceGraph;

/// The fully-assembled result of processing one bundle of spliced read
/// alignments: a splice graph plus its corroborating hyperedge set.
#[derive(Debug, Clone)]
pub struct Bundle {
    pub chrom: String,
    pub strand: char,
    pub lpos: i64,
    pub rpos: i64,
    pub junctions: Vec<Junction>,
    pub pexons: Vec<Pexon>,
    pub splice_graph: SpliceGraph,
    pub hyperset: HyperSet,
}

/// `+` if `+`-tagged hits strictly outnumber `-`-tagged ones, `-` if the
/// reverse, `.` otherwise (including no spliced evidence at all). Hits with
/// no strand tag never participate.
fn compute_strand(hits: &[Hit]) -> char {
    let (mut plus, mut minus) = (0u32, 0u32);
    for h in hits {
        match h.xs {
            Some('+') => plus += 1,
            Some('-') => minus += 1,
            _ => {}
        }
    }
    if plus > minus {
        '+'
    } else if minus > plus {
        '-'
    } else {
        '.'
    }
}

fn check_left_ascending(hits: &[Hit]) {
    for w in hits.windows(2) {
        assert!(w[0].pos <= w[1].pos, "hits within a bundle must be left-ascending by pos");
    }
}

/// The ascending run of pexon indices a hit's matched intervals fall into,
/// per §4.11: each matched interval's endpoints are resolved independently
/// through [`PexonMap::locate_left`]/[`PexonMap::locate_right`] (not a plain
/// overlap scan), so the same asymmetric flank reclassification that links
/// junctions to pexons also governs which pexons a read is credited with
/// traversing.
fn pexon_indices_for_hit(hit: &Hit, pexons: &[Pexon], pmap: &PexonMap, min_flank_length: i64) -> Vec<usize> {
    let mut indices = Vec::new();
    for &(p1, p2) in hit.matched_intervals() {
        let k1 = pmap.locate_left(pexons, p1, min_flank_length);
        let k2 = pmap.locate_right(pexons, p2, min_flank_length);
        if let (Some(k1), Some(k2)) = (k1, k2) {
            if k1 <= k2 {
                for k in k1..=k2 {
                    if indices.last() != Some(&k) {
                        indices.push(k);
                    }
                }
            }
        }
    }
    indices
}

impl Bundle {
    /// Run the full pipeline over one bundle's hits.
    ///
    /// `hits` must already be left-ascending by `pos` (a precondition of the
    /// upstream bundler, asserted here, not recovered from).
    pub fn build(chrom: impl Into<String>, hits: Vec<Hit>, cfg: &Config) -> Self {
        check_left_ascending(&hits);

        let chrom = chrom.into();
        debug!("building bundle {chrom} from {} hits", hits.len());
        if hits.is_empty() {
            return Self {
                chrom,
                strand: '.',
                lpos: 0,
                rpos: 0,
                junctions: Vec::new(),
                pexons: Vec::new(),
                splice_graph: SpliceGraph::build(&[], &[]),
                hyperset: HyperSet::default(),
            };
        }

        let lpos = hits.iter().map(|h| h.pos).min().unwrap();
        let rpos = hits.iter().map(|h| h.rpos).max().unwrap();
        let strand = compute_strand(&hits);

        let mut coverage = IntervalMap::new();
        let mut indel = IntervalMap::new();
        for h in &hits {
            for &(a, b) in h.matched_intervals() {
                coverage.add(a, b, 1);
            }
            for &(a, b) in h.insertions() {
                indel.add(a, b, 1);
            }
            for &(a, b) in h.deletions() {
                indel.add(a, b, 1);
            }
        }

        let gaps: Vec<(i64, i64)> = hits.iter().flat_map(|h| h.spliced_gaps().iter().copied()).collect();
        let mut junctions = build_junctions(gaps, cfg.min_splice_boundary_hits);
        trace!("{chrom}:{lpos}-{rpos}: {} junctions passed the support threshold", junctions.len());

        if junctions.is_empty() && cfg.ignore_single_exon_transcripts {
            return Self {
                chrom,
                strand,
                lpos,
                rpos,
                junctions: Vec::new(),
                pexons: Vec::new(),
                splice_graph: SpliceGraph::build(&[], &[]),
                hyperset: HyperSet::default(),
            };
        }

        let jg = JunctionGraph::build(lpos, rpos, &junctions);
        let regions = build_regions(&jg);

        // A region spanning exactly one retained junction's (lpos, rpos) *is*
        // that junction's intron: it carries no coverage of its own and gets
        // no pexon. The junction edge bridges its flanking pexons directly.
        let junction_spans: std::collections::HashSet<(i64, i64)> =
            junctions.iter().map(|j| (j.lpos, j.rpos)).collect();

        let mut pexons = Vec::new();
        for region in regions {
            if junction_spans.contains(&(region.lpos, region.rpos)) {
                continue;
            }
            pexons.extend(segment(region, &coverage, &indel, cfg.min_flank_length));
        }
        let pmap = PexonMap::build(&pexons);
        trace!("{chrom}:{lpos}-{rpos}: segmented into {} pexons", pexons.len());

        for j in &mut junctions {
            match (pmap.exact_lexon(j.lpos), pmap.exact_rexon(j.rpos)) {
                (Some(l), Some(r)) => {
                    j.lexon = Some(l);
                    j.rexon = Some(r);
                }
                _ => {
                    debug!("junction {}-{} has no exact-matching pexon flank, leaving it unlinked", j.lpos, j.rpos);
                    j.lexon = None;
                    j.rexon = None;
                }
            }
        }

        let mut splice_graph = SpliceGraph::build(&pexons, &junctions);
        extend_isolated_start_boundaries(&mut splice_graph);
        extend_isolated_end_boundaries(&mut splice_graph);

        let segments: Vec<(String, Vec<usize>)> = hits
            .iter()
            .filter(|h| !h.is_unmapped())
            .map(|h| (h.qname.clone(), pexon_indices_for_hit(h, &pexons, &pmap, cfg.min_flank_length)))
            .collect();
        let raw_hyperedges = build_hyper_edges2(segments);
        let hyperset = HyperSet::build(raw_hyperedges, &splice_graph, cfg.min_router_count);

        Self { chrom, strand, lpos, rpos, junctions, pexons, splice_graph, hyperset }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit::CigarOp::{Match, Skip};

    #[test]
    fn empty_bundle_yields_empty_graph() {
        let bundle = Bundle::build("chr1", Vec::new(), &Config::default());
        assert_eq!(bundle.splice_graph.vertices().count(), 2);
        assert!(bundle.hyperset.edges().is_empty());
    }

    #[test]
    fn single_exon_bundle_has_no_junctions() {
        let hits = vec![Hit::from_cigar("r1", 100, 0, None, &[(Match, 50)])];
        let bundle = Bundle::build("chr1", hits, &Config::default());
        assert!(bundle.junctions.is_empty());
        assert_eq!(bundle.pexons.len(), 1);
    }

    #[test]
    fn spliced_bundle_produces_a_linked_junction() {
        let hits = vec![
            Hit::from_cigar("r1", 100, 0, Some('+'), &[(Match, 30), (Skip, 500), (Match, 30)]),
            Hit::from_cigar("r2", 100, 0, Some('+'), &[(Match, 30), (Skip, 500), (Match, 30)]),
        ];
        let bundle = Bundle::build("chr1", hits, &Config::default());
        assert_eq!(bundle.strand, '+');
        assert_eq!(bundle.junctions.len(), 1);
        assert!(bundle.junctions[0].lexon.is_some());
        assert!(bundle.junctions[0].rexon.is_some());
        assert_eq!(bundle.pexons.len(), 2);
    }

    #[test]
    fn ignore_single_exon_transcripts_short_circuits() {
        let hits = vec![Hit::from_cigar("r1", 100, 0, None, &[(Match, 50)])];
        let cfg = Config { ignore_single_exon_transcripts: true, ..Config::default() };
        let bundle = Bundle::build("chr1", hits, &cfg);
        assert!(bundle.pexons.is_empty());
    }

    #[test]
    #[should_panic(expected = "left-ascending")]
    fn out_of_order_hits_panics() {
        let hits = vec![
            Hit::from_cigar("r1", 200, 0, None, &[(Match, 10)]),
            Hit::from_cigar("r2", 100, 0, None, &[(Match, 10)]),
        ];
        let _ = Bundle::build("chr1", hits, &Config::default());
    }
}
