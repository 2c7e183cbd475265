//! Regions: the span between two adjacent junction-graph vertices, and their
//! segmentation into one or more partial exons.

use crate::interval_map::IntervalMap;
use crate::junction_graph::{JGVertex, JGVertexType, JunctionGraph};
use crate::pexon::{Pexon, PexonBoundary};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub lpos: i64,
    pub rpos: i64,
    pub ltype: PexonBoundary,
    pub rtype: PexonBoundary,
}

enum Side {
    Left,
    Right,
}

fn boundary_of(vtype: JGVertexType, side: Side) -> PexonBoundary {
    match (vtype, side) {
        (JGVertexType::StartBoundary, _) => PexonBoundary::StartBoundary,
        (JGVertexType::EndBoundary, _) => PexonBoundary::EndBoundary,
        (JGVertexType::LeftSplice, _) => PexonBoundary::LeftSplice,
        (JGVertexType::RightSplice, _) => PexonBoundary::RightSplice,
        // A position that is simultaneously the end of one intron and the
        // start of another reads as a right-splice on its left-hand region
        // and a left-splice on its right-hand region.
        (JGVertexType::LeftRightSplice, Side::Left) => PexonBoundary::RightSplice,
        (JGVertexType::LeftRightSplice, Side::Right) => PexonBoundary::LeftSplice,
    }
}

/// One region per adjacent pair of junction-graph vertices.
pub fn build_regions(jg: &JunctionGraph) -> Vec<Region> {
    jg.vertices()
        .windows(2)
        .map(|w| region_from(w[0], w[1]))
        .collect()
}

fn region_from(left: JGVertex, right: JGVertex) -> Region {
    Region {
        lpos: left.pos,
        rpos: right.pos,
        ltype: boundary_of(left.vtype, Side::Left),
        rtype: boundary_of(right.vtype, Side::Right),
    }
}

/// Segment a region into one or more pexons (§4.5): coverage-discontinuity
/// cuts at sufficiently lopsided run boundaries, plus indel-density cuts away
/// from the region's own edges.
pub fn segment(region: Region, coverage: &IntervalMap, indel: &IntervalMap, min_flank_length: i64) -> Vec<Pexon> {
    let runs = coverage.runs_in(region.lpos, region.rpos);

    let mut cuts: Vec<i64> = Vec::new();

    for w in runs.windows(2) {
        let (left_range, left_w) = &w[0];
        let (right_range, right_w) = &w[1];
        let left_len = left_range.end - left_range.start;
        let right_len = right_range.end - right_range.start;
        if left_len < min_flank_length || right_len < min_flank_length {
            continue;
        }
        let (hi, lo) = if left_w >= right_w { (*left_w, *right_w) } else { (*right_w, *left_w) };
        let ratio = hi as f64 / (lo.max(1)) as f64;
        if ratio >= 2.0 {
            cuts.push(left_range.end);
        }
    }

    for x in (region.lpos + 1)..region.rpos {
        if x - region.lpos < min_flank_length || region.rpos - x < min_flank_length {
            continue;
        }
        let cov = coverage.overlap(x).max(1);
        if indel.overlap(x) * 2 > cov {
            cuts.push(x);
        }
    }

    cuts.sort_unstable();
    cuts.dedup();

    let mut bounds = vec![region.lpos];
    bounds.extend(cuts);
    bounds.push(region.rpos);

    let n = bounds.len() - 1;
    bounds
        .windows(2)
        .enumerate()
        .map(|(i, w)| {
            let (lpos, rpos) = (w[0], w[1]);
            let ltype = if i == 0 { region.ltype } else { PexonBoundary::Internal };
            let rtype = if i == n - 1 { region.rtype } else { PexonBoundary::Internal };
            let (mut ave, mut dev) = coverage.rectangle_stats(lpos, rpos);
            ave = ave.max(1.0);
            dev = dev.max(1.0);
            Pexon { lpos, rpos, ltype, rtype, ave, dev }
        })
        .collect()
}
