//! Partial exons (pexons): the atomic, disjoint vertices of a splice graph.

use std::collections::BTreeMap;

/// The role a pexon boundary plays. `Internal` has no counterpart in
/// [`crate::junction_graph::JGVertexType`]: it only arises from a region's
/// own internal segmentation cuts (see [`crate::region::segment`]), never
/// from a junction-graph vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PexonBoundary {
    StartBoundary,
    EndBoundary,
    LeftSplice,
    RightSplice,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pexon {
    pub lpos: i64,
    pub rpos: i64,
    pub ltype: PexonBoundary,
    pub rtype: PexonBoundary,
    pub ave: f64,
    pub dev: f64,
}

impl Pexon {
    pub fn length(&self) -> i64 {
        self.rpos - self.lpos
    }
}

/// Maps genomic positions to the index of the pexon starting there, for
/// `locate_left`/`locate_right` lookups.
#[derive(Debug, Clone, Default)]
pub struct PexonMap {
    by_lpos: BTreeMap<i64, usize>,
    by_rpos: BTreeMap<i64, usize>,
}

impl PexonMap {
    pub fn build(pexons: &[Pexon]) -> Self {
        let mut by_lpos = BTreeMap::new();
        let mut by_rpos = BTreeMap::new();
        for (i, p) in pexons.iter().enumerate() {
            by_lpos.insert(p.lpos, i);
            by_rpos.insert(p.rpos, i);
        }
        Self { by_lpos, by_rpos }
    }

    /// The pexon whose `rpos` is exactly `rpos` (§4.7: a junction's left-exon
    /// index), independent of the flank-reclassification rule `locate_left`
    /// applies to read-matched coordinates.
    pub fn exact_lexon(&self, rpos: i64) -> Option<usize> {
        self.by_rpos.get(&rpos).copied()
    }

    /// The pexon whose `lpos` is exactly `lpos` (§4.7: a junction's
    /// right-exon index).
    pub fn exact_rexon(&self, lpos: i64) -> Option<usize> {
        self.by_lpos.get(&lpos).copied()
    }

    /// Index of the pexon covering `x`, if any.
    fn find(&self, pexons: &[Pexon], x: i64) -> Option<usize> {
        let (_, &idx) = self.by_lpos.range(..=x).next_back()?;
        if x < pexons[idx].rpos {
            Some(idx)
        } else {
            None
        }
    }

    /// Locate the pexon that should be treated as the *left* exon of a
    /// junction ending at `x` (i.e. `x` is the junction's `lpos`). If `x`
    /// lands within `min_flank_length` of the found pexon's right edge, the
    /// match is reattributed to the following pexon instead — too short an
    /// overhang past `x` to trust as real exonic sequence.
    pub fn locate_left(&self, pexons: &[Pexon], x: i64, min_flank_length: i64) -> Option<usize> {
        let ex = self.find(pexons, x)?;
        let long_overhang = x - pexons[ex].lpos > min_flank_length;
        let short_flank = pexons[ex].rpos - x < min_flank_length;
        if long_overhang && short_flank && ex + 1 < pexons.len() {
            Some(ex + 1)
        } else {
            Some(ex)
        }
    }

    /// Symmetric counterpart of [`PexonMap::locate_left`] for a junction
    /// starting at `x` (i.e. `x` is the junction's `rpos`).
    pub fn locate_right(&self, pexons: &[Pexon], x: i64, min_flank_length: i64) -> Option<usize> {
        let ex = self.find(pexons, x - 1)?;
        let long_overhang = pexons[ex].rpos - x > min_flank_length;
        let short_flank = x - pexons[ex].lpos <= min_flank_length;
        if long_overhang && short_flank && ex > 0 {
            Some(ex - 1)
        } else {
            Some(ex)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pexon(lpos: i64, rpos: i64) -> Pexon {
        Pexon { lpos, rpos, ltype: PexonBoundary::StartBoundary, rtype: PexonBoundary::EndBoundary, ave: 1.0, dev: 1.0 }
    }

    #[test]
    fn find_resolves_containing_pexon() {
        let pexons = vec![pexon(0, 100), pexon(100, 200)];
        let map = PexonMap::build(&pexons);
        assert_eq!(map.find(&pexons, 50), Some(0));
        assert_eq!(map.find(&pexons, 150), Some(1));
        assert_eq!(map.find(&pexons, 250), None);
    }

    #[test]
    fn locate_left_reattributes_short_overhang() {
        let pexons = vec![pexon(0, 100), pexon(100, 200)];
        let map = PexonMap::build(&pexons);
        // x=98 leaves only 2 bases inside pexon 0: within flank of 3, push forward.
        assert_eq!(map.locate_left(&pexons, 98, 3), Some(1));
        // x=50 leaves a long overhang: keep pexon 0.
        assert_eq!(map.locate_left(&pexons, 50, 3), Some(0));
    }

    #[test]
    fn locate_right_reattributes_short_overhang() {
        let pexons = vec![pexon(0, 100), pexon(100, 200)];
        let map = PexonMap::build(&pexons);
        // x=102 leaves only 2 bases inside pexon 1: within flank of 3, push back.
        assert_eq!(map.locate_right(&pexons, 102, 3), Some(0));
        assert_eq!(map.locate_right(&pexons, 150, 3), Some(1));
    }

    #[test]
    fn exact_lexon_and_rexon_match_junction_endpoints_precisely() {
        let pexons = vec![pexon(0, 100), pexon(200, 300)];
        let map = PexonMap::build(&pexons);
        assert_eq!(map.exact_lexon(100), Some(0));
        assert_eq!(map.exact_rexon(200), Some(1));
        assert_eq!(map.exact_lexon(99), None);
        assert_eq!(map.exact_rexon(201), None);
    }

    #[test]
    fn locate_at_first_or_last_pexon_has_no_neighbour_to_push_to() {
        let pexons = vec![pexon(0, 100)];
        let map = PexonMap::build(&pexons);
        assert_eq!(map.locate_left(&pexons, 99, 5), Some(0));
        assert_eq!(map.locate_right(&pexons, 100, 5), Some(0));
    }
}
