//! Splice junctions: tallied pairs of spliced-gap endpoints.

use ahash::AHashMap;

/// A single observed splice junction, `[lpos, rpos)` being the intron
/// removed from the read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Junction {
    pub lpos: i64,
    pub rpos: i64,
    pub count: u32,
    /// Index of the pexon immediately to the left of `lpos`, once linked.
    pub lexon: Option<usize>,
    /// Index of the pexon immediately to the right of `rpos`, once linked.
    pub rexon: Option<usize>,
}

impl Junction {
    fn new(lpos: i64, rpos: i64) -> Self {
        assert!(lpos < rpos, "junction endpoints must be ordered: {lpos} < {rpos}");
        Self { lpos, rpos, count: 0, lexon: None, rexon: None }
    }
}

/// Tally every spliced gap `(lpos, rpos)` across `gaps` and keep only those
/// whose support meets `min_count`.
///
/// `gaps` is the flattened list of every splice gap observed across every hit
/// in a bundle (see [`crate::hit::Hit::spliced_gaps`]).
pub fn build_junctions(gaps: impl IntoIterator<Item = (i64, i64)>, min_count: u32) -> Vec<Junction> {
    let mut tally: AHashMap<(i64, i64), u32> = AHashMap::new();
    for gap in gaps {
        *tally.entry(gap).or_insert(0) += 1;
    }

    let mut junctions: Vec<Junction> = tally
        .into_iter()
        .filter(|(_, count)| *count >= min_count)
        .map(|((lpos, rpos), count)| {
            let mut j = Junction::new(lpos, rpos);
            j.count = count;
            j
        })
        .collect();

    junctions.sort_by_key(|j| (j.lpos, j.rpos));
    junctions
}
