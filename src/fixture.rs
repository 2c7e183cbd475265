//! A small line-based bundle fixture format, standing in for the real
//! upstream collaborator (a BAM reader grouping spliced alignments into
//! left-ascending bundles) that this repository does not implement.
//!
//! ```text
//! # lines starting with '#' and blank lines are ignored
//! >chr1
//! r1      100     0       +       30M500N30M
//! r2      100     0       +       30M500N30M
//! >chr2
//! r3      200     0       .       50M
//! ```
//!
//! Each `>`-prefixed line starts a new bundle named by the rest of the line.
//! Every other non-empty, non-comment line describes one hit:
//! `qname pos flag xs cigar`, whitespace-separated. `xs` is `+`, `-`, or `.`
//! for "no tag". `cigar` is a compact `<len><op>` run using the single-letter
//! SAM operation codes this crate understands: `M`, `I`, `D`, `N`, `S`.

use splicegraph::hit::{CigarOp, Hit};
use splicegraph::{Bundle, Config};

use crate::error::RunError;

fn parse_cigar(path: &str, line: usize, raw: &str) -> Result<Vec<(CigarOp, i64)>, RunError> {
    let mut ops = Vec::new();
    let mut len_digits = String::new();
    for c in raw.chars() {
        if c.is_ascii_digit() {
            len_digits.push(c);
            continue;
        }
        if len_digits.is_empty() {
            return Err(RunError::MalformedFixture {
                path: path.to_string(),
                line,
                reason: format!("CIGAR operation '{c}' has no preceding length"),
            });
        }
        let len: i64 = len_digits.parse().map_err(|_| RunError::MalformedFixture {
            path: path.to_string(),
            line,
            reason: format!("CIGAR length '{len_digits}' is not a valid integer"),
        })?;
        len_digits.clear();
        let op = match c {
            'M' => CigarOp::Match,
            'I' => CigarOp::Insertion,
            'D' => CigarOp::Deletion,
            'N' => CigarOp::Skip,
            'S' => CigarOp::SoftClip,
            other => {
                return Err(RunError::MalformedFixture {
                    path: path.to_string(),
                    line,
                    reason: format!("unsupported CIGAR operation '{other}'"),
                })
            }
        };
        ops.push((op, len));
    }
    if !len_digits.is_empty() {
        return Err(RunError::MalformedFixture {
            path: path.to_string(),
            line,
            reason: format!("CIGAR string '{raw}' ends with a dangling length"),
        });
    }
    Ok(ops)
}

fn parse_xs(path: &str, line: usize, raw: &str) -> Result<Option<char>, RunError> {
    match raw {
        "." => Ok(None),
        "+" => Ok(Some('+')),
        "-" => Ok(Some('-')),
        other => Err(RunError::MalformedFixture {
            path: path.to_string(),
            line,
            reason: format!("xs tag must be '+', '-', or '.', got '{other}'"),
        }),
    }
}

fn parse_hit(path: &str, line: usize, raw: &str) -> Result<Hit, RunError> {
    let fields: Vec<&str> = raw.split_whitespace().collect();
    let [qname, pos, flag, xs, cigar] = fields[..] else {
        return Err(RunError::MalformedFixture {
            path: path.to_string(),
            line,
            reason: format!("expected 5 whitespace-separated fields (qname pos flag xs cigar), got {}", fields.len()),
        });
    };
    let pos: i64 = pos.parse().map_err(|_| RunError::MalformedFixture {
        path: path.to_string(),
        line,
        reason: format!("pos '{pos}' is not a valid integer"),
    })?;
    let flag: u16 = flag.parse().map_err(|_| RunError::MalformedFixture {
        path: path.to_string(),
        line,
        reason: format!("flag '{flag}' is not a valid u16"),
    })?;
    let xs = parse_xs(path, line, xs)?;
    let cigar = parse_cigar(path, line, cigar)?;
    Ok(Hit::from_cigar(qname, pos, flag, xs, &cigar))
}

/// Parse a fixture's text into bundles and run the pipeline over each.
pub fn read_bundles(path: &str, text: &str, cfg: &Config) -> Result<Vec<Bundle>, RunError> {
    let mut bundles = Vec::new();
    let mut current_chrom: Option<String> = None;
    let mut current_hits: Vec<Hit> = Vec::new();

    for (i, raw_line) in text.lines().enumerate() {
        let line = i + 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some(chrom) = trimmed.strip_prefix('>') {
            if let Some(prev) = current_chrom.take() {
                bundles.push(Bundle::build(prev, std::mem::take(&mut current_hits), cfg));
            }
            current_chrom = Some(chrom.trim().to_string());
            continue;
        }
        let Some(chrom) = &current_chrom else {
            return Err(RunError::MalformedFixture {
                path: path.to_string(),
                line,
                reason: "hit line appears before any '>chrom' bundle header".to_string(),
            });
        };
        let _ = chrom;
        current_hits.push(parse_hit(path, line, trimmed)?);
    }
    if let Some(chrom) = current_chrom {
        bundles.push(Bundle::build(chrom, current_hits, cfg));
    }
    Ok(bundles)
}

/// Read a fixture file from disk and run the pipeline over its bundles.
pub fn read_bundles_from_path(path: impl AsRef<std::path::Path>, cfg: &Config) -> Result<Vec<Bundle>, RunError> {
    let path_ref = path.as_ref();
    let text = std::fs::read_to_string(path_ref).map_err(|source| RunError::ReadFixture {
        path: path_ref.display().to_string(),
        source,
    })?;
    read_bundles(&path_ref.display().to_string(), &text, cfg)
}
