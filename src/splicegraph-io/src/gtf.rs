//! GTF transcript annotation writer, ported from
//! `bundle.cc::output_transcript`: tab-separated, nine columns, one
//! `transcript` line followed by one `exon` line per exon.

use std::io::Write;

use splicegraph::splice_graph::{SpliceGraph, VertexId, SOURCE};

use crate::error::IoError;

/// One predicted transcript: a caller-supplied exon path (the output of the
/// out-of-scope router/path-decomposition step) plus the identifiers and
/// abundance estimate to annotate it with.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub gene_id: String,
    pub transcript_id: String,
    pub expression: f64,
    /// Exon intervals in transcription order, each `[lpos, rpos)` in 0-based,
    /// half-open genomic coordinates.
    pub exons: Vec<(i64, i64)>,
}

/// Build a [`Transcript`] from a splice-graph path, collapsing maximal runs
/// of genomically-adjacent pexons (`rpos_i == lpos_{i+1}`) into single exon
/// records, per §6's transcript output format. `path` is the router's vertex
/// sequence `[0, v1, …, vk, N+1]`; the synthetic source/sink are ignored if
/// present, so callers may pass either the full path or just the pexon run.
pub fn transcript_from_path(
    g: &SpliceGraph,
    path: &[VertexId],
    gene_id: impl Into<String>,
    transcript_id: impl Into<String>,
    expression: f64,
) -> Transcript {
    let sink = g.sink();
    let mut exons: Vec<(i64, i64)> = Vec::new();
    for &v in path.iter().filter(|&&v| v != SOURCE && v != sink) {
        let vertex = g.vertex(v);
        match exons.last_mut() {
            Some(last) if last.1 == vertex.lpos => last.1 = vertex.rpos,
            _ => exons.push((vertex.lpos, vertex.rpos)),
        }
    }
    Transcript { gene_id: gene_id.into(), transcript_id: transcript_id.into(), expression, exons }
}

/// Write one transcript (a `transcript` line, then one `exon` line per
/// exon) in GTF format.
pub fn write_transcript<W: Write>(
    w: &mut W,
    chrom: &str,
    source: &str,
    strand: char,
    transcript: &Transcript,
) -> Result<(), IoError> {
    if transcript.exons.is_empty() {
        return Err(IoError::EmptyTranscript { transcript_id: transcript.transcript_id.clone() });
    }

    let span_lo = transcript.exons.iter().map(|(lo, _)| *lo).min().unwrap();
    let span_hi = transcript.exons.iter().map(|(_, hi)| *hi).max().unwrap();

    writeln!(
        w,
        "{chrom}\t{source}\ttranscript\t{}\t{}\t1000\t{strand}\t.\tgene_id \"{}\"; transcript_id \"{}\"; expression \"{:.2}\";",
        span_lo + 1,
        span_hi,
        transcript.gene_id,
        transcript.transcript_id,
        transcript.expression,
    )?;

    for (i, (lo, hi)) in transcript.exons.iter().enumerate() {
        writeln!(
            w,
            "{chrom}\t{source}\texon\t{}\t{}\t1000\t{strand}\t.\tgene_id \"{}\"; transcript_id \"{}\"; exon_number \"{}\"; expression \"{:.2}\";",
            lo + 1,
            hi,
            transcript.gene_id,
            transcript.transcript_id,
            i + 1,
            transcript.expression,
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use splicegraph::pexon::{Pexon, PexonBoundary};

    #[test]
    fn transcript_from_path_merges_adjacent_pexons_into_one_exon() {
        let pexons = vec![
            Pexon { lpos: 100, rpos: 150, ltype: PexonBoundary::StartBoundary, rtype: PexonBoundary::Internal, ave: 5.0, dev: 1.0 },
            Pexon { lpos: 150, rpos: 200, ltype: PexonBoundary::Internal, rtype: PexonBoundary::RightSplice, ave: 5.0, dev: 1.0 },
            Pexon { lpos: 400, rpos: 450, ltype: PexonBoundary::LeftSplice, rtype: PexonBoundary::EndBoundary, ave: 5.0, dev: 1.0 },
        ];
        let g = SpliceGraph::build(&pexons, &[]);
        let path = vec![SOURCE, SpliceGraph::vertex_of_pexon(0), SpliceGraph::vertex_of_pexon(1), SpliceGraph::vertex_of_pexon(2), g.sink()];

        let transcript = transcript_from_path(&g, &path, "gene.1", "gene.1.1", 4.2);
        assert_eq!(transcript.exons, vec![(100, 200), (400, 450)]);
    }

    fn sample() -> Transcript {
        Transcript {
            gene_id: "gene.1".into(),
            transcript_id: "gene.1.1".into(),
            expression: 12.345,
            exons: vec![(100, 200), (300, 450)],
        }
    }

    #[test]
    fn emits_one_transcript_line_and_one_exon_line_per_exon() {
        let mut buf = Vec::new();
        write_transcript(&mut buf, "chr1", "splicegraph", '+', &sample()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("\ttranscript\t"));
        assert!(lines[1].contains("\texon\t"));
        assert!(lines[2].contains("\texon\t"));
    }

    #[test]
    fn transcript_span_covers_every_exon() {
        let mut buf = Vec::new();
        write_transcript(&mut buf, "chr1", "splicegraph", '+', &sample()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let header = text.lines().next().unwrap();
        let fields: Vec<&str> = header.split('\t').collect();
        assert_eq!(fields[3], "101"); // 1-based inclusive left of the first exon
        assert_eq!(fields[4], "450"); // inclusive right of the last exon
    }

    #[test]
    fn exon_numbers_follow_transcription_order() {
        let mut buf = Vec::new();
        write_transcript(&mut buf, "chr1", "splicegraph", '-', &sample()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[1].contains("exon_number \"1\""));
        assert!(lines[2].contains("exon_number \"2\""));
    }

    #[test]
    fn rejects_a_transcript_with_no_exons() {
        let mut buf = Vec::new();
        let empty = Transcript { gene_id: "g".into(), transcript_id: "t".into(), expression: 0.0, exons: vec![] };
        let err = write_transcript(&mut buf, "chr1", "splicegraph", '+', &empty).unwrap_err();
        assert!(matches!(err, IoError::EmptyTranscript { .. }));
    }

    #[test]
    fn expression_is_formatted_to_two_decimals() {
        let mut buf = Vec::new();
        write_transcript(&mut buf, "chr1", "splicegraph", '+', &sample()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("expression \"12.35\"") || text.contains("expression \"12.34\""));
    }
}
