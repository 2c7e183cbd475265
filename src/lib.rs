//! `splicegraph-rs`: the CLI-facing crate tying the fixture reader, the
//! `splicegraph` pipeline, and `splicegraph-io`'s transcript output together.

pub mod cli;
pub mod error;
pub mod fixture;

use splicegraph::splice_graph::{SpliceGraph, SOURCE};
use splicegraph::{Bundle, Config};
use splicegraph_io::{transcript_from_path, write_transcript};

use cli::{Cli, Commands};
use error::RunError;

/// Resolve the effective [`Config`]: the CLI's `--config` file if given,
/// otherwise [`Config::default`].
pub fn load_config(cli: &Cli) -> Result<Config, RunError> {
    match &cli.config {
        Some(path) => Ok(Config::from_yaml_path(path)?),
        None => Ok(Config::default()),
    }
}

pub fn run(cli: &Cli) -> Result<(), RunError> {
    let cfg = load_config(cli)?;
    match &cli.commands {
        Commands::Dump { input } => dump(input, &cfg),
        Commands::Gtf { input, path, gene_id, transcript_id } => gtf(input, &cfg, path, gene_id, transcript_id),
    }
}

/// The analogue of the reference `bundle::print()`: a human-readable dump of
/// every bundle's splice graph and purified hyperedge set.
fn dump(input: &std::path::Path, cfg: &Config) -> Result<(), RunError> {
    let bundles = fixture::read_bundles_from_path(input, cfg)?;
    for bundle in &bundles {
        println!("bundle {}:{}-{} strand={}", bundle.chrom, bundle.lpos, bundle.rpos, bundle.strand);
        println!("  {} pexons, {} junctions", bundle.pexons.len(), bundle.junctions.len());
        for (id, v) in bundle.splice_graph.vertices() {
            println!("  vertex {}: [{}, {}) weight={:.2}", id.0, v.lpos, v.rpos, v.weight);
        }
        for (id, e) in bundle.splice_graph.edges() {
            println!("  edge {}: {} -> {} weight={:.2} kind={:?}", id.0, e.source.0, e.target.0, e.weight, e.kind);
        }
        for (nodes, count) in bundle.hyperset.nodes() {
            println!("  hyperedge (nodes) count={count} list={nodes:?}");
        }
        for (i, edges) in bundle.hyperset.edges().iter().enumerate() {
            let edge_ids: Vec<usize> = edges.iter().map(|id| id.0).collect();
            println!("  hyperedge (edges) {i}: {edge_ids:?}");
        }
    }
    Ok(())
}

fn gtf(
    input: &std::path::Path,
    cfg: &Config,
    path_pexons: &[usize],
    gene_id: &str,
    transcript_id: &str,
) -> Result<(), RunError> {
    let bundles = fixture::read_bundles_from_path(input, cfg)?;
    let Some(bundle) = bundles.first() else { return Ok(()) };

    let mut vertex_path = vec![SOURCE];
    vertex_path.extend(path_pexons.iter().map(|&i| SpliceGraph::vertex_of_pexon(i)));
    vertex_path.push(bundle.splice_graph.sink());

    let expression = if path_pexons.is_empty() {
        0.0
    } else {
        let sum: f64 =
            path_pexons.iter().map(|&i| bundle.splice_graph.vertex(SpliceGraph::vertex_of_pexon(i)).weight).sum();
        sum / path_pexons.len() as f64
    };

    let transcript = transcript_from_path(&bundle.splice_graph, &vertex_path, gene_id, transcript_id, expression);
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    write_transcript(&mut lock, &bundle.chrom, &cfg.source_tag, bundle.strand, &transcript)?;
    Ok(())
}
