//! Errors surfaced by the `splicegraph-rs` binary's own boundary: reading a
//! bundle fixture off disk. The pipeline crate's own errors
//! ([`splicegraph::ConfigError`]) are wrapped in, not duplicated.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("failed to read fixture file {path}")]
    ReadFixture { path: String, #[source] source: std::io::Error },

    #[error("{path}:{line}: {reason}")]
    MalformedFixture { path: String, line: usize, reason: String },

    #[error("failed to load configuration")]
    Config(#[from] splicegraph::ConfigError),

    #[error("failed to write transcript")]
    TranscriptIo(#[from] splicegraph_io::IoError),
}
