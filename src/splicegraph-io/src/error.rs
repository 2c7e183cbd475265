use thiserror::Error;

/// Recoverable failures at the I/O boundary — never raised by the core
/// `splicegraph` crate, which treats malformed input as empty output (see
/// its module-level error handling notes).
#[derive(Error, Debug)]
pub enum IoError {
    #[error("failed to write transcript annotation")]
    Write(#[from] std::io::Error),

    #[error("transcript {transcript_id} has no exons")]
    EmptyTranscript { transcript_id: String },
}
