//! Transcript annotation I/O.
//!
//! The splice graph / hyperedge core never touches a filesystem; this crate
//! is where the out-of-scope collaborators named by the specification (a
//! path decomposition router choosing transcripts, a fixture reader/writer)
//! meet recoverable, caller-facing error handling.

pub mod error;
pub mod gtf;

pub use error::IoError;
pub use gtf::{transcript_from_path, write_transcript, Transcript};
