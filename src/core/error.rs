//! Typed error taxonomy for the extraction pipeline.
//!
//! The CLI maps these onto process exit codes: bad arguments exit 1,
//! transcript/metadata parse failures exit 2.

use camino::Utf8PathBuf;

/// Errors surfaced by the core pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError
{
    /// Requested n-gram size cannot produce any window
    #[error("invalid n-gram size: {0} (must be >= 1)")]
    InvalidGramSize(usize),

    /// Session bin boundaries that cannot form contiguous periods
    #[error("invalid session bins: {0}")]
    InvalidBins(String),

    /// The per-file parser contract is all-or-nothing; the offending
    /// path is always named
    #[error("failed to read transcript {path}: {reason}")]
    Transcript
    {
        path: Utf8PathBuf, reason: String
    },

    /// Corpus filenames must follow the `<session-digits><part-letter>.xml`
    /// convention; deviations are a data-integrity problem, never defaulted
    #[error("filename does not follow the <session><part>.xml convention: {0}")]
    FilenameFormat(Utf8PathBuf),
}

impl PipelineError
{
    /// Process exit code for this failure class.
    pub fn exit_code(&self) -> i32
    {
        match self
        {
            PipelineError::InvalidGramSize(_) | PipelineError::InvalidBins(_) => 1,
            PipelineError::Transcript { .. } | PipelineError::FilenameFormat(_) => 2,
        }
    }
}
