//! Parser-facing data model.
//!
//! The transcript parser is a collaborator behind the `TranscriptParser`
//! seam: anything that can turn a file path into an ordered utterance
//! sequence can drive the pipeline. The shipped implementation lives in
//! `crate::parsers::mor`.

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::core::error::PipelineError;

/// A single word token as produced by the parser. Punctuation markers
/// (sentence terminators, disfluency dashes) arrive as ordinary tokens and
/// are stripped later by the sanitizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordToken
{
    /// Surface form
    pub word: String,
}

impl WordToken
{
    pub fn new(word: impl Into<String>) -> Self
    {
        Self { word: word.into() }
    }
}

/// One speech turn by one speaker. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance
{
    /// Opaque identifier, unique within its file
    pub uid: String,

    /// Free-text speaker code, e.g. "CHI" or "MOT"
    pub speaker: String,

    /// Ordered token sequence
    pub tokens: Vec<WordToken>,
}

impl Utterance
{
    /// Raw surface words, in order, punctuation tokens included.
    pub fn words(&self) -> Vec<String>
    {
        self.tokens
            .iter()
            .map(|t| {
                t.word
                    .clone()
            })
            .collect()
    }
}

/// Seam for transcript readers. A parse failure is fatal for that file and
/// must name the offending path.
pub trait TranscriptParser
{
    fn parse(
        &self,
        path: &Utf8Path,
    ) -> Result<Vec<Utterance>, PipelineError>;
}
