//! **talkgrams** - N-gram statistics and vocabulary-overlap analysis for
//! CHILDES MOR-tagged transcripts
//!
//! Parses child-language acquisition transcripts (Manchester-style corpus
//! layout), extracts exclusion-filtered n-grams, and computes tie-aware top-K
//! and child/caregiver comparative statistics.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Subcommand runners - thin wiring between CLI args and the core pipeline
pub mod cmd {
    /// allgrams / speakerstats / top10 / topby
    pub mod grams;

    /// compare / filtered-top
    pub mod compare;

    /// Morisita overlap index
    pub mod overlap;

    mod common;
    pub(crate) use common::*;
}

/// Core processing pipeline - extraction, ranking, and comparison
pub mod core {
    /// Typed pipeline errors and exit-code taxonomy
    pub mod error;
    pub use error::PipelineError;

    /// Parser-facing data model (utterances, word tokens, parser seam)
    pub mod utterance;
    pub use utterance::{TranscriptParser, Utterance, WordToken};

    /// Exclusion list for rote/imitative speech (bigram/trigram windows)
    pub mod filter;
    pub use filter::ExclusionFilter;

    /// Punctuation-token removal
    pub mod sanitize;
    pub use sanitize::sanitize;

    /// Sliding-window n-gram generation over utterance streams
    pub mod ngram;
    pub use ngram::{GramFragment, NgramGenerator};

    /// Corpus scanning and filename metadata derivation
    pub mod reader;
    pub use reader::{CorpusReader, NgramRecord};

    /// Frequency tables, tie-aware top-K, session-period bucketing
    pub mod rank;
    pub use rank::{FrequencyTable, PeriodBins, RankedGram, top_n_with_ties};

    /// Target-vs-partner comparative tables and shared vocabulary
    pub mod analyze;
    pub use analyze::{ComparativeRow, analyze, bidirectional_analysis};

    /// Morisita-type overlap index with randomization mode
    pub mod overlap;
}

/// Transcript readers implementing the core parser seam
pub mod parsers {
    /// TalkBank MOR XML reader (the shipped `TranscriptParser`)
    pub mod mor;
    pub use mor::MorParser;
}

/// Infrastructure - configuration, corpus discovery, result output
pub mod infra {
    /// Configuration management with TOML support
    pub mod config;
    pub use self::config::{Config, load_config};

    /// Ignore-aware transcript discovery with deterministic ordering
    pub mod walk;
    pub use walk::TranscriptWalker;

    /// Table rendering, JSONL/TSV emission, atomic writes
    pub mod output;
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands};
pub use self::core::{CorpusReader, ExclusionFilter, NgramGenerator, NgramRecord, PipelineError};
pub use infra::{Config, TranscriptWalker, load_config};
pub use parsers::MorParser;
