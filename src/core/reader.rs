//! Corpus scanning: drives the transcript parser across a file set and
//! flattens utterances into tabular n-gram records.
//!
//! Filename convention is strict: `<corpus-dir>/<session-digits><part-letter>.xml`
//! (e.g. `Smith/04a.xml` → corpus "Smith", session 4, part 'a'). Anything
//! else is a data-integrity failure for the caller to fix upstream.

use std::sync::LazyLock;

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::PipelineError;
use crate::core::ngram::NgramGenerator;
use crate::core::utterance::TranscriptParser;

/// Trailing `<digits><letter>.xml` suffix of a transcript filename.
static SESSION_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)([a-z])\.xml$").expect("session/part pattern compiles"));

/// The atomic unit of the pipeline: one n-gram occurrence with its
/// provenance and filename-derived metadata. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NgramRecord
{
    /// Source transcript path
    pub filename: Utf8PathBuf,

    /// Utterance id within the file
    pub uid: String,

    /// Speaker code
    pub speaker: String,

    /// Space-joined, sanitized n-gram text
    pub ngram: String,

    /// Corpus/group name (parent directory)
    pub corpus: String,

    /// Recording session number
    pub session: u32,

    /// Session sub-part, commonly 'a' or 'b'
    pub part: char,
}

/// Metadata derived from a transcript path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta
{
    pub corpus: String,
    pub session: u32,
    pub part: char,
}

impl FileMeta
{
    /// Derive (corpus, session, part) from a path, or fail with a
    /// format error naming it.
    pub fn from_path(path: &Utf8Path) -> Result<Self, PipelineError>
    {
        let bad = || PipelineError::FilenameFormat(path.to_owned());

        let name = path
            .file_name()
            .ok_or_else(bad)?;

        let caps = SESSION_PART
            .captures(name)
            .ok_or_else(bad)?;

        let session: u32 = caps[1]
            .parse()
            .map_err(|_| bad())?;

        let part = caps[2]
            .chars()
            .next()
            .ok_or_else(bad)?;

        let corpus = path
            .parent()
            .and_then(Utf8Path::file_name)
            .map(str::to_owned)
            .filter(|c| !c.is_empty())
            .ok_or_else(bad)?;

        Ok(Self { corpus, session, part })
    }
}

/// Drives a parser and generator over transcript files, in caller order.
#[derive(Debug)]
pub struct CorpusReader<P>
{
    parser: P,
    generator: NgramGenerator,
}

impl<P: TranscriptParser> CorpusReader<P>
{
    pub fn new(
        parser: P,
        generator: NgramGenerator,
    ) -> Self
    {
        Self { parser, generator }
    }

    /// All records of one file. All-or-nothing: a parser failure fails the
    /// call, no skip/retry here.
    pub fn read_file(
        &self,
        path: &Utf8Path,
    ) -> Result<Vec<NgramRecord>, PipelineError>
    {
        let meta = FileMeta::from_path(path)?;
        let utterances = self
            .parser
            .parse(path)?;

        let records: Vec<NgramRecord> = self
            .generator
            .generate(utterances.iter())
            .map(|frag| NgramRecord {
                filename: path.to_owned(),
                uid: frag.uid,
                speaker: frag.speaker,
                ngram: frag.ngram,
                corpus: meta
                    .corpus
                    .clone(),
                session: meta.session,
                part: meta.part,
            })
            .collect();

        debug!(
            file = %path,
            utterances = utterances.len(),
            records = records.len(),
            "scanned transcript"
        );

        Ok(records)
    }

    /// Sequential one-pass scan, concatenating per-file results in the
    /// caller-supplied order.
    pub fn read(
        &self,
        files: &[Utf8PathBuf],
    ) -> Result<Vec<NgramRecord>, PipelineError>
    {
        let mut records = Vec::new();

        for path in files
        {
            records.extend(self.read_file(path)?);
        }

        Ok(records)
    }

    /// Rayon variant. Files are independent, so this is a pure
    /// optimization: the concatenation order still follows `files`.
    pub fn read_par(
        &self,
        files: &[Utf8PathBuf],
    ) -> Result<Vec<NgramRecord>, PipelineError>
    where
        P: Sync,
    {
        let per_file: Vec<Vec<NgramRecord>> = files
            .par_iter()
            .map(|path| self.read_file(path))
            .collect::<Result<_, _>>()?;

        Ok(per_file
            .into_iter()
            .flatten()
            .collect())
    }
}

/// Utterance counts per speaker across `files`, ascending by count then
/// speaker code.
pub fn speaker_stats<P: TranscriptParser>(
    parser: &P,
    files: &[Utf8PathBuf],
) -> Result<Vec<(String, u64)>, PipelineError>
{
    let mut counts: IndexMap<String, u64> = IndexMap::new();

    for path in files
    {
        for utt in parser.parse(path)?
        {
            *counts
                .entry(utt.speaker)
                .or_insert(0) += 1;
        }
    }

    let mut rows: Vec<(String, u64)> = counts
        .into_iter()
        .collect();
    rows.sort_by(|a, b| {
        a.1
            .cmp(&b.1)
            .then_with(|| {
                a.0
                    .cmp(&b.0)
            })
    });

    Ok(rows)
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::core::filter::ExclusionFilter;
    use crate::core::utterance::{Utterance, WordToken};

    /// In-memory parser: every file yields the same fixed utterances.
    struct FakeParser(Vec<Utterance>);

    impl TranscriptParser for FakeParser
    {
        fn parse(
            &self,
            _path: &Utf8Path,
        ) -> Result<Vec<Utterance>, PipelineError>
        {
            Ok(self
                .0
                .clone())
        }
    }

    /// Parser that always fails, for error propagation checks.
    struct BrokenParser;

    impl TranscriptParser for BrokenParser
    {
        fn parse(
            &self,
            path: &Utf8Path,
        ) -> Result<Vec<Utterance>, PipelineError>
        {
            Err(PipelineError::Transcript {
                path: path.to_owned(),
                reason: "boom".to_owned(),
            })
        }
    }

    fn utterance(
        uid: &str,
        speaker: &str,
        text: &str,
    ) -> Utterance
    {
        Utterance {
            uid: uid.to_owned(),
            speaker: speaker.to_owned(),
            tokens: text
                .split_whitespace()
                .map(WordToken::new)
                .collect(),
        }
    }

    fn generator() -> NgramGenerator
    {
        NgramGenerator::new(2, ExclusionFilter::empty()).unwrap()
    }

    #[test]
    fn metadata_from_well_formed_path()
    {
        let meta = FileMeta::from_path(Utf8Path::new("corpora/Smith/04a.xml")).unwrap();

        assert_eq!(
            meta,
            FileMeta { corpus: "Smith".to_owned(), session: 4, part: 'a' }
        );
    }

    #[test]
    fn metadata_rejects_bad_suffix()
    {
        for path in ["Smith/4.xml", "Smith/a04.xml", "Smith/04a.cha", "Smith/session.xml"]
        {
            let err = FileMeta::from_path(Utf8Path::new(path)).unwrap_err();
            assert!(matches!(err, PipelineError::FilenameFormat(_)), "{path}");
            assert_eq!(err.exit_code(), 2);
        }
    }

    #[test]
    fn metadata_rejects_missing_corpus_directory()
    {
        let err = FileMeta::from_path(Utf8Path::new("04a.xml")).unwrap_err();
        assert!(matches!(err, PipelineError::FilenameFormat(_)));
    }

    #[test]
    fn records_carry_path_and_metadata()
    {
        let parser = FakeParser(vec![utterance("u0", "CHI", "more juice please")]);
        let reader = CorpusReader::new(parser, generator());

        let records = reader
            .read(&[Utf8PathBuf::from("Manchester/Anne/12b.xml")])
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].ngram, "more juice");
        assert_eq!(records[0].corpus, "Anne");
        assert_eq!(records[0].session, 12);
        assert_eq!(records[0].part, 'b');
        assert_eq!(records[0].filename, Utf8PathBuf::from("Manchester/Anne/12b.xml"));
    }

    #[test]
    fn file_order_is_preserved_sequential_and_parallel()
    {
        let parser = FakeParser(vec![utterance("u0", "CHI", "big ball")]);
        let reader = CorpusReader::new(parser, generator());
        let files =
            vec![Utf8PathBuf::from("X/02a.xml"), Utf8PathBuf::from("X/01a.xml")];

        let seq = reader
            .read(&files)
            .unwrap();
        let par = reader
            .read_par(&files)
            .unwrap();

        assert_eq!(seq, par);
        assert_eq!(seq[0].session, 2);
        assert_eq!(seq[1].session, 1);
    }

    #[test]
    fn parser_failure_is_fatal_and_names_the_path()
    {
        let reader = CorpusReader::new(BrokenParser, generator());
        let err = reader
            .read(&[Utf8PathBuf::from("Y/01a.xml")])
            .unwrap_err();

        match err
        {
            PipelineError::Transcript { path, .. } =>
            {
                assert_eq!(path, Utf8PathBuf::from("Y/01a.xml"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn speaker_stats_ascending_by_count()
    {
        let parser = FakeParser(vec![
            utterance("u0", "MOT", "dinner time"),
            utterance("u1", "MOT", "come on"),
            utterance("u2", "CHI", "no"),
        ]);

        let rows = speaker_stats(&parser, &[Utf8PathBuf::from("Z/01a.xml")]).unwrap();

        assert_eq!(rows, vec![("CHI".to_owned(), 1), ("MOT".to_owned(), 2)]);
    }
}
