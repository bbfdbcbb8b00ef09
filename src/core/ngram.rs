//! Sliding-window n-gram generation over utterance streams.
//!
//! Exclusion runs on the *raw* word sequence while emission uses the
//! *sanitized* one. The asymmetry is deliberate: a punctuation-adjacent
//! phrase can still suppress an utterance even though punctuation tokens
//! never appear in output n-grams.

use std::collections::HashSet;

use crate::core::error::PipelineError;
use crate::core::filter::ExclusionFilter;
use crate::core::sanitize::sanitize;
use crate::core::utterance::Utterance;

/// A single n-gram emission, before file metadata is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GramFragment
{
    pub uid: String,
    pub speaker: String,
    pub ngram: String,
}

/// Join every width-`n` window of `words` with single spaces, stride 1.
/// Yields `len - n + 1` grams, or nothing when the sequence is too short.
/// Callers guarantee `n >= 1`.
pub fn ngram_windows(
    words: &[String],
    n: usize,
) -> impl Iterator<Item = String> + '_
{
    words
        .windows(n)
        .map(|w| w.join(" "))
}

/// Configured generator: gram size, exclusion filter, optional speaker set.
#[derive(Debug, Clone)]
pub struct NgramGenerator
{
    gramsize: usize,
    filter: ExclusionFilter,
    target_speakers: Option<HashSet<String>>,
}

impl NgramGenerator
{
    /// Fails fast on a zero gram size, before any corpus I/O happens.
    pub fn new(
        gramsize: usize,
        filter: ExclusionFilter,
    ) -> Result<Self, PipelineError>
    {
        if gramsize < 1
        {
            return Err(PipelineError::InvalidGramSize(gramsize));
        }

        Ok(Self { gramsize, filter, target_speakers: None })
    }

    /// Restrict emission to the given speaker codes (`None` = all speakers).
    pub fn with_speakers(
        mut self,
        speakers: Option<HashSet<String>>,
    ) -> Self
    {
        self.target_speakers = speakers;
        self
    }

    pub fn gramsize(&self) -> usize
    {
        self.gramsize
    }

    /// Lazily produce fragments for a stream of utterances. Consumes
    /// whatever iterable it is given; restartable only if the source is.
    pub fn generate<'a, I>(
        &'a self,
        utterances: I,
    ) -> impl Iterator<Item = GramFragment> + 'a
    where
        I: IntoIterator<Item = &'a Utterance>,
        I::IntoIter: 'a,
    {
        utterances
            .into_iter()
            .flat_map(move |utt| self.fragments_for(utt))
    }

    /// All fragments of one utterance, or nothing when it is filtered out.
    fn fragments_for(
        &self,
        utt: &Utterance,
    ) -> Vec<GramFragment>
    {
        // Off-target speakers skip even the exclusion check
        if let Some(targets) = &self.target_speakers
        {
            if !targets.contains(&utt.speaker)
            {
                return Vec::new();
            }
        }

        let raw = utt.words();

        if self
            .filter
            .is_excluded(&raw)
        {
            return Vec::new();
        }

        let clean = sanitize(&raw);

        ngram_windows(&clean, self.gramsize)
            .map(|ngram| GramFragment {
                uid: utt
                    .uid
                    .clone(),
                speaker: utt
                    .speaker
                    .clone(),
                ngram,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::core::utterance::WordToken;

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

    fn grams(generator: &NgramGenerator, utts: &[Utterance]) -> Vec<String>
    {
        generator
            .generate(utts.iter())
            .map(|f| f.ngram)
            .collect()
    }

    #[test]
    fn window_count_matches_contract()
    {
        let generator = NgramGenerator::new(2, ExclusionFilter::empty()).unwrap();
        let utts = [utterance("u0", "CHI", "a big red ball")];

        // len - gramsize + 1 windows
        assert_eq!(grams(&generator, &utts), vec!["a big", "big red", "red ball"]);
    }

    #[test]
    fn too_short_yields_nothing()
    {
        let generator = NgramGenerator::new(3, ExclusionFilter::empty()).unwrap();
        let utts = [utterance("u0", "CHI", "hi there")];

        assert!(grams(&generator, &utts).is_empty());
    }

    #[test]
    fn zero_gramsize_is_an_invalid_argument()
    {
        let err = NgramGenerator::new(0, ExclusionFilter::empty()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidGramSize(0)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn excluded_utterance_yields_nothing_at_any_gramsize()
    {
        for gramsize in 1..=3
        {
            let generator =
                NgramGenerator::new(gramsize, ExclusionFilter::with_defaults()).unwrap();
            let utts = [utterance("u0", "CHI", "uh oh no")];

            assert!(grams(&generator, &utts).is_empty(), "gramsize {gramsize}");
        }
    }

    #[test]
    fn punctuation_never_reaches_output()
    {
        let generator = NgramGenerator::new(2, ExclusionFilter::empty()).unwrap();
        let utts = [utterance("u0", "MOT", "you want juice ?")];

        assert_eq!(grams(&generator, &utts), vec!["you want", "want juice"]);
    }

    #[test]
    fn exclusion_sees_raw_words_not_sanitized_ones()
    {
        // The phrase spans a punctuation token, so it only exists in the raw
        // sequence; the utterance must still be suppressed.
        let filter = ExclusionFilter::new(["no ."]);
        let generator = NgramGenerator::new(1, filter).unwrap();
        let utts = [utterance("u0", "CHI", "no . more")];

        assert!(grams(&generator, &utts).is_empty());

        // Sanitized-side phrase "no more" would NOT have matched here
        let filter = ExclusionFilter::new(["no more"]);
        let generator = NgramGenerator::new(1, filter).unwrap();
        let utts = [utterance("u0", "CHI", "no . more")];

        assert_eq!(grams(&generator, &utts), vec!["no", "more"]);
    }

    #[test]
    fn speaker_filter_skips_off_target_utterances()
    {
        let targets: HashSet<String> = ["CHI".to_owned()].into();
        let generator = NgramGenerator::new(1, ExclusionFilter::empty())
            .unwrap()
            .with_speakers(Some(targets));
        let utts = [utterance("u0", "CHI", "ball"), utterance("u1", "MOT", "dinner")];

        let out: Vec<GramFragment> = generator
            .generate(utts.iter())
            .collect();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].speaker, "CHI");
        assert_eq!(out[0].ngram, "ball");
    }

    #[test]
    fn fragments_keep_uid_and_window_order()
    {
        let generator = NgramGenerator::new(2, ExclusionFilter::empty()).unwrap();
        let utts = [utterance("u3", "MOT", "shall we go"), utterance("u4", "MOT", "go on")];

        let out: Vec<GramFragment> = generator
            .generate(utts.iter())
            .collect();

        assert_eq!(
            out,
            vec![
                GramFragment {
                    uid: "u3".to_owned(),
                    speaker: "MOT".to_owned(),
                    ngram: "shall we".to_owned(),
                },
                GramFragment {
                    uid: "u3".to_owned(),
                    speaker: "MOT".to_owned(),
                    ngram: "we go".to_owned(),
                },
                GramFragment {
                    uid: "u4".to_owned(),
                    speaker: "MOT".to_owned(),
                    ngram: "go on".to_owned(),
                },
            ]
        );
    }
}
