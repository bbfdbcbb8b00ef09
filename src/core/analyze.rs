//! Target-vs-partner comparative tables, shared vocabulary, and the
//! vocabulary-filtered partner top list.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::core::rank::{Period, PeriodRow, RankedGram, frequency_table, top_n_with_ties};
use crate::core::reader::NgramRecord;

/// Extra columns attached to comparative rows (group labels, target role).
pub type Metadata = BTreeMap<String, String>;

/// Round half away from zero to two decimals. Infinities pass through.
fn round2(x: f64) -> f64
{
    (x * 100.0).round() / 100.0
}

/// One row of a comparative table: a candidate ngram with its frequency on
/// both sides plus dataset-level summary fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparativeRow
{
    pub ngram: String,

    /// Count in the target's speech
    pub frequency: u64,

    /// Count in the partner's speech (0 when absent)
    pub partner_frequency: u64,

    /// frequency / partner_frequency; +∞ when the partner never used the
    /// ngram. A legitimate outcome reported to the analyst, not an error.
    #[serde(with = "ratio_serde")]
    pub ratio: f64,

    /// Total target record count
    pub total_target_tokens: usize,

    /// Fraction of target records falling in the candidate set, 2 decimals
    pub percent_top_n: f64,

    /// Group labels and the like, flattened into extra columns
    #[serde(flatten)]
    pub metadata: Metadata,
}

/// JSON has no infinity, so non-finite ratios round-trip as strings.
mod ratio_serde
{
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &f64,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    {
        if value.is_finite()
        {
            serializer.serialize_f64(*value)
        }
        else if value.is_nan()
        {
            serializer.serialize_str("nan")
        }
        else if *value > 0.0
        {
            serializer.serialize_str("inf")
        }
        else
        {
            serializer.serialize_str("-inf")
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error>
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw
        {
            Num(f64),
            Str(String),
        }

        Ok(match Raw::deserialize(deserializer)?
        {
            Raw::Num(x) => x,
            Raw::Str(s) => match s.as_str()
            {
                "inf" => f64::INFINITY,
                "-inf" => f64::NEG_INFINITY,
                _ => f64::NAN,
            },
        })
    }
}

/// Cross-tabulate the target's tie-aware top-`top_n` ngrams against the
/// partner's frequencies. Empty target ⇒ empty result.
pub fn analyze(
    target: &[NgramRecord],
    partner: &[NgramRecord],
    top_n: usize,
    metadata: &Metadata,
) -> Vec<ComparativeRow>
{
    if target.is_empty()
    {
        return Vec::new();
    }

    let target_counts = frequency_table(
        target
            .iter()
            .map(|r| {
                r.ngram
                    .as_str()
            }),
    );

    let tops = top_n_with_ties(&target_counts, top_n);

    if tops.is_empty()
    {
        return Vec::new();
    }

    let partner_counts = frequency_table(
        partner
            .iter()
            .map(|r| {
                r.ngram
                    .as_str()
            }),
    );

    let candidates: HashSet<&str> = tops
        .iter()
        .map(|t| {
            t.ngram
                .as_str()
        })
        .collect();

    let in_set = target
        .iter()
        .filter(|r| {
            candidates.contains(
                r.ngram
                    .as_str(),
            )
        })
        .count();

    let percent_top_n = round2(in_set as f64 / target.len() as f64);
    let total_target_tokens = target.len();

    tops.into_iter()
        .map(|ranked| {
            let partner_frequency = partner_counts
                .get(&ranked.ngram)
                .copied()
                .unwrap_or(0);

            let ratio = if partner_frequency == 0
            {
                f64::INFINITY
            }
            else
            {
                round2(ranked.count as f64 / partner_frequency as f64)
            };

            ComparativeRow {
                ngram: ranked.ngram,
                frequency: ranked.count,
                partner_frequency,
                ratio,
                total_target_tokens,
                percent_top_n,
                metadata: metadata.clone(),
            }
        })
        .collect()
}

/// Symmetric comparison: analyze child against adult and adult against
/// child, tagging each half with its target label, then concatenate.
pub fn bidirectional_analysis(
    child: &[NgramRecord],
    adult: &[NgramRecord],
    top_n: usize,
    labels: (&str, &str),
    extra: &Metadata,
) -> Vec<ComparativeRow>
{
    let tagged = |label: &str| -> Metadata {
        let mut metadata = extra.clone();
        metadata.insert("target".to_owned(), label.to_owned());
        metadata
    };

    let mut rows = analyze(child, adult, top_n, &tagged(labels.0));
    rows.extend(analyze(adult, child, top_n, &tagged(labels.1)));
    rows
}

fn by_speaker<'a>(
    records: &'a [NgramRecord],
    speaker: &str,
) -> Vec<NgramRecord>
{
    records
        .iter()
        .filter(|r| r.speaker == speaker)
        .cloned()
        .collect()
}

/// Whole-corpus bidirectional comparison.
pub fn aggregate_analysis(
    records: &[NgramRecord],
    labels: (&str, &str),
    top_n: usize,
) -> Vec<ComparativeRow>
{
    bidirectional_analysis(
        &by_speaker(records, labels.0),
        &by_speaker(records, labels.1),
        top_n,
        labels,
        &Metadata::new(),
    )
}

/// Bidirectional comparison per (corpus, session) group, tagging rows with
/// the group labels.
pub fn within_group_analysis(
    records: &[NgramRecord],
    labels: (&str, &str),
    top_n: usize,
) -> Vec<ComparativeRow>
{
    let groups: BTreeSet<(&String, u32)> = records
        .iter()
        .map(|r| (&r.corpus, r.session))
        .collect();

    let mut rows = Vec::new();

    for (corpus, session) in groups
    {
        let subset: Vec<NgramRecord> = records
            .iter()
            .filter(|r| &r.corpus == corpus && r.session == session)
            .cloned()
            .collect();

        let mut extra = Metadata::new();
        extra.insert("corpus".to_owned(), corpus.clone());
        extra.insert("session".to_owned(), session.to_string());

        rows.extend(bidirectional_analysis(
            &by_speaker(&subset, labels.0),
            &by_speaker(&subset, labels.1),
            top_n,
            labels,
            &extra,
        ));
    }

    rows
}

/// Bidirectional comparison per session across all corpora.
pub fn across_corpus_analysis(
    records: &[NgramRecord],
    labels: (&str, &str),
    top_n: usize,
) -> Vec<ComparativeRow>
{
    let sessions: BTreeSet<u32> = records
        .iter()
        .map(|r| r.session)
        .collect();

    let mut rows = Vec::new();

    for session in sessions
    {
        let subset: Vec<NgramRecord> = records
            .iter()
            .filter(|r| r.session == session)
            .cloned()
            .collect();

        let mut extra = Metadata::new();
        extra.insert("session".to_owned(), session.to_string());

        rows.extend(bidirectional_analysis(
            &by_speaker(&subset, labels.0),
            &by_speaker(&subset, labels.1),
            top_n,
            labels,
            &extra,
        ));
    }

    rows
}

/// Per (corpus, period): ngrams present in both speakers' top lists.
/// Exporters highlight these cells.
pub fn shared_ngrams(
    rows: &[PeriodRow],
    labels: (&str, &str),
) -> BTreeMap<(String, Period), BTreeSet<String>>
{
    let mut child_sets: BTreeMap<(String, Period), BTreeSet<&str>> = BTreeMap::new();
    let mut adult_sets: BTreeMap<(String, Period), BTreeSet<&str>> = BTreeMap::new();

    for row in rows
    {
        let key = (
            row.corpus
                .clone(),
            row.period,
        );

        if row.speaker == labels.0
        {
            child_sets
                .entry(key)
                .or_default()
                .insert(
                    row.ngram
                        .as_str(),
                );
        }
        else if row.speaker == labels.1
        {
            adult_sets
                .entry(key)
                .or_default()
                .insert(
                    row.ngram
                        .as_str(),
                );
        }
    }

    let mut shared = BTreeMap::new();

    for (key, child_set) in child_sets
    {
        if let Some(adult_set) = adult_sets.get(&key)
        {
            let both: BTreeSet<String> = child_set
                .intersection(adult_set)
                .map(|g| (*g).to_owned())
                .collect();

            if !both.is_empty()
            {
                shared.insert(key, both);
            }
        }
    }

    shared
}

/// Partner n-grams restricted to the child's single-word vocabulary: an
/// n-gram survives only when every one of its words was uttered by the
/// child somewhere in the file set. Survivors go through the canonical
/// tie-aware ranker.
pub fn filtered_partner_top(
    ngrams: &[NgramRecord],
    unigrams: &[NgramRecord],
    labels: (&str, &str),
    top_n: usize,
) -> Vec<RankedGram>
{
    let child_vocab: HashSet<&str> = unigrams
        .iter()
        .filter(|r| r.speaker == labels.0)
        .map(|r| {
            r.ngram
                .as_str()
        })
        .collect();

    let kept = ngrams
        .iter()
        .filter(|r| r.speaker == labels.1)
        .filter(|r| {
            r.ngram
                .split(' ')
                .all(|word| child_vocab.contains(word))
        })
        .map(|r| {
            r.ngram
                .as_str()
        });

    top_n_with_ties(&frequency_table(kept), top_n)
}
