//! Frequency tables and tie-aware top-K ranking.
//!
//! The cutoff is the n-th largest *distinct* count value, found in a first
//! pass; a second pass keeps every entry at or above it. Ties at the
//! boundary are therefore always included (output may exceed K rows), and
//! no single-pass heap can silently drop them.

use std::collections::BTreeMap;
use std::fmt;

use camino::Utf8PathBuf;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::core::error::PipelineError;
use crate::core::reader::NgramRecord;

/// Ngram-text → occurrence count. Insertion order is first-seen order,
/// which keeps iteration deterministic without a sort.
pub type FrequencyTable = IndexMap<String, u64>;

/// Count occurrences of each ngram text.
pub fn frequency_table<'a, I>(ngrams: I) -> FrequencyTable
where
    I: IntoIterator<Item = &'a str>,
{
    let mut table = FrequencyTable::new();

    for gram in ngrams
    {
        match table.get_mut(gram)
        {
            Some(count) => *count += 1,
            None =>
            {
                table.insert(gram.to_owned(), 1);
            }
        }
    }

    table
}

/// One ranked entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedGram
{
    pub ngram: String,
    pub count: u64,
}

/// Top `n` entries with boundary ties included.
///
/// Cutoff = n-th largest distinct count value. Fewer than `n` distinct
/// values ⇒ every entry is returned; an empty table ⇒ empty result (not an
/// error: it just means there is nothing to rank). Ordered count-desc,
/// ngram-asc.
pub fn top_n_with_ties(
    counts: &FrequencyTable,
    n: usize,
) -> Vec<RankedGram>
{
    if n == 0 || counts.is_empty()
    {
        return Vec::new();
    }

    // Pass 1: the cutoff value
    let mut distinct: Vec<u64> = counts
        .values()
        .copied()
        .collect();
    distinct.sort_unstable_by(|a, b| b.cmp(a));
    distinct.dedup();

    let cutoff = distinct
        .get(n - 1)
        .copied()
        .unwrap_or_else(|| {
            distinct[distinct.len() - 1]
        });

    // Pass 2: keep everything at or above it
    let mut rows: Vec<RankedGram> = counts
        .iter()
        .filter(|(_, count)| **count >= cutoff)
        .map(|(ngram, count)| RankedGram { ngram: ngram.clone(), count: *count })
        .collect();

    rows.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| {
                a.ngram
                    .cmp(&b.ngram)
            })
    });

    rows
}

/// A contiguous session range, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period
{
    pub lo: u32,
    pub hi: u32,
}

impl fmt::Display for Period
{
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result
    {
        write!(f, "{}-{}", self.lo, self.hi)
    }
}

impl Serialize for Period
{
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    {
        serializer.collect_str(self)
    }
}

/// Session-to-period bucketing from an inclusive-lower-bound boundary
/// array. Boundaries [1,7,13,19,25,31,36] define six periods: sessions
/// 1-6, 7-12, ... 31-36 (the final bin keeps its upper boundary).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodBins
{
    bounds: Vec<u32>,
}

impl PeriodBins
{
    pub fn new(bounds: Vec<u32>) -> Result<Self, PipelineError>
    {
        if bounds.len() < 2
        {
            return Err(PipelineError::InvalidBins(
                "at least two boundaries are required".to_owned(),
            ));
        }

        if !bounds
            .windows(2)
            .all(|w| w[0] < w[1])
        {
            return Err(PipelineError::InvalidBins(
                "boundaries must be strictly increasing".to_owned(),
            ));
        }

        Ok(Self { bounds })
    }

    /// The period containing `session`, or `None` for sessions outside all
    /// bins (excluded from grouped results, never an error).
    pub fn period_of(
        &self,
        session: u32,
    ) -> Option<Period>
    {
        let last = self.bounds.len() - 2;

        self.bounds
            .windows(2)
            .enumerate()
            .find_map(|(i, w)| {
                let hi = if i == last { w[1] } else { w[1] - 1 };

                (w[0] <= session && session <= hi).then_some(Period { lo: w[0], hi })
            })
    }
}

/// Grouped top-K row: (filename, speaker) key carried alongside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSpeakerRow
{
    pub filename: Utf8PathBuf,
    pub speaker: String,
    pub ngram: String,
    pub count: u64,
}

/// Grouped top-K row: (corpus, period, speaker) key carried alongside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodRow
{
    pub corpus: String,
    pub period: Period,
    pub speaker: String,
    pub ngram: String,
    pub count: u64,
}

/// Tie-aware top `n` per (filename, speaker) group, restricted to
/// `targets`. Entries must additionally exceed `freq_cutoff` (strict).
/// Rows are ordered by group key, then rank order within the group.
pub fn top_by_file_speaker(
    records: &[NgramRecord],
    targets: &[String],
    n: usize,
    freq_cutoff: u64,
) -> Vec<FileSpeakerRow>
{
    let mut groups: BTreeMap<(&Utf8PathBuf, &String), Vec<&str>> = BTreeMap::new();

    for record in records
    {
        if targets.contains(&record.speaker)
        {
            groups
                .entry((&record.filename, &record.speaker))
                .or_default()
                .push(
                    record
                        .ngram
                        .as_str(),
                );
        }
    }

    let mut rows = Vec::new();

    for ((filename, speaker), grams) in groups
    {
        let table = frequency_table(grams);

        for ranked in top_n_with_ties(&table, n)
        {
            if ranked.count > freq_cutoff
            {
                rows.push(FileSpeakerRow {
                    filename: filename.clone(),
                    speaker: speaker.clone(),
                    ngram: ranked.ngram,
                    count: ranked.count,
                });
            }
        }
    }

    rows
}

/// Tie-aware top `n` per (corpus, period, speaker) group. Sessions are
/// bucketed into periods first; sessions outside all bins are skipped.
pub fn top_by_corpus_period_speaker(
    records: &[NgramRecord],
    targets: &[String],
    bins: &PeriodBins,
    n: usize,
) -> Vec<PeriodRow>
{
    let mut groups: BTreeMap<(&String, Period, &String), Vec<&str>> = BTreeMap::new();

    for record in records
    {
        if !targets.contains(&record.speaker)
        {
            continue;
        }

        let Some(period) = bins.period_of(record.session)
        else
        {
            continue;
        };

        groups
            .entry((&record.corpus, period, &record.speaker))
            .or_default()
            .push(
                record
                    .ngram
                    .as_str(),
            );
    }

    let mut rows = Vec::new();

    for ((corpus, period, speaker), grams) in groups
    {
        let table = frequency_table(grams);

        for ranked in top_n_with_ties(&table, n)
        {
            rows.push(PeriodRow {
                corpus: corpus.clone(),
                period,
                speaker: speaker.clone(),
                ngram: ranked.ngram,
                count: ranked.count,
            });
        }
    }

    rows
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn table(entries: &[(&str, u64)]) -> FrequencyTable
    {
        entries
            .iter()
            .map(|(g, c)| ((*g).to_owned(), *c))
            .collect()
    }

    fn record(
        filename: &str,
        speaker: &str,
        ngram: &str,
        session: u32,
    ) -> NgramRecord
    {
        NgramRecord {
            filename: Utf8PathBuf::from(filename),
            uid: "u0".to_owned(),
            speaker: speaker.to_owned(),
            ngram: ngram.to_owned(),
            corpus: "Anne".to_owned(),
            session,
            part: 'a',
        }
    }

    #[test]
    fn boundary_ties_are_included()
    {
        let counts =
            table(&[("hi there", 5), ("what is", 3), ("see it", 3), ("go now", 1)]);

        let top = top_n_with_ties(&counts, 2);

        assert_eq!(
            top,
            vec![
                RankedGram { ngram: "hi there".to_owned(), count: 5 },
                RankedGram { ngram: "see it".to_owned(), count: 3 },
                RankedGram { ngram: "what is".to_owned(), count: 3 },
            ]
        );
    }

    #[test]
    fn cutoff_uses_distinct_count_values()
    {
        // Two entries share the top value; the 2nd distinct value is 3,
        // so the 3-count entry stays in
        let counts = table(&[("a b", 5), ("c d", 5), ("e f", 3)]);

        let top = top_n_with_ties(&counts, 2);

        assert_eq!(top.len(), 3);
        assert_eq!(top[2].count, 3);
    }

    #[test]
    fn fewer_distinct_values_than_n_returns_everything()
    {
        let counts = table(&[("a b", 2), ("c d", 1)]);

        assert_eq!(top_n_with_ties(&counts, 10).len(), 2);
    }

    #[test]
    fn empty_table_ranks_to_nothing()
    {
        assert!(top_n_with_ties(&FrequencyTable::new(), 5).is_empty());
        assert!(top_n_with_ties(&table(&[("a b", 1)]), 0).is_empty());
    }

    #[test]
    fn returned_counts_dominate_non_returned_ones()
    {
        let counts = table(&[("q", 9), ("w", 7), ("e", 7), ("r", 4), ("t", 2)]);

        let top = top_n_with_ties(&counts, 2);
        let kept: Vec<&str> = top
            .iter()
            .map(|r| {
                r.ngram
                    .as_str()
            })
            .collect();

        let min_kept = top
            .iter()
            .map(|r| r.count)
            .min()
            .unwrap();
        let max_dropped = counts
            .iter()
            .filter(|(g, _)| !kept.contains(&g.as_str()))
            .map(|(_, c)| *c)
            .max()
            .unwrap();

        assert!(min_kept >= max_dropped);
    }

    #[test]
    fn deterministic_tie_break_is_lexicographic()
    {
        let counts = table(&[("zz top", 3), ("aa bb", 3)]);

        let top = top_n_with_ties(&counts, 1);

        assert_eq!(top[0].ngram, "aa bb");
        assert_eq!(top[1].ngram, "zz top");
    }

    #[test]
    fn period_bins_inclusive_lower_bounds()
    {
        let bins = PeriodBins::new(vec![1, 7, 13, 19, 25, 31, 36]).unwrap();

        assert_eq!(bins.period_of(1), Some(Period { lo: 1, hi: 6 }));
        assert_eq!(bins.period_of(6), Some(Period { lo: 1, hi: 6 }));
        assert_eq!(bins.period_of(7), Some(Period { lo: 7, hi: 12 }));
        // final bin keeps its upper boundary
        assert_eq!(bins.period_of(36), Some(Period { lo: 31, hi: 36 }));
        // outside every bin
        assert_eq!(bins.period_of(0), None);
        assert_eq!(bins.period_of(37), None);
    }

    #[test]
    fn degenerate_bins_are_rejected()
    {
        assert!(matches!(
            PeriodBins::new(vec![1]).unwrap_err(),
            PipelineError::InvalidBins(_)
        ));
        assert!(matches!(
            PeriodBins::new(vec![1, 7, 7]).unwrap_err(),
            PipelineError::InvalidBins(_)
        ));
    }

    #[test]
    fn period_display_is_session_range()
    {
        assert_eq!(Period { lo: 1, hi: 6 }.to_string(), "1-6");
    }

    #[test]
    fn file_speaker_grouping_applies_cutoff_and_targets()
    {
        let targets = vec!["CHI".to_owned(), "MOT".to_owned()];
        let records = vec![
            record("Anne/01a.xml", "CHI", "more juice", 1),
            record("Anne/01a.xml", "CHI", "more juice", 1),
            record("Anne/01a.xml", "CHI", "big ball", 1),
            record("Anne/01a.xml", "INV", "hello there", 1),
        ];

        let rows = top_by_file_speaker(&records, &targets, 20, 1);

        // "big ball" (count 1) fails the strict cutoff; INV is off-target
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ngram, "more juice");
        assert_eq!(rows[0].count, 2);
    }

    #[test]
    fn period_grouping_buckets_sessions_and_drops_unbinned()
    {
        let targets = vec!["CHI".to_owned(), "MOT".to_owned()];
        let bins = PeriodBins::new(vec![1, 7, 13]).unwrap();
        let records = vec![
            record("Anne/01a.xml", "CHI", "more juice", 1),
            record("Anne/05b.xml", "CHI", "more juice", 5),
            record("Anne/08a.xml", "CHI", "big ball", 8),
            record("Anne/30a.xml", "CHI", "lost gram", 30),
        ];

        let rows = top_by_corpus_period_speaker(&records, &targets, &bins, 20);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].period, Period { lo: 1, hi: 6 });
        assert_eq!(rows[0].ngram, "more juice");
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[1].period, Period { lo: 7, hi: 13 });
        assert_eq!(rows[1].ngram, "big ball");
    }
}
