//! Exclusion list for rote and imitative speech.
//!
//! Counting sequences, alphabet recitation, echoed onomatopoeia, and
//! nursery-rhyme fragments inflate n-gram counts without reflecting
//! productive vocabulary, so utterances containing them are dropped wholesale
//! before generation. Matching always runs over bigram and trigram windows,
//! whatever n-gram size the generator itself is producing.

use std::collections::HashSet;

/// Curated noise list from the Manchester study.
const DEFAULT_EXCLUDED: [&str; 46] = [
    "one two",
    "two three",
    "a b",
    "b c",
    "c d",
    "d e",
    "e f",
    "f g",
    "uh oh",
    "oh oh",
    "um um",
    "um a",
    "beep beep",
    "tweet tweet",
    "night moon",
    "night night",
    "old MacDon",
    "MacDon had",
    "ring around",
    "around the",
    "the rosey",
    "J P",
    "New Investigator",
    "Tot Time",
    "one two three",
    "two three four",
    "three four five",
    "four five six",
    "five six seven",
    "six seven eight",
    "seven eight nine",
    "eight nine ten",
    "nine ten eleven",
    "old MacDon had",
    "MacDon had a",
    "ring around the",
    "around the rosey",
    "pop goes the",
    "a b c",
    "b c d",
    "c d e",
    "d e f",
    "e f g",
    "f g h",
    "h i j",
    "quack quack quack",
];

/// Window sizes tested against the phrase set.
const DETECTION_WINDOWS: std::ops::RangeInclusive<usize> = 2..=3;

/// Fixed set of excluded phrases, configured at construction.
#[derive(Debug, Clone, Default)]
pub struct ExclusionFilter
{
    phrases: HashSet<String>,
}

impl ExclusionFilter
{
    /// Build from an explicit phrase set.
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            phrases: phrases
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }

    /// The curated default list.
    pub fn with_defaults() -> Self
    {
        Self::new(DEFAULT_EXCLUDED)
    }

    /// An empty filter that excludes nothing.
    pub fn empty() -> Self
    {
        Self::default()
    }

    /// Add further phrases on top of the current set.
    pub fn extended<I, S>(
        mut self,
        extra: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.phrases
            .extend(
                extra
                    .into_iter()
                    .map(Into::into),
            );
        self
    }

    /// Number of configured phrases.
    pub fn len(&self) -> usize
    {
        self.phrases
            .len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.phrases
            .is_empty()
    }

    /// True when any contiguous bigram or trigram of `words` is on the list.
    /// Short-circuits on the first match. Utterances shorter than two words
    /// can never match and are always retained.
    pub fn is_excluded(
        &self,
        words: &[String],
    ) -> bool
    {
        if self
            .phrases
            .is_empty()
        {
            return false;
        }

        for size in DETECTION_WINDOWS
        {
            for window in words.windows(size)
            {
                if self
                    .phrases
                    .contains(
                        window
                            .join(" ")
                            .as_str(),
                    )
                {
                    return true;
                }
            }
        }

        false
    }
}
