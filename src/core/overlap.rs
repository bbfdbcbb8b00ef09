//! Morisita-type overlap index between two frequency distributions.
//!
//! `2·dot(a,b) / (Σa² + Σb²)` over distributions aligned on the union of
//! their keys. 1.0 for identical proportional shape, 0 for disjoint
//! support. Degenerate (empty) distributions give NaN, reported as-is.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::core::rank::FrequencyTable;

/// Align `a` and `b` on the union of their keys, missing entries as 0.
fn aligned(
    a: &FrequencyTable,
    b: &FrequencyTable,
) -> (Vec<f64>, Vec<f64>)
{
    let mut av = Vec::new();
    let mut bv = Vec::new();

    for (key, count) in a
    {
        av.push(*count as f64);
        bv.push(
            b.get(key)
                .copied()
                .unwrap_or(0) as f64,
        );
    }

    for (key, count) in b
    {
        if !a.contains_key(key)
        {
            av.push(0.0);
            bv.push(*count as f64);
        }
    }

    (av, bv)
}

/// Align on the intersection of keys only (the "drop unshared" variant).
fn aligned_shared(
    a: &FrequencyTable,
    b: &FrequencyTable,
) -> (Vec<f64>, Vec<f64>)
{
    let mut av = Vec::new();
    let mut bv = Vec::new();

    for (key, count) in a
    {
        if let Some(other) = b.get(key)
        {
            av.push(*count as f64);
            bv.push(*other as f64);
        }
    }

    (av, bv)
}

fn score(
    mut av: Vec<f64>,
    mut bv: Vec<f64>,
    normalize: bool,
) -> f64
{
    if normalize
    {
        let a_total: f64 = av
            .iter()
            .sum();
        let b_total: f64 = bv
            .iter()
            .sum();

        for x in &mut av
        {
            *x /= a_total;
        }
        for x in &mut bv
        {
            *x /= b_total;
        }
    }

    let numer: f64 = av
        .iter()
        .zip(&bv)
        .map(|(x, y)| x * y)
        .sum();
    let denom: f64 = av
        .iter()
        .map(|x| x * x)
        .sum::<f64>()
        + bv.iter()
            .map(|y| y * y)
            .sum::<f64>();

    2.0 * numer / denom
}

/// Overlap index in ~[0, 1] (values past 1 only from float error at the
/// boundary). With `normalize`, each distribution is divided by its own
/// total first, comparing proportions rather than raw counts.
pub fn overlap(
    a: &FrequencyTable,
    b: &FrequencyTable,
    normalize: bool,
) -> f64
{
    let (av, bv) = aligned(a, b);
    score(av, bv, normalize)
}

/// Overlap restricted to the ngrams both distributions share.
pub fn overlap_drop_unshared(
    a: &FrequencyTable,
    b: &FrequencyTable,
    normalize: bool,
) -> f64
{
    let (av, bv) = aligned_shared(a, b);
    score(av, bv, normalize)
}

/// Permute which count goes with which ngram, keeping the count multiset.
pub fn shuffled<R: Rng>(
    table: &FrequencyTable,
    rng: &mut R,
) -> FrequencyTable
{
    let mut values: Vec<u64> = table
        .values()
        .copied()
        .collect();
    values.shuffle(rng);

    table
        .keys()
        .cloned()
        .zip(values)
        .collect()
}

/// Empirical null distribution of overlap scores under random pairing:
/// `trials` scores of `a` against label-shuffled `b`.
pub fn null_distribution<R: Rng>(
    a: &FrequencyTable,
    b: &FrequencyTable,
    normalize: bool,
    trials: usize,
    rng: &mut R,
) -> Vec<f64>
{
    (0..trials)
        .map(|_| overlap(a, &shuffled(b, rng), normalize))
        .collect()
}
