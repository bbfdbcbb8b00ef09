//! Morisita overlap command: one score for the whole corpus or one per
//! session, with an optional shuffled null distribution.

use std::collections::BTreeSet;
use std::io::{self, Write};

use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use crate::cli::{AppContext, OverlapArgs};
use crate::core::overlap::{null_distribution, overlap, overlap_drop_unshared};
use crate::core::rank::{FrequencyTable, frequency_table};
use crate::core::reader::NgramRecord;
use crate::infra::config::load_config;

use super::{build_reader, discover, read_records};

fn speaker_tables(
    records: &[NgramRecord],
    labels: (&str, &str),
) -> (FrequencyTable, FrequencyTable)
{
    let table_for = |speaker: &str| {
        frequency_table(
            records
                .iter()
                .filter(|r| r.speaker == speaker)
                .map(|r| {
                    r.ngram
                        .as_str()
                }),
        )
    };

    (table_for(labels.0), table_for(labels.1))
}

pub fn run(
    args: OverlapArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let cfg = load_config().unwrap_or_default();
    let files = discover(
        args.root
            .as_deref(),
        &cfg,
    )?;
    let reader = build_reader(&cfg, args.gramsize, None)?;
    let records = read_records(&reader, &files, ctx, false)?;

    info!(files = files.len(), records = records.len(), "corpus scan complete");

    let labels = cfg.labels();
    let normalize = !args.raw_counts;

    let score = |child: &FrequencyTable, adult: &FrequencyTable| {
        if args.drop_unshared
        {
            overlap_drop_unshared(child, adult, normalize)
        }
        else
        {
            overlap(child, adult, normalize)
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.per_session
    {
        let sessions: BTreeSet<u32> = records
            .iter()
            .map(|r| r.session)
            .collect();

        for session in sessions
        {
            let subset: Vec<NgramRecord> = records
                .iter()
                .filter(|r| r.session == session)
                .cloned()
                .collect();
            let (child, adult) = speaker_tables(&subset, labels);

            writeln!(out, "{session}\t{:.6}", score(&child, &adult))?;
        }
    }
    else
    {
        let (child, adult) = speaker_tables(&records, labels);

        writeln!(out, "{:.6}", score(&child, &adult))?;
    }

    if let Some(trials) = args.randomize
    {
        let (child, adult) = speaker_tables(&records, labels);
        let mut rng = match args.seed
        {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        writeln!(out)?;

        for value in null_distribution(&child, &adult, normalize, trials, &mut rng)
        {
            writeln!(out, "{value:.6}")?;
        }
    }

    Ok(())
}
