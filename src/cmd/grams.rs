//! N-gram emission and ranking commands: allgrams, speakerstats, top10,
//! topby.
//!
//! The explicit-file commands (`allgrams`, `speakerstats`, `top10`) drive
//! the parser and generator directly and put no constraint on filenames;
//! `topby` scans a corpus root and therefore derives per-file metadata,
//! which requires the `<session><part>.xml` convention.

use std::io::{self, Write};

use anyhow::{Result, anyhow};
use serde::Serialize;
use tracing::info;

use crate::cli::{AllgramsArgs, AppContext, GroupBy, SpeakerstatsArgs, Top10Args, TopbyArgs};
use crate::core::analyze::shared_ngrams;
use crate::core::rank::{
    PeriodBins,
    PeriodRow,
    frequency_table,
    top_by_corpus_period_speaker,
    top_by_file_speaker,
    top_n_with_ties,
};
use crate::core::reader::speaker_stats;
use crate::core::utterance::TranscriptParser;
use crate::infra::config::{Config, load_config};
use crate::infra::output::{mark_shared, render_table, write_jsonl, write_tsv_counts};
use crate::parsers::mor::MorParser;

use super::{build_generator, build_reader, discover, parse_speakers, read_records, utf8_paths};

/// Every n-gram of the requested size, one per line, in file order.
pub fn allgrams(
    args: AllgramsArgs,
    _ctx: &AppContext,
) -> Result<()>
{
    let cfg = load_config().unwrap_or_default();
    let files = utf8_paths(args.filenames)?;
    let generator =
        build_generator(&cfg, args.gramsize, parse_speakers(args.speakers.as_deref()))?;
    let parser = MorParser::new();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    for path in &files
    {
        let utterances = parser.parse(path)?;

        for frag in generator.generate(utterances.iter())
        {
            writeln!(out, "{}", frag.ngram)?;
        }
    }

    Ok(())
}

/// Per-speaker utterance counts, ascending by count.
pub fn speakerstats(
    args: SpeakerstatsArgs,
    _ctx: &AppContext,
) -> Result<()>
{
    let files = utf8_paths(args.filenames)?;
    let rows = speaker_stats(&MorParser::new(), &files)?;

    write_tsv_counts(&rows, &mut io::stdout().lock())
}

/// Per-file top-ranked n-grams with a strict frequency cutoff, files
/// processed in lexicographic order. Files with nothing to rank print
/// nothing.
pub fn top10(
    args: Top10Args,
    _ctx: &AppContext,
) -> Result<()>
{
    let cfg = load_config().unwrap_or_default();
    let mut files = utf8_paths(args.filenames)?;
    files.sort();

    let generator =
        build_generator(&cfg, args.gramsize, parse_speakers(args.speakers.as_deref()))?;
    let parser = MorParser::new();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    for path in &files
    {
        let utterances = parser.parse(path)?;
        let fragments: Vec<_> = generator
            .generate(utterances.iter())
            .collect();
        let counts = frequency_table(
            fragments
                .iter()
                .map(|f| {
                    f.ngram
                        .as_str()
                }),
        );

        for ranked in top_n_with_ties(&counts, args.top)
        {
            if ranked.count > args.freq_cutoff
            {
                writeln!(out, "{path}, {}, {}", ranked.count, ranked.ngram)?;
            }
        }

        writeln!(out)?;
    }

    Ok(())
}

/// Tie-aware top lists grouped by (filename, speaker) or by
/// (corpus, period, speaker); the period view marks shared vocabulary.
pub fn topby(
    args: TopbyArgs,
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
    let records = read_records(&reader, &files, ctx, args.par)?;

    info!(files = files.len(), records = records.len(), "corpus scan complete");

    let top_n = args
        .top
        .unwrap_or(
            cfg.analysis
                .top_n,
        );
    let targets = cfg.targets();

    match args.group
    {
        GroupBy::File =>
        {
            let rows = top_by_file_speaker(
                &records,
                &targets,
                top_n,
                cfg.analysis
                    .freq_cutoff,
            );

            if args.json
            {
                return write_jsonl(&rows, &mut io::stdout().lock());
            }

            let table_rows = rows
                .iter()
                .map(|row| {
                    vec![
                        row.filename
                            .to_string(),
                        row.speaker
                            .clone(),
                        row.ngram
                            .clone(),
                        row.count
                            .to_string(),
                    ]
                })
                .collect();

            println!(
                "{}",
                render_table(&["filename", "speaker", "ngram", "count"], table_rows)
            );
        }
        GroupBy::Period =>
        {
            let bins = parse_bins(
                args.bins
                    .as_deref(),
                &cfg,
            )?;
            let rows = top_by_corpus_period_speaker(&records, &targets, &bins, top_n);
            let shared = shared_ngrams(&rows, cfg.labels());

            let is_shared = |row: &PeriodRow| {
                shared
                    .get(&(
                        row.corpus
                            .clone(),
                        row.period,
                    ))
                    .is_some_and(|set| set.contains(&row.ngram))
            };

            if args.json
            {
                #[derive(Serialize)]
                struct SharedRow<'a>
                {
                    #[serde(flatten)]
                    row: &'a PeriodRow,
                    shared: bool,
                }

                let out_rows: Vec<SharedRow<'_>> = rows
                    .iter()
                    .map(|row| SharedRow { row, shared: is_shared(row) })
                    .collect();

                return write_jsonl(&out_rows, &mut io::stdout().lock());
            }

            let any_shared = !shared.is_empty();
            let table_rows = rows
                .iter()
                .map(|row| {
                    let ngram = if is_shared(row)
                    {
                        mark_shared(&row.ngram, ctx.no_color)
                    }
                    else
                    {
                        row.ngram
                            .clone()
                    };

                    vec![
                        row.corpus
                            .clone(),
                        row.period
                            .to_string(),
                        row.speaker
                            .clone(),
                        ngram,
                        row.count
                            .to_string(),
                    ]
                })
                .collect();

            println!(
                "{}",
                render_table(&["corpus", "period", "speaker", "ngram", "count"], table_rows)
            );

            if any_shared && !ctx.quiet
            {
                eprintln!("marked n-grams appear in both speakers' top lists");
            }
        }
    }

    Ok(())
}

fn parse_bins(
    spec: Option<&str>,
    cfg: &Config,
) -> Result<PeriodBins>
{
    let bounds: Vec<u32> = match spec
    {
        Some(s) => s
            .split(',')
            .map(|x| {
                x.trim()
                    .parse::<u32>()
                    .map_err(|_| anyhow!("invalid session bin boundary: {x}"))
            })
            .collect::<Result<_>>()?,
        None => cfg
            .analysis
            .session_bins
            .clone(),
    };

    Ok(PeriodBins::new(bounds)?)
}
