//! Comparative commands: compare (bidirectional child/caregiver tables)
//! and filtered-top (caregiver n-grams restricted to child vocabulary).

use std::collections::BTreeSet;
use std::io::{self, Write};

use anyhow::Result;
use camino::Utf8PathBuf;
use serde::Serialize;
use tracing::info;

use crate::cli::{AppContext, CompareArgs, CompareScope, FilteredTopArgs};
use crate::core::analyze::{
    ComparativeRow,
    across_corpus_analysis,
    aggregate_analysis,
    filtered_partner_top,
    within_group_analysis,
};
use crate::infra::config::load_config;
use crate::infra::output::{render_table, write_jsonl};

use super::{build_reader, discover, read_records};

fn format_ratio(ratio: f64) -> String
{
    if ratio.is_finite()
    {
        format!("{ratio:.2}")
    }
    else if ratio.is_nan()
    {
        "nan".to_owned()
    }
    else
    {
        "inf".to_owned()
    }
}

/// Bidirectional comparison at the requested granularity.
pub fn compare(
    args: CompareArgs,
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
                .compare_top_n,
        );
    let labels = cfg.labels();

    let rows: Vec<ComparativeRow> = match args.scope
    {
        CompareScope::Aggregate => aggregate_analysis(&records, labels, top_n),
        CompareScope::Group => within_group_analysis(&records, labels, top_n),
        CompareScope::Session => across_corpus_analysis(&records, labels, top_n),
    };

    if args.json
    {
        return write_jsonl(&rows, &mut io::stdout().lock());
    }

    // Metadata keys vary by scope; the union becomes the extra columns
    let mut meta_keys: BTreeSet<&str> = BTreeSet::new();

    for row in &rows
    {
        meta_keys.extend(
            row.metadata
                .keys()
                .map(String::as_str),
        );
    }

    let mut header: Vec<&str> = vec![
        "ngram",
        "frequency",
        "partner_frequency",
        "ratio",
        "total_target_tokens",
        "percent_top_n",
    ];
    header.extend(
        meta_keys
            .iter()
            .copied(),
    );

    let table_rows = rows
        .iter()
        .map(|row| {
            let mut cells = vec![
                row.ngram
                    .clone(),
                row.frequency
                    .to_string(),
                row.partner_frequency
                    .to_string(),
                format_ratio(row.ratio),
                row.total_target_tokens
                    .to_string(),
                format!("{:.2}", row.percent_top_n),
            ];

            for key in &meta_keys
            {
                cells.push(
                    row.metadata
                        .get(*key)
                        .cloned()
                        .unwrap_or_default(),
                );
            }

            cells
        })
        .collect();

    println!("{}", render_table(&header, table_rows));

    Ok(())
}

/// Caregiver top n-grams restricted to the child's single-word
/// vocabulary, computed per file.
pub fn filtered_top(
    args: FilteredTopArgs,
    _ctx: &AppContext,
) -> Result<()>
{
    let cfg = load_config().unwrap_or_default();
    let files = discover(
        args.root
            .as_deref(),
        &cfg,
    )?;

    let unigram_reader = build_reader(&cfg, 1, None)?;
    let ngram_reader = build_reader(&cfg, args.gramsize, None)?;
    let labels = cfg.labels();

    #[derive(Serialize)]
    struct FilteredRow
    {
        filename: Utf8PathBuf,
        ngram: String,
        count: u64,
    }

    let mut rows = Vec::new();

    for path in &files
    {
        let unigrams = unigram_reader.read_file(path)?;
        let ngrams = ngram_reader.read_file(path)?;

        for ranked in filtered_partner_top(&ngrams, &unigrams, labels, args.top)
        {
            rows.push(FilteredRow {
                filename: path.clone(),
                ngram: ranked.ngram,
                count: ranked.count,
            });
        }
    }

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
                row.ngram
                    .clone(),
                row.count
                    .to_string(),
            ]
        })
        .collect();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", render_table(&["filename", "ngram", "count"], table_rows))?;

    Ok(())
}
