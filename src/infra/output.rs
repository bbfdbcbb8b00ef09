//! Result rendering: ASCII tables for humans, JSON Lines and TSV for
//! downstream tooling, with atomic file writes (write to a temp file in
//! the target directory, then rename).

use std::io::Write;

use anyhow::{Context, Result};
use camino::Utf8Path;
use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

/// Render header + string rows as a sharp-cornered ASCII table.
pub fn render_table(
    header: &[&str],
    rows: Vec<Vec<String>>,
) -> String
{
    let mut builder = Builder::default();
    builder.push_record(
        header
            .iter()
            .copied(),
    );

    for row in rows
    {
        builder.push_record(row);
    }

    builder
        .build()
        .with(Style::sharp())
        .to_string()
}

/// Mark a shared-vocabulary cell: yellow when color is allowed, a trailing
/// asterisk otherwise (so the marker survives redirection).
pub fn mark_shared(
    ngram: &str,
    no_color: bool,
) -> String
{
    if no_color
    {
        format!("{ngram} *")
    }
    else
    {
        ngram
            .yellow()
            .bold()
            .to_string()
    }
}

/// Serialize rows as JSON Lines to a writer.
pub fn write_jsonl<T: Serialize, W: Write>(
    rows: &[T],
    out: &mut W,
) -> Result<()>
{
    for row in rows
    {
        serde_json::to_writer(&mut *out, row).context("serialize row")?;
        writeln!(out)?;
    }

    Ok(())
}

/// Write tab-separated (label, count) lines.
pub fn write_tsv_counts<W: Write>(
    rows: &[(String, u64)],
    out: &mut W,
) -> Result<()>
{
    for (label, count) in rows
    {
        writeln!(out, "{label}\t{count}")?;
    }

    Ok(())
}

/// Atomically write JSON Lines to `path`: temp file in the same directory,
/// flushed, then persisted over the target.
pub fn write_jsonl_file<T: Serialize>(
    rows: &[T],
    path: &Utf8Path,
) -> Result<()>
{
    let dir = path
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .unwrap_or(Utf8Path::new("."));

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("create temp file next to {path}"))?;

    write_jsonl(rows, &mut tmp)?;
    tmp.flush()?;

    tmp.persist(path)
        .with_context(|| format!("persist {path}"))?;

    Ok(())
}
