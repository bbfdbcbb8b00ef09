//! Shared wiring between CLI args and the core pipeline.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use camino::Utf8PathBuf;
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::AppContext;
use crate::core::filter::ExclusionFilter;
use crate::core::ngram::NgramGenerator;
use crate::core::reader::{CorpusReader, NgramRecord};
use crate::infra::config::Config;
use crate::infra::walk::TranscriptWalker;
use crate::parsers::mor::MorParser;

/// CLI file arguments → UTF-8 paths, caller order preserved.
pub(crate) fn utf8_paths(paths: Vec<PathBuf>) -> Result<Vec<Utf8PathBuf>>
{
    paths
        .into_iter()
        .map(|p| {
            Utf8PathBuf::from_path_buf(p)
                .map_err(|p| anyhow!("non-UTF-8 path: {}", p.display()))
        })
        .collect()
}

/// The corpus root: CLI argument wins, config is the fallback.
/// `~` and `$VAR` are expanded either way.
pub(crate) fn resolve_root(
    arg: Option<&str>,
    cfg: &Config,
) -> Result<Utf8PathBuf>
{
    let raw = arg
        .or(cfg
            .corpus
            .root
            .as_deref())
        .ok_or_else(|| {
            anyhow!("no corpus root given (pass one, or set [corpus] root in talkgrams.toml)")
        })?;

    let expanded = shellexpand::full(raw).with_context(|| format!("expand corpus root {raw}"))?;

    Ok(Utf8PathBuf::from(expanded.into_owned()))
}

/// Discover transcripts under a root, honoring config glob and ignores.
pub(crate) fn discover(
    root: Option<&str>,
    cfg: &Config,
) -> Result<Vec<Utf8PathBuf>>
{
    let root = resolve_root(root, cfg)?;

    let walker = TranscriptWalker::new(
        &cfg.corpus
            .transcript_glob,
        &cfg.ignore_patterns,
    )?;

    let files = walker.walk(&root);

    if files.is_empty()
    {
        bail!("no transcripts found under {root}");
    }

    Ok(files)
}

/// Exclusion filter per config: curated defaults plus any extra phrases.
pub(crate) fn build_filter(cfg: &Config) -> ExclusionFilter
{
    let base = if cfg
        .filter
        .use_default_list
    {
        ExclusionFilter::with_defaults()
    }
    else
    {
        ExclusionFilter::empty()
    };

    base.extended(
        cfg.filter
            .extra_phrases
            .iter()
            .cloned(),
    )
}

/// "CHI,MOT" → speaker set; `None` means no restriction.
pub(crate) fn parse_speakers(spec: Option<&str>) -> Option<HashSet<String>>
{
    spec.map(|s| {
        s.split(',')
            .map(|code| {
                code.trim()
                    .to_owned()
            })
            .filter(|code| !code.is_empty())
            .collect()
    })
}

/// A generator wired from config + CLI arguments. Fails fast on a bad
/// gram size, before any file is touched.
pub(crate) fn build_generator(
    cfg: &Config,
    gramsize: usize,
    speakers: Option<HashSet<String>>,
) -> Result<NgramGenerator>
{
    Ok(NgramGenerator::new(gramsize, build_filter(cfg))?.with_speakers(speakers))
}

/// Corpus reader over the shipped MOR parser.
pub(crate) fn build_reader(
    cfg: &Config,
    gramsize: usize,
    speakers: Option<HashSet<String>>,
) -> Result<CorpusReader<MorParser>>
{
    Ok(CorpusReader::new(
        MorParser::new(),
        build_generator(cfg, gramsize, speakers)?,
    ))
}

/// Scan files sequentially with a progress bar, or in parallel when asked.
pub(crate) fn read_records(
    reader: &CorpusReader<MorParser>,
    files: &[Utf8PathBuf],
    ctx: &AppContext,
    par: bool,
) -> Result<Vec<NgramRecord>>
{
    if par
    {
        return Ok(reader.read_par(files)?);
    }

    if ctx.quiet
    {
        return Ok(reader.read(files)?);
    }

    let bar = ProgressBar::new(files.len() as u64);
    bar.set_style(ProgressStyle::with_template(
        "{bar:30.cyan/blue} {pos}/{len} {msg}",
    )?);

    let mut records = Vec::new();

    for path in files
    {
        bar.set_message(
            path.file_name()
                .unwrap_or_default()
                .to_owned(),
        );
        records.extend(reader.read_file(path)?);
        bar.inc(1);
    }

    bar.finish_and_clear();

    Ok(records)
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn speaker_spec_parses_comma_lists()
    {
        let set = parse_speakers(Some("CHI, MOT")).unwrap();
        assert!(set.contains("CHI"));
        assert!(set.contains("MOT"));
        assert_eq!(set.len(), 2);

        assert!(parse_speakers(None).is_none());
    }

    #[test]
    fn config_filter_can_drop_defaults()
    {
        let mut cfg = Config::default();
        cfg.filter
            .use_default_list = false;
        cfg.filter
            .extra_phrases = vec!["wibble wobble".to_owned()];

        let filter = build_filter(&cfg);
        assert_eq!(filter.len(), 1);
    }

    #[test]
    fn missing_root_is_an_error()
    {
        let cfg = Config::default();
        assert!(resolve_root(None, &cfg).is_err());
    }

    #[test]
    fn cli_root_wins_over_config()
    {
        let mut cfg = Config::default();
        cfg.corpus
            .root = Some("/from/config".to_owned());

        let root = resolve_root(Some("/from/cli"), &cfg).unwrap();
        assert_eq!(root, Utf8PathBuf::from("/from/cli"));
    }
}
