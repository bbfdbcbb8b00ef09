//! Filepath: src/infra/walk.rs
//! Ignore-aware transcript discovery.
//! - Respects .gitignore and friends (backed by ripgrep's `ignore` crate)
//! - Selects files by a transcript glob (default "**/*.xml")
//! - Extra ignore globs (early prune + late filter)
//! - Deterministic ordering for stable tests/CI
//!
//! Matching runs on paths relative to the walked root, so a glob like
//! "Anne/**" means "the Anne corpus directory", wherever the root lives.

use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::{DirEntry, WalkBuilder};
use tracing::warn;

/// Walker that selects transcript files under a corpus root.
pub struct TranscriptWalker
{
    /// Which files count as transcripts
    transcripts: GlobSet,

    /// Compiled set of additional ignore patterns
    ignore_patterns: GlobSet,
}

impl TranscriptWalker
{
    /// Build a walker from a transcript glob and additional ignore
    /// patterns (e.g. "backup/**", "*.bak").
    pub fn new(
        transcript_glob: &str,
        additional_ignores: &[String],
    ) -> Result<Self>
    {
        let mut transcripts = GlobSetBuilder::new();
        transcripts.add(Glob::new(transcript_glob)?);

        let mut ignores = GlobSetBuilder::new();

        for pattern in additional_ignores
        {
            ignores.add(Glob::new(pattern)?);
        }

        Ok(Self {
            transcripts: transcripts.build()?,
            ignore_patterns: ignores.build()?,
        })
    }

    /// Internal: construct a configured WalkBuilder for `root`.
    fn build_walk(
        &self,
        root: &Utf8Path,
    ) -> WalkBuilder
    {
        let mut b = WalkBuilder::new(root);

        // Corpus trees contain no dotfile transcripts worth keeping
        b.hidden(true);

        // Respect .ignore/.gitignore/.git/info/exclude and global gitignore
        b.git_ignore(true);
        b.git_global(true);
        b.git_exclude(true);

        // Early directory pruning using extra ignores (fast short-circuit).
        let extra = self
            .ignore_patterns
            .clone();
        b.filter_entry(move |ent: &DirEntry| {
            // Be conservative on unknown types.
            let is_dir = ent
                .file_type()
                .map(|ft| ft.is_dir())
                .unwrap_or(false);

            if is_dir && extra.is_match(ent.path())
            {
                return false;
            }
            true
        });

        b
    }

    /// Transcript files under `root`, as a **sorted** list of UTF-8 paths
    /// for determinism. Non-UTF-8 paths are skipped with a warning.
    pub fn walk(
        &self,
        root: &Utf8Path,
    ) -> Vec<Utf8PathBuf>
    {
        let walker = self
            .build_walk(root)
            .build();

        let mut out: Vec<Utf8PathBuf> = walker
            // Drop entries with IO errors (could be collected/logged later)
            .filter_map(|res| res.ok())
            // Keep only regular files
            .filter(|entry| {
                entry
                    .file_type()
                    .is_some_and(|ft| ft.is_file())
            })
            .filter_map(|entry| {
                match Utf8PathBuf::from_path_buf(entry.into_path())
                {
                    Ok(path) => Some(path),
                    Err(path) =>
                    {
                        warn!(path = %path.display(), "skipping non-UTF-8 path");
                        None
                    }
                }
            })
            // Transcript selection and late ignore filtering use the
            // RELATIVE path
            .filter(|abs| {
                let rel = abs
                    .strip_prefix(root)
                    .unwrap_or(abs);

                self.transcripts
                    .is_match(rel)
                    && !self
                        .ignore_patterns
                        .is_match(rel)
            })
            .collect();

        // Deterministic order (stable CLI & tests)
        out.sort();

        out
    }
}
