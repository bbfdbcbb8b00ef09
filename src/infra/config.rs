use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs};

#[derive(Debug, Serialize, Deserialize)]
pub struct Config
{
    /// Extra ignore patterns applied during corpus discovery
    pub ignore_patterns: Vec<String>,

    /// Corpus discovery settings
    pub corpus: CorpusConfig,

    /// Exclusion-list settings
    pub filter: FilterConfig,

    /// Speaker codes used by the comparative analyses
    pub speakers: SpeakerConfig,

    /// Ranking and comparison defaults
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CorpusConfig
{
    /// Default corpus root (CLI argument wins)
    pub root: Option<String>,
    /// Glob selecting transcript files under the root
    pub transcript_glob: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilterConfig
{
    /// Start from the curated Manchester noise list
    pub use_default_list: bool,
    /// Additional excluded phrases
    pub extra_phrases: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SpeakerConfig
{
    pub child: String,
    pub adult: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisConfig
{
    /// Rows per group in `topby`
    pub top_n: usize,
    /// Candidate-set size in `compare`
    pub compare_top_n: usize,
    /// Strict frequency cutoff for per-file top lists
    pub freq_cutoff: u64,
    /// Inclusive lower bounds of the session periods
    pub session_bins: Vec<u32>,
}

impl Default for Config
{
    fn default() -> Self
    {
        Self {
            ignore_patterns: vec![".git/".to_string(), "*.cha".to_string()],
            corpus: CorpusConfig {
                root: None,
                transcript_glob: "**/*.xml".to_string(),
            },
            filter: FilterConfig { use_default_list: true, extra_phrases: Vec::new() },
            speakers: SpeakerConfig { child: "CHI".to_string(), adult: "MOT".to_string() },
            analysis: AnalysisConfig {
                top_n: 20,
                compare_top_n: 10,
                freq_cutoff: 1,
                session_bins: vec![1, 7, 13, 19, 25, 31, 36],
            },
        }
    }
}

impl Config
{
    /// Speaker pair as (child, adult) labels.
    pub fn labels(&self) -> (&str, &str)
    {
        (
            self.speakers
                .child
                .as_str(),
            self.speakers
                .adult
                .as_str(),
        )
    }

    /// Speaker pair as an owned target list for grouped ranking.
    pub fn targets(&self) -> Vec<String>
    {
        vec![
            self.speakers
                .child
                .clone(),
            self.speakers
                .adult
                .clone(),
        ]
    }
}

pub fn load_config() -> Result<Config>
{
    let mut builder = config::Config::builder();

    // Load from config files in priority order
    let config_paths = ["talkgrams.toml", ".talkgrams.toml"];

    for path in &config_paths
    {
        if Path::new(path).exists()
        {
            builder = builder.add_source(config::File::with_name(path));
            break;
        }
    }

    // Add environment variables with TALKGRAMS_ prefix
    builder = builder.add_source(config::Environment::with_prefix("TALKGRAMS").separator("_"));

    let cfg = builder
        .build()
        .context("Failed to load configuration")?;
    let parsed: Config = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

pub fn init(
    args: InitArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config_path = args
        .path
        .join("talkgrams.toml");

    if config_path.exists() && !args.force
    {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::default();
    let toml_string =
        toml::to_string_pretty(&config).context("Failed to serialize default config")?;

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet
    {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml()
    {
        let toml_string = toml::to_string_pretty(&Config::default()).unwrap();
        let back: Config = toml::from_str(&toml_string).unwrap();

        assert_eq!(back.speakers.child, "CHI");
        assert_eq!(back.speakers.adult, "MOT");
        assert_eq!(back.analysis.session_bins, vec![1, 7, 13, 19, 25, 31, 36]);
        assert!(back.filter.use_default_list);
    }

    #[test]
    fn labels_and_targets_reflect_speaker_codes()
    {
        let cfg = Config::default();

        assert_eq!(cfg.labels(), ("CHI", "MOT"));
        assert_eq!(cfg.targets(), vec!["CHI".to_string(), "MOT".to_string()]);
    }
}
