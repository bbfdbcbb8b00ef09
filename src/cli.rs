use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
}

#[derive(Parser)]
#[command(name = "tkg")]
#[command(
    about = "N-gram statistics and child/caregiver vocabulary-overlap analysis for CHILDES transcripts"
)]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress progress bars and non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Emit every n-gram of the given size, one per line
    Allgrams(AllgramsArgs),

    /// Emit per-speaker utterance counts, ascending by count
    Speakerstats(SpeakerstatsArgs),

    /// Emit top-ranked n-grams per file with a frequency cutoff
    Top10(Top10Args),

    /// Tie-aware top lists grouped by file or by session period
    Topby(TopbyArgs),

    /// Bidirectional child/caregiver comparative tables
    Compare(CompareArgs),

    /// Caregiver top n-grams restricted to the child's vocabulary
    FilteredTop(FilteredTopArgs),

    /// Morisita-type overlap index between the two speakers
    Overlap(OverlapArgs),

    /// Initialize a talkgrams.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct AllgramsArgs {
    /// Transcript files to scan, in this order
    #[arg(required = true)]
    pub filenames: Vec<PathBuf>,

    /// Size of the n-grams to emit
    #[arg(short = 'n', long = "gramsize", default_value = "2")]
    pub gramsize: usize,

    /// Limit to specific speakers, e.g. "CHI" or "CHI,MOT"
    #[arg(short, long)]
    pub speakers: Option<String>,
}

#[derive(Args)]
pub struct SpeakerstatsArgs {
    /// Transcript files to scan
    #[arg(required = true)]
    pub filenames: Vec<PathBuf>,
}

#[derive(Args)]
pub struct Top10Args {
    /// Transcript files to rank, one top list per file
    #[arg(required = true)]
    pub filenames: Vec<PathBuf>,

    /// Size of the n-grams to use
    #[arg(short = 'n', long = "gramsize", default_value = "2")]
    pub gramsize: usize,

    /// Limit analysis to specific speakers, e.g. "CHI" or "CHI,MOT"
    #[arg(short, long)]
    pub speakers: Option<String>,

    /// Number of times an n-gram must occur (strictly more) to appear
    #[arg(short = 'f', long, default_value = "1")]
    pub freq_cutoff: u64,

    /// How many distinct count values make the cutoff
    #[arg(long, default_value = "10")]
    pub top: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GroupBy {
    /// Group by (filename, speaker)
    File,
    /// Bucket sessions into periods, group by (corpus, period, speaker)
    Period,
}

#[derive(Args)]
pub struct TopbyArgs {
    /// Corpus root to scan (falls back to [corpus] root in talkgrams.toml)
    pub root: Option<String>,

    /// Grouping dimension
    #[arg(long, value_enum, default_value_t = GroupBy::Period)]
    pub group: GroupBy,

    /// Size of the n-grams to use
    #[arg(short = 'n', long = "gramsize", default_value = "2")]
    pub gramsize: usize,

    /// Rows per group before tie inclusion (config default when omitted)
    #[arg(long)]
    pub top: Option<usize>,

    /// Session period boundaries, e.g. "1,7,13,19,25,31,36"
    #[arg(long)]
    pub bins: Option<String>,

    /// Emit JSON Lines instead of a table
    #[arg(long)]
    pub json: bool,

    /// Scan transcript files in parallel
    #[arg(long)]
    pub par: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompareScope {
    /// Whole corpus at once
    Aggregate,
    /// Per (corpus, session) group
    Group,
    /// Per session across corpora
    Session,
}

#[derive(Args)]
pub struct CompareArgs {
    /// Corpus root to scan (falls back to [corpus] root in talkgrams.toml)
    pub root: Option<String>,

    /// Comparison granularity
    #[arg(long, value_enum, default_value_t = CompareScope::Aggregate)]
    pub scope: CompareScope,

    /// Size of the n-grams to use
    #[arg(short = 'n', long = "gramsize", default_value = "2")]
    pub gramsize: usize,

    /// Candidate-set size before tie inclusion (config default when omitted)
    #[arg(long)]
    pub top: Option<usize>,

    /// Emit JSON Lines instead of a table
    #[arg(long)]
    pub json: bool,

    /// Scan transcript files in parallel
    #[arg(long)]
    pub par: bool,
}

#[derive(Args)]
pub struct FilteredTopArgs {
    /// Corpus root to scan (falls back to [corpus] root in talkgrams.toml)
    pub root: Option<String>,

    /// Size of the n-grams to use
    #[arg(short = 'n', long = "gramsize", default_value = "2")]
    pub gramsize: usize,

    /// Rows before tie inclusion
    #[arg(long, default_value = "10")]
    pub top: usize,

    /// Emit JSON Lines instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct OverlapArgs {
    /// Corpus root to scan (falls back to [corpus] root in talkgrams.toml)
    pub root: Option<String>,

    /// Size of the n-grams to use
    #[arg(short = 'n', long = "gramsize", default_value = "2")]
    pub gramsize: usize,

    /// One overlap score per session instead of one for the whole corpus
    #[arg(long)]
    pub per_session: bool,

    /// Compare raw counts instead of proportions
    #[arg(long)]
    pub raw_counts: bool,

    /// Restrict the index to n-grams both speakers used
    #[arg(long)]
    pub drop_unshared: bool,

    /// Also emit an empirical null distribution of this many shuffled trials
    #[arg(long)]
    pub randomize: Option<usize>,

    /// Seed for the null-distribution shuffles (entropy when omitted)
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args)]
pub struct InitArgs {
    /// Where to create talkgrams.toml
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Print the completion script to stdout
    #[arg(long, default_value = "true")]
    #[arg(action = clap::ArgAction::Set)]
    pub stdout: bool,

    /// Directory to write the completion file into
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}
