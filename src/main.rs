use clap::{CommandFactory, Parser};
use talkgrams::cli::{AppContext, Cli, Commands};
use talkgrams::core::PipelineError;

fn main() {
    // RUST_LOG-driven diagnostics on stderr; results stay on stdout
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        no_color: cli.no_color,
    };

    // No subcommand: usage on stdout, exit 0
    let Some(command) = cli.command else {
        let _ = Cli::command().print_help();
        return;
    };

    let result = match command {
        Commands::Allgrams(args) => talkgrams::cmd::grams::allgrams(args, &ctx),
        Commands::Speakerstats(args) => talkgrams::cmd::grams::speakerstats(args, &ctx),
        Commands::Top10(args) => talkgrams::cmd::grams::top10(args, &ctx),
        Commands::Topby(args) => talkgrams::cmd::grams::topby(args, &ctx),
        Commands::Compare(args) => talkgrams::cmd::compare::compare(args, &ctx),
        Commands::FilteredTop(args) => talkgrams::cmd::compare::filtered_top(args, &ctx),
        Commands::Overlap(args) => talkgrams::cmd::overlap::run(args, &ctx),
        Commands::Init(args) => talkgrams::infra::config::init(args, &ctx),
        Commands::Completions(args) => talkgrams::completion::run(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err:#}");
        std::process::exit(exit_code(&err));
    }
}

/// 1 for bad arguments, 2 for transcript/metadata parse failures.
fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<PipelineError>()
        .map(PipelineError::exit_code)
        .unwrap_or(1)
}
