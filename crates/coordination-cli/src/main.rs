mod cli;
mod error;
mod io;

use std::collections::HashSet;
use std::io as stdio;

use clap::Parser;
use cli::{Opts, OptsCmd, RunArgs};
use coordination_core::{PipelineConfig, SpeedOption};
use coordination_util_fmt::AsFmtOption as _;
use error::{CliResult, InputSnafu, InvalidSpeedSnafu, LinkRegexSnafu, LoggingSnafu, OutputSnafu};
use io::CsvSourceConfig;
use snafu::{OptionExt as _, ResultExt as _};
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

pub const LOG_TARGET: &str = "coordination::cli";

#[snafu::report]
fn main() -> CliResult<()> {
    init_logging().context(LoggingSnafu)?;

    let opts = Opts::parse();
    match opts.cmd {
        OptsCmd::Run(args) => run(args),
    }
}

fn run(args: RunArgs) -> CliResult<()> {
    let speed = SpeedOption::from_u8(args.speed).context(InvalidSpeedSnafu { value: args.speed })?;
    info!(
        target: LOG_TARGET,
        speed = args.speed,
        link_regex = %args.link_regex.fmt_option(),
        "starting pipeline run"
    );

    let link_regex = args
        .link_regex
        .as_deref()
        .map(regex::Regex::new)
        .transpose()
        .context(LinkRegexSnafu)
        .context(InputSnafu)?;

    let source_cfg = CsvSourceConfig {
        link_regex,
        lowercase: args.lowercase,
    };

    let posts = io::read_posts(&args.posts, &source_cfg).context(InputSnafu)?;
    info!(target: LOG_TARGET, posts = posts.len(), "read posts from CSV");

    let exclude: HashSet<String> = match &args.exclude {
        Some(path) => io::read_exclusions(path).context(InputSnafu)?,
        None => HashSet::new(),
    };
    info!(target: LOG_TARGET, excluded = exclude.len(), "loaded exclusion list");

    let config = PipelineConfig {
        speed,
        num_workers: args.num_workers,
        chunk_size: args.chunk_size,
        decay_epsilon: args.decay_epsilon,
    };

    let edges = coordination_core::run(posts, &exclude, &config)?;
    info!(target: LOG_TARGET, edges = edges.len(), "pipeline finished");

    io::write_edges(&args.output, &edges).context(OutputSnafu)?;
    info!(target: LOG_TARGET, path = %args.output.display(), "wrote edge table");

    Ok(())
}

fn init_logging() -> Option<()> {
    tracing_subscriber::fmt()
        .with_writer(stdio::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .try_init()
        .ok()
}
