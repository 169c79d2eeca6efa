use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Opts {
    #[command(subcommand)]
    pub cmd: OptsCmd,
}

#[derive(Debug, Subcommand)]
pub enum OptsCmd {
    /// Run the coordination-detection pipeline over a CSV file of posts.
    Run(RunArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// CSV file with columns Post_ID, User_ID, Post_text, Post_time and
    /// optionally Post_links.
    pub posts: PathBuf,

    /// Output CSV path for the final edge table.
    #[arg(long, short = 'o')]
    pub output: PathBuf,

    /// One excluded entity per line, compared case-insensitively.
    #[arg(long)]
    pub exclude: Option<PathBuf>,

    /// Pipeline truncation point: 1 (entity-only), 2 (pairwise-refined) or
    /// 3 (group-corrected, the default).
    #[arg(long, default_value = "3")]
    pub speed: u8,

    /// Size of the pairwise-refiner worker pool (§4.5).
    #[arg(long, env = "COORDINATION_WORKER_THREADS", default_value = "8")]
    pub num_workers: usize,

    /// Target rows per pairwise-refiner chunk (§4.5).
    #[arg(long, env = "COORDINATION_WORKER_CHUNK_SIZE", default_value = "1000")]
    pub chunk_size: usize,

    /// MEB records with `tau <= decay_epsilon` are dropped (§3, §4.3).
    #[arg(long, default_value = "0.00001")]
    pub decay_epsilon: f64,

    /// Custom link-extraction regex, used instead of the default hashtag
    /// pattern when `Post_links` is absent from the input.
    #[arg(long)]
    pub link_regex: Option<String>,

    /// Lower-case every extracted entity before normalisation.
    #[arg(long)]
    pub lowercase: bool,
}
