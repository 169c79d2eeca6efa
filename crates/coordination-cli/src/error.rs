use std::path::PathBuf;

use coordination_core::PipelineError;
use snafu::Snafu;

/// Input-side failures (§7 `InputMalformed`): surfaced to the caller as a
/// single error, never a partial read.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PostsIoError {
    #[snafu(display("failed to open posts file {path:?}: {source}"))]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("posts file {path:?} is missing required column {column:?}"))]
    MissingColumn { path: PathBuf, column: String },

    #[snafu(display("malformed CSV row in {path:?}: {source}"))]
    Csv { path: PathBuf, source: csv::Error },

    #[snafu(display("unparseable timestamp {value:?} in {path:?}"))]
    BadTimestamp { path: PathBuf, value: String },

    #[snafu(display("failed to read exclusion list {path:?}: {source}"))]
    ExcludeList {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("invalid link-extraction regex: {source}"))]
    LinkRegex { source: regex::Error },
}

/// Output-side failures writing the final edge table.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PostsOutputError {
    #[snafu(display("failed to create temporary output file next to {path:?}: {source}"))]
    TempFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to write edge row: {source}"))]
    Write { source: csv::Error },

    #[snafu(display("failed to flush output file: {source}"))]
    Flush { source: std::io::Error },

    #[snafu(display("failed to atomically replace {path:?}: {source}"))]
    Persist {
        path: PathBuf,
        source: tempfile::PersistError,
    },
}

/// Top-level CLI error, aggregating every failure surface the binary
/// exposes (§7: the whole job fails with a single error message).
#[derive(Debug, Snafu)]
pub enum CliError {
    #[snafu(display("reading posts: {source}"))]
    Input { source: PostsIoError },

    #[snafu(transparent)]
    Pipeline { source: PipelineError },

    #[snafu(display("writing output: {source}"))]
    Output { source: PostsOutputError },

    #[snafu(display("invalid --speed value {value}: must be 1, 2 or 3"))]
    InvalidSpeed { value: u8 },

    #[snafu(display("failed to initialize logging"))]
    Logging,
}

pub type CliResult<T> = std::result::Result<T, CliError>;
