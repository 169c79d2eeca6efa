use coordination_util_error::BoxedError;
use snafu::Snafu;

/// Failures from the §4.5 pairwise-refiner worker pool.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RefineError {
    #[snafu(display("failed to build the pairwise-refiner worker pool: {message}"))]
    Pool { message: String },

    /// A worker thread panicked; the payload is boxed into a plain error
    /// for the catch-all source variant.
    #[snafu(display("a pairwise-refiner worker panicked: {source}"))]
    Worker { source: BoxedError },
}

/// Top-level error for a single pipeline run.
#[derive(Debug, Snafu)]
pub enum PipelineError {
    #[snafu(transparent)]
    Refine { source: RefineError },
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
