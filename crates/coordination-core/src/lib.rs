//! Coordinated sharing-behaviour detection over a corpus of timestamped,
//! per-user, per-entity posts.
//!
//! The pipeline runs in seven strictly sequential stages (§2): normalise,
//! prune, build the bipartite user-entity graph, detect per-entity
//! candidate groups by maximum-entropy partition, refine candidate pairs by
//! DTW-based temporal coherence, correct group weights by Jensen-Shannon
//! divergence against a neighbourhood, and denormalise back to original
//! identifiers. [`pipeline::run`] is the single entry point; everything
//! else in this crate is a stage module it sequences.

pub mod bipartite;
pub mod correct;
pub mod denormalize;
pub mod detect;
pub mod dtw;
pub mod entropy;
pub mod error;
pub mod ids;
pub mod normalize;
pub mod pipeline;
pub mod prune;
pub mod refine;
pub mod types;

pub use error::{PipelineError, PipelineResult, RefineError};
pub use pipeline::run;
pub use types::{
    CandidateEdge, DensePost, EntityId, FinalEdge, MebRecord, NormalizedPost, PipelineConfig,
    PostId, RawPost, RefinedEdge, SebRow, SpeedOption, UserId,
};
