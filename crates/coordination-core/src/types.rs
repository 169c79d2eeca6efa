use std::sync::Arc;

/// A single post-id string, shared cheaply across the many stages that carry
/// contributing-post lists forward without ever mutating them.
pub type PostId = Arc<str>;

/// Dense, job-scoped user id assigned in first-seen order after pruning.
/// Never persisted across jobs (see §3 "Lifecycles").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserId(pub u32);

/// Dense, job-scoped linking-entity id, assigned the same way as [`UserId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

/// One `(user_id, entity, post_time, post_id)` tuple as yielded by a posts
/// source. `entity` is a single linking entity; a post carrying several
/// entities appears as several `RawPost` values sharing the same `post_id`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawPost {
    pub user_id: String,
    pub entity: String,
    pub post_time: f64,
    pub post_id: String,
}

/// Output of the normaliser: one row per `(user, entity)` occurrence within a
/// post, with within-post duplicate entities merged and excluded entities
/// dropped. Downstream stages never see the same `(user_id, entity, post_id)`
/// twice.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPost {
    pub user_id: String,
    pub entity: String,
    pub post_time: f64,
    pub post_id: String,
}

/// A normalised, pruned post with dense ids substituted for the original
/// strings, ready for the bipartite builder.
#[derive(Debug, Clone)]
pub struct DensePost {
    pub user: UserId,
    pub entity: EntityId,
    pub post_time: f64,
    pub post_id: PostId,
}

/// One multi-edge bipartite graph record: a single post's contribution to a
/// `(user, entity)` pair, carrying its own time-decay weight.
#[derive(Debug, Clone)]
pub struct MebRecord {
    pub user: UserId,
    pub entity: EntityId,
    pub tau: f64,
    pub post_id: PostId,
}

/// One single-edge bipartite graph row: the folded-down usage of a user on
/// an entity, summed over every contributing post.
#[derive(Debug, Clone)]
pub struct SebRow {
    pub user: UserId,
    pub entity: EntityId,
    pub usage: f64,
    pub count: u32,
    pub post_ids: Vec<PostId>,
}

/// An unordered user pair `(from, to)` with `from < to` by dense id,
/// produced by the entity-level detector for one entity they both appear
/// "heavy" on.
#[derive(Debug, Clone)]
pub struct CandidateEdge {
    pub from: UserId,
    pub to: UserId,
    pub entity: EntityId,
    pub beha_from: f64,
    pub beha_to: f64,
    pub posts_from: Vec<PostId>,
    pub posts_to: Vec<PostId>,
}

/// A candidate edge carrying a similarity/coordination weight, produced by
/// either the speed-1 shortcut, the pairwise refiner, or the group
/// corrector. All three stages share this shape since only the weight
/// formula and the presence/absence of a row differ between them.
#[derive(Debug, Clone)]
pub struct RefinedEdge {
    pub from: UserId,
    pub to: UserId,
    pub entity: EntityId,
    pub beha_from: f64,
    pub beha_to: f64,
    pub posts_from: Vec<PostId>,
    pub posts_to: Vec<PostId>,
    pub weight: f64,
}

/// A finished edge with original identifiers restored, ready for the CSV
/// sink.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FinalEdge {
    pub from: String,
    pub to: String,
    pub entity: String,
    pub weight: f64,
    pub post_ids_from: Vec<PostId>,
    pub post_ids_to: Vec<PostId>,
}

/// Caller-chosen truncation point in the pipeline, trading recall for
/// precision (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedOption {
    /// Stop after the entity-level detector (§4.4); keep only pairs that
    /// co-occur on at least two entities, weighted by `min(beha_from, beha_to)`.
    EntityOnly,
    /// Stop after the pairwise DTW refiner (§4.5).
    PairwiseRefined,
    /// Run the full pipeline, including the group corrector (§4.6).
    GroupCorrected,
}

impl SpeedOption {
    pub fn from_u8(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::EntityOnly),
            2 => Some(Self::PairwiseRefined),
            3 => Some(Self::GroupCorrected),
            _ => None,
        }
    }
}

/// Parameters for one pipeline invocation. The core takes this as an
/// explicit argument rather than reading process-wide configuration (Design
/// Notes §9): there is nothing here that needs to outlive a single job.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub speed: SpeedOption,
    /// Size of the §4.5 worker pool.
    pub num_workers: usize,
    /// Target rows per §4.5 chunk (a chunk may run slightly longer to avoid
    /// splitting a `(from, to)` group).
    pub chunk_size: usize,
    /// MEB records with `tau <= decay_epsilon` are dropped (§3, §4.3).
    pub decay_epsilon: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            speed: SpeedOption::GroupCorrected,
            num_workers: 8,
            chunk_size: 1000,
            decay_epsilon: 1e-5,
        }
    }
}
