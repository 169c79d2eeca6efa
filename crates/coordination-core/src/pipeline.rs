//! Sequences the seven pipeline stages and implements the speed-option
//! truncation described in §6.

use std::collections::HashSet;
use std::time::Instant;

use coordination_util_fmt::format_elapsed;
use itertools::Itertools;
use tracing::{debug, info, instrument};

use crate::bipartite::{self, BipartiteGraphs};
use crate::correct;
use crate::denormalize;
use crate::detect;
use crate::error::PipelineError;
use crate::ids::IdMaps;
use crate::normalize;
use crate::prune;
use crate::refine::{self, MebIndex};
use crate::types::{CandidateEdge, FinalEdge, PipelineConfig, RawPost, RefinedEdge, SpeedOption};

/// Runs the full coordination-detection pipeline over `posts`, truncating
/// at the stage named by `config.speed`.
///
/// `exclude` is the caller-supplied entity exclusion set, already expected
/// to be lower-cased by the caller's posts-source adapter (case-folding
/// also happens again inside the normaliser as a defensive second pass).
#[instrument(skip_all, fields(speed = ?config.speed))]
pub fn run<I>(
    posts: I,
    exclude: &HashSet<String>,
    config: &PipelineConfig,
) -> Result<Vec<FinalEdge>, PipelineError>
where
    I: IntoIterator<Item = RawPost>,
{
    let stage_start = Instant::now();

    let (normalized, stats) = normalize::normalize(posts, exclude);
    info!(
        posts_seen = stats.posts_seen,
        entities_dropped = stats.entities_dropped,
        posts_with_no_entities = stats.posts_with_no_entities,
        elapsed = %format_elapsed(stage_start.elapsed()),
        "normalised post stream"
    );

    let stage_start = Instant::now();
    let pruned = prune::prune(normalized);
    debug!(rows = pruned.len(), elapsed = %format_elapsed(stage_start.elapsed()), "pruned fixed point");
    if pruned.is_empty() {
        return Ok(Vec::new());
    }

    let (ids, dense) = IdMaps::build(&pruned);
    info!(
        users = ids.num_users(),
        entities = ids.num_entities(),
        "assigned dense ids"
    );

    let stage_start = Instant::now();
    let BipartiteGraphs { meb, seb } = bipartite::build(&dense, config.decay_epsilon);
    debug!(
        meb_rows = meb.len(),
        seb_rows = seb.len(),
        elapsed = %format_elapsed(stage_start.elapsed()),
        "built bipartite graphs"
    );

    let stage_start = Instant::now();
    let candidates = detect::detect_candidates(&seb);
    info!(
        candidates = candidates.len(),
        elapsed = %format_elapsed(stage_start.elapsed()),
        "entity-level candidates detected"
    );

    if config.speed == SpeedOption::EntityOnly {
        let edges = entity_only_edges(&candidates);
        info!(edges = edges.len(), "speed-1 edges (entity-only)");
        return Ok(denormalize::denormalize(&edges, &ids));
    }

    let stage_start = Instant::now();
    let meb_index = MebIndex::build(&meb);
    let refined = refine::refine(&candidates, &meb_index, config.num_workers, config.chunk_size)?;
    info!(
        edges = refined.len(),
        elapsed = %format_elapsed(stage_start.elapsed()),
        "pairwise-refined edges"
    );

    if config.speed == SpeedOption::PairwiseRefined {
        return Ok(denormalize::denormalize(&refined, &ids));
    }

    let stage_start = Instant::now();
    let corrected = correct::correct(&refined, &seb, ids.num_entities());
    info!(
        edges = corrected.len(),
        elapsed = %format_elapsed(stage_start.elapsed()),
        "group-corrected edges"
    );

    Ok(denormalize::denormalize(&corrected, &ids))
}

/// Speed option 1 (§6): stop after the entity-level detector, keep only
/// pairs that co-occur on at least two entities, and weight each surviving
/// row by `min(beha_from, beha_to)` — unlike speed 2/3 this filter is
/// applied before any DTW refinement ever runs (§9 Open Question 3,
/// preserved intentionally as written in the source).
fn entity_only_edges(candidates: &[CandidateEdge]) -> Vec<RefinedEdge> {
    let pair_counts = candidates
        .iter()
        .map(|c| (c.from.0, c.to.0))
        .counts();
    let multi_entity_pairs: HashSet<(u32, u32)> = pair_counts
        .into_iter()
        .filter(|(_, count)| *count >= 2)
        .map(|(pair, _)| pair)
        .collect();

    candidates
        .iter()
        .filter(|c| multi_entity_pairs.contains(&(c.from.0, c.to.0)))
        .map(|c| RefinedEdge {
            from: c.from,
            to: c.to,
            entity: c.entity,
            beha_from: c.beha_from,
            beha_to: c.beha_to,
            posts_from: c.posts_from.clone(),
            posts_to: c.posts_to.clone(),
            weight: c.beha_from.min(c.beha_to),
        })
        .collect()
}
