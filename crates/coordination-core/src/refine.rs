//! Pairwise DTW refiner (§4.5): re-scores every candidate edge by the
//! temporal alignment of the two users' post sequences on the shared
//! entity, then grows a coherence-weighted prefix among same-pair rows
//! sorted by usage gap.
//!
//! Candidate rows are chunked without splitting a `(from, to)` group and
//! processed across a bounded worker pool.

use std::collections::HashMap;

use rayon::prelude::*;

use coordination_util_error::BoxedError;

use crate::dtw::dtw_similarity;
use crate::entropy::cosine_similarity;
use crate::error::{PoolSnafu, RefineError, WorkerSnafu};
use crate::types::{CandidateEdge, EntityId, MebRecord, RefinedEdge, UserId};
use snafu::ResultExt;

/// Sorted decay-weight sequences per `(user, entity)`, built once from the
/// MEB and shared read-only across refiner workers.
pub struct MebIndex {
    tau: HashMap<(UserId, EntityId), Vec<f64>>,
}

impl MebIndex {
    pub fn build(meb: &[MebRecord]) -> Self {
        let mut tau: HashMap<(UserId, EntityId), Vec<f64>> = HashMap::new();
        for r in meb {
            tau.entry((r.user, r.entity)).or_default().push(r.tau);
        }
        for v in tau.values_mut() {
            v.sort_by(|a, b| a.partial_cmp(b).unwrap());
        }
        Self { tau }
    }

    fn sequence(&self, user: UserId, entity: EntityId) -> &[f64] {
        self.tau.get(&(user, entity)).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Splits `candidates` (already sorted by `(from, to)`) into chunks of
/// roughly `chunk_size` rows, extending a chunk past the target size rather
/// than ever splitting a `(from, to)` group across two chunks.
fn chunk_candidates(candidates: &[CandidateEdge], chunk_size: usize) -> Vec<&[CandidateEdge]> {
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < candidates.len() {
        let mut end = (start + chunk_size).min(candidates.len());
        while end < candidates.len()
            && candidates[end].from == candidates[end - 1].from
            && candidates[end].to == candidates[end - 1].to
        {
            end += 1;
        }
        chunks.push(&candidates[start..end]);
        start = end;
    }
    chunks
}

struct ScoredRow<'c> {
    candidate: &'c CandidateEdge,
    usage_gap: f64,
    similarity: f64,
}

/// Refines one `(from, to)` group: scores each row's temporal similarity,
/// sorts by ascending usage gap, then grows a prefix while cosine
/// coherence over the usage-gap magnitude stays at or above 1.
fn refine_pair(rows: &[CandidateEdge], meb: &MebIndex) -> Vec<RefinedEdge> {
    if rows.len() < 2 {
        return Vec::new();
    }

    let mut scored: Vec<ScoredRow<'_>> = rows
        .iter()
        .map(|c| {
            let x = meb.sequence(c.from, c.entity);
            let y = meb.sequence(c.to, c.entity);
            ScoredRow {
                candidate: c,
                usage_gap: (c.beha_from - c.beha_to).abs(),
                similarity: dtw_similarity(x, y),
            }
        })
        .collect();
    scored.sort_by(|a, b| a.usage_gap.partial_cmp(&b.usage_gap).unwrap());

    let n = scored.len();
    let mut pivot = 2.min(n);
    loop {
        let beha_from: Vec<f64> = scored[..pivot].iter().map(|r| r.candidate.beha_from).collect();
        let beha_to: Vec<f64> = scored[..pivot].iter().map(|r| r.candidate.beha_to).collect();
        let gap_sq_sum: f64 = scored[..pivot].iter().map(|r| r.usage_gap * r.usage_gap).sum();

        let cosine = cosine_similarity(&beha_from, &beha_to);
        let denom = if gap_sq_sum == 0.0 { 1e-8 } else { gap_sq_sum };
        let coherence = cosine / denom;

        if coherence < 1.0 {
            pivot -= 1;
            break;
        }
        if pivot == n {
            break;
        }
        pivot += 1;
    }

    if pivot < 2 {
        return Vec::new();
    }

    scored[..pivot]
        .iter()
        .map(|r| RefinedEdge {
            from: r.candidate.from,
            to: r.candidate.to,
            entity: r.candidate.entity,
            beha_from: r.candidate.beha_from,
            beha_to: r.candidate.beha_to,
            posts_from: r.candidate.posts_from.clone(),
            posts_to: r.candidate.posts_to.clone(),
            weight: r.similarity,
        })
        .collect()
}

/// Runs the refiner over every candidate edge using a dedicated worker pool
/// of `num_workers` threads, chunked at roughly `chunk_size` rows per task.
pub fn refine(
    candidates: &[CandidateEdge],
    meb: &MebIndex,
    num_workers: usize,
    chunk_size: usize,
) -> Result<Vec<RefinedEdge>, RefineError> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let chunks = chunk_candidates(candidates, chunk_size.max(1));

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_workers.max(1))
        .build()
        .map_err(|e| e.to_string())
        .context(PoolSnafu)?;

    let results: Vec<Result<Vec<RefinedEdge>, String>> = pool.install(|| {
        chunks
            .par_iter()
            .map(|chunk| {
                std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    chunk
                        .chunk_by(|a, b| a.from == b.from && a.to == b.to)
                        .flat_map(|group| refine_pair(group, meb))
                        .collect::<Vec<_>>()
                }))
                .map_err(|payload| panic_message(&payload))
            })
            .collect()
    });

    let mut out = Vec::new();
    for r in results {
        let rows = r.map_err(|message| {
            WorkerSnafu {
                source: BoxedError::from(message),
            }
            .build()
        })?;
        out.extend(rows);
    }
    Ok(out)
}

fn panic_message(payload: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
