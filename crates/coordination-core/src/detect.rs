//! Entity-level candidate detector (§4.4): for every entity with at least
//! two users, finds the maximum-entropy "heavy" prefix of its usage
//! distribution and emits one candidate edge per pair within it.

use crate::entropy::{entropy, max_entropy_partition_len, stdev};
use crate::types::{CandidateEdge, EntityId, SebRow};
use itertools::Itertools;

/// Runs the detector over every entity's SEB rows and returns candidate
/// edges sorted by `(from, to)`, ready for chunking in the refiner.
pub fn detect_candidates(seb: &[SebRow]) -> Vec<CandidateEdge> {
    let grouped = seb.iter().into_group_map_by(|row| row.entity);

    let mut entities: Vec<EntityId> = grouped.keys().copied().collect();
    entities.sort_by_key(|e| e.0);

    let mut candidates = Vec::new();
    for entity in entities {
        let mut rows = grouped[&entity].clone();
        if rows.len() < 2 {
            continue;
        }
        rows.sort_by(|a, b| b.usage.partial_cmp(&a.usage).unwrap());

        let usages: Vec<f64> = rows.iter().map(|r| r.usage).collect();
        let Some(mut heavy_len) = max_entropy_partition_len(&usages) else {
            continue;
        };

        if heavy_len == rows.len() && rows.len() > 1 {
            heavy_len = apply_tail_correction(&usages, heavy_len);
        }

        if heavy_len < 2 {
            continue;
        }

        for i in 0..heavy_len {
            for j in (i + 1)..heavy_len {
                candidates.push(make_candidate(entity, rows[i], rows[j]));
            }
        }
    }

    candidates.sort_by_key(|c| (c.from.0, c.to.0));
    candidates
}

/// When the winning partition spans the whole entity (§4.4 point 5),
/// compares how much entropy drops against how much the standard deviation
/// drops when the lightest user is trimmed off; if entropy barely moves
/// while the spread narrows, the tail is flat and gets trimmed.
fn apply_tail_correction(usages: &[f64], full_len: usize) -> usize {
    let trimmed = &usages[..usages.len() - 1];
    let full_h = entropy(usages);
    let trimmed_h = entropy(trimmed);
    let full_std = stdev(usages);
    let trimmed_std = stdev(trimmed);

    if (full_h - trimmed_h).abs() < (full_std - trimmed_std).abs() {
        full_len - 1
    } else {
        full_len
    }
}

fn make_candidate(entity: EntityId, a: &SebRow, b: &SebRow) -> CandidateEdge {
    let (from, to, beha_from, beha_to, posts_from, posts_to) = if a.user.0 < b.user.0 {
        (
            a.user,
            b.user,
            a.usage,
            b.usage,
            a.post_ids.clone(),
            b.post_ids.clone(),
        )
    } else {
        (
            b.user,
            a.user,
            b.usage,
            a.usage,
            b.post_ids.clone(),
            a.post_ids.clone(),
        )
    };
    CandidateEdge {
        from,
        to,
        entity,
        beha_from,
        beha_to,
        posts_from,
        posts_to,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserId;
    use std::sync::Arc;

    fn row(user: u32, entity: u32, usage: f64) -> SebRow {
        SebRow {
            user: UserId(user),
            entity: EntityId(entity),
            usage,
            count: 1,
            post_ids: vec![Arc::from(format!("p{user}-{entity}").as_str())],
        }
    }

    #[test]
    fn single_user_entity_never_produces_candidates() {
        let seb = vec![row(0, 0, 5.0)];
        assert!(detect_candidates(&seb).is_empty());
    }

    #[test]
    fn two_equal_usage_users_yield_exactly_one_edge() {
        let seb = vec![row(0, 0, 10.0), row(1, 0, 10.0)];
        let candidates = detect_candidates(&seb);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].from, UserId(0));
        assert_eq!(candidates[0].to, UserId(1));
    }

    #[test]
    fn heavy_pair_with_long_flat_tail_is_isolated() {
        let seb = vec![
            row(0, 0, 20.0),
            row(1, 0, 19.0),
            row(2, 0, 1.0),
            row(3, 0, 1.0),
            row(4, 0, 1.0),
        ];
        let candidates = detect_candidates(&seb);
        assert!(!candidates.is_empty());
        for c in &candidates {
            assert!(c.from.0 <= 1 && c.to.0 <= 1);
        }
    }

    #[test]
    fn candidates_are_sorted_by_from_then_to() {
        let seb = vec![
            row(0, 0, 10.0),
            row(1, 0, 10.0),
            row(0, 1, 10.0),
            row(1, 1, 10.0),
        ];
        let candidates = detect_candidates(&seb);
        let pairs: Vec<(u32, u32)> = candidates.iter().map(|c| (c.from.0, c.to.0)).collect();
        let mut sorted = pairs.clone();
        sorted.sort();
        assert_eq!(pairs, sorted);
    }
}
