//! Bipartite graph construction (§4.3): time-decayed multi-edges (MEB)
//! folded down into single usage edges (SEB).

use std::collections::HashMap;

use crate::types::{DensePost, EntityId, MebRecord, SebRow, UserId};

/// The two bipartite representations built from one dense-id post list.
pub struct BipartiteGraphs {
    pub meb: Vec<MebRecord>,
    pub seb: Vec<SebRow>,
}

/// Builds the MEB and SEB graphs from `posts`.
///
/// The decay constant is `alpha = ln(10000) / mean_e(delta_e)`, where
/// `delta_e = max_time(e) - min_time(e)` ranges over entities. When every
/// entity's posts share a single timestamp (`mean_e(delta_e) == 0`), `alpha`
/// is undefined and every post instead gets `tau = 1.0` (§3).
///
/// MEB records with `tau <= decay_epsilon` are dropped before folding into
/// the SEB, consistent with treating near-zero decay weight as noise.
pub fn build(posts: &[DensePost], decay_epsilon: f64) -> BipartiteGraphs {
    let mut t_min: HashMap<EntityId, f64> = HashMap::new();
    let mut t_max: HashMap<EntityId, f64> = HashMap::new();
    for p in posts {
        t_min
            .entry(p.entity)
            .and_modify(|t| {
                if p.post_time < *t {
                    *t = p.post_time;
                }
            })
            .or_insert(p.post_time);
        t_max
            .entry(p.entity)
            .and_modify(|t| {
                if p.post_time > *t {
                    *t = p.post_time;
                }
            })
            .or_insert(p.post_time);
    }

    let mut total_delta = 0.0;
    for (entity, tmin) in &t_min {
        total_delta += t_max[entity] - tmin;
    }
    let mean_delta = if t_min.is_empty() {
        0.0
    } else {
        total_delta / t_min.len() as f64
    };
    let alpha = if mean_delta == 0.0 {
        None
    } else {
        Some(10_000.0_f64.ln() / mean_delta)
    };

    let mut meb = Vec::new();
    for p in posts {
        let tau = match alpha {
            None => 1.0,
            Some(a) => {
                let tmin = t_min[&p.entity];
                (-a * (p.post_time - tmin)).exp()
            }
        };
        if tau <= decay_epsilon {
            continue;
        }
        meb.push(MebRecord {
            user: p.user,
            entity: p.entity,
            tau,
            post_id: p.post_id.clone(),
        });
    }

    let mut order: Vec<(UserId, EntityId)> = Vec::new();
    let mut folded: HashMap<(UserId, EntityId), (f64, u32, Vec<_>)> = HashMap::new();
    for r in &meb {
        let key = (r.user, r.entity);
        let entry = folded.entry(key).or_insert_with(|| {
            order.push(key);
            (0.0, 0, Vec::new())
        });
        entry.0 += r.tau;
        entry.1 += 1;
        entry.2.push(r.post_id.clone());
    }

    let seb = order
        .into_iter()
        .map(|key| {
            let (usage, count, post_ids) = folded.remove(&key).expect("key recorded in order");
            SebRow {
                user: key.0,
                entity: key.1,
                usage,
                count,
                post_ids,
            }
        })
        .collect();

    BipartiteGraphs { meb, seb }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn dense(user: u32, entity: u32, time: f64, post_id: &str) -> DensePost {
        DensePost {
            user: UserId(user),
            entity: EntityId(entity),
            post_time: time,
            post_id: Arc::from(post_id),
        }
    }

    #[test]
    fn identical_timestamps_yield_tau_one() {
        let posts = vec![
            dense(0, 0, 5.0, "p1"),
            dense(1, 0, 5.0, "p2"),
            dense(0, 1, 5.0, "p3"),
            dense(1, 1, 5.0, "p4"),
        ];
        let graphs = build(&posts, 1e-5);
        assert!(graphs.meb.iter().all(|r| r.tau == 1.0));
    }

    #[test]
    fn earliest_post_on_an_entity_has_tau_one() {
        let posts = vec![
            dense(0, 0, 0.0, "p1"),
            dense(1, 0, 100.0, "p2"),
            dense(0, 1, 0.0, "p3"),
            dense(1, 1, 50.0, "p4"),
        ];
        let graphs = build(&posts, 1e-5);
        let earliest = graphs
            .meb
            .iter()
            .find(|r| r.entity == EntityId(0) && r.user == UserId(0))
            .unwrap();
        assert_eq!(earliest.tau, 1.0);
    }

    #[test]
    fn seb_folds_multiple_posts_by_one_user_on_one_entity() {
        let posts = vec![
            dense(0, 0, 0.0, "p1"),
            dense(0, 0, 0.0, "p2"),
            dense(1, 0, 0.0, "p3"),
        ];
        let graphs = build(&posts, 1e-5);
        let row = graphs
            .seb
            .iter()
            .find(|r| r.user == UserId(0) && r.entity == EntityId(0))
            .unwrap();
        assert_eq!(row.count, 2);
        assert_eq!(row.post_ids.len(), 2);
        assert!((row.usage - 2.0).abs() < 1e-9);
    }

    #[test]
    fn low_tau_records_are_dropped_before_folding() {
        // Huge spread means late posts decay far below the epsilon.
        let posts = vec![dense(0, 0, 0.0, "p1"), dense(1, 0, 1_000_000.0, "p2")];
        let graphs = build(&posts, 1e-5);
        assert_eq!(graphs.meb.len(), 1);
        assert_eq!(graphs.seb.len(), 1);
    }
}
