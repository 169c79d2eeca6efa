//! Group-level divergence correction (§4.6): rescales each refined edge by
//! how distinctive its pair's coordination is relative to a neighbourhood of
//! users sharing the same entities, via Jensen-Shannon divergence.

use std::collections::HashMap;
use std::mem::size_of;

use coordination_util_fmt::format_bytes;
use tracing::debug;

use crate::entropy::jsd;
use crate::types::{EntityId, RefinedEdge, SebRow, UserId};

/// Sparse `user -> {entities}` indicator. At realistic `U * E` sizes a
/// dense `Vec<bool>` of `U * E` bits would dwarf the rest of the pipeline's
/// memory footprint, so each user's row is instead the sorted list of
/// entities it touches.
struct Indicator {
    by_user: HashMap<UserId, Vec<EntityId>>,
    num_entities: usize,
}

impl Indicator {
    fn build(seb: &[SebRow], num_entities: usize) -> Self {
        let mut by_user: HashMap<UserId, Vec<EntityId>> = HashMap::new();
        for row in seb {
            by_user.entry(row.user).or_default().push(row.entity);
        }
        for entities in by_user.values_mut() {
            entities.sort_by_key(|e| e.0);
        }
        Self {
            by_user,
            num_entities,
        }
    }

    fn has(&self, user: UserId, entity: EntityId) -> bool {
        self.by_user
            .get(&user)
            .is_some_and(|es| es.binary_search_by_key(&entity.0, |e| e.0).is_ok())
    }

    /// Dense row for `user` over `0..num_entities`, used by `jsd`/centroid
    /// arithmetic which both want plain vectors.
    fn row(&self, user: UserId) -> Vec<f64> {
        let mut row = vec![0.0; self.num_entities];
        if let Some(entities) = self.by_user.get(&user) {
            for e in entities {
                row[e.0 as usize] = 1.0;
            }
        }
        row
    }

    /// Users touching every entity in `entities`, excluding `u1`/`u2`.
    fn neighbourhood(&self, entities: &[EntityId], u1: UserId, u2: UserId) -> Vec<UserId> {
        self.by_user
            .keys()
            .copied()
            .filter(|&v| v != u1 && v != u2)
            .filter(|&v| entities.iter().all(|&e| self.has(v, e)))
            .collect()
    }

    /// Rough in-memory size of the sparse rows, for the debug-level
    /// footprint log a dense `U * E` bit-matrix would otherwise force.
    fn approx_bytes(&self) -> usize {
        self.by_user
            .values()
            .map(|v| v.capacity() * size_of::<EntityId>())
            .sum()
    }
}

/// Total similarity weight aggregated per unordered pair, used both to
/// define `W_max` for a pair under correction and to look up a third
/// party's existing weight against `u1`/`u2` when trimming the
/// neighbourhood.
fn aggregate_weights(edges: &[RefinedEdge]) -> HashMap<(UserId, UserId), f64> {
    let mut totals: HashMap<(UserId, UserId), f64> = HashMap::new();
    for e in edges {
        *totals.entry((e.from, e.to)).or_insert(0.0) += e.weight;
    }
    totals
}

fn pair_key(a: UserId, b: UserId) -> (UserId, UserId) {
    if a.0 < b.0 {
        (a, b)
    } else {
        (b, a)
    }
}

/// Rescales every refined edge by its pair's group-divergence correction,
/// dropping rows whose rescaled weight is no longer strictly positive.
///
/// `edges` must already be grouped so that every row for a given `(from,
/// to)` pair is contiguous (the pipeline guarantees this, since refined
/// edges are emitted chunk-by-chunk without ever splitting a pair group).
pub fn correct(edges: &[RefinedEdge], seb: &[SebRow], num_entities: usize) -> Vec<RefinedEdge> {
    if edges.is_empty() {
        return Vec::new();
    }

    let indicator = Indicator::build(seb, num_entities);
    debug!(
        users = indicator.by_user.len(),
        footprint = %format_bytes(indicator.approx_bytes() as u64),
        "built sparse user-entity indicator"
    );
    let aggregated = aggregate_weights(edges);

    let mut out = Vec::new();
    for group in edges.chunk_by(|a, b| a.from == b.from && a.to == b.to) {
        out.extend(correct_pair(group, &indicator, &aggregated));
    }
    out
}

fn correct_pair(
    group: &[RefinedEdge],
    indicator: &Indicator,
    aggregated: &HashMap<(UserId, UserId), f64>,
) -> Vec<RefinedEdge> {
    let u1 = group[0].from;
    let u2 = group[0].to;
    let entities: Vec<EntityId> = group.iter().map(|e| e.entity).collect();
    let w_max = aggregated.get(&(u1, u2)).copied().unwrap_or(0.0);

    let mut neighbours = indicator.neighbourhood(&entities, u1, u2);
    let pre_trim_neighbour_count = neighbours.len();

    neighbours.retain(|&v| {
        let against_u1 = aggregated.get(&pair_key(v, u1)).copied().unwrap_or(0.0);
        let against_u2 = aggregated.get(&pair_key(v, u2)).copied().unwrap_or(0.0);
        against_u1 < w_max && against_u2 < w_max
    });

    if neighbours.is_empty() || w_max <= 0.0 {
        return group.to_vec();
    }

    let mut weights = Vec::with_capacity(neighbours.len());
    let mut sum_weight = 0.0;
    for &v in &neighbours {
        let against_u1 = aggregated.get(&pair_key(v, u1)).copied().unwrap_or(0.0);
        let against_u2 = aggregated.get(&pair_key(v, u2)).copied().unwrap_or(0.0);
        let x_v = against_u1.max(against_u2);
        let omega = (w_max - x_v) / w_max;
        weights.push(omega);
        sum_weight += omega;
    }

    if sum_weight <= 0.0 {
        return group.to_vec();
    }

    let num_entities = indicator.num_entities;
    let mut centroid = vec![0.0; num_entities];
    for (&v, &omega) in neighbours.iter().zip(&weights) {
        let row = indicator.row(v);
        for (c, r) in centroid.iter_mut().zip(row) {
            *c += omega * r;
        }
    }
    for c in &mut centroid {
        *c /= sum_weight;
    }

    let row_u1 = indicator.row(u1);
    let row_u2 = indicator.row(u2);
    let j1 = jsd(&row_u1, &centroid);
    let j2 = jsd(&row_u2, &centroid);
    let j3 = jsd(&row_u1, &row_u2);
    let delta = j1.min(j2) - j3;

    let n = pre_trim_neighbour_count as f64;
    let fraction = sum_weight / n;

    group
        .iter()
        .filter_map(|edge| {
            let rescaled = edge.weight * (1.0 - fraction) + edge.weight * delta * fraction;
            if rescaled > 0.0 {
                let mut out = edge.clone();
                out.weight = rescaled;
                Some(out)
            } else {
                None
            }
        })
        .collect()
}
