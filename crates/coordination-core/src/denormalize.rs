//! Denormaliser (§4.7): maps dense ids back to the original identifiers and
//! produces the final, deterministically sorted edge table.

use crate::ids::IdMaps;
use crate::types::{FinalEdge, RefinedEdge};

/// Projects every refined edge to its final, original-id form and sorts by
/// weight descending, breaking ties on `(from, to, entity)` so the output
/// is stable across repeated runs on identical input (§4.7).
pub fn denormalize(edges: &[RefinedEdge], ids: &IdMaps) -> Vec<FinalEdge> {
    let mut out: Vec<FinalEdge> = edges
        .iter()
        .map(|e| FinalEdge {
            from: ids.user(e.from).to_string(),
            to: ids.user(e.to).to_string(),
            entity: ids.entity(e.entity).to_string(),
            weight: e.weight,
            post_ids_from: e.posts_from.clone(),
            post_ids_to: e.posts_to.clone(),
        })
        .collect();

    out.sort_by(|a, b| {
        b.weight
            .partial_cmp(&a.weight)
            .unwrap()
            .then_with(|| a.from.cmp(&b.from))
            .then_with(|| a.to.cmp(&b.to))
            .then_with(|| a.entity.cmp(&b.entity))
    });

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntityId, NormalizedPost, UserId};
    use std::sync::Arc;

    fn make_ids() -> IdMaps {
        let posts = vec![
            NormalizedPost {
                user_id: "alice".to_string(),
                entity: "#a".to_string(),
                post_time: 0.0,
                post_id: "p1".to_string(),
            },
            NormalizedPost {
                user_id: "bob".to_string(),
                entity: "#b".to_string(),
                post_time: 0.0,
                post_id: "p2".to_string(),
            },
        ];
        IdMaps::build(&posts).0
    }

    fn edge(from: u32, to: u32, entity: u32, weight: f64) -> RefinedEdge {
        RefinedEdge {
            from: UserId(from),
            to: UserId(to),
            entity: EntityId(entity),
            beha_from: 1.0,
            beha_to: 1.0,
            posts_from: vec![Arc::from("pf")],
            posts_to: vec![Arc::from("pt")],
            weight,
        }
    }

    #[test]
    fn maps_dense_ids_back_to_original_strings() {
        let ids = make_ids();
        let out = denormalize(&[edge(0, 1, 0, 0.5)], &ids);
        assert_eq!(out[0].from, "alice");
        assert_eq!(out[0].to, "bob");
        assert_eq!(out[0].entity, "#a");
    }

    #[test]
    fn sorts_by_weight_descending() {
        let ids = make_ids();
        let edges = vec![edge(0, 1, 0, 0.2), edge(0, 1, 1, 0.9)];
        let out = denormalize(&edges, &ids);
        assert!(out[0].weight > out[1].weight);
    }

    #[test]
    fn breaks_ties_lexicographically() {
        let ids = make_ids();
        let edges = vec![edge(0, 1, 1, 0.5), edge(0, 1, 0, 0.5)];
        let out = denormalize(&edges, &ids);
        assert_eq!(out[0].entity, "#a");
        assert_eq!(out[1].entity, "#b");
    }
}
