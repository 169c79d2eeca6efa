//! Post-stream normaliser (§4.1): flattens a stream of `(user, entity, time,
//! post_id)` tuples into a deduplicated, exclusion-filtered stream, merging
//! the entities of a single post with set semantics.

use std::collections::{HashMap, HashSet};

use crate::types::{NormalizedPost, RawPost};

/// Tallies from one normalisation pass, logged by the pipeline at `debug`
/// level rather than surfaced as an error — malformed input is routine, not
/// exceptional (§7 "InputMalformed").
#[derive(Debug, Default, Clone, Copy)]
pub struct NormalizeStats {
    pub posts_seen: usize,
    pub entities_dropped: usize,
    pub posts_with_no_entities: usize,
}

struct PostAccum {
    user_id: String,
    post_time: f64,
    entities: Vec<String>,
    seen: HashSet<String>,
}

/// Normalises a raw post stream against a lower-cased exclusion set.
///
/// Posts are grouped by `post_id` to merge duplicate entities (set
/// semantics within a post); the surviving rows preserve the order in
/// which each `post_id` and, within it, each entity was first seen.
pub fn normalize<I>(posts: I, exclude: &HashSet<String>) -> (Vec<NormalizedPost>, NormalizeStats)
where
    I: IntoIterator<Item = RawPost>,
{
    let mut order: Vec<String> = Vec::new();
    let mut accums: HashMap<String, PostAccum> = HashMap::new();
    let mut stats = NormalizeStats::default();

    for raw in posts {
        stats.posts_seen += 1;
        let accum = accums.entry(raw.post_id.clone()).or_insert_with(|| {
            order.push(raw.post_id.clone());
            PostAccum {
                user_id: raw.user_id,
                post_time: raw.post_time,
                entities: Vec::new(),
                seen: HashSet::new(),
            }
        });
        if accum.seen.insert(raw.entity.clone()) {
            accum.entities.push(raw.entity);
        }
    }

    let mut out = Vec::new();
    for post_id in order {
        let accum = accums.remove(&post_id).expect("post_id recorded in order");
        let mut kept_any = false;
        for entity in accum.entities {
            if exclude.contains(&entity.to_lowercase()) {
                stats.entities_dropped += 1;
                continue;
            }
            kept_any = true;
            out.push(NormalizedPost {
                user_id: accum.user_id.clone(),
                entity,
                post_time: accum.post_time,
                post_id: post_id.clone(),
            });
        }
        if !kept_any {
            stats.posts_with_no_entities += 1;
        }
    }

    (out, stats)
}
