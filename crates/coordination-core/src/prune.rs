//! Fixed-point pruning (§4.2): removes entities used by at most one user and
//! users who use at most one entity, repeating until the post list stops
//! shrinking. Order matters only for determinism of the id assignment that
//! follows, not for the pruning result itself, which is order-independent.

use std::collections::{HashMap, HashSet};

use crate::types::NormalizedPost;

/// Repeatedly strips singleton entities and singleton users until a fixed
/// point is reached. Returns an empty vector if everything prunes away.
pub fn prune(mut posts: Vec<NormalizedPost>) -> Vec<NormalizedPost> {
    loop {
        if posts.is_empty() {
            return posts;
        }
        let before = posts.len();

        let bad_entities = singleton_keys(&posts, |p| &p.entity, |p| &p.user_id);
        if !bad_entities.is_empty() {
            posts.retain(|p| !bad_entities.contains(&p.entity));
        }
        if posts.is_empty() {
            return posts;
        }

        let bad_users = singleton_keys(&posts, |p| &p.user_id, |p| &p.entity);
        if !bad_users.is_empty() {
            posts.retain(|p| !bad_users.contains(&p.user_id));
        }

        if posts.len() == before {
            return posts;
        }
    }
}

/// Returns the set of `key(post)` values that have at most one distinct
/// `partner(post)` among posts sharing that key.
fn singleton_keys<'p>(
    posts: &'p [NormalizedPost],
    key: impl Fn(&'p NormalizedPost) -> &'p str,
    partner: impl Fn(&'p NormalizedPost) -> &'p str,
) -> HashSet<String> {
    let mut partners: HashMap<&str, HashSet<&str>> = HashMap::new();
    for post in posts {
        partners.entry(key(post)).or_default().insert(partner(post));
    }
    partners
        .into_iter()
        .filter(|(_, ps)| ps.len() <= 1)
        .map(|(k, _)| k.to_string())
        .collect()
}
