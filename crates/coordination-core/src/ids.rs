//! Dense id assignment, applied after pruning so that the numeric id space
//! is as small as the surviving data allows.

use std::collections::HashMap;
use std::sync::Arc;

use crate::types::{DensePost, EntityId, NormalizedPost, UserId};

/// Bijective maps between the dense ids used throughout the pipeline and
/// the original string identifiers, built in first-seen order.
#[derive(Debug)]
pub struct IdMaps {
    users: Vec<String>,
    entities: Vec<String>,
}

impl IdMaps {
    /// Assigns dense ids to every user and entity appearing in `posts`, in
    /// first-seen order, and returns the maps alongside the dense-id post
    /// list.
    pub fn build(posts: &[NormalizedPost]) -> (Self, Vec<DensePost>) {
        let mut users = Vec::new();
        let mut entities = Vec::new();
        let mut user_index: HashMap<&str, u32> = HashMap::new();
        let mut entity_index: HashMap<&str, u32> = HashMap::new();
        let mut dense = Vec::with_capacity(posts.len());

        for p in posts {
            let user = *user_index.entry(p.user_id.as_str()).or_insert_with(|| {
                let id = users.len() as u32;
                users.push(p.user_id.clone());
                id
            });
            let entity = *entity_index.entry(p.entity.as_str()).or_insert_with(|| {
                let id = entities.len() as u32;
                entities.push(p.entity.clone());
                id
            });
            dense.push(DensePost {
                user: UserId(user),
                entity: EntityId(entity),
                post_time: p.post_time,
                post_id: Arc::from(p.post_id.as_str()),
            });
        }

        (Self { users, entities }, dense)
    }

    pub fn user(&self, id: UserId) -> &str {
        &self.users[id.0 as usize]
    }

    pub fn entity(&self, id: EntityId) -> &str {
        &self.entities[id.0 as usize]
    }

    pub fn num_users(&self) -> usize {
        self.users.len()
    }

    pub fn num_entities(&self) -> usize {
        self.entities.len()
    }
}
