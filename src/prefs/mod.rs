//! Preference Store
//!
//! Per-user overlay of hidden/dismissed content IDs. Membership is the
//! only state: no ordering, no counts. Hidden sets use toggle semantics
//! (present -> remove, absent -> add); dismissed recommendations and
//! deleted conversations are append-only. Every write replaces the whole
//! payload for the owning user, and a user's overlay is never read on
//! behalf of anyone else.

use std::sync::Arc;

use crate::models::InteractionData;
use crate::store::{Store, StoreResult};

pub struct Preferences {
    store: Arc<Store>,
}

impl Preferences {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Returns the all-empty overlay for users with no saved preferences.
    pub fn get(&self, user_id: &str) -> StoreResult<InteractionData> {
        self.store.get_preferences(user_id)
    }

    pub fn set(&self, user_id: &str, data: &InteractionData) -> StoreResult<()> {
        self.store.set_preferences(user_id, data)
    }

    fn mutate(
        &self,
        user_id: &str,
        apply: impl FnOnce(&mut InteractionData),
    ) -> StoreResult<()> {
        let mut data = self.store.get_preferences(user_id)?;
        apply(&mut data);
        self.store.set_preferences(user_id, &data)
    }

    pub fn toggle_hidden_post(&self, user_id: &str, post_id: &str) -> StoreResult<()> {
        self.mutate(user_id, |data| toggle(&mut data.hidden_post_ids, post_id))
    }

    pub fn toggle_hidden_artwork(&self, user_id: &str, artwork_id: &str) -> StoreResult<()> {
        self.mutate(user_id, |data| {
            toggle(&mut data.hidden_artwork_ids, artwork_id)
        })
    }

    pub fn toggle_hidden_conversation(
        &self,
        user_id: &str,
        conversation_id: &str,
    ) -> StoreResult<()> {
        self.mutate(user_id, |data| {
            toggle(&mut data.hidden_conversation_ids, conversation_id)
        })
    }

    pub fn toggle_hidden_message(&self, user_id: &str, message_id: &str) -> StoreResult<()> {
        self.mutate(user_id, |data| {
            toggle(&mut data.hidden_message_ids, message_id)
        })
    }

    /// Append-only: a dismissed recommendation never comes back.
    pub fn dismiss_recommendation(&self, user_id: &str, artwork_id: &str) -> StoreResult<()> {
        self.mutate(user_id, |data| {
            append(&mut data.dismissed_recommendation_ids, artwork_id)
        })
    }

    /// Append-only: deletion is permanent from the deleting user's side.
    pub fn delete_conversation(&self, user_id: &str, conversation_id: &str) -> StoreResult<()> {
        self.mutate(user_id, |data| {
            append(&mut data.deleted_conversation_ids, conversation_id)
        })
    }
}

fn toggle(set: &mut Vec<String>, id: &str) {
    if let Some(pos) = set.iter().position(|x| x == id) {
        set.remove(pos);
    } else {
        set.push(id.to_string());
    }
}

fn append(set: &mut Vec<String>, id: &str) {
    if !set.iter().any(|x| x == id) {
        set.push(id.to_string());
    }
}
