//! Social Graph + Catalog glue
//!
//! Follow edges (the source of truth for the graph), artwork and post
//! likes, comments, and collections. Like/follow operations are toggles:
//! each call deterministically flips state, and only the "on" direction
//! fans out a notification.

use std::sync::Arc;
use thiserror::Error;

use crate::models::*;
use crate::notify::Notifier;
use crate::store::{Store, StoreError, StoreResult};

#[derive(Error, Debug)]
pub enum SocialError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Validation failure: {0}")]
    Validation(String),
}

pub type SocialResult<T> = Result<T, SocialError>;

const PREVIEW_LEN: usize = 80;

pub struct SocialService {
    store: Arc<Store>,
    notifier: Notifier,
}

impl SocialService {
    pub fn new(store: Arc<Store>) -> Self {
        let notifier = Notifier::new(store.clone());
        Self { store, notifier }
    }

    // ==================== Social Graph ====================

    /// Flip the follow edge from `follower_id` to `target_id`. Following
    /// notifies the target; unfollowing notifies nobody. Returns the
    /// updated follower with freshly derived stats.
    pub fn toggle_follow(&self, follower_id: &str, target_id: &str) -> SocialResult<User> {
        if follower_id == target_id {
            return Err(SocialError::Validation(
                "Cannot follow yourself".to_string(),
            ));
        }

        // Target must be an active user.
        self.store.get_user(target_id)?;

        if self.store.is_following(follower_id, target_id)? {
            self.store.delete_follow(follower_id, target_id)?;
        } else {
            self.store.insert_follow(follower_id, target_id)?;
            self.notifier
                .notify(target_id, follower_id, NotificationType::Follow, None)?;
        }

        Ok(self.store.get_user(follower_id)?)
    }

    pub fn is_following(&self, follower_id: &str, target_id: &str) -> StoreResult<bool> {
        self.store.is_following(follower_id, target_id)
    }

    // ==================== Artwork Likes ====================

    /// Membership test against the user's liked set keeps the toggle
    /// idempotent even though the artwork itself only carries a counter.
    pub fn toggle_artwork_like(&self, user_id: &str, artwork_id: &str) -> SocialResult<User> {
        let mut user = self.store.get_user(user_id)?;
        let artwork = self.store.get_artwork(artwork_id)?;

        if let Some(pos) = user.liked_artwork_ids.iter().position(|id| id == artwork_id) {
            user.liked_artwork_ids.remove(pos);
            self.store.update_user(&mut user)?;
            self.store.bump_artwork_likes(artwork_id, -1)?;
        } else {
            user.liked_artwork_ids.push(artwork_id.to_string());
            self.store.update_user(&mut user)?;
            self.store.bump_artwork_likes(artwork_id, 1)?;
            self.notifier.notify(
                &artwork.artist_id,
                user_id,
                NotificationType::Like,
                Some(preview_of(&artwork.title)),
            )?;
        }

        Ok(self.store.get_user(user_id)?)
    }

    // ==================== Post Likes & Comments ====================

    pub fn toggle_post_like(&self, user_id: &str, post_id: &str) -> SocialResult<SocialPost> {
        let post = self.store.get_post(post_id)?;

        if self.store.has_post_like(post_id, user_id)? {
            self.store.delete_post_like(post_id, user_id)?;
        } else {
            self.store.insert_post_like(post_id, user_id)?;
            self.notifier.notify(
                &post.author_id,
                user_id,
                NotificationType::Like,
                Some(preview_of(&post.content)),
            )?;
        }

        Ok(self.store.get_post(post_id)?)
    }

    pub fn add_comment(&self, user_id: &str, post_id: &str, text: &str) -> SocialResult<Comment> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SocialError::Validation("Comment text is required".to_string()));
        }

        let post = self.store.get_post(post_id)?;

        let mut comment = Comment {
            id: String::new(),
            post_id: post_id.to_string(),
            user_id: user_id.to_string(),
            text: text.to_string(),
            created_at: chrono::Utc::now(),
        };
        self.store.create_comment(&mut comment)?;

        self.notifier.notify(
            &post.author_id,
            user_id,
            NotificationType::Comment,
            Some(preview_of(text)),
        )?;

        Ok(comment)
    }

    // ==================== Collections ====================

    pub fn list_collections(&self, user_id: &str) -> StoreResult<Vec<Collection>> {
        self.store.list_collections(user_id)
    }

    pub fn create_collection(&self, user_id: &str, name: &str) -> SocialResult<Collection> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SocialError::Validation(
                "Collection name is required".to_string(),
            ));
        }
        if self.store.find_collection(user_id, name)?.is_some() {
            return Err(SocialError::Validation(format!(
                "Collection '{}' already exists",
                name
            )));
        }

        let mut collection = Collection {
            id: String::new(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            items: Vec::new(),
            created_at: chrono::Utc::now(),
        };
        self.store.create_collection(&mut collection)?;
        Ok(collection)
    }

    /// Adds an ad-hoc artwork reference. Without an explicit collection
    /// name the default "Favorites" collection is created lazily.
    pub fn add_to_collection(
        &self,
        user_id: &str,
        request: &AddCollectionItemRequest,
    ) -> SocialResult<CollectionItem> {
        let name = request.collection.as_deref().unwrap_or("Favorites");

        let collection = match self.store.find_collection(user_id, name)? {
            Some(collection) => collection,
            None => {
                let mut collection = Collection {
                    id: String::new(),
                    user_id: user_id.to_string(),
                    name: name.to_string(),
                    items: Vec::new(),
                    created_at: chrono::Utc::now(),
                };
                self.store.create_collection(&mut collection)?;
                collection
            }
        };

        let mut item = CollectionItem {
            id: String::new(),
            collection_id: collection.id,
            image_url: request.image_url.clone(),
            title: request.title.clone(),
            artist_name: request.artist_name.clone().unwrap_or_default(),
            created_at: chrono::Utc::now(),
        };
        self.store.add_collection_item(&mut item)?;
        Ok(item)
    }
}

fn preview_of(text: &str) -> String {
    if text.chars().count() <= PREVIEW_LEN {
        text.to_string()
    } else {
        text.chars().take(PREVIEW_LEN).collect()
    }
}
