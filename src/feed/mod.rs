//! Feed Assembler
//!
//! Merges the post stream with artwork recommendations into one ordered
//! sequence, re-applying the viewer's preference overlay on every
//! request. Visibility is three-tiered on purpose: hidden posts are
//! filtered out, hidden recommendations stay in the sequence but flagged,
//! dismissed recommendations are excluded outright.

use std::sync::Arc;

use crate::models::{Artwork, FeedItem, SocialPost};
use crate::prefs::Preferences;
use crate::store::{Store, StoreResult};

/// Fixed-size prefix of the recommendation pool per feed request.
pub const RECOMMENDATION_LIMIT: usize = 5;
pub const RECOMMENDATION_REASON: &str = "Recommended for you";

pub struct FeedAssembler {
    store: Arc<Store>,
    prefs: Preferences,
}

impl FeedAssembler {
    pub fn new(store: Arc<Store>) -> Self {
        let prefs = Preferences::new(store.clone());
        Self { store, prefs }
    }

    pub fn assemble(&self, user_id: &str) -> StoreResult<Vec<FeedItem>> {
        let overlay = self.prefs.get(user_id)?;

        let posts: Vec<SocialPost> = self
            .store
            .list_posts()?
            .into_iter()
            .filter(|post| !overlay.hidden_post_ids.contains(&post.id))
            .collect();

        let recommendations: Vec<(Artwork, bool)> = self
            .store
            .list_recommendation_pool(user_id)?
            .into_iter()
            .filter(|artwork| !overlay.dismissed_recommendation_ids.contains(&artwork.id))
            .take(RECOMMENDATION_LIMIT)
            .map(|artwork| {
                let is_hidden = overlay.hidden_artwork_ids.contains(&artwork.id);
                (artwork, is_hidden)
            })
            .collect();

        Ok(interleave(posts, recommendations))
    }
}

/// Recommendation `i` is inserted before the post at index `(i+1)*2` of
/// the post sequence, so there is at most one recommendation per two
/// posts, front-loaded. Recommendations whose slot lies beyond the end of
/// the post sequence are appended in order, never dropped.
fn interleave(posts: Vec<SocialPost>, recommendations: Vec<(Artwork, bool)>) -> Vec<FeedItem> {
    let mut items = Vec::with_capacity(posts.len() + recommendations.len());
    let mut pending = recommendations.into_iter().enumerate().peekable();

    for (index, post) in posts.into_iter().enumerate() {
        while let Some((i, _)) = pending.peek() {
            if (i + 1) * 2 == index {
                let (_, (artwork, is_hidden)) = pending.next().unwrap();
                items.push(FeedItem::Recommendation {
                    data: artwork,
                    reason: RECOMMENDATION_REASON.to_string(),
                    is_hidden,
                });
            } else {
                break;
            }
        }
        items.push(FeedItem::Post { data: post });
    }

    for (_, (artwork, is_hidden)) in pending {
        items.push(FeedItem::Recommendation {
            data: artwork,
            reason: RECOMMENDATION_REASON.to_string(),
            is_hidden,
        });
    }

    items
}
