use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Platform role: artists publish artworks, art lovers browse and collect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(rename = "artist")]
    Artist,
    #[serde(rename = "artLover")]
    ArtLover,
}

/// Denormalized-looking counters, all computed from source-of-truth
/// tables at read time. Never stored, so they cannot drift.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserStats {
    pub followers: i64,
    pub following: i64,
    pub artworks: i64,
    pub collections: i64,
    pub liked: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub display_name: String,
    pub bio: String,
    pub avatar_url: String,
    #[serde(default)]
    pub liked_artwork_ids: Vec<String>,
    #[serde(default)]
    pub stats: UserStats,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-user visibility overlay. Each field is a set of IDs; membership is
/// the only state. Hidden sets flip via toggle, dismissed/deleted sets
/// only ever grow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InteractionData {
    #[serde(default)]
    pub hidden_post_ids: Vec<String>,
    #[serde(default)]
    pub hidden_artwork_ids: Vec<String>,
    #[serde(default)]
    pub dismissed_recommendation_ids: Vec<String>,
    #[serde(default)]
    pub hidden_conversation_ids: Vec<String>,
    #[serde(default)]
    pub deleted_conversation_ids: Vec<String>,
    #[serde(default)]
    pub hidden_message_ids: Vec<String>,
}

/// A published artwork. `likes` is a plain counter at the catalog level;
/// which viewer liked what lives on the User side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artwork {
    pub id: String,
    pub artist_id: String,
    pub image_url: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub likes: i64,
    pub comments: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A feed post. `liked_by` is a real set (supports idempotent toggling),
/// `comments` an append-only ordered sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialPost {
    pub id: String,
    pub author_id: String,
    pub content: String,
    pub image_url: Option<String>,
    #[serde(default)]
    pub liked_by: Vec<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
}

/// Named grouping of ad-hoc artwork references owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub items: Vec<CollectionItem>,
    pub created_at: DateTime<Utc>,
}

/// An item saved into a collection. These reference off-platform artwork,
/// so they carry their own title/artist fields instead of an artwork id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionItem {
    pub id: String,
    pub collection_id: String,
    pub image_url: String,
    pub title: String,
    pub artist_name: String,
    pub created_at: DateTime<Utc>,
}

/// A 1:1 conversation. `unread_counts` maps participant id to that
/// participant's unread count; counts are independent per participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub participant_a: String,
    pub participant_b: String,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub unread_counts: HashMap<String, i64>,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn is_participant(&self, user_id: &str) -> bool {
        self.participant_a == user_id || self.participant_b == user_id
    }

    /// The participant that is not `user_id`. Only meaningful for
    /// participants; callers validate membership first.
    pub fn other_participant(&self, user_id: &str) -> &str {
        if self.participant_a == user_id {
            &self.participant_b
        } else {
            &self.participant_a
        }
    }
}

/// Compact identity used wherever another user's name/avatar is shown.
/// Deleted users degrade to a placeholder instead of breaking lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantSummary {
    pub id: String,
    pub display_name: String,
    pub avatar_url: String,
}

impl ParticipantSummary {
    pub fn placeholder(id: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: "Deleted user".to_string(),
            avatar_url: String::new(),
        }
    }
}

/// One row of a user's conversation list, annotated for that viewer.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSummary {
    pub id: String,
    pub other_participant: ParticipantSummary,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub unread: i64,
    pub is_hidden: bool,
    pub is_connection: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Like,
    Comment,
    Follow,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Like => "like",
            NotificationType::Comment => "comment",
            NotificationType::Follow => "follow",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub actor_id: String,
    pub preview: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Notification as returned to clients: actor identity joined at read
/// time so renames and avatar changes show up without rewriting rows.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationView {
    pub id: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub actor: ParticipantSummary,
    pub preview: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// One entry of the assembled feed. Transient, recomputed per request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedItem {
    Post {
        data: SocialPost,
    },
    Recommendation {
        data: Artwork,
        reason: String,
        is_hidden: bool,
    },
}

// Request/Response types for API

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<UserRole>,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateArtworkRequest {
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateArtworkRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub content: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct StartConversationRequest {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCollectionRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddCollectionItemRequest {
    /// Target collection name; defaults to "Favorites", created lazily.
    pub collection: Option<String>,
    pub image_url: String,
    pub title: String,
    pub artist_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EnhanceRequest {
    /// Base64-encoded image bytes.
    pub image: String,
    pub instruction: String,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}
