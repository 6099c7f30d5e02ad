use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use uuid::Uuid;

use crate::models::*;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Thread-safe SQLite store. The mutex serializes every read-modify-write
/// operation, so logical operations like unread-counter updates cannot
/// interleave in-process.
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Create a new store with the given database path
    pub fn new(db_path: &str) -> StoreResult<Self> {
        let conn = Connection::open(db_path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store for testing
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'artLover',
                display_name TEXT DEFAULT '',
                bio TEXT DEFAULT '',
                avatar_url TEXT DEFAULT '',
                liked_artwork_ids TEXT DEFAULT '[]',
                deleted_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS follows (
                follower_id TEXT NOT NULL,
                target_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (follower_id, target_id),
                FOREIGN KEY (follower_id) REFERENCES users(id),
                FOREIGN KEY (target_id) REFERENCES users(id)
            );

            CREATE TABLE IF NOT EXISTS preferences (
                user_id TEXT PRIMARY KEY,
                payload TEXT NOT NULL DEFAULT '{}',
                updated_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id)
            );

            CREATE TABLE IF NOT EXISTS artworks (
                id TEXT PRIMARY KEY,
                artist_id TEXT NOT NULL,
                image_url TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT DEFAULT '',
                tags TEXT DEFAULT '[]',
                likes INTEGER DEFAULT 0,
                comments INTEGER DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (artist_id) REFERENCES users(id)
            );

            CREATE TABLE IF NOT EXISTS posts (
                id TEXT PRIMARY KEY,
                author_id TEXT NOT NULL,
                content TEXT DEFAULT '',
                image_url TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (author_id) REFERENCES users(id)
            );

            CREATE TABLE IF NOT EXISTS post_likes (
                post_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                PRIMARY KEY (post_id, user_id),
                FOREIGN KEY (post_id) REFERENCES posts(id),
                FOREIGN KEY (user_id) REFERENCES users(id)
            );

            CREATE TABLE IF NOT EXISTS comments (
                id TEXT PRIMARY KEY,
                post_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                text TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (post_id) REFERENCES posts(id),
                FOREIGN KEY (user_id) REFERENCES users(id)
            );

            CREATE TABLE IF NOT EXISTS collections (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE(user_id, name),
                FOREIGN KEY (user_id) REFERENCES users(id)
            );

            CREATE TABLE IF NOT EXISTS collection_items (
                id TEXT PRIMARY KEY,
                collection_id TEXT NOT NULL,
                image_url TEXT NOT NULL,
                title TEXT DEFAULT '',
                artist_name TEXT DEFAULT '',
                created_at TEXT NOT NULL,
                FOREIGN KEY (collection_id) REFERENCES collections(id)
            );

            CREATE TABLE IF NOT EXISTS conversations (
                id TEXT PRIMARY KEY,
                participant_a TEXT NOT NULL,
                participant_b TEXT NOT NULL,
                last_message TEXT,
                last_message_at TEXT,
                unread_counts TEXT NOT NULL DEFAULT '{}',
                created_at TEXT NOT NULL,
                FOREIGN KEY (participant_a) REFERENCES users(id),
                FOREIGN KEY (participant_b) REFERENCES users(id)
            );

            CREATE TABLE IF NOT EXISTS messages (
                id TEXT PRIMARY KEY,
                conversation_id TEXT NOT NULL,
                sender_id TEXT NOT NULL,
                text TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (conversation_id) REFERENCES conversations(id),
                FOREIGN KEY (sender_id) REFERENCES users(id)
            );

            CREATE TABLE IF NOT EXISTS notifications (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                type TEXT NOT NULL,
                actor_id TEXT NOT NULL,
                preview TEXT,
                read INTEGER DEFAULT 0,
                created_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id)
            );

            CREATE INDEX IF NOT EXISTS idx_follows_target ON follows(target_id);
            CREATE INDEX IF NOT EXISTS idx_artworks_artist ON artworks(artist_id);
            CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts(created_at);
            CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id);
            CREATE INDEX IF NOT EXISTS idx_messages_conversation ON messages(conversation_id);
            CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id);
            "#,
        )?;
        Ok(())
    }

    // ==================== User Operations ====================

    pub fn create_user(&self, user: &mut User) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        user.id = Uuid::new_v4().to_string();
        let now = Utc::now();
        user.created_at = now;
        user.updated_at = now;

        let liked_json = serde_json::to_string(&user.liked_artwork_ids)?;

        conn.execute(
            r#"INSERT INTO users (id, username, email, password_hash, role, display_name,
                bio, avatar_url, liked_artwork_ids, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"#,
            params![
                &user.id,
                &user.username,
                &user.email,
                &user.password_hash,
                role_to_str(user.role),
                &user.display_name,
                &user.bio,
                &user.avatar_url,
                &liked_json,
                user.created_at.to_rfc3339(),
                user.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Fetch an active user. Soft-removed users read as NotFound; callers
    /// that need a degraded identity map that to a placeholder.
    pub fn get_user(&self, id: &str) -> StoreResult<User> {
        let conn = self.conn.lock().unwrap();
        let mut user = conn
            .query_row(
                "SELECT * FROM users WHERE id = ?1 AND deleted_at IS NULL",
                params![id],
                row_to_user,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    StoreError::NotFound(format!("User {}", id))
                }
                _ => StoreError::Database(e),
            })?;
        user.stats = self.user_stats_locked(&conn, &user)?;
        Ok(user)
    }

    pub fn get_user_by_username(&self, username: &str) -> StoreResult<User> {
        let conn = self.conn.lock().unwrap();
        let mut user = conn
            .query_row(
                "SELECT * FROM users WHERE username = ?1 AND deleted_at IS NULL",
                params![username],
                row_to_user,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    StoreError::NotFound(format!("User {}", username))
                }
                _ => StoreError::Database(e),
            })?;
        user.stats = self.user_stats_locked(&conn, &user)?;
        Ok(user)
    }

    fn user_stats_locked(&self, conn: &Connection, user: &User) -> StoreResult<UserStats> {
        let followers: i64 = conn.query_row(
            "SELECT COUNT(*) FROM follows WHERE target_id = ?1",
            params![&user.id],
            |row| row.get(0),
        )?;
        let following: i64 = conn.query_row(
            "SELECT COUNT(*) FROM follows WHERE follower_id = ?1",
            params![&user.id],
            |row| row.get(0),
        )?;
        let artworks: i64 = conn.query_row(
            "SELECT COUNT(*) FROM artworks WHERE artist_id = ?1",
            params![&user.id],
            |row| row.get(0),
        )?;
        let collections: i64 = conn.query_row(
            "SELECT COUNT(*) FROM collections WHERE user_id = ?1",
            params![&user.id],
            |row| row.get(0),
        )?;
        Ok(UserStats {
            followers,
            following,
            artworks,
            collections,
            liked: user.liked_artwork_ids.len() as i64,
        })
    }

    pub fn update_user(&self, user: &mut User) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        user.updated_at = Utc::now();

        let liked_json = serde_json::to_string(&user.liked_artwork_ids)?;

        let rows = conn.execute(
            r#"UPDATE users SET display_name = ?1, bio = ?2, avatar_url = ?3,
               liked_artwork_ids = ?4, updated_at = ?5 WHERE id = ?6 AND deleted_at IS NULL"#,
            params![
                &user.display_name,
                &user.bio,
                &user.avatar_url,
                &liked_json,
                user.updated_at.to_rfc3339(),
                &user.id,
            ],
        )?;

        if rows == 0 {
            return Err(StoreError::NotFound(format!("User {}", user.id)));
        }
        Ok(())
    }

    /// Soft remove. Dependent posts, artworks, conversations and
    /// notifications are intentionally left in place; reads degrade via
    /// the placeholder identity instead.
    pub fn soft_delete_user(&self, id: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        let rows = conn.execute(
            "UPDATE users SET deleted_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
            params![&now, id],
        )?;
        if rows == 0 {
            return Err(StoreError::NotFound(format!("User {}", id)));
        }
        Ok(())
    }

    // ==================== Follow Operations ====================

    pub fn is_following(&self, follower_id: &str, target_id: &str) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM follows WHERE follower_id = ?1 AND target_id = ?2",
            params![follower_id, target_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn insert_follow(&self, follower_id: &str, target_id: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO follows (follower_id, target_id, created_at) VALUES (?1, ?2, ?3)",
            params![follower_id, target_id, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn delete_follow(&self, follower_id: &str, target_id: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM follows WHERE follower_id = ?1 AND target_id = ?2",
            params![follower_id, target_id],
        )?;
        Ok(())
    }

    // ==================== Preference Operations ====================

    /// Absent rows read as the all-empty overlay; this never fails with
    /// NotFound.
    pub fn get_preferences(&self, user_id: &str) -> StoreResult<InteractionData> {
        let conn = self.conn.lock().unwrap();
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM preferences WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(json) => Ok(serde_json::from_str(&json).unwrap_or_default()),
            None => Ok(InteractionData::default()),
        }
    }

    /// Replaces the whole payload (last-write-wins at the record level).
    pub fn set_preferences(&self, user_id: &str, data: &InteractionData) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let json = serde_json::to_string(data)?;
        conn.execute(
            r#"INSERT INTO preferences (user_id, payload, updated_at) VALUES (?1, ?2, ?3)
               ON CONFLICT(user_id) DO UPDATE SET payload = ?2, updated_at = ?3"#,
            params![user_id, &json, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    // ==================== Artwork Operations ====================

    pub fn create_artwork(&self, artwork: &mut Artwork) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        artwork.id = Uuid::new_v4().to_string();
        let now = Utc::now();
        artwork.created_at = now;
        artwork.updated_at = now;

        let tags_json = serde_json::to_string(&artwork.tags)?;

        conn.execute(
            r#"INSERT INTO artworks (id, artist_id, image_url, title, description, tags,
                likes, comments, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"#,
            params![
                &artwork.id,
                &artwork.artist_id,
                &artwork.image_url,
                &artwork.title,
                &artwork.description,
                &tags_json,
                artwork.likes,
                artwork.comments,
                artwork.created_at.to_rfc3339(),
                artwork.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_artwork(&self, id: &str) -> StoreResult<Artwork> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT * FROM artworks WHERE id = ?1",
            params![id],
            row_to_artwork,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                StoreError::NotFound(format!("Artwork {}", id))
            }
            _ => StoreError::Database(e),
        })
    }

    pub fn update_artwork(&self, artwork: &mut Artwork) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        artwork.updated_at = Utc::now();

        let tags_json = serde_json::to_string(&artwork.tags)?;

        let rows = conn.execute(
            r#"UPDATE artworks SET image_url = ?1, title = ?2, description = ?3,
               tags = ?4, updated_at = ?5 WHERE id = ?6"#,
            params![
                &artwork.image_url,
                &artwork.title,
                &artwork.description,
                &tags_json,
                artwork.updated_at.to_rfc3339(),
                &artwork.id,
            ],
        )?;

        if rows == 0 {
            return Err(StoreError::NotFound(format!("Artwork {}", artwork.id)));
        }
        Ok(())
    }

    pub fn delete_artwork(&self, id: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let rows = conn.execute("DELETE FROM artworks WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(StoreError::NotFound(format!("Artwork {}", id)));
        }
        Ok(())
    }

    pub fn list_artworks(&self) -> StoreResult<Vec<Artwork>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT * FROM artworks ORDER BY created_at DESC")?;
        let rows = stmt.query_map([], row_to_artwork)?;

        let mut artworks = Vec::new();
        for row in rows {
            artworks.push(row?);
        }
        Ok(artworks)
    }

    pub fn list_artworks_by_artist(&self, artist_id: &str) -> StoreResult<Vec<Artwork>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT * FROM artworks WHERE artist_id = ?1 ORDER BY created_at DESC")?;
        let rows = stmt.query_map(params![artist_id], row_to_artwork)?;

        let mut artworks = Vec::new();
        for row in rows {
            artworks.push(row?);
        }
        Ok(artworks)
    }

    /// Recommendation candidates for a user: everything they did not
    /// publish themselves, newest first.
    pub fn list_recommendation_pool(&self, user_id: &str) -> StoreResult<Vec<Artwork>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT * FROM artworks WHERE artist_id != ?1 ORDER BY created_at DESC")?;
        let rows = stmt.query_map(params![user_id], row_to_artwork)?;

        let mut artworks = Vec::new();
        for row in rows {
            artworks.push(row?);
        }
        Ok(artworks)
    }

    /// Adjust the like counter, clamped at zero.
    pub fn bump_artwork_likes(&self, id: &str, delta: i64) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let rows = conn.execute(
            "UPDATE artworks SET likes = MAX(likes + ?1, 0), updated_at = ?2 WHERE id = ?3",
            params![delta, Utc::now().to_rfc3339(), id],
        )?;
        if rows == 0 {
            return Err(StoreError::NotFound(format!("Artwork {}", id)));
        }
        Ok(())
    }

    // ==================== Post Operations ====================

    pub fn create_post(&self, post: &mut SocialPost) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        post.id = Uuid::new_v4().to_string();
        post.created_at = Utc::now();

        conn.execute(
            r#"INSERT INTO posts (id, author_id, content, image_url, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5)"#,
            params![
                &post.id,
                &post.author_id,
                &post.content,
                &post.image_url,
                post.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_post(&self, id: &str) -> StoreResult<SocialPost> {
        let conn = self.conn.lock().unwrap();
        let mut post = conn
            .query_row("SELECT * FROM posts WHERE id = ?1", params![id], row_to_post)
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    StoreError::NotFound(format!("Post {}", id))
                }
                _ => StoreError::Database(e),
            })?;
        post.liked_by = self.post_likers_locked(&conn, &post.id)?;
        post.comments = self.comments_locked(&conn, &post.id)?;
        Ok(post)
    }

    pub fn delete_post(&self, id: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM post_likes WHERE post_id = ?1", params![id])?;
        conn.execute("DELETE FROM comments WHERE post_id = ?1", params![id])?;
        let rows = conn.execute("DELETE FROM posts WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(StoreError::NotFound(format!("Post {}", id)));
        }
        Ok(())
    }

    pub fn list_posts(&self) -> StoreResult<Vec<SocialPost>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT * FROM posts ORDER BY created_at DESC")?;
        let rows = stmt.query_map([], row_to_post)?;

        let mut posts = Vec::new();
        for row in rows {
            posts.push(row?);
        }

        for post in &mut posts {
            post.liked_by = self.post_likers_locked(&conn, &post.id)?;
            post.comments = self.comments_locked(&conn, &post.id)?;
        }

        Ok(posts)
    }

    fn post_likers_locked(&self, conn: &Connection, post_id: &str) -> StoreResult<Vec<String>> {
        let mut stmt = conn.prepare("SELECT user_id FROM post_likes WHERE post_id = ?1")?;
        let rows = stmt.query_map(params![post_id], |row| row.get(0))?;

        let mut likers = Vec::new();
        for row in rows {
            likers.push(row?);
        }
        Ok(likers)
    }

    fn comments_locked(&self, conn: &Connection, post_id: &str) -> StoreResult<Vec<Comment>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM comments WHERE post_id = ?1 ORDER BY created_at ASC",
        )?;
        let rows = stmt.query_map(params![post_id], row_to_comment)?;

        let mut comments = Vec::new();
        for row in rows {
            comments.push(row?);
        }
        Ok(comments)
    }

    pub fn has_post_like(&self, post_id: &str, user_id: &str) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM post_likes WHERE post_id = ?1 AND user_id = ?2",
            params![post_id, user_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn insert_post_like(&self, post_id: &str, user_id: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO post_likes (post_id, user_id) VALUES (?1, ?2)",
            params![post_id, user_id],
        )?;
        Ok(())
    }

    pub fn delete_post_like(&self, post_id: &str, user_id: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM post_likes WHERE post_id = ?1 AND user_id = ?2",
            params![post_id, user_id],
        )?;
        Ok(())
    }

    pub fn create_comment(&self, comment: &mut Comment) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        comment.id = Uuid::new_v4().to_string();
        comment.created_at = Utc::now();

        conn.execute(
            r#"INSERT INTO comments (id, post_id, user_id, text, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5)"#,
            params![
                &comment.id,
                &comment.post_id,
                &comment.user_id,
                &comment.text,
                comment.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    // ==================== Collection Operations ====================

    pub fn create_collection(&self, collection: &mut Collection) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        collection.id = Uuid::new_v4().to_string();
        collection.created_at = Utc::now();

        conn.execute(
            r#"INSERT INTO collections (id, user_id, name, created_at)
               VALUES (?1, ?2, ?3, ?4)"#,
            params![
                &collection.id,
                &collection.user_id,
                &collection.name,
                collection.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn find_collection(&self, user_id: &str, name: &str) -> StoreResult<Option<Collection>> {
        let conn = self.conn.lock().unwrap();
        let collection = conn
            .query_row(
                "SELECT * FROM collections WHERE user_id = ?1 AND name = ?2",
                params![user_id, name],
                row_to_collection,
            )
            .optional()?;
        Ok(collection)
    }

    pub fn list_collections(&self, user_id: &str) -> StoreResult<Vec<Collection>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT * FROM collections WHERE user_id = ?1 ORDER BY created_at ASC",
        )?;
        let rows = stmt.query_map(params![user_id], row_to_collection)?;

        let mut collections = Vec::new();
        for row in rows {
            collections.push(row?);
        }

        for collection in &mut collections {
            collection.items = self.collection_items_locked(&conn, &collection.id)?;
        }

        Ok(collections)
    }

    fn collection_items_locked(
        &self,
        conn: &Connection,
        collection_id: &str,
    ) -> StoreResult<Vec<CollectionItem>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM collection_items WHERE collection_id = ?1 ORDER BY created_at ASC",
        )?;
        let rows = stmt.query_map(params![collection_id], row_to_collection_item)?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    pub fn add_collection_item(&self, item: &mut CollectionItem) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        item.id = Uuid::new_v4().to_string();
        item.created_at = Utc::now();

        conn.execute(
            r#"INSERT INTO collection_items (id, collection_id, image_url, title, artist_name, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
            params![
                &item.id,
                &item.collection_id,
                &item.image_url,
                &item.title,
                &item.artist_name,
                item.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    // ==================== Conversation Operations ====================

    pub fn create_conversation(&self, conversation: &mut Conversation) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conversation.id = Uuid::new_v4().to_string();
        conversation.created_at = Utc::now();

        let counts_json = serde_json::to_string(&conversation.unread_counts)?;

        conn.execute(
            r#"INSERT INTO conversations (id, participant_a, participant_b, last_message,
                last_message_at, unread_counts, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
            params![
                &conversation.id,
                &conversation.participant_a,
                &conversation.participant_b,
                &conversation.last_message,
                conversation.last_message_at.map(|t| t.to_rfc3339()),
                &counts_json,
                conversation.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_conversation(&self, id: &str) -> StoreResult<Conversation> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT * FROM conversations WHERE id = ?1",
            params![id],
            row_to_conversation,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                StoreError::NotFound(format!("Conversation {}", id))
            }
            _ => StoreError::Database(e),
        })
    }

    /// Exact 2-participant match, in either order.
    pub fn find_conversation_between(
        &self,
        user_a: &str,
        user_b: &str,
    ) -> StoreResult<Option<Conversation>> {
        let conn = self.conn.lock().unwrap();
        let conversation = conn
            .query_row(
                r#"SELECT * FROM conversations
                   WHERE (participant_a = ?1 AND participant_b = ?2)
                      OR (participant_a = ?2 AND participant_b = ?1)"#,
                params![user_a, user_b],
                row_to_conversation,
            )
            .optional()?;
        Ok(conversation)
    }

    pub fn update_conversation(&self, conversation: &Conversation) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let counts_json = serde_json::to_string(&conversation.unread_counts)?;

        let rows = conn.execute(
            r#"UPDATE conversations SET last_message = ?1, last_message_at = ?2,
               unread_counts = ?3 WHERE id = ?4"#,
            params![
                &conversation.last_message,
                conversation.last_message_at.map(|t| t.to_rfc3339()),
                &counts_json,
                &conversation.id,
            ],
        )?;

        if rows == 0 {
            return Err(StoreError::NotFound(format!(
                "Conversation {}",
                conversation.id
            )));
        }
        Ok(())
    }

    /// All conversations the user participates in, latest activity first.
    pub fn list_conversations_for(&self, user_id: &str) -> StoreResult<Vec<Conversation>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"SELECT * FROM conversations
               WHERE participant_a = ?1 OR participant_b = ?1
               ORDER BY COALESCE(last_message_at, created_at) DESC"#,
        )?;
        let rows = stmt.query_map(params![user_id], row_to_conversation)?;

        let mut conversations = Vec::new();
        for row in rows {
            conversations.push(row?);
        }
        Ok(conversations)
    }

    // ==================== Message Operations ====================

    pub fn create_message(&self, message: &mut Message) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        message.id = Uuid::new_v4().to_string();
        message.created_at = Utc::now();

        conn.execute(
            r#"INSERT INTO messages (id, conversation_id, sender_id, text, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5)"#,
            params![
                &message.id,
                &message.conversation_id,
                &message.sender_id,
                &message.text,
                message.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_message(&self, id: &str) -> StoreResult<Message> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT * FROM messages WHERE id = ?1",
            params![id],
            row_to_message,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                StoreError::NotFound(format!("Message {}", id))
            }
            _ => StoreError::Database(e),
        })
    }

    pub fn list_messages(&self, conversation_id: &str) -> StoreResult<Vec<Message>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT * FROM messages WHERE conversation_id = ?1 ORDER BY created_at ASC",
        )?;
        let rows = stmt.query_map(params![conversation_id], row_to_message)?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }

    pub fn latest_message(&self, conversation_id: &str) -> StoreResult<Option<Message>> {
        let conn = self.conn.lock().unwrap();
        let message = conn
            .query_row(
                r#"SELECT * FROM messages WHERE conversation_id = ?1
                   ORDER BY created_at DESC LIMIT 1"#,
                params![conversation_id],
                row_to_message,
            )
            .optional()?;
        Ok(message)
    }

    pub fn delete_message(&self, id: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let rows = conn.execute("DELETE FROM messages WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(StoreError::NotFound(format!("Message {}", id)));
        }
        Ok(())
    }

    // ==================== Notification Operations ====================

    pub fn create_notification(&self, notification: &mut Notification) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        notification.id = Uuid::new_v4().to_string();
        notification.created_at = Utc::now();

        conn.execute(
            r#"INSERT INTO notifications (id, user_id, type, actor_id, preview, read, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
            params![
                &notification.id,
                &notification.user_id,
                notification.notification_type.as_str(),
                &notification.actor_id,
                &notification.preview,
                notification.read,
                notification.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn list_notifications(&self, user_id: &str) -> StoreResult<Vec<Notification>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT * FROM notifications WHERE user_id = ?1 ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(params![user_id], row_to_notification)?;

        let mut notifications = Vec::new();
        for row in rows {
            notifications.push(row?);
        }
        Ok(notifications)
    }

    pub fn unread_notification_count(&self, user_id: &str) -> StoreResult<i64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM notifications WHERE user_id = ?1 AND read = 0",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn mark_all_notifications_read(&self, user_id: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE notifications SET read = 1 WHERE user_id = ?1",
            params![user_id],
        )?;
        Ok(())
    }

    pub fn clear_notifications(&self, user_id: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM notifications WHERE user_id = ?1",
            params![user_id],
        )?;
        Ok(())
    }

    /// Idempotent: deleting an absent notification is not an error. The
    /// owner id scopes the delete so one user cannot remove another's
    /// notifications.
    pub fn delete_notification(&self, id: &str, user_id: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM notifications WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(())
    }
}

// ==================== Row Mapping ====================

fn role_to_str(role: UserRole) -> &'static str {
    match role {
        UserRole::Artist => "artist",
        UserRole::ArtLover => "artLover",
    }
}

fn str_to_role(s: &str) -> UserRole {
    match s {
        "artist" => UserRole::Artist,
        _ => UserRole::ArtLover,
    }
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    let role: String = row.get("role")?;
    let liked_json: String = row.get("liked_artwork_ids")?;
    let liked_artwork_ids: Vec<String> = serde_json::from_str(&liked_json).unwrap_or_default();
    let deleted_at: Option<String> = row.get("deleted_at")?;

    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        role: str_to_role(&role),
        display_name: row.get("display_name")?,
        bio: row.get("bio")?,
        avatar_url: row.get("avatar_url")?,
        liked_artwork_ids,
        stats: UserStats::default(),
        deleted_at: deleted_at.map(parse_datetime),
        created_at: parse_datetime(row.get::<_, String>("created_at")?),
        updated_at: parse_datetime(row.get::<_, String>("updated_at")?),
    })
}

fn row_to_artwork(row: &rusqlite::Row) -> rusqlite::Result<Artwork> {
    let tags_json: String = row.get("tags")?;
    let tags: Vec<String> = serde_json::from_str(&tags_json).unwrap_or_default();

    Ok(Artwork {
        id: row.get("id")?,
        artist_id: row.get("artist_id")?,
        image_url: row.get("image_url")?,
        title: row.get("title")?,
        description: row.get("description")?,
        tags,
        likes: row.get("likes")?,
        comments: row.get("comments")?,
        created_at: parse_datetime(row.get::<_, String>("created_at")?),
        updated_at: parse_datetime(row.get::<_, String>("updated_at")?),
    })
}

fn row_to_post(row: &rusqlite::Row) -> rusqlite::Result<SocialPost> {
    Ok(SocialPost {
        id: row.get("id")?,
        author_id: row.get("author_id")?,
        content: row.get("content")?,
        image_url: row.get("image_url")?,
        liked_by: Vec::new(),
        comments: Vec::new(),
        created_at: parse_datetime(row.get::<_, String>("created_at")?),
    })
}

fn row_to_comment(row: &rusqlite::Row) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get("id")?,
        post_id: row.get("post_id")?,
        user_id: row.get("user_id")?,
        text: row.get("text")?,
        created_at: parse_datetime(row.get::<_, String>("created_at")?),
    })
}

fn row_to_collection(row: &rusqlite::Row) -> rusqlite::Result<Collection> {
    Ok(Collection {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        name: row.get("name")?,
        items: Vec::new(),
        created_at: parse_datetime(row.get::<_, String>("created_at")?),
    })
}

fn row_to_collection_item(row: &rusqlite::Row) -> rusqlite::Result<CollectionItem> {
    Ok(CollectionItem {
        id: row.get("id")?,
        collection_id: row.get("collection_id")?,
        image_url: row.get("image_url")?,
        title: row.get("title")?,
        artist_name: row.get("artist_name")?,
        created_at: parse_datetime(row.get::<_, String>("created_at")?),
    })
}

fn row_to_conversation(row: &rusqlite::Row) -> rusqlite::Result<Conversation> {
    let counts_json: String = row.get("unread_counts")?;
    let unread_counts: HashMap<String, i64> =
        serde_json::from_str(&counts_json).unwrap_or_default();
    let last_message_at: Option<String> = row.get("last_message_at")?;

    Ok(Conversation {
        id: row.get("id")?,
        participant_a: row.get("participant_a")?,
        participant_b: row.get("participant_b")?,
        last_message: row.get("last_message")?,
        last_message_at: last_message_at.map(parse_datetime),
        unread_counts,
        created_at: parse_datetime(row.get::<_, String>("created_at")?),
    })
}

fn row_to_message(row: &rusqlite::Row) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get("id")?,
        conversation_id: row.get("conversation_id")?,
        sender_id: row.get("sender_id")?,
        text: row.get("text")?,
        created_at: parse_datetime(row.get::<_, String>("created_at")?),
    })
}

fn row_to_notification(row: &rusqlite::Row) -> rusqlite::Result<Notification> {
    let notification_type: String = row.get("type")?;
    let notification_type = match notification_type.as_str() {
        "like" => NotificationType::Like,
        "comment" => NotificationType::Comment,
        _ => NotificationType::Follow,
    };

    Ok(Notification {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        notification_type,
        actor_id: row.get("actor_id")?,
        preview: row.get("preview")?,
        read: row.get("read")?,
        created_at: parse_datetime(row.get::<_, String>("created_at")?),
    })
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
