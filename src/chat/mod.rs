//! Conversation Engine
//!
//! Owns 1:1 conversations, messages and per-participant unread counters.
//! Visibility is always a per-viewer overlay: a conversation can be
//! hidden (toggleable) or deleted (permanent for that viewer, the other
//! participant keeps it), and individual messages can be hidden per
//! viewer. The only mutation visible to both sides is the hard message
//! delete.

use std::sync::Arc;
use thiserror::Error;

use crate::models::*;
use crate::prefs::Preferences;
use crate::store::{Store, StoreError, StoreResult};

#[derive(Error, Debug)]
pub enum ChatError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Validation failure: {0}")]
    Validation(String),
}

pub type ChatResult<T> = Result<T, ChatError>;

pub struct ConversationEngine {
    store: Arc<Store>,
    prefs: Preferences,
}

impl ConversationEngine {
    pub fn new(store: Arc<Store>) -> Self {
        let prefs = Preferences::new(store.clone());
        Self { store, prefs }
    }

    /// Idempotent: an existing conversation between the two users is
    /// returned regardless of participant order; otherwise one is created
    /// with empty unread counts.
    pub fn start(&self, user_a: &str, user_b: &str) -> ChatResult<Conversation> {
        if user_a == user_b {
            return Err(ChatError::Validation(
                "Cannot start a conversation with yourself".to_string(),
            ));
        }

        // The counterpart must be an active user.
        self.store.get_user(user_b)?;

        if let Some(existing) = self.store.find_conversation_between(user_a, user_b)? {
            return Ok(existing);
        }

        let mut conversation = Conversation {
            id: String::new(),
            participant_a: user_a.to_string(),
            participant_b: user_b.to_string(),
            last_message: None,
            last_message_at: None,
            unread_counts: Default::default(),
            created_at: chrono::Utc::now(),
        };
        self.store.create_conversation(&mut conversation)?;
        Ok(conversation)
    }

    /// The viewer's conversation list, latest activity first. Deleted
    /// conversations are excluded, hidden ones flagged but returned.
    pub fn list_for(&self, user_id: &str) -> StoreResult<Vec<ConversationSummary>> {
        let overlay = self.prefs.get(user_id)?;
        let conversations = self.store.list_conversations_for(user_id)?;

        let mut summaries = Vec::with_capacity(conversations.len());
        for conversation in conversations {
            if overlay.deleted_conversation_ids.contains(&conversation.id) {
                continue;
            }

            let other_id = conversation.other_participant(user_id).to_string();
            let other_participant = match self.store.get_user(&other_id) {
                Ok(user) => ParticipantSummary {
                    id: user.id,
                    display_name: user.display_name,
                    avatar_url: user.avatar_url,
                },
                Err(_) => ParticipantSummary::placeholder(&other_id),
            };
            let is_connection = self.store.is_following(user_id, &other_id)?;

            summaries.push(ConversationSummary {
                id: conversation.id.clone(),
                other_participant,
                last_message: conversation.last_message.clone(),
                last_message_at: conversation.last_message_at,
                unread: conversation
                    .unread_counts
                    .get(user_id)
                    .copied()
                    .unwrap_or(0),
                is_hidden: overlay.hidden_conversation_ids.contains(&conversation.id),
                is_connection,
            });
        }

        Ok(summaries)
    }

    /// Appends a message, refreshes the denormalized last-message fields
    /// and increments every other participant's unread counter.
    pub fn send(
        &self,
        conversation_id: &str,
        sender_id: &str,
        text: &str,
    ) -> ChatResult<Message> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::Validation("Message text is required".to_string()));
        }

        let mut conversation = self.store.get_conversation(conversation_id)?;
        if !conversation.is_participant(sender_id) {
            return Err(ChatError::Validation(
                "Sender is not a participant".to_string(),
            ));
        }

        let mut message = Message {
            id: String::new(),
            conversation_id: conversation_id.to_string(),
            sender_id: sender_id.to_string(),
            text: text.to_string(),
            created_at: chrono::Utc::now(),
        };
        self.store.create_message(&mut message)?;

        conversation.last_message = Some(message.text.clone());
        conversation.last_message_at = Some(message.created_at);
        for participant in [
            conversation.participant_a.clone(),
            conversation.participant_b.clone(),
        ] {
            if participant != sender_id {
                *conversation.unread_counts.entry(participant).or_insert(0) += 1;
            }
        }
        self.store.update_conversation(&conversation)?;

        Ok(message)
    }

    /// Oldest first. With a viewer, messages that viewer hid are dropped;
    /// the same message remains visible to the other participant.
    pub fn get_messages(
        &self,
        conversation_id: &str,
        viewer_id: Option<&str>,
    ) -> ChatResult<Vec<Message>> {
        let conversation = self.store.get_conversation(conversation_id)?;

        let messages = self.store.list_messages(conversation_id)?;
        let Some(viewer_id) = viewer_id else {
            return Ok(messages);
        };

        if !conversation.is_participant(viewer_id) {
            return Err(ChatError::Validation(
                "Viewer is not a participant".to_string(),
            ));
        }

        let overlay = self.prefs.get(viewer_id)?;
        Ok(messages
            .into_iter()
            .filter(|message| !overlay.hidden_message_ids.contains(&message.id))
            .collect())
    }

    /// Resets the reader's own unread counter to 0, regardless of prior
    /// value. Other participants' counters are untouched.
    pub fn mark_read(&self, conversation_id: &str, user_id: &str) -> ChatResult<()> {
        let mut conversation = self.store.get_conversation(conversation_id)?;
        if !conversation.is_participant(user_id) {
            return Err(ChatError::Validation(
                "User is not a participant".to_string(),
            ));
        }

        conversation
            .unread_counts
            .insert(user_id.to_string(), 0);
        self.store.update_conversation(&conversation)?;
        Ok(())
    }

    pub fn toggle_hide(&self, user_id: &str, conversation_id: &str) -> ChatResult<()> {
        let conversation = self.store.get_conversation(conversation_id)?;
        if !conversation.is_participant(user_id) {
            return Err(ChatError::Validation(
                "User is not a participant".to_string(),
            ));
        }
        self.prefs.toggle_hidden_conversation(user_id, conversation_id)?;
        Ok(())
    }

    /// Permanent for this viewer; the conversation stays intact for the
    /// other participant.
    pub fn delete(&self, user_id: &str, conversation_id: &str) -> ChatResult<()> {
        let conversation = self.store.get_conversation(conversation_id)?;
        if !conversation.is_participant(user_id) {
            return Err(ChatError::Validation(
                "User is not a participant".to_string(),
            ));
        }
        self.prefs.delete_conversation(user_id, conversation_id)?;
        Ok(())
    }

    pub fn toggle_hide_message(&self, user_id: &str, message_id: &str) -> ChatResult<()> {
        self.store.get_message(message_id)?;
        self.prefs.toggle_hidden_message(user_id, message_id)?;
        Ok(())
    }

    /// Hard delete, visible to all participants. Refreshes the
    /// conversation's denormalized last-message fields when the latest
    /// message is the one removed.
    pub fn delete_message(&self, conversation_id: &str, message_id: &str) -> ChatResult<()> {
        let message = self.store.get_message(message_id)?;
        if message.conversation_id != conversation_id {
            return Err(ChatError::Validation(
                "Message does not belong to this conversation".to_string(),
            ));
        }

        self.store.delete_message(message_id)?;

        let mut conversation = self.store.get_conversation(conversation_id)?;
        let latest = self.store.latest_message(conversation_id)?;
        conversation.last_message = latest.as_ref().map(|m| m.text.clone());
        conversation.last_message_at = latest.map(|m| m.created_at);
        self.store.update_conversation(&conversation)?;

        Ok(())
    }
}
