//! Notification Fan-out
//!
//! Writes notification records for social actions (like/comment/follow)
//! and reads them back annotated with the actor's *current* identity.
//! Self-actions never produce a notification. Notifications are not
//! filtered through preferences.

use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{Notification, NotificationType, NotificationView, ParticipantSummary};
use crate::store::{Store, StoreResult};

pub struct Notifier {
    store: Arc<Store>,
}

impl Notifier {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// No-op when the recipient is the actor.
    pub fn notify(
        &self,
        recipient_id: &str,
        actor_id: &str,
        notification_type: NotificationType,
        preview: Option<String>,
    ) -> StoreResult<()> {
        if recipient_id == actor_id {
            return Ok(());
        }

        let mut notification = Notification {
            id: String::new(),
            user_id: recipient_id.to_string(),
            notification_type,
            actor_id: actor_id.to_string(),
            preview,
            read: false,
            created_at: chrono::Utc::now(),
        };
        self.store.create_notification(&mut notification)?;

        log::debug!(
            "notification: {} -> {} ({})",
            actor_id,
            recipient_id,
            notification_type.as_str()
        );
        Ok(())
    }

    /// Newest first. Actor name/avatar are joined against current user
    /// data; a deleted actor degrades to a placeholder identity.
    pub fn list_for(&self, user_id: &str) -> StoreResult<Vec<NotificationView>> {
        let notifications = self.store.list_notifications(user_id)?;

        let mut actors: HashMap<String, ParticipantSummary> = HashMap::new();
        let mut views = Vec::with_capacity(notifications.len());

        for notification in notifications {
            let actor = actors
                .entry(notification.actor_id.clone())
                .or_insert_with(|| self.resolve_actor(&notification.actor_id))
                .clone();

            views.push(NotificationView {
                id: notification.id,
                notification_type: notification.notification_type,
                actor,
                preview: notification.preview,
                read: notification.read,
                created_at: notification.created_at,
            });
        }

        Ok(views)
    }

    fn resolve_actor(&self, actor_id: &str) -> ParticipantSummary {
        match self.store.get_user(actor_id) {
            Ok(user) => ParticipantSummary {
                id: user.id,
                display_name: user.display_name,
                avatar_url: user.avatar_url,
            },
            Err(_) => ParticipantSummary::placeholder(actor_id),
        }
    }

    pub fn unread_count(&self, user_id: &str) -> StoreResult<i64> {
        self.store.unread_notification_count(user_id)
    }

    pub fn mark_all_read(&self, user_id: &str) -> StoreResult<()> {
        self.store.mark_all_notifications_read(user_id)
    }

    pub fn clear(&self, user_id: &str) -> StoreResult<()> {
        self.store.clear_notifications(user_id)
    }

    pub fn delete_one(&self, user_id: &str, id: &str) -> StoreResult<()> {
        self.store.delete_notification(id, user_id)
    }
}
