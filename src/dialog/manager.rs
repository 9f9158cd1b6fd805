//! Ownership of one live message and its render state.

use crate::dialog::payload::MessageData;
use crate::dialog::surface::{ChatSurface, MessageId};
use crate::errors::Result;
use std::sync::Arc;
use tracing::debug;

/// Owns exactly one live message plus the [`MessageData`] that renders it.
///
/// Born from [`crate::dialog::MessageBuilder::send`]; dies when
/// [`MessageManager::remove`] deletes the underlying message. A removed
/// manager is never reused.
pub struct MessageManager {
    surface: Arc<dyn ChatSurface>,
    message: MessageId,
    data: MessageData,
    /// User-authored messages that touched this dialog, deleted with it.
    tracked: Vec<MessageId>,
}

impl MessageManager {
    /// Wraps an already-sent message. Callers normally go through
    /// [`crate::dialog::MessageBuilder::send`] instead.
    pub fn new(surface: Arc<dyn ChatSurface>, message: MessageId, data: MessageData) -> Self {
        Self {
            surface,
            message,
            data,
            tracked: Vec::new(),
        }
    }

    /// Id of the owned live message.
    #[must_use]
    pub const fn message_id(&self) -> MessageId {
        self.message
    }

    /// The surface this manager's message lives on.
    #[must_use]
    pub fn surface(&self) -> Arc<dyn ChatSurface> {
        Arc::clone(&self.surface)
    }

    /// Read access to the render state.
    #[must_use]
    pub const fn data(&self) -> &MessageData {
        &self.data
    }

    /// Mutable access to the render state. Call [`Self::update`] afterwards
    /// to re-apply it to the live message.
    pub const fn data_mut(&mut self) -> &mut MessageData {
        &mut self.data
    }

    /// Records a user-authored side message for cleanup on [`Self::remove`].
    pub fn track(&mut self, message: MessageId) {
        self.tracked.push(message);
    }

    /// Messages tracked for cleanup, in arrival order.
    #[must_use]
    pub fn tracked(&self) -> &[MessageId] {
        &self.tracked
    }

    /// Re-applies the current payload to the live message via edit.
    pub async fn update(&self) -> Result<()> {
        self.surface.edit(self.message, &self.data).await
    }

    /// Deletes every tracked side message (best-effort, errors swallowed)
    /// and then the primary message. The primary deletion is idempotent at
    /// the surface level; other failures propagate.
    pub async fn remove(&mut self) -> Result<()> {
        for side in self.tracked.drain(..) {
            if let Err(e) = self.surface.delete(side).await {
                debug!("Ignoring failed side-message deletion {}: {}", side, e);
            }
        }
        self.surface.delete(self.message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::payload::Embed;
    use crate::dialog::surface::UserId;
    use crate::test_utils::FakeSurface;

    #[tokio::test]
    async fn update_reapplies_current_payload() {
        let surface = FakeSurface::shared();
        let id = surface.send(&MessageData::new()).await.unwrap();
        let mut manager = MessageManager::new(surface.clone(), id, MessageData::new());

        manager.data_mut().content = Some("edited".to_string());
        manager.data_mut().embeds.push(Embed::new().title("t"));
        manager.update().await.unwrap();

        let stored = surface.message_data(id).unwrap();
        assert_eq!(stored.content.as_deref(), Some("edited"));
        assert_eq!(stored.embeds.len(), 1);
    }

    #[tokio::test]
    async fn remove_deletes_tracked_then_primary_exactly_once() {
        let surface = FakeSurface::shared();
        let id = surface.send(&MessageData::new()).await.unwrap();
        let side = surface.push_user_message(UserId(1), "reply");
        let mut manager = MessageManager::new(surface.clone(), id, MessageData::new());
        manager.track(side);

        manager.remove().await.unwrap();
        assert!(surface.was_deleted(side));
        assert!(surface.was_deleted(id));

        // Idempotent: removing again is tolerated.
        manager.remove().await.unwrap();
        assert_eq!(surface.deletion_count(id), 2);
    }
}
