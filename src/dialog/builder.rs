//! Fluent accumulation of a [`MessageData`] plus the initial send.

use crate::dialog::manager::MessageManager;
use crate::dialog::payload::{
    ActionRow, AllowedMentions, AttachmentRef, Embed, FileUpload, MessageData,
};
use crate::dialog::surface::ChatSurface;
use crate::errors::Result;
use std::sync::Arc;

/// Incrementally constructs a [`MessageData`], then performs the initial
/// send and hands the resulting live message to a fresh
/// [`MessageManager`].
///
/// Each setter is pure accumulation with no validation. Whether the send
/// posts to a channel or replies to an interaction is the surface's
/// concern: the interaction surface applies deferred -> edit reply,
/// already replied -> follow-up, otherwise -> initial reply.
///
/// Exactly one underlying message is created per [`MessageBuilder::send`]
/// call, and the returned manager owns the very payload the builder
/// accumulated (moved, not copied), so manager-side mutations stay
/// visible without a re-fetch.
#[derive(Debug, Default)]
pub struct MessageBuilder {
    data: MessageData,
}

impl MessageBuilder {
    /// Creates a builder with an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the text content.
    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.data.content = Some(content.into());
        self
    }

    /// Appends one embed.
    #[must_use]
    pub fn embed(mut self, embed: Embed) -> Self {
        self.data.embeds.push(embed);
        self
    }

    /// Appends several embeds.
    #[must_use]
    pub fn embeds(mut self, embeds: impl IntoIterator<Item = Embed>) -> Self {
        self.data.embeds.extend(embeds);
        self
    }

    /// Replaces the component rows.
    #[must_use]
    pub fn components(mut self, rows: Vec<ActionRow>) -> Self {
        self.data.components = rows;
        self
    }

    /// Appends one file upload.
    #[must_use]
    pub fn file(mut self, file: FileUpload) -> Self {
        self.data.files.push(file);
        self
    }

    /// Appends one retained attachment reference.
    #[must_use]
    pub fn attachment(mut self, attachment: AttachmentRef) -> Self {
        self.data.attachments.push(attachment);
        self
    }

    /// Sets the mention policy.
    #[must_use]
    pub const fn allowed_mentions(mut self, mentions: AllowedMentions) -> Self {
        self.data.allowed_mentions = Some(mentions);
        self
    }

    /// Posts the accumulated payload through the surface and wraps the
    /// created message in a [`MessageManager`]. If the send fails, the
    /// error propagates and no manager is constructed.
    pub async fn send(self, surface: Arc<dyn ChatSurface>) -> Result<MessageManager> {
        let message = surface.send(&self.data).await?;
        Ok(MessageManager::new(surface, message, self.data))
    }
}
