//! The abstract chat surface the dialog engine runs against.
//!
//! A surface is anything that can post, edit and delete messages, add
//! reactions, and expose streams of user-originated events (messages,
//! reaction adds, component clicks). The serenity-backed implementations
//! live in [`crate::discord::surface`]; tests use the in-memory fake in
//! [`crate::test_utils`].

use crate::dialog::payload::MessageData;
use crate::errors::Result;
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use std::time::Duration;

/// Discord snowflake of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u64);

/// Discord snowflake of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub u64);

/// Discord snowflake of a channel (text channel or category).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub u64);

/// Discord snowflake of a guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GuildId(pub u64);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A chat message observed on the surface.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Message id, used for reaction marking and cleanup tracking.
    pub id: MessageId,
    /// Author of the message.
    pub author: UserId,
    /// Whether the author is a bot (including ourselves).
    pub author_is_bot: bool,
    /// Raw text content.
    pub content: String,
}

/// A reaction-add event on a specific message.
///
/// `count` is the total number of users currently on the emoji, including
/// the bot's own placeholder reaction if it seeded one.
#[derive(Debug, Clone)]
pub struct ReactionEvent {
    /// Unicode emoji that was added.
    pub emoji: String,
    /// Total reaction count for that emoji after the add.
    pub count: u64,
    /// User who added the reaction.
    pub user: UserId,
}

/// A button (or select) interaction on a specific message.
///
/// Clicks delivered through a surface are already acknowledged, so the
/// dialog engine never races Discord's interaction-response deadline.
#[derive(Debug, Clone)]
pub struct ComponentClick {
    /// Custom id of the clicked component.
    pub custom_id: String,
    /// User who clicked.
    pub user: UserId,
}

/// Emoji used as the completion affordance on sequence/mapping dialogs.
pub const CONFIRM_EMOJI: &str = "\u{1f44d}";

/// Emoji reacted onto an accepted input message.
pub const ACCEPTED_EMOJI: &str = "\u{2705}";

/// Capability set required of a channel or interaction for the dialog
/// engine to run on it.
///
/// All deletion is idempotent: deleting an already-deleted message is `Ok`.
/// Event streams end when the underlying connection (or fake) closes; the
/// engine treats a closed stream as an abandoned dialog.
#[async_trait]
pub trait ChatSurface: Send + Sync {
    /// Posts a new message with the given payload, returning its id.
    async fn send(&self, data: &MessageData) -> Result<MessageId>;

    /// Re-applies a payload to an existing message via edit.
    async fn edit(&self, message: MessageId, data: &MessageData) -> Result<()>;

    /// Deletes a message. Idempotent; unknown-message errors are `Ok`.
    async fn delete(&self, message: MessageId) -> Result<()>;

    /// Adds a reaction to a message.
    async fn react(&self, message: MessageId, emoji: &str) -> Result<()>;

    /// Posts a transient plain-text notice that self-deletes after a few
    /// seconds. Fire-and-forget; never tracked by any manager.
    async fn notify(&self, text: &str) -> Result<()>;

    /// Stream of messages arriving in the surface's channel.
    fn messages(&self) -> BoxStream<'static, IncomingMessage>;

    /// Stream of reaction-add events on one message.
    fn reactions(&self, message: MessageId) -> BoxStream<'static, ReactionEvent>;

    /// Stream of component clicks on one message.
    fn component_clicks(&self, message: MessageId) -> BoxStream<'static, ComponentClick>;

    /// Awaits a single component click on one message, with an optional
    /// timeout. Returns `None` on timeout or stream end.
    async fn await_component(
        &self,
        message: MessageId,
        timeout: Option<Duration>,
    ) -> Option<ComponentClick> {
        let mut clicks = self.component_clicks(message);
        match timeout {
            Some(limit) => tokio::time::timeout(limit, clicks.next()).await.ok()?,
            None => clicks.next().await,
        }
    }
}
