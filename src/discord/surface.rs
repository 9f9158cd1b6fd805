//! Live chat-surface implementations over serenity.
//!
//! [`ChannelSurface`] posts into a channel; [`InteractionSurface`] routes
//! the initial send through the interaction reply flow (deferred -> edit
//! reply, already replied -> follow-up, otherwise -> initial reply) and
//! behaves like a channel surface for everything else.

use crate::dialog::payload::MessageData;
use crate::dialog::surface::{
    ChatSurface, ComponentClick, IncomingMessage, MessageId, ReactionEvent, UserId,
};
use crate::discord::convert;
use crate::errors::{Error, Result};
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use poise::serenity_prelude as serenity;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

/// How long transient notices stay before self-deleting.
const NOTICE_TTL: Duration = Duration::from_secs(5);

/// Shared plumbing for both surface flavors.
struct Channelish {
    http: Arc<serenity::Http>,
    shard: serenity::ShardMessenger,
    channel: serenity::ChannelId,
}

impl Channelish {
    async fn edit(&self, message: MessageId, data: &MessageData) -> Result<()> {
        self.channel
            .edit_message(
                &self.http,
                serenity::MessageId::new(message.0),
                convert::edit_message(data),
            )
            .await?;
        Ok(())
    }

    async fn delete(&self, message: MessageId) -> Result<()> {
        match self
            .channel
            .delete_message(&self.http, serenity::MessageId::new(message.0))
            .await
        {
            Ok(()) => Ok(()),
            // Deleting an already-deleted message is fine.
            Err(serenity::Error::Http(err)) if is_not_found(&err) => {
                debug!("Delete of already-deleted message {}", message);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn react(&self, message: MessageId, emoji: &str) -> Result<()> {
        self.http
            .create_reaction(
                self.channel,
                serenity::MessageId::new(message.0),
                &serenity::ReactionType::Unicode(emoji.to_string()),
            )
            .await?;
        Ok(())
    }

    async fn notify(&self, text: &str) -> Result<()> {
        let notice = self
            .channel
            .send_message(&self.http, serenity::CreateMessage::new().content(text))
            .await?;
        let http = Arc::clone(&self.http);
        let channel = self.channel;
        // Self-deleting; never tracked by any manager.
        tokio::spawn(async move {
            tokio::time::sleep(NOTICE_TTL).await;
            if let Err(e) = channel.delete_message(&http, notice.id).await {
                debug!("Failed to delete transient notice: {}", e);
            }
        });
        Ok(())
    }

    fn messages(&self) -> BoxStream<'static, IncomingMessage> {
        serenity::collector::MessageCollector::new(self.shard.clone())
            .channel_id(self.channel)
            .stream()
            .map(|message| IncomingMessage {
                id: MessageId(message.id.get()),
                author: UserId(message.author.id.get()),
                author_is_bot: message.author.bot,
                content: message.content.clone(),
            })
            .boxed()
    }

    fn reactions(&self, message: MessageId) -> BoxStream<'static, ReactionEvent> {
        let http = Arc::clone(&self.http);
        let channel = self.channel;
        serenity::collector::ReactionCollector::new(self.shard.clone())
            .message_id(serenity::MessageId::new(message.0))
            .stream()
            .filter_map(move |reaction| {
                let http = Arc::clone(&http);
                async move {
                    // The gateway event carries no count; read it off the
                    // message so the placeholder-vs-voter rule can apply.
                    let count = http
                        .get_message(channel, reaction.message_id)
                        .await
                        .ok()
                        .and_then(|m| {
                            m.reactions
                                .iter()
                                .find(|r| r.reaction_type == reaction.emoji)
                                .map(|r| r.count)
                        })
                        .unwrap_or(1);
                    Some(ReactionEvent {
                        emoji: reaction.emoji.to_string(),
                        count,
                        user: reaction.user_id.map_or(UserId(0), |u| UserId(u.get())),
                    })
                }
            })
            .boxed()
    }

    fn component_clicks(&self, message: MessageId) -> BoxStream<'static, ComponentClick> {
        let http = Arc::clone(&self.http);
        serenity::collector::ComponentInteractionCollector::new(self.shard.clone())
            .message_id(serenity::MessageId::new(message.0))
            .stream()
            .then(move |interaction| {
                let http = Arc::clone(&http);
                async move {
                    // Acknowledge without modifying the message, so the
                    // engine never races the interaction deadline.
                    if let Err(e) = interaction
                        .create_response(&http, serenity::CreateInteractionResponse::Acknowledge)
                        .await
                    {
                        warn!("Failed to acknowledge component click: {}", e);
                    }
                    ComponentClick {
                        custom_id: interaction.data.custom_id.clone(),
                        user: UserId(interaction.user.id.get()),
                    }
                }
            })
            .boxed()
    }
}

fn is_not_found(err: &serenity::HttpError) -> bool {
    matches!(
        err,
        serenity::HttpError::UnsuccessfulRequest(response)
            if response.status_code == serenity::StatusCode::NOT_FOUND
    )
}

/// A surface posting directly into one channel.
pub struct ChannelSurface {
    inner: Channelish,
}

impl ChannelSurface {
    /// Creates a surface over a channel.
    pub fn new(
        http: Arc<serenity::Http>,
        shard: serenity::ShardMessenger,
        channel: serenity::ChannelId,
    ) -> Self {
        Self {
            inner: Channelish {
                http,
                shard,
                channel,
            },
        }
    }

    /// Creates a surface for the channel a command was invoked in.
    pub fn from_context(ctx: &crate::bot::Context<'_>) -> Self {
        let serenity_ctx = ctx.serenity_context();
        Self::new(
            Arc::clone(&serenity_ctx.http),
            serenity_ctx.shard.clone(),
            ctx.channel_id(),
        )
    }
}

#[async_trait]
impl ChatSurface for ChannelSurface {
    async fn send(&self, data: &MessageData) -> Result<MessageId> {
        let message = self
            .inner
            .channel
            .send_message(&self.inner.http, convert::create_message(data))
            .await?;
        Ok(MessageId(message.id.get()))
    }

    async fn edit(&self, message: MessageId, data: &MessageData) -> Result<()> {
        self.inner.edit(message, data).await
    }

    async fn delete(&self, message: MessageId) -> Result<()> {
        self.inner.delete(message).await
    }

    async fn react(&self, message: MessageId, emoji: &str) -> Result<()> {
        self.inner.react(message, emoji).await
    }

    async fn notify(&self, text: &str) -> Result<()> {
        self.inner.notify(text).await
    }

    fn messages(&self) -> BoxStream<'static, IncomingMessage> {
        self.inner.messages()
    }

    fn reactions(&self, message: MessageId) -> BoxStream<'static, ReactionEvent> {
        self.inner.reactions(message)
    }

    fn component_clicks(&self, message: MessageId) -> BoxStream<'static, ComponentClick> {
        self.inner.component_clicks(message)
    }
}

/// Where an interaction stands in its reply lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyState {
    /// No response sent yet: the first send becomes the initial reply.
    Fresh,
    /// The interaction was deferred: the first send edits the deferral.
    Deferred,
    /// Already replied: every send becomes a follow-up.
    Replied,
}

/// A surface replying to a slash-command interaction.
pub struct InteractionSurface {
    inner: Channelish,
    interaction: serenity::CommandInteraction,
    state: Mutex<ReplyState>,
}

impl InteractionSurface {
    /// Creates a surface over a command interaction with a known reply
    /// state.
    pub fn new(
        http: Arc<serenity::Http>,
        shard: serenity::ShardMessenger,
        interaction: serenity::CommandInteraction,
        state: ReplyState,
    ) -> Self {
        let channel = interaction.channel_id;
        Self {
            inner: Channelish {
                http,
                shard,
                channel,
            },
            interaction,
            state: Mutex::new(state),
        }
    }

    /// Creates a surface from an application-command invocation.
    pub fn from_context(ctx: &crate::bot::Context<'_>, state: ReplyState) -> Option<Self> {
        let serenity_ctx = ctx.serenity_context();
        let poise::Context::Application(app) = ctx else {
            return None;
        };
        Some(Self::new(
            Arc::clone(&serenity_ctx.http),
            serenity_ctx.shard.clone(),
            app.interaction.clone(),
            state,
        ))
    }
}

#[async_trait]
impl ChatSurface for InteractionSurface {
    async fn send(&self, data: &MessageData) -> Result<MessageId> {
        let state = *self
            .state
            .lock()
            .map_err(|_| Error::Surface("reply state poisoned".to_string()))?;
        let message = match state {
            ReplyState::Deferred => {
                self.interaction
                    .edit_response(&self.inner.http, convert::edit_response(data))
                    .await?
            }
            ReplyState::Replied => {
                self.interaction
                    .create_followup(&self.inner.http, convert::followup(data))
                    .await?
            }
            ReplyState::Fresh => {
                self.interaction
                    .create_response(
                        &self.inner.http,
                        serenity::CreateInteractionResponse::Message(
                            convert::interaction_response(data),
                        ),
                    )
                    .await?;
                self.interaction.get_response(&self.inner.http).await?
            }
        };
        if let Ok(mut slot) = self.state.lock() {
            *slot = ReplyState::Replied;
        }
        Ok(MessageId(message.id.get()))
    }

    async fn edit(&self, message: MessageId, data: &MessageData) -> Result<()> {
        self.inner.edit(message, data).await
    }

    async fn delete(&self, message: MessageId) -> Result<()> {
        self.inner.delete(message).await
    }

    async fn react(&self, message: MessageId, emoji: &str) -> Result<()> {
        self.inner.react(message, emoji).await
    }

    async fn notify(&self, text: &str) -> Result<()> {
        self.inner.notify(text).await
    }

    fn messages(&self) -> BoxStream<'static, IncomingMessage> {
        self.inner.messages()
    }

    fn reactions(&self, message: MessageId) -> BoxStream<'static, ReactionEvent> {
        self.inner.reactions(message)
    }

    fn component_clicks(&self, message: MessageId) -> BoxStream<'static, ComponentClick> {
        self.inner.component_clicks(message)
    }
}
