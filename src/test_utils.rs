//! Shared test utilities for `FinalsTeamsBot`.
//!
//! This module provides an in-memory [`FakeSurface`] implementing the
//! dialog engine's chat-surface boundary, plus a [`FakeLookup`] for
//! reference resolvers and small helpers for driving dialog flows from
//! tests without a gateway connection.

use crate::dialog::payload::MessageData;
use crate::dialog::surface::{
    ChatSurface, ComponentClick, IncomingMessage, MessageId, ReactionEvent, UserId,
};
use crate::dialog::surface::{ChannelId, GuildId};
use crate::errors::{Error, Result};
use crate::runtime::{CategoryRef, ChannelRef, GuildRef, ReferenceLookup, RuntimeContext};
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Initializes tracing for a test, once per process; repeated calls are
/// no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .with_test_writer()
        .try_init();
}

/// Events pushed before any subscriber exists are buffered and flushed to
/// the first subscriber, so tests never race the dialog's subscription.
struct Feed<T> {
    subscribers: Vec<mpsc::UnboundedSender<T>>,
    buffered: Vec<T>,
}

impl<T> Default for Feed<T> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
            buffered: Vec::new(),
        }
    }
}

impl<T: Clone> Feed<T> {
    fn push(&mut self, event: T) {
        if self.subscribers.is_empty() {
            self.buffered.push(event);
            return;
        }
        for sub in &self.subscribers {
            let _ = sub.send(event.clone());
        }
    }

    fn subscribe(&mut self) -> mpsc::UnboundedReceiver<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        for event in self.buffered.drain(..) {
            let _ = tx.send(event);
        }
        self.subscribers.push(tx);
        rx
    }
}

fn stream_from<T: Send + 'static>(rx: mpsc::UnboundedReceiver<T>) -> BoxStream<'static, T> {
    futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|event| (event, rx))
    })
    .boxed()
}

#[derive(Default)]
struct FakeInner {
    next_id: u64,
    sent: Vec<(MessageId, MessageData)>,
    deleted: Vec<MessageId>,
    reactions_added: Vec<(MessageId, String)>,
    notices: Vec<String>,
    fail_next_send: bool,
    messages: Feed<IncomingMessage>,
    reactions: HashMap<MessageId, Feed<ReactionEvent>>,
    clicks: HashMap<MessageId, Feed<ComponentClick>>,
}

/// In-memory chat surface recording every effect and letting tests inject
/// user events.
#[derive(Default)]
pub struct FakeSurface {
    inner: Mutex<FakeInner>,
}

impl FakeSurface {
    /// Creates a surface behind an `Arc`, the form every flow consumes.
    /// Also initializes test tracing so flow logs show up on failure.
    pub fn shared() -> Arc<Self> {
        init_test_tracing();
        Arc::new(Self::default())
    }

    fn allocate_id(inner: &mut FakeInner) -> MessageId {
        inner.next_id += 1;
        MessageId(inner.next_id)
    }

    /// Makes the next `send` fail, for send-failure paths.
    pub fn fail_next_send(&self) {
        self.inner.lock().unwrap().fail_next_send = true;
    }

    /// Injects a user-authored chat message and returns its id.
    pub fn push_user_message(&self, author: UserId, content: &str) -> MessageId {
        let mut inner = self.inner.lock().unwrap();
        let id = Self::allocate_id(&mut inner);
        inner.messages.push(IncomingMessage {
            id,
            author,
            author_is_bot: false,
            content: content.to_string(),
        });
        id
    }

    /// Injects a bot-authored chat message (which collectors must ignore).
    pub fn push_bot_message(&self, author: UserId, content: &str) -> MessageId {
        let mut inner = self.inner.lock().unwrap();
        let id = Self::allocate_id(&mut inner);
        inner.messages.push(IncomingMessage {
            id,
            author,
            author_is_bot: true,
            content: content.to_string(),
        });
        id
    }

    /// Injects a reaction-add event on a message.
    pub fn push_reaction(&self, message: MessageId, emoji: &str, count: u64, user: UserId) {
        let mut inner = self.inner.lock().unwrap();
        inner.reactions.entry(message).or_default().push(ReactionEvent {
            emoji: emoji.to_string(),
            count,
            user,
        });
    }

    /// Injects a component click on a message.
    pub fn push_click(&self, message: MessageId, custom_id: &str, user: UserId) {
        let mut inner = self.inner.lock().unwrap();
        inner.clicks.entry(message).or_default().push(ComponentClick {
            custom_id: custom_id.to_string(),
            user,
        });
    }

    /// Number of messages the engine sent (not counting injected ones).
    pub fn sent_count(&self) -> usize {
        self.inner.lock().unwrap().sent.len()
    }

    /// Current payload of a sent message, reflecting edits.
    pub fn message_data(&self, message: MessageId) -> Option<MessageData> {
        let inner = self.inner.lock().unwrap();
        inner
            .sent
            .iter()
            .find(|(id, _)| *id == message)
            .map(|(_, data)| data.clone())
    }

    /// First sent message whose payload matches the predicate.
    pub fn find_sent(&self, predicate: impl Fn(&MessageData) -> bool) -> Option<MessageId> {
        let inner = self.inner.lock().unwrap();
        inner
            .sent
            .iter()
            .find(|(_, data)| predicate(data))
            .map(|(id, _)| *id)
    }

    /// Whether the message was deleted at least once.
    pub fn was_deleted(&self, message: MessageId) -> bool {
        self.inner.lock().unwrap().deleted.contains(&message)
    }

    /// How many times the message was deleted (idempotence checks).
    pub fn deletion_count(&self, message: MessageId) -> usize {
        self.inner
            .lock()
            .unwrap()
            .deleted
            .iter()
            .filter(|id| **id == message)
            .count()
    }

    /// All transient notices posted so far.
    pub fn notices(&self) -> Vec<String> {
        self.inner.lock().unwrap().notices.clone()
    }

    /// All reactions the engine added, in order.
    pub fn reactions_added(&self) -> Vec<(MessageId, String)> {
        self.inner.lock().unwrap().reactions_added.clone()
    }
}

#[async_trait]
impl ChatSurface for FakeSurface {
    async fn send(&self, data: &MessageData) -> Result<MessageId> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_next_send {
            inner.fail_next_send = false;
            return Err(Error::Surface("send refused by fake".to_string()));
        }
        let id = Self::allocate_id(&mut inner);
        inner.sent.push((id, data.clone()));
        Ok(id)
    }

    async fn edit(&self, message: MessageId, data: &MessageData) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let slot = inner
            .sent
            .iter_mut()
            .find(|(id, _)| *id == message)
            .ok_or_else(|| Error::Surface(format!("edit of unknown message {message}")))?;
        slot.1 = data.clone();
        Ok(())
    }

    async fn delete(&self, message: MessageId) -> Result<()> {
        self.inner.lock().unwrap().deleted.push(message);
        Ok(())
    }

    async fn react(&self, message: MessageId, emoji: &str) -> Result<()> {
        self.inner
            .lock()
            .unwrap()
            .reactions_added
            .push((message, emoji.to_string()));
        Ok(())
    }

    async fn notify(&self, text: &str) -> Result<()> {
        self.inner.lock().unwrap().notices.push(text.to_string());
        Ok(())
    }

    fn messages(&self) -> BoxStream<'static, IncomingMessage> {
        stream_from(self.inner.lock().unwrap().messages.subscribe())
    }

    fn reactions(&self, message: MessageId) -> BoxStream<'static, ReactionEvent> {
        stream_from(
            self.inner
                .lock()
                .unwrap()
                .reactions
                .entry(message)
                .or_default()
                .subscribe(),
        )
    }

    fn component_clicks(&self, message: MessageId) -> BoxStream<'static, ComponentClick> {
        stream_from(
            self.inner
                .lock()
                .unwrap()
                .clicks
                .entry(message)
                .or_default()
                .subscribe(),
        )
    }
}

/// Polls `predicate` until it holds or the timeout elapses; panics on
/// timeout so the failing test reports where it got stuck.
pub async fn wait_until(what: &str, predicate: impl Fn() -> bool) {
    let deadline = Duration::from_secs(5);
    let poll = async {
        while !predicate() {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    };
    if tokio::time::timeout(deadline, poll).await.is_err() {
        panic!("timed out waiting for: {what}");
    }
}

/// Waits for a sent message whose payload matches and returns its id.
pub async fn wait_for_sent(
    surface: &Arc<FakeSurface>,
    what: &str,
    predicate: impl Fn(&MessageData) -> bool,
) -> MessageId {
    wait_until(what, || surface.find_sent(&predicate).is_some()).await;
    surface.find_sent(&predicate).unwrap()
}

/// In-memory reference lookup with preloaded fixtures.
#[derive(Default, Clone)]
pub struct FakeLookup {
    channels: HashMap<u64, String>,
    categories: HashMap<u64, String>,
    guilds: HashMap<u64, (String, Option<u64>)>,
}

impl FakeLookup {
    /// Registers a text channel fixture.
    #[must_use]
    pub fn with_channel(mut self, id: u64, name: &str) -> Self {
        self.channels.insert(id, name.to_string());
        self
    }

    /// Registers a category fixture.
    #[must_use]
    pub fn with_category(mut self, id: u64, name: &str) -> Self {
        self.categories.insert(id, name.to_string());
        self
    }

    /// Registers a guild-preview fixture.
    #[must_use]
    pub fn with_guild(mut self, id: u64, name: &str, member_count: Option<u64>) -> Self {
        self.guilds.insert(id, (name.to_string(), member_count));
        self
    }
}

#[async_trait]
impl ReferenceLookup for FakeLookup {
    async fn channel(&self, id: ChannelId) -> Option<ChannelRef> {
        self.channels.get(&id.0).map(|name| ChannelRef {
            id,
            name: name.clone(),
        })
    }

    async fn category(&self, id: ChannelId) -> Option<CategoryRef> {
        self.categories.get(&id.0).map(|name| CategoryRef {
            id,
            name: name.clone(),
        })
    }

    async fn guild_preview(&self, id: GuildId) -> Option<GuildRef> {
        self.guilds.get(&id.0).map(|(name, member_count)| GuildRef {
            id,
            name: name.clone(),
            member_count: *member_count,
        })
    }
}

/// A runtime context over a [`FakeLookup`] for resolver and flow tests.
pub fn test_context(lookup: FakeLookup) -> RuntimeContext {
    RuntimeContext::new(GuildId(900_000_000_000_000_001), Arc::new(lookup), vec![])
}

/// Drains everything currently queued on an unbounded receiver.
pub fn drain<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> Vec<T> {
    let mut out = Vec::new();
    while let Ok(item) = rx.try_recv() {
        out.push(item);
    }
    out
}
