//! Injected runtime context.
//!
//! Everything a dialog flow needs from the surrounding bot (the home
//! guild, reference lookups, the master-user list) travels through one
//! explicit [`RuntimeContext`] handed into constructors, never through
//! global statics.

use crate::dialog::surface::{ChannelId, GuildId, UserId};
use async_trait::async_trait;
use std::sync::Arc;

/// A resolved text-channel reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRef {
    /// Channel snowflake.
    pub id: ChannelId,
    /// Channel name.
    pub name: String,
}

/// A resolved category-channel reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRef {
    /// Category snowflake.
    pub id: ChannelId,
    /// Category name.
    pub name: String,
}

/// A resolved guild preview from a remote lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildRef {
    /// Guild snowflake.
    pub id: GuildId,
    /// Guild name.
    pub name: String,
    /// Approximate member count, when the preview exposes one.
    pub member_count: Option<u64>,
}

/// Async fetch-by-id boundary consumed by the reference resolvers.
///
/// `None` is "not found or not visible"; genuine transport failures are
/// logged by implementations and also surface as `None` (the collector
/// treats unresolvable input as "no value yet").
#[async_trait]
pub trait ReferenceLookup: Send + Sync {
    /// Fetches a text channel by id.
    async fn channel(&self, id: ChannelId) -> Option<ChannelRef>;

    /// Fetches a category channel by id.
    async fn category(&self, id: ChannelId) -> Option<CategoryRef>;

    /// Fetches a guild preview by id.
    async fn guild_preview(&self, id: GuildId) -> Option<GuildRef>;
}

/// Context shared by all dialog flows, injected at construction.
#[derive(Clone)]
pub struct RuntimeContext {
    /// The home guild.
    pub guild_id: GuildId,
    /// Reference lookup boundary.
    pub lookup: Arc<dyn ReferenceLookup>,
    /// Users with elevated access to management commands.
    pub masters: Vec<UserId>,
}

impl RuntimeContext {
    /// Creates a context.
    pub fn new(guild_id: GuildId, lookup: Arc<dyn ReferenceLookup>, masters: Vec<UserId>) -> Self {
        Self {
            guild_id,
            lookup,
            masters,
        }
    }

    /// Whether the user is on the master list.
    #[must_use]
    pub fn is_master(&self, user: UserId) -> bool {
        self.masters.contains(&user)
    }
}
