//! HTTP-backed reference lookup.
//!
//! Transport failures collapse to `None` with a log line; the collector
//! treats unresolvable references as "no value yet".

use crate::dialog::surface::{ChannelId, GuildId};
use crate::runtime::{CategoryRef, ChannelRef, GuildRef, ReferenceLookup};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::warn;

/// Fetch-by-id over the serenity HTTP client.
pub struct HttpLookup {
    http: Arc<serenity::Http>,
}

impl HttpLookup {
    /// Creates a lookup over an HTTP client.
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }

    async fn guild_channel(&self, id: ChannelId) -> Option<serenity::GuildChannel> {
        let channel = match self.http.get_channel(serenity::ChannelId::new(id.0)).await {
            Ok(channel) => channel,
            Err(e) => {
                warn!("Channel lookup for {} failed: {}", id.0, e);
                return None;
            }
        };
        channel.guild()
    }
}

#[async_trait]
impl ReferenceLookup for HttpLookup {
    async fn channel(&self, id: ChannelId) -> Option<ChannelRef> {
        let channel = self.guild_channel(id).await?;
        if channel.kind == serenity::ChannelType::Category {
            return None;
        }
        Some(ChannelRef {
            id,
            name: channel.name.clone(),
        })
    }

    async fn category(&self, id: ChannelId) -> Option<CategoryRef> {
        let channel = self.guild_channel(id).await?;
        if channel.kind != serenity::ChannelType::Category {
            return None;
        }
        Some(CategoryRef {
            id,
            name: channel.name.clone(),
        })
    }

    async fn guild_preview(&self, id: GuildId) -> Option<GuildRef> {
        match self
            .http
            .get_guild_preview(serenity::GuildId::new(id.0))
            .await
        {
            Ok(preview) => Some(GuildRef {
                id,
                name: preview.name.clone(),
                member_count: Some(preview.approximate_member_count),
            }),
            Err(e) => {
                warn!("Guild preview lookup for {} failed: {}", id.0, e);
                None
            }
        }
    }
}
