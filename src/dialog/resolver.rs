//! Text-to-typed-value resolution strategies.
//!
//! A resolver converts the raw text of a chat message into a typed value,
//! with human-readable descriptions used by prompts and confirmation
//! summaries. Resolvers are stateless; the only side effects are the
//! lookups intrinsic to resolving references.
//!
//! Returning `None` from [`InputResolver::resolve`] means "no value yet",
//! not an error: the collector silently ignores the input. Lookup
//! failures are logged by the [`crate::runtime::ReferenceLookup`]
//! implementation and collapse to `None` as well.

use crate::dialog::surface::{ChannelId, GuildId};
use crate::dialog::validate::Validator;
use crate::runtime::{CategoryRef, ChannelRef, GuildRef, RuntimeContext};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

/// Matches a channel mention (`<#id>`) or a bare 17-19 digit snowflake.
static CHANNEL_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:<#(\d{17,19})>|(\d{17,19}))$").unwrap());

/// Matches a bare 17-19 digit snowflake.
static SNOWFLAKE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{17,19}$").unwrap());

/// Extracts the snowflake from a mention-or-id channel reference.
fn parse_channel_ref(text: &str) -> Option<u64> {
    let captures = CHANNEL_REF.captures(text.trim())?;
    let digits = captures.get(1).or_else(|| captures.get(2))?;
    digits.as_str().parse().ok()
}

/// Pluggable conversion from raw chat text to a typed value.
#[async_trait]
pub trait InputResolver: Send + Sync {
    /// The typed value this resolver produces.
    type Value: Send + Sync + Clone + 'static;

    /// What the user is being asked for, shown in prompts.
    fn description(&self) -> String;

    /// Short name of the value type, shown in error text.
    fn type_string(&self) -> String;

    /// Renders a resolved value for confirmation summaries.
    fn value_string(&self, value: &Self::Value) -> String;

    /// An optional pre-built text validator gating resolution attempts.
    fn text_validator(&self) -> Option<Validator<str>> {
        None
    }

    /// Converts text into a value. `None` is "no value yet" and is
    /// tolerated without user feedback.
    async fn resolve(&self, ctx: &RuntimeContext, text: &str) -> Option<Self::Value>;
}

/// Identity resolver: the text itself is the value.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextResolver;

#[async_trait]
impl InputResolver for TextResolver {
    type Value = String;

    fn description(&self) -> String {
        "any text".to_string()
    }

    fn type_string(&self) -> String {
        "text".to_string()
    }

    fn value_string(&self, value: &Self::Value) -> String {
        value.clone()
    }

    async fn resolve(&self, _ctx: &RuntimeContext, text: &str) -> Option<Self::Value> {
        Some(text.to_string())
    }
}

/// Resolves a channel mention or id into a [`ChannelRef`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelResolver;

#[async_trait]
impl InputResolver for ChannelResolver {
    type Value = ChannelRef;

    fn description(&self) -> String {
        "a channel mention like <#123456789012345678> or a channel id".to_string()
    }

    fn type_string(&self) -> String {
        "channel".to_string()
    }

    fn value_string(&self, value: &Self::Value) -> String {
        format!("#{} ({})", value.name, value.id.0)
    }

    fn text_validator(&self) -> Option<Validator<str>> {
        Some(Validator::new(
            "must be a channel mention or a 17-19 digit channel id",
            |s: &str| CHANNEL_REF.is_match(s.trim()),
        ))
    }

    async fn resolve(&self, ctx: &RuntimeContext, text: &str) -> Option<Self::Value> {
        let id = parse_channel_ref(text)?;
        ctx.lookup.channel(ChannelId(id)).await
    }
}

/// Resolves a category mention or id into a [`CategoryRef`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryResolver;

#[async_trait]
impl InputResolver for CategoryResolver {
    type Value = CategoryRef;

    fn description(&self) -> String {
        "a category id (or <#id> mention)".to_string()
    }

    fn type_string(&self) -> String {
        "category".to_string()
    }

    fn value_string(&self, value: &Self::Value) -> String {
        format!("{} ({})", value.name, value.id.0)
    }

    fn text_validator(&self) -> Option<Validator<str>> {
        Some(Validator::new(
            "must be a category mention or a 17-19 digit category id",
            |s: &str| CHANNEL_REF.is_match(s.trim()),
        ))
    }

    async fn resolve(&self, ctx: &RuntimeContext, text: &str) -> Option<Self::Value> {
        let id = parse_channel_ref(text)?;
        ctx.lookup.category(ChannelId(id)).await
    }
}

/// Resolves a guild id into a [`GuildRef`] via a remote preview lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuildPreviewResolver;

#[async_trait]
impl InputResolver for GuildPreviewResolver {
    type Value = GuildRef;

    fn description(&self) -> String {
        "a 17-19 digit server id".to_string()
    }

    fn type_string(&self) -> String {
        "server".to_string()
    }

    fn value_string(&self, value: &Self::Value) -> String {
        match value.member_count {
            Some(count) => format!("{} ({} members)", value.name, count),
            None => value.name.clone(),
        }
    }

    fn text_validator(&self) -> Option<Validator<str>> {
        Some(Validator::new(
            "must be a 17-19 digit server id",
            |s: &str| SNOWFLAKE.is_match(s.trim()),
        ))
    }

    async fn resolve(&self, ctx: &RuntimeContext, text: &str) -> Option<Self::Value> {
        let id: u64 = text.trim().parse().ok()?;
        ctx.lookup.guild_preview(GuildId(id)).await
    }
}
