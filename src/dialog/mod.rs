//! The interactive dialog engine.
//!
//! Everything here operates against the abstract [`surface::ChatSurface`]
//! rather than serenity directly, so the collectors, pagination and keypad
//! flows can be driven end to end by the in-memory surface in tests. The
//! serenity-backed implementations live in [`crate::discord`].
//!
//! Dependency order: [`payload`] -> [`manager`] -> [`builder`] ->
//! {[`input`], [`pagination`]} -> [`keypad`].

/// Fluent message accumulator performing the initial send
pub mod builder;
/// Interactive input collector state machine (primitive/sequence/mapping)
pub mod input;
/// Numeric keypad sub-dialog
pub mod keypad;
/// Live-message owner with `update`/`remove`
pub mod manager;
/// Paged message browser with jump-to-page
pub mod pagination;
/// Renderable message payload value types
pub mod payload;
/// Text-to-typed-value resolution strategies
pub mod resolver;
/// Abstract chat surface and event types
pub mod surface;
/// Predicate validators with aggregated failure reporting
pub mod validate;

pub use builder::MessageBuilder;
pub use input::{InputOutcome, InputSession, Mapping, Primitive, Sequence};
pub use keypad::{KeypadBounds, KeypadMessageManager};
pub use manager::MessageManager;
pub use pagination::{PaginationMessageManager, RenderPage};
pub use payload::{ActionRow, Button, ButtonStyle, Embed, MessageData};
pub use resolver::{
    CategoryResolver, ChannelResolver, GuildPreviewResolver, InputResolver, TextResolver,
};
pub use surface::{ChatSurface, ComponentClick, IncomingMessage, MessageId, ReactionEvent, UserId};
pub use validate::Validator;
