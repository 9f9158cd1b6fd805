//! Serenity-backed implementations of the dialog engine's boundaries.
//!
//! Nothing in [`crate::dialog`] touches serenity; these modules supply the
//! live [`crate::dialog::surface::ChatSurface`] implementations (channel
//! and interaction flavored), the payload conversions, and the HTTP
//! reference lookup.

/// Payload conversion to serenity's builder types
pub mod convert;
/// HTTP-backed reference lookup
pub mod lookup;
/// Live chat-surface implementations
pub mod surface;

pub use lookup::HttpLookup;
pub use surface::{ChannelSurface, InteractionSurface};
