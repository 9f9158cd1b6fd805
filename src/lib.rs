//! `FinalsTeamsBot` - a Discord community bot for THE FINALS
//!
//! This crate provides the interactive dialog engine behind the bot's slash
//! commands: multi-step chat input collection with validation and explicit
//! confirmation, paginated message browsing with jump-to-page, and a numeric
//! keypad sub-dialog, all running against an abstract chat surface so the
//! flows can be exercised without a live gateway connection.

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    // Security and correctness
    unsafe_code,
    unsafe_op_in_unsafe_fn,

    // Code quality - things that are almost always bugs
    unreachable_code,
    unreachable_patterns,
    unused_must_use,

    // Documentation - broken links are bugs
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    missing_docs,

    // Clippy categories for overall code quality
    clippy::all,
    clippy::pedantic,

    // Performance
    clippy::inefficient_to_string,
    clippy::needless_pass_by_value,

    // Correctness
    clippy::dbg_macro,
    clippy::unwrap_used,
    clippy::expect_used,

    // Future compatibility
    future_incompatible,
    rust_2018_idioms,
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,  // Common pattern in Rust
    clippy::missing_errors_doc,        // Will add gradually
    clippy::missing_panics_doc,        // Will add gradually
)]

/// Poise framework wiring - bot context, command registration, error hook
pub mod bot;
/// Slash command handlers (thin glue over the dialog engine)
pub mod commands;
/// Application configuration loaded from TOML and the environment
pub mod config;
/// The interactive dialog engine - builders, managers, collectors
pub mod dialog;
/// Serenity-backed implementations of the chat surface and reference lookups
pub mod discord;
/// Unified error types and result handling
pub mod errors;
/// Plain data records shared across modules
pub mod models;
/// Injected runtime context and reference lookup boundary
pub mod runtime;

#[cfg(test)]
pub mod test_utils;
