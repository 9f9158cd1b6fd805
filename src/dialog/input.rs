//! The interactive input collector.
//!
//! An [`InputSession`] turns a sequence of chat messages and button clicks
//! into one validated, confirmed value. It is parameterized by a
//! [`crate::dialog::resolver::InputResolver`] (text -> typed value) and an
//! accumulation [`Shape`] (single value, ordered list, or keyed map),
//! composed rather than subclassed.
//!
//! State machine:
//! `AwaitingInput -> (accumulating)* -> AwaitingConfirmation -> {Confirmed | Cancelled}`

use crate::dialog::builder::MessageBuilder;
use crate::dialog::manager::MessageManager;
use crate::dialog::payload::{ActionRow, Button, ButtonStyle, Embed};
use crate::dialog::resolver::InputResolver;
use crate::dialog::surface::{
    ACCEPTED_EMOJI, CONFIRM_EMOJI, ChatSurface, IncomingMessage, UserId,
};
use crate::dialog::validate::{self, Validator};
use crate::errors::{Error, Result};
use crate::runtime::RuntimeContext;
use futures::StreamExt;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Custom id of the cancel button attached to the primary dialog message.
pub const CANCEL_ID: &str = "input:cancel";
/// Custom id of the confirmation prompt's Yes button.
pub const CONFIRM_YES_ID: &str = "input:confirm:yes";
/// Custom id of the confirmation prompt's No button.
pub const CONFIRM_NO_ID: &str = "input:confirm:no";

/// How accepted values accumulate into the session's final output.
///
/// Implementations carry the shape-specific pieces the collector composes:
/// an optional injected text validator, the key/value split rule, a
/// capacity check, and the confirmation summary.
pub trait Shape<T>: Send {
    /// The final value delivered on confirmation.
    type Output: Send;

    /// Whether the first accepted value immediately triggers confirmation.
    fn one_shot(&self) -> bool {
        false
    }

    /// Shape-injected text validator, if any.
    fn text_validator(&self) -> Option<Validator<str>> {
        None
    }

    /// Splits raw text into an optional key and the value text to resolve.
    fn split<'a>(&self, raw: &'a str) -> (Option<String>, &'a str) {
        (None, raw)
    }

    /// `Some(error)` when accepting another value would exceed a limit.
    fn capacity_error(&self) -> Option<String> {
        None
    }

    /// Applies one accepted value.
    fn accept(&mut self, key: Option<String>, value: T);

    /// Whether nothing has accumulated yet.
    fn is_empty(&self) -> bool;

    /// Renders the accumulated value for the confirmation prompt.
    fn summary(&self, render: &dyn Fn(&T) -> String) -> String;

    /// Consumes the shape into the final output. Only called after a
    /// confirmation, which requires `!is_empty()`.
    fn finish(self) -> Self::Output;
}

/// Single value; each acceptance overwrites the last (last write wins),
/// and the first acceptance goes straight to confirmation.
#[derive(Debug, Default)]
pub struct Primitive<T> {
    value: Option<T>,
}

impl<T> Primitive<T> {
    /// Creates an empty primitive shape.
    #[must_use]
    pub const fn new() -> Self {
        Self { value: None }
    }
}

impl<T: Send> Shape<T> for Primitive<T> {
    type Output = T;

    fn one_shot(&self) -> bool {
        true
    }

    fn accept(&mut self, _key: Option<String>, value: T) {
        self.value = Some(value);
    }

    fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    fn summary(&self, render: &dyn Fn(&T) -> String) -> String {
        self.value.as_ref().map_or_else(String::new, render)
    }

    fn finish(self) -> T {
        #[allow(clippy::expect_used)]
        self.value.expect("confirmed shape holds a value")
    }
}

/// Ordered list; acceptances append, with an optional maximum length
/// always enforced alongside the caller's value validators.
#[derive(Debug, Default)]
pub struct Sequence<T> {
    items: Vec<T>,
    max_len: Option<usize>,
}

impl<T> Sequence<T> {
    /// Creates an unbounded sequence shape.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            max_len: None,
        }
    }

    /// Creates a sequence shape capped at `max_len` entries.
    #[must_use]
    pub const fn with_max_len(max_len: usize) -> Self {
        Self {
            items: Vec::new(),
            max_len: Some(max_len),
        }
    }
}

impl<T: Send> Shape<T> for Sequence<T> {
    type Output = Vec<T>;

    fn capacity_error(&self) -> Option<String> {
        let max = self.max_len?;
        (self.items.len() >= max).then(|| format!("no more than {max} entries are allowed"))
    }

    fn accept(&mut self, _key: Option<String>, value: T) {
        self.items.push(value);
    }

    fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn summary(&self, render: &dyn Fn(&T) -> String) -> String {
        self.items.iter().map(render).collect::<Vec<_>>().join(", ")
    }

    fn finish(self) -> Vec<T> {
        self.items
    }
}

/// String-keyed map; each message must look like `key:value`. The key is
/// everything before the FIRST colon (trimmed); the remainder is resolved
/// as the value and kept intact, colons included.
#[derive(Debug, Default)]
pub struct Mapping<T> {
    entries: BTreeMap<String, T>,
}

impl<T> Mapping<T> {
    /// Creates an empty mapping shape.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T: Send> Shape<T> for Mapping<T> {
    type Output = BTreeMap<String, T>;

    fn text_validator(&self) -> Option<Validator<str>> {
        Some(Validator::new(
            "must look like `key:value`",
            |s: &str| s.contains(':'),
        ))
    }

    fn split<'a>(&self, raw: &'a str) -> (Option<String>, &'a str) {
        match raw.split_once(':') {
            Some((key, rest)) => (Some(key.trim().to_string()), rest),
            None => (None, raw),
        }
    }

    fn accept(&mut self, key: Option<String>, value: T) {
        if let Some(key) = key {
            self.entries.insert(key, value);
        }
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn summary(&self, render: &dyn Fn(&T) -> String) -> String {
        self.entries
            .iter()
            .map(|(key, value)| format!("{key}: {}", render(value)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn finish(self) -> BTreeMap<String, T> {
        self.entries
    }
}

/// Terminal result of an input session.
#[derive(Debug, PartialEq, Eq)]
pub enum InputOutcome<V> {
    /// The user confirmed; the accumulated value, delivered exactly once.
    Confirmed(V),
    /// The user hit cancel; no value was delivered.
    Cancelled,
}

/// The interactive collector owning the primary dialog message.
///
/// Listens for chat messages from the invoking user only, text-validates,
/// resolves, value-validates, accumulates per the shape, and runs an
/// explicit confirm round-trip before delivering the value. Every
/// qualifying message is tracked so [`MessageManager::remove`] leaves the
/// channel tidy.
pub struct InputSession<R: InputResolver, S: Shape<R::Value>> {
    manager: MessageManager,
    resolver: R,
    shape: S,
    runtime: Arc<RuntimeContext>,
    user: UserId,
    text_validators: Vec<Validator<str>>,
    value_validators: Vec<Validator<R::Value>>,
}

impl<R: InputResolver, S: Shape<R::Value>> InputSession<R, S> {
    /// Wraps an already-sent dialog message in a collector for `user`.
    ///
    /// Resolver- and shape-injected text validators are installed ahead of
    /// any caller-supplied ones.
    pub fn new(
        manager: MessageManager,
        resolver: R,
        shape: S,
        runtime: Arc<RuntimeContext>,
        user: UserId,
    ) -> Self {
        let mut text_validators = Vec::new();
        if let Some(validator) = resolver.text_validator() {
            text_validators.push(validator);
        }
        if let Some(validator) = shape.text_validator() {
            text_validators.push(validator);
        }
        Self {
            manager,
            resolver,
            shape,
            runtime,
            user,
            text_validators,
            value_validators: Vec::new(),
        }
    }

    /// Appends a caller-supplied text validator.
    #[must_use]
    pub fn text_validator(mut self, validator: Validator<str>) -> Self {
        self.text_validators.push(validator);
        self
    }

    /// Appends a caller-supplied value validator.
    #[must_use]
    pub fn value_validator(mut self, validator: Validator<R::Value>) -> Self {
        self.value_validators.push(validator);
        self
    }

    /// Renders the currently accumulated value.
    #[must_use]
    pub fn value_string(&self) -> String {
        self.shape.summary(&|value| self.resolver.value_string(value))
    }

    /// Runs the collector to a terminal state.
    ///
    /// On `Confirmed` the primary message, the confirmation prompt and
    /// every tracked response message have been deleted and the value is
    /// returned exactly once. On `Cancelled` everything owned has been
    /// deleted and no value is returned.
    #[instrument(skip(self), fields(user = %self.user))]
    pub async fn run(mut self) -> Result<InputOutcome<S::Output>> {
        let surface = self.manager.surface();
        let primary = self.manager.message_id();

        self.attach_cancel_row().await?;
        if !self.shape.one_shot() {
            // Placeholder completion reaction; a voter must add to it.
            surface.react(primary, CONFIRM_EMOJI).await?;
        }

        let mut messages = surface.messages();
        let mut reactions = surface.reactions(primary);
        let mut clicks = surface.component_clicks(primary);

        loop {
            tokio::select! {
                maybe_message = messages.next() => {
                    let Some(message) = maybe_message else {
                        return Err(stream_closed());
                    };
                    if message.author_is_bot || message.author != self.user {
                        continue;
                    }
                    self.manager.track(message.id);
                    let accepted = self.ingest(&message).await?;
                    if accepted && self.shape.one_shot() && self.confirm(&surface).await? {
                        return Ok(InputOutcome::Confirmed(self.shape.finish()));
                    }
                }
                maybe_reaction = reactions.next() => {
                    let Some(reaction) = maybe_reaction else {
                        return Err(stream_closed());
                    };
                    // The bot's own placeholder keeps the count at 1.
                    if reaction.emoji != CONFIRM_EMOJI || reaction.count <= 1 {
                        continue;
                    }
                    if self.shape.is_empty() {
                        surface
                            .notify("Nothing to confirm yet - send a value first.")
                            .await?;
                        continue;
                    }
                    if self.confirm(&surface).await? {
                        return Ok(InputOutcome::Confirmed(self.shape.finish()));
                    }
                }
                maybe_click = clicks.next() => {
                    let Some(click) = maybe_click else {
                        return Err(stream_closed());
                    };
                    if click.custom_id == CANCEL_ID {
                        debug!("Input dialog cancelled by {}", click.user);
                        self.manager.remove().await?;
                        return Ok(InputOutcome::Cancelled);
                    }
                }
            }
        }
    }

    /// Adds the cancel button row to the primary message unless the
    /// builder already included one.
    async fn attach_cancel_row(&mut self) -> Result<()> {
        let present = self
            .manager
            .data()
            .components
            .iter()
            .any(|row| row.buttons.iter().any(|b| b.custom_id == CANCEL_ID));
        if present {
            return Ok(());
        }
        self.manager.data_mut().components.push(ActionRow::buttons(vec![
            Button::new(CANCEL_ID, "Cancel").style(ButtonStyle::Danger),
        ]));
        self.manager.update().await
    }

    /// Validates, resolves and accumulates one qualifying message.
    /// Returns whether the value was accepted.
    async fn ingest(&mut self, message: &IncomingMessage) -> Result<bool> {
        let surface = self.manager.surface();
        let raw = message.content.as_str();

        let text_failures = validate::failures(&self.text_validators, raw);
        if !text_failures.is_empty() {
            surface.notify(&validate::report(&text_failures)).await?;
            return Ok(false);
        }

        let (key, value_text) = self.shape.split(raw);
        let Some(value) = self.resolver.resolve(&self.runtime, value_text).await else {
            // Unresolvable input is "no value yet": tolerated silently,
            // distinct from validator failures which get feedback.
            debug!("Input {:?} did not resolve to a {}", raw, self.resolver.type_string());
            return Ok(false);
        };

        let capacity_error = self.shape.capacity_error();
        let mut value_failures = validate::failures(&self.value_validators, &value);
        if let Some(capacity) = capacity_error.as_deref() {
            value_failures.push(capacity);
        }
        if !value_failures.is_empty() {
            surface.notify(&validate::report(&value_failures)).await?;
            return Ok(false);
        }

        surface.react(message.id, ACCEPTED_EMOJI).await?;
        self.shape.accept(key, value);
        Ok(true)
    }

    /// Runs the confirm round-trip. Returns `true` when the value was
    /// confirmed (and the whole dialog cleaned up), `false` to keep
    /// collecting.
    async fn confirm(&mut self, surface: &Arc<dyn ChatSurface>) -> Result<bool> {
        let summary = self.value_string();
        let mut prompt = MessageBuilder::new()
            .embed(
                Embed::new()
                    .title("Confirm")
                    .description(format!(
                        "Submit this {}?\n{summary}",
                        self.resolver.type_string()
                    )),
            )
            .components(vec![ActionRow::buttons(vec![
                Button::new(CONFIRM_YES_ID, "Yes").style(ButtonStyle::Success),
                Button::new(CONFIRM_NO_ID, "No").style(ButtonStyle::Secondary),
            ])])
            .send(Arc::clone(surface))
            .await?;

        // One click from anyone able to see the prompt decides it.
        let click = surface.await_component(prompt.message_id(), None).await;
        let confirmed = matches!(&click, Some(c) if c.custom_id == CONFIRM_YES_ID);
        prompt.remove().await?;
        if confirmed {
            self.manager.remove().await?;
        }
        Ok(confirmed)
    }
}

fn stream_closed() -> Error {
    Error::Dialog("event stream closed before the dialog reached a terminal state".to_string())
}
