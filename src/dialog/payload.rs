//! Renderable message payload value types.
//!
//! [`MessageData`] is the one structured payload the whole engine passes
//! around: built up by [`crate::dialog::MessageBuilder`], owned by a
//! [`crate::dialog::MessageManager`] after the initial send, mutated in
//! place and re-applied via edits. The types here are deliberately
//! framework-free; conversion to serenity's builders happens in
//! [`crate::discord::convert`].

/// Visual style of a button, mirroring Discord's button styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonStyle {
    /// Blurple call-to-action.
    #[default]
    Primary,
    /// Grey neutral action.
    Secondary,
    /// Green affirmative action.
    Success,
    /// Red destructive action.
    Danger,
}

/// A single button inside an action row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    /// Custom id delivered back on click.
    pub custom_id: String,
    /// Visible label.
    pub label: String,
    /// Visual style.
    pub style: ButtonStyle,
    /// Whether the button renders greyed-out and unclickable.
    pub disabled: bool,
}

impl Button {
    /// Creates an enabled primary button.
    pub fn new(custom_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            custom_id: custom_id.into(),
            label: label.into(),
            style: ButtonStyle::Primary,
            disabled: false,
        }
    }

    /// Sets the style.
    #[must_use]
    pub fn style(mut self, style: ButtonStyle) -> Self {
        self.style = style;
        self
    }

    /// Sets the disabled flag.
    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// One horizontal row of buttons.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionRow {
    /// Buttons, left to right. Discord caps this at five.
    pub buttons: Vec<Button>,
}

impl ActionRow {
    /// Creates a row from buttons.
    #[must_use]
    pub fn buttons(buttons: Vec<Button>) -> Self {
        Self { buttons }
    }
}

/// One embed field: name, value, inline flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    /// Field title.
    pub name: String,
    /// Field body.
    pub value: String,
    /// Whether the field renders inline.
    pub inline: bool,
}

/// A rich embed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Embed {
    /// Title line.
    pub title: Option<String>,
    /// Body text.
    pub description: Option<String>,
    /// Accent color.
    pub color: Option<u32>,
    /// Fields, in order.
    pub fields: Vec<EmbedField>,
    /// Footer text.
    pub footer: Option<String>,
}

impl Embed {
    /// Creates an empty embed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the accent color.
    #[must_use]
    pub const fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    /// Sets the footer text.
    #[must_use]
    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }
}

/// Mention-expansion policy for a message. The default suppresses all
/// pings, which is what every dialog message wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AllowedMentions {
    /// Expand user mentions into pings.
    pub users: bool,
    /// Expand role mentions into pings.
    pub roles: bool,
    /// Allow @everyone / @here.
    pub everyone: bool,
}

/// A fresh file upload attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// File name shown in the client.
    pub name: String,
    /// Raw bytes.
    pub data: Vec<u8>,
}

/// A reference to an attachment already uploaded on the message, retained
/// across edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentRef {
    /// Attachment snowflake.
    pub id: u64,
}

/// A fully-formed renderable message payload.
///
/// Invariant: never handed to a send or edit call partially constructed;
/// the builder owns it until the initial send, the manager afterwards.
#[derive(Debug, Clone, Default)]
pub struct MessageData {
    /// Plain text content.
    pub content: Option<String>,
    /// Embeds, in order.
    pub embeds: Vec<Embed>,
    /// Mention policy. `None` means the surface default (suppress all).
    pub allowed_mentions: Option<AllowedMentions>,
    /// Fresh file uploads.
    pub files: Vec<FileUpload>,
    /// Attachments retained from the live message.
    pub attachments: Vec<AttachmentRef>,
    /// Action rows, in order.
    pub components: Vec<ActionRow>,
}

impl MessageData {
    /// Creates an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The attachments patch to apply on an edit.
    ///
    /// Discord's edit endpoint merges attachments by default, and an
    /// explicit empty list would fail to clear anything anyway, so an
    /// empty accumulated list maps to `None` ("keep existing") and a
    /// non-empty list to an explicit replacement.
    #[must_use]
    pub fn attachments_patch(&self) -> Option<&[AttachmentRef]> {
        if self.attachments.is_empty() {
            None
        } else {
            Some(&self.attachments)
        }
    }

    /// Replaces the action row carrying the given custom id prefix, or
    /// appends the row if no button matches. Used by flows that own one
    /// navigation/control row inside a larger payload.
    pub fn upsert_row(&mut self, id_prefix: &str, row: ActionRow) {
        let existing = self.components.iter_mut().find(|r| {
            r.buttons
                .iter()
                .any(|b| b.custom_id.starts_with(id_prefix))
        });
        match existing {
            Some(slot) => *slot = row,
            None => self.components.push(row),
        }
    }
}
