//! Conversion from the engine's payload types to serenity's builders.
//!
//! Each send/edit call converts the whole [`MessageData`] fresh, fully
//! replacing content, embeds and components. Attachments follow the edit
//! API's merge semantics: an empty accumulated list means "keep existing"
//! (no attachments builder at all), a non-empty list is an explicit
//! replacement.

use crate::dialog::payload::{
    ActionRow, AllowedMentions, Button, ButtonStyle, Embed, MessageData,
};
use poise::serenity_prelude as serenity;

/// Converts one embed.
pub fn embed(embed: &Embed) -> serenity::CreateEmbed {
    let mut out = serenity::CreateEmbed::default();
    if let Some(title) = &embed.title {
        out = out.title(title.clone());
    }
    if let Some(description) = &embed.description {
        out = out.description(description.clone());
    }
    if let Some(color) = embed.color {
        out = out.colour(serenity::Colour::new(color));
    }
    if let Some(footer) = &embed.footer {
        out = out.footer(serenity::CreateEmbedFooter::new(footer.clone()));
    }
    out.fields(
        embed
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.value.clone(), f.inline)),
    )
}

fn style(style: ButtonStyle) -> serenity::ButtonStyle {
    match style {
        ButtonStyle::Primary => serenity::ButtonStyle::Primary,
        ButtonStyle::Secondary => serenity::ButtonStyle::Secondary,
        ButtonStyle::Success => serenity::ButtonStyle::Success,
        ButtonStyle::Danger => serenity::ButtonStyle::Danger,
    }
}

fn button(button: &Button) -> serenity::CreateButton {
    serenity::CreateButton::new(button.custom_id.clone())
        .label(button.label.clone())
        .style(style(button.style))
        .disabled(button.disabled)
}

/// Converts the component rows.
pub fn rows(rows: &[ActionRow]) -> Vec<serenity::CreateActionRow> {
    rows.iter()
        .map(|row| serenity::CreateActionRow::Buttons(row.buttons.iter().map(button).collect()))
        .collect()
}

fn mentions(policy: AllowedMentions) -> serenity::CreateAllowedMentions {
    serenity::CreateAllowedMentions::new()
        .all_users(policy.users)
        .all_roles(policy.roles)
        .everyone(policy.everyone)
}

/// Builds the payload for a fresh channel message.
pub fn create_message(data: &MessageData) -> serenity::CreateMessage {
    let mut message = serenity::CreateMessage::new()
        .embeds(data.embeds.iter().map(embed).collect())
        .components(rows(&data.components));
    if let Some(content) = &data.content {
        message = message.content(content.clone());
    }
    // Dialog messages never ping by default.
    message = message.allowed_mentions(mentions(data.allowed_mentions.unwrap_or_default()));
    for file in &data.files {
        message = message.add_file(serenity::CreateAttachment::bytes(
            file.data.clone(),
            file.name.clone(),
        ));
    }
    message
}

/// Builds the payload for an edit, fully replacing the mutable fields.
pub fn edit_message(data: &MessageData) -> serenity::EditMessage {
    let mut edit = serenity::EditMessage::new()
        .content(data.content.clone().unwrap_or_default())
        .embeds(data.embeds.iter().map(embed).collect())
        .components(rows(&data.components));
    // The edit endpoint merges attachments: leaving the builder unset
    // keeps what is there, so only build one when there is an explicit
    // retained set or fresh uploads to apply.
    if data.attachments_patch().is_some() || !data.files.is_empty() {
        let mut attachments = serenity::EditAttachments::new();
        for retained in data.attachments_patch().unwrap_or_default() {
            attachments = attachments.keep(serenity::AttachmentId::new(retained.id));
        }
        for file in &data.files {
            attachments = attachments.add(serenity::CreateAttachment::bytes(
                file.data.clone(),
                file.name.clone(),
            ));
        }
        edit = edit.attachments(attachments);
    }
    edit
}

/// Builds the payload for an initial interaction reply.
pub fn interaction_response(data: &MessageData) -> serenity::CreateInteractionResponseMessage {
    let mut message = serenity::CreateInteractionResponseMessage::new()
        .embeds(data.embeds.iter().map(embed).collect())
        .components(rows(&data.components));
    if let Some(content) = &data.content {
        message = message.content(content.clone());
    }
    // Same default as the channel path: never ping unless asked to.
    message = message.allowed_mentions(mentions(data.allowed_mentions.unwrap_or_default()));
    for file in &data.files {
        message = message.add_file(serenity::CreateAttachment::bytes(
            file.data.clone(),
            file.name.clone(),
        ));
    }
    message
}

/// Builds the payload for an interaction follow-up message.
pub fn followup(data: &MessageData) -> serenity::CreateInteractionResponseFollowup {
    let mut message = serenity::CreateInteractionResponseFollowup::new()
        .embeds(data.embeds.iter().map(embed).collect())
        .components(rows(&data.components));
    if let Some(content) = &data.content {
        message = message.content(content.clone());
    }
    message = message.allowed_mentions(mentions(data.allowed_mentions.unwrap_or_default()));
    for file in &data.files {
        message = message.add_file(serenity::CreateAttachment::bytes(
            file.data.clone(),
            file.name.clone(),
        ));
    }
    message
}

/// Builds the payload for editing the original deferred reply.
pub fn edit_response(data: &MessageData) -> serenity::EditInteractionResponse {
    let mut edit = serenity::EditInteractionResponse::new()
        .embeds(data.embeds.iter().map(embed).collect())
        .components(rows(&data.components));
    if let Some(content) = &data.content {
        edit = edit.content(content.clone());
    }
    edit = edit.allowed_mentions(mentions(data.allowed_mentions.unwrap_or_default()));
    for file in &data.files {
        edit = edit.new_attachment(serenity::CreateAttachment::bytes(
            file.data.clone(),
            file.name.clone(),
        ));
    }
    edit
}
