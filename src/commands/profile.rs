//! Profile registration and roster browsing.
//!
//! `/register` runs a keyed-map input dialog and stores the confirmed
//! fields on the roster; `/profiles` opens a paginated roster browser
//! driven by the navigation row.

use crate::bot::Context;
use crate::dialog::{
    Embed, InputOutcome, InputSession, Mapping, MessageBuilder, PaginationMessageManager,
    RenderPage, TextResolver, Validator,
};
use crate::dialog::surface::{ChatSurface, UserId};
use crate::discord::surface::{ChannelSurface, InteractionSurface, ReplyState};
use crate::errors::Result;
use crate::models::Profile;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Longest accepted `key:value` line during registration.
const MAX_FIELD_LINE: usize = 100;

/// Registers or replaces your profile through an interactive dialog.
#[poise::command(slash_command, guild_only)]
#[instrument(skip(ctx))]
pub async fn register(ctx: Context<'_>) -> Result<()> {
    info!("Register command received from user: {}", ctx.author().name);
    let Some(surface) = InteractionSurface::from_context(&ctx, ReplyState::Fresh) else {
        ctx.say("This command only works as a slash command.").await?;
        return Ok(());
    };
    let surface: Arc<dyn ChatSurface> = Arc::new(surface);
    let data = ctx.data();
    let user = UserId(ctx.author().id.get());

    let manager = MessageBuilder::new()
        .embed(
            Embed::new()
                .title("Profile registration")
                .description(
                    "Send one line per field, like `rank:Diamond` or `region:EU`.\n\
                     Repeating a key overwrites it. React \u{1f44d} when you are done.",
                )
                .color(data.app_config.accent_color),
        )
        .send(Arc::clone(&surface))
        .await?;

    let session = InputSession::new(
        manager,
        TextResolver,
        Mapping::new(),
        Arc::clone(&data.runtime),
        user,
    )
    .text_validator(Validator::new(
        format!("each line must be at most {MAX_FIELD_LINE} characters"),
        |s: &str| s.chars().count() <= MAX_FIELD_LINE,
    ));

    match session.run().await? {
        InputOutcome::Confirmed(fields) => {
            let count = fields.len();
            data.roster
                .write()
                .await
                .insert(user, Profile { user, fields });
            info!("Stored profile with {} fields for {}", count, user);
            surface.notify("Profile saved.").await?;
        }
        InputOutcome::Cancelled => {
            info!("Registration cancelled by {}", user);
        }
    }
    Ok(())
}

/// Browses the registered profiles, one page at a time.
#[poise::command(slash_command, guild_only)]
#[instrument(skip(ctx))]
pub async fn profiles(ctx: Context<'_>) -> Result<()> {
    let data = ctx.data();
    let snapshot: Vec<Profile> = data.roster.read().await.values().cloned().collect();
    if snapshot.is_empty() {
        ctx.say("No profiles registered yet. Try `/register`.").await?;
        return Ok(());
    }

    // The browser lives in the channel so everyone can page through it;
    // the interaction itself just gets an ephemeral acknowledgement.
    let surface: Arc<dyn ChatSurface> = Arc::new(ChannelSurface::from_context(&ctx));
    ctx.send(
        poise::CreateReply::default()
            .content("Opening the roster browser.")
            .ephemeral(true),
    )
    .await?;

    let page_size = data.app_config.page_size.max(1);
    let pages = snapshot.len().div_ceil(page_size);
    let accent = data.app_config.accent_color;

    let manager = MessageBuilder::new()
        .embed(Embed::new().title("Team roster"))
        .send(surface)
        .await?;
    let render: RenderPage = Box::new(move |payload, page| {
        payload.embeds = vec![roster_page(&snapshot, page, page_size, accent)];
    });
    let (pager, mut changes) = PaginationMessageManager::new(manager, pages, render);

    tokio::spawn(async move {
        while let Some(page) = changes.recv().await {
            debug!("Roster browser moved to page {}", page + 1);
        }
    });
    // The click loop outlives the command invocation.
    tokio::spawn(async move {
        if let Err(e) = pager.run().await {
            error!("Roster browser stopped with an error: {}", e);
        }
    });
    Ok(())
}

/// Renders one roster page as an embed.
fn roster_page(profiles: &[Profile], page: usize, page_size: usize, accent: u32) -> Embed {
    let start = page * page_size;
    let slice = &profiles[start.min(profiles.len())..(start + page_size).min(profiles.len())];
    let mut embed = Embed::new()
        .title("Team roster")
        .color(accent)
        .footer(format!("{} member(s) registered", profiles.len()));
    for profile in slice {
        let body = if profile.fields.is_empty() {
            "(no fields)".to_string()
        } else {
            profile
                .fields
                .iter()
                .map(|(key, value)| format!("{key}: {value}"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        embed = embed.field(format!("<@{}>", profile.user), body, false);
    }
    embed
}
