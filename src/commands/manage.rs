use crate::bot::Context;
use crate::dialog::surface::UserId;
use crate::errors::Result;
use tracing::{info, warn};

/// Clears every registered profile. Restricted to bot masters.
#[poise::command(slash_command, guild_only)]
pub async fn clear_profiles(ctx: Context<'_>) -> Result<()> {
    let data = ctx.data();
    let caller = UserId(ctx.author().id.get());
    if !data.runtime.is_master(caller) {
        warn!("Rejected clear_profiles from non-master {}", caller);
        ctx.send(
            poise::CreateReply::default()
                .content("Only bot masters can do that.")
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    }

    let removed = {
        let mut roster = data.roster.write().await;
        let count = roster.len();
        roster.clear();
        count
    };
    info!("Master {} cleared {} profile(s)", caller, removed);
    ctx.say(format!("Cleared {removed} profile(s).")).await?;
    Ok(())
}
