// Picks a news channel automatically when the bot is added to a guild.

use poise::serenity_prelude as serenity;

use crate::core::channels::{pick_default_channel, ChannelCandidate};
use crate::discord::{Data, Error};

pub const GREETING: &str = "🤖 Thanks for adding me! I'll post news here.";

/// Handle `GuildCreate`. Gateway reconnects replay this event for every guild,
/// so only genuinely new guilds (`is_new == Some(true)`) are configured.
pub async fn handle_guild_create(
    ctx: &serenity::Context,
    data: &Data,
    guild: &serenity::Guild,
    is_new: Option<bool>,
) -> Result<(), Error> {
    if is_new != Some(true) {
        return Ok(());
    }

    let bot_id = ctx.cache.current_user().id;
    let me = match guild.members.get(&bot_id) {
        Some(member) => member.clone(),
        None => guild.id.member(&ctx.http, bot_id).await?,
    };

    let candidates: Vec<ChannelCandidate> = guild
        .channels
        .values()
        .map(|channel| {
            let permissions = guild.user_permissions_in(channel, &me);
            ChannelCandidate {
                id: channel.id.to_string(),
                position: channel.position,
                is_text: channel.kind == serenity::ChannelType::Text,
                can_post: permissions.view_channel() && permissions.send_messages(),
            }
        })
        .collect();

    let Some(choice) = pick_default_channel(&candidates) else {
        tracing::info!(guild_id = guild.id.get(), "Joined guild without a postable text channel");
        return Ok(());
    };

    data.channels
        .set_channel(&guild.id.to_string(), &choice.id)
        .await?;

    let channel_id = serenity::ChannelId::new(choice.id.parse::<u64>()?);
    channel_id.say(&ctx.http, GREETING).await?;

    tracing::info!(
        guild_id = guild.id.get(),
        channel_id = channel_id.get(),
        "Joined new guild, default news channel selected"
    );
    Ok(())
}
