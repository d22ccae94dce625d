// `/setchannel` - the only administrative command.
//
// Thin layer: pull the ids out of the interaction, hand them to the registry,
// tell the invoker what happened. Replies are ephemeral and sent at most once;
// `on_error` only ever sees failures that happen before anything was sent.

use std::fmt::Display;

use crate::core::channels::RegistryError;
use crate::discord::{Context, Error};

pub const ERROR_REPLY: &str = "❌ Error executing command";

/// Post news updates in this channel
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn setchannel(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?;
    let channel_id = ctx.channel_id();

    let saved = ctx
        .data()
        .channels
        .set_channel(&guild_id.to_string(), &channel_id.to_string())
        .await;
    if let Err(e) = &saved {
        tracing::error!(
            guild_id = guild_id.get(),
            channel_id = channel_id.get(),
            "Failed to save news channel: {}",
            e
        );
    }

    let sent = ctx
        .send(
            poise::CreateReply::default()
                .content(reply_text(&saved, channel_id.get()))
                .ephemeral(true),
        )
        .await;
    log_unsent_reply(sent, guild_id.get());
    Ok(())
}

fn reply_text(saved: &Result<(), RegistryError>, channel_id: u64) -> String {
    match saved {
        Ok(()) => format!("✅ News will now be posted in <#{}>", channel_id),
        Err(_) => ERROR_REPLY.to_string(),
    }
}

/// A reply that could not be delivered is only logged. Escalating it would make
/// `on_error` reply a second time, or report a saved channel as a failure.
fn log_unsent_reply<T, E: Display>(sent: Result<T, E>, guild_id: u64) -> bool {
    match sent {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(guild_id, "Could not send /setchannel reply: {}", e);
            false
        }
    }
}
