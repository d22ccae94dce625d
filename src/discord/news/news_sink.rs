use std::sync::Arc;

use async_trait::async_trait;
use poise::serenity_prelude as serenity;

use crate::core::news::{NewsError, NewsPost, NewsSink};

/// Delivers news posts as embeds through the Discord HTTP API.
pub struct DiscordNewsSink {
    http: Arc<serenity::Http>,
}

impl DiscordNewsSink {
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl NewsSink for DiscordNewsSink {
    type Channel = serenity::ChannelId;

    async fn resolve_channel(&self, channel_id: &str) -> Result<serenity::ChannelId, NewsError> {
        let unavailable = |reason: String| NewsError::ChannelUnavailable(channel_id.to_string(), reason);

        let id = channel_id
            .parse::<u64>()
            .ok()
            .filter(|id| *id != 0)
            .ok_or_else(|| unavailable("not a valid channel id".to_string()))?;
        let channel = serenity::ChannelId::new(id);

        // Deleted channels and guilds the bot has left both fail here.
        match channel.to_channel(&self.http).await {
            Ok(serenity::Channel::Guild(gc)) if gc.is_text_based() => Ok(channel),
            Ok(_) => Err(unavailable("not a guild text channel".to_string())),
            Err(e) => Err(unavailable(e.to_string())),
        }
    }

    async fn send_post(
        &self,
        channel: &serenity::ChannelId,
        post: &NewsPost,
    ) -> Result<(), NewsError> {
        channel
            .send_message(
                &self.http,
                serenity::CreateMessage::new().embed(build_news_embed(post)),
            )
            .await
            .map_err(|e| NewsError::Delivery(e.to_string()))?;
        Ok(())
    }
}

pub fn build_news_embed(post: &NewsPost) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .author(serenity::CreateEmbedAuthor::new(&post.topic_label))
        .title(&post.title)
        .url(&post.url)
        .description(&post.description)
        .color(serenity::Colour::from_rgb(88, 101, 242))
        .footer(serenity::CreateEmbedFooter::new(&post.footer));

    if let Some(image) = &post.image_url {
        embed = embed.image(image);
    }

    embed
}
