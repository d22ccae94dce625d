pub mod news_sink;
pub mod news_task;

pub use news_sink::DiscordNewsSink;
pub use news_task::spawn_news_task;
