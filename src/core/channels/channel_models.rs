use std::collections::BTreeMap;

/// Guild id -> news channel id. Both ids are kept as opaque strings so the
/// persisted file stays `{"<guild>": "<channel>"}`.
pub type ChannelMap = BTreeMap<String, String>;

/// A guild channel as seen at join time, stripped of any Discord types.
#[derive(Debug, Clone)]
pub struct ChannelCandidate {
    pub id: String,
    pub position: u16,
    pub is_text: bool,
    pub can_post: bool,
}

/// Pick the channel the bot should post news into after joining a guild:
/// the top-most text channel it can both see and write to.
pub fn pick_default_channel(candidates: &[ChannelCandidate]) -> Option<&ChannelCandidate> {
    candidates
        .iter()
        .filter(|c| c.is_text && c.can_post)
        .min_by_key(|c| c.position)
}
