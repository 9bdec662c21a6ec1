/// Cached public profile of the monitored bot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BotIdentity {
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub avatar_url: Option<String>,
    /// Epoch milliseconds; only moves forward after the collector accepted a patch.
    pub profile_last_updated_at: Option<i64>,
}
