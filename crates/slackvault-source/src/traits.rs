use std::collections::HashMap;

use async_trait::async_trait;
use slackvault_common::Result;

use crate::types::{Channel, ChannelVisibility, Message, User};

/// The export-source boundary the syncers are written against. The
/// production implementation is [`crate::SlackClient`]; tests substitute
/// in-memory fakes.
#[async_trait]
pub trait ExportSource: Send + Sync {
    async fn list_channels(&self, visibility: ChannelVisibility) -> Result<Vec<Channel>>;

    async fn list_users(&self) -> Result<Vec<User>>;

    /// Emoji name to either a direct asset URL or an `alias:<target>`
    /// marker, exactly as the API reports it.
    async fn dump_emojis(&self) -> Result<HashMap<String, String>>;

    /// Full message history for one channel.
    async fn dump_all_messages(&self, channel_id: &str) -> Result<Vec<Message>>;
}
