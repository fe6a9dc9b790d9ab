pub mod channels;
pub mod emojis;
pub mod messages;
pub mod report;
pub mod users;

#[cfg(test)]
pub(crate) mod testutil;

pub use channels::sync_channels;
pub use emojis::sync_emojis;
pub use messages::{sync_channel_messages, sync_messages};
pub use report::{ChannelMessageOutcome, MessageReport, PhaseReport};
pub use users::sync_users;
