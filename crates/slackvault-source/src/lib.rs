pub mod slack;
pub mod traits;
pub mod types;

pub use slack::SlackClient;
pub use traits::ExportSource;
pub use types::{Channel, ChannelVisibility, Message, User};
