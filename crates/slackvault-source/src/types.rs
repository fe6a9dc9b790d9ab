use serde::{Deserialize, Serialize};

/// A Slack channel as returned by `conversations.list`. Only the id is
/// interpreted; everything else rides along in `extra` so the stored
/// payload is the full API object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Value,
}

/// A message from `conversations.history`. The `ts` string doubles as
/// the message's public identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub ts: String,

    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub text: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelVisibility {
    Public,
    Private,
}

impl ChannelVisibility {
    pub fn as_api_types(self) -> &'static str {
        match self {
            Self::Public => "public_channel",
            Self::Private => "private_channel",
        }
    }
}
