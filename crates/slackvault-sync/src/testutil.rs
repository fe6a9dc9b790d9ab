use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use slackvault_blob::BlobStore;
use slackvault_common::{Error, Result};
use slackvault_db::{MigrationRunner, Store};
use slackvault_source::{Channel, ChannelVisibility, ExportSource, Message, User};

/// In-memory store with the shipped baseline schema applied.
pub(crate) fn open_with_schema() -> Store {
    let store = Store::in_memory().expect("store should open");
    let migrations = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    MigrationRunner::new(&store)
        .run(&migrations)
        .expect("baseline migrations should apply");
    store
}

/// Scripted export source for syncer tests.
#[derive(Default)]
pub(crate) struct FakeSource {
    pub channels: Vec<Channel>,
    pub users: Vec<User>,
    pub emojis: HashMap<String, String>,
    pub messages: HashMap<String, Vec<Message>>,
    pub fail_messages_for: Option<String>,
}

impl FakeSource {
    pub fn with_channel(mut self, id: &str, name: &str) -> Self {
        self.channels.push(Channel {
            id: id.to_string(),
            name: Some(name.to_string()),
            extra: serde_json::json!({}),
        });
        self
    }

    pub fn with_user(mut self, id: &str, name: &str) -> Self {
        self.users.push(User {
            id: id.to_string(),
            name: Some(name.to_string()),
            extra: serde_json::json!({}),
        });
        self
    }

    pub fn with_emoji(mut self, name: &str, value: &str) -> Self {
        self.emojis.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_message(mut self, channel_id: &str, ts: &str, text: &str) -> Self {
        self.messages
            .entry(channel_id.to_string())
            .or_default()
            .push(Message {
                ts: ts.to_string(),
                user: None,
                text: Some(text.to_string()),
                extra: serde_json::json!({}),
            });
        self
    }
}

#[async_trait]
impl ExportSource for FakeSource {
    async fn list_channels(&self, _visibility: ChannelVisibility) -> Result<Vec<Channel>> {
        Ok(self.channels.clone())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.users.clone())
    }

    async fn dump_emojis(&self) -> Result<HashMap<String, String>> {
        Ok(self.emojis.clone())
    }

    async fn dump_all_messages(&self, channel_id: &str) -> Result<Vec<Message>> {
        if self.fail_messages_for.as_deref() == Some(channel_id) {
            return Err(Error::Source(format!(
                "history fetch failed for {channel_id}"
            )));
        }
        Ok(self.messages.get(channel_id).cloned().unwrap_or_default())
    }
}

/// Blob store fake: hands out deterministic file ids and remembers what
/// was uploaded; can be told to refuse specific URLs.
#[derive(Default)]
pub(crate) struct FakeBlob {
    pub uploads: Mutex<Vec<String>>,
    pub fail_urls: Vec<String>,
}

#[async_trait]
impl BlobStore for FakeBlob {
    async fn upload_from_url(&self, asset_url: &str) -> Result<String> {
        if self.fail_urls.iter().any(|u| u == asset_url) {
            return Err(Error::Upload(format!("refused upload of {asset_url}")));
        }
        let mut uploads = self.uploads.lock().expect("uploads lock poisoned");
        uploads.push(asset_url.to_string());
        Ok(format!("fid-{}", uploads.len()))
    }
}
