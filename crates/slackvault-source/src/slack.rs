use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use slackvault_common::{Error, Result};
use tracing::debug;

use crate::traits::ExportSource;
use crate::types::{Channel, ChannelVisibility, Message, User};

const DEFAULT_API_BASE: &str = "https://slack.com/api";
const PAGE_LIMIT: u32 = 200;

/// Export client for a Slack workspace, authenticated with a session
/// token plus its paired browser cookie.
pub struct SlackClient {
    client: Client,
    api_base: String,
    token: String,
    cookie: String,
}

#[derive(Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Deserialize)]
struct ChannelListResponse {
    ok: bool,
    error: Option<String>,
    #[serde(default)]
    channels: Vec<Channel>,
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Deserialize)]
struct UserListResponse {
    ok: bool,
    error: Option<String>,
    #[serde(default)]
    members: Vec<User>,
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Deserialize)]
struct EmojiListResponse {
    ok: bool,
    error: Option<String>,
    #[serde(default)]
    emoji: HashMap<String, String>,
}

#[derive(Deserialize)]
struct HistoryResponse {
    ok: bool,
    error: Option<String>,
    #[serde(default)]
    messages: Vec<Message>,
    response_metadata: Option<ResponseMetadata>,
}

impl SlackClient {
    pub fn new(token: impl Into<String>, cookie: impl Into<String>) -> Self {
        Self::with_api_base(DEFAULT_API_BASE, token, cookie)
    }

    pub fn with_api_base(
        api_base: impl Into<String>,
        token: impl Into<String>,
        cookie: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into(),
            token: token.into(),
            cookie: cookie.into(),
        }
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let resp = self
            .client
            .get(format!("{}/{method}", self.api_base))
            .bearer_auth(&self.token)
            .header("Cookie", format!("d={}", self.cookie))
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Source(format!("{method} request failed: {e}")))?;

        resp.json()
            .await
            .map_err(|e| Error::Source(format!("{method} parse failed: {e}")))
    }
}

fn api_error(method: &str, error: Option<String>) -> Error {
    let err = error.unwrap_or_else(|| "unknown".to_string());
    Error::Source(format!("{method} error: {err}"))
}

fn next_cursor(metadata: Option<ResponseMetadata>) -> Option<String> {
    metadata
        .and_then(|m| m.next_cursor)
        .filter(|c| !c.is_empty())
}

#[async_trait]
impl ExportSource for SlackClient {
    async fn list_channels(&self, visibility: ChannelVisibility) -> Result<Vec<Channel>> {
        let limit = PAGE_LIMIT.to_string();
        let mut channels = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut query = vec![
                ("types", visibility.as_api_types()),
                ("limit", limit.as_str()),
            ];
            if let Some(c) = cursor.as_deref() {
                query.push(("cursor", c));
            }

            let body: ChannelListResponse = self.call("conversations.list", &query).await?;
            if !body.ok {
                return Err(api_error("conversations.list", body.error));
            }

            channels.extend(body.channels);
            cursor = next_cursor(body.response_metadata);
            if cursor.is_none() {
                break;
            }
        }

        debug!("fetched {} channels", channels.len());
        Ok(channels)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let limit = PAGE_LIMIT.to_string();
        let mut users = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut query = vec![("limit", limit.as_str())];
            if let Some(c) = cursor.as_deref() {
                query.push(("cursor", c));
            }

            let body: UserListResponse = self.call("users.list", &query).await?;
            if !body.ok {
                return Err(api_error("users.list", body.error));
            }

            users.extend(body.members);
            cursor = next_cursor(body.response_metadata);
            if cursor.is_none() {
                break;
            }
        }

        debug!("fetched {} users", users.len());
        Ok(users)
    }

    async fn dump_emojis(&self) -> Result<HashMap<String, String>> {
        let body: EmojiListResponse = self.call("emoji.list", &[]).await?;
        if !body.ok {
            return Err(api_error("emoji.list", body.error));
        }

        debug!("fetched {} emoji", body.emoji.len());
        Ok(body.emoji)
    }

    async fn dump_all_messages(&self, channel_id: &str) -> Result<Vec<Message>> {
        let limit = PAGE_LIMIT.to_string();
        let mut messages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut query = vec![("channel", channel_id), ("limit", limit.as_str())];
            if let Some(c) = cursor.as_deref() {
                query.push(("cursor", c));
            }

            let body: HistoryResponse = self.call("conversations.history", &query).await?;
            if !body.ok {
                return Err(api_error("conversations.history", body.error));
            }

            messages.extend(body.messages);
            cursor = next_cursor(body.response_metadata);
            if cursor.is_none() {
                break;
            }
        }

        debug!("fetched {} messages for {channel_id}", messages.len());
        Ok(messages)
    }
}
