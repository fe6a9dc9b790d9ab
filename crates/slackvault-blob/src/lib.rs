use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use slackvault_common::{Error, Result};
use tracing::debug;

/// Sink for binary assets pulled from the export source. The production
/// implementation is [`SeaweedClient`]; tests substitute fakes.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Download `asset_url` and store it, returning the storage id
    /// under which the bytes were filed.
    async fn upload_from_url(&self, asset_url: &str) -> Result<String>;
}

/// SeaweedFS upload client: ask the master for a file id and volume,
/// fetch the asset, then post it to the assigned volume.
pub struct SeaweedClient {
    client: Client,
    master_url: String,
}

#[derive(Deserialize)]
struct AssignResponse {
    fid: String,
    url: String,
}

impl SeaweedClient {
    pub fn new(master_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            master_url: master_url.into(),
        }
    }
}

#[async_trait]
impl BlobStore for SeaweedClient {
    async fn upload_from_url(&self, asset_url: &str) -> Result<String> {
        let assign_resp = self
            .client
            .get(format!("{}/dir/assign", self.master_url))
            .send()
            .await
            .map_err(|e| Error::Upload(format!("assign request failed: {e}")))?;

        // The master hands out a short-lived JWT for the volume write.
        let jwt = assign_resp
            .headers()
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let assign: AssignResponse = assign_resp
            .json()
            .await
            .map_err(|e| Error::Upload(format!("assign parse failed: {e}")))?;

        let asset = self
            .client
            .get(asset_url)
            .send()
            .await
            .map_err(|e| Error::Upload(format!("asset download failed: {e}")))?;
        if !asset.status().is_success() {
            return Err(Error::Upload(format!(
                "asset download failed with status {}",
                asset.status()
            )));
        }
        let bytes = asset
            .bytes()
            .await
            .map_err(|e| Error::Upload(format!("asset read failed: {e}")))?;

        let form = reqwest::multipart::Form::new().part(
            "file",
            reqwest::multipart::Part::bytes(bytes.to_vec()).file_name("image"),
        );

        let mut upload = self
            .client
            .post(format!("{}/{}", volume_base(&assign.url), assign.fid))
            .multipart(form);
        if let Some(jwt) = jwt {
            upload = upload.header("Authorization", jwt);
        }

        let upload_resp = upload
            .send()
            .await
            .map_err(|e| Error::Upload(format!("volume upload failed: {e}")))?;

        if upload_resp.status() != reqwest::StatusCode::CREATED {
            return Err(Error::Upload(format!(
                "volume upload failed with status {}",
                upload_resp.status()
            )));
        }

        debug!("uploaded {asset_url} as {}", assign.fid);
        Ok(assign.fid)
    }
}

// The master reports the volume as host:port; older releases omit the
// scheme entirely.
fn volume_base(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("http://{url}")
    }
}
