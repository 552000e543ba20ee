use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::ImageHostConfig;

/// Reference to an image stored on the image host, as kept on items and categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub public_id: String,
    pub url: String,
}

/// External media API used for listing and category pictures.
#[async_trait]
pub trait ImageHost: Send + Sync + std::fmt::Debug {
    /// Upload a base64 data URI under `public_id`.
    async fn upload(&self, data_uri: &str, public_id: &str) -> anyhow::Result<UploadedImage>;

    /// Remove a previously uploaded image.
    async fn destroy(&self, public_id: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Cloudinary-compatible [`ImageHost`] using signed REST calls.
#[derive(Debug, Clone)]
pub struct CloudinaryImageHost {
    http: reqwest::Client,
    config: ImageHostConfig,
}

impl CloudinaryImageHost {
    #[must_use]
    pub const fn new(http: reqwest::Client, config: ImageHostConfig) -> Self {
        Self { http, config }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/{}/{action}",
            self.config.base_url.trim_end_matches('/'),
            self.config.cloud_name
        )
    }

    /// Build the signed form: caller params plus `api_key`, `timestamp` and `signature`.
    fn signed_form(&self, mut params: Vec<(&'static str, String)>) -> Vec<(&'static str, String)> {
        params.push(("timestamp", chrono::Utc::now().timestamp().to_string()));
        let signature = sign(&params, &self.config.api_secret);
        params.push(("api_key", self.config.api_key.clone()));
        params.push(("signature_algorithm", "sha256".to_string()));
        params.push(("signature", signature));
        params
    }
}

/// Sign `params` the way the media API expects: sorted `key=value` pairs
/// joined with `&`, immediately followed by the secret, SHA-256 hex.
fn sign(params: &[(&str, String)], secret: &str) -> String {
    let mut sorted: Vec<_> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let payload = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl ImageHost for CloudinaryImageHost {
    async fn upload(&self, data_uri: &str, public_id: &str) -> anyhow::Result<UploadedImage> {
        let mut form = self.signed_form(vec![("public_id", public_id.to_string())]);
        form.push(("file", data_uri.to_string()));

        let resp = self
            .http
            .post(self.endpoint("auto/upload"))
            .form(&form)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to reach image host: {e}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Image upload failed ({status}): {body}"));
        }

        let uploaded = resp
            .json::<UploadResponse>()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse image upload response: {e}"))?;

        Ok(UploadedImage {
            public_id: uploaded.public_id,
            url: uploaded.secure_url,
        })
    }

    async fn destroy(&self, public_id: &str) -> anyhow::Result<()> {
        let form = self.signed_form(vec![("public_id", public_id.to_string())]);

        let resp = self
            .http
            .post(self.endpoint("image/destroy"))
            .form(&form)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to reach image host: {e}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Image destroy failed ({status}): {body}"));
        }

        let outcome = resp
            .json::<DestroyResponse>()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse image destroy response: {e}"))?;

        if outcome.result != "ok" {
            return Err(anyhow::anyhow!(
                "Image host refused to destroy {public_id}: {}",
                outcome.result
            ));
        }

        Ok(())
    }
}
