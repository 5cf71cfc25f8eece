use reqwest::{multipart, Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body for a text-to-image generation call.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_images: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub version: String,
    pub status: String,
}

pub struct RelayClient {
    client: Client,
    relay_url: String,
}

impl RelayClient {
    pub fn new(relay_url: &str) -> Self {
        Self {
            client: Client::new(),
            relay_url: relay_url.trim_end_matches('/').to_string(),
        }
    }

    /// Check that the relay is up.
    pub async fn health(&self) -> Result<HealthStatus, Box<dyn std::error::Error>> {
        let resp = self
            .client
            .get(format!("{}/health", self.relay_url))
            .send()
            .await?;
        Ok(resp.json().await?)
    }

    /// Generate images from a text prompt.
    pub async fn generate(&self, req: GenerateRequest) -> Result<Value, Box<dyn std::error::Error>> {
        let resp = self
            .client
            .post(format!("{}/api/im-gen", self.relay_url))
            .json(&req)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(format!("Relay returned error status {}: {}", status, text).into());
        }

        Ok(serde_json::from_str(&text)?)
    }

    /// Remove the background from an image.
    pub async fn remove_background(
        &self,
        image: Vec<u8>,
        filename: &str,
        prompt: &str,
    ) -> Result<Value, Box<dyn std::error::Error>> {
        let part = multipart::Part::bytes(image)
            .file_name(filename.to_string())
            .mime_str("image/png")?;
        let form = multipart::Form::new()
            .part("image", part)
            .text("prompt", prompt.to_string());

        let resp = self
            .client
            .post(format!("{}/api/remove-background", self.relay_url))
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(format!("Relay returned error status {}: {}", status, text).into());
        }

        Ok(serde_json::from_str(&text)?)
    }

    /// Forward a GET through the generic proxy.
    pub async fn proxy_get(&self, endpoint: &str) -> Result<Response, reqwest::Error> {
        self.client
            .get(format!("{}/api/proxy", self.relay_url))
            .query(&[("endpoint", endpoint)])
            .send()
            .await
    }

    /// Download a remote image through the relay. Returns the raw bytes.
    pub async fn fetch_image(&self, image_url: &str) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        let resp = self
            .client
            .get(format!("{}/api/proxy-image", self.relay_url))
            .query(&[("url", image_url)])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await?;
            return Err(format!("Relay returned error status {}: {}", status, text).into());
        }

        Ok(resp.bytes().await?.to_vec())
    }
}
