//! Transport between the panel and the chat server.
//!
//! [`ChatTransport`] is the seam the controller calls; [`HttpTransport`] is
//! the reqwest implementation that speaks the server's JSON and multipart
//! endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::types::{ChatReply, ChatRequest, SelectedFile, UploadResult};

/// Default path of the chat endpoint.
pub const DEFAULT_CHAT_PATH: &str = "/webchat";

/// Default path of the upload endpoint.
pub const DEFAULT_UPLOAD_PATH: &str = "/upload";

/// Multipart field name the server reads the upload from.
pub const UPLOAD_FIELD: &str = "file";

/// Network operations the panel depends on.
///
/// Single attempt, no retries: errors go straight back to the caller.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send typed text and return the server's reply.
    async fn send_text(&self, text: &str) -> Result<ChatReply>;

    /// Upload one file as multipart form data.
    async fn upload(&self, file: SelectedFile) -> Result<UploadResult>;
}

/// HTTP transport backed by reqwest.
///
/// # Example
///
/// ```rust,no_run
/// use webchat_panel::transport::{ChatTransport, HttpTransport};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = HttpTransport::new("http://localhost:8080")?;
/// let reply = transport.send_text("Hello!").await?;
/// println!("{}", reply.reply);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    chat_url: Url,
    upload_url: Url,
}

impl HttpTransport {
    /// Create a transport using the default endpoint paths.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_paths(
            base_url,
            DEFAULT_CHAT_PATH,
            DEFAULT_UPLOAD_PATH,
            reqwest::Client::new(),
        )
    }

    /// Create a transport with custom endpoint paths and reqwest client.
    pub fn with_paths(
        base_url: impl AsRef<str>,
        chat_path: &str,
        upload_path: &str,
        http: reqwest::Client,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "base URL cannot carry endpoint paths: {base_url}"
            )));
        }
        Ok(Self {
            http,
            chat_url: base_url.join(chat_path)?,
            upload_url: base_url.join(upload_path)?,
        })
    }

    /// Build a transport from loaded configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.client.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Self::with_paths(
            &config.server.base_url,
            &config.server.chat_path,
            &config.server.upload_path,
            builder.build()?,
        )
    }

    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }

    pub fn upload_url(&self) -> &Url {
        &self.upload_url
    }

    /// Parse the body as JSON whatever the status, like `fetch().json()`.
    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            warn!(
                name: "transport.response.status",
                status = status.as_u16(),
                url = %response.url(),
                "Non-success status, parsing body anyway"
            );
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send_text(&self, text: &str) -> Result<ChatReply> {
        let req = ChatRequest {
            text: text.to_string(),
        };
        debug!(name: "transport.chat.request", url = %self.chat_url, "POST chat text");
        let response = self
            .http
            .post(self.chat_url.clone())
            .json(&req)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn upload(&self, file: SelectedFile) -> Result<UploadResult> {
        debug!(
            name: "transport.upload.request",
            url = %self.upload_url,
            filename = %file.name,
            size = file.size(),
            "POST multipart upload"
        );
        let part = Part::bytes(file.bytes)
            .file_name(file.name)
            .mime_str(&file.content_type)?;
        let form = Form::new().part(UPLOAD_FIELD, part);
        let response = self
            .http
            .post(self.upload_url.clone())
            .multipart(form)
            .send()
            .await?;
        Self::read_json(response).await
    }
}
