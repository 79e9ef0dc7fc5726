//! Messages and the wire types exchanged with the chat server.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

// =============================================================================
// Panel Messages
// =============================================================================

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Typed locally by the user.
    Me,
    /// Produced by the server.
    Bot,
}

impl Sender {
    /// Lowercase label, also used as the bubble class.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Me => "me",
            Self::Bot => "bot",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single chat message. Text is shown verbatim, never as markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
}

impl Message {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
        }
    }

    pub fn me(text: impl Into<String>) -> Self {
        Self::new(Sender::Me, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text)
    }
}

// =============================================================================
// Chat Endpoint
// =============================================================================

/// Body of `POST /webchat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Reply from `POST /webchat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

// =============================================================================
// Upload Endpoint
// =============================================================================

/// Reply from `POST /upload`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadResult {
    /// Whether the server stored the file.
    pub ok: bool,
    /// Stored filename, present when `ok` is true.
    #[serde(default)]
    pub filename: Option<String>,
    /// Public URL of the stored file.
    #[serde(default)]
    pub url: Option<String>,
    /// Server-side reason for a failed upload.
    #[serde(default)]
    pub error: Option<String>,
}

/// A file chosen in a file picker, ready to be sent as a multipart part.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    /// Wrap in-memory bytes; the content type is guessed from the name.
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let name = name.into();
        let content_type = mime_guess::from_path(&name)
            .first_or_octet_stream()
            .to_string();
        Self {
            name,
            content_type,
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk. The upload name is the path's last component.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path.file_name().map_or_else(
            || path.display().to_string(),
            |n| n.to_string_lossy().into_owned(),
        );
        Ok(Self::new(name, bytes))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}
