//! The chat panel controller: send and upload flows.

use std::fmt;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{debug, info, warn};

use super::{FilePicker, MessageInput, MessageRenderer, Notifier, PanelHandles};
use crate::error::Result;
use crate::transport::ChatTransport;
use crate::types::Sender;

/// Alert raised when an upload is requested with nothing selected.
pub const SELECT_FILE_ALERT: &str = "Select a file";

/// Bot message rendered when the server rejects an upload.
pub const UPLOAD_FAILED_MESSAGE: &str = "Upload failed";

/// The network half of a flow, detached from the panel.
pub type FlowFuture = BoxFuture<'static, Result<()>>;

/// `me` message confirming a stored upload.
pub fn uploaded_message(filename: &str) -> String {
    format!("Uploaded image: {filename}")
}

/// `bot` hint telling the user how to ask about an uploaded image.
pub fn image_question_hint(filename: &str) -> String {
    format!("To ask about this image, type: img:{filename} Your question")
}

/// Chat panel controller.
///
/// Both flows do their local work (reading the input, echoing, checking the
/// selection) as soon as they are called, and return the remaining network
/// round-trip as a [`FlowFuture`]. Flows are independent: nothing serializes
/// them, and each reply is rendered when its response arrives.
#[derive(Clone)]
pub struct ChatPanel {
    input: Arc<dyn MessageInput>,
    renderer: MessageRenderer,
    file_input: Arc<dyn FilePicker>,
    notifier: Arc<dyn Notifier>,
    transport: Arc<dyn ChatTransport>,
}

impl fmt::Debug for ChatPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatPanel")
            .field("renderer", &self.renderer)
            .finish_non_exhaustive()
    }
}

impl ChatPanel {
    pub fn new(handles: PanelHandles, transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            input: handles.input,
            renderer: MessageRenderer::new(handles.chat),
            file_input: handles.file_input,
            notifier: handles.notifier,
            transport,
        }
    }

    pub fn renderer(&self) -> &MessageRenderer {
        &self.renderer
    }

    /// Send the input's text.
    ///
    /// Whitespace-only input does nothing. Otherwise the trimmed text is
    /// echoed as a `me` bubble and the input cleared before this returns;
    /// the returned future posts it and renders the reply as a `bot` bubble.
    /// Transport and parse errors come back from the future untouched.
    pub fn send(&self) -> FlowFuture {
        let text = self.input.value().trim().to_string();
        if text.is_empty() {
            return futures::future::ok(()).boxed();
        }

        self.renderer.append_message(Sender::Me, text.clone());
        self.input.set_value("");

        let transport = Arc::clone(&self.transport);
        let renderer = self.renderer.clone();
        async move {
            debug!(
                name: "chat.send.started",
                chars = text.chars().count(),
                "Sending chat message"
            );
            let reply = transport.send_text(&text).await?;
            debug!(name: "chat.reply.received", "Chat reply received");
            renderer.append_message(Sender::Bot, reply.reply);
            Ok(())
        }
        .boxed()
    }

    /// Upload the first selected file.
    ///
    /// With nothing selected an alert is raised and no request is made.
    /// Otherwise the returned future uploads the file and renders either
    /// the confirmation and usage hint, or a single failure bubble.
    pub fn upload_file(&self) -> FlowFuture {
        let Some(file) = self.file_input.files().into_iter().next() else {
            self.notifier.alert(SELECT_FILE_ALERT);
            return futures::future::ok(()).boxed();
        };

        let transport = Arc::clone(&self.transport);
        let renderer = self.renderer.clone();
        async move {
            info!(
                name: "upload.started",
                filename = %file.name,
                size = file.size(),
                "Uploading file"
            );
            let result = transport.upload(file).await?;
            if result.ok {
                // Missing name renders empty, never as a placeholder word.
                let filename = result.filename.unwrap_or_default();
                info!(
                    name: "upload.completed",
                    filename = %filename,
                    url = result.url.as_deref().unwrap_or(""),
                    "Upload stored"
                );
                renderer.append_message(Sender::Me, uploaded_message(&filename));
                renderer.append_message(Sender::Bot, image_question_hint(&filename));
            } else {
                warn!(
                    name: "upload.rejected",
                    error = result.error.as_deref().unwrap_or("unknown"),
                    "Upload rejected by server"
                );
                renderer.append_message(Sender::Bot, UPLOAD_FAILED_MESSAGE);
            }
            Ok(())
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::memory::MemoryPanel;
    use crate::types::{ChatReply, Message, SelectedFile, UploadResult};
    use async_trait::async_trait;

    struct FixedTransport;

    #[async_trait]
    impl ChatTransport for FixedTransport {
        async fn send_text(&self, text: &str) -> Result<ChatReply> {
            Ok(ChatReply {
                reply: format!("you said {text}"),
            })
        }

        async fn upload(&self, _file: SelectedFile) -> Result<UploadResult> {
            Ok(UploadResult {
                ok: true,
                filename: None,
                ..UploadResult::default()
            })
        }
    }

    #[test]
    fn test_message_templates() {
        assert_eq!(uploaded_message("cat.png"), "Uploaded image: cat.png");
        assert_eq!(
            image_question_hint("cat.png"),
            "To ask about this image, type: img:cat.png Your question"
        );
    }

    #[tokio::test]
    async fn test_echo_happens_before_future_is_polled() {
        let handles = MemoryPanel::new();
        let panel = ChatPanel::new(handles.handles(), Arc::new(FixedTransport));
        handles.input.set_value("  hi  ");

        let flow = panel.send();
        assert_eq!(handles.chat.messages(), vec![Message::me("hi")]);
        assert_eq!(handles.input.value(), "");

        flow.await.unwrap();
        assert_eq!(
            handles.chat.messages(),
            vec![Message::me("hi"), Message::bot("you said hi")]
        );
    }

    #[tokio::test]
    async fn test_missing_filename_renders_empty() {
        let handles = MemoryPanel::new();
        let panel = ChatPanel::new(handles.handles(), Arc::new(FixedTransport));
        handles.file_input.select(SelectedFile::new("x.png", vec![0]));

        panel.upload_file().await.unwrap();
        assert_eq!(
            handles.chat.messages(),
            vec![
                Message::me("Uploaded image: "),
                Message::bot("To ask about this image, type: img: Your question"),
            ]
        );
    }
}
