//! Webchat panel
//!
//! A chat panel controller that echoes what the user types, posts it to a
//! chat server and renders the JSON reply, and uploads images as multipart
//! form data, answering with a hint on how to ask about them.
//!
//! # Architecture
//!
//! - **Panel**: [`panel::ChatPanel`] owns the send and upload flows and
//!   renders through injected handles (input, container, file picker, alert)
//! - **Transport**: [`transport::ChatTransport`] seam with a reqwest
//!   implementation for `POST /webchat` and `POST /upload`
//! - **Terminal host**: [`terminal::TerminalHost`] drives the panel from
//!   stdin lines
//!
//! # Modules
//!
//! - [`config`]: CLI, environment and file configuration
//! - [`error`]: error type shared by the flows and transport
//! - [`panel`]: controller, renderer and in-memory handles
//! - [`terminal`]: line-oriented host
//! - [`transport`]: HTTP transport
//! - [`types`]: messages and wire types

pub mod config;
pub mod error;
pub mod panel;
pub mod terminal;
pub mod transport;
pub mod types;

pub use error::{Error, Result};
pub use panel::{ChatPanel, PanelHandles};
pub use transport::{ChatTransport, HttpTransport};
pub use types::{ChatReply, ChatRequest, Message, SelectedFile, Sender, UploadResult};
