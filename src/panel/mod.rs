//! Chat panel controller and the handles it renders into.
//!
//! The controller never looks anything up by itself: the message input, the
//! chat container, the file picker and the alert surface are passed in as
//! trait objects when the panel is built. A terminal, a test harness or a
//! browser binding each provide their own implementations.
//!
//! # Structure
//!
//! - [`renderer`]: [`MessageRenderer`] and the [`Bubble`] node it appends
//! - [`controller`]: [`ChatPanel`] with the send and upload flows
//! - [`memory`]: in-memory handles for tests and line-oriented hosts
//!
//! # Example
//!
//! ```rust
//! use webchat_panel::panel::{MessageRenderer, memory::MemoryContainer};
//! use webchat_panel::Sender;
//! use std::sync::Arc;
//!
//! let chat = Arc::new(MemoryContainer::new());
//! let renderer = MessageRenderer::new(chat.clone());
//! renderer.append_message(Sender::Me, "Hello!");
//!
//! assert_eq!(chat.messages().len(), 1);
//! assert!(chat.is_scrolled_to_bottom());
//! ```

pub mod controller;
pub mod memory;
pub mod renderer;

use std::fmt;
use std::sync::Arc;

pub use controller::{ChatPanel, FlowFuture};
pub use renderer::{Bubble, MessageRenderer};

use crate::types::SelectedFile;

/// Text field the user types into.
pub trait MessageInput: Send + Sync {
    /// Current raw value, untrimmed.
    fn value(&self) -> String;

    fn set_value(&self, value: &str);
}

/// Scrollable list of bubbles. Only ever appended to.
pub trait ChatContainer: Send + Sync {
    /// Append `bubble` as the last child.
    fn append_child(&self, bubble: Bubble);

    /// Total scrollable height of the content.
    fn scroll_height(&self) -> u64;

    fn set_scroll_top(&self, top: u64);
}

/// File selector. May hold several files; only the first is uploaded.
pub trait FilePicker: Send + Sync {
    fn files(&self) -> Vec<SelectedFile>;
}

/// Blocking, user-facing alert.
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

/// The handles a [`ChatPanel`] is built from.
#[derive(Clone)]
pub struct PanelHandles {
    pub input: Arc<dyn MessageInput>,
    pub chat: Arc<dyn ChatContainer>,
    pub file_input: Arc<dyn FilePicker>,
    pub notifier: Arc<dyn Notifier>,
}

impl fmt::Debug for PanelHandles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelHandles").finish_non_exhaustive()
    }
}
