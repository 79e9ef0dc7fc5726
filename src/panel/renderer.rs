//! Message renderer: turns messages into bubbles at the bottom of the panel.

use std::fmt;
use std::sync::{Arc, Mutex};

use super::ChatContainer;
use crate::types::{Message, Sender};

/// Class carried by the inner text span of every bubble.
pub const BUBBLE_CLASS: &str = "bubble";

/// A rendered message: a node classed by sender wrapping a `bubble` span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble {
    message: Message,
}

impl Bubble {
    pub fn new(message: Message) -> Self {
        Self { message }
    }

    /// Outer class name, `me` or `bot`.
    pub fn class_name(&self) -> &'static str {
        self.message.sender.as_str()
    }

    pub fn sender(&self) -> Sender {
        self.message.sender
    }

    pub fn text(&self) -> &str {
        &self.message.text
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn into_message(self) -> Message {
        self.message
    }

    /// Markup for the bubble. The text is escaped so it is shown as-is.
    pub fn to_html(&self) -> String {
        format!(
            r#"<div class="{}"><span class="{BUBBLE_CLASS}">{}</span></div>"#,
            self.class_name(),
            escape_text(self.text())
        )
    }
}

impl fmt::Display for Bubble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.class_name(), self.text())
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Appends bubbles to a container and keeps it scrolled to the newest one.
///
/// Clones share one lock, so an append and its scroll are never split by
/// another render.
#[derive(Clone)]
pub struct MessageRenderer {
    container: Arc<dyn ChatContainer>,
    render_lock: Arc<Mutex<()>>,
}

impl fmt::Debug for MessageRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageRenderer").finish_non_exhaustive()
    }
}

impl MessageRenderer {
    pub fn new(container: Arc<dyn ChatContainer>) -> Self {
        Self {
            container,
            render_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Append a bubble for `text` and scroll to the bottom.
    ///
    /// Empty text is rendered like any other.
    pub fn append_message(&self, sender: Sender, text: impl Into<String>) {
        let bubble = Bubble::new(Message::new(sender, text));
        let _guard = self
            .render_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        self.container.append_child(bubble);
        self.container.set_scroll_top(self.container.scroll_height());
    }
}
