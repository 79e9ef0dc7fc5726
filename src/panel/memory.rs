//! In-memory panel handles.
//!
//! Used by the test suite and by hosts that own their own I/O loop (the
//! terminal host keeps its input line and file selection here).

use std::sync::{Arc, RwLock};

use super::{Bubble, ChatContainer, FilePicker, MessageInput, Notifier, PanelHandles};
use crate::types::{Message, SelectedFile};

/// Text field backed by a string.
#[derive(Debug, Default)]
pub struct MemoryInput {
    value: RwLock<String>,
}

impl MemoryInput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MessageInput for MemoryInput {
    fn value(&self) -> String {
        self.value.read().unwrap().clone()
    }

    fn set_value(&self, value: &str) {
        *self.value.write().unwrap() = value.to_string();
    }
}

/// Chat container that keeps its bubbles and a scroll offset.
///
/// Each bubble is as tall as its number of text lines (at least one).
#[derive(Debug, Default)]
pub struct MemoryContainer {
    bubbles: RwLock<Vec<Bubble>>,
    scroll_top: RwLock<u64>,
}

impl MemoryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bubbles(&self) -> Vec<Bubble> {
        self.bubbles.read().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.bubbles
            .read()
            .unwrap()
            .iter()
            .map(|b| b.message().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bubbles.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn scroll_top(&self) -> u64 {
        *self.scroll_top.read().unwrap()
    }

    pub fn is_scrolled_to_bottom(&self) -> bool {
        self.scroll_top() >= self.scroll_height()
    }
}

impl ChatContainer for MemoryContainer {
    fn append_child(&self, bubble: Bubble) {
        self.bubbles.write().unwrap().push(bubble);
    }

    fn scroll_height(&self) -> u64 {
        self.bubbles
            .read()
            .unwrap()
            .iter()
            .map(|b| b.text().lines().count().max(1) as u64)
            .sum()
    }

    fn set_scroll_top(&self, top: u64) {
        let max = self.scroll_height();
        *self.scroll_top.write().unwrap() = top.min(max);
    }
}

/// File picker holding already-loaded files.
#[derive(Debug, Default)]
pub struct MemoryFilePicker {
    files: RwLock<Vec<SelectedFile>>,
}

impl MemoryFilePicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection with a single file.
    pub fn select(&self, file: SelectedFile) {
        *self.files.write().unwrap() = vec![file];
    }

    pub fn select_many(&self, files: Vec<SelectedFile>) {
        *self.files.write().unwrap() = files;
    }

    pub fn clear(&self) {
        self.files.write().unwrap().clear();
    }
}

impl FilePicker for MemoryFilePicker {
    fn files(&self) -> Vec<SelectedFile> {
        self.files.read().unwrap().clone()
    }
}

/// Notifier that records every alert.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    alerts: RwLock<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.read().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.alerts.write().unwrap().push(message.to_string());
    }
}

/// A full set of in-memory handles, kept typed so they can be inspected.
#[derive(Debug, Clone, Default)]
pub struct MemoryPanel {
    pub input: Arc<MemoryInput>,
    pub chat: Arc<MemoryContainer>,
    pub file_input: Arc<MemoryFilePicker>,
    pub notifier: Arc<RecordingNotifier>,
}

impl MemoryPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handles(&self) -> PanelHandles {
        PanelHandles {
            input: Arc::clone(&self.input) as Arc<dyn MessageInput>,
            chat: Arc::clone(&self.chat) as Arc<dyn ChatContainer>,
            file_input: Arc::clone(&self.file_input) as Arc<dyn FilePicker>,
            notifier: Arc::clone(&self.notifier) as Arc<dyn Notifier>,
        }
    }
}
