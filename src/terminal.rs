//! Line-oriented terminal host for the chat panel.
//!
//! Each line read from the input either becomes a chat message or a command.
//! Flows are spawned as independent tasks, so a new line can be entered
//! while earlier requests are still pending; their bubbles print in the
//! order responses arrive.

use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::{JoinError, JoinSet};
use tracing::{error, info, warn};

use crate::error::Result;
use crate::panel::memory::{MemoryFilePicker, MemoryInput};
use crate::panel::{Bubble, ChatContainer, ChatPanel, FlowFuture, MessageInput, Notifier};
use crate::types::SelectedFile;

pub const HELP_TEXT: &str = "\
Type a message and press enter to send it.
  /upload <path>   upload an image
  /help            show this help
  /quit            exit once pending replies arrive";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text for the message input.
    Send(String),
    /// Select a file (or clear the selection) and upload it.
    Upload(Option<PathBuf>),
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed.split_once(char::is_whitespace) {
            Some(("/upload", path)) => Self::Upload(Some(PathBuf::from(path.trim()))),
            _ => match trimmed {
                "/upload" => Self::Upload(None),
                "/help" => Self::Help,
                "/quit" | "/exit" => Self::Quit,
                _ => Self::Send(line.to_string()),
            },
        }
    }
}

/// Chat container that prints each bubble as a line.
#[derive(Debug)]
pub struct TerminalTranscript<W> {
    out: Mutex<W>,
    rows: RwLock<u64>,
    scroll_top: RwLock<u64>,
}

impl TerminalTranscript<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> TerminalTranscript<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            rows: RwLock::new(0),
            scroll_top: RwLock::new(0),
        }
    }

    pub fn scroll_top(&self) -> u64 {
        *self.scroll_top.read().unwrap()
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap()
    }
}

impl<W: Write + Send> ChatContainer for TerminalTranscript<W> {
    fn append_child(&self, bubble: Bubble) {
        let mut out = self.out.lock().unwrap();
        if let Err(e) = writeln!(out, "{bubble}").and_then(|()| out.flush()) {
            warn!(name: "terminal.write_failed", error = %e, "Failed to print bubble");
        }
        *self.rows.write().unwrap() += 1;
    }

    fn scroll_height(&self) -> u64 {
        *self.rows.read().unwrap()
    }

    fn set_scroll_top(&self, top: u64) {
        // The terminal follows its own output; only the offset is tracked.
        *self.scroll_top.write().unwrap() = top;
    }
}

/// Alerts printed to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn alert(&self, message: &str) {
        eprintln!("! {message}");
    }
}

/// Drives a [`ChatPanel`] from lines of text.
#[derive(Debug)]
pub struct TerminalHost {
    panel: ChatPanel,
    input: Arc<MemoryInput>,
    file_input: Arc<MemoryFilePicker>,
    flows: JoinSet<()>,
}

impl TerminalHost {
    /// `input` and `file_input` must be the handles `panel` was built with.
    pub fn new(
        panel: ChatPanel,
        input: Arc<MemoryInput>,
        file_input: Arc<MemoryFilePicker>,
    ) -> Self {
        Self {
            panel,
            input,
            file_input,
            flows: JoinSet::new(),
        }
    }

    /// Read lines until `/quit` or EOF, then wait for pending flows.
    pub async fn run<R>(&mut self, reader: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            self.reap_finished();
            match Command::parse(&line) {
                Command::Send(text) => {
                    self.input.set_value(&text);
                    self.spawn_flow("send", self.panel.send());
                }
                Command::Upload(path) => {
                    if self.select(path).await {
                        self.spawn_flow("upload", self.panel.upload_file());
                    }
                }
                Command::Help => println!("{HELP_TEXT}"),
                Command::Quit => break,
            }
        }
        self.drain().await;
        Ok(())
    }

    /// Update the file selection. Returns false if the file can't be read.
    async fn select(&self, path: Option<PathBuf>) -> bool {
        let Some(path) = path else {
            self.file_input.clear();
            return true;
        };
        match SelectedFile::from_path(&path).await {
            Ok(file) => {
                self.file_input.select(file);
                true
            }
            Err(e) => {
                error!(
                    name: "terminal.select_failed",
                    path = %path.display(),
                    error = %e,
                    "Could not read file for upload"
                );
                false
            }
        }
    }

    fn spawn_flow(&mut self, flow: &'static str, fut: FlowFuture) {
        self.flows.spawn(async move {
            if let Err(e) = fut.await {
                error!(
                    name: "flow.unhandled_error",
                    flow,
                    error = %e,
                    "Unhandled chat flow failure"
                );
            }
        });
    }

    /// Number of spawned flows not yet reaped.
    pub fn pending_flows(&self) -> usize {
        self.flows.len()
    }

    /// Collect flows that already finished without waiting on the rest.
    pub fn reap_finished(&mut self) {
        while let Some(joined) = self.flows.try_join_next() {
            log_join_failure(joined);
        }
    }

    /// Wait for every spawned flow to finish.
    pub async fn drain(&mut self) {
        let pending = self.flows.len();
        if pending > 0 {
            info!(name: "terminal.draining", pending, "Waiting for pending replies");
        }
        while let Some(joined) = self.flows.join_next().await {
            log_join_failure(joined);
        }
    }
}

/// A flow task that panicked or was cancelled never reported through
/// `spawn_flow`, so it is logged here.
fn log_join_failure(joined: std::result::Result<(), JoinError>) {
    if let Err(e) = joined {
        error!(
            name: "flow.unhandled_error",
            panicked = e.is_panic(),
            error = %e,
            "Chat flow task did not complete"
        );
    }
}
