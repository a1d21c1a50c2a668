//! Terminal presenter.
//!
//! Status banners go to stderr as they happen. The list is kept and printed
//! by the command once the session is done with it.

use async_trait::async_trait;
use snipstash_core::view::{Field, ListView, View};
use snipstash_core::{ConnectionState, Status};
use std::io::{self, BufRead, Write};
use std::sync::Mutex;
use tracing::{debug, trace};

pub struct TerminalView {
    /// Answer every confirmation with yes.
    assume_yes: bool,
    connection: Mutex<ConnectionState>,
    list: Mutex<ListView>,
}

impl TerminalView {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            connection: Mutex::new(ConnectionState::Unknown),
            list: Mutex::new(ListView::Blank),
        }
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    /// The list as last rendered.
    pub fn list(&self) -> ListView {
        self.list.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl View for TerminalView {
    fn set_connection(&self, state: &ConnectionState) {
        debug!(state = state.label(), "Connection state");
        if let Ok(mut connection) = self.connection.lock() {
            *connection = state.clone();
        }
    }

    fn set_submit_enabled(&self, enabled: bool) {
        trace!(enabled, "Submit control");
    }

    fn show_status(&self, status: &Status) {
        eprintln!(
            "[{}] {}: {}",
            status.kind.as_str(),
            status.title,
            status.message
        );
    }

    fn hide_status(&self) {}

    fn render_list(&self, list: &ListView) {
        if let Ok(mut current) = self.list.lock() {
            *current = list.clone();
        }
    }

    fn clear_code(&self) {}

    fn focus(&self, field: Field) {
        trace!(?field, "Focus");
    }

    async fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        let prompt = prompt.to_string();
        tokio::task::spawn_blocking(move || {
            eprint!("{prompt} [y/N] ");
            let _ = io::stderr().flush();
            let mut answer = String::new();
            match io::stdin().lock().read_line(&mut answer) {
                Ok(_) => is_yes(&answer),
                Err(_) => false,
            }
        })
        .await
        .unwrap_or(false)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Plain-text rendering of the list.
pub fn render_text(list: &ListView) -> String {
    if let Some(text) = list.placeholder() {
        return format!("{text}\n");
    }

    let mut out = String::new();
    for (i, item) in list.items().iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("{}  {}  Saved: {}\n", item.id, item.date, item.saved));
        for line in item.code.lines() {
            out.push_str(&format!("    {line}\n"));
        }
    }
    out
}
