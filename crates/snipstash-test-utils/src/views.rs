//! A view that records what the session asks it to draw.

use async_trait::async_trait;
use snipstash_core::view::{Field, ListView, View};
use snipstash_core::{ConnectionState, Status};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// One call made on the view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Connection(ConnectionState),
    SubmitEnabled(bool),
    ShowStatus(Status),
    HideStatus,
    RenderList(ListView),
    ClearCode,
    Focus(Field),
    Confirm(String),
}

/// A [`View`] that records every call for later inspection.
///
/// Confirmation prompts are answered with a fixed value (yes by default).
///
/// # Example
///
/// ```rust,ignore
/// let view = Arc::new(RecordingView::new().declining());
/// session.delete("abc").await.unwrap_err();
/// assert_eq!(view.confirm_prompts().len(), 1);
/// ```
pub struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
    confirm_answer: AtomicBool,
}

impl RecordingView {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            confirm_answer: AtomicBool::new(true),
        }
    }

    /// Answer "no" to confirmation prompts.
    pub fn declining(self) -> Self {
        self.set_confirm(false);
        self
    }

    pub fn set_confirm(&self, answer: bool) {
        self.confirm_answer.store(answer, Ordering::SeqCst);
    }

    /// All recorded events, in call order.
    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn statuses(&self) -> Vec<Status> {
        self.filter(|e| match e {
            ViewEvent::ShowStatus(s) => Some(s.clone()),
            _ => None,
        })
    }

    pub fn last_status(&self) -> Option<Status> {
        self.statuses().pop()
    }

    pub fn lists(&self) -> Vec<ListView> {
        self.filter(|e| match e {
            ViewEvent::RenderList(l) => Some(l.clone()),
            _ => None,
        })
    }

    pub fn last_list(&self) -> Option<ListView> {
        self.lists().pop()
    }

    pub fn submit_states(&self) -> Vec<bool> {
        self.filter(|e| match e {
            ViewEvent::SubmitEnabled(b) => Some(*b),
            _ => None,
        })
    }

    /// Whether submit is currently enabled, if it was ever set.
    pub fn submit_enabled(&self) -> Option<bool> {
        self.submit_states().pop()
    }

    pub fn connection_states(&self) -> Vec<ConnectionState> {
        self.filter(|e| match e {
            ViewEvent::Connection(c) => Some(c.clone()),
            _ => None,
        })
    }

    pub fn focused(&self) -> Vec<Field> {
        self.filter(|e| match e {
            ViewEvent::Focus(f) => Some(*f),
            _ => None,
        })
    }

    pub fn confirm_prompts(&self) -> Vec<String> {
        self.filter(|e| match e {
            ViewEvent::Confirm(p) => Some(p.clone()),
            _ => None,
        })
    }

    pub fn count(&self, event: &ViewEvent) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| *e == event)
            .count()
    }

    fn filter<T>(&self, f: impl Fn(&ViewEvent) -> Option<T>) -> Vec<T> {
        self.events.lock().unwrap().iter().filter_map(f).collect()
    }

    fn record(&self, event: ViewEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl Default for RecordingView {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl View for RecordingView {
    fn set_connection(&self, state: &ConnectionState) {
        self.record(ViewEvent::Connection(state.clone()));
    }

    fn set_submit_enabled(&self, enabled: bool) {
        self.record(ViewEvent::SubmitEnabled(enabled));
    }

    fn show_status(&self, status: &Status) {
        self.record(ViewEvent::ShowStatus(status.clone()));
    }

    fn hide_status(&self) {
        self.record(ViewEvent::HideStatus);
    }

    fn render_list(&self, list: &ListView) {
        self.record(ViewEvent::RenderList(list.clone()));
    }

    fn clear_code(&self) {
        self.record(ViewEvent::ClearCode);
    }

    fn focus(&self, field: Field) {
        self.record(ViewEvent::Focus(field));
    }

    async fn confirm(&self, prompt: &str) -> bool {
        self.record(ViewEvent::Confirm(prompt.to_string()));
        self.confirm_answer.load(Ordering::SeqCst)
    }
}
