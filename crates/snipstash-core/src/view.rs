//! The presentation-layer interface.
//!
//! The session never touches a UI directly. It describes what should be on
//! screen (a [`ListView`], a [`Status`], the submit control state) and the
//! presentation layer implementing [`View`] draws it.

use crate::session::ConnectionState;
use crate::status::Status;
use async_trait::async_trait;

/// Form inputs that can receive focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Date,
    Code,
}

/// One rendered record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub id: String,
    /// Display date, `"No date"` when the record has none. Not escaped.
    pub date: String,
    /// The raw code text, for presenters that do not produce markup.
    pub code: String,
    /// The code, HTML-escaped.
    pub code_html: String,
    /// Display time, `"Recent"` when no timestamp is available.
    pub saved: String,
}

/// Contents of the saved-items list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListView {
    /// Nothing rendered yet.
    #[default]
    Blank,
    Loading,
    Empty,
    Error(String),
    Items(Vec<ListItem>),
}

impl ListView {
    /// Text of the placeholder shown instead of items, if any.
    pub fn placeholder(&self) -> Option<String> {
        match self {
            ListView::Blank | ListView::Items(_) => None,
            ListView::Loading => Some("Loading saved items...".to_string()),
            ListView::Empty => {
                Some("No items saved yet. Save your first code snippet!".to_string())
            }
            ListView::Error(message) => Some(format!("Error loading data: {message}")),
        }
    }

    pub fn items(&self) -> &[ListItem] {
        match self {
            ListView::Items(items) => items,
            _ => &[],
        }
    }
}

/// Presentation layer callbacks.
#[async_trait]
pub trait View: Send + Sync {
    /// Update the connection indicator.
    fn set_connection(&self, state: &ConnectionState);

    /// Enable or disable the submit control.
    fn set_submit_enabled(&self, enabled: bool);

    /// Show a status banner, replacing the current one.
    fn show_status(&self, status: &Status);

    /// Hide the status banner.
    fn hide_status(&self);

    /// Replace the saved-items list.
    fn render_list(&self, list: &ListView);

    /// Clear the code input. The date input is left alone.
    fn clear_code(&self);

    /// Move input focus.
    fn focus(&self, field: Field);

    /// Ask the user to confirm a destructive action.
    async fn confirm(&self, prompt: &str) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_are_distinct() {
        let loading = ListView::Loading.placeholder().unwrap();
        let empty = ListView::Empty.placeholder().unwrap();
        let error = ListView::Error("boom".into()).placeholder().unwrap();
        assert_ne!(loading, empty);
        assert_ne!(empty, error);
        assert!(error.contains("boom"));
        assert!(ListView::Items(vec![]).placeholder().is_none());
    }
}
