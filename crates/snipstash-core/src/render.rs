//! Turning records into list items, and list items into markup.

use crate::record::Record;
use crate::view::{ListItem, ListView};
use chrono::{DateTime, Local, Utc};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const NO_DATE: &str = "No date";
const RECENT: &str = "Recent";

/// Escape text for insertion into HTML element content or attributes.
pub fn escape_html(text: &str) -> String {
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

/// The record's date, or `"No date"`.
pub fn display_date(record: &Record) -> String {
    match record.date.as_deref() {
        Some(date) if !date.is_empty() => date.to_string(),
        _ => NO_DATE.to_string(),
    }
}

/// Server timestamp if present, else the client `created` time, else `"Recent"`.
pub fn display_time(record: &Record) -> String {
    let ts = record.timestamp.or_else(|| {
        record
            .created
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|ts| ts.with_timezone(&Utc))
    });
    match ts {
        Some(ts) => format_local(ts),
        None => RECENT.to_string(),
    }
}

/// Local-time rendering used for saved times.
pub fn format_local(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format(TIME_FORMAT).to_string()
}

pub fn list_item(record: &Record) -> ListItem {
    ListItem {
        id: record.id.clone(),
        date: display_date(record),
        code: record.code.clone(),
        code_html: escape_html(&record.code),
        saved: display_time(record),
    }
}

/// Render the list the way the web page lays it out.
///
/// `code` is escaped; `date` is inserted as-is.
pub fn render_list_html(list: &ListView) -> String {
    if let Some(text) = list.placeholder() {
        return format!("<div class=\"empty-message\">{}</div>\n", escape_html(&text));
    }

    let mut html = String::new();
    for item in list.items() {
        let id = escape_html(&item.id);
        html.push_str(&format!(
            concat!(
                "<div class=\"saved-item\" data-id=\"{id}\">\n",
                "  <div class=\"saved-item-header\">\n",
                "    <div class=\"saved-date\">{date}</div>\n",
                "    <button class=\"delete-btn\" data-action=\"delete\" data-id=\"{id}\">Delete</button>\n",
                "  </div>\n",
                "  <div class=\"saved-code\">{code}</div>\n",
                "  <div class=\"saved-time\">Saved: {saved}</div>\n",
                "</div>\n",
            ),
            id = id,
            date = item.date,
            code = item.code_html,
            saved = escape_html(&item.saved),
        ));
    }
    html
}
