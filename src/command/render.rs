//! HTML rendering of status reports.

use chrono::{DateTime, Utc};
use pulldown_cmark::{html, CowStr, Event, Parser};

use crate::models::{StatusCollection, StatusEntry};

/// Label put in front of statuses whose expiry has passed.
pub const EXPIRED_LABEL: &str = "<b>EXPIRED</b> ";

/// Separator between statuses in the aggregate report.
pub const LINE_BREAK: &str = "<br>";

/// Render one status as a single line of HTML.
///
/// ```text
/// <b>Ada</b>: shipped <em>it</em> -- <i>2 hours ago</i> (<i>expires in 22 hours</i>)
/// ```
pub fn render_one(entry: &StatusEntry, now: DateTime<Utc>) -> String {
    let expired = entry.is_expired(now);

    let mut line = String::new();
    if expired {
        line.push_str(EXPIRED_LABEL);
    }
    line.push_str(&format!(
        "<b>{}</b>: {} -- <i>{}</i>",
        escape_text(&entry.user.name),
        markdown_inline(&entry.message),
        humanize(entry.recorded_at, now),
    ));

    if let Some(expires_at) = entry.expires_at {
        let verb = if expired { "expired" } else { "expires" };
        line.push_str(&format!(" (<i>{} {}</i>)", verb, humanize(expires_at, now)));
    }

    line
}

/// Render every status, one per line, ordered by mention-name.
pub fn render_all(statuses: &StatusCollection, now: DateTime<Utc>) -> String {
    statuses
        .values()
        .map(|entry| render_one(entry, now))
        .collect::<Vec<_>>()
        .join(LINE_BREAK)
}

/// Markdown to HTML without the paragraph wrapper, for inlining.
pub fn markdown_inline(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
        .replace("<p>", "")
        .replace("</p>", "")
        .trim()
        .to_string()
}

/// Plain text made safe for HTML.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::new();
    html::push_html(
        &mut escaped,
        std::iter::once(Event::Text(CowStr::Borrowed(text))),
    );
    escaped
}

/// Describe `time` relative to `now`, e.g. "3 hours ago" or "in 2 days".
pub fn humanize(time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(time);
    let seconds = delta.num_seconds().abs();

    let span = if seconds < 10 {
        return "just now".to_string();
    } else if seconds < 45 {
        "seconds".to_string()
    } else if seconds < 90 {
        "a minute".to_string()
    } else if seconds < 45 * 60 {
        format!("{} minutes", (seconds / 60).max(2))
    } else if seconds < 90 * 60 {
        "an hour".to_string()
    } else if seconds < 24 * 3600 {
        format!("{} hours", (seconds / 3600).max(2))
    } else if seconds < 48 * 3600 {
        "a day".to_string()
    } else if seconds < 30 * 86400 {
        format!("{} days", seconds / 86400)
    } else if seconds < 60 * 86400 {
        "a month".to_string()
    } else if seconds < 365 * 86400 {
        format!("{} months", (seconds / (30 * 86400)).max(2))
    } else if seconds < 730 * 86400 {
        "a year".to_string()
    } else {
        format!("{} years", seconds / (365 * 86400))
    };

    if delta.num_seconds() >= 0 {
        format!("{} ago", span)
    } else {
        format!("in {}", span)
    }
}
