//! Plain-text drawing helpers shared by the screens.

use chrono::{DateTime, Local, Utc};

use matrix_types::models::Post;

use crate::toast::{Toast, ToastLevel};

/// Avatar letter: first character, upper-cased.
pub fn initial(name: &str) -> String {
    name.chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_else(|| "?".to_string())
}

/// Timestamp in the viewer's local timezone.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// One rendered wall post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostCard {
    pub avatar: String,
    pub author: String,
    pub visitor_note: Option<String>,
    pub content: String,
    pub timestamp: String,
}

impl PostCard {
    pub fn from_post(post: &Post) -> Self {
        Self {
            avatar: initial(&post.author),
            author: post.author.clone(),
            visitor_note: post
                .is_visitor_message()
                .then(|| format!("→ posted on {}'s wall", post.wall_owner)),
            content: post.content.clone(),
            timestamp: format_timestamp(&post.created_at),
        }
    }

    pub fn render(&self, index: usize) -> String {
        let mut out = format!("  {}. [{}] {}", index, self.avatar, self.author);
        if let Some(note) = &self.visitor_note {
            out.push(' ');
            out.push_str(note);
        }
        out.push('\n');
        for line in self.content.lines() {
            out.push_str("       ");
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("       ");
        out.push_str(&self.timestamp);
        out.push('\n');
        out
    }
}

pub fn toast_line(toast: &Toast) -> String {
    match toast.level {
        ToastLevel::Success => format!("[ok] {}", toast.message),
        ToastLevel::Error => format!("[error] {}", toast.message),
    }
}

pub fn rule(title: &str) -> String {
    format!("== {} ==\n", title)
}
