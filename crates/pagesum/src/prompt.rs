//! Chat messages sent to the LLM

use crate::fetch::Page;
use serde::{Deserialize, Serialize};

/// Fixed system instruction
pub const SYSTEM_PROMPT: &str = "You are an assistant that analyzes the contents of a website \
and provides a short summary, ignoring the text that might be navigation-related. \
Respond in markdown and be concise.";

/// Marker appended when the page text is cut short
pub const TRUNCATION_MARKER: &str = "\n\n[..content truncated...]";

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One role-tagged entry of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// System message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// User message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Build the two-message conversation for a page
///
/// The system message is always first. Title and body are embedded verbatim.
pub fn build_messages(title: &str, body_text: &str) -> [Message; 2] {
    [Message::system(SYSTEM_PROMPT), Message::user(user_prompt(title, body_text))]
}

fn user_prompt(title: &str, body_text: &str) -> String {
    format!(
        "You are looking at the website titled \"{title}\". \
The content of this website is as follows; \
please provide a short summary of this website in markdown. \
If it includes news or announcements, then summarize these too.\n\n\
\"\"\"\n{body_text}\n\"\"\"\n\n"
    )
}

/// Prompt construction with an optional cap on page text
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder {
    max_body_chars: Option<usize>,
}

impl PromptBuilder {
    /// Builder that embeds the full page text
    pub fn new() -> Self {
        Self::default()
    }

    /// Cut page text after `max` characters
    pub fn max_body_chars(mut self, max: Option<usize>) -> Self {
        self.max_body_chars = max;
        self
    }

    /// Conversation for `page`
    pub fn messages(&self, page: &Page) -> [Message; 2] {
        match self.max_body_chars {
            Some(max) => {
                let body = truncate_chars(page.body_text(), max);
                build_messages(page.title(), &body)
            }
            None => build_messages(page.title(), page.body_text()),
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => {
            tracing::debug!(len = text.len(), kept = cut, "Truncating page text");
            let mut out = text[..cut].to_string();
            out.push_str(TRUNCATION_MARKER);
            out
        }
        None => text.to_string(),
    }
}
