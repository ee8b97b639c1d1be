//! Pagesum - summarize a web page with an LLM
//!
//! The pipeline is strictly linear:
//!
//! 1. [`PageFetcher`] performs one GET and requires HTTP 200
//! 2. [`extract`] strips the HTML down to a title and visible body text
//! 3. [`build_messages`] wraps both in a system + user conversation
//! 4. [`Summarizer`] sends it to a [`ChatModel`] and returns the first choice
//! 5. [`present`] renders the result, or a fallback when there is none
//!
//! Every failure propagates to the caller as an [`Error`]; nothing is retried.

pub mod config;
mod charset;
mod error;
mod extract;
mod fetch;
mod llm;
mod present;
mod prompt;
mod summarizer;

pub use config::Config;
pub use error::{ConfigError, Error, ExtractionError, FetchError, LlmError};
pub use extract::{extract, extract_with_content_type, Extracted, NO_TITLE};
pub use fetch::{FetchOptions, Page, PageFetcher};
pub use llm::{
    ChatModel, ChatRequest, ChatResponse, Choice, ChoiceMessage, ModelSettings, OpenAiClient,
    DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE,
};
pub use present::{
    present, render_markdown, DisplaySurface, TerminalDisplay, NO_SUMMARY_MESSAGE,
};
pub use prompt::{
    build_messages, Message, PromptBuilder, Role, SYSTEM_PROMPT, TRUNCATION_MARKER,
};
pub use summarizer::{Summarizer, SummaryInput};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = concat!("pagesum/", env!("CARGO_PKG_VERSION"));

/// Page summarized when no URL is given
pub const DEFAULT_URL: &str = "https://cnn.com";
