//! Fetch -> extract -> prompt -> chat completion

use crate::config::Config;
use crate::error::Error;
use crate::fetch::{FetchOptions, Page, PageFetcher};
use crate::llm::{ChatModel, ChatRequest, ModelSettings, OpenAiClient};
use crate::prompt::PromptBuilder;

/// What to summarize
#[derive(Debug, Clone)]
pub enum SummaryInput {
    /// Address still to be fetched
    Url(String),
    /// Page fetched earlier
    Page(Page),
}

impl From<&str> for SummaryInput {
    fn from(url: &str) -> Self {
        SummaryInput::Url(url.to_string())
    }
}

impl From<String> for SummaryInput {
    fn from(url: String) -> Self {
        SummaryInput::Url(url)
    }
}

impl From<Page> for SummaryInput {
    fn from(page: Page) -> Self {
        SummaryInput::Page(page)
    }
}

/// Summarizes web pages with a chat model
///
/// The fetcher and model client are created once, when the summarizer is
/// built, and reused for every call.
pub struct Summarizer {
    fetcher: PageFetcher,
    model: Box<dyn ChatModel>,
    settings: ModelSettings,
    prompt: PromptBuilder,
}

impl Summarizer {
    /// Summarizer over an explicit fetcher and model
    pub fn new(fetcher: PageFetcher, model: impl ChatModel + 'static) -> Self {
        Self {
            fetcher,
            model: Box::new(model),
            settings: ModelSettings::default(),
            prompt: PromptBuilder::default(),
        }
    }

    /// Wire everything up from configuration
    ///
    /// Fails with a config error when `OPENAI_API_KEY` is missing.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let fetcher = PageFetcher::new(FetchOptions::from_config(config)?)?;
        let model = OpenAiClient::from_config(config)?;

        let mut settings = ModelSettings::default();
        if let Some(name) = config.model() {
            settings = settings.model(name);
        }

        Ok(Self::new(fetcher, model)
            .with_settings(settings)
            .with_prompt_builder(PromptBuilder::new().max_body_chars(config.max_body_chars()?)))
    }

    /// Override generation parameters
    pub fn with_settings(mut self, settings: ModelSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Override prompt construction
    pub fn with_prompt_builder(mut self, prompt: PromptBuilder) -> Self {
        self.prompt = prompt;
        self
    }

    /// Generation parameters in use
    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    /// Summarize either a URL or an already fetched page
    pub async fn summarize(&self, input: impl Into<SummaryInput>) -> Result<Option<String>, Error> {
        match input.into() {
            SummaryInput::Url(url) => self.summarize_url(&url).await,
            SummaryInput::Page(page) => self.summarize_page(&page).await,
        }
    }

    /// Fetch `url`, then summarize it
    ///
    /// A failed fetch returns before the model is contacted.
    pub async fn summarize_url(&self, url: &str) -> Result<Option<String>, Error> {
        let page = self.fetcher.fetch(url).await?;
        tracing::info!(
            url = page.url(),
            title = page.title(),
            chars = page.body_text().len(),
            "Fetched page"
        );
        self.summarize_page(&page).await
    }

    /// Summarize a page
    ///
    /// Returns `None` when the model produced no choices.
    pub async fn summarize_page(&self, page: &Page) -> Result<Option<String>, Error> {
        let request = ChatRequest::new(&self.settings, self.prompt.messages(page));
        let response = self.model.complete(&request).await?;
        let summary = response.first_content();

        tracing::info!(
            model = self.model.name(),
            found = summary.is_some(),
            "Summary received"
        );

        Ok(summary)
    }
}
