//! Terminal output for summaries

use owo_colors::Style;
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Parser, Tag, TagEnd};
use std::io::{self, Write};

/// Printed when there is nothing to render
pub const NO_SUMMARY_MESSAGE: &str = "No summary found.";

const RULE_WIDTH: usize = 40;

/// Somewhere a summary can be shown
pub trait DisplaySurface {
    /// Render markdown
    fn render_markdown(&mut self, markdown: &str) -> io::Result<()>;

    /// Print a line as-is
    fn print_plain(&mut self, text: &str) -> io::Result<()>;
}

/// Show `summary`, or [`NO_SUMMARY_MESSAGE`] when it is absent or empty
///
/// Output failures are logged, never returned. A closed pipe is ignored.
pub fn present(summary: Option<&str>, surface: &mut impl DisplaySurface) {
    let result = match summary.filter(|s| !s.is_empty()) {
        Some(markdown) => surface.render_markdown(markdown),
        None => surface.print_plain(NO_SUMMARY_MESSAGE),
    };

    if let Err(e) = result {
        if e.kind() != io::ErrorKind::BrokenPipe {
            tracing::warn!("Error writing summary: {}", e);
        }
    }
}

/// Writes rendered markdown to a terminal-like sink
#[derive(Debug)]
pub struct TerminalDisplay<W: Write> {
    out: W,
    styled: bool,
}

impl TerminalDisplay<io::Stdout> {
    /// Display on standard output
    pub fn stdout(styled: bool) -> Self {
        Self::new(io::stdout(), styled)
    }
}

impl<W: Write> TerminalDisplay<W> {
    /// Display on `out`; `styled` enables ANSI colors and emphasis
    pub fn new(out: W, styled: bool) -> Self {
        Self { out, styled }
    }

    /// Give back the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DisplaySurface for TerminalDisplay<W> {
    fn render_markdown(&mut self, markdown: &str) -> io::Result<()> {
        self.out
            .write_all(render_markdown(markdown, self.styled).as_bytes())?;
        self.out.flush()
    }

    fn print_plain(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text)?;
        self.out.flush()
    }
}

/// Render markdown to terminal text
pub fn render_markdown(markdown: &str, styled: bool) -> String {
    let mut renderer = Renderer::new(styled);
    for event in Parser::new(markdown) {
        renderer.event(event);
    }
    renderer.finish()
}

#[derive(Default)]
struct Renderer {
    out: String,
    styled: bool,
    heading: Option<HeadingLevel>,
    strong: usize,
    emphasis: usize,
    quote: usize,
    code_block: bool,
    link: Option<String>,
    /// Open lists; `Some(n)` is the next number of an ordered list
    lists: Vec<Option<u64>>,
    /// Item marker written, no content yet
    item_open: bool,
}

impl Renderer {
    fn new(styled: bool) -> Self {
        Self {
            styled,
            ..Default::default()
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if self.code_block {
                    self.code_text(&text);
                } else {
                    let style = self.inline_style();
                    self.push_styled(&text, style);
                }
            }
            Event::Code(code) => self.push_styled(&code, Style::new().cyan()),
            Event::Html(html) | Event::InlineHtml(html) => {
                self.push_styled(&html, Style::new().dimmed())
            }
            Event::SoftBreak => self.out.push(' '),
            Event::HardBreak => {
                self.out.push('\n');
                self.line_prefix();
            }
            Event::Rule => {
                self.start_block();
                let rule = "─".repeat(RULE_WIDTH);
                self.push_styled(&rule, Style::new().dimmed());
            }
            Event::TaskListMarker(done) => self.out.push_str(if done { "[x] " } else { "[ ] " }),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if !self.item_open {
                    self.start_block();
                    self.line_prefix();
                }
            }
            Tag::Heading { level, .. } => {
                self.start_block();
                self.heading = Some(level);
            }
            Tag::BlockQuote => self.quote += 1,
            Tag::CodeBlock(kind) => {
                self.start_block();
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        self.push_styled(&format!("[{}]", lang), Style::new().dimmed());
                        self.out.push('\n');
                    }
                }
                self.code_block = true;
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.start_block();
                } else {
                    self.ensure_newline();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.ensure_newline();
                let depth = self.lists.len().saturating_sub(1);
                self.out.push_str(&"  ".repeat(depth));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{}. ", n);
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.out.push_str(&marker);
                self.item_open = true;
            }
            Tag::Emphasis => self.emphasis += 1,
            Tag::Strong => self.strong += 1,
            Tag::Link { dest_url, .. } => self.link = Some(dest_url.to_string()),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => self.heading = None,
            TagEnd::BlockQuote => self.quote = self.quote.saturating_sub(1),
            TagEnd::CodeBlock => self.code_block = false,
            TagEnd::List(_) => {
                self.lists.pop();
            }
            TagEnd::Item => self.item_open = false,
            TagEnd::Emphasis => self.emphasis = self.emphasis.saturating_sub(1),
            TagEnd::Strong => self.strong = self.strong.saturating_sub(1),
            TagEnd::Link => {
                if let Some(dest) = self.link.take() {
                    if !dest.is_empty() {
                        self.push_styled(&format!(" ({})", dest), Style::new().dimmed());
                    }
                }
            }
            _ => {}
        }
    }

    fn inline_style(&self) -> Style {
        let mut style = Style::new();
        match self.heading {
            Some(HeadingLevel::H1) => style = style.bold().underline(),
            Some(_) => style = style.bold(),
            None => {}
        }
        if self.strong > 0 {
            style = style.bold();
        }
        if self.emphasis > 0 || self.quote > 0 {
            style = style.italic();
        }
        if self.link.is_some() {
            style = style.blue().underline();
        }
        style
    }

    fn code_text(&mut self, text: &str) {
        for line in text.split_inclusive('\n') {
            if self.out.is_empty() || self.out.ends_with('\n') {
                self.out.push_str("    ");
            }
            let (body, newline) = match line.strip_suffix('\n') {
                Some(body) => (body, true),
                None => (line, false),
            };
            self.push_styled(body, Style::new().dimmed());
            if newline {
                self.out.push('\n');
            }
        }
    }

    fn push_styled(&mut self, text: &str, style: Style) {
        self.item_open = false;
        if self.styled {
            self.out.push_str(&style.style(text).to_string());
        } else {
            self.out.push_str(text);
        }
    }

    /// Separate the next block from the previous one by a blank line
    fn start_block(&mut self) {
        if self.out.is_empty() || self.out.ends_with("\n\n") {
            return;
        }
        if self.out.ends_with('\n') {
            self.out.push('\n');
        } else {
            self.out.push_str("\n\n");
        }
        if !self.lists.is_empty() {
            self.out.push_str(&"  ".repeat(self.lists.len()));
        }
    }

    fn ensure_newline(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    fn line_prefix(&mut self) {
        if self.quote > 0 {
            self.push_styled(&"│ ".repeat(self.quote), Style::new().dimmed());
        }
    }

    fn finish(mut self) -> String {
        let trimmed = self.out.trim_end().len();
        self.out.truncate(trimmed);
        if !self.out.is_empty() {
            self.out.push('\n');
        }
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSurface {
        markdown: Vec<String>,
        plain: Vec<String>,
    }

    impl DisplaySurface for RecordingSurface {
        fn render_markdown(&mut self, markdown: &str) -> io::Result<()> {
            self.markdown.push(markdown.to_string());
            Ok(())
        }

        fn print_plain(&mut self, text: &str) -> io::Result<()> {
            self.plain.push(text.to_string());
            Ok(())
        }
    }

    struct FailingSurface;

    impl DisplaySurface for FailingSurface {
        fn render_markdown(&mut self, _: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn print_plain(&mut self, _: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }
    }

    #[test]
    fn test_present_summary() {
        let mut surface = RecordingSurface::default();
        present(Some("# Summary."), &mut surface);
        assert_eq!(surface.markdown, vec!["# Summary."]);
        assert!(surface.plain.is_empty());
    }

    #[test]
    fn test_present_absent_summary() {
        let mut surface = RecordingSurface::default();
        present(None, &mut surface);
        assert!(surface.markdown.is_empty());
        assert_eq!(surface.plain, vec![NO_SUMMARY_MESSAGE]);
    }

    #[test]
    fn test_present_empty_summary() {
        let mut surface = RecordingSurface::default();
        present(Some(""), &mut surface);
        assert!(surface.markdown.is_empty());
        assert_eq!(surface.plain, vec!["No summary found."]);
    }

    #[test]
    fn test_present_swallows_write_errors() {
        present(Some("text"), &mut FailingSurface);
        present(None, &mut FailingSurface);
    }

    #[test]
    fn test_terminal_display_writes() {
        let mut display = TerminalDisplay::new(Vec::new(), false);
        present(Some("Hello **world**"), &mut display);
        present(None, &mut display);
        let output = String::from_utf8(display.into_inner()).unwrap();
        assert_eq!(output, "Hello world\nNo summary found.\n");
    }

    #[test]
    fn test_render_blocks_plain() {
        let md = "# Title\n\nHello **world**\n\n- a\n- b\n\n1. one\n2. two\n\n---\n\nEnd";
        assert_eq!(
            render_markdown(md, false),
            format!(
                "Title\n\nHello world\n\n• a\n• b\n\n1. one\n2. two\n\n{}\n\nEnd\n",
                "─".repeat(RULE_WIDTH)
            )
        );
    }

    #[test]
    fn test_render_nested_list() {
        let md = "- outer\n  - inner\n- next";
        assert_eq!(render_markdown(md, false), "• outer\n  • inner\n• next\n");
    }

    #[test]
    fn test_render_code_block() {
        let md = "Run:\n\n```sh\ncargo install pagesum\n```";
        assert_eq!(
            render_markdown(md, false),
            "Run:\n\n[sh]\n    cargo install pagesum\n"
        );
    }

    #[test]
    fn test_render_link_and_quote() {
        assert_eq!(
            render_markdown("See [docs](https://example.com).", false),
            "See docs (https://example.com).\n"
        );
        assert_eq!(render_markdown("> quoted", false), "│ quoted\n");
    }

    #[test]
    fn test_render_styled_uses_ansi() {
        let output = render_markdown("**bold**", true);
        assert!(output.contains("\u{1b}["));
        assert!(output.contains("bold"));
        assert!(!render_markdown("**bold**", false).contains('\u{1b}'));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_markdown("", false), "");
    }
}
