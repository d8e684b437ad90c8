//! Terminal rendering for chat turns
//!
//! Streaming replies are printed incrementally. Every delta hands over the
//! whole re-parsed reply, so the renderer remembers how much of the reasoning
//! trace and of the answer it has already written and only prints the new
//! suffix. A reasoning trace streams dimmed under a "Thinking..." header and
//! is closed off with a one-line "Thought Process" summary once complete.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use lila_core::reply::TRACE_CLOSE;
use lila_core::{Attachment, Mode, Renderer, ReplyView};
use std::io::{IsTerminal, Write};
use std::time::Duration;

const WAITING_STATUS: &str = "Waiting for a reply...";

/// Renderer writing to a terminal (or any writer, in tests)
pub struct TerminalRenderer<W: Write> {
    out: W,
    assistant_name: String,
    spinner_enabled: bool,
    spinner: Option<ProgressBar>,
    trace_started: bool,
    trace_printed: String,
    trace_closed: bool,
    answer_printed: String,
    line_open: bool,
    loading: bool,
    staged: Option<String>,
}

impl TerminalRenderer<std::io::Stdout> {
    /// Spinners are only drawn when stdout is a terminal
    pub fn stdout(assistant_name: impl Into<String>) -> Self {
        let interactive = std::io::stdout().is_terminal();
        Self::new(std::io::stdout(), assistant_name, interactive)
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, assistant_name: impl Into<String>, spinner_enabled: bool) -> Self {
        Self {
            out,
            assistant_name: assistant_name.into(),
            spinner_enabled,
            spinner: None,
            trace_started: false,
            trace_printed: String::new(),
            trace_closed: false,
            answer_printed: String::new(),
            line_open: false,
            loading: false,
            staged: None,
        }
    }

    /// Name of the staged attachment, for the prompt
    pub fn staged(&self) -> Option<&str> {
        self.staged.as_deref()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, text: &str) {
        self.stop_spinner();
        if text.is_empty() {
            return;
        }
        let _ = write!(self.out, "{}", text);
        let _ = self.out.flush();
        self.line_open = !text.ends_with('\n');
    }

    fn writeln(&mut self, text: &str) {
        self.write(&format!("{}\n", text));
    }

    fn end_line(&mut self) {
        if self.line_open {
            self.write("\n");
        }
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn reset_reply(&mut self) {
        self.trace_started = false;
        self.trace_printed.clear();
        self.trace_closed = false;
        self.answer_printed.clear();
    }

    /// Print `next` given that `printed` is already on screen
    ///
    /// Appends the new suffix when `next` extends `printed`; otherwise the
    /// text was revised and is reprinted on a fresh line.
    fn suffix<'a>(printed: &str, next: &'a str) -> (bool, &'a str) {
        match next.strip_prefix(printed) {
            Some(rest) => (false, rest),
            None => (true, next),
        }
    }
}

/// Hold back a closing delimiter that has only partly arrived
fn without_partial_close(text: &str) -> &str {
    (1..TRACE_CLOSE.len())
        .rev()
        .find(|&n| text.ends_with(&TRACE_CLOSE[..n]))
        .map_or(text, |n| &text[..text.len() - n])
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render_user_turn(&mut self, text: &str) {
        self.end_line();
        let line = format!("{} {}", "you ›".bright_green().bold(), text);
        self.writeln(&line);
    }

    fn begin_assistant_turn(&mut self) {
        self.reset_reply();
        self.end_line();
        let label = format!("{} ›", self.assistant_name)
            .bright_blue()
            .bold()
            .to_string();
        self.writeln(&label);
        if self.loading && self.spinner_enabled {
            self.render_status(WAITING_STATUS);
        }
    }

    fn render_assistant_delta(&mut self, reply: &ReplyView) {
        if let Some(trace) = &reply.reasoning {
            if !self.trace_started {
                self.trace_started = true;
                let header = "▸ Thinking...".dimmed().to_string();
                self.writeln(&header);
            }

            let visible = if trace.closed {
                trace.text.as_str()
            } else {
                without_partial_close(&trace.text)
            };
            let (revised, rest) = Self::suffix(&self.trace_printed, visible);
            if revised {
                self.end_line();
            }
            if !rest.is_empty() {
                let rest = rest.dimmed().to_string();
                self.write(&rest);
            }
            self.trace_printed = visible.to_string();

            if trace.closed && !self.trace_closed {
                self.trace_closed = true;
                self.end_line();
                let words = trace.text.split_whitespace().count();
                let summary = format!("✓ {} ({} words)", trace.summary(), words)
                    .dimmed()
                    .to_string();
                self.writeln(&summary);
            }
        }

        let (revised, rest) = Self::suffix(&self.answer_printed, &reply.answer);
        if revised {
            self.end_line();
        }
        let rest = rest.to_string();
        self.write(&rest);
        self.answer_printed = reply.answer.clone();
    }

    fn render_report(&mut self, report: &str) {
        self.end_line();
        self.writeln(report.trim_end_matches('\n'));
    }

    fn render_status(&mut self, status: &str) {
        if !self.spinner_enabled {
            let line = status.italic().dimmed().to_string();
            self.writeln(&line);
            return;
        }
        match &self.spinner {
            Some(spinner) => spinner.set_message(status.to_string()),
            None => {
                let spinner = ProgressBar::new_spinner();
                if let Ok(style) = ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg:.cyan} [{elapsed}]")
                {
                    spinner.set_style(style);
                }
                spinner.set_message(status.to_string());
                spinner.enable_steady_tick(Duration::from_millis(100));
                self.spinner = Some(spinner);
            }
        }
    }

    fn render_error(&mut self, message: &str) {
        self.end_line();
        let line = message.red().to_string();
        self.writeln(&line);
    }

    fn end_assistant_turn(&mut self) {
        self.stop_spinner();
        self.end_line();
        self.reset_reply();
    }

    fn render_notice(&mut self, message: &str) {
        self.end_line();
        let line = format!("{} {}", "!".yellow(), message);
        self.writeln(&line);
    }

    fn attachment_staged(&mut self, attachment: &Attachment) {
        self.staged = Some(attachment.name().to_string());
        let line = format!(
            "{} {} ({:.1} KB)",
            "📎".cyan(),
            attachment.name(),
            attachment.size() as f64 / 1024.0
        );
        self.writeln(&line);
    }

    fn attachment_cleared(&mut self) {
        self.staged = None;
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        if !loading {
            self.stop_spinner();
        }
    }

    fn mode_changed(&mut self, mode: Mode) {
        self.end_line();
        let line = format!(
            "{} Mode: {}",
            "→".bright_cyan(),
            mode.display_name().bright_cyan().bold()
        );
        self.writeln(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> TerminalRenderer<Vec<u8>> {
        colored::control::set_override(false);
        TerminalRenderer::new(Vec::new(), "Lil A", false)
    }

    fn output(renderer: TerminalRenderer<Vec<u8>>) -> String {
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    fn stream(renderer: &mut TerminalRenderer<Vec<u8>>, deltas: &[&str]) {
        let mut buffer = String::new();
        for delta in deltas {
            buffer.push_str(delta);
            renderer.render_assistant_delta(&ReplyView::parse(&buffer));
        }
    }

    #[test]
    fn test_streamed_answer_printed_once() {
        let mut r = renderer();
        r.begin_assistant_turn();
        stream(&mut r, &["Rate ", "is ", "6.25%"]);
        r.end_assistant_turn();

        assert_eq!(output(r), "Lil A ›\nRate is 6.25%\n");
    }

    #[test]
    fn test_trace_collapses_to_summary() {
        let mut r = renderer();
        r.begin_assistant_turn();
        stream(&mut r, &["<think>check ", "the matrix", "</think>", "Use row 3."]);
        r.end_assistant_turn();

        assert_eq!(
            output(r),
            "Lil A ›\n▸ Thinking...\ncheck the matrix\n✓ Thought Process (3 words)\nUse row 3.\n"
        );
    }

    #[test]
    fn test_partial_close_tag_not_printed() {
        assert_eq!(without_partial_close("ab</thi"), "ab");
        assert_eq!(without_partial_close("ab<"), "ab");
        assert_eq!(without_partial_close("a < b"), "a < b");

        let mut r = renderer();
        r.begin_assistant_turn();
        stream(&mut r, &["<think>a", "b</thi", "nk>", "Answer"]);
        r.end_assistant_turn();

        assert_eq!(
            output(r),
            "Lil A ›\n▸ Thinking...\nab\n✓ Thought Process (1 words)\nAnswer\n"
        );
    }

    #[test]
    fn test_report_and_error() {
        let mut r = renderer();
        r.render_status("Analyzing Excel file via HomePort Engine...");
        r.render_report("  QUALIFIED\n  LTV 80%\n");
        r.render_error("Error: boom");

        assert_eq!(
            output(r),
            "Analyzing Excel file via HomePort Engine...\n  QUALIFIED\n  LTV 80%\nError: boom\n"
        );
    }

    #[test]
    fn test_staged_attachment_tracked_for_prompt() {
        let mut manager = lila_core::AttachmentManager::new(lila_core::AttachmentPolicy::default());
        let attachment = manager.select("rates.xlsx", vec![0u8; 2048]).unwrap().clone();

        let mut r = renderer();
        r.attachment_staged(&attachment);
        assert_eq!(r.staged(), Some("rates.xlsx"));
        r.attachment_cleared();
        assert_eq!(r.staged(), None);
        assert_eq!(output(r), "📎 rates.xlsx (2.0 KB)\n");
    }
}
