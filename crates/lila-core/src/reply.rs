//! Reply post-processing before markdown rendering
//!
//! Assistant text may open with a reasoning trace wrapped in
//! [`TRACE_OPEN`]/[`TRACE_CLOSE`]. The accumulated buffer is re-parsed after
//! every delta, so a trace shows as open while it streams in and collapses
//! once its closing delimiter arrives.

/// Opening delimiter of a reasoning trace
pub const TRACE_OPEN: &str = "<think>";
/// Closing delimiter of a reasoning trace
pub const TRACE_CLOSE: &str = "</think>";

/// Reasoning emitted ahead of the answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasoningTrace {
    pub text: String,
    /// False while the closing delimiter has not arrived yet
    pub closed: bool,
}

impl ReasoningTrace {
    /// Disclosure summary label
    pub fn summary(&self) -> &'static str {
        if self.closed {
            "Thought Process"
        } else {
            "Thinking..."
        }
    }
}

/// Render-ready split of an assistant buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyView {
    pub reasoning: Option<ReasoningTrace>,
    pub answer: String,
}

impl ReplyView {
    pub fn parse(text: &str) -> Self {
        let Some(open) = text.find(TRACE_OPEN) else {
            return Self {
                reasoning: None,
                answer: text.trim().to_string(),
            };
        };

        let before = &text[..open];
        let after_open = &text[open + TRACE_OPEN.len()..];

        match after_open.find(TRACE_CLOSE) {
            Some(close) => {
                let after_close = &after_open[close + TRACE_CLOSE.len()..];
                Self {
                    reasoning: Some(ReasoningTrace {
                        text: after_open[..close].trim().to_string(),
                        closed: true,
                    }),
                    answer: format!("{}{}", before, after_close).trim().to_string(),
                }
            }
            None => Self {
                reasoning: Some(ReasoningTrace {
                    text: after_open.trim().to_string(),
                    closed: false,
                }),
                answer: before.trim().to_string(),
            },
        }
    }

    pub fn is_thinking(&self) -> bool {
        self.reasoning.as_ref().is_some_and(|r| !r.closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_answer() {
        let view = ReplyView::parse("  The rate is 6.25%.\n");
        assert!(view.reasoning.is_none());
        assert_eq!(view.answer, "The rate is 6.25%.");
    }

    #[test]
    fn test_closed_trace() {
        let view = ReplyView::parse("<think>check matrix</think>\n\nUse the 30yr row.");
        let trace = view.reasoning.as_ref().unwrap();
        assert!(trace.closed);
        assert_eq!(trace.text, "check matrix");
        assert_eq!(trace.summary(), "Thought Process");
        assert_eq!(view.answer, "Use the 30yr row.");
        assert!(!view.is_thinking());
    }

    #[test]
    fn test_open_trace_while_streaming() {
        let view = ReplyView::parse("<think>looking up the FICO");
        let trace = view.reasoning.as_ref().unwrap();
        assert!(!trace.closed);
        assert_eq!(trace.text, "looking up the FICO");
        assert_eq!(view.answer, "");
        assert!(view.is_thinking());
    }

    #[test]
    fn test_empty_open_trace() {
        let view = ReplyView::parse("<think>");
        assert_eq!(view.reasoning.unwrap().text, "");
    }

    #[test]
    fn test_reparse_as_buffer_grows() {
        let mut buffer = String::new();
        let mut views = Vec::new();
        for delta in ["<think>a", "b</thi", "nk>", "Answer"] {
            buffer.push_str(delta);
            views.push(ReplyView::parse(&buffer));
        }
        assert!(views[0].is_thinking());
        assert!(views[1].is_thinking());
        assert_eq!(views[1].reasoning.as_ref().unwrap().text, "ab</thi");
        assert!(!views[2].is_thinking());
        assert_eq!(views[3].answer, "Answer");
    }
}
