//! Response Frame Decoder
//!
//! Turns the chunked body of a streaming chat response into [`StreamEvent`]s.
//!
//! Chunks may split a frame anywhere, including inside a multi-byte UTF-8
//! sequence, or carry several frames at once. The decoder keeps the undecoded
//! tail of the previous chunk and the last partial line between calls, so the
//! event sequence does not depend on where the chunk boundaries fall.
//!
//! A line is significant only when it starts with [`EVENT_MARKER`]; the rest
//! of the line is a JSON payload. Payloads that fail to parse are skipped.
//! Once a terminal event is seen the decoder stops producing events, even for
//! frames that arrived in the same chunk.

use crate::error::ProtocolError;
use serde_json::Value;
use tracing::{debug, trace};

/// Prefix of every significant line
pub const EVENT_MARKER: &str = "data: ";

/// Decoded protocol event, consumed immediately by the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Incremental answer text, to be appended to the running buffer
    ContentDelta(String),
    /// The backend named the conversation this turn belongs to
    ConversationAssigned(String),
    /// The backend finished the turn
    TurnComplete,
    /// The backend reported an error inside the stream
    Failed(String),
}

impl StreamEvent {
    /// Whether no further events follow this one
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::TurnComplete | StreamEvent::Failed(_))
    }
}

/// Fields of one payload the decoder acts on
///
/// Each field is read on its own, so a field of the wrong type is treated as
/// absent without hiding the others.
#[derive(Debug)]
struct FramePayload {
    event: Option<String>,
    answer: Option<String>,
    conversation_id: Option<String>,
    message: Option<String>,
}

fn parse_payload(json: &str) -> Result<FramePayload, ProtocolError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| ProtocolError::MalformedPayload(e.to_string()))?;
    let field = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);

    Ok(FramePayload {
        event: field("event"),
        answer: field("answer"),
        conversation_id: field("conversation_id"),
        message: field("message"),
    })
}

/// Stateful UTF-8 decoding that tolerates code points split across chunks
#[derive(Debug, Default)]
struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    fn decode_into(&mut self, chunk: &[u8], out: &mut String) {
        let input = if self.pending.is_empty() {
            std::borrow::Cow::Borrowed(chunk)
        } else {
            let mut joined = std::mem::take(&mut self.pending);
            joined.extend_from_slice(chunk);
            std::borrow::Cow::Owned(joined)
        };

        let mut rest: &[u8] = &input;
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    return;
                }
                Err(err) => {
                    let (valid, tail) = rest.split_at(err.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    match err.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &tail[len..];
                        }
                        None => {
                            // Incomplete sequence at the end of the chunk
                            self.pending = tail.to_vec();
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Bytes of an unfinished code point left over at end of input
    fn take_pending(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.pending)
    }
}

/// Incremental line-buffering decoder for one response body
#[derive(Debug, Default)]
pub struct FrameDecoder {
    utf8: Utf8Decoder,
    buffer: String,
    complete: bool,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a terminal event has been produced
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Consume one chunk of the body and return the events it completes
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.complete {
            return events;
        }

        self.utf8.decode_into(chunk, &mut self.buffer);

        let Some(last_newline) = self.buffer.rfind('\n') else {
            return events;
        };
        let partial = self.buffer.split_off(last_newline + 1);
        let lines = std::mem::replace(&mut self.buffer, partial);

        for line in lines.split('\n') {
            if self.complete {
                break;
            }
            self.process_line(line, &mut events);
        }

        if self.complete {
            self.buffer.clear();
        }
        events
    }

    /// Signal end of data; a final line without a trailing newline is still processed
    pub fn finish(mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.complete {
            return events;
        }

        let dropped = self.utf8.take_pending();
        if !dropped.is_empty() {
            debug!(bytes = dropped.len(), "dropping incomplete UTF-8 sequence at end of stream");
        }

        let line = std::mem::take(&mut self.buffer);
        self.process_line(&line, &mut events);
        events
    }

    fn process_line(&mut self, line: &str, events: &mut Vec<StreamEvent>) {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let Some(json) = line.strip_prefix(EVENT_MARKER) else {
            if !line.is_empty() {
                trace!(line, "ignoring non-data line");
            }
            return;
        };

        match parse_payload(json) {
            Ok(payload) => self.apply(payload, events),
            Err(err) => debug!(%err, "skipping frame"),
        }
    }

    fn apply(&mut self, payload: FramePayload, events: &mut Vec<StreamEvent>) {
        let event = payload.event.as_deref().unwrap_or_default();

        if matches!(event, "message" | "agent_message") {
            if let Some(answer) = payload.answer.filter(|a| !a.is_empty()) {
                events.push(StreamEvent::ContentDelta(answer));
            }
        }

        if let Some(id) = payload.conversation_id.filter(|id| !id.is_empty()) {
            events.push(StreamEvent::ConversationAssigned(id));
        }

        match event {
            "message_end" | "workflow_finished" => {
                self.complete = true;
                events.push(StreamEvent::TurnComplete);
            }
            "error" => {
                self.complete = true;
                let message = payload
                    .message
                    .unwrap_or_else(|| "The assistant reported an error".to_string());
                events.push(StreamEvent::Failed(message));
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(chunks: &[&[u8]]) -> Vec<StreamEvent> {
        let mut decoder = FrameDecoder::new();
        let mut events = Vec::new();
        for chunk in chunks {
            events.extend(decoder.feed(chunk));
        }
        events.extend(decoder.finish());
        events
    }

    fn assemble(events: &[StreamEvent]) -> String {
        events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::ContentDelta(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_hello_then_stop() {
        let body = concat!(
            "data: {\"event\":\"message\",\"answer\":\"Hel\"}\n",
            "data: {\"event\":\"message\",\"answer\":\"lo\"}\n",
            "data: {\"event\":\"message_end\"}\n",
            "data: {\"event\":\"message\",\"answer\":\" world\"}\n",
        );
        let mut decoder = FrameDecoder::new();
        let events = decoder.feed(body.as_bytes());

        assert_eq!(assemble(&events), "Hello");
        assert_eq!(events.last(), Some(&StreamEvent::TurnComplete));
        assert!(decoder.is_complete());
        assert!(decoder.feed(b"data: {\"event\":\"message\",\"answer\":\"!\"}\n").is_empty());
    }

    #[test]
    fn test_partial_line_is_retained() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(b"data: {\"event\":\"mess").is_empty());
        let events = decoder.feed(b"age\",\"answer\":\"hi\"}\n");
        assert_eq!(events, vec![StreamEvent::ContentDelta("hi".to_string())]);
    }

    #[test]
    fn test_split_inside_code_point() {
        let frame = "data: {\"event\":\"message\",\"answer\":\"caf\u{e9} \u{1f980}\"}\n";
        let bytes = frame.as_bytes();
        let crab = frame.find('\u{1f980}').unwrap();
        let events = decode_all(&[&bytes[..crab + 1], &bytes[crab + 1..crab + 3], &bytes[crab + 3..]]);
        assert_eq!(assemble(&events), "caf\u{e9} \u{1f980}");
    }

    #[test]
    fn test_non_marker_lines_ignored() {
        let events = decode_all(&[
            b"event: ping\n",
            b": keep-alive\n",
            b"data:{\"event\":\"message\",\"answer\":\"no space\"}\n",
            b"\n",
        ]);
        assert!(events.is_empty());
    }

    #[test]
    fn test_malformed_json_does_not_stop_decoding() {
        let events = decode_all(&[
            b"data: {not json}\n",
            b"data: [DONE]\n",
            b"data: {\"event\":\"message\",\"answer\":\"ok\"}\n",
        ]);
        assert_eq!(events, vec![StreamEvent::ContentDelta("ok".to_string())]);
    }

    #[test]
    fn test_conversation_id_on_any_frame() {
        let events = decode_all(&[
            b"data: {\"event\":\"workflow_started\",\"conversation_id\":\"abc\"}\n",
            b"data: {\"event\":\"message\",\"answer\":\"x\",\"conversation_id\":\"abc\"}\n",
            b"data: {\"event\":\"message_end\",\"conversation_id\":\"abc\"}\n",
        ]);
        assert_eq!(
            events,
            vec![
                StreamEvent::ConversationAssigned("abc".to_string()),
                StreamEvent::ContentDelta("x".to_string()),
                StreamEvent::ConversationAssigned("abc".to_string()),
                StreamEvent::ConversationAssigned("abc".to_string()),
                StreamEvent::TurnComplete,
            ]
        );
    }

    #[test]
    fn test_mistyped_field_does_not_hide_others() {
        let events = decode_all(&[
            b"data: {\"event\":1,\"conversation_id\":\"abc\"}\n",
            b"data: {\"event\":\"message\",\"answer\":\"hi\",\"message\":[1]}\n",
            b"data: {\"event\":\"error\",\"message\":{\"code\":5}}\n",
        ]);

        assert_eq!(
            events,
            vec![
                StreamEvent::ConversationAssigned("abc".to_string()),
                StreamEvent::ContentDelta("hi".to_string()),
                StreamEvent::Failed("The assistant reported an error".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_conversation_id_ignored() {
        let events = decode_all(&[b"data: {\"event\":\"message\",\"answer\":\"a\",\"conversation_id\":\"\"}\n"]);
        assert_eq!(events, vec![StreamEvent::ContentDelta("a".to_string())]);
    }

    #[test]
    fn test_workflow_finished_and_agent_message() {
        let events = decode_all(&[
            b"data: {\"event\":\"agent_message\",\"answer\":\"thinking aloud\"}\n",
            b"data: {\"event\":\"workflow_finished\"}\n",
        ]);
        assert_eq!(assemble(&events), "thinking aloud");
        assert_eq!(events.last(), Some(&StreamEvent::TurnComplete));
    }

    #[test]
    fn test_error_event_is_terminal() {
        let events = decode_all(&[
            b"data: {\"event\":\"error\",\"status\":400,\"message\":\"quota exceeded\"}\n",
            b"data: {\"event\":\"message\",\"answer\":\"late\"}\n",
        ]);
        assert_eq!(events, vec![StreamEvent::Failed("quota exceeded".to_string())]);
        assert!(events[0].is_terminal());
    }

    #[test]
    fn test_crlf_line_endings() {
        let events = decode_all(&[b"data: {\"event\":\"message\",\"answer\":\"crlf\"}\r\n\r\n"]);
        assert_eq!(assemble(&events), "crlf");
    }

    #[test]
    fn test_finish_processes_unterminated_line() {
        let events = decode_all(&[b"data: {\"event\":\"message\",\"answer\":\"tail\"}"]);
        assert_eq!(assemble(&events), "tail");
    }

    #[test]
    fn test_empty_chunks_are_harmless() {
        let events = decode_all(&[b"", b"data: {\"event\":\"message\",\"answer\":\"a\"}\n", b""]);
        assert_eq!(assemble(&events), "a");
    }

    #[test]
    fn test_message_without_answer() {
        let events = decode_all(&[b"data: {\"event\":\"message\"}\n"]);
        assert!(events.is_empty());
    }

    #[test]
    fn test_invalid_byte_replaced() {
        let mut chunk = b"data: {\"event\":\"message\",\"answer\":\"a".to_vec();
        chunk.push(0xff);
        chunk.extend_from_slice(b"b\"}\n");
        let events = decode_all(&[chunk.as_slice()]);
        assert_eq!(assemble(&events), "a\u{fffd}b");
    }
}
