//! Wire encoding of progress events as OpenAI-compatible SSE chunks.

use crate::types::{ProgressEvent, WorkerRole};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

/// Splits text into chunks of at most `words_per_chunk` words while keeping
/// every byte of the original, including all whitespace. Concatenating the
/// chunks reproduces the input exactly.
pub fn chunk_text(text: &str, words_per_chunk: usize) -> Vec<String> {
    let words_per_chunk = words_per_chunk.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut words_in_current = 0;
    let mut in_word = false;

    for ch in text.chars() {
        if ch.is_whitespace() {
            in_word = false;
        } else if !in_word {
            // A word boundary: cut before starting a word that would
            // overflow the chunk.
            if words_in_current == words_per_chunk {
                chunks.push(std::mem::take(&mut current));
                words_in_current = 0;
            }
            in_word = true;
            words_in_current += 1;
        }
        current.push(ch);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn status_emoji(role: WorkerRole) -> &'static str {
    match role {
        WorkerRole::Search => "\u{1F50D}",
        WorkerRole::Analyst => "\u{1F4CA}",
        WorkerRole::Geo => "\u{1F5FA}\u{FE0F}",
        WorkerRole::Redactor => "\u{270F}\u{FE0F}",
        WorkerRole::Orchestrator => "\u{1F9E0}",
    }
}

/// Encodes one request's progress events as `chat.completion.chunk` SSE
/// payloads. One encoder per request: all frames share one chunk id.
pub struct StreamEncoder {
    id: String,
    model: String,
}

impl StreamEncoder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            id: format!("chatcmpl-{}", Uuid::new_v4()),
            model: model.into(),
        }
    }

    fn content_frame(&self, content: &str) -> String {
        json!({
            "id": self.id,
            "object": "chat.completion.chunk",
            "created": Utc::now().timestamp(),
            "model": self.model,
            "choices": [{
                "index": 0,
                "delta": {"content": content},
                "finish_reason": serde_json::Value::Null,
            }]
        })
        .to_string()
    }

    fn finish_frame(&self) -> String {
        json!({
            "id": self.id,
            "object": "chat.completion.chunk",
            "created": Utc::now().timestamp(),
            "model": self.model,
            "choices": [{
                "index": 0,
                "delta": {},
                "finish_reason": "stop",
            }]
        })
        .to_string()
    }

    /// SSE data payloads for one event. `Done` produces the finish frame
    /// followed by the `[DONE]` sentinel; everything else produces at most
    /// one content frame.
    pub fn encode(&self, event: &ProgressEvent) -> Vec<String> {
        match event {
            ProgressEvent::Started(role) => vec![self.content_frame(&format!(
                "{} {}: Working...\n",
                status_emoji(*role),
                role.display_name()
            ))],
            ProgressEvent::Completed(role) => vec![self.content_frame(&format!(
                "\u{2713} {}: Done\n",
                role.display_name()
            ))],
            ProgressEvent::Failed(role) => vec![self.content_frame(&format!(
                "\u{26A0}\u{FE0F} {}: Failed\n",
                role.display_name()
            ))],
            ProgressEvent::SynthesisStarted => {
                vec![self.content_frame("\nSynthesizing results...\n\n")]
            }
            ProgressEvent::ContentChunk(text) => vec![self.content_frame(text)],
            ProgressEvent::Done => vec![self.finish_frame(), "[DONE]".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_text_round_trips_exactly() {
        let inputs = [
            "alpha beta gamma delta epsilon",
            "  leading and   irregular\n\nwhitespace\ttabs  ",
            "single",
            "",
            "one two three four five six seven",
        ];
        for input in inputs {
            for n in 1..=4 {
                let joined: String = chunk_text(input, n).concat();
                assert_eq!(joined, input, "words_per_chunk={}", n);
            }
        }
    }

    #[test]
    fn test_chunk_text_word_grouping() {
        let chunks = chunk_text("a b c d e", 2);
        assert_eq!(chunks, vec!["a b", " c d", " e"]);
    }

    #[test]
    fn test_chunk_text_zero_treated_as_one() {
        let chunks = chunk_text("a b", 0);
        assert_eq!(chunks, vec!["a", " b"]);
    }

    #[test]
    fn test_content_chunk_passes_through_verbatim() {
        let encoder = StreamEncoder::new("talon-orchestrator");
        let frames = encoder.encode(&ProgressEvent::ContentChunk("hello world".to_string()));
        assert_eq!(frames.len(), 1);

        let parsed: serde_json::Value = serde_json::from_str(&frames[0]).unwrap();
        assert_eq!(parsed["object"], "chat.completion.chunk");
        assert_eq!(parsed["model"], "talon-orchestrator");
        assert_eq!(parsed["choices"][0]["delta"]["content"], "hello world");
        assert!(parsed["choices"][0]["finish_reason"].is_null());
    }

    #[test]
    fn test_done_emits_finish_frame_then_sentinel() {
        let encoder = StreamEncoder::new("m");
        let frames = encoder.encode(&ProgressEvent::Done);
        assert_eq!(frames.len(), 2);

        let parsed: serde_json::Value = serde_json::from_str(&frames[0]).unwrap();
        assert_eq!(parsed["choices"][0]["finish_reason"], "stop");
        assert_eq!(frames[1], "[DONE]");
    }

    #[test]
    fn test_chunk_id_stable_within_request() {
        let encoder = StreamEncoder::new("m");
        let a = encoder.encode(&ProgressEvent::SynthesisStarted);
        let b = encoder.encode(&ProgressEvent::Started(WorkerRole::Search));
        let ida: serde_json::Value = serde_json::from_str(&a[0]).unwrap();
        let idb: serde_json::Value = serde_json::from_str(&b[0]).unwrap();
        assert_eq!(ida["id"], idb["id"]);
        assert!(ida["id"].as_str().unwrap().starts_with("chatcmpl-"));
    }

    #[test]
    fn test_progress_frames_render_status_lines() {
        let encoder = StreamEncoder::new("m");
        let started = encoder.encode(&ProgressEvent::Started(WorkerRole::Search));
        let parsed: serde_json::Value = serde_json::from_str(&started[0]).unwrap();
        let content = parsed["choices"][0]["delta"]["content"].as_str().unwrap();
        assert!(content.contains("SearchAgent: Working..."));
    }
}
