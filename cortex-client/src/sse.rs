//! Server-Sent Events decoding for streamed completions
//!
//! The inference endpoint answers with lines of the form
//! `data: {"choices":[{"delta":{"content":"..."}}]}`. Only the delta text is
//! kept; anything that is not a `data:` line, or whose payload is not valid
//! JSON of that shape, is dropped.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Option<Delta>,
}

#[derive(Debug, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

/// Incremental decoder fed with raw body chunks as they arrive.
///
/// Network chunks can end mid-line, so bytes are buffered until a newline
/// is seen.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    text: String,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a chunk of the response body
    pub fn feed(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);

        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.handle_line(&line[..line.len() - 1]);
        }
    }

    /// Flush any trailing line without a newline and return the text
    pub fn finish(mut self) -> String {
        if !self.pending.is_empty() {
            let line = std::mem::take(&mut self.pending);
            self.handle_line(&line);
        }
        self.text
    }

    fn handle_line(&mut self, raw: &[u8]) {
        let line = String::from_utf8_lossy(raw);
        let line = line.trim_end_matches('\r');
        if let Some(fragment) = delta_content(line) {
            self.text.push_str(&fragment);
        }
    }
}

/// Extract `choices[0].delta.content` from one SSE line, if present
fn delta_content(line: &str) -> Option<String> {
    let payload = line.strip_prefix("data:")?;
    let payload = payload.strip_prefix(' ').unwrap_or(payload);

    let chunk: StreamChunk = match serde_json::from_str(payload) {
        Ok(chunk) => chunk,
        Err(e) => {
            log::trace!("Skipping unparseable SSE payload: {}", e);
            return None;
        }
    };

    chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta)
        .and_then(|d| d.content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_text(body: &str) -> String {
        let mut decoder = SseDecoder::new();
        decoder.feed(body.as_bytes());
        decoder.finish()
    }

    fn data_line(content: &str) -> String {
        format!(
            "data: {}\n",
            serde_json::json!({"choices": [{"delta": {"content": content}}]})
        )
    }

    #[test]
    fn test_concatenates_fragments_in_order() {
        let body = [data_line("Cred"), data_line("ibility: "), data_line("42")].concat();
        assert_eq!(collect_text(&body), "Credibility: 42");
    }

    #[test]
    fn test_skips_malformed_lines() {
        let body = format!(
            "{}data: {{not json\n{}data: [DONE]\n",
            data_line("a"),
            data_line("b")
        );
        assert_eq!(collect_text(&body), "ab");
    }

    #[test]
    fn test_ignores_non_data_lines() {
        let body = format!(
            "event: message\n: keep-alive\n\n{}id: 7\n{}",
            data_line("x"),
            data_line("y")
        );
        assert_eq!(collect_text(&body), "xy");
    }

    #[test]
    fn test_chunks_without_content_contribute_nothing() {
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n",
            "data: {\"choices\":[]}\n",
            "data: {\"usage\":{\"total_tokens\":12}}\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n",
        );
        assert_eq!(collect_text(body), "ok");
    }

    #[test]
    fn test_fragment_split_across_chunks() {
        let body = [data_line("hello "), data_line("world")].concat();
        let bytes = body.as_bytes();

        let mut decoder = SseDecoder::new();
        for piece in bytes.chunks(5) {
            decoder.feed(piece);
        }
        assert_eq!(decoder.finish(), "hello world");
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        let body = data_line("café ✓");
        let bytes = body.as_bytes();
        let split = bytes.len() - 8;

        let mut decoder = SseDecoder::new();
        decoder.feed(&bytes[..split]);
        decoder.feed(&bytes[split..]);
        assert_eq!(decoder.finish(), "café ✓");
    }

    #[test]
    fn test_crlf_and_missing_trailing_newline() {
        let body = "data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\r\n\
                    data: {\"choices\":[{\"delta\":{\"content\":\"b\"}}]}";
        assert_eq!(collect_text(body), "ab");
    }

    #[test]
    fn test_data_prefix_without_space() {
        let body = "data:{\"choices\":[{\"delta\":{\"content\":\"z\"}}]}\n";
        assert_eq!(collect_text(body), "z");
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(collect_text(""), "");
    }
}
