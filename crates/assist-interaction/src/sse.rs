//! Server-Sent Events framing for the assistant stream.
//!
//! Splits a `text/event-stream` body into frames. Unlike a browser
//! `EventSource`, a frame that names an event but carries no `data:` line is
//! still emitted: the backend sends `event: done` without a payload.

use assist_core::{AssistError, Result};

/// One raw frame: the `event:` name and the joined `data:` lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    /// Event name, `message` when the frame has no `event:` line.
    pub event: String,
    /// Data lines joined with `\n`.
    pub data: String,
}

/// Incremental frame decoder.
///
/// Bytes are buffered until a full line is available, so chunks may split
/// lines (and multi-byte characters) anywhere.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: String,
    has_data: bool,
    bom_checked: bool,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk and returns every frame completed by it.
    ///
    /// Fails on a line that is not valid UTF-8.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<SseFrame>> {
        self.buffer.extend_from_slice(chunk);

        if !self.bom_checked && self.buffer.len() >= 3 {
            self.bom_checked = true;
            if self.buffer.starts_with(&[0xEF, 0xBB, 0xBF]) {
                self.buffer.drain(..3);
            }
        }

        let mut frames = Vec::new();
        let mut start = 0usize;
        while let Some(offset) = self.buffer[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            let mut line = &self.buffer[start..end];
            if let Some(stripped) = line.strip_suffix(b"\r") {
                line = stripped;
            }
            let line = std::str::from_utf8(line)
                .map_err(|err| AssistError::protocol(format!("invalid UTF-8 in stream: {err}")))?
                .to_string();
            start = end + 1;

            if let Some(frame) = self.process_line(&line) {
                frames.push(frame);
            }
        }

        if start > 0 {
            self.buffer.drain(..start);
        }
        Ok(frames)
    }

    /// Flushes a trailing frame when the body ends without a blank line.
    pub fn finish(&mut self) -> Result<Option<SseFrame>> {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let line = std::str::from_utf8(&rest)
                .map_err(|err| AssistError::protocol(format!("invalid UTF-8 in stream: {err}")))?
                .trim_end_matches('\r')
                .to_string();
            if let Some(frame) = self.process_line(&line) {
                return Ok(Some(frame));
            }
        }
        Ok(self.take_frame())
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.take_frame();
        }
        if line.starts_with(':') {
            // keep-alive comment
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => {
                if self.has_data {
                    self.data.push('\n');
                }
                self.data.push_str(value);
                self.has_data = true;
            }
            _ => {} // id, retry and unknown fields are not used
        }
        None
    }

    fn take_frame(&mut self) -> Option<SseFrame> {
        if self.event.is_none() && !self.has_data {
            return None;
        }
        let event = self
            .event
            .take()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "message".to_string());
        self.has_data = false;
        Some(SseFrame {
            event,
            data: std::mem::take(&mut self.data),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(event: &str, data: &str) -> SseFrame {
        SseFrame {
            event: event.to_string(),
            data: data.to_string(),
        }
    }

    #[test]
    fn test_basic_frames() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder
            .feed(b"event: meta\ndata: {\"conversationId\":\"c1\"}\n\nevent: done\n\n")
            .unwrap();

        assert_eq!(
            frames,
            vec![
                frame("meta", r#"{"conversationId":"c1"}"#),
                frame("done", ""),
            ]
        );
    }

    #[test]
    fn test_crlf_and_comments() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder
            .feed(b": ping\r\n\r\nevent: content\r\ndata: \"hi\"\r\n\r\n")
            .unwrap();

        assert_eq!(frames, vec![frame("content", "\"hi\"")]);
    }

    #[test]
    fn test_multiline_data_is_joined() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(b"event: references\ndata: [\ndata: ]\n\n").unwrap();

        assert_eq!(frames, vec![frame("references", "[\n]")]);
    }

    #[test]
    fn test_frame_split_across_chunks() {
        let bytes = "event: content\ndata: \"近期有\"\n\n".as_bytes();
        let mut decoder = FrameDecoder::new();
        let mut frames = Vec::new();

        // split inside the multi-byte characters as well
        for chunk in bytes.chunks(5) {
            frames.extend(decoder.feed(chunk).unwrap());
        }

        assert_eq!(frames, vec![frame("content", "\"近期有\"")]);
    }

    #[test]
    fn test_frame_without_event_name_defaults_to_message() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(b"data: hello\n\n").unwrap();

        assert_eq!(frames, vec![frame("message", "hello")]);
    }

    #[test]
    fn test_finish_flushes_unterminated_frame() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(b"event: done").unwrap().is_empty());

        assert_eq!(decoder.finish().unwrap(), Some(frame("done", "")));
        assert_eq!(decoder.finish().unwrap(), None);
    }

    #[test]
    fn test_invalid_utf8_is_protocol_error() {
        let mut decoder = FrameDecoder::new();
        let err = decoder.feed(b"data: \xff\xfe\n\n").unwrap_err();
        assert!(err.is_protocol());
    }

    #[test]
    fn test_bom_is_stripped() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(b"\xEF\xBB\xBFevent: done\n\n").unwrap();

        assert_eq!(frames, vec![frame("done", "")]);
    }
}
