//! Incremental decoder for the `text/event-stream` wire format.
//!
//! Only the `data` field matters to this crate: consecutive `data:` lines are joined with
//! `\n` and handed out when a blank line ends the event. `id` is remembered, `event` and
//! `retry` are accepted and ignored, and `:` lines are comments. Lines may end in `\n`
//! or `\r\n`. Invalid UTF-8 is replaced rather than rejected.

/// Splits a byte stream into event data strings.
#[derive(Debug, Default)]
pub struct SseDecoder {
    /// Bytes of an incomplete line
    buffer: Vec<u8>,
    /// `data` lines of the event being assembled
    data: Option<String>,
    last_event_id: Option<String>,
}

impl SseDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return the data of every event it completes, in order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.buffer[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            let line = self.buffer[start..end]
                .strip_suffix(b"\r")
                .unwrap_or(&self.buffer[start..end]);
            let line = String::from_utf8_lossy(line).into_owned();
            start = end + 1;

            if let Some(frame) = self.process_line(&line) {
                frames.push(frame);
            }
        }
        self.buffer.drain(..start);

        frames
    }

    /// The most recent `id` field seen on the stream.
    #[must_use]
    pub fn last_event_id(&self) -> Option<&str> {
        self.last_event_id.as_deref()
    }

    fn process_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return self.data.take().filter(|data| !data.is_empty());
        }

        if line.starts_with(':') {
            #[cfg(feature = "tracing")]
            tracing::trace!("event stream comment");
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "data" => match &mut self.data {
                Some(data) => {
                    data.push('\n');
                    data.push_str(value);
                }
                None => self.data = Some(value.to_owned()),
            },
            "id" if !value.contains('\0') => self.last_event_id = Some(value.to_owned()),
            _ => {
                #[cfg(feature = "tracing")]
                tracing::trace!(field, value, "ignoring event stream field");
            }
        }

        None
    }
}
