//! Incremental decoder for the `text/event-stream` wire format.

const BOM: &[u8] = b"\xEF\xBB\xBF";
const DEFAULT_EVENT: &str = "message";
/// Upper bound for a pending line and for the data of one event.
const MAX_EVENT_BYTES: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

impl SseEvent {
    pub fn is_message(&self) -> bool {
        self.event == DEFAULT_EVENT
    }
}

/// Feeds arbitrary byte chunks, yields complete events. Chunk boundaries may
/// fall anywhere, including inside a line terminator or a UTF-8 sequence.
///
/// An event that outgrows [`MAX_EVENT_BYTES`] is discarded.
#[derive(Debug, Default)]
pub struct SseDecoder {
    line: Vec<u8>,
    data: String,
    event: Option<String>,
    started: bool,
    skip_lf: bool,
    /// Rest of an oversized line is skipped up to its terminator.
    overflow: bool,
}

impl SseDecoder {
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        let mut events = Vec::new();
        let mut rest = chunk;

        if self.skip_lf && !rest.is_empty() {
            if rest[0] == b'\n' {
                rest = &rest[1..];
            }
            self.skip_lf = false;
        }

        while let Some(pos) = rest.iter().position(|b| *b == b'\n' || *b == b'\r') {
            self.append(&rest[..pos]);
            let terminator = rest[pos];
            rest = &rest[pos + 1..];

            if terminator == b'\r' {
                match rest.first() {
                    Some(b'\n') => rest = &rest[1..],
                    Some(_) => {}
                    None => self.skip_lf = true,
                }
            }

            if std::mem::take(&mut self.overflow) {
                continue;
            }

            let line = std::mem::take(&mut self.line);
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }

        self.append(rest);
        events
    }

    fn append(&mut self, bytes: &[u8]) {
        if self.overflow {
            return;
        }

        if self.line.len() + bytes.len() > MAX_EVENT_BYTES {
            tracing::warn!("event stream line exceeds {MAX_EVENT_BYTES} bytes, discarding event");
            self.discard();
            self.overflow = true;
            return;
        }

        self.line.extend_from_slice(bytes);
    }

    fn discard(&mut self) {
        self.line = Vec::new();
        self.data = String::new();
        self.event = None;
    }

    fn process_line(&mut self, line: &[u8]) -> Option<SseEvent> {
        let line = if self.started {
            line
        } else {
            self.started = true;
            line.strip_prefix(BOM).unwrap_or(line)
        };

        if line.is_empty() {
            return self.dispatch();
        }
        if line[0] == b':' {
            return None;
        }

        let line = String::from_utf8_lossy(line);
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (&*line, ""),
        };

        match field {
            "data" if self.data.len() + value.len() >= MAX_EVENT_BYTES => {
                tracing::warn!("event data exceeds {MAX_EVENT_BYTES} bytes, discarding event");
                self.discard();
            }
            "data" => {
                self.data.push_str(value);
                self.data.push('\n');
            }
            "event" => self.event = Some(value.to_string()),
            _ => {}
        }

        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }

        let mut data = std::mem::take(&mut self.data);
        data.pop();

        Some(SseEvent {
            event: event
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_EVENT.to_string()),
            data,
        })
    }
}
