use std::ops::Deref;

use axum::response::{Html, IntoResponse, Response};
use camwall_core::ClientMessage;

const DEFAULT_BUFFER_SIZE: usize = 4096;

pub struct Buffer {
    content: String,
}

impl Deref for Buffer {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.content
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self {
            content: String::with_capacity(DEFAULT_BUFFER_SIZE),
        }
    }
}

impl Buffer {
    pub fn empty() -> Self {
        Self {
            content: String::new(),
        }
    }

    pub fn push_str(&mut self, s: &str) {
        self.content.push_str(s);
    }

    pub fn push_html(&mut self, s: &str) {
        html_escape::encode_safe_to_string(s, &mut self.content);
    }

    /// For values inside a double-quoted attribute.
    pub fn push_attr(&mut self, s: &str) {
        html_escape::encode_double_quoted_attribute_to_string(s, &mut self.content);
    }

    pub fn push_char(&mut self, c: char) {
        self.content.push(c);
    }

    /// ` data-command="..."` carrying the websocket form of a command.
    pub fn push_command(&mut self, command: &ClientMessage) {
        match serde_json::to_string(command) {
            Ok(json) => {
                self.push_str(" data-command=\"");
                self.push_attr(&json);
                self.push_char('"');
            }
            Err(error) => tracing::error!("failed to encode command {command:?}: {error}"),
        }
    }

    pub fn into_html(self) -> Html<String> {
        Html(self.content)
    }
}

impl From<Buffer> for String {
    fn from(buffer: Buffer) -> Self {
        buffer.content
    }
}

impl IntoResponse for Buffer {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}
