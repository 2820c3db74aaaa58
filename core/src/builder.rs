//! Serialization of a response into the raw text format `parse_response`
//! consumes.
//!
//! Hosts that execute a `HttpRequest` with their own HTTP library use this to
//! hand the outcome back to the playground, including transport failures
//! (see `RawResponseBuilder::from_error`).

use std::fmt;

use chrono::Utc;

pub const DEFAULT_PROTOCOL: &str = "HTTP/1.0";
pub const DEFAULT_STATUS: &str = "200 OK";
pub const SERVER_NAME: &str = "playground (v1.0)";

#[derive(Debug, Clone, Default)]
pub struct RawResponseBuilder {
    start_line: Option<String>,
    headers: Vec<(String, String)>,
    body: String,
}

impl RawResponseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain-text error response carrying `err` as its body.
    pub fn from_error(err: &dyn fmt::Display) -> Self {
        let mut builder = Self::new();
        builder.write_error(err);
        builder.default_headers();
        builder
    }

    pub fn start_line(&mut self, protocol: &str, status: &str) -> &mut Self {
        self.start_line = Some(format!("{} {}", protocol.trim(), status.trim()));
        self
    }

    pub fn header(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn headers<K, V>(&mut self, headers: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in headers {
            self.header(key, value);
        }
        self
    }

    /// Replace all headers with the ones the playground sends for its own
    /// plain-text responses.
    pub fn default_headers(&mut self) -> &mut Self {
        self.headers.clear();
        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        self.header("Content-Length", self.body.len().to_string())
            .header("Content-Type", "text/plain; charset=utf-8")
            .header("Date", date)
            .header("Server", SERVER_NAME)
    }

    pub fn write(&mut self, text: &str) -> &mut Self {
        self.body.push_str(text);
        self
    }

    /// Discard the body written so far and replace it with `err`.
    pub fn write_error(&mut self, err: &dyn fmt::Display) -> &mut Self {
        self.body = err.to_string();
        self
    }

    /// Headers are emitted sorted by key; repeated keys keep their order.
    pub fn build(&self) -> String {
        let default_line = format!("{DEFAULT_PROTOCOL} {DEFAULT_STATUS}");
        let start_line = self.start_line.as_deref().unwrap_or(&default_line);

        let mut headers: Vec<&(String, String)> = self.headers.iter().collect();
        headers.sort_by(|a, b| a.0.cmp(&b.0));

        let mut out = String::with_capacity(start_line.len() + self.body.len() + 64);
        out.push_str(start_line);
        out.push('\n');
        for (key, value) in headers {
            out.push_str(key);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.body);
        out
    }
}

impl fmt::Display for RawResponseBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build())
    }
}
