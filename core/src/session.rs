//! The playground controller.
//!
//! # Design
//! `Playground` owns all form state: the URL bar and its parameter table,
//! the header table, the method and body fields, the in-flight request and
//! the last response. It is built once per session and driven by UI
//! callbacks.
//!
//! Requests follow the host-does-IO split: `submit` hands out a
//! `Submission` (a `RequestTicket` plus the `HttpRequest` to execute) and the
//! host later calls `complete` with the raw response text. Every submission
//! gets a new sequence number and only the latest one is applied, so a slow
//! response can never overwrite a newer one.

use std::time::{Duration, Instant};

use url::Url;

use crate::collection::CollectionRequest;
use crate::config::PlaygroundConfig;
use crate::error::PlaygroundError;
use crate::http::{canonical_header_key, HttpMethod, HttpRequest};
use crate::query::QuerySync;
use crate::response::{parse_response, ParsedResponse};
use crate::rows::{KeyValueRow, RowTable};
use crate::store::TargetStore;

const STATUS_REFERENCE: &str = "https://developer.mozilla.org/en-US/docs/Web/HTTP/Status";

/// Identifies one submission; returned to `Playground::complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket {
    sequence: u64,
}

impl RequestTicket {
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Rebuild a ticket from a sequence number that crossed an FFI boundary.
    pub fn from_sequence(sequence: u64) -> Self {
        Self { sequence }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub ticket: RequestTicket,
    pub request: HttpRequest,
}

/// Outcome of `Playground::complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The response was parsed and is now `Playground::response`.
    Applied,
    /// A newer request was submitted (or this one already completed); the
    /// response was discarded.
    Stale { sequence: u64, latest: u64 },
}

/// The last response, as shown in the response panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseView {
    pub response: ParsedResponse,
    pub elapsed: Duration,
}

impl ResponseView {
    /// `"404 Not Found"`; the code falls back to `NaN` when unparseable.
    pub fn status_label(&self) -> String {
        let code = self
            .response
            .status_code
            .map_or_else(|| "NaN".to_string(), |code| code.to_string());
        format!("{code} {}", self.response.status_text).trim_end().to_string()
    }

    /// Documentation page for the status code.
    pub fn reference_url(&self) -> Option<String> {
        self.response
            .status_code
            .map(|code| format!("{STATUS_REFERENCE}/{code}"))
    }

    pub fn elapsed_millis(&self) -> u128 {
        self.elapsed.as_millis()
    }

    /// Body size in kilobytes (1 KB = 1000 bytes).
    pub fn body_kilobytes(&self) -> f64 {
        self.response.body.len() as f64 / 1000.0
    }
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    sequence: u64,
    started: Instant,
}

#[derive(Debug)]
pub struct Playground {
    config: PlaygroundConfig,
    query: QuerySync,
    headers: RowTable,
    method: HttpMethod,
    body: String,
    last_sequence: u64,
    in_flight: Option<InFlight>,
    response: Option<ResponseView>,
}

impl Playground {
    /// Start a session: restore the last target from `store`, let the page's
    /// `target` parameter override it, then derive the parameter rows.
    pub fn new(config: PlaygroundConfig, store: Box<dyn TargetStore>) -> Self {
        let mut query = QuerySync::new(config.storage_key(), store);

        let initial = config
            .page_url
            .as_deref()
            .and_then(startup_override)
            .or_else(|| query.stored_target())
            .unwrap_or_default();
        query.replace_target(&initial);
        query.pull();
        tracing::debug!(target_url = %query.target(), "playground session started");

        Self {
            config,
            query,
            headers: RowTable::new(),
            method: HttpMethod::default(),
            body: String::new(),
            last_sequence: 0,
            in_flight: None,
            response: None,
        }
    }

    pub fn config(&self) -> &PlaygroundConfig {
        &self.config
    }

    pub fn target(&self) -> &str {
        self.query.target()
    }

    pub fn params(&self) -> &[KeyValueRow] {
        self.query.rows()
    }

    pub fn headers(&self) -> &[KeyValueRow] {
        self.headers.rows()
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn response(&self) -> Option<&ResponseView> {
        self.response.as_ref()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// URL bar keystroke.
    pub fn set_target(&mut self, target: &str) {
        self.query.set_target(target);
    }

    pub fn set_param_key(&mut self, index: usize, key: &str) {
        self.query.set_row_key(index, key);
    }

    pub fn set_param_value(&mut self, index: usize, value: &str) {
        self.query.set_row_value(index, value);
    }

    pub fn set_header_key(&mut self, index: usize, key: &str) {
        if self.headers.set_key(index, key) {
            self.headers.on_key_changed(index);
        } else {
            tracing::warn!(index, rows = self.headers.len(), "ignoring key edit for missing header row");
        }
    }

    pub fn set_header_value(&mut self, index: usize, value: &str) {
        if !self.headers.set_value(index, value) {
            tracing::warn!(index, rows = self.headers.len(), "ignoring value edit for missing header row");
        }
    }

    pub fn set_method(&mut self, method: HttpMethod) {
        self.method = method;
    }

    pub fn set_body(&mut self, body: &str) {
        self.body = body.to_string();
    }

    /// Forget the displayed response. An in-flight request stays in flight.
    pub fn reset_response(&mut self) {
        self.response = None;
    }

    /// Fill the form from a collection request.
    ///
    /// Methods without a body clear it. Otherwise only the `raw` and
    /// `urlencoded` body modes replace the current body.
    pub fn load_request(&mut self, request: &CollectionRequest) {
        self.reset_response();

        self.query.replace_target(&request.url_resolved);
        self.query
            .replace_rows(request.url_query.iter().map(|q| (q.key.as_str(), q.value.as_str())));
        self.headers
            .fill(request.headers.iter().map(|h| (h.key.as_str(), h.value.as_str())));

        match request.method.parse::<HttpMethod>() {
            Ok(method) => self.method = method,
            Err(err) => tracing::warn!(error = %err, "keeping current method"),
        }

        if !self.method.allows_body() {
            self.body.clear();
        } else {
            match request.body_mode.as_str() {
                "urlencoded" => {
                    self.body = request
                        .body_urlencoded
                        .iter()
                        .map(|field| format!("{}={}", field.key, field.value))
                        .collect::<Vec<_>>()
                        .join("\n&");
                }
                "raw" => self.body = request.body_raw.clone(),
                mode => tracing::debug!(mode, "keeping current body"),
            }
        }
        tracing::debug!(name = %request.full_name, "loaded collection request");
    }

    /// Validate the form and describe the request for the host to execute.
    ///
    /// Clears the displayed response and supersedes any request still in
    /// flight.
    pub fn submit(&mut self) -> Result<Submission, PlaygroundError> {
        let target = self.query.target().trim().to_string();
        if target.is_empty() {
            return Err(PlaygroundError::InvalidTarget {
                target,
                reason: "empty target".to_string(),
            });
        }
        if let Err(e) = Url::parse(&target) {
            return Err(PlaygroundError::InvalidTarget {
                target,
                reason: e.to_string(),
            });
        }
        if self.body.len() >= self.config.max_body_bytes {
            return Err(PlaygroundError::BodyTooLarge {
                len: self.body.len(),
                limit: self.config.max_body_bytes,
            });
        }

        let headers = self
            .headers
            .pairs()
            .map(|(key, value)| (canonical_header_key(key), value.to_string()))
            .collect();
        let body = (self.method.allows_body() && !self.body.is_empty()).then(|| self.body.clone());

        self.last_sequence += 1;
        let ticket = RequestTicket {
            sequence: self.last_sequence,
        };
        if let Some(previous) = self.in_flight {
            tracing::debug!(superseded = previous.sequence, "request superseded before completion");
        }
        self.in_flight = Some(InFlight {
            sequence: ticket.sequence,
            started: Instant::now(),
        });
        self.response = None;
        tracing::debug!(sequence = ticket.sequence, method = %self.method, target_url = %target, "submitting request");

        Ok(Submission {
            ticket,
            request: HttpRequest {
                method: self.method,
                target,
                headers,
                body,
            },
        })
    }

    /// Deliver the raw response text for `ticket`.
    pub fn complete(&mut self, ticket: RequestTicket, raw: &str) -> Completion {
        let in_flight = match self.in_flight {
            Some(in_flight) if in_flight.sequence == ticket.sequence => in_flight,
            _ => {
                tracing::debug!(sequence = ticket.sequence, latest = self.last_sequence, "discarding stale response");
                return Completion::Stale {
                    sequence: ticket.sequence,
                    latest: self.last_sequence,
                };
            }
        };

        let response = parse_response(raw);
        if !response.is_well_formed() {
            tracing::debug!(anomalies = ?response.anomalies, "response text did not match the expected layout");
        }
        self.in_flight = None;
        self.response = Some(ResponseView {
            response,
            elapsed: in_flight.started.elapsed(),
        });
        Completion::Applied
    }
}

/// The request target carried by the hosting page's `target` query
/// parameter. A leading `/` is resolved against the page origin.
fn startup_override(page_url: &str) -> Option<String> {
    let page = match Url::parse(page_url) {
        Ok(page) => page,
        Err(e) => {
            tracing::error!(page_url, error = %e, "invalid page URL");
            return None;
        }
    };
    let target = page
        .query_pairs()
        .find(|(key, _)| key == "target")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())?;

    let absolute = if target.starts_with('/') {
        format!("{}{target}", page.origin().ascii_serialization())
    } else {
        target
    };
    match Url::parse(&absolute) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            tracing::error!(target_url = %absolute, error = %e, "ignoring unusable target override");
            None
        }
    }
}
