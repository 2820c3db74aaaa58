//! Client-side core of an HTTP request playground.
//!
//! # Overview
//! Holds the state behind a request form (URL bar, query parameters,
//! headers, method, body) and turns a raw response text back into structured
//! data, without touching the network (host-does-IO pattern). The host
//! executes the request described by `Playground::submit`, writes the
//! response out as text (see `RawResponseBuilder`) and hands it back through
//! `Playground::complete`.
//!
//! # Design
//! - `response::parse_response` and `cookie::parse_cookie` are pure and never
//!   fail; malformed input is reported as `ParseAnomaly` values.
//! - `query::QuerySync` keeps the URL bar and the parameter rows in sync in
//!   both directions and persists the URL through a `TargetStore`.
//! - `format::format_body` decodes and re-indents a response body by media
//!   type before the host writes it into the raw response text.
//! - Collections (Postman v2.1) can be flattened and loaded into the form.
//! - Types use owned `String` / `Vec` fields to simplify FFI mapping.

pub mod builder;
pub mod collection;
pub mod config;
pub mod cookie;
pub mod error;
pub mod format;
pub mod http;
pub mod query;
pub mod response;
pub mod rows;
pub mod session;
pub mod store;

pub use builder::RawResponseBuilder;
pub use collection::{Collection, CollectionRequest};
pub use config::PlaygroundConfig;
pub use cookie::{parse_cookie, Cookie};
pub use error::{CollectionError, FormatError, PlaygroundError, StoreError};
pub use format::{format_body, BodyFormat};
pub use http::{HttpMethod, HttpRequest};
pub use query::QuerySync;
pub use response::{parse_response, Header, ParseAnomaly, ParsedResponse};
pub use rows::{KeyValueRow, RowTable};
pub use session::{Completion, Playground, RequestTicket, ResponseView, Submission};
pub use store::{DisabledStore, JsonFileStore, MemoryStore, TargetStore};
