//! Postman (v2.1) request collections.
//!
//! # Design
//! Only the fields the playground can load into its form are decoded. A
//! collection is a tree of folders and requests; `Collection::requests`
//! flattens it into `CollectionRequest` records, each carrying the folder
//! path in `full_name` and its URL with `{{variable}}` placeholders
//! resolved from the collection variables.

use std::collections::HashMap;
use std::io::Read;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CollectionError;

/// Separator between folder names in `CollectionRequest::full_name`.
pub const PATH_SEPARATOR: &str = " / ";

fn variable_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{([a-zA-Z0-9_]+)\}\}").expect("variable pattern is valid")
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub info: CollectionInfo,
    #[serde(default)]
    pub item: Vec<CollectionItem>,
    #[serde(default)]
    pub variable: Vec<CollectionVariable>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionInfo {
    #[serde(default)]
    pub name: String,
}

/// A folder (non-empty `item`) or a single request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub item: Vec<CollectionItem>,
    pub request: Option<RequestDefinition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestDefinition {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub header: Vec<CollectionHeader>,
    #[serde(default)]
    pub url: RequestUrl,
    pub body: Option<RequestBody>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionHeader {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
    /// Disabled headers are not sent.
    #[serde(default)]
    pub disabled: bool,
}

/// Postman writes the URL either as a plain string or as a broken-down
/// object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RequestUrl {
    Raw(String),
    Detailed(UrlParts),
}

impl Default for RequestUrl {
    fn default() -> Self {
        RequestUrl::Raw(String::new())
    }
}

impl RequestUrl {
    pub fn raw(&self) -> &str {
        match self {
            RequestUrl::Raw(raw) => raw,
            RequestUrl::Detailed(parts) => &parts.raw,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UrlParts {
    #[serde(default)]
    pub raw: String,
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub port: String,
    #[serde(default)]
    pub query: Vec<KeyValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestBody {
    /// One of `raw`, `urlencoded`, `formdata`, `file` or `graphql`.
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub raw: String,
    #[serde(default)]
    pub urlencoded: Vec<KeyValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionVariable {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub disabled: bool,
}

/// One request of a collection, flattened and ready to load into the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionRequest {
    pub id: String,
    pub name: String,
    pub full_name: String,
    #[serde(rename = "request_method")]
    pub method: String,
    #[serde(rename = "request_header")]
    pub headers: Vec<KeyValue>,
    #[serde(rename = "request_body_mode")]
    pub body_mode: String,
    #[serde(rename = "request_body_raw")]
    pub body_raw: String,
    #[serde(rename = "request_body_urlencoded")]
    pub body_urlencoded: Vec<KeyValue>,
    pub url_raw: String,
    pub url_port: String,
    pub url_protocol: String,
    pub url_query: Vec<KeyValue>,
    pub url_resolved: String,
}

impl Collection {
    pub fn from_reader(reader: impl Read) -> Result<Self, CollectionError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_json(text: &str) -> Result<Self, CollectionError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Every request in depth-first order, each with a fresh UUID.
    pub fn requests(&self) -> Vec<CollectionRequest> {
        self.requests_with_ids(|| Uuid::new_v4().to_string())
    }

    /// Like `requests`, with ids taken from `next_id`.
    pub fn requests_with_ids(&self, mut next_id: impl FnMut() -> String) -> Vec<CollectionRequest> {
        let variables: HashMap<&str, &str> = self
            .variable
            .iter()
            .filter(|v| !v.disabled)
            .map(|v| (v.key.as_str(), v.value.as_str()))
            .collect();

        let mut out = Vec::new();
        walk(&self.item, "", &variables, &mut next_id, &mut out);
        out
    }
}

fn walk(
    items: &[CollectionItem],
    prefix: &str,
    variables: &HashMap<&str, &str>,
    next_id: &mut dyn FnMut() -> String,
    out: &mut Vec<CollectionRequest>,
) {
    for item in items {
        if !item.item.is_empty() {
            let folder = format!("{prefix}{}{PATH_SEPARATOR}", item.name);
            walk(&item.item, &folder, variables, next_id, out);
            continue;
        }
        let Some(request) = &item.request else {
            tracing::warn!(name = %item.name, "skipping collection item without a request");
            continue;
        };
        out.push(flatten(item, request, prefix, variables, next_id()));
    }
}

fn flatten(
    item: &CollectionItem,
    request: &RequestDefinition,
    prefix: &str,
    variables: &HashMap<&str, &str>,
    id: String,
) -> CollectionRequest {
    let (protocol, port, query) = match &request.url {
        RequestUrl::Raw(_) => (String::new(), String::new(), Vec::new()),
        RequestUrl::Detailed(parts) => (parts.protocol.clone(), parts.port.clone(), parts.query.clone()),
    };
    let body = request.body.clone().unwrap_or_default();

    CollectionRequest {
        id,
        name: item.name.clone(),
        full_name: format!("{prefix}{}", item.name),
        method: request.method.clone(),
        headers: request
            .header
            .iter()
            .filter(|h| !h.disabled)
            .map(|h| KeyValue {
                key: h.key.clone(),
                value: h.value.clone(),
            })
            .collect(),
        body_mode: body.mode,
        body_raw: body.raw,
        body_urlencoded: body.urlencoded,
        url_raw: request.url.raw().to_string(),
        url_port: port,
        url_protocol: protocol,
        url_query: query,
        url_resolved: resolve_variables(request.url.raw(), variables),
    }
}

/// Replace `{{name}}` placeholders with their variable values. Unknown names
/// are left as written.
pub fn resolve_variables(text: &str, variables: &HashMap<&str, &str>) -> String {
    variable_pattern()
        .replace_all(text, |caps: &Captures| match variables.get(&caps[1]) {
            Some(value) => (*value).to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
