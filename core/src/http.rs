//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! The core describes the request the user composed as plain data. The host
//! executes it with whatever HTTP library it has, serializes the outcome as
//! raw response text (see `builder::RawResponseBuilder`) and hands that text
//! back to `Playground::complete`. Nothing in the core touches the network.
//!
//! All fields use owned types (`String`, `Vec`) so values can cross FFI
//! boundaries without lifetime concerns.

use std::fmt;
use std::str::FromStr;

use url::form_urlencoded;

use crate::error::PlaygroundError;

/// HTTP method selectable in the playground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }

    /// Methods for which the request body field is sent.
    pub fn allows_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = PlaygroundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            _ => Err(PlaygroundError::UnsupportedMethod(s.to_string())),
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by `Playground::submit`. The caller is responsible for executing
/// this request and returning the raw response text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Form fields of the partial-update submission, in the order the
    /// playground form posts them.
    pub fn form_fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = vec![
            ("request_target", self.target.as_str()),
            ("request_method", self.method.as_str()),
        ];
        for (key, value) in &self.headers {
            fields.push(("header-key", key.as_str()));
            fields.push(("header-value", value.as_str()));
        }
        if let Some(body) = &self.body {
            fields.push(("http-request-body", body.as_str()));
        }
        fields
    }

    /// `application/x-www-form-urlencoded` encoding of `form_fields`.
    pub fn to_form_body(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.form_fields())
            .finish()
    }
}

/// Canonical MIME header casing: `content-type` becomes `Content-Type`.
///
/// Keys containing bytes outside the HTTP token set are returned unchanged.
pub fn canonical_header_key(key: &str) -> String {
    if !key.bytes().all(is_token_byte) {
        return key.to_string();
    }
    let mut upper = true;
    key.chars()
        .map(|c| {
            let mapped = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            mapped
        })
        .collect()
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parses_case_insensitively() {
        assert_eq!("patch".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert_eq!(" GET ".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert!(matches!(
            "BREW".parse::<HttpMethod>(),
            Err(PlaygroundError::UnsupportedMethod(_))
        ));
    }

    #[test]
    fn only_write_methods_allow_body() {
        assert!(HttpMethod::Post.allows_body());
        assert!(HttpMethod::Patch.allows_body());
        assert!(!HttpMethod::Get.allows_body());
        assert!(!HttpMethod::Delete.allows_body());
    }

    #[test]
    fn canonical_header_key_capitalizes_each_word() {
        assert_eq!(canonical_header_key("content-type"), "Content-Type");
        assert_eq!(canonical_header_key("X-REQUEST-ID"), "X-Request-Id");
        assert_eq!(canonical_header_key("accept"), "Accept");
    }

    #[test]
    fn canonical_header_key_leaves_invalid_keys_alone() {
        assert_eq!(canonical_header_key("bad key"), "bad key");
    }

    #[test]
    fn form_body_repeats_header_fields() {
        let req = HttpRequest {
            method: HttpMethod::Post,
            target: "http://localhost:3000/echo?a=1".to_string(),
            headers: vec![
                ("Accept".to_string(), "*/*".to_string()),
                ("X-Token".to_string(), "a b".to_string()),
            ],
            body: Some("hello".to_string()),
        };
        assert_eq!(
            req.to_form_body(),
            "request_target=http%3A%2F%2Flocalhost%3A3000%2Fecho%3Fa%3D1\
             &request_method=POST\
             &header-key=Accept&header-value=*%2F*\
             &header-key=X-Token&header-value=a+b\
             &http-request-body=hello"
        );
    }

    #[test]
    fn form_fields_omit_missing_body() {
        let req = HttpRequest {
            method: HttpMethod::Get,
            target: "http://localhost".to_string(),
            headers: Vec::new(),
            body: None,
        };
        let names: Vec<_> = req.form_fields().into_iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["request_target", "request_method"]);
    }
}
