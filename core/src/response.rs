//! Raw HTTP/1.x response text parser.
//!
//! # Design
//! The transport hands over the response as one text blob:
//!
//! ```text
//! <PROTOCOL> <CODE> <STATUS TEXT>\n
//! <Header-Key>: <Header-Value>\n
//! ...
//! \n
//! <body>
//! ```
//!
//! Lines may also end in `\r\n`; the `\r` is dropped and a `\r\n` blank
//! line ends the header block just like a bare `\n` one.
//!
//! `parse_response` is total: it never panics and never returns an error.
//! Anything that does not fit the layout above degrades to a best-effort
//! field value and a `ParseAnomaly` entry, so the caller can always render
//! something.

use serde::Serialize;
use thiserror::Error;

use crate::cookie::{parse_cookie, Cookie};

const HEADER_SEPARATOR: &str = ": ";
const BLANK_LINES: [&str; 2] = ["\n\n", "\n\r\n"];

/// One header line, kept in message order. Duplicate keys are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub key: String,
    pub value: String,
}

/// Deviations from the expected layout found while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseAnomaly {
    /// No `\n` at all: the whole text was taken as the start line.
    #[error("start line is not terminated")]
    UnterminatedStartLine,

    /// The status code token is not a number.
    #[error("status code {token:?} is not a number")]
    NonNumericStatus { token: String },

    /// A header line without `": "`; recorded with an empty value.
    #[error("header line {line} has no `: ` separator: {text:?}")]
    MissingHeaderSeparator { line: usize, text: String },

    /// No blank line after the headers: everything was taken as headers
    /// and the body is empty.
    #[error("headers are not terminated by a blank line")]
    UnterminatedHeaders,
}

/// Structured view of one raw response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedResponse {
    pub protocol: String,
    /// `None` when the code token is not numeric (see `anomalies`).
    pub status_code: Option<u16>,
    pub status_text: String,
    pub headers: Vec<Header>,
    pub cookies: Vec<Cookie>,
    pub body: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub anomalies: Vec<ParseAnomaly>,
}

impl ParsedResponse {
    /// `true` when the text matched the expected layout exactly.
    pub fn is_well_formed(&self) -> bool {
        self.anomalies.is_empty()
    }

    /// Values of every header matching `key` case-insensitively.
    pub fn header_values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |h| h.key.eq_ignore_ascii_case(key))
            .map(|h| h.value.as_str())
    }
}

/// Parse raw response text into a `ParsedResponse`.
pub fn parse_response(raw: &str) -> ParsedResponse {
    let mut parsed = ParsedResponse::default();

    let (start_line, rest) = match raw.find('\n') {
        Some(eol) => (&raw[..eol], Some(&raw[eol..])),
        None => {
            parsed.anomalies.push(ParseAnomaly::UnterminatedStartLine);
            (raw, None)
        }
    };
    parse_start_line(start_line.trim_end_matches('\r'), &mut parsed);

    let Some(rest) = rest else {
        return parsed;
    };

    // `rest` still begins with the start line's `\n`, so a response without
    // headers has its blank line at offset 0.
    let (header_block, body) = match find_blank_line(rest) {
        Some((0, len)) => ("", &rest[len..]),
        Some((end, len)) => (&rest[1..end], &rest[end + len..]),
        None => {
            parsed.anomalies.push(ParseAnomaly::UnterminatedHeaders);
            (&rest[1..], "")
        }
    };

    for (index, line) in header_block.split('\n').enumerate() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        let (key, value) = match line.split_once(HEADER_SEPARATOR) {
            Some((key, value)) => (key, value),
            None => {
                parsed.anomalies.push(ParseAnomaly::MissingHeaderSeparator {
                    line: index + 1,
                    text: line.to_string(),
                });
                (line, "")
            }
        };
        if key.eq_ignore_ascii_case("set-cookie") {
            parsed.cookies.push(parse_cookie(value));
        }
        parsed.headers.push(Header {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    parsed.body = body.to_string();
    parsed
}

/// Offset and length of the earliest blank-line marker in `text`.
fn find_blank_line(text: &str) -> Option<(usize, usize)> {
    BLANK_LINES
        .iter()
        .filter_map(|marker| text.find(marker).map(|at| (at, marker.len())))
        .min_by_key(|&(at, _)| at)
}

fn parse_start_line(line: &str, parsed: &mut ParsedResponse) {
    let (protocol, status) = line.split_once(' ').unwrap_or((line, ""));
    let (code, text) = status.split_once(' ').unwrap_or((status, ""));

    parsed.protocol = protocol.to_string();
    parsed.status_text = text.to_string();
    parsed.status_code = code.parse().ok();
    if parsed.status_code.is_none() {
        parsed.anomalies.push(ParseAnomaly::NonNumericStatus {
            token: code.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_not_found_response() {
        let parsed = parse_response("HTTP/1.1 404 Not Found\nContent-Type: text/plain\n\nNope");
        assert_eq!(parsed.protocol, "HTTP/1.1");
        assert_eq!(parsed.status_code, Some(404));
        assert_eq!(parsed.status_text, "Not Found");
        assert_eq!(
            parsed.headers,
            vec![Header {
                key: "Content-Type".to_string(),
                value: "text/plain".to_string()
            }]
        );
        assert!(parsed.cookies.is_empty());
        assert_eq!(parsed.body, "Nope");
        assert!(parsed.is_well_formed());
    }

    #[test]
    fn status_text_keeps_inner_spaces() {
        let parsed = parse_response("HTTP/1.0 505 HTTP Version Not Supported\nA: b\n\n");
        assert_eq!(parsed.status_code, Some(505));
        assert_eq!(parsed.status_text, "HTTP Version Not Supported");
    }

    #[test]
    fn collects_one_cookie_per_set_cookie_header() {
        let raw = "HTTP/1.1 200 OK\n\
                   Set-Cookie: id=42; Path=/; HttpOnly\n\
                   content-type: text/html\n\
                   set-cookie: theme=dark\n\
                   \n\
                   <p>hi</p>";
        let parsed = parse_response(raw);
        assert_eq!(parsed.headers.len(), 3);
        assert_eq!(parsed.cookies.len(), 2);
        assert_eq!(parsed.cookies[0].name, "id");
        assert_eq!(parsed.cookies[0].http_only(), Some("true"));
        assert_eq!(parsed.cookies[1].name, "theme");
        assert_eq!(parsed.cookies[1].value, "dark");
    }

    #[test]
    fn duplicate_headers_keep_order() {
        let parsed = parse_response("HTTP/1.1 200 OK\nVia: a\nX: 1\nVia: b\n\n");
        let vias: Vec<_> = parsed.header_values("via").collect();
        assert_eq!(vias, vec!["a", "b"]);
        assert_eq!(parsed.headers[1].key, "X");
    }

    #[test]
    fn body_may_contain_blank_lines() {
        let parsed = parse_response("HTTP/1.1 200 OK\nA: 1\n\nline1\n\nline2\n");
        assert_eq!(parsed.body, "line1\n\nline2\n");
    }

    #[test]
    fn response_without_headers() {
        let parsed = parse_response("HTTP/1.1 204 No Content\n\n");
        assert!(parsed.headers.is_empty());
        assert_eq!(parsed.body, "");
        assert!(parsed.is_well_formed());
    }

    #[test]
    fn header_value_splits_on_first_separator_only() {
        let parsed = parse_response("HTTP/1.1 200 OK\nX-Note: a: b\n\n");
        assert_eq!(parsed.headers[0].value, "a: b");
    }

    #[test]
    fn header_without_separator_is_kept_with_empty_value() {
        let parsed = parse_response("HTTP/1.1 200 OK\nA: 1\nbroken-line\n\nbody");
        assert_eq!(parsed.headers.len(), 2);
        assert_eq!(parsed.headers[1].key, "broken-line");
        assert_eq!(parsed.headers[1].value, "");
        assert_eq!(
            parsed.anomalies,
            vec![ParseAnomaly::MissingHeaderSeparator {
                line: 2,
                text: "broken-line".to_string()
            }]
        );
        assert_eq!(parsed.body, "body");
    }

    #[test]
    fn non_numeric_status_is_an_anomaly() {
        let parsed = parse_response("HTTP/1.1 abc Weird\n\n");
        assert_eq!(parsed.status_code, None);
        assert_eq!(parsed.status_text, "Weird");
        assert_eq!(
            parsed.anomalies,
            vec![ParseAnomaly::NonNumericStatus {
                token: "abc".to_string()
            }]
        );
    }

    #[test]
    fn status_line_without_text() {
        let parsed = parse_response("HTTP/1.1 200\nA: 1\n\nok");
        assert_eq!(parsed.status_code, Some(200));
        assert_eq!(parsed.status_text, "");
        assert!(parsed.is_well_formed());
    }

    #[test]
    fn missing_blank_line_takes_everything_as_headers() {
        let parsed = parse_response("HTTP/1.1 200 OK\nA: 1\nB: 2");
        assert_eq!(parsed.headers.len(), 2);
        assert_eq!(parsed.body, "");
        assert_eq!(parsed.anomalies, vec![ParseAnomaly::UnterminatedHeaders]);
    }

    #[test]
    fn single_line_input_is_only_a_start_line() {
        let parsed = parse_response("HTTP/1.1 500 Internal Server Error");
        assert_eq!(parsed.status_code, Some(500));
        assert_eq!(parsed.status_text, "Internal Server Error");
        assert!(parsed.headers.is_empty());
        assert_eq!(parsed.anomalies, vec![ParseAnomaly::UnterminatedStartLine]);
    }

    #[test]
    fn empty_input_does_not_panic() {
        let parsed = parse_response("");
        assert_eq!(parsed.protocol, "");
        assert_eq!(parsed.status_code, None);
        assert_eq!(parsed.anomalies.len(), 2);
    }

    #[test]
    fn carriage_returns_are_trimmed_from_lines() {
        let parsed = parse_response("HTTP/1.1 200 OK\r\nA: 1\r\n\nbody");
        assert_eq!(parsed.status_text, "OK");
        assert_eq!(parsed.headers[0].value, "1");
    }

    #[test]
    fn crlf_blank_line_ends_the_header_block() {
        let parsed = parse_response(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nSet-Cookie: a=1\r\n\r\nline one\r\n\r\nline two",
        );
        assert!(parsed.is_well_formed(), "{:?}", parsed.anomalies);
        assert_eq!(parsed.headers.len(), 2);
        assert_eq!(parsed.headers[1].value, "a=1");
        assert_eq!(parsed.cookies[0].value, "1");
        assert_eq!(parsed.body, "line one\r\n\r\nline two");
    }

    #[test]
    fn crlf_response_without_headers() {
        let parsed = parse_response("HTTP/1.1 204 No Content\r\n\r\n");
        assert!(parsed.is_well_formed());
        assert!(parsed.headers.is_empty());
        assert_eq!(parsed.body, "");
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let parsed = parse_response("HTTP/1.1 404 Not Found\nContent-Type: text/plain\n\nNope");
        let json = serde_json::to_value(&parsed).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "protocol": "HTTP/1.1",
                "statusCode": 404,
                "statusText": "Not Found",
                "headers": [{"key": "Content-Type", "value": "text/plain"}],
                "cookies": [],
                "body": "Nope"
            })
        );
    }
}
