//! Response body formatting for display.
//!
//! # Design
//! The host hands over the body bytes together with the response's
//! `Content-Type` and `Content-Encoding`. `format_body` undoes the content
//! encoding, picks a `BodyFormat` from the media type and re-indents the
//! text:
//!
//! | media type                                                 | format |
//! |------------------------------------------------------------|--------|
//! | `application/json`, `application/problem+json`             | JSON   |
//! | `application/xml`, `application/problem+xml`, `text/xml`   | XML    |
//! | `text/html`                                                | HTML   |
//! | `application/sql`, `application/yaml`, any other `text/*`  | text   |
//!
//! Other media types are refused with `FormatError::UnsupportedMediaType`.
//! The formatters themselves never fail: input they cannot make sense of is
//! shown trimmed.

use std::io::Read;
use std::sync::OnceLock;

use brotli::Decompressor;
use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::FormatError;

/// Indentation unit used by `format_body`.
pub const DEFAULT_INDENT: &str = "  ";

/// How a response body is laid out for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Json,
    Xml,
    Html,
    Text,
}

impl BodyFormat {
    /// Pick the format for a `Content-Type` value. Parameters such as
    /// `charset` are ignored and the comparison is case-insensitive.
    pub fn for_content_type(content_type: &str) -> Result<Self, FormatError> {
        let media_type = media_type(content_type);
        match media_type.as_str() {
            "application/json" | "application/problem+json" => Ok(Self::Json),
            "application/xml" | "application/problem+xml" | "text/xml" => Ok(Self::Xml),
            "text/html" => Ok(Self::Html),
            "application/sql" | "application/yaml" => Ok(Self::Text),
            _ if media_type.split_once('/').is_some_and(|(kind, _)| kind == "text") => Ok(Self::Text),
            _ => Err(FormatError::UnsupportedMediaType(media_type)),
        }
    }

    pub fn format(self, input: &str, indent: &str) -> String {
        match self {
            Self::Json => format_json(input, indent),
            Self::Xml => format_xml(input, indent),
            Self::Html => format_html(input, indent),
            Self::Text => input.trim().to_string(),
        }
    }
}

/// Decode and pretty-print a response body.
///
/// An empty body stays empty whatever its media type. The media type is
/// checked before the body is decoded.
pub fn format_body(content_type: &str, content_encoding: &str, body: &[u8]) -> Result<String, FormatError> {
    if body.is_empty() {
        return Ok(String::new());
    }
    let format = BodyFormat::for_content_type(content_type)?;
    let decoded = decode_body(content_encoding, body)?;
    Ok(format.format(&String::from_utf8_lossy(&decoded), DEFAULT_INDENT))
}

fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

// ---------------------------------------------------------------------------
// Content-Encoding
// ---------------------------------------------------------------------------

/// Undo a `Content-Encoding` header value. Codings listed in one header are
/// removed last to first.
pub fn decode_body(content_encoding: &str, body: &[u8]) -> Result<Vec<u8>, FormatError> {
    let codings: Vec<String> = content_encoding
        .split(',')
        .map(|coding| coding.trim().to_ascii_lowercase())
        .filter(|coding| !coding.is_empty())
        .collect();

    let mut decoded = body.to_vec();
    for coding in codings.iter().rev() {
        decoded = decode_one(coding, &decoded)?;
    }
    Ok(decoded)
}

fn decode_one(coding: &str, body: &[u8]) -> Result<Vec<u8>, FormatError> {
    let decoded = match coding {
        "identity" => return Ok(body.to_vec()),
        "gzip" | "x-gzip" => read_all(GzDecoder::new(body)),
        // Servers disagree on whether `deflate` carries the zlib wrapper.
        "deflate" => read_all(ZlibDecoder::new(body)).or_else(|_| read_all(DeflateDecoder::new(body))),
        "flate" => read_all(DeflateDecoder::new(body)),
        "br" => read_all(Decompressor::new(body, 4096)),
        other => return Err(FormatError::UnsupportedEncoding(other.to_string())),
    };
    decoded.map_err(|source| FormatError::Decode {
        encoding: coding.to_string(),
        source,
    })
}

fn read_all(mut reader: impl Read) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    reader.read_to_end(&mut out)?;
    Ok(out)
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Re-indent JSON, keeping member order. Invalid JSON is shown trimmed.
fn format_json(input: &str, indent: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let value: serde_json::Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(error = %err, "body is not valid JSON, showing it as text");
            return trimmed.to_string();
        }
    };

    let mut out = Vec::with_capacity(trimmed.len() * 2);
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(indent.as_bytes()));
    if let Err(err) = value.serialize(&mut serializer) {
        tracing::debug!(error = %err, "could not re-indent JSON body");
        return trimmed.to_string();
    }
    String::from_utf8(out).unwrap_or_else(|_| trimmed.to_string())
}

// ---------------------------------------------------------------------------
// XML
// ---------------------------------------------------------------------------

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("formatter pattern is valid"))
}

/// One tag, comment, declaration or doctype.
fn xml_tag() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    pattern(&PATTERN, r"<([/!]?)([^>]+?)(/?)>")
}

fn xml_comment() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    pattern(&PATTERN, r"(?s)(<!--)(.*?)(-->)")
}

/// A comment with markup inside it.
fn xml_markup_in_comment() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    pattern(&PATTERN, r"<!--[^>]*?<[^>]+?[^-]*?-->")
}

fn xml_blanks_around_brackets() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    pattern(&PATTERN, r"\s*(<|/?>)\s*")
}

/// Text between two tags holding a line break, a tab or a run of spaces.
fn xml_loose_text() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    pattern(&PATTERN, r">([^<]*[\n\r\t]| {3,})[^<]*<")
}

fn blank_runs() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    pattern(&PATTERN, r"\s{2,}")
}

/// Put every element on its own line, one indent per nesting level.
///
/// Whitespace around brackets is dropped and runs of blanks inside tags and
/// text collapse to one space. Elements holding only text stay on one line.
/// Comments that contain markup are left exactly as written.
fn format_xml(input: &str, indent: &str) -> String {
    if input.len() < 2 {
        return String::new();
    }

    let shields_comments = xml_markup_in_comment().is_match(input);
    let text = if shields_comments {
        xml_markup_in_comment()
            .replace_all(input, |caps: &Captures| rewrite_comment(&caps[0], escape_markup))
            .into_owned()
    } else {
        input.to_string()
    };

    let text = xml_blanks_around_brackets().replace_all(&text, "${1}");
    let text = xml_loose_text().replace_all(&text, |caps: &Captures| blank_runs().replace_all(&caps[0], " ").into_owned());

    let mut layout = XmlLayout::new(indent);
    let mut text = xml_tag()
        .replace_all(&text, |caps: &Captures| layout.place(&caps[0]))
        .into_owned();

    if shields_comments {
        text = xml_comment()
            .replace_all(&text, |caps: &Captures| rewrite_comment(&caps[0], unescape_markup))
            .into_owned();
    }

    match text.strip_prefix('\n') {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

fn rewrite_comment(comment: &str, rewrite: fn(&str) -> String) -> String {
    match xml_comment().captures(comment) {
        Some(caps) => format!("{}{}{}", &caps[1], rewrite(&caps[2]), &caps[3]),
        None => comment.to_string(),
    }
}

fn escape_markup(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\'', "&#39;")
        .replace('"', "&#34;")
}

fn unescape_markup(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&#39;", "'")
        .replace("&#34;", "\"")
        .replace("&amp;", "&")
}

/// Places tags on new lines while `xml_tag` walks the document.
struct XmlLayout<'a> {
    indent: &'a str,
    depth: usize,
    /// The last tag closed an element (or stood alone), so the next closing
    /// tag goes on its own line.
    closed: bool,
}

impl<'a> XmlLayout<'a> {
    fn new(indent: &'a str) -> Self {
        Self {
            indent,
            depth: 0,
            closed: true,
        }
    }

    fn place(&mut self, tag: &str) -> String {
        if tag.starts_with("<?") {
            return format!("\n{}", blank_runs().replace_all(tag, " "));
        }

        if tag.ends_with("/>") {
            self.closed = true;
            return format!("\n{}{tag}", self.pad());
        }

        if tag.starts_with("<!") {
            self.closed = true;
            let is_doctype = tag.get(..9).is_some_and(|head| head.eq_ignore_ascii_case("<!doctype"));
            if is_doctype {
                return format!("\n{}{}", self.pad(), blank_runs().replace_all(tag, " "));
            }
            return format!("\n{}{tag}", self.pad());
        }

        if tag.starts_with("</") {
            self.depth = self.depth.saturating_sub(1);
            if !self.closed {
                self.closed = true;
                return tag.to_string();
            }
            return format!("\n{}{tag}", self.pad());
        }

        self.closed = false;
        let line = format!("\n{}{}", self.pad(), blank_runs().replace_all(tag, " "));
        self.depth += 1;
        line
    }

    fn pad(&self) -> String {
        self.indent.repeat(self.depth)
    }
}

// ---------------------------------------------------------------------------
// HTML
// ---------------------------------------------------------------------------

/// Elements that flow with the surrounding text.
const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "acronym", "b", "bdo", "big", "cite", "code", "dfn", "em", "i", "ins", "kbd", "map", "q", "samp",
    "small", "span", "strong", "sub", "sup", "tt", "var",
];

/// Elements without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is text up to the matching closing tag.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe", "noembed", "noframes", "noscript", "script", "style", "textarea", "title", "xmp",
];

/// Text lines longer than this go on their own line.
const SHORT_TEXT_CHARS: usize = 80;

fn is_inline(name: &str) -> bool {
    INLINE_ELEMENTS.contains(&name)
}

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HtmlTokenKind {
    Text,
    StartTag,
    EndTag,
    SelfClosingTag,
    Comment,
    Doctype,
}

#[derive(Debug)]
struct HtmlToken<'a> {
    kind: HtmlTokenKind,
    raw: &'a str,
    /// Lowercased element name; empty for text, comments and doctypes.
    name: String,
}

/// Splits HTML into tags and text, keeping every byte of the input in the
/// token `raw` slices.
struct HtmlTokenizer<'a> {
    input: &'a str,
    pos: usize,
    raw_text_element: Option<String>,
}

impl<'a> HtmlTokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            raw_text_element: None,
        }
    }

    fn emit(&mut self, kind: HtmlTokenKind, len: usize, name: String) -> HtmlToken<'a> {
        let raw = &self.input[self.pos..self.pos + len];
        self.pos += len;
        HtmlToken { kind, raw, name }
    }
}

impl<'a> Iterator for HtmlTokenizer<'a> {
    type Item = HtmlToken<'a>;

    fn next(&mut self) -> Option<HtmlToken<'a>> {
        let rest = &self.input[self.pos..];
        if rest.is_empty() {
            return None;
        }

        if let Some(element) = self.raw_text_element.take() {
            let end = find_closing_tag(rest, &element).unwrap_or(rest.len());
            if end > 0 {
                return Some(self.emit(HtmlTokenKind::Text, end, String::new()));
            }
        }

        if let Some((kind, len, name)) = markup_at(rest) {
            if kind == HtmlTokenKind::StartTag && RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                self.raw_text_element = Some(name.clone());
            }
            return Some(self.emit(kind, len, name));
        }

        let mut search = rest.chars().next().map_or(1, char::len_utf8);
        let end = loop {
            match rest[search..].find('<') {
                Some(offset) => {
                    let at = search + offset;
                    if markup_at(&rest[at..]).is_some() {
                        break at;
                    }
                    search = at + 1;
                }
                None => break rest.len(),
            }
        };
        Some(self.emit(HtmlTokenKind::Text, end, String::new()))
    }
}

/// Recognize the markup starting at `text`: its kind, byte length and
/// element name. A `<` that opens nothing is text.
fn markup_at(text: &str) -> Option<(HtmlTokenKind, usize, String)> {
    if !text.starts_with('<') {
        return None;
    }

    if let Some(body) = text.strip_prefix("<!--") {
        let len = body.find("-->").map_or(text.len(), |end| 4 + end + 3);
        return Some((HtmlTokenKind::Comment, len, String::new()));
    }

    if text.starts_with("<!") || text.starts_with("<?") {
        let len = text.find('>').map_or(text.len(), |end| end + 1);
        let is_doctype = text.get(2..9).is_some_and(|word| word.eq_ignore_ascii_case("doctype"));
        let kind = if is_doctype && text.starts_with("<!") {
            HtmlTokenKind::Doctype
        } else {
            HtmlTokenKind::Comment
        };
        return Some((kind, len, String::new()));
    }

    let (closing, name_start) = if text.starts_with("</") { (true, 2) } else { (false, 1) };
    if !text[name_start..].starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    let name_len = text[name_start..]
        .find(|c: char| c.is_ascii_whitespace() || c == '/' || c == '>')
        .unwrap_or(text.len() - name_start);
    let name = text[name_start..name_start + name_len].to_ascii_lowercase();
    let len = tag_end(text, name_start + name_len)?;

    let kind = if closing {
        HtmlTokenKind::EndTag
    } else if text[..len].ends_with("/>") {
        HtmlTokenKind::SelfClosingTag
    } else {
        HtmlTokenKind::StartTag
    };
    Some((kind, len, name))
}

/// Byte length of a tag through its closing `>`, skipping quoted values.
fn tag_end(text: &str, from: usize) -> Option<usize> {
    let mut quote = None;
    for (at, byte) in text.bytes().enumerate().skip(from) {
        match (quote, byte) {
            (Some(open), _) if byte == open => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(byte),
            (None, b'>') => return Some(at + 1),
            (None, _) => {}
        }
    }
    None
}

/// Offset of `</element` (any case) followed by the end of the name.
fn find_closing_tag(text: &str, element: &str) -> Option<usize> {
    let lower = text.to_ascii_lowercase();
    let needle = format!("</{element}");
    let mut from = 0;
    while let Some(offset) = lower[from..].find(&needle) {
        let at = from + offset;
        match lower.as_bytes().get(at + needle.len()) {
            None | Some(b'>' | b'/' | b' ' | b'\t' | b'\n' | b'\r' | b'\x0c') => return Some(at),
            Some(_) => from = at + 1,
        }
    }
    None
}

struct HtmlWriter<'a> {
    out: String,
    indent: &'a str,
    at_start: bool,
}

impl HtmlWriter<'_> {
    fn new_line(&mut self, depth: usize) {
        if self.at_start {
            self.at_start = false;
        } else {
            self.out.push('\n');
        }
        self.out.push_str(&self.indent.repeat(depth));
    }

    fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }
}

/// Put block elements on their own lines, one indent per nesting level.
///
/// Inline elements and short text stay on the line of their parent. Text
/// spanning several lines keeps its relative indentation, shifted to the
/// current depth.
fn format_html(input: &str, indent: &str) -> String {
    use HtmlTokenKind::*;

    let mut writer = HtmlWriter {
        out: String::with_capacity(input.len()),
        indent,
        at_start: true,
    };
    let mut depth = 0usize;
    let mut prev_kind: Option<HtmlTokenKind> = None;
    let mut name = String::new();
    let mut prev_name = String::new();
    let mut long_text = false;

    for token in HtmlTokenizer::new(input) {
        if token.kind != Text {
            prev_name = std::mem::replace(&mut name, token.name);
        }

        match token.kind {
            StartTag => {
                if !(is_inline(&name) && prev_kind == Some(Text)) {
                    writer.new_line(depth);
                }
                writer.push(token.raw);
                if !is_void(&name) {
                    depth += 1;
                }
            }
            SelfClosingTag | Comment | Doctype => {
                writer.new_line(depth);
                writer.push(token.raw);
            }
            EndTag => {
                depth = depth.saturating_sub(1);
                let own_line = prev_name != name
                    || matches!(prev_kind, Some(SelfClosingTag | Comment | Doctype))
                    || (prev_kind == Some(Text) && long_text);
                if own_line {
                    writer.new_line(depth);
                }
                writer.push(token.raw);
            }
            Text => {
                let expanded = token.raw.replace('\t', indent);
                let mut text = expanded.trim_matches(['\n', '\r', ' ']).to_string();
                let has_content = expanded.contains(|c: char| !c.is_whitespace());
                if has_content && expanded.ends_with(char::is_whitespace) {
                    text.push(' ');
                }
                let leading_blank = has_content && expanded.starts_with(char::is_whitespace);
                let after_inline_close = prev_kind == Some(EndTag) && is_inline(&name);

                long_text = false;
                if text.is_empty() {
                    // whitespace between tags
                } else if text.contains('\n') {
                    if !after_inline_close {
                        writer.new_line(depth);
                    } else if leading_blank {
                        text.insert(0, ' ');
                    }
                    writer.push(&shift_lines(&text, depth, indent));
                    long_text = true;
                } else {
                    if text.chars().count() > SHORT_TEXT_CHARS || prev_kind != Some(StartTag) {
                        if !after_inline_close {
                            writer.new_line(depth);
                            long_text = true;
                        } else if leading_blank {
                            text.insert(0, ' ');
                        }
                    }
                    writer.push(&text);
                }
            }
        }
        prev_kind = Some(token.kind);
    }

    writer.out
}

/// Strip the indentation shared by the lines of `text` and re-indent every
/// line after the first to `depth`.
fn shift_lines(text: &str, depth: usize, indent: &str) -> String {
    let shared = text
        .split('\n')
        .filter_map(|line| {
            let trimmed = line.trim_start_matches(' ');
            (!trimmed.is_empty()).then_some(line.len() - trimmed.len())
        })
        .min()
        .unwrap_or(0);
    let pad = indent.repeat(depth);

    let mut lines = text.split('\n');
    let mut out = lines.next().unwrap_or_default().to_string();
    for line in lines {
        out.push('\n');
        let mut chars = line.char_indices();
        let cut = (0..shared).try_fold(0, |_, _| match chars.next() {
            Some((at, c)) if c.is_whitespace() => Some(at + c.len_utf8()),
            _ => None,
        });
        match cut {
            Some(cut) => {
                out.push_str(&pad);
                out.push_str(&line[cut..]);
            }
            None => out.push_str(line),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use brotli::CompressorWriter;
    use flate2::write::{GzEncoder, ZlibEncoder};
    use flate2::Compression;

    use super::*;

    fn xml(input: &str) -> String {
        BodyFormat::Xml.format(input, DEFAULT_INDENT)
    }

    fn html(input: &str) -> String {
        BodyFormat::Html.format(input, DEFAULT_INDENT)
    }

    // -- dispatch --

    #[test]
    fn media_types_pick_their_format() {
        let cases = [
            ("application/json", BodyFormat::Json),
            ("application/problem+json; charset=utf-8", BodyFormat::Json),
            ("application/xml", BodyFormat::Xml),
            ("text/xml", BodyFormat::Xml),
            ("Text/HTML; charset=UTF-8", BodyFormat::Html),
            ("application/yaml", BodyFormat::Text),
            ("application/sql", BodyFormat::Text),
            ("text/plain", BodyFormat::Text),
            ("text/csv", BodyFormat::Text),
        ];
        for (content_type, expected) in cases {
            assert_eq!(BodyFormat::for_content_type(content_type).unwrap(), expected, "{content_type}");
        }
    }

    #[test]
    fn other_media_types_are_refused() {
        let err = BodyFormat::for_content_type("image/png").unwrap_err();
        assert!(matches!(&err, FormatError::UnsupportedMediaType(t) if t == "image/png"));
        assert_eq!(err.to_string(), "unsupported media type: image/png");

        assert!(BodyFormat::for_content_type("").is_err());
        assert!(BodyFormat::for_content_type("application/octet-stream").is_err());
    }

    #[test]
    fn empty_body_is_empty_for_any_media_type() {
        assert_eq!(format_body("image/png", "zstd", b"").unwrap(), "");
    }

    #[test]
    fn media_type_is_checked_before_encoding() {
        let err = format_body("image/png", "zstd", b"x").unwrap_err();
        assert!(matches!(err, FormatError::UnsupportedMediaType(_)));
    }

    // -- encodings --

    #[test]
    fn gzip_body_is_decoded() {
        let mut encoded = Vec::new();
        {
            let mut encoder = GzEncoder::new(&mut encoded, Compression::default());
            encoder.write_all(br#"{"ok":true}"#).unwrap();
            encoder.finish().unwrap();
        }
        let body = format_body("application/json", "gzip", &encoded).unwrap();
        assert_eq!(body, "{\n  \"ok\": true\n}");
    }

    #[test]
    fn deflate_accepts_zlib_and_raw_streams() {
        let mut zlib = Vec::new();
        {
            let mut encoder = ZlibEncoder::new(&mut zlib, Compression::default());
            encoder.write_all(b"hello deflate").unwrap();
            encoder.finish().unwrap();
        }
        assert_eq!(decode_body("deflate", &zlib).unwrap(), b"hello deflate");

        let mut raw = Vec::new();
        {
            let mut encoder = flate2::write::DeflateEncoder::new(&mut raw, Compression::default());
            encoder.write_all(b"hello flate").unwrap();
            encoder.finish().unwrap();
        }
        assert_eq!(decode_body("deflate", &raw).unwrap(), b"hello flate");
        assert_eq!(decode_body("flate", &raw).unwrap(), b"hello flate");
    }

    #[test]
    fn brotli_body_is_decoded() {
        let mut encoded = Vec::new();
        {
            let mut writer = CompressorWriter::new(&mut encoded, 4096, 5, 22);
            writer.write_all(b"hello br").unwrap();
            writer.flush().unwrap();
        }
        assert_eq!(format_body("text/plain", "br", &encoded).unwrap(), "hello br");
    }

    #[test]
    fn stacked_codings_are_removed_last_first() {
        let mut gzipped = Vec::new();
        {
            let mut encoder = GzEncoder::new(&mut gzipped, Compression::default());
            encoder.write_all(b"twice").unwrap();
            encoder.finish().unwrap();
        }
        let mut twice = Vec::new();
        {
            let mut encoder = ZlibEncoder::new(&mut twice, Compression::default());
            encoder.write_all(&gzipped).unwrap();
            encoder.finish().unwrap();
        }
        assert_eq!(decode_body("gzip, deflate", &twice).unwrap(), b"twice");
    }

    #[test]
    fn identity_and_missing_encoding_pass_through() {
        assert_eq!(decode_body("", b"plain").unwrap(), b"plain");
        assert_eq!(decode_body("identity", b"plain").unwrap(), b"plain");
    }

    #[test]
    fn unknown_encoding_is_refused() {
        let err = format_body("text/plain", "zstd", b"x").unwrap_err();
        assert_eq!(err.to_string(), "unsupported content encoding: zstd");
    }

    #[test]
    fn corrupt_stream_reports_the_coding() {
        let err = decode_body("gzip", b"not gzip").unwrap_err();
        assert!(matches!(&err, FormatError::Decode { encoding, .. } if encoding == "gzip"));
    }

    // -- text --

    #[test]
    fn text_is_trimmed_and_otherwise_untouched() {
        assert_eq!(BodyFormat::Text.format("", DEFAULT_INDENT), "");
        assert_eq!(BodyFormat::Text.format("\n\n   \n", DEFAULT_INDENT), "");
        let body = "fn main() {\n\tprintln!(\"hi\");\n}";
        assert_eq!(BodyFormat::Text.format(&format!("\n\n  {body}  \n\n"), DEFAULT_INDENT), body);
    }

    // -- JSON --

    #[test]
    fn json_is_indented_in_member_order() {
        let formatted = BodyFormat::Json.format(r#"{"b":1,"a":[1,2,{"c":null}],"e":{}}"#, DEFAULT_INDENT);
        assert_eq!(
            formatted,
            "{\n  \"b\": 1,\n  \"a\": [\n    1,\n    2,\n    {\n      \"c\": null\n    }\n  ],\n  \"e\": {}\n}"
        );
    }

    #[test]
    fn json_uses_the_given_indent() {
        assert_eq!(BodyFormat::Json.format("[1]", "\t"), "[\n\t1\n]");
    }

    #[test]
    fn invalid_json_is_shown_trimmed() {
        assert_eq!(BodyFormat::Json.format("  {oops  \n", DEFAULT_INDENT), "{oops");
        assert_eq!(BodyFormat::Json.format("   ", DEFAULT_INDENT), "");
    }

    // -- XML --

    #[test]
    fn xml_short_input_is_empty() {
        assert_eq!(xml(""), "");
        assert_eq!(xml("<"), "");
    }

    #[test]
    fn xml_declaration_blanks_collapse() {
        assert_eq!(
            xml("<?xml  version=\"1.0\"\n              encoding=\"UTF-8\"?><俄语 լեզու=\"ռուսերեն\">данные</俄语>"),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<俄语 լեզու=\"ռուսերեն\">данные</俄语>"
        );
    }

    #[test]
    fn xml_nested_elements_are_indented() {
        assert_eq!(
            xml("<root><level1><level2><level3><level4></level4></level3></level2></level1></root>"),
            "<root>\n  <level1>\n    <level2>\n      <level3>\n        <level4></level4>\n      </level3>\n    </level2>\n  </level1>\n</root>"
        );
        assert_eq!(xml("<root><item/></root>"), "<root>\n  <item/>\n</root>");
    }

    #[test]
    fn xml_records_keep_text_on_the_element_line() {
        let input = "<objects type=\"array\">\n<object><id type=\"integer\">1</id><name>Karl Zboncak</name>\n<created-at>2021-06-24T15:45:46.667Z</created-at></object></objects>";
        let expected = "<objects type=\"array\">\n  <object>\n    <id type=\"integer\">1</id>\n    <name>Karl Zboncak</name>\n    <created-at>2021-06-24T15:45:46.667Z</created-at>\n  </object>\n</objects>";
        assert_eq!(xml(input), expected);
    }

    #[test]
    fn xml_blanks_around_text_and_brackets_are_dropped() {
        assert_eq!(xml("<root><empty>    </empty></root>"), "<root>\n  <empty></empty>\n</root>");
        assert_eq!(
            xml("<object>   a     </object>\n<object>    b    <  /object>"),
            "<object>a</object>\n<object>b</object>"
        );
        assert_eq!(
            xml("<case><title>Lorem ipsum\n\ndolor sit amet ... </title></case>"),
            "<case>\n  <title>Lorem ipsum dolor sit amet ...</title>\n</case>"
        );
    }

    #[test]
    fn xml_comments_and_doctype_sit_on_their_own_line() {
        assert_eq!(
            xml("<root><!-- comment --><child><!-- nested comment --></child></root>"),
            "<root>\n  <!-- comment -->\n  <child>\n    <!-- nested comment -->\n  </child>\n</root>"
        );
        assert_eq!(
            xml("<?xml version=\"1.0\"   \n\nencoding=\"UTF-8\"?>\n<!DOCTYPE        people_list     SYSTEM \"example.dtd\">\n<people_list>  <person>    <name>Fred Bloggs</name>\n    <gender>Male</gender>  </person>\n</people_list>"),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE people_list SYSTEM \"example.dtd\">\n<people_list>\n  <person>\n    <name>Fred Bloggs</name>\n    <gender>Male</gender>\n  </person>\n</people_list>"
        );
    }

    #[test]
    fn xml_multiline_comment_keeps_its_layout() {
        assert_eq!(
            xml("<case>\n  <!-- The priority, specified as a simple\n  number. -->\n  <priority>2</priority>\n</case>"),
            "<case>\n  <!-- The priority, specified as a simple\n  number. -->\n  <priority>2</priority>\n</case>"
        );
    }

    #[test]
    fn xml_markup_inside_comments_is_left_alone() {
        let comment = "<!-- do not format\n  <person><name>Fred</name>    <gender>Male</gender>  </person>\n    -->";
        let input = format!("\n{comment}\n<people_list>  <person>    <name>Fred</name>  </person>\n</people_list>");
        let expected = format!("{comment}\n<people_list>\n  <person>\n    <name>Fred</name>\n  </person>\n</people_list>");
        assert_eq!(xml(&input), expected);
    }

    // -- HTML --

    #[test]
    fn html_document_is_indented() {
        let input = "<!DOCTYPE html><html><head><title>Hi</title></head><body><p>Hello <b>bold</b> world</p><br><img src=\"a.png\"/></body></html>";
        let expected = "\
<!DOCTYPE html>
<html>
  <head>
    <title>Hi</title>
  </head>
  <body>
    <p>Hello <b>bold</b> world</p>
    <br>
    <img src=\"a.png\"/>
  </body>
</html>";
        assert_eq!(html(input), expected);
    }

    #[test]
    fn html_comments_get_their_own_line() {
        assert_eq!(
            html("<ul><!-- items --><li>one</li></ul>"),
            "<ul>\n  <!-- items -->\n  <li>one</li>\n</ul>"
        );
    }

    #[test]
    fn html_script_content_is_not_tokenized() {
        assert_eq!(
            html("<div><script>if (a<b && c>d) {}</script></div>"),
            "<div>\n  <script>if (a<b && c>d) {}</script>\n</div>"
        );
    }

    #[test]
    fn html_long_text_goes_on_its_own_line() {
        let text = "a".repeat(90);
        assert_eq!(html(&format!("<p>{text}</p>")), format!("<p>\n  {text}\n</p>"));
    }

    #[test]
    fn html_quoted_brackets_stay_inside_the_tag() {
        assert_eq!(
            html("<div title=\"a > b\"><span>x</span></div>"),
            "<div title=\"a > b\">\n  <span>x</span>\n</div>"
        );
    }

    #[test]
    fn html_stray_angle_bracket_is_text() {
        assert_eq!(html("<p>1 < 2</p>"), "<p>1 < 2</p>");
    }

    #[test]
    fn html_uppercase_tags_match_their_closing_tag() {
        assert_eq!(html("<DIV><P>x</P></DIV>"), "<DIV>\n  <P>x</P>\n</DIV>");
    }
}
