//! `Set-Cookie` value decomposition.

use percent_encoding::percent_decode_str;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Value stored for attributes written without `=`, such as `HttpOnly`.
pub const FLAG_VALUE: &str = "true";

/// One cookie received from the server.
///
/// `name`/`value` come from the first pair of the header value. Every later
/// pair is kept as an attribute under its key exactly as written; the first
/// occurrence of a key wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    attributes: Vec<(String, String)>,
}

impl Cookie {
    /// Attribute lookup by its literal (case-sensitive) name.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn domain(&self) -> Option<&str> {
        self.get("Domain")
    }

    pub fn path(&self) -> Option<&str> {
        self.get("Path")
    }

    pub fn expires(&self) -> Option<&str> {
        self.get("Expires")
    }

    pub fn http_only(&self) -> Option<&str> {
        self.get("HttpOnly")
    }

    pub fn secure(&self) -> Option<&str> {
        self.get("Secure")
    }

    fn insert_attribute(&mut self, key: String, value: String) {
        // `Name` and `Value` are taken by the leading pair.
        if key == "Name" || key == "Value" || self.get(&key).is_some() {
            return;
        }
        self.attributes.push((key, value));
    }
}

/// Serialized as one flat object: `{"Name": .., "Value": .., "Path": ..}`.
impl Serialize for Cookie {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2 + self.attributes.len()))?;
        map.serialize_entry("Name", &self.name)?;
        map.serialize_entry("Value", &self.value)?;
        for (key, value) in &self.attributes {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Parse a single `Set-Cookie` header value. Never fails: a segment without
/// `=` becomes a flag attribute holding `"true"`.
pub fn parse_cookie(header_value: &str) -> Cookie {
    let mut cookie = Cookie::default();
    let mut segments = header_value.split(';').map(str::trim_start);

    if let Some(first) = segments.next() {
        let (key, value) = split_pair(first);
        cookie.name = key.to_string();
        cookie.value = decode(value);
    }

    for segment in segments {
        if segment.trim().is_empty() {
            continue;
        }
        let (key, value) = split_pair(segment);
        cookie.insert_attribute(key.to_string(), decode(value));
    }

    cookie
}

fn split_pair(segment: &str) -> (&str, &str) {
    let (key, value) = match segment.split_once('=') {
        Some((key, value)) => (key.trim(), value.trim()),
        None => (segment.trim(), FLAG_VALUE),
    };
    (key, strip_quotes(value))
}

fn strip_quotes(value: &str) -> &str {
    if value.len() > 1 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Percent-decode a cookie value. Invalid escapes are kept literally and
/// invalid UTF-8 falls back to the undecoded text.
fn decode(value: &str) -> String {
    match percent_decode_str(value).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => value.to_string(),
    }
}
