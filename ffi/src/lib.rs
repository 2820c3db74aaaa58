//! C-ABI wrapper around `playground-core`.
//!
//! # Overview
//! Exposes the response and cookie parsers, the body formatter and a
//! playground session handle through `extern "C"` functions, so a UI host
//! written in any language with a C FFI can drive the form, execute requests
//! with its own HTTP stack and render the parsed result.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Session functions mirror the `Playground` API 1:1. Structured values
//!   that C would rarely walk field by field (collections, the response
//!   panel) are also available as JSON strings.
//! - The C caller owns all returned pointers and must call the matching
//!   `playground_free_*` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use playground_core::{
    format_body, parse_cookie, parse_response, Collection, CollectionRequest, Completion, JsonFileStore, KeyValueRow,
    MemoryStore, Playground, PlaygroundConfig, RawResponseBuilder, RequestTicket, TargetStore,
};

use types::*;

/// Borrow a C string as UTF-8. Null and invalid UTF-8 yield `None`.
///
/// # Safety
/// `s` must be null or point to a NUL-terminated string.
unsafe fn str_arg<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(s) }.to_str().ok()
}

/// Run `f` on the session behind `pg`, or return `fallback` when `pg` is null
/// or `f` panics.
fn with_session<T>(pg: *mut FfiPlayground, fallback: T, f: impl FnOnce(&mut Playground) -> T) -> T {
    if pg.is_null() {
        return fallback;
    }
    let pg = unsafe { &mut *pg };
    catch_unwind(AssertUnwindSafe(|| f(&mut pg.inner))).unwrap_or(fallback)
}

// ---------------------------------------------------------------------------
// Stateless parsing
// ---------------------------------------------------------------------------

/// Parse raw response text.
///
/// Returns null if `raw` is null or not UTF-8. The caller must free the
/// returned pointer with `playground_free_response`.
#[unsafe(no_mangle)]
pub extern "C" fn playground_parse_response(raw: *const c_char) -> *mut FfiParsedResponse {
    catch_unwind(|| match unsafe { str_arg(raw) } {
        Some(raw) => FfiParsedResponse::from_core(parse_response(raw)),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Parse raw response text into its JSON form.
///
/// Returns null if `raw` is null or not UTF-8. Free with
/// `playground_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn playground_parse_response_json(raw: *const c_char) -> *mut c_char {
    catch_unwind(|| {
        let Some(raw) = (unsafe { str_arg(raw) }) else {
            return std::ptr::null_mut();
        };
        match serde_json::to_string(&parse_response(raw)) {
            Ok(json) => into_c_string(json),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Parse one `Set-Cookie` header value.
///
/// Returns null if `header` is null or not UTF-8. Free with
/// `playground_free_cookie`.
#[unsafe(no_mangle)]
pub extern "C" fn playground_parse_cookie(header: *const c_char) -> *mut FfiCookie {
    catch_unwind(|| match unsafe { str_arg(header) } {
        Some(header) => FfiCookie::boxed(parse_cookie(header)),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Render a transport failure as raw response text the playground can
/// parse, for hosts whose HTTP call failed before any response arrived.
///
/// Returns null if `message` is null. Free with `playground_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn playground_error_response(message: *const c_char) -> *mut c_char {
    catch_unwind(|| match unsafe { str_arg(message) } {
        Some(message) => into_c_string(RawResponseBuilder::from_error(&message).build()),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Decode and pretty-print a response body for display.
///
/// `content_type` and `content_encoding` are the response header values;
/// null reads as an absent header. `body` may be null when `body_len` is 0.
/// When the body cannot be shown (unsupported media type or encoding, or a
/// corrupt stream) the returned text explains why. Returns null only if
/// `body` is null with a non-zero length. Free with `playground_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn playground_format_body(
    content_type: *const c_char,
    content_encoding: *const c_char,
    body: *const u8,
    body_len: usize,
) -> *mut c_char {
    catch_unwind(|| {
        let bytes = match (body.is_null(), body_len) {
            (_, 0) => &[][..],
            (true, _) => return std::ptr::null_mut(),
            (false, len) => unsafe { std::slice::from_raw_parts(body, len) },
        };
        let content_type = unsafe { str_arg(content_type) }.unwrap_or_default();
        let content_encoding = unsafe { str_arg(content_encoding) }.unwrap_or_default();
        let text = format_body(content_type, content_encoding, bytes).unwrap_or_else(|err| err.to_string());
        into_c_string(text)
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Flatten a Postman collection into a JSON array of requests.
///
/// Returns null if `collection_json` is null or cannot be decoded. Free with
/// `playground_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn playground_collection_requests_json(collection_json: *const c_char) -> *mut c_char {
    catch_unwind(|| {
        let Some(text) = (unsafe { str_arg(collection_json) }) else {
            return std::ptr::null_mut();
        };
        let collection = match Collection::from_json(text) {
            Ok(collection) => collection,
            Err(err) => {
                tracing::warn!(error = %err, "rejecting collection");
                return std::ptr::null_mut();
            }
        };
        match serde_json::to_string(&collection.requests()) {
            Ok(json) => into_c_string(json),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Session lifecycle
// ---------------------------------------------------------------------------

/// Start a playground session.
///
/// Configuration comes from the environment (see `PlaygroundConfig::from_env`);
/// non-null `namespace` and `page_url` override it. With a non-null
/// `store_path` the request target persists to that JSON file, otherwise it
/// lives in memory. Returns null on panic. Free with `playground_free`.
#[unsafe(no_mangle)]
pub extern "C" fn playground_new(
    namespace: *const c_char,
    page_url: *const c_char,
    store_path: *const c_char,
) -> *mut FfiPlayground {
    catch_unwind(|| {
        let mut config = PlaygroundConfig::from_env();
        if let Some(namespace) = unsafe { str_arg(namespace) } {
            config.namespace = namespace.to_string();
        }
        if let Some(page_url) = unsafe { str_arg(page_url) } {
            config.page_url = Some(page_url.to_string());
        }
        let store: Box<dyn TargetStore> = match unsafe { str_arg(store_path) } {
            Some(path) => Box::new(JsonFileStore::new(path)),
            None => Box::new(MemoryStore::new()),
        };
        Box::into_raw(Box::new(FfiPlayground {
            inner: Playground::new(config, store),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a session created by `playground_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn playground_free(pg: *mut FfiPlayground) {
    if !pg.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(pg) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Form state
// ---------------------------------------------------------------------------

/// Current URL bar text. Free with `playground_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn playground_target(pg: *mut FfiPlayground) -> *mut c_char {
    with_session(pg, std::ptr::null_mut(), |pg| into_c_string(pg.target()))
}

/// URL bar edit. Ignored if `target` is null.
#[unsafe(no_mangle)]
pub extern "C" fn playground_set_target(pg: *mut FfiPlayground, target: *const c_char) {
    with_session(pg, (), |pg| {
        if let Some(target) = unsafe { str_arg(target) } {
            pg.set_target(target);
        }
    })
}

/// Number of query-parameter rows, including the trailing blank one.
#[unsafe(no_mangle)]
pub extern "C" fn playground_param_count(pg: *mut FfiPlayground) -> u32 {
    with_session(pg, 0, |pg| pg.params().len() as u32)
}

/// Key of parameter row `index`, or null when out of range.
#[unsafe(no_mangle)]
pub extern "C" fn playground_param_key(pg: *mut FfiPlayground, index: u32) -> *mut c_char {
    with_session(pg, std::ptr::null_mut(), |pg| row_field(pg.params(), index, |r| &r.key))
}

/// Value of parameter row `index`, or null when out of range.
#[unsafe(no_mangle)]
pub extern "C" fn playground_param_value(pg: *mut FfiPlayground, index: u32) -> *mut c_char {
    with_session(pg, std::ptr::null_mut(), |pg| row_field(pg.params(), index, |r| &r.value))
}

#[unsafe(no_mangle)]
pub extern "C" fn playground_set_param_key(pg: *mut FfiPlayground, index: u32, key: *const c_char) {
    with_session(pg, (), |pg| {
        if let Some(key) = unsafe { str_arg(key) } {
            pg.set_param_key(index as usize, key);
        }
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn playground_set_param_value(pg: *mut FfiPlayground, index: u32, value: *const c_char) {
    with_session(pg, (), |pg| {
        if let Some(value) = unsafe { str_arg(value) } {
            pg.set_param_value(index as usize, value);
        }
    })
}

/// Number of header rows, including the trailing blank one.
#[unsafe(no_mangle)]
pub extern "C" fn playground_header_count(pg: *mut FfiPlayground) -> u32 {
    with_session(pg, 0, |pg| pg.headers().len() as u32)
}

#[unsafe(no_mangle)]
pub extern "C" fn playground_header_key(pg: *mut FfiPlayground, index: u32) -> *mut c_char {
    with_session(pg, std::ptr::null_mut(), |pg| row_field(pg.headers(), index, |r| &r.key))
}

#[unsafe(no_mangle)]
pub extern "C" fn playground_header_value(pg: *mut FfiPlayground, index: u32) -> *mut c_char {
    with_session(pg, std::ptr::null_mut(), |pg| row_field(pg.headers(), index, |r| &r.value))
}

#[unsafe(no_mangle)]
pub extern "C" fn playground_set_header_key(pg: *mut FfiPlayground, index: u32, key: *const c_char) {
    with_session(pg, (), |pg| {
        if let Some(key) = unsafe { str_arg(key) } {
            pg.set_header_key(index as usize, key);
        }
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn playground_set_header_value(pg: *mut FfiPlayground, index: u32, value: *const c_char) {
    with_session(pg, (), |pg| {
        if let Some(value) = unsafe { str_arg(value) } {
            pg.set_header_value(index as usize, value);
        }
    })
}

/// Select the method by name (`"GET"`, `"post"`, ...). Returns false if
/// `method` is null or not a supported method.
#[unsafe(no_mangle)]
pub extern "C" fn playground_set_method(pg: *mut FfiPlayground, method: *const c_char) -> bool {
    with_session(pg, false, |pg| {
        let Some(method) = (unsafe { str_arg(method) }) else {
            return false;
        };
        match method.parse() {
            Ok(method) => {
                pg.set_method(method);
                true
            }
            Err(_) => false,
        }
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn playground_set_body(pg: *mut FfiPlayground, body: *const c_char) {
    with_session(pg, (), |pg| {
        if let Some(body) = unsafe { str_arg(body) } {
            pg.set_body(body);
        }
    })
}

/// Fill the form from one element of `playground_collection_requests_json`.
/// Returns false if `request_json` is null or cannot be decoded.
#[unsafe(no_mangle)]
pub extern "C" fn playground_load_request_json(pg: *mut FfiPlayground, request_json: *const c_char) -> bool {
    with_session(pg, false, |pg| {
        let Some(text) = (unsafe { str_arg(request_json) }) else {
            return false;
        };
        match serde_json::from_str::<CollectionRequest>(text) {
            Ok(request) => {
                pg.load_request(&request);
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "rejecting collection request");
                false
            }
        }
    })
}

fn row_field(rows: &[KeyValueRow], index: u32, field: impl Fn(&KeyValueRow) -> &String) -> *mut c_char {
    match rows.get(index as usize) {
        Some(row) => into_c_string(field(row).as_str()),
        None => std::ptr::null_mut(),
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Validate the form and describe the request to execute.
///
/// Never returns null. Free with `playground_free_submit_result`.
#[unsafe(no_mangle)]
pub extern "C" fn playground_submit(pg: *mut FfiPlayground) -> *mut FfiSubmitResult {
    if pg.is_null() {
        return FfiSubmitResult::null_arg("pg");
    }
    let pg = unsafe { &mut *pg };
    catch_unwind(AssertUnwindSafe(|| match pg.inner.submit() {
        Ok(submission) => FfiSubmitResult::ok(submission),
        Err(err) => FfiSubmitResult::from_error(err),
    }))
    .unwrap_or_else(|_| FfiSubmitResult::panic("panic in playground_submit"))
}

/// Deliver the raw response text for the request with `sequence`.
#[unsafe(no_mangle)]
pub extern "C" fn playground_complete(pg: *mut FfiPlayground, sequence: u64, raw: *const c_char) -> FfiCompletion {
    if pg.is_null() || raw.is_null() {
        return FfiCompletion::NullArg;
    }
    let pg = unsafe { &mut *pg };
    catch_unwind(AssertUnwindSafe(|| {
        let raw = unsafe { CStr::from_ptr(raw) }.to_string_lossy();
        match pg.inner.complete(RequestTicket::from_sequence(sequence), &raw) {
            Completion::Applied => FfiCompletion::Applied,
            Completion::Stale { .. } => FfiCompletion::Stale,
        }
    }))
    .unwrap_or(FfiCompletion::Panic)
}

/// The response panel as JSON: status label, reference link, timing, size
/// and the parsed response. Null when no response is displayed. Free with
/// `playground_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn playground_response_json(pg: *mut FfiPlayground) -> *mut c_char {
    with_session(pg, std::ptr::null_mut(), |pg| {
        let Some(view) = pg.response() else {
            return std::ptr::null_mut();
        };
        let panel = serde_json::json!({
            "statusLabel": view.status_label(),
            "referenceUrl": view.reference_url(),
            "elapsedMs": view.elapsed_millis() as u64,
            "kilobytes": view.body_kilobytes(),
            "response": view.response,
        });
        into_c_string(panel.to_string())
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn playground_reset_response(pg: *mut FfiPlayground) {
    with_session(pg, (), |pg| pg.reset_response())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a parsed response. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn playground_free_response(response: *mut FfiParsedResponse) {
    if response.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let response = unsafe { Box::from_raw(response) };
        unsafe { response.free_fields() };
    });
}

/// Free a parsed cookie. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn playground_free_cookie(cookie: *mut FfiCookie) {
    if cookie.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let cookie = unsafe { Box::from_raw(cookie) };
        unsafe { cookie.free_fields() };
    });
}

/// Free a submit result and the request it carries. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn playground_free_submit_result(result: *mut FfiSubmitResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        unsafe { free_c_string(result.error_message) };
        if !result.request.is_null() {
            let request = unsafe { Box::from_raw(result.request) };
            unsafe { request.free_fields() };
        }
    });
}

/// Free a string returned by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn playground_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| unsafe { free_c_string(s) });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn c(s: &str) -> CString {
        CString::new(s).unwrap()
    }

    /// Read and free a returned string.
    fn take(s: *mut c_char) -> Option<String> {
        if s.is_null() {
            return None;
        }
        let out = unsafe { CStr::from_ptr(s) }.to_str().unwrap().to_string();
        playground_free_string(s);
        Some(out)
    }

    fn read(s: *const c_char) -> &'static str {
        unsafe { CStr::from_ptr(s) }.to_str().unwrap()
    }

    fn session() -> *mut FfiPlayground {
        let ns = c("ffi-test");
        let pg = playground_new(ns.as_ptr(), std::ptr::null(), std::ptr::null());
        assert!(!pg.is_null());
        pg
    }

    #[test]
    fn parse_response_exposes_fields() {
        let raw = c("HTTP/1.1 200 OK\nSet-Cookie: id=42; Path=/; HttpOnly\nX-A: 1\n\nhello");
        let resp = playground_parse_response(raw.as_ptr());
        assert!(!resp.is_null());
        let r = unsafe { &*resp };

        assert_eq!(read(r.protocol), "HTTP/1.1");
        assert!(r.has_status_code);
        assert_eq!(r.status_code, 200);
        assert_eq!(read(r.status_text), "OK");
        assert_eq!(r.headers_len, 2);
        assert_eq!(r.cookies_len, 1);
        assert_eq!(read(r.body), "hello");
        assert_eq!(r.anomalies_len, 0);

        let cookies = unsafe { std::slice::from_raw_parts(r.cookies, r.cookies_len as usize) };
        assert_eq!(read(cookies[0].name), "id");
        assert_eq!(cookies[0].attributes_len, 2);
        let attrs = unsafe { std::slice::from_raw_parts(cookies[0].attributes, 2) };
        assert_eq!(read(attrs[1].key), "HttpOnly");
        assert_eq!(read(attrs[1].value), "true");

        playground_free_response(resp);
    }

    #[test]
    fn parse_response_flags_non_numeric_status() {
        let raw = c("HTTP/1.1 abc Odd\n\n");
        let resp = playground_parse_response(raw.as_ptr());
        let r = unsafe { &*resp };
        assert!(!r.has_status_code);
        assert_eq!(r.anomalies_len, 1);
        assert!(r.headers.is_null());
        playground_free_response(resp);
    }

    #[test]
    fn parse_response_null_returns_null() {
        assert!(playground_parse_response(std::ptr::null()).is_null());
    }

    #[test]
    fn parse_response_json_uses_camel_case() {
        let raw = c("HTTP/1.1 404 Not Found\n\nNope");
        let json = take(playground_parse_response_json(raw.as_ptr())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["statusCode"], 404);
        assert_eq!(value["body"], "Nope");
    }

    #[test]
    fn parse_cookie_decodes_value() {
        let header = c("token=a%20b; Secure");
        let cookie = playground_parse_cookie(header.as_ptr());
        let ck = unsafe { &*cookie };
        assert_eq!(read(ck.name), "token");
        assert_eq!(read(ck.value), "a b");
        assert_eq!(ck.attributes_len, 1);
        playground_free_cookie(cookie);
    }

    #[test]
    fn error_response_is_parseable() {
        let msg = c("connection refused");
        let raw = take(playground_error_response(msg.as_ptr())).unwrap();
        let parsed = parse_response(&raw);
        assert_eq!(parsed.status_code, Some(200));
        assert_eq!(parsed.body, "connection refused");
    }

    #[test]
    fn format_body_indents_by_media_type() {
        let content_type = c("application/json; charset=utf-8");
        let body = br#"{"a":[1]}"#;
        let out = playground_format_body(content_type.as_ptr(), std::ptr::null(), body.as_ptr(), body.len());
        assert_eq!(take(out).unwrap(), "{\n  \"a\": [\n    1\n  ]\n}");
    }

    #[test]
    fn format_body_explains_refusals() {
        let content_type = c("image/png");
        let body = b"\x89PNG";
        let out = playground_format_body(content_type.as_ptr(), std::ptr::null(), body.as_ptr(), body.len());
        assert_eq!(take(out).unwrap(), "unsupported media type: image/png");

        let out = playground_format_body(content_type.as_ptr(), std::ptr::null(), std::ptr::null(), 0);
        assert_eq!(take(out).unwrap(), "");
        assert!(playground_format_body(content_type.as_ptr(), std::ptr::null(), std::ptr::null(), 4).is_null());
    }

    #[test]
    fn collection_requests_json_flattens() {
        let json = c(r#"{"info":{"name":"c"},"item":[{"name":"Ping","request":{"method":"GET","url":"{{h}}/ping"}}],"variable":[{"key":"h","value":"http://x"}]}"#);
        let out = take(playground_collection_requests_json(json.as_ptr())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["url_resolved"], "http://x/ping");
        assert_eq!(value[0]["request_method"], "GET");

        let bad = c("{");
        assert!(playground_collection_requests_json(bad.as_ptr()).is_null());
    }

    #[test]
    fn session_syncs_target_and_params() {
        let pg = session();
        let target = c("http://host/p?a=1");
        playground_set_target(pg, target.as_ptr());

        assert_eq!(playground_param_count(pg), 2);
        assert_eq!(take(playground_param_key(pg, 0)).as_deref(), Some("a"));
        assert_eq!(take(playground_param_value(pg, 0)).as_deref(), Some("1"));
        assert_eq!(take(playground_param_key(pg, 5)), None);

        let value = c("2");
        playground_set_param_value(pg, 0, value.as_ptr());
        assert_eq!(take(playground_target(pg)).as_deref(), Some("http://host/p?a=2"));

        playground_free(pg);
    }

    #[test]
    fn submit_and_complete() {
        let pg = session();
        let target = c("http://host/items");
        let key = c("accept");
        let value = c("text/plain");
        let method = c("post");
        let body = c("data");
        playground_set_target(pg, target.as_ptr());
        playground_set_header_key(pg, 0, key.as_ptr());
        playground_set_header_value(pg, 0, value.as_ptr());
        assert!(playground_set_method(pg, method.as_ptr()));
        playground_set_body(pg, body.as_ptr());
        assert_eq!(playground_header_count(pg), 2);

        let result = playground_submit(pg);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        let req = unsafe { &*r.request };
        assert_eq!(req.sequence, 1);
        assert_eq!(req.method, FfiHttpMethod::Post);
        assert_eq!(read(req.target), "http://host/items");
        assert_eq!(req.headers_len, 1);
        let headers = unsafe { std::slice::from_raw_parts(req.headers, 1) };
        assert_eq!(read(headers[0].key), "Accept");
        assert_eq!(read(req.body), "data");
        let sequence = req.sequence;
        playground_free_submit_result(result);

        let raw = c("HTTP/1.1 201 Created\n\n");
        assert_eq!(playground_complete(pg, sequence, raw.as_ptr()), FfiCompletion::Applied);
        assert_eq!(playground_complete(pg, sequence, raw.as_ptr()), FfiCompletion::Stale);

        let panel = take(playground_response_json(pg)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&panel).unwrap();
        assert_eq!(value["statusLabel"], "201 Created");
        assert_eq!(value["response"]["statusCode"], 201);

        playground_reset_response(pg);
        assert!(playground_response_json(pg).is_null());
        playground_free(pg);
    }

    #[test]
    fn submit_reports_invalid_target() {
        let pg = session();
        let result = playground_submit(pg);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::InvalidTarget);
        assert!(r.request.is_null());
        assert!(!read(r.error_message).is_empty());
        playground_free_submit_result(result);
        playground_free(pg);
    }

    #[test]
    fn set_method_rejects_unknown() {
        let pg = session();
        let method = c("BREW");
        assert!(!playground_set_method(pg, method.as_ptr()));
        playground_free(pg);
    }

    #[test]
    fn load_request_json_fills_form() {
        let pg = session();
        let request = c(r#"{"request_method":"PUT","request_body_mode":"raw","request_body_raw":"{}","url_resolved":"http://host/x?y=1","url_query":[{"key":"y","value":"1"}]}"#);
        assert!(playground_load_request_json(pg, request.as_ptr()));
        assert_eq!(take(playground_target(pg)).as_deref(), Some("http://host/x?y=1"));
        assert_eq!(playground_param_count(pg), 2);

        let bad = c("not json");
        assert!(!playground_load_request_json(pg, bad.as_ptr()));
        playground_free(pg);
    }

    #[test]
    fn null_session_is_safe() {
        let p = std::ptr::null_mut();
        assert_eq!(playground_param_count(p), 0);
        assert!(playground_target(p).is_null());
        assert_eq!(playground_complete(p, 1, std::ptr::null()), FfiCompletion::NullArg);
        let result = playground_submit(p);
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::NullArg);
        playground_free_submit_result(result);
        playground_free(p);
    }

    #[test]
    fn free_functions_accept_null() {
        playground_free_response(std::ptr::null_mut());
        playground_free_cookie(std::ptr::null_mut());
        playground_free_submit_result(std::ptr::null_mut());
        playground_free_string(std::ptr::null_mut());
    }
}
