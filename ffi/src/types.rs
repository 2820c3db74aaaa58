//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, pointer plus length instead of `Vec`,
//! and enums with explicit discriminants. Conversion functions live here to
//! keep `lib.rs` focused on the `extern "C"` surface.
//!
//! Arrays are handed out as boxed slices and must be released with the
//! matching `playground_free_*` function, which rebuilds the slice from the
//! pointer and length.

use std::ffi::CString;
use std::os::raw::c_char;

use playground_core::{Cookie, HttpMethod, ParsedResponse, Playground, PlaygroundError, Submission};

/// Opaque handle to a `Playground` session. C callers receive a pointer to
/// this and pass it back into every session function.
pub struct FfiPlayground {
    pub(crate) inner: Playground,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Move `s` into a C string. Interior NUL bytes are dropped.
pub(crate) fn into_c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    let c = CString::new(s).unwrap_or_else(|err| {
        let mut bytes = err.into_vec();
        bytes.retain(|&b| b != 0);
        CString::new(bytes).unwrap_or_default()
    });
    c.into_raw()
}

/// Reclaim a string from `into_c_string`. Null is ignored.
///
/// # Safety
/// `s` must be null or come from `into_c_string` and not be freed yet.
pub(crate) unsafe fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

fn into_raw_array<T>(items: Vec<T>) -> (*mut T, u32) {
    if items.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let len = items.len() as u32;
    let ptr = Box::into_raw(items.into_boxed_slice()) as *mut T;
    (ptr, len)
}

/// # Safety
/// `ptr`/`len` must come from `into_raw_array` and not be freed yet.
unsafe fn take_raw_array<T>(ptr: *mut T, len: u32) -> Box<[T]> {
    if ptr.is_null() {
        return Box::new([]);
    }
    unsafe { Box::from_raw(std::ptr::slice_from_raw_parts_mut(ptr, len as usize)) }
}

// ---------------------------------------------------------------------------
// Shared types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Patch = 3,
    Delete = 4,
    Head = 5,
    Options = 6,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Patch => FfiHttpMethod::Patch,
            HttpMethod::Delete => FfiHttpMethod::Delete,
            HttpMethod::Head => FfiHttpMethod::Head,
            HttpMethod::Options => FfiHttpMethod::Options,
        }
    }
}

/// A key-value pair of C strings: a header, or a cookie attribute.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

impl FfiHeader {
    fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: into_c_string(key),
            value: into_c_string(value),
        }
    }

    /// # Safety
    /// Both strings must come from `FfiHeader::new` and not be freed yet.
    unsafe fn free_fields(&self) {
        unsafe {
            free_c_string(self.key);
            free_c_string(self.value);
        }
    }
}

fn into_header_array(pairs: Vec<(String, String)>) -> (*mut FfiHeader, u32) {
    into_raw_array(pairs.into_iter().map(|(k, v)| FfiHeader::new(k, v)).collect())
}

/// # Safety
/// `ptr`/`len` must come from `into_header_array` and not be freed yet.
unsafe fn free_header_array(ptr: *mut FfiHeader, len: u32) {
    for header in unsafe { take_raw_array(ptr, len) }.iter() {
        unsafe { header.free_fields() };
    }
}

// ---------------------------------------------------------------------------
// Parsed responses and cookies
// ---------------------------------------------------------------------------

/// A parsed `Set-Cookie` header. `attributes` holds every attribute after the
/// leading name/value pair, flags carrying `"true"`.
#[repr(C)]
pub struct FfiCookie {
    pub name: *mut c_char,
    pub value: *mut c_char,
    pub attributes: *mut FfiHeader,
    pub attributes_len: u32,
}

impl FfiCookie {
    fn from_core(cookie: Cookie) -> Self {
        let (attributes, attributes_len) = into_header_array(cookie.attributes().to_vec());
        Self {
            name: into_c_string(cookie.name),
            value: into_c_string(cookie.value),
            attributes,
            attributes_len,
        }
    }

    pub(crate) fn boxed(cookie: Cookie) -> *mut Self {
        Box::into_raw(Box::new(Self::from_core(cookie)))
    }

    /// # Safety
    /// The fields must come from `from_core` and not be freed yet.
    pub(crate) unsafe fn free_fields(&self) {
        unsafe {
            free_c_string(self.name);
            free_c_string(self.value);
            free_header_array(self.attributes, self.attributes_len);
        }
    }
}

/// A parsed raw response.
///
/// `has_status_code` is false when the status token was not numeric; the
/// text still fills `status_text`. `anomalies_len` counts layout problems
/// found while parsing (0 for a well-formed response).
#[repr(C)]
pub struct FfiParsedResponse {
    pub protocol: *mut c_char,
    pub has_status_code: bool,
    pub status_code: u16,
    pub status_text: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub cookies: *mut FfiCookie,
    pub cookies_len: u32,
    pub body: *mut c_char,
    pub anomalies_len: u32,
}

impl FfiParsedResponse {
    pub(crate) fn from_core(parsed: ParsedResponse) -> *mut Self {
        let (headers, headers_len) =
            into_header_array(parsed.headers.into_iter().map(|h| (h.key, h.value)).collect());
        let (cookies, cookies_len) =
            into_raw_array(parsed.cookies.into_iter().map(FfiCookie::from_core).collect());

        Box::into_raw(Box::new(FfiParsedResponse {
            protocol: into_c_string(parsed.protocol),
            has_status_code: parsed.status_code.is_some(),
            status_code: parsed.status_code.unwrap_or(0),
            status_text: into_c_string(parsed.status_text),
            headers,
            headers_len,
            cookies,
            cookies_len,
            body: into_c_string(parsed.body),
            anomalies_len: parsed.anomalies.len() as u32,
        }))
    }

    /// # Safety
    /// The fields must come from `from_core` and not be freed yet.
    pub(crate) unsafe fn free_fields(&self) {
        unsafe {
            free_c_string(self.protocol);
            free_c_string(self.status_text);
            free_c_string(self.body);
            free_header_array(self.headers, self.headers_len);
            for cookie in take_raw_array(self.cookies, self.cookies_len).iter() {
                cookie.free_fields();
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Submissions
// ---------------------------------------------------------------------------

/// An HTTP request described as C-compatible plain data.
///
/// Built by `playground_submit`. The C caller executes the request and hands
/// the raw response text back through `playground_complete` together with
/// `sequence`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub sequence: u64,
    pub method: FfiHttpMethod,
    pub target: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    /// Null when no body is sent.
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    fn from_core(submission: Submission) -> *mut Self {
        let req = submission.request;
        let (headers, headers_len) = into_header_array(req.headers);
        Box::into_raw(Box::new(FfiHttpRequest {
            sequence: submission.ticket.sequence(),
            method: req.method.into(),
            target: into_c_string(req.target),
            headers,
            headers_len,
            body: req.body.map_or(std::ptr::null_mut(), |body| into_c_string(body)),
        }))
    }

    /// # Safety
    /// The fields must come from `from_core` and not be freed yet.
    pub(crate) unsafe fn free_fields(&self) {
        unsafe {
            free_c_string(self.target);
            free_c_string(self.body);
            free_header_array(self.headers, self.headers_len);
        }
    }
}

/// Error codes returned in `FfiSubmitResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    InvalidTarget = 1,
    BodyTooLarge = 2,
    UnsupportedMethod = 3,
    NullArg = 4,
    Panic = 5,
}

/// Result envelope for `playground_submit`.
///
/// On success `error_code` is `Ok`, `error_message` is null and `request`
/// points to the request to execute. On failure `error_code` describes the
/// category, `error_message` is a human-readable C string and `request` is
/// null.
#[repr(C)]
pub struct FfiSubmitResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub request: *mut FfiHttpRequest,
}

impl FfiSubmitResult {
    pub(crate) fn ok(submission: Submission) -> *mut Self {
        Box::into_raw(Box::new(FfiSubmitResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            request: FfiHttpRequest::from_core(submission),
        }))
    }

    pub(crate) fn from_error(err: PlaygroundError) -> *mut Self {
        let error_code = match &err {
            PlaygroundError::InvalidTarget { .. } => FfiErrorCode::InvalidTarget,
            PlaygroundError::BodyTooLarge { .. } => FfiErrorCode::BodyTooLarge,
            PlaygroundError::UnsupportedMethod(_) => FfiErrorCode::UnsupportedMethod,
        };
        Self::failure(error_code, err.to_string())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, msg.to_string())
    }

    fn failure(error_code: FfiErrorCode, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiSubmitResult {
            error_code,
            error_message: into_c_string(msg),
            request: std::ptr::null_mut(),
        }))
    }
}

/// Outcome of `playground_complete`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiCompletion {
    /// The response is now the session's current response.
    Applied = 0,
    /// A newer request superseded this one; the response was discarded.
    Stale = 1,
    NullArg = 2,
    Panic = 3,
}
