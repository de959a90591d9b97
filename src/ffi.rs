//! FFI interface for C/C++ interop
//!
//! HTML and the field map go in, the extracted values come out. Requests and
//! results are passed as JSON.

use std::ffi::{c_char, CStr, CString};
use std::ptr;

use serde::{Deserialize, Serialize};

use crate::config::ExtractorConfig;
use crate::engine::{assign_names, FieldMap, FieldProcessor};

/// Extraction request from C++
#[derive(Debug, Clone, Deserialize)]
pub struct FieldRequest {
    pub fields: FieldMap,
    /// Nested results (true) or one flat map of every field (false)
    #[serde(default = "default_hierarchical")]
    pub hierarchical: bool,
    #[serde(default)]
    pub domain_prefix: Option<String>,
    /// URL relative page links resolve against
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_hierarchical() -> bool {
    true
}

/// Extraction result returned to C++
#[derive(Debug, Serialize)]
pub struct FieldResponse {
    pub values: serde_json::Value,
    pub diagnostics: Vec<String>,
}

/// Result struct returned to C++
/// Both pointers are owned by Rust and must be freed via free_extraction_result
#[repr(C)]
pub struct ExtractionResultFFI {
    /// JSON-serialized result (null-terminated)
    pub json_ptr: *mut c_char,
    /// Error message if extraction failed (null-terminated), or null on success
    pub error_ptr: *mut c_char,
}

/// Run `request` against `html`.
pub fn perform_extraction(html: &str, request: &FieldRequest) -> FieldResponse {
    let config = ExtractorConfig {
        domain_prefix: request.domain_prefix.clone(),
        ..ExtractorConfig::default()
    };
    let start_url = request.base_url.clone().unwrap_or_default();

    let mut fields = request.fields.clone();
    assign_names(&mut fields);

    let mut proc = FieldProcessor::from_config(start_url, &config).with_html(html);
    proc.process_fields(&fields);

    FieldResponse {
        values: proc.to_json(request.hierarchical),
        diagnostics: proc.diagnostics().to_vec(),
    }
}

/// Extract fields from HTML according to a JSON field request.
///
/// # Arguments
/// * `html_ptr` - Pointer to HTML content (UTF-8, not necessarily null-terminated)
/// * `html_len` - Length of HTML content in bytes
/// * `request_json` - JSON-serialized FieldRequest (null-terminated)
///
/// # Returns
/// ExtractionResultFFI with either json_ptr set (success) or error_ptr set (failure)
///
/// # Safety
/// - `html_ptr` must point to valid memory of at least `html_len` bytes
/// - `request_json` must be a valid null-terminated C string
/// - Caller must free the result via `free_extraction_result`
#[no_mangle]
pub unsafe extern "C" fn extract_fields_from_html(
    html_ptr: *const c_char,
    html_len: usize,
    request_json: *const c_char,
) -> ExtractionResultFFI {
    let html = if html_ptr.is_null() || html_len == 0 {
        String::new()
    } else {
        let slice = std::slice::from_raw_parts(html_ptr as *const u8, html_len);
        match std::str::from_utf8(slice) {
            Ok(s) => s.to_string(),
            Err(_) => return make_error_result("Invalid UTF-8 in HTML content"),
        }
    };

    if request_json.is_null() {
        return make_error_result("Request JSON is null");
    }
    let request_str = match CStr::from_ptr(request_json).to_str() {
        Ok(s) => s,
        Err(_) => return make_error_result("Invalid UTF-8 in request JSON"),
    };

    let request: FieldRequest = match serde_json::from_str(request_str) {
        Ok(r) => r,
        Err(e) => return make_error_result(&format!("Failed to parse request JSON: {}", e)),
    };

    let result = perform_extraction(&html, &request);

    match serde_json::to_string(&result) {
        Ok(json) => match CString::new(json) {
            Ok(cstr) => ExtractionResultFFI {
                json_ptr: cstr.into_raw(),
                error_ptr: ptr::null_mut(),
            },
            Err(_) => make_error_result("Result JSON contains null bytes"),
        },
        Err(e) => make_error_result(&format!("Failed to serialize result: {}", e)),
    }
}

/// Free an ExtractionResultFFI returned by extract_fields_from_html
///
/// # Safety
/// - `result` must have been returned by `extract_fields_from_html`
/// - Must only be called once per result
#[no_mangle]
pub unsafe extern "C" fn free_extraction_result(result: ExtractionResultFFI) {
    if !result.json_ptr.is_null() {
        drop(CString::from_raw(result.json_ptr));
    }
    if !result.error_ptr.is_null() {
        drop(CString::from_raw(result.error_ptr));
    }
}

// Helper to create error result
fn make_error_result(msg: &str) -> ExtractionResultFFI {
    let error_ptr = CString::new(msg)
        .or_else(|_| CString::new("Unknown error"))
        .map(CString::into_raw)
        .unwrap_or(ptr::null_mut());
    ExtractionResultFFI {
        json_ptr: ptr::null_mut(),
        error_ptr,
    }
}
