//! FFI bindings for Emotion Insights
//!
//! This module provides C-compatible functions for calling the engine from other languages.
//! All functions use C strings (null-terminated) and return allocated memory that
//! must be freed by the caller using `insights_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use chrono::NaiveDate;

use crate::error::ComputeError;
use crate::pipeline::{analyze_json, predict_mood_json, EmotionAnalyzer};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, ComputeError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| ComputeError::InvalidDateRange(format!("bad date '{value}': {e}")))
}

/// Store the error or hand back the allocated result
fn finish(result: Result<String, ComputeError>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Analyze a JSON array of records over an inclusive date range.
///
/// # Safety
/// - `records_json`, `start_date`, and `end_date` must be valid null-terminated C strings.
/// - Dates use the `YYYY-MM-DD` format.
/// - Returns a newly allocated string that must be freed with `insights_free_string`.
/// - Returns NULL on error; call `insights_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn insights_analyze_json(
    records_json: *const c_char,
    start_date: *const c_char,
    end_date: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(records_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    let start_str = match cstr_to_string(start_date) {
        Some(s) => s,
        None => {
            set_last_error("Invalid start_date string pointer");
            return ptr::null_mut();
        }
    };

    let end_str = match cstr_to_string(end_date) {
        Some(s) => s,
        None => {
            set_last_error("Invalid end_date string pointer");
            return ptr::null_mut();
        }
    };

    let result = parse_date(&start_str).and_then(|start| {
        let end = parse_date(&end_str)?;
        analyze_json(&json_str, start, end)
    });
    finish(result)
}

/// Predict mood from a JSON array of records.
///
/// # Safety
/// - `records_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `insights_free_string`.
/// - Returns NULL on error; call `insights_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn insights_predict_mood_json(records_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(records_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    finish(predict_mood_json(&json_str))
}

// ============================================================================
// Configured Analyzer API
// ============================================================================

/// Opaque handle to an EmotionAnalyzer
pub struct InsightsAnalyzerHandle {
    analyzer: EmotionAnalyzer,
}

/// Create an analyzer from a JSON configuration.
///
/// # Safety
/// - `config_json` must be a valid null-terminated C string, or NULL for the defaults.
/// - Returns a pointer to a newly allocated analyzer.
/// - Must be freed with `insights_analyzer_free`.
/// - Returns NULL on error; call `insights_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn insights_analyzer_new(
    config_json: *const c_char,
) -> *mut InsightsAnalyzerHandle {
    clear_last_error();

    let analyzer = if config_json.is_null() {
        EmotionAnalyzer::default()
    } else {
        let json_str = match cstr_to_string(config_json) {
            Some(s) => s,
            None => {
                set_last_error("Invalid config string pointer");
                return ptr::null_mut();
            }
        };
        match EmotionAnalyzer::from_config_json(&json_str) {
            Ok(analyzer) => analyzer,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    Box::into_raw(Box::new(InsightsAnalyzerHandle { analyzer }))
}

/// Free an analyzer.
///
/// # Safety
/// - `analyzer` must be a valid pointer returned by `insights_analyzer_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn insights_analyzer_free(analyzer: *mut InsightsAnalyzerHandle) {
    if !analyzer.is_null() {
        drop(Box::from_raw(analyzer));
    }
}

/// Recommend for a current emotion map with a configured analyzer.
///
/// # Safety
/// - `analyzer` must be a valid pointer returned by `insights_analyzer_new`.
/// - `current_json` (an emotion map) and `history_json` (a record array) must be
///   valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `insights_free_string`.
/// - Returns NULL on error; call `insights_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn insights_analyzer_recommend(
    analyzer: *const InsightsAnalyzerHandle,
    current_json: *const c_char,
    history_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if analyzer.is_null() {
        set_last_error("Null analyzer pointer");
        return ptr::null_mut();
    }

    let handle = &*analyzer;

    let current_str = match cstr_to_string(current_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid current emotions string pointer");
            return ptr::null_mut();
        }
    };

    let history_str = match cstr_to_string(history_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid history string pointer");
            return ptr::null_mut();
        }
    };

    finish(handle.analyzer.recommend_json(&current_str, &history_str))
}

/// Predict mood with a configured analyzer.
///
/// # Safety
/// - `analyzer` must be a valid pointer returned by `insights_analyzer_new`.
/// - `records_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `insights_free_string`.
/// - Returns NULL on error; call `insights_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn insights_analyzer_predict_mood(
    analyzer: *const InsightsAnalyzerHandle,
    records_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if analyzer.is_null() {
        set_last_error("Null analyzer pointer");
        return ptr::null_mut();
    }

    let handle = &*analyzer;

    let json_str = match cstr_to_string(records_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    finish(handle.analyzer.predict_mood_json(&json_str))
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by insights functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by an insights function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn insights_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next insights function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn insights_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn insights_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn sample_records_json() -> CString {
        CString::new(
            r#"[
            {"timestamp":"2024-01-15T09:00:00Z","session_id":"session-0001",
             "emotions":{"happy":0.8,"sad":0.05,"angry":0.0,"fearful":0.0,"disgusted":0.0,"surprised":0.05,"neutral":0.1}},
            {"timestamp":"2024-01-15T14:00:00Z","session_id":"session-0001",
             "emotions":{"happy":0.2,"sad":0.1,"angry":0.0,"fearful":0.0,"disgusted":0.0,"surprised":0.1,"neutral":0.6}},
            {"timestamp":"2024-01-16T20:00:00Z","session_id":"session-0002",
             "emotions":{"happy":0.0,"sad":0.0,"angry":0.95,"fearful":0.0,"disgusted":0.0,"surprised":0.0,"neutral":0.05}}
        ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_ffi_analyze_json() {
        let json = sample_records_json();
        let start = CString::new("2024-01-15").unwrap();
        let end = CString::new("2024-01-16").unwrap();

        unsafe {
            let result = insights_analyze_json(json.as_ptr(), start.as_ptr(), end.as_ptr());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            let parsed: serde_json::Value = serde_json::from_str(result_str).unwrap();
            assert_eq!(parsed["report"]["summary"]["total_detections"], 3);
            assert_eq!(parsed["report"]["daily_stats"].as_array().unwrap().len(), 2);

            insights_free_string(result);
        }
    }

    #[test]
    fn test_ffi_predict_mood_json() {
        let json = sample_records_json();

        unsafe {
            let result = insights_predict_mood_json(json.as_ptr());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            assert!(result_str.contains("\"prediction\""));
            assert!(result_str.contains("\"insights\""));

            insights_free_string(result);
        }
    }

    #[test]
    fn test_ffi_analyzer_lifecycle() {
        unsafe {
            let config = CString::new(r#"{"recommendation_limit": 1}"#).unwrap();
            let analyzer = insights_analyzer_new(config.as_ptr());
            assert!(!analyzer.is_null());

            let current = CString::new(
                r#"{"happy":0.0,"sad":0.0,"angry":0.0,"fearful":0.9,"disgusted":0.0,"surprised":0.0,"neutral":0.1}"#,
            )
            .unwrap();
            let history = CString::new("[]").unwrap();

            let result = insights_analyzer_recommend(analyzer, current.as_ptr(), history.as_ptr());
            assert!(!result.is_null());
            let parsed: serde_json::Value =
                serde_json::from_str(CStr::from_ptr(result).to_str().unwrap()).unwrap();
            assert_eq!(parsed["report"]["recommendations"].as_array().unwrap().len(), 1);
            assert_eq!(parsed["report"]["recommendations"][0]["type"], "grounding");
            insights_free_string(result);

            let records = sample_records_json();
            let result = insights_analyzer_predict_mood(analyzer, records.as_ptr());
            assert!(!result.is_null());
            insights_free_string(result);

            insights_analyzer_free(analyzer);
        }
    }

    #[test]
    fn test_ffi_invalid_config() {
        unsafe {
            let config = CString::new(r#"{"trend_window": 0}"#).unwrap();
            let analyzer = insights_analyzer_new(config.as_ptr());
            assert!(analyzer.is_null());
            assert!(!insights_last_error().is_null());
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let invalid_json = CString::new("not json").unwrap();

            let result = insights_predict_mood_json(invalid_json.as_ptr());
            assert!(result.is_null());

            let error = insights_last_error();
            assert!(!error.is_null());

            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(!error_str.is_empty());
        }
    }

    #[test]
    fn test_ffi_bad_date() {
        let json = sample_records_json();
        let start = CString::new("15/01/2024").unwrap();
        let end = CString::new("2024-01-16").unwrap();

        unsafe {
            let result = insights_analyze_json(json.as_ptr(), start.as_ptr(), end.as_ptr());
            assert!(result.is_null());

            let error_str = CStr::from_ptr(insights_last_error()).to_str().unwrap();
            assert!(error_str.contains("Invalid date range"));
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = insights_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert!(!version_str.is_empty());
        }
    }
}
