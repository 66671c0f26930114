//! # classbridge-ffi
//!
//! C ABI for the classbridge prediction core.
//!
//! Hosts create a session handle, initialize it from three artifact paths,
//! and then predict single samples or whole delimited files:
//!
//! ```c
//! CbSession* session = cb_session_new();
//! if (cb_initialize(session, model, scaler, labels) != 0) {
//!     fprintf(stderr, "init failed: %s\n", cb_last_error());
//! }
//! float probs[6];
//! int32_t cls;
//! cb_predict(session, features, 20, probs, &cls);
//! cb_cleanup(session);
//! cb_session_free(session);
//! ```
//!
//! Paths are NUL-terminated UTF-16 strings. Every export returns a status
//! code (see [`status`]) and never lets a panic cross the boundary. Calls on
//! one session must be serialized by the host.

#![allow(clippy::missing_safety_doc)]

pub mod status;
mod wide;

use std::cell::RefCell;
use std::ffi::{c_char, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};

use classbridge_classifier::{Bridge, BridgeConfig};
use classbridge_core::{BatchResult, Error, CLASS_COUNT, FEATURE_COUNT};
use tracing::{error, warn};

pub use wide::wide_to_path;

/// Opaque session handle. Create with `cb_session_new`, free with
/// `cb_session_free`.
pub struct CbSession {
    bridge: Bridge,
}

impl CbSession {
    pub fn new(bridge: Bridge) -> Self {
        Self { bridge }
    }

    /// Move the session to the heap and hand ownership to the caller
    pub fn into_raw(self) -> *mut CbSession {
        Box::into_raw(Box::new(self))
    }

    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }
}

/// Opaque batch result produced by `cb_predict_from_csv`. Free with
/// `cb_batch_free`.
pub struct CbBatch {
    results: BatchResult,
}

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(message: &str) {
    let sanitized = message.replace('\0', " ");
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(sanitized).ok();
    });
}

/// Record `err` as the last error and return its status code
fn fail(op: &str, err: &Error, code: i32) -> i32 {
    warn!(op, code, error = %err, "Call failed");
    set_last_error(&err.to_string());
    code
}

/// Run an export body, turning a panic into [`status::UNKNOWN`]
fn guard(op: &str, body: impl FnOnce() -> i32) -> i32 {
    match catch_unwind(AssertUnwindSafe(body)) {
        Ok(code) => code,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(op, %message, "Panic caught at the C boundary");
            set_last_error(&format!("{}: internal panic: {}", op, message));
            status::UNKNOWN
        }
    }
}

/// Last error message on this thread, or null.
///
/// The pointer stays valid until the next failing call on the same thread.
#[no_mangle]
pub extern "C" fn cb_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match e.borrow().as_ref() {
        Some(message) => message.as_ptr(),
        None => std::ptr::null(),
    })
}

/// Create an uninitialized session with the default configuration.
///
/// Returns null only if construction panicked.
#[no_mangle]
pub extern "C" fn cb_session_new() -> *mut CbSession {
    let mut session = std::ptr::null_mut();
    guard("cb_session_new", || {
        session = CbSession::new(Bridge::new(BridgeConfig::default())).into_raw();
        status::OK
    });
    session
}

/// Free a session, releasing any loaded artifacts. Null is a no-op.
#[no_mangle]
pub unsafe extern "C" fn cb_session_free(session: *mut CbSession) {
    if session.is_null() {
        return;
    }
    guard("cb_session_free", || {
        drop(Box::from_raw(session));
        status::OK
    });
}

/// Load the scaler, label map and model, in that order.
///
/// # Returns
///
/// - `0` on success
/// - `-1` scaler file cannot be opened
/// - `-2` scaler arrays fail validation
/// - `-3` label file cannot be opened
/// - `-4` session is already initialized
/// - `-999` anything else (engine failure, malformed scaler number, null argument)
#[no_mangle]
pub unsafe extern "C" fn cb_initialize(
    session: *mut CbSession,
    model_path: *const u16,
    scaler_path: *const u16,
    labels_path: *const u16,
) -> i32 {
    guard("cb_initialize", || {
        let Some(session) = session.as_mut() else {
            set_last_error("null session handle");
            return status::UNKNOWN;
        };
        let (Some(model), Some(scaler), Some(labels)) = (
            wide_to_path(model_path),
            wide_to_path(scaler_path),
            wide_to_path(labels_path),
        ) else {
            set_last_error("null artifact path");
            return status::UNKNOWN;
        };

        let paths = classbridge_classifier::ArtifactPaths::new(model, scaler, labels);
        match session.bridge.initialize(&paths) {
            Ok(()) => status::OK,
            Err(e) => fail("cb_initialize", &e, status::for_initialize(&e)),
        }
    })
}

/// Classify one sample.
///
/// `features` must hold `feature_count` values; `probabilities` must have
/// room for `cb_get_class_count()` values. Nothing is written on failure.
///
/// # Returns
///
/// - `0` on success
/// - `-1` session not initialized
/// - `-2` wrong feature count or null buffer
/// - `-999` inference failure
#[no_mangle]
pub unsafe extern "C" fn cb_predict(
    session: *mut CbSession,
    features: *const f32,
    feature_count: i32,
    probabilities: *mut f32,
    predicted_class: *mut i32,
) -> i32 {
    guard("cb_predict", || {
        let Some(session) = session.as_mut() else {
            return fail("cb_predict", &Error::NotInitialized, status::predict::NOT_INITIALIZED);
        };
        if !session.bridge.is_initialized() {
            return fail("cb_predict", &Error::NotInitialized, status::predict::NOT_INITIALIZED);
        }

        let expected = session.bridge.feature_count();
        if feature_count < 0 || feature_count as usize != expected {
            let err = Error::FeatureCount {
                expected,
                actual: feature_count.max(0) as usize,
            };
            return fail("cb_predict", &err, status::predict::INVALID_INPUT);
        }
        if features.is_null() || probabilities.is_null() || predicted_class.is_null() {
            set_last_error("null feature or output buffer");
            return status::predict::INVALID_INPUT;
        }

        let input = std::slice::from_raw_parts(features, expected);
        match session.bridge.predict(input) {
            Ok(result) => {
                std::ptr::copy_nonoverlapping(
                    result.probabilities.as_ptr(),
                    probabilities,
                    result.probabilities.len(),
                );
                *predicted_class = result.predicted_class as i32;
                status::OK
            }
            Err(e) => fail("cb_predict", &e, status::for_predict(&e)),
        }
    })
}

/// Classify every accepted row of a comma-separated file.
///
/// On success `*out_batch` receives a batch handle (free with
/// `cb_batch_free`) and `*sample_count` the number of accepted rows. On
/// failure `*out_batch` is null and `*sample_count` is 0.
///
/// # Returns
///
/// - `0` on success
/// - `-1` session not initialized
/// - `-2` file cannot be opened, has no valid rows, or a null argument
/// - `-999` inference failure on some row
#[no_mangle]
pub unsafe extern "C" fn cb_predict_from_csv(
    session: *mut CbSession,
    csv_path: *const u16,
    out_batch: *mut *mut CbBatch,
    sample_count: *mut i32,
) -> i32 {
    guard("cb_predict_from_csv", || {
        if !out_batch.is_null() {
            *out_batch = std::ptr::null_mut();
        }
        if !sample_count.is_null() {
            *sample_count = 0;
        }

        let Some(session) = session.as_mut() else {
            return fail(
                "cb_predict_from_csv",
                &Error::NotInitialized,
                status::predict::NOT_INITIALIZED,
            );
        };
        if !session.bridge.is_initialized() {
            return fail(
                "cb_predict_from_csv",
                &Error::NotInitialized,
                status::predict::NOT_INITIALIZED,
            );
        }
        let Some(path) = wide_to_path(csv_path) else {
            set_last_error("null sample file path");
            return status::predict::INVALID_INPUT;
        };
        if out_batch.is_null() || sample_count.is_null() {
            set_last_error("null output argument");
            return status::predict::INVALID_INPUT;
        }

        match session.bridge.predict_file(&path) {
            Ok(results) => {
                *sample_count = results.len() as i32;
                *out_batch = Box::into_raw(Box::new(CbBatch { results }));
                status::OK
            }
            Err(e) => fail("cb_predict_from_csv", &e, status::for_batch(&e)),
        }
    })
}

/// Number of results in a batch; 0 for null
#[no_mangle]
pub unsafe extern "C" fn cb_batch_len(batch: *const CbBatch) -> i32 {
    batch.as_ref().map_or(0, |b| b.results.len() as i32)
}

/// Predicted class of result `index`, or -1 if out of range
#[no_mangle]
pub unsafe extern "C" fn cb_batch_predicted_class(batch: *const CbBatch, index: i32) -> i32 {
    batch
        .as_ref()
        .and_then(|b| usize::try_from(index).ok().and_then(|i| b.results.get(i)))
        .map_or(-1, |r| r.predicted_class as i32)
}

/// Pointer to the `cb_get_class_count()` probabilities of result `index`,
/// or null if out of range. Valid until the batch is freed.
#[no_mangle]
pub unsafe extern "C" fn cb_batch_probabilities(batch: *const CbBatch, index: i32) -> *const f32 {
    batch
        .as_ref()
        .and_then(|b| usize::try_from(index).ok().and_then(|i| b.results.get(i)))
        .map_or(std::ptr::null(), |r| r.probabilities.as_ptr())
}

/// Free a batch. Null is a no-op.
#[no_mangle]
pub unsafe extern "C" fn cb_batch_free(batch: *mut CbBatch) {
    if !batch.is_null() {
        drop(Box::from_raw(batch));
    }
}

/// Copy the display name of class `index` into `buffer` as UTF-16.
///
/// The name is truncated to `buffer_size - 1` code units and always
/// NUL-terminated.
///
/// # Returns
///
/// - `0` on success
/// - `-1` session not initialized
/// - `-2` index out of range or null/empty buffer
#[no_mangle]
pub unsafe extern "C" fn cb_get_class_name(
    session: *const CbSession,
    index: i32,
    buffer: *mut u16,
    buffer_size: i32,
) -> i32 {
    guard("cb_get_class_name", || {
        let Some(session) = session.as_ref() else {
            return fail(
                "cb_get_class_name",
                &Error::NotInitialized,
                status::predict::NOT_INITIALIZED,
            );
        };
        if !session.bridge.is_initialized() {
            return fail(
                "cb_get_class_name",
                &Error::NotInitialized,
                status::predict::NOT_INITIALIZED,
            );
        }
        let Ok(index) = usize::try_from(index) else {
            let err = Error::ClassIndex {
                index: index as i64,
                count: session.bridge.class_count(),
            };
            return fail("cb_get_class_name", &err, status::predict::INVALID_INPUT);
        };

        let name = match session.bridge.class_name(index) {
            Ok(name) => name,
            Err(e) => return fail("cb_get_class_name", &e, status::for_class_name(&e)),
        };
        if buffer.is_null() || buffer_size <= 0 {
            set_last_error("null or empty name buffer");
            return status::predict::INVALID_INPUT;
        }

        let out = std::slice::from_raw_parts_mut(buffer, buffer_size as usize);
        wide::write_truncated(name, out);
        status::OK
    })
}

/// Number of classes the model scores.
///
/// Sessions from `cb_session_new` use the default config, whose class and
/// feature counts equal these constants; `cb_predict` writes the session's
/// class count, so the two must change together.
#[no_mangle]
pub extern "C" fn cb_get_class_count() -> i32 {
    CLASS_COUNT as i32
}

/// Number of features each sample must carry
#[no_mangle]
pub extern "C" fn cb_get_feature_count() -> i32 {
    FEATURE_COUNT as i32
}

/// Release loaded artifacts. The session stays allocated and may be
/// initialized again. Safe to call repeatedly or on null.
#[no_mangle]
pub unsafe extern "C" fn cb_cleanup(session: *mut CbSession) {
    if let Some(session) = session.as_mut() {
        guard("cb_cleanup", || {
            session.bridge.cleanup();
            status::OK
        });
    }
}
