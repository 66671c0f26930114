//! Status codes returned across the C boundary
//!
//! Codes are per operation: the same negative value can mean different
//! things for `cb_initialize` and `cb_predict`. Anything without a
//! dedicated code collapses to [`UNKNOWN`].

use classbridge_core::{Artifact, Error};

pub const OK: i32 = 0;
pub const UNKNOWN: i32 = -999;

/// Codes for `cb_initialize`
pub mod initialize {
    pub const SCALER_OPEN: i32 = -1;
    pub const SCALER_INVALID: i32 = -2;
    pub const LABELS_OPEN: i32 = -3;
    pub const ALREADY_INITIALIZED: i32 = -4;
}

/// Codes for `cb_predict`, `cb_predict_from_csv` and `cb_get_class_name`
pub mod predict {
    pub const NOT_INITIALIZED: i32 = -1;
    pub const INVALID_INPUT: i32 = -2;
}

pub(crate) fn for_initialize(err: &Error) -> i32 {
    match err {
        Error::Open {
            artifact: Artifact::Scaler,
            ..
        } => initialize::SCALER_OPEN,
        Error::InvalidScaler(_) => initialize::SCALER_INVALID,
        Error::Open {
            artifact: Artifact::Labels,
            ..
        } => initialize::LABELS_OPEN,
        Error::AlreadyInitialized => initialize::ALREADY_INITIALIZED,
        _ => UNKNOWN,
    }
}

pub(crate) fn for_predict(err: &Error) -> i32 {
    match err {
        Error::NotInitialized => predict::NOT_INITIALIZED,
        Error::FeatureCount { .. } => predict::INVALID_INPUT,
        _ => UNKNOWN,
    }
}

pub(crate) fn for_batch(err: &Error) -> i32 {
    match err {
        Error::Open {
            artifact: Artifact::Samples,
            ..
        }
        | Error::NoUsableData(_) => predict::INVALID_INPUT,
        other => for_predict(other),
    }
}

pub(crate) fn for_class_name(err: &Error) -> i32 {
    match err {
        Error::NotInitialized => predict::NOT_INITIALIZED,
        Error::ClassIndex { .. } => predict::INVALID_INPUT,
        _ => UNKNOWN,
    }
}
