use std::ffi::NulError;
use std::str::Utf8Error;

use thiserror::Error;

pub type Result<T, E = GdalQueryError> = std::result::Result<T, E>;

/// Error kinds surfaced by the query layer.
///
/// Every failure carries the failing GDAL entry point and, where GDAL
/// produced one, the native error message. Failures are never downgraded to
/// empty results; the two documented empty cases (a dataset without GCPs, a
/// `skip` past the end of a result set) are successes.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum GdalQueryError {
    /// No registered driver recognises the source string.
    #[error("no GDAL driver recognises '{source}': '{msg}'")]
    UnsupportedSource { source: String, msg: String },

    /// A caller-supplied parameter failed validation.
    #[error("invalid parameter for '{method_name}': {msg}")]
    InvalidParameter {
        method_name: &'static str,
        msg: String,
    },

    /// GDAL failed to open or read the source.
    #[error("GDAL method '{method_name}' failed: '{msg}'")]
    IoFailure {
        method_name: &'static str,
        msg: String,
    },

    /// GDAL rejected a SQL statement.
    #[error("SQL statement failed: '{msg}'")]
    QueryFailure { msg: String },

    #[error("FfiNulError")]
    FfiNulError(#[from] NulError),

    #[error("StrUtf8Error")]
    StrUtf8Error(#[from] Utf8Error),
}

impl GdalQueryError {
    pub(crate) fn invalid(method_name: &'static str, msg: impl Into<String>) -> Self {
        GdalQueryError::InvalidParameter {
            method_name,
            msg: msg.into(),
        }
    }
}
