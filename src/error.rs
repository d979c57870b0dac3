//! Error taxonomy for backend operations.
//!
//! Every network call resolves to `ApiResult<T>`; callers catch at the
//! operation boundary, log, and surface a toast. Nothing propagates past the
//! view. Partial bulk failure is deliberately *not* represented here: a
//! mixed import result is a normal outcome carried by
//! [`crate::api::BulkResults`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// 401 from any authenticated endpoint. The UI drops back to the
    /// login-required screen and discards in-flight page state.
    #[error("session rejected by the server; sign in again")]
    Unauthorized,

    /// Duplicate unique key (email, barcode, ...). Attached to the named
    /// field of the originating form in addition to the toast.
    #[error("{field}: {message}")]
    FieldConflict { field: String, message: String },

    /// Any other non-2xx response.
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    /// Transport-level failure (connect, timeout, TLS).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body did not match the expected shape.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
