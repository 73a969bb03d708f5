//! Error types for the Fio client library.

use core::fmt;
use core::num::ParseIntError;

/// All errors that can occur when using the Fio client.
#[derive(Debug, thiserror::Error)]
pub enum FioError {
    /// The HTTP transport failed (connection, TLS, body read).
    ///
    /// The wrapped error never carries the request URL, which embeds the
    /// token.
    #[cfg(feature = "async")]
    #[error("transport error: {0}")]
    Transport(reqwest::Error),

    /// The execution context was cancelled before the exchange completed.
    #[error("request cancelled: {0}")]
    Cancelled(CancelReason),

    /// The server answered with a non-success status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The response body could not be decoded.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Writing exported bytes to the caller's sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No API token was supplied to the client builder.
    #[error("an API token is required")]
    MissingToken,

    /// The configured base URL is not a valid absolute URL.
    #[cfg(feature = "async")]
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

impl FioError {
    /// Returns `true` if repeating the same call later may succeed.
    ///
    /// Only the rate-limit response qualifies; the library never retries
    /// on its own.
    #[inline]
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            *self,
            Self::Api(ApiError {
                kind: ApiErrorKind::RateLimited,
                ..
            })
        )
    }
}

/// Why an execution context stopped a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The context was cancelled explicitly.
    Cancelled,
    /// The context deadline passed.
    DeadlineExceeded,
}

impl fmt::Display for CancelReason {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Cancelled => f.write_str("context cancelled"),
            Self::DeadlineExceeded => f.write_str("context deadline exceeded"),
        }
    }
}

/// Meaning of a non-success status on the Fio API.
///
/// The API reuses status codes for several causes, so this is a coarse
/// classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 400: malformed date in the request path.
    BadRequest,
    /// 404: unknown resource or account.
    NotFound,
    /// 409: the minimum interval between calls was not respected.
    RateLimited,
    /// 500: validation error, invalid token or an opaque server failure.
    Server,
    /// Any other non-success status.
    Other,
}

impl ApiErrorKind {
    /// Classifies an HTTP status code.
    #[inline]
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            404 => Self::NotFound,
            409 => Self::RateLimited,
            500 => Self::Server,
            _ => Self::Other,
        }
    }
}

/// A non-success response from the API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{method} {url}: {status} {}", .message.as_deref().unwrap_or_default())]
pub struct ApiError {
    /// HTTP method of the failed request.
    pub method: String,
    /// Request URL with the token redacted.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// Classification of `status`.
    pub kind: ApiErrorKind,
    /// Human-readable message from the XML error envelope, if any.
    pub message: Option<String>,
}

/// Failure to decode a statement or error envelope.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The document is not well-formed XML.
    #[error("malformed XML at byte {position}: {source}")]
    Xml {
        /// Byte offset reached by the reader.
        position: u64,
        /// Underlying reader error.
        source: quick_xml::Error,
    },

    /// The document is well-formed but does not look like the expected one.
    #[error("unexpected document: {0}")]
    Malformed(String),

    /// The root element has the wrong name.
    #[error("expected root element <{expected}>, found <{found}>")]
    UnexpectedRoot {
        /// Expected root name.
        expected: &'static str,
        /// Actual root name.
        found: String,
    },

    /// A required element is absent.
    #[error("missing element <{0}>")]
    MissingElement(&'static str),

    /// A field is not a base-10 integer.
    #[error("invalid integer in {field}: \"{value}\": {source}")]
    InvalidInteger {
        /// Field that failed.
        field: String,
        /// Offending text.
        value: String,
        /// Underlying error.
        source: ParseIntError,
    },

    /// A field is not a decimal number.
    #[error("invalid decimal in {field}: \"{value}\": {reason}")]
    InvalidDecimal {
        /// Field that failed.
        field: String,
        /// Offending text.
        value: String,
        /// What was wrong.
        reason: String,
    },

    /// A field does not follow the `YYYY-MM-DD±HH:MM` grammar.
    #[error("invalid date in {field}: \"{value}\": {reason}")]
    InvalidDate {
        /// Field that failed.
        field: String,
        /// Offending text.
        value: String,
        /// What was wrong.
        reason: &'static str,
    },

    /// A transaction column has a field code this library does not know.
    #[error("unable to parse column \"{name}\" (id {code})")]
    UnknownColumn {
        /// Numeric field code as sent by the server.
        code: String,
        /// Display name attribute of the column.
        name: String,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, FioError>;
