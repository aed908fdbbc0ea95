// =============================================================================
// Error types
// =============================================================================
//
// Exchange failures are never retried. They travel unchanged up to the UI
// layer, which renders them into the placeholder they were meant to fill.
// =============================================================================

use thiserror::Error;

/// Failure of a single call to the exchange REST API.
#[derive(Error, Debug)]
pub enum ExchangeError {
    /// The request never produced a response (DNS, TLS, connection reset...).
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("unexpected response from {endpoint}: {reason}")]
    Parse {
        endpoint: String,
        reason: ParseFailure,
    },
}

/// Named reasons a response body failed the schema check.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseFailure {
    #[error("body is not valid JSON ({0})")]
    InvalidJson(String),

    #[error("body is not a JSON array")]
    NotAnArray,

    #[error("row {index} is not an array")]
    RowNotAnArray { index: usize },

    #[error("row {index} has arity {arity}, expected 6")]
    RowArity { index: usize, arity: usize },

    #[error("row {index} has a time that is not a whole number of representable seconds")]
    BadTimestamp { index: usize },

    #[error("row {index} field {field} is not numeric")]
    NotNumeric { index: usize, field: &'static str },

    #[error("body is not a JSON object")]
    NotAnObject,

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{0}` is not a decimal")]
    NotDecimal(&'static str),
}

/// A dropdown value outside its allow-list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("unknown product '{0}'")]
    UnknownProduct(String),

    #[error("unsupported granularity '{0}'")]
    UnsupportedGranularity(String),
}

/// Misconfigured callback wiring, caught at startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("output '{0}' already has a callback")]
    DuplicateOutput(String),

    #[error("callback '{0}' watches no inputs")]
    NoInputs(String),
}

/// Maximum number of response-body bytes quoted in a [`ExchangeError::Status`].
pub const BODY_SNIPPET_LEN: usize = 200;

/// Truncate an error body on a char boundary for logging and display.
pub fn body_snippet(body: &str) -> String {
    if body.len() <= BODY_SNIPPET_LEN {
        return body.to_string();
    }
    let mut end = BODY_SNIPPET_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
