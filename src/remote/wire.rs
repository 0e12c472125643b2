//! Classification of raw HTTP-style responses into the failure taxonomy.
//!
//! Transport adapters hand over the status code and body; this module decides
//! whether the call succeeded, was rejected with a reason, or returned
//! something that cannot be interpreted.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::RemoteFailure;

/// Status code and body as received from the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Value,
}

/// Returns the body of a 2xx response, or the failure it represents.
pub fn classify(raw: &RawResponse) -> Result<&str, RemoteFailure> {
    if raw.is_success() {
        return Ok(&raw.body);
    }
    match serde_json::from_str::<ErrorBody>(&raw.body) {
        Ok(ErrorBody { detail }) => match detail_text(&detail) {
            Some(text) => Err(RemoteFailure::Rejected { detail: text }),
            None => Err(RemoteFailure::Malformed(format!(
                "status {} with unreadable detail",
                raw.status
            ))),
        },
        Err(err) => Err(RemoteFailure::Malformed(format!(
            "status {}: {}",
            raw.status, err
        ))),
    }
}

/// Classifies `raw` and decodes a successful body as `T`.
pub fn decode<T: DeserializeOwned>(raw: &RawResponse) -> Result<T, RemoteFailure> {
    let body = classify(raw)?;
    serde_json::from_str(body).map_err(|err| RemoteFailure::Malformed(err.to_string()))
}

/// Checks a mutation response; the acknowledgement body is not needed.
pub fn expect_success(raw: &RawResponse) -> Result<(), RemoteFailure> {
    classify(raw).map(|_| ())
}

// Request validation failures carry a list of `{ "msg": ... }` entries
// instead of a plain string.
fn detail_text(detail: &Value) -> Option<String> {
    match detail {
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}
