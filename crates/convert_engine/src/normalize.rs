//! Collapses transport outcomes into "typed result" or "raised failure".
//!
//! The backend answers domain failures with a non-2xx status and a body shaped
//! like the regular result (`{"success": false, "errors": [...]}`). Such a body
//! is returned as a value; only calls without a usable body stay errors.

use bytes::Bytes;
use client_logging::{client_debug, client_info};
use convert_core::{ConversionError, ConversionResult, ValidationResult};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{FailureKind, TransportError};

const ENVELOPE_ERROR_CODE: &str = "REQUEST_FAILED";

/// A result type whose payload carries its own outcome flag.
pub trait StructuredOutcome: DeserializeOwned {
    /// Boolean field that must be present for a body to count as this type.
    const OUTCOME_FIELD: &'static str;

    /// Restores the "failed implies details" invariant for thin error envelopes.
    fn ensure_failure_detail(&mut self, raw: &Value);
}

impl StructuredOutcome for ConversionResult {
    const OUTCOME_FIELD: &'static str = "success";

    fn ensure_failure_detail(&mut self, raw: &Value) {
        if self.success || !self.errors.is_empty() {
            return;
        }
        let message = envelope_message(raw)
            .unwrap_or_else(|| "The conversion service reported a failure".to_string());
        self.errors.push(ConversionError::new(ENVELOPE_ERROR_CODE, message));
    }
}

impl StructuredOutcome for ValidationResult {
    const OUTCOME_FIELD: &'static str = "valid";

    fn ensure_failure_detail(&mut self, raw: &Value) {
        if self.valid || !self.errors.is_empty() {
            return;
        }
        let message = if self.message.trim().is_empty() {
            envelope_message(raw).unwrap_or_else(|| "Validation failed".to_string())
        } else {
            self.message.clone()
        };
        self.errors.push(message);
    }
}

/// Turns a transport outcome into a typed result, recovering structured failure bodies.
pub fn normalize<T: StructuredOutcome>(
    outcome: Result<Bytes, TransportError>,
) -> Result<T, TransportError> {
    match outcome {
        Ok(body) => parse_structured(&body).ok_or_else(|| {
            TransportError::new(
                FailureKind::InvalidBody,
                format!("response lacks boolean `{}` field", T::OUTCOME_FIELD),
            )
            .with_body(body)
        }),
        Err(err) => match err.body().and_then(parse_structured::<T>) {
            Some(result) => {
                client_info!(
                    "recovered structured `{}` payload from failed call ({})",
                    T::OUTCOME_FIELD,
                    err.kind
                );
                Ok(result)
            }
            None => Err(err),
        },
    }
}

/// Decodes a plain JSON response for endpoints without structured failures.
pub fn parse_json<T: DeserializeOwned>(body: Bytes) -> Result<T, TransportError> {
    serde_json::from_slice(&body).map_err(|err| {
        TransportError::new(FailureKind::InvalidBody, err.to_string()).with_body(body)
    })
}

fn parse_structured<T: StructuredOutcome>(body: &[u8]) -> Option<T> {
    let raw: Value = serde_json::from_slice(body).ok()?;
    if !raw.get(T::OUTCOME_FIELD).is_some_and(Value::is_boolean) {
        client_debug!("body has no boolean `{}` field", T::OUTCOME_FIELD);
        return None;
    }
    let mut parsed: T = match serde_json::from_value(raw.clone()) {
        Ok(parsed) => parsed,
        Err(err) => {
            client_debug!("body does not match expected shape: {}", err);
            return None;
        }
    };
    parsed.ensure_failure_detail(&raw);
    Some(parsed)
}

/// Extracts the server's explanation from `{error, details}` or `{message}` envelopes.
pub(crate) fn envelope_message(raw: &Value) -> Option<String> {
    match (text_field(raw, "error"), text_field(raw, "details")) {
        (Some(error), Some(details)) => Some(format!("{error}: {details}")),
        (Some(error), None) => Some(error.to_string()),
        (None, details) => text_field(raw, "message")
            .or(details)
            .map(ToOwned::to_owned),
    }
}

fn text_field<'a>(raw: &'a Value, key: &str) -> Option<&'a str> {
    raw.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
}
