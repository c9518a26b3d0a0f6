use std::fmt;

use bytes::Bytes;
use thiserror::Error;

use crate::normalize::envelope_message;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    /// Body present but not the JSON shape the call expects.
    InvalidBody,
    /// Request could not be encoded.
    Encode,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::InvalidBody => write!(f, "malformed response body"),
            FailureKind::Encode => write!(f, "request encoding failed"),
        }
    }
}

/// A call that did not yield a usable response. Keeps whatever body the server sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: FailureKind,
    pub message: String,
    body: Option<Bytes>,
}

impl TransportError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            body: None,
        }
    }

    /// Attaches a response body; empty bodies are dropped.
    pub fn with_body(mut self, body: Bytes) -> Self {
        if !body.is_empty() {
            self.body = Some(body);
        }
        self
    }

    /// HTTP status when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self.kind {
            FailureKind::HttpStatus(code) => Some(code),
            _ => None,
        }
    }

    /// Raw response body, if the server produced one.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Human-readable message taken from a JSON error envelope in the body.
    pub fn server_message(&self) -> Option<String> {
        let raw: serde_json::Value = serde_json::from_slice(self.body()?).ok()?;
        envelope_message(&raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("nothing to submit: content is empty")]
    EmptyContent,
}
