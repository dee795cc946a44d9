//! The `{code, data}` response envelope and its per-endpoint meaning.
//!
//! Every backend endpoint answers with the same envelope, but what a given
//! nonzero code means differs between endpoints. Each call site names its
//! [`CodePolicy`] instead of comparing raw integers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw envelope as sent by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub code: i64,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    pub fn new(code: i64, data: Value) -> Self {
        Self { code, data }
    }

    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// `data` as a message string, if it carries anything.
    pub fn message(&self) -> Option<String> {
        data_text(&self.data)
    }
}

/// Text form of a `data` value; `None` for null, empty string or `false`.
pub fn data_text(data: &Value) -> Option<String> {
    match data {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// How an endpoint's codes map onto outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePolicy {
    /// 0 is success; anything else is failure.
    Strict,
    /// 0 is success; 1 is success with a caveat; anything else is failure.
    /// Used by git sync actions.
    WarnOnOne,
    /// 0 is success; 1 means nothing recorded yet; anything else is failure.
    /// Used by admin stats.
    NoDataOnOne,
}

/// Typed interpretation of an envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Ok(Value),
    Warning(Value),
    NoData,
    Error(Option<String>),
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }

    /// Payload for `Ok` and `Warning`.
    pub fn data(&self) -> Option<&Value> {
        match self {
            Outcome::Ok(data) | Outcome::Warning(data) => Some(data),
            _ => None,
        }
    }

    /// Short label, used in logs and CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Ok(_) => "success",
            Outcome::Warning(_) => "warning",
            Outcome::NoData => "no data",
            Outcome::Error(_) => "error",
        }
    }
}

impl CodePolicy {
    pub fn classify(&self, envelope: Envelope) -> Outcome {
        match (self, envelope.code) {
            (_, 0) => Outcome::Ok(envelope.data),
            (CodePolicy::WarnOnOne, 1) => Outcome::Warning(envelope.data),
            (CodePolicy::NoDataOnOne, 1) => Outcome::NoData,
            _ => Outcome::Error(envelope.message()),
        }
    }
}
