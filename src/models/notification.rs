//! Notification relay models.
//!
//! Request envelope resolution, the downstream message shape and the
//! uniform relay result.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

// ============================================================================
// Request
// ============================================================================

/// The three fields a caller supplies.
///
/// Values are kept as raw JSON and passed through untouched; the messaging
/// backend is the only place they get rejected. `None` means the field was
/// absent from the request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationRequest {
    pub token: Option<Value>,
    pub title: Option<Value>,
    pub body: Option<Value>,
}

impl NotificationRequest {
    /// Builds a request from plain strings
    pub fn new(token: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            token: Some(Value::String(token.into())),
            title: Some(Value::String(title.into())),
            body: Some(Value::String(body.into())),
        }
    }

    /// Reads `token`, `title` and `body` from a JSON value.
    ///
    /// Anything that is not an object yields a request with every field absent.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(fields) => Self::from_fields(fields),
            _ => Self::default(),
        }
    }

    fn from_fields(fields: &Map<String, Value>) -> Self {
        Self {
            token: fields.get("token").cloned(),
            title: fields.get("title").cloned(),
            body: fields.get("body").cloned(),
        }
    }
}

/// Request as it arrives at the boundary.
///
/// Some transports wrap the logical request one level deeper under `data`.
/// The envelope wins whenever `data` is truthy; outer fields are then ignored.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayRequest {
    Direct(NotificationRequest),
    Enveloped { data: NotificationRequest },
}

impl RelayRequest {
    /// Resolves the envelope shape of a raw invocation argument
    pub fn from_value(value: &Value) -> Self {
        match value.get("data") {
            Some(data) if is_truthy(data) => RelayRequest::Enveloped {
                data: NotificationRequest::from_value(data),
            },
            _ => RelayRequest::Direct(NotificationRequest::from_value(value)),
        }
    }

    /// Returns the request the relay should act on
    pub fn into_effective(self) -> NotificationRequest {
        match self {
            RelayRequest::Direct(request) => request,
            RelayRequest::Enveloped { data } => data,
        }
    }

    pub fn is_enveloped(&self) -> bool {
        matches!(self, RelayRequest::Enveloped { .. })
    }
}

impl From<NotificationRequest> for RelayRequest {
    fn from(request: NotificationRequest) -> Self {
        RelayRequest::Direct(request)
    }
}

/// Truthiness used for the `data` envelope check.
///
/// `null`, `false`, `0` and `""` are falsy. Everything else, including empty
/// arrays and objects, is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Name of the JSON kind of an optional field, `undefined` when absent
pub fn json_kind(value: Option<&Value>) -> &'static str {
    match value {
        None => "undefined",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

// ============================================================================
// Downstream message
// ============================================================================

/// Visible notification part of a message
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NotificationPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// Normalized message submitted to the messaging backend:
/// `{notification: {title, body}, token}`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NotificationMessage {
    pub notification: NotificationPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<Value>,
}

impl From<&NotificationRequest> for NotificationMessage {
    fn from(request: &NotificationRequest) -> Self {
        Self {
            notification: NotificationPayload {
                title: request.title.clone(),
                body: request.body.clone(),
            },
            token: request.token.clone(),
        }
    }
}

// ============================================================================
// Result
// ============================================================================

/// Outcome reported to the caller.
///
/// Serializes as `{"success": true, "response": id}` or
/// `{"success": false, "error": token}`. The failure variant echoes the
/// request token, not the delivery error; an absent token becomes `null`.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayResult {
    Delivered { response: String },
    Failed { error: Option<Value> },
}

impl RelayResult {
    pub fn is_success(&self) -> bool {
        matches!(self, RelayResult::Delivered { .. })
    }
}

impl Serialize for RelayResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        match self {
            RelayResult::Delivered { response } => {
                map.serialize_entry("success", &true)?;
                map.serialize_entry("response", response)?;
            }
            RelayResult::Failed { error } => {
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", error.as_ref().unwrap_or(&Value::Null))?;
            }
        }
        map.end()
    }
}
