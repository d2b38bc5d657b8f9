//! OCPP-J message framing
//!
//! The OCPP-J transport encodes every message as a JSON array tagged by a
//! numeric message type:
//!
//! - **Call**       `[2, "<messageId>", "<action>", {<payload>}]`
//! - **CallResult** `[3, "<messageId>", {<payload>}]`
//! - **CallError**  `[4, "<messageId>", "<errorCode>", "<errorDescription>", {<errorDetails>}]`
//!
//! Parsing is a total function: any input yields either a frame or an
//! [`OcppFrameError`]. No semantic validation of payload fields happens
//! here; that is the job of the individual action handlers.

use serde_json::Value;
use std::fmt;

const MSG_TYPE_CALL: u64 = 2;
const MSG_TYPE_CALL_RESULT: u64 = 3;
const MSG_TYPE_CALL_ERROR: u64 = 4;

/// A parsed OCPP-J frame.
#[derive(Debug, Clone)]
pub enum OcppFrame {
    /// `[2, messageId, action, payload]`
    Call {
        message_id: String,
        action: String,
        payload: Value,
    },
    /// `[3, messageId, payload]`
    CallResult { message_id: String, payload: Value },
    /// `[4, messageId, errorCode, errorDescription, errorDetails]`
    CallError {
        message_id: String,
        error_code: String,
        error_description: String,
        error_details: Value,
    },
}

impl OcppFrame {
    /// Parse raw message text into a frame.
    pub fn parse(text: &str) -> Result<Self, OcppFrameError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| OcppFrameError::InvalidJson(e.to_string()))?;

        let arr = match value {
            Value::Array(arr) => arr,
            _ => return Err(OcppFrameError::NotAnArray),
        };

        // A frame without a type tag and a message id is unusable.
        if arr.len() < 2 {
            return Err(OcppFrameError::TooShort(arr.len()));
        }

        let msg_type = arr[0].as_u64().ok_or(OcppFrameError::InvalidMessageType)?;
        let message_id = arr[1]
            .as_str()
            .ok_or(OcppFrameError::FieldTypeMismatch("messageId must be a string"))?
            .to_string();

        match msg_type {
            MSG_TYPE_CALL => {
                if arr.len() < 4 {
                    return Err(OcppFrameError::MissingFields {
                        expected: 4,
                        got: arr.len(),
                    });
                }
                let action = arr[2]
                    .as_str()
                    .ok_or(OcppFrameError::FieldTypeMismatch("action must be a string"))?
                    .to_string();
                Ok(Self::Call {
                    message_id,
                    action,
                    payload: arr[3].clone(),
                })
            }
            MSG_TYPE_CALL_RESULT => {
                if arr.len() < 3 {
                    return Err(OcppFrameError::MissingFields {
                        expected: 3,
                        got: arr.len(),
                    });
                }
                Ok(Self::CallResult {
                    message_id,
                    payload: arr[2].clone(),
                })
            }
            MSG_TYPE_CALL_ERROR => {
                if arr.len() < 4 {
                    return Err(OcppFrameError::MissingFields {
                        expected: 4,
                        got: arr.len(),
                    });
                }
                let error_code = arr[2].as_str().unwrap_or("InternalError").to_string();
                let error_description = arr[3].as_str().unwrap_or("").to_string();
                let error_details = arr
                    .get(4)
                    .cloned()
                    .unwrap_or_else(|| Value::Object(Default::default()));
                Ok(Self::CallError {
                    message_id,
                    error_code,
                    error_description,
                    error_details,
                })
            }
            other => Err(OcppFrameError::UnknownMessageType(other)),
        }
    }

    /// Serialize this frame to its wire form.
    pub fn serialize(&self) -> String {
        let arr: Value = match self {
            Self::Call {
                message_id,
                action,
                payload,
            } => Value::Array(vec![
                Value::Number(MSG_TYPE_CALL.into()),
                Value::String(message_id.clone()),
                Value::String(action.clone()),
                payload.clone(),
            ]),
            Self::CallResult { message_id, payload } => Value::Array(vec![
                Value::Number(MSG_TYPE_CALL_RESULT.into()),
                Value::String(message_id.clone()),
                payload.clone(),
            ]),
            Self::CallError {
                message_id,
                error_code,
                error_description,
                error_details,
            } => Value::Array(vec![
                Value::Number(MSG_TYPE_CALL_ERROR.into()),
                Value::String(message_id.clone()),
                Value::String(error_code.clone()),
                Value::String(error_description.clone()),
                error_details.clone(),
            ]),
        };

        // serde_json::to_string on a Value never fails
        serde_json::to_string(&arr).unwrap()
    }

    pub fn message_id(&self) -> &str {
        match self {
            Self::Call { message_id, .. }
            | Self::CallResult { message_id, .. }
            | Self::CallError { message_id, .. } => message_id,
        }
    }

    /// Build a `CallResult` answering the given message id.
    pub fn result(message_id: impl Into<String>, payload: Value) -> Self {
        Self::CallResult {
            message_id: message_id.into(),
            payload,
        }
    }

    /// Build a `CallError` answering the given message id.
    pub fn error(
        message_id: impl Into<String>,
        error_code: impl Into<String>,
        error_description: impl Into<String>,
    ) -> Self {
        Self::CallError {
            message_id: message_id.into(),
            error_code: error_code.into(),
            error_description: error_description.into(),
            error_details: Value::Object(Default::default()),
        }
    }
}

/// Errors produced while parsing an OCPP-J frame.
#[derive(Debug)]
pub enum OcppFrameError {
    InvalidJson(String),
    NotAnArray,
    TooShort(usize),
    InvalidMessageType,
    UnknownMessageType(u64),
    MissingFields { expected: usize, got: usize },
    FieldTypeMismatch(&'static str),
}

impl fmt::Display for OcppFrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidJson(msg) => write!(f, "invalid JSON: {}", msg),
            Self::NotAnArray => write!(f, "OCPP message is not a JSON array"),
            Self::TooShort(n) => write!(f, "OCPP array has {} elements, need at least 2", n),
            Self::InvalidMessageType => write!(f, "message type is not a number"),
            Self::UnknownMessageType(t) => write!(f, "unknown message type: {}", t),
            Self::MissingFields { expected, got } => {
                write!(f, "expected at least {} fields, got {}", expected, got)
            }
            Self::FieldTypeMismatch(msg) => write!(f, "field type mismatch: {}", msg),
        }
    }
}

impl std::error::Error for OcppFrameError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_boot_notification_call() {
        let text = r#"[2,"42","BootNotification",{"chargePointVendor":"Acme","chargePointModel":"X1"}]"#;
        match OcppFrame::parse(text).unwrap() {
            OcppFrame::Call {
                message_id,
                action,
                payload,
            } => {
                assert_eq!(message_id, "42");
                assert_eq!(action, "BootNotification");
                assert_eq!(payload["chargePointModel"], "X1");
            }
            other => panic!("expected Call, got {:?}", other),
        }
    }

    #[test]
    fn parse_call_result() {
        let text = r#"[3,"42",{"currentTime":"2025-01-01T00:00:00Z"}]"#;
        match OcppFrame::parse(text).unwrap() {
            OcppFrame::CallResult { message_id, payload } => {
                assert_eq!(message_id, "42");
                assert_eq!(payload["currentTime"], "2025-01-01T00:00:00Z");
            }
            other => panic!("expected CallResult, got {:?}", other),
        }
    }

    #[test]
    fn parse_call_error() {
        let text = r#"[4,"42","NotImplemented","'Reset' not implemented",{}]"#;
        match OcppFrame::parse(text).unwrap() {
            OcppFrame::CallError {
                error_code,
                error_description,
                ..
            } => {
                assert_eq!(error_code, "NotImplemented");
                assert_eq!(error_description, "'Reset' not implemented");
            }
            other => panic!("expected CallError, got {:?}", other),
        }
    }

    #[test]
    fn invalid_json_is_rejected() {
        assert!(matches!(
            OcppFrame::parse("not json at all"),
            Err(OcppFrameError::InvalidJson(_))
        ));
    }

    #[test]
    fn non_array_is_rejected() {
        assert!(matches!(
            OcppFrame::parse(r#"{"action":"Heartbeat"}"#),
            Err(OcppFrameError::NotAnArray)
        ));
    }

    #[test]
    fn short_array_is_rejected() {
        assert!(matches!(
            OcppFrame::parse("[2]"),
            Err(OcppFrameError::TooShort(1))
        ));
    }

    #[test]
    fn call_without_action_is_rejected() {
        assert!(matches!(
            OcppFrame::parse(r#"[2,"42"]"#),
            Err(OcppFrameError::MissingFields { expected: 4, got: 2 })
        ));
    }

    #[test]
    fn call_result_without_payload_is_rejected() {
        assert!(matches!(
            OcppFrame::parse(r#"[3,"42"]"#),
            Err(OcppFrameError::MissingFields { expected: 3, got: 2 })
        ));
    }

    #[test]
    fn unknown_message_type_is_rejected() {
        assert!(matches!(
            OcppFrame::parse(r#"[7,"42",{}]"#),
            Err(OcppFrameError::UnknownMessageType(7))
        ));
    }

    #[test]
    fn parse_never_panics_on_arbitrary_input() {
        for input in ["", "[]", "null", "[null]", "[2,null]", "[\"2\",\"x\"]", "[2,2,2,2]"] {
            let _ = OcppFrame::parse(input);
        }
    }

    #[test]
    fn roundtrip_call() {
        let frame = OcppFrame::Call {
            message_id: "m1".into(),
            action: "Heartbeat".into(),
            payload: serde_json::json!({}),
        };
        let parsed = OcppFrame::parse(&frame.serialize()).unwrap();
        assert_eq!(parsed.message_id(), "m1");
        assert!(matches!(parsed, OcppFrame::Call { .. }));
    }

    #[test]
    fn roundtrip_error() {
        let frame = OcppFrame::error("m3", "GenericError", "boom");
        let parsed = OcppFrame::parse(&frame.serialize()).unwrap();
        assert!(matches!(parsed, OcppFrame::CallError { .. }));
        assert_eq!(parsed.message_id(), "m3");
    }
}
