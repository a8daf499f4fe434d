//! Wire frames.
//!
//! One JSON object per line in each direction:
//!
//! ```text
//! → {"id":7,"type":"SelectObject","payload":{"elementNameGlue":"Screens\\GameScreen",...}}
//! ← {"id":7,"succeeded":true,"data":null,"message":null}
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::dto::CommandBody;
use super::error::LiveError;

/// A command ready to go on the wire, minus its correlation id.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub kind: String,
    pub payload: Value,
}

impl Command {
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// Flatten a typed command into its `type` tag and `payload`.
    pub fn from_body(body: &CommandBody) -> Result<Self, LiveError> {
        let value =
            serde_json::to_value(body).map_err(|e| LiveError::Malformed(e.to_string()))?;
        let Value::Object(mut map) = value else {
            return Err(LiveError::Malformed("command is not an object".into()));
        };

        let kind = match map.remove("type") {
            Some(Value::String(kind)) => kind,
            _ => return Err(LiveError::Malformed("command has no type".into())),
        };
        let payload = map.remove("payload").unwrap_or(Value::Null);

        Ok(Self { kind, payload })
    }

    /// Serialize as one newline-terminated frame.
    pub fn to_frame(&self, id: u64) -> Result<Vec<u8>, LiveError> {
        let frame = RequestFrame {
            id,
            kind: &self.kind,
            payload: &self.payload,
        };
        let mut bytes =
            serde_json::to_vec(&frame).map_err(|e| LiveError::Malformed(e.to_string()))?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

#[derive(Serialize)]
struct RequestFrame<'a> {
    id: u64,
    #[serde(rename = "type")]
    kind: &'a str,
    #[serde(skip_serializing_if = "Value::is_null")]
    payload: &'a Value,
}

/// A response from the live process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: u64,
    pub succeeded: bool,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub message: Option<String>,
}

impl Response {
    /// `Err(Rejected)` when the live process reported failure.
    pub fn into_success(self) -> Result<Self, LiveError> {
        if self.succeeded {
            Ok(self)
        } else {
            Err(LiveError::Rejected(
                self.message
                    .unwrap_or_else(|| "no message given".to_string()),
            ))
        }
    }

    /// Decode `data` into a typed response.
    ///
    /// Some live processes send the data as a JSON string; both forms are accepted.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, LiveError> {
        let decoded = match &self.data {
            Value::String(raw) => serde_json::from_str(raw),
            other => serde_json::from_value(other.clone()),
        };
        decoded.map_err(|e| LiveError::Malformed(e.to_string()))
    }
}

/// Parse an incoming line. On failure, returns the id if one could be salvaged.
pub(super) fn parse_response(line: &str) -> Result<Response, (Option<u64>, LiveError)> {
    serde_json::from_str::<Response>(line).map_err(|err| {
        let id = serde_json::from_str::<Value>(line)
            .ok()
            .and_then(|value| value.get("id").and_then(Value::as_u64));
        (id, LiveError::Malformed(err.to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::dto::{CommandBody, RestartScreen};
    use serde_json::json;

    #[test]
    fn test_frame_shape() {
        let command = Command::from_body(&CommandBody::RestartScreen(RestartScreen {
            reload_global_content: true,
        }))
        .unwrap();
        let frame = command.to_frame(3).unwrap();
        assert_eq!(frame.last(), Some(&b'\n'));

        let value: Value = serde_json::from_slice(&frame).unwrap();
        assert_eq!(
            value,
            json!({"id": 3, "type": "RestartScreen", "payload": {"reloadGlobalContent": true}})
        );
    }

    #[test]
    fn test_unit_command_has_no_payload() {
        let command = Command::from_body(&CommandBody::GetCurrentScreen).unwrap();
        assert_eq!(command.kind, "GetCurrentScreen");
        assert!(command.payload.is_null());

        let value: Value = serde_json::from_slice(&command.to_frame(1).unwrap()).unwrap();
        assert!(value.get("payload").is_none());
    }

    #[test]
    fn test_response_defaults() {
        let response = parse_response(r#"{"id":1,"succeeded":true}"#).unwrap();
        assert!(response.data.is_null());
        assert!(response.message.is_none());
    }

    #[test]
    fn test_rejected_response() {
        let response = parse_response(r#"{"id":1,"succeeded":false,"message":"no screen"}"#)
            .unwrap();
        assert_eq!(
            response.into_success(),
            Err(LiveError::Rejected("no screen".into()))
        );
    }

    #[test]
    fn test_malformed_salvages_id() {
        let (id, err) = parse_response(r#"{"id":9,"succeeded":"maybe"}"#).unwrap_err();
        assert_eq!(id, Some(9));
        assert!(err.is_timeout_like());

        let (id, _) = parse_response("not json").unwrap_err();
        assert_eq!(id, None);
    }

    #[test]
    fn test_data_as_accepts_string_payload() {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Moved {
            number_failed_to_move: usize,
        }

        let inline = parse_response(r#"{"id":1,"succeeded":true,"data":{"numberFailedToMove":2}}"#)
            .unwrap();
        let stringly = parse_response(
            r#"{"id":1,"succeeded":true,"data":"{\"numberFailedToMove\":2}"}"#,
        )
        .unwrap();
        assert_eq!(inline.data_as::<Moved>().unwrap().number_failed_to_move, 2);
        assert_eq!(stringly.data_as::<Moved>().unwrap().number_failed_to_move, 2);
    }
}
