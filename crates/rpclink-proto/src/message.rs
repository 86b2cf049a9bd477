use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Method name of the best-effort shutdown notification.
pub const EXIT_METHOD: &str = "exit";

/// Sentinel error code the peer uses to announce a deliberate shutdown,
/// as opposed to simply closing its output stream.
pub const SHUTDOWN_CODE: i64 = -1;

/// Any message that can appear on the wire.
///
/// Classification follows field shape rather than an explicit tag:
/// an `id` together with a `method` is a request, an `id` together with
/// a `result` or `error` is a response, a bare `method` is a notification.
/// Variant order matters for `untagged` deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Message {
    Request(Request),
    Response(Response),
    Notification(Notification),
}

impl From<Request> for Message {
    fn from(request: Request) -> Message {
        Message::Request(request)
    }
}

impl From<Response> for Message {
    fn from(response: Response) -> Message {
        Message::Response(response)
    }
}

impl From<Notification> for Message {
    fn from(notification: Notification) -> Message {
        Message::Notification(notification)
    }
}

/// A call that expects a correlated reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Request {
    pub id: u64,
    pub method: String,
    #[serde(default)]
    #[serde(skip_serializing_if = "Value::is_null")]
    pub params: Value,
}

impl Request {
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            id,
            method: method.into(),
            params,
        }
    }
}

/// The peer's answer to a [`Request`], carrying either a result or an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Response {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
}

impl Response {
    pub fn ok(id: u64, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(id: u64, error: ResponseError) -> Self {
        Self {
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// Error object attached to a failed response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ResponseError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// True when this error is the peer's deliberate shutdown signal.
    pub fn is_shutdown(&self) -> bool {
        self.code == SHUTDOWN_CODE
    }
}

/// A one-way message: no correlation id, never answered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub method: String,
    #[serde(default)]
    #[serde(skip_serializing_if = "Value::is_null")]
    pub params: Value,
}

impl Notification {
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }

    /// The shutdown notification sent by `Endpoint::stop`.
    pub fn exit() -> Self {
        Self::new(EXIT_METHOD, Value::Null)
    }

    pub fn is_exit(&self) -> bool {
        self.method == EXIT_METHOD
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_serializes_with_id_and_params() {
        let request = Request::new(0, "ping", json!({}));
        let wire = serde_json::to_string(&request).expect("request should serialize");
        assert_eq!(wire, r#"{"id":0,"method":"ping","params":{}}"#);
    }

    #[test]
    fn notification_omits_null_params() {
        let wire = serde_json::to_string(&Notification::exit()).expect("exit should serialize");
        assert_eq!(wire, r#"{"method":"exit"}"#);
    }

    #[test]
    fn classifies_request() {
        let msg: Message = serde_json::from_str(r#"{"id":3,"method":"parse","params":[1,2]}"#)
            .expect("request should deserialize");
        match msg {
            Message::Request(req) => {
                assert_eq!(req.id, 3);
                assert_eq!(req.method, "parse");
                assert_eq!(req.params, json!([1, 2]));
            }
            other => panic!("expected request, got {other:?}"),
        }
    }

    #[test]
    fn classifies_response_with_result() {
        let msg: Message = serde_json::from_str(r#"{"id":0,"result":"pong"}"#)
            .expect("response should deserialize");
        match msg {
            Message::Response(resp) => {
                assert_eq!(resp.id, 0);
                assert_eq!(resp.result, Some(json!("pong")));
                assert!(resp.error.is_none());
            }
            other => panic!("expected response, got {other:?}"),
        }
    }

    #[test]
    fn classifies_response_with_error() {
        let msg: Message =
            serde_json::from_str(r#"{"id":7,"error":{"code":-1,"message":"bye"}}"#)
                .expect("error response should deserialize");
        match msg {
            Message::Response(resp) => {
                let error = resp.error.expect("error object should be present");
                assert!(error.is_shutdown());
                assert_eq!(error.message, "bye");
                assert!(error.data.is_none());
            }
            other => panic!("expected response, got {other:?}"),
        }
    }

    #[test]
    fn classifies_notification() {
        let msg: Message = serde_json::from_str(r#"{"method":"progress","params":{"pct":50}}"#)
            .expect("notification should deserialize");
        match msg {
            Message::Notification(note) => {
                assert_eq!(note.method, "progress");
                assert!(!note.is_exit());
            }
            other => panic!("expected notification, got {other:?}"),
        }
    }

    #[test]
    fn missing_params_defaults_to_null() {
        let msg: Message = serde_json::from_str(r#"{"method":"exit"}"#)
            .expect("bare notification should deserialize");
        match msg {
            Message::Notification(note) => {
                assert!(note.is_exit());
                assert!(note.params.is_null());
            }
            other => panic!("expected notification, got {other:?}"),
        }
    }

    #[test]
    fn error_data_round_trips() {
        let mut error = ResponseError::new(-32601, "method not found");
        error.data = Some(json!({"method": "unknown"}));
        let response = Message::from(Response::err(9, error.clone()));

        let wire = serde_json::to_string(&response).expect("response should serialize");
        let back: Message = serde_json::from_str(&wire).expect("response should deserialize");

        assert_eq!(back, response);
    }
}
