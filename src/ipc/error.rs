use crate::error::PortalError;
use crate::notify::Notification;
use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

pub fn from_error(id: &str, e: &PortalError) -> serde_json::Value {
    err(id, e.code(), e.to_string(), e.details())
}

pub fn respond(id: &str, result: crate::error::Result<serde_json::Value>) -> serde_json::Value {
    match result {
        Ok(v) => ok(id, v),
        Err(e) => {
            tracing::debug!(id, code = e.code(), error = %e, "request failed");
            from_error(id, &e)
        }
    }
}

/// Adds the notifications raised while handling the request to its envelope.
pub fn with_notifications(
    mut resp: serde_json::Value,
    notifications: Vec<Notification>,
) -> serde_json::Value {
    resp["notifications"] = json!(notifications);
    resp
}
