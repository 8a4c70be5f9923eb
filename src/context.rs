use crate::error::AppError;
use bytes::Bytes;
use serde_json::Value;

/// The inspected POST body: the requested model plus the raw bytes, which are
/// forwarded upstream exactly as received.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub model: String,
    pub body: Bytes,
}

impl RequestContext {
    pub fn new(model: String, body: Bytes) -> Self {
        Self { model, body }
    }

    /// Validates that `body` is a JSON object with a string `model` field.
    pub fn from_body(body: Bytes) -> Result<Self, AppError> {
        if body.is_empty() {
            return Err(AppError::BadRequest("request body is empty".to_string()));
        }

        let json: Value = serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("request body is not valid JSON: {}", e)))?;

        let object = json
            .as_object()
            .ok_or_else(|| AppError::BadRequest("request body must be a JSON object".to_string()))?;

        let model = match object.get("model") {
            Some(Value::String(model)) => model.clone(),
            Some(_) => {
                return Err(AppError::BadRequest(
                    "\"model\" must be a string".to_string(),
                ))
            }
            None => {
                return Err(AppError::BadRequest(
                    "missing \"model\" field".to_string(),
                ))
            }
        };

        Ok(Self::new(model, body))
    }
}
