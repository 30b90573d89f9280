use serde::ser::Error as _;
use serde::Serialize;
use serde_json::{json, Value};

pub const SUCCESS_STATUS: u16 = 200;
pub const ERROR_STATUS: u16 = 400;

/// Uniform `{data, error}` wrapper returned by every handler.
///
/// Exactly one side is populated; both keys are always present on the wire.
/// The constructors refuse payloads that serialize to `null`, so the populated
/// side can never be mistaken for the empty one.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope(Branch);

#[derive(Debug, Clone, PartialEq)]
enum Branch {
    Data(Value),
    Error(Value),
}

fn non_null(value: Value, side: &str) -> Result<Value, serde_json::Error> {
    if value.is_null() {
        return Err(serde_json::Error::custom(format!(
            "response {side} must not be null"
        )));
    }
    Ok(value)
}

impl ResponseEnvelope {
    pub fn data(payload: impl Serialize) -> Result<Self, serde_json::Error> {
        let value = non_null(serde_json::to_value(payload)?, "data")?;
        Ok(Self(Branch::Data(value)))
    }

    pub fn error(error: impl Serialize) -> Result<Self, serde_json::Error> {
        let value = non_null(serde_json::to_value(error)?, "error")?;
        Ok(Self(Branch::Error(value)))
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self(Branch::Error(json!({ "message": message.into() })))
    }

    pub fn status_code(&self) -> u16 {
        match self.0 {
            Branch::Data(_) => SUCCESS_STATUS,
            Branch::Error(_) => ERROR_STATUS,
        }
    }

    pub fn to_json(&self) -> Value {
        match &self.0 {
            Branch::Data(data) => json!({ "data": data, "error": null }),
            Branch::Error(error) => json!({ "data": null, "error": error }),
        }
    }
}
