// Wire types for the operation endpoints

use serde::{Deserialize, Serialize};

/// Request body: `{"operando1": f64, "operando2": f64}`
///
/// Both fields are required. Unknown fields are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct OperationRequest {
    #[serde(rename = "operando1")]
    pub operand1: f64,
    #[serde(rename = "operando2")]
    pub operand2: f64,
}

/// Response body: `{"resultado": f64}`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct OperationResult {
    #[serde(rename = "resultado")]
    pub result: f64,
}

impl OperationRequest {
    /// Decode a request body. Only a JSON object is accepted; serde would
    /// otherwise also take a two-element array for a struct.
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_slice(body)?;
        if !value.is_object() {
            return Err(serde::de::Error::custom("expected a JSON object"));
        }
        serde_json::from_value(value)
    }
}

impl OperationResult {
    pub const fn new(result: f64) -> Self {
        Self { result }
    }
}
