//! The result envelope every facade operation returns.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CODE_SUCCESS: i32 = 1;
pub const CODE_ERROR: i32 = 0;

/// `{ "code": 1|0, "msg": ..., "data": ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub code: i32,
    pub msg: String,
    pub data: Value,
}

impl Response {
    pub fn success(data: Value) -> Self {
        Self {
            code: CODE_SUCCESS,
            msg: "success".to_string(),
            data,
        }
    }

    /// Error envelope. Details stay in the log; `msg` only carries the
    /// top-level description.
    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            code: CODE_ERROR,
            msg: msg.into(),
            data: Value::Null,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == CODE_SUCCESS
    }

    /// Compact JSON rendering; falls back to a fixed error envelope.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"code":0,"msg":"cannot encode response","data":null}"#.to_string())
    }
}
