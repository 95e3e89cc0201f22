use crate::domain::validation::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 解析请求体，要求是JSON对象
pub fn parse_object(body: &[u8]) -> Result<Value, ValidationError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ValidationError::MalformedBody(format!("invalid JSON: {}", e)))?;
    if !value.is_object() {
        return Err(ValidationError::MalformedBody(
            "expected a JSON object".to_string(),
        ));
    }
    Ok(value)
}

/// Loopback请求体，所有端点共用
///
/// 字段全部可选：缺失字段由校验层转成 `InvalidInput`，而不是传给设备。
/// `interface_number` 与 `subnet` 接受字符串或数字。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoopbackRequest {
    #[serde(default)]
    pub interface_number: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub loopback_ip: Option<String>,
    // 子网掩码，仅结构化变体使用
    #[serde(default)]
    pub subnet: Option<Value>,
}

impl LoopbackRequest {
    /// 从原始请求体构造
    pub fn from_body(body: &[u8]) -> Result<Self, ValidationError> {
        let value = parse_object(body)?;
        serde_json::from_value(value).map_err(|e| ValidationError::MalformedBody(e.to_string()))
    }

    /// 以字符串形式读取标量字段，null视为缺失
    pub fn scalar(value: Option<&Value>) -> Option<String> {
        match value? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}
