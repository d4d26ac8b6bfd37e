//! 选项值
//!
//! 所有来源（命令行、配置文件、环境变量）的原始字符串都先按 [`ValueKind`]
//! 转换为 JSON 表示，再由 [`ConfigValue`] 按调用方需要的类型反序列化。

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::fmt;

/// 选项的语义类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// 任意字符串
    String,
    /// 有符号整数
    Integer,
    /// 无符号整数
    Unsigned,
    /// 浮点数
    Float,
    /// 布尔值，需要显式给出取值
    Bool,
    /// 开关，出现即为 true，默认 false
    Switch,
    /// JSON 文本，用于自定义复合类型
    Json,
}

impl ValueKind {
    /// 帮助文本中展示的取值占位符
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            ValueKind::Switch => None,
            ValueKind::Json => Some("json"),
            _ => Some("arg"),
        }
    }

    /// 将一个原始字符串转换为该类型的 JSON 表示
    ///
    /// 失败时返回错误描述，由调用方补上选项名
    pub fn parse_raw(&self, raw: &str) -> Result<JsonValue, String> {
        match self {
            ValueKind::String => Ok(JsonValue::String(raw.to_string())),
            ValueKind::Integer => raw
                .trim()
                .parse::<i64>()
                .map(JsonValue::from)
                .map_err(|e| format!("failed to parse integer: {}", e)),
            ValueKind::Unsigned => raw
                .trim()
                .parse::<u64>()
                .map(JsonValue::from)
                .map_err(|e| format!("failed to parse unsigned integer: {}", e)),
            ValueKind::Float => {
                let f = raw
                    .trim()
                    .parse::<f64>()
                    .map_err(|e| format!("failed to parse float: {}", e))?;
                serde_json::Number::from_f64(f)
                    .map(JsonValue::Number)
                    .ok_or_else(|| format!("float '{}' is not representable", raw))
            }
            ValueKind::Bool | ValueKind::Switch => parse_bool(raw).map(JsonValue::Bool),
            ValueKind::Json => serde_json::from_str(raw)
                .map_err(|e| format!("failed to parse JSON: {}", e)),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::String => "string",
            ValueKind::Integer => "integer",
            ValueKind::Unsigned => "unsigned",
            ValueKind::Float => "float",
            ValueKind::Bool => "bool",
            ValueKind::Switch => "switch",
            ValueKind::Json => "json",
        };
        f.write_str(name)
    }
}

/// 布尔值解析，兼容配置文件中常见的写法
fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => Err(format!("failed to parse bool from '{}'", other)),
    }
}

/// 配置值包装，提供类型转换能力
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValue(pub JsonValue);

impl ConfigValue {
    pub fn new(value: JsonValue) -> Self {
        Self(value)
    }

    /// 转换为指定类型
    pub fn as_type<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.0)
    }

    pub fn as_value(&self) -> &JsonValue {
        &self.0
    }
}

impl From<JsonValue> for ConfigValue {
    fn from(value: JsonValue) -> Self {
        Self(value)
    }
}

/// 帮助文本中的值展示：字符串不加引号
impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            JsonValue::String(s) => f.write_str(s),
            JsonValue::Array(items) => {
                let parts: Vec<String> = items.iter().map(|v| ConfigValue(v.clone()).to_string()).collect();
                f.write_str(&parts.join(","))
            }
            other => write!(f, "{}", other),
        }
    }
}
