// 注册表自身的配置

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// 配置文件出错时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileErrorPolicy {
    /// 先保存出错位置之前解析成功的部分，再返回错误
    #[default]
    ApplyPartial,
    /// 文件有任何错误都不保存其中的值
    RejectAll,
}

/// 注册表配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// 命令行错误信息与帮助中的程序名
    pub program_name: String,
    /// 配置文件中出现未注册的选项时是否忽略
    pub allow_unregistered: bool,
    pub file_error_policy: FileErrorPolicy,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            program_name: env!("CARGO_PKG_NAME").to_string(),
            allow_unregistered: true,
            file_error_policy: FileErrorPolicy::default(),
        }
    }
}

impl RegistryConfig {
    /// 从 JSON 字符串创建（支持 JSON5 格式）
    pub fn from_json(json_str: &str) -> Result<Self> {
        Ok(json5::from_str(json_str)?)
    }

    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml_str)?)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
