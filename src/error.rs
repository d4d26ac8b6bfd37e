use std::path::PathBuf;
use thiserror::Error;

/// 注册表统一错误类型
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("无效的选项名: '{0}'")]
    InvalidName(String),

    #[error("选项 {name} 的短别名无效: '{short}'")]
    InvalidShort { name: String, short: char },

    #[error("单值选项 {name} 不能占用多个位置参数")]
    PositionalCount { name: String, count: Option<usize> },

    #[error("命令行解析失败: {0}")]
    CommandLine(#[from] clap::Error),

    #[error("配置文件语法错误 [{}:{line}]: {message}", path.display())]
    ConfigSyntax {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("配置文件解析失败 [{}]: {message}", path.display())]
    ConfigFormat { path: PathBuf, message: String },

    #[error("未注册的选项: {0}")]
    UnknownOption(String),

    #[error("选项 {name} 的值无效 '{raw}': {message}")]
    InvalidValue {
        name: String,
        raw: String,
        message: String,
    },

    #[error("选项 {name} 无法转换为 {target}: {source}")]
    Conversion {
        name: String,
        target: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("选项未设置: {0}")]
    NotSet(String),

    #[error("类型 {0} 没有注册 registrar")]
    RegistrarMissing(&'static str),

    #[error("类型 {0} 没有注册 loader")]
    LoaderMissing(&'static str),

    #[error("IO 错误 [{}]: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, RegistryError>;
