//! 环境变量来源
//!
//! 选项名映射为 `PREFIX_` 加大写名称，`.` 与 `-` 替换为 `_`，
//! 例如前缀 `APP` 下 `printer.text` 对应 `APP_PRINTER_TEXT`。
//! 多值选项用逗号分隔。

use std::env;

use super::Declarations;
use crate::error::{RegistryError, Result};
use crate::store::ParsedOptions;

pub fn env_var_name(prefix: &str, option: &str) -> String {
    let name: String = option
        .chars()
        .map(|c| match c {
            '.' | '-' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect();
    if prefix.is_empty() {
        name
    } else {
        format!("{}_{}", prefix.trim_end_matches('_'), name)
    }
}

pub(crate) fn parse(prefix: &str, declarations: &Declarations<'_>) -> Result<ParsedOptions> {
    let mut parsed = ParsedOptions::new();
    for decl in declarations.values() {
        let var = env_var_name(prefix, decl.name());
        let raw = match env::var(&var) {
            Ok(raw) => raw,
            Err(env::VarError::NotPresent) => continue,
            Err(env::VarError::NotUnicode(_)) => {
                return Err(RegistryError::InvalidValue {
                    name: decl.name().to_string(),
                    raw: var,
                    message: "environment variable is not valid unicode".to_string(),
                })
            }
        };
        let value = if decl.is_multiple() {
            decl.collect_raw(raw.split(',').map(str::trim))?
        } else {
            decl.collect_raw([raw.as_str()])?
        };
        if let Some(value) = value {
            parsed.push((decl.name().to_string(), value));
        }
    }
    Ok(parsed)
}
