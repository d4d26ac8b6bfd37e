//! 配置文件来源
//!
//! 根据扩展名选择格式：
//! - `toml` / `json`（支持 JSON5）/ `yaml` / `yml`：整体解析，嵌套表展开为点分名称
//! - 其他扩展名：逐行解析的 INI 格式，`[section]` 作为后续键的前缀
//!
//! 逐行格式遇到第一处错误即停止，之前解析成功的内容仍然返回。

use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::Declarations;
use crate::error::RegistryError;
use crate::option::OptionDecl;
use crate::store::ParsedOptions;

/// 一次文件解析的结果：已成功解析的部分，以及导致停止的错误
#[derive(Debug, Default)]
pub(crate) struct FileOutcome {
    pub parsed: ParsedOptions,
    pub error: Option<RegistryError>,
}

impl FileOutcome {
    fn failed(error: RegistryError) -> Self {
        Self {
            parsed: ParsedOptions::new(),
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Toml,
    Json,
    Yaml,
    Ini,
}

impl FileFormat {
    fn detect(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("toml") => FileFormat::Toml,
            Some("json") | Some("json5") => FileFormat::Json,
            Some("yaml") | Some("yml") => FileFormat::Yaml,
            _ => FileFormat::Ini,
        }
    }
}

pub(crate) fn parse(path: &Path, declarations: &Declarations<'_>, allow_unregistered: bool) -> FileOutcome {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(source) => {
            return FileOutcome::failed(RegistryError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let mut parser = Collector {
        path: path.to_path_buf(),
        declarations,
        allow_unregistered,
        seen: HashSet::new(),
        outcome: FileOutcome::default(),
    };
    match FileFormat::detect(path) {
        FileFormat::Ini => parser.parse_ini(&content),
        format => match parse_document(&content, format) {
            Ok(document) => parser.walk_document(String::new(), document),
            Err(message) => {
                return FileOutcome::failed(RegistryError::ConfigFormat {
                    path: path.to_path_buf(),
                    message,
                })
            }
        },
    }
    parser.outcome
}

fn parse_document(content: &str, format: FileFormat) -> Result<JsonValue, String> {
    match format {
        FileFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        FileFormat::Json => json5::from_str(content).map_err(|e| e.to_string()),
        FileFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        FileFormat::Ini => Err("not a document format".to_string()),
    }
}

struct Collector<'d, 'a> {
    path: PathBuf,
    declarations: &'d Declarations<'a>,
    allow_unregistered: bool,
    seen: HashSet<String>,
    outcome: FileOutcome,
}

impl<'d, 'a> Collector<'d, 'a> {
    fn parse_ini(&mut self, content: &str) {
        let mut section = String::new();
        for (index, raw_line) in content.lines().enumerate() {
            let line_no = index + 1;
            let line = strip_comment(raw_line).trim();
            if line.is_empty() {
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                match rest.strip_suffix(']').map(str::trim) {
                    Some(name) if !name.is_empty() => {
                        section = format!("{}.", name);
                        continue;
                    }
                    _ => {
                        self.fail_at(line_no, format!("invalid section header '{}'", line));
                        return;
                    }
                }
            }

            let Some((key, value)) = line.split_once('=') else {
                self.fail_at(line_no, format!("expected 'name = value', found '{}'", line));
                return;
            };
            let key = key.trim();
            if key.is_empty() {
                self.fail_at(line_no, "missing option name".to_string());
                return;
            }

            let name = format!("{}{}", section, key);
            if let Err(message) = self.accept_raw(&name, value.trim()) {
                self.fail_at(line_no, message);
                return;
            }
        }
    }

    /// 处理逐行格式中的一个键值
    fn accept_raw(&mut self, name: &str, raw: &str) -> Result<(), String> {
        let Some(decl) = self.declaration(name)? else {
            return Ok(());
        };
        let value = decl.parse_raw(raw).map_err(|e| e.to_string())?;
        self.push(decl, value)
    }

    fn walk_document(&mut self, prefix: String, value: JsonValue) {
        if self.outcome.error.is_some() {
            return;
        }
        if !prefix.is_empty() && self.declarations.contains_key(prefix.as_str()) {
            if let Err(message) = self.accept_node(&prefix, value) {
                self.fail(message);
            }
            return;
        }
        match value {
            JsonValue::Object(map) => {
                for (key, child) in map {
                    let name = if prefix.is_empty() {
                        key
                    } else {
                        format!("{}.{}", prefix, key)
                    };
                    self.walk_document(name, child);
                }
            }
            _ if prefix.is_empty() => self.fail("top level must be a table".to_string()),
            _ => {
                if let Err(message) = self.declaration(&prefix).map(|_| ()) {
                    self.fail(message);
                }
            }
        }
    }

    /// 处理整体格式中的一个已声明节点
    fn accept_node(&mut self, name: &str, value: JsonValue) -> Result<(), String> {
        let Some(decl) = self.declaration(name)? else {
            return Ok(());
        };
        let value = if decl.is_multiple() {
            let items = match value {
                JsonValue::Array(items) => items,
                single => vec![single],
            };
            let mut converted = Vec::with_capacity(items.len());
            for item in items {
                converted.push(coerce(decl, item)?);
            }
            JsonValue::Array(converted)
        } else {
            coerce(decl, value)?
        };
        if self.seen.insert(name.to_string()) {
            self.outcome.parsed.push((name.to_string(), value));
        }
        Ok(())
    }

    /// 查找声明；未注册的选项按配置忽略或报错
    fn declaration(&self, name: &str) -> Result<Option<&'a OptionDecl>, String> {
        match self.declarations.get(name) {
            Some(decl) => Ok(Some(*decl)),
            None if self.allow_unregistered => {
                log::warn!("ignore unregistered option {} in {}", name, self.path.display());
                Ok(None)
            }
            None => Err(format!("unrecognised option '{}'", name)),
        }
    }

    fn push(&mut self, decl: &OptionDecl, value: JsonValue) -> Result<(), String> {
        let name = decl.name();
        if !self.seen.insert(name.to_string()) {
            if !decl.is_multiple() {
                return Err(format!("option '{}' cannot be specified more than once", name));
            }
            if let Some((_, JsonValue::Array(items))) =
                self.outcome.parsed.iter_mut().find(|(n, _)| n == name)
            {
                items.push(value);
            }
            return Ok(());
        }
        let value = if decl.is_multiple() {
            JsonValue::Array(vec![value])
        } else {
            value
        };
        self.outcome.parsed.push((name.to_string(), value));
        Ok(())
    }

    fn fail_at(&mut self, line: usize, message: String) {
        self.outcome.error = Some(RegistryError::ConfigSyntax {
            path: self.path.clone(),
            line,
            message,
        });
    }

    fn fail(&mut self, message: String) {
        self.outcome.error = Some(RegistryError::ConfigFormat {
            path: self.path.clone(),
            message,
        });
    }
}

/// 将文档中的值转换为声明的类型
fn coerce(decl: &OptionDecl, value: JsonValue) -> Result<JsonValue, String> {
    use crate::value::ValueKind;

    match (decl.kind(), value) {
        (ValueKind::Json, value) => Ok(value),
        (_, JsonValue::String(raw)) => decl.parse_raw(&raw).map_err(|e| e.to_string()),
        (_, value @ (JsonValue::Number(_) | JsonValue::Bool(_))) => {
            decl.parse_raw(&value.to_string()).map_err(|e| e.to_string())
        }
        (kind, other) => Err(format!(
            "option '{}' expects {}, found '{}'",
            decl.name(),
            kind,
            other
        )),
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::OptionGroup;
    use crate::source::merged_declarations;
    use crate::value::ValueKind;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn groups() -> Vec<OptionGroup> {
        vec![OptionGroup::new("Printer options")
            .add(OptionDecl::new("printer.text", ValueKind::String).default_value("UNINITIALIZED"))
            .add(OptionDecl::new("printer.padding", ValueKind::Integer).default_value(0))
            .add(OptionDecl::new("printer.tags", ValueKind::String).multiple())
            .add(OptionDecl::new("printer.style", ValueKind::Json))]
    }

    fn parse_file(name: &str, content: &str, allow_unregistered: bool) -> FileOutcome {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(name);
        fs::write(&path, content).unwrap();
        let groups = groups();
        let declarations = merged_declarations(&groups);
        parse(&path, &declarations, allow_unregistered)
    }

    #[test]
    fn test_ini_sections_and_comments() {
        let outcome = parse_file(
            "app.cfg",
            "# printer settings\n\
             [printer]\n\
             text = hello world # trailing comment\n\
             padding=3\n\
             tags = a\n\
             tags = b\n\
             style = {\"bold\": true}\n",
            true,
        );
        assert!(outcome.error.is_none());
        assert_eq!(
            outcome.parsed,
            vec![
                ("printer.text".to_string(), json!("hello world")),
                ("printer.padding".to_string(), json!(3)),
                ("printer.tags".to_string(), json!(["a", "b"])),
                ("printer.style".to_string(), json!({"bold": true})),
            ]
        );
    }

    #[test]
    fn test_ini_partial_on_syntax_error() {
        let outcome = parse_file(
            "app.cfg",
            "printer.text = first\nprinter.padding = 2\nthis line is broken\nprinter.tags = late\n",
            true,
        );
        assert_eq!(outcome.parsed.len(), 2);
        assert!(matches!(
            outcome.error,
            Some(RegistryError::ConfigSyntax { line: 3, .. })
        ));
    }

    #[test]
    fn test_ini_unregistered_options() {
        let ignored = parse_file("app.ini", "other.key = 1\nprinter.padding = 4\n", true);
        assert!(ignored.error.is_none());
        assert_eq!(ignored.parsed, vec![("printer.padding".to_string(), json!(4))]);

        let rejected = parse_file("app.ini", "printer.padding = 4\nother.key = 1\n", false);
        assert_eq!(rejected.parsed.len(), 1);
        assert!(matches!(
            rejected.error,
            Some(RegistryError::ConfigSyntax { line: 2, .. })
        ));
    }

    #[test]
    fn test_ini_repeated_single_value() {
        let outcome = parse_file("app.cfg", "printer.padding = 1\nprinter.padding = 2\n", true);
        assert_eq!(outcome.parsed, vec![("printer.padding".to_string(), json!(1))]);
        assert!(outcome.error.is_some());
    }

    #[test]
    fn test_toml_document() {
        let outcome = parse_file(
            "app.toml",
            r#"
[printer]
text = "from toml"
padding = "7"
tags = ["x", "y"]
style = { bold = true, width = 10 }
"#,
            true,
        );
        assert!(outcome.error.is_none());
        let parsed: std::collections::HashMap<_, _> = outcome.parsed.into_iter().collect();
        assert_eq!(parsed["printer.text"], json!("from toml"));
        assert_eq!(parsed["printer.padding"], json!(7));
        assert_eq!(parsed["printer.tags"], json!(["x", "y"]));
        assert_eq!(parsed["printer.style"], json!({"bold": true, "width": 10}));
    }

    #[test]
    fn test_yaml_and_json_documents() {
        let yaml = parse_file("app.yaml", "printer:\n  padding: 2\n", true);
        assert_eq!(yaml.parsed, vec![("printer.padding".to_string(), json!(2))]);

        let json = parse_file("app.json", "{ printer: { text: 'json5', }, }", true);
        assert_eq!(json.parsed, vec![("printer.text".to_string(), json!("json5"))]);
    }

    #[test]
    fn test_document_syntax_error_parses_nothing() {
        let outcome = parse_file("app.toml", "[printer]\ntext = \"ok\"\npadding = \n", true);
        assert!(outcome.parsed.is_empty());
        assert!(matches!(outcome.error, Some(RegistryError::ConfigFormat { .. })));
    }

    #[test]
    fn test_document_type_mismatch() {
        let outcome = parse_file("app.toml", "[printer]\npadding = [1, 2]\n", true);
        assert!(matches!(outcome.error, Some(RegistryError::ConfigFormat { .. })));
    }

    #[test]
    fn test_missing_file() {
        let groups = groups();
        let declarations = merged_declarations(&groups);
        let outcome = parse(Path::new("/nonexistent/app.cfg"), &declarations, true);
        assert!(matches!(outcome.error, Some(RegistryError::Io { .. })));
    }
}
