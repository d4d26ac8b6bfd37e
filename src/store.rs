//! 解析结果存储
//!
//! 合并策略：
//! - 已经显式设置的值不会被之后的解析覆盖，先到先得；
//! - 默认值会被之后的显式值替换；
//! - 每次解析结束后，仍没有值且声明了默认值的选项补上默认值。

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::path::PathBuf;

use crate::option::OptionDecl;
use crate::value::ConfigValue;

/// 值的来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Default,
    CommandLine,
    ConfigFile(PathBuf),
    Environment,
}

impl Origin {
    pub fn is_explicit(&self) -> bool {
        !matches!(self, Origin::Default)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredValue {
    pub value: ConfigValue,
    pub origin: Origin,
}

/// 一次解析得到的显式取值，按出现顺序排列
pub type ParsedOptions = Vec<(String, JsonValue)>;

/// 选项名到取值的映射
#[derive(Debug, Clone, Default)]
pub struct ParsedValueStore {
    entries: IndexMap<String, StoredValue>,
}

impl ParsedValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 合并一次解析的结果，返回实际写入的显式值个数
    pub fn store<'a, I>(&mut self, parsed: ParsedOptions, origin: Origin, declarations: I) -> usize
    where
        I: IntoIterator<Item = &'a OptionDecl>,
    {
        let mut written = 0;
        for (name, value) in parsed {
            match self.entries.get(&name) {
                Some(existing) if existing.origin.is_explicit() => {
                    log::debug!("keep {} from {:?}, ignore value from {:?}", name, existing.origin, origin);
                }
                _ => {
                    self.entries.insert(
                        name,
                        StoredValue {
                            value: ConfigValue::new(value),
                            origin: origin.clone(),
                        },
                    );
                    written += 1;
                }
            }
        }
        self.apply_defaults(declarations);
        written
    }

    fn apply_defaults<'a, I>(&mut self, declarations: I)
    where
        I: IntoIterator<Item = &'a OptionDecl>,
    {
        for decl in declarations {
            if self.entries.contains_key(decl.name()) {
                continue;
            }
            if let Some(default) = decl.default() {
                self.entries.insert(
                    decl.name().to_string(),
                    StoredValue {
                        value: default.clone(),
                        origin: Origin::Default,
                    },
                );
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ConfigValue> {
        self.entries.get(name).map(|entry| &entry.value)
    }

    pub fn origin(&self, name: &str) -> Option<&Origin> {
        self.entries.get(name).map(|entry| &entry.origin)
    }

    /// 是否由输入显式给出（而不是默认值）
    pub fn is_explicit(&self, name: &str) -> bool {
        self.origin(name).is_some_and(Origin::is_explicit)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;
    use serde_json::json;

    fn decls() -> Vec<OptionDecl> {
        vec![
            OptionDecl::new("a", ValueKind::String).default_value("X"),
            OptionDecl::new("b", ValueKind::Integer).default_value(0),
            OptionDecl::new("c", ValueKind::String),
        ]
    }

    #[test]
    fn test_defaults_fill_missing() {
        let decls = decls();
        let mut store = ParsedValueStore::new();
        store.store(vec![], Origin::CommandLine, &decls);

        assert_eq!(store.get("a").unwrap().as_value(), &json!("X"));
        assert_eq!(store.origin("b"), Some(&Origin::Default));
        assert!(!store.contains("c"));
        assert!(!store.is_explicit("a"));
    }

    #[test]
    fn test_explicit_replaces_default() {
        let decls = decls();
        let mut store = ParsedValueStore::new();
        store.store(vec![], Origin::CommandLine, &decls);
        let written = store.store(
            vec![("b".to_string(), json!(5))],
            Origin::ConfigFile("app.cfg".into()),
            &decls,
        );

        assert_eq!(written, 1);
        assert_eq!(store.get("b").unwrap().as_value(), &json!(5));
        assert!(store.is_explicit("b"));
    }

    #[test]
    fn test_first_explicit_wins() {
        let decls = decls();
        let mut store = ParsedValueStore::new();
        store.store(vec![("a".to_string(), json!("cli"))], Origin::CommandLine, &decls);
        let written = store.store(
            vec![("a".to_string(), json!("file")), ("c".to_string(), json!("new"))],
            Origin::ConfigFile("app.cfg".into()),
            &decls,
        );

        assert_eq!(written, 1);
        assert_eq!(store.get("a").unwrap().as_value(), &json!("cli"));
        assert_eq!(store.origin("a"), Some(&Origin::CommandLine));
        assert_eq!(store.get("c").unwrap().as_value(), &json!("new"));
        assert_eq!(store.len(), 3);
        assert_eq!(store.names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }
}
