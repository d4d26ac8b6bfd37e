//! 选项声明与选项组

use serde_json::Value as JsonValue;
use std::fmt;
use std::rc::Rc;

use crate::error::{RegistryError, Result};
use crate::value::{ConfigValue, ValueKind};

/// 选项取值存入后的回调
#[derive(Clone)]
pub struct Notifier(Rc<dyn Fn(&ConfigValue)>);

impl Notifier {
    pub fn call(&self, value: &ConfigValue) {
        (self.0)(value)
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Notifier")
    }
}

impl PartialEq for Notifier {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// 单个选项声明
///
/// # 示例
/// ```
/// use optreg::{OptionDecl, ValueKind};
///
/// let decl = OptionDecl::new("printer.padding", ValueKind::Integer)
///     .default_value(0)
///     .help("padding to add before printing");
/// assert_eq!(decl.name(), "printer.padding");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OptionDecl {
    name: String,
    kind: ValueKind,
    default: Option<ConfigValue>,
    help: String,
    multiple: bool,
    short: Option<char>,
    notifier: Option<Notifier>,
}

impl OptionDecl {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        let default = match kind {
            ValueKind::Switch => Some(ConfigValue::new(JsonValue::Bool(false))),
            _ => None,
        };
        Self {
            name: name.into(),
            kind,
            default,
            help: String::new(),
            multiple: false,
            short: None,
            notifier: None,
        }
    }

    /// 设置默认值
    pub fn default_value(mut self, value: impl Into<JsonValue>) -> Self {
        self.default = Some(ConfigValue::new(value.into()));
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// 允许多次出现，值以数组形式保存
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// 命令行单字母别名
    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// 每次解析结束、该选项有值时调用
    pub fn notify(mut self, notifier: impl Fn(&ConfigValue) + 'static) -> Self {
        self.notifier = Some(Notifier(Rc::new(notifier)));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn default(&self) -> Option<&ConfigValue> {
        self.default.as_ref()
    }

    pub fn help_text(&self) -> &str {
        &self.help
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    pub fn short_alias(&self) -> Option<char> {
        self.short
    }

    pub fn notifier(&self) -> Option<&Notifier> {
        self.notifier.as_ref()
    }

    /// 转换一个原始取值
    pub fn parse_raw(&self, raw: &str) -> Result<JsonValue> {
        self.kind
            .parse_raw(raw)
            .map_err(|message| RegistryError::InvalidValue {
                name: self.name.clone(),
                raw: raw.to_string(),
                message,
            })
    }

    /// 将同一次解析中出现的所有原始取值合成最终值
    pub(crate) fn collect_raw<'a, I>(&self, raws: I) -> Result<Option<JsonValue>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut values = Vec::new();
        for raw in raws {
            values.push(self.parse_raw(raw)?);
        }
        if self.multiple {
            if values.is_empty() {
                return Ok(None);
            }
            return Ok(Some(JsonValue::Array(values)));
        }
        // 单值选项以最后一次出现为准
        Ok(values.pop())
    }

    /// 名称和别名必须能出现在命令行上
    fn validate(&self) -> Result<()> {
        let name = &self.name;
        if name.is_empty()
            || name.starts_with('-')
            || name.starts_with('#')
            || name.contains('=')
            || name.chars().any(char::is_whitespace)
        {
            return Err(RegistryError::InvalidName(name.clone()));
        }
        if let Some(short) = self.short.filter(|c| !c.is_ascii_alphanumeric()) {
            return Err(RegistryError::InvalidShort {
                name: name.clone(),
                short,
            });
        }
        Ok(())
    }

    /// 帮助文本左栏，例如 `-p [ --printer.padding ] arg (=0)`
    fn usage(&self) -> String {
        let mut usage = match self.short {
            Some(c) => format!("-{} [ --{} ]", c, self.name),
            None => format!("--{}", self.name),
        };
        if let Some(placeholder) = self.kind.placeholder() {
            usage.push(' ');
            usage.push_str(placeholder);
            if let Some(default) = &self.default {
                usage.push_str(&format!(" (={})", default));
            }
        }
        usage
    }
}

/// 一组具名的选项声明，由一个组件提供
#[derive(Debug, Clone, PartialEq)]
pub struct OptionGroup {
    caption: String,
    declarations: Vec<OptionDecl>,
}

impl OptionGroup {
    pub fn new(caption: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
            declarations: Vec::new(),
        }
    }

    pub fn add(mut self, decl: OptionDecl) -> Self {
        self.declarations.push(decl);
        self
    }

    /// `add` 的简写，适合没有默认值的选项
    pub fn option(self, name: &str, kind: ValueKind, help: &str) -> Self {
        self.add(OptionDecl::new(name, kind).help(help))
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn declarations(&self) -> &[OptionDecl] {
        &self.declarations
    }

    pub fn find(&self, name: &str) -> Option<&OptionDecl> {
        self.declarations.iter().find(|d| d.name == name)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        self.declarations.iter().try_for_each(OptionDecl::validate)
    }
}

impl fmt::Display for OptionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.caption.is_empty() {
            writeln!(f, "{}:", self.caption)?;
        }
        let usages: Vec<String> = self.declarations.iter().map(OptionDecl::usage).collect();
        let width = usages.iter().map(String::len).max().unwrap_or(0);
        for (decl, usage) in self.declarations.iter().zip(&usages) {
            if decl.help.is_empty() {
                writeln!(f, "  {}", usage)?;
            } else {
                writeln!(f, "  {:<width$}   {}", usage, decl.help, width = width)?;
            }
        }
        Ok(())
    }
}
