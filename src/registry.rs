//! 选项注册表
//!
//! 使用顺序：
//! 1. 各组件通过 [`Registry::register_configurable`] 或 [`Registry::register_group`] 注册选项组
//! 2. 调用 [`Registry::parse_command_line`] / [`Registry::parse_config_file`] /
//!    [`Registry::parse_environment`] 解析输入
//! 3. 各组件通过 [`Registry::load`] 或 [`Registry::load_into`] 取回自己的值
//!
//! 注册表不检查这个顺序：解析之后再注册的选项组，在下一次解析之前 `is_set` 都是 false。

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::path::Path;

use crate::config::{FileErrorPolicy, RegistryConfig};
use crate::configurable::{Configurable, Loadable, Lookup};
use crate::error::{RegistryError, Result};
use crate::option::OptionGroup;
use crate::positional::PositionalSpec;
use crate::source::{command_line, config_file, environment, merged_declarations};
use crate::store::{Origin, ParsedOptions, ParsedValueStore};

/// 为无法实现 [`Configurable`] 的类型登记的注册函数
pub type Registrar = fn(&mut Registry) -> bool;

// 聚合加载函数，按类型擦除后保存
type Loader = Box<dyn Fn(&mut dyn Any, &Registry) -> bool>;

/// 选项注册表
///
/// # 示例
/// ```
/// use optreg::{OptionDecl, OptionGroup, PositionalSpec, Registry, ValueKind};
///
/// let mut registry = Registry::new();
/// let group = OptionGroup::new("Printer options")
///     .add(OptionDecl::new("printer.text", ValueKind::String).default_value("UNINITIALIZED"))
///     .add(OptionDecl::new("printer.padding", ValueKind::Integer).default_value(0));
/// assert!(registry.register_group(group, "Printer"));
///
/// registry
///     .parse_command_line(["printer", "--printer.text", "Hi"], &PositionalSpec::new())
///     .unwrap();
///
/// let mut text = String::new();
/// let mut padding = 0i32;
/// assert!(registry.load(&mut text, "printer.text"));
/// assert!(registry.load(&mut padding, "printer.padding"));
/// assert_eq!(text, "Hi");
/// assert_eq!(padding, 0);
/// ```
pub struct Registry {
    config: RegistryConfig,
    groups: IndexMap<String, OptionGroup>,
    store: ParsedValueStore,
    registrars: HashMap<TypeId, Registrar>,
    loaders: HashMap<TypeId, Loader>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            groups: IndexMap::new(),
            store: ParsedValueStore::new(),
            registrars: HashMap::new(),
            loaders: HashMap::new(),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // ========== 注册 ==========

    /// 以 `name` 为键注册选项组
    ///
    /// 同名组已存在或组内有非法选项名时返回 false，注册表保持不变
    pub fn register_group(&mut self, group: OptionGroup, name: &str) -> bool {
        if self.groups.contains_key(name) {
            log::warn!("option group {} already registered", name);
            return false;
        }
        if let Err(e) = group.validate() {
            log::warn!("reject option group {}: {}", name, e);
            return false;
        }
        self.groups.insert(name.to_string(), group);
        true
    }

    /// 调用 `T` 自己的注册函数
    pub fn register_configurable<T: Configurable>(&mut self) -> bool {
        T::register_options(self)
    }

    /// 为类型 `T` 登记外部注册函数，重复登记时覆盖
    pub fn add_registrar<T: 'static>(&mut self, registrar: Registrar) {
        self.registrars.insert(TypeId::of::<T>(), registrar);
    }

    /// 调用为 `T` 登记的外部注册函数
    pub fn register_external<T: 'static>(&mut self) -> Result<bool> {
        let registrar = self
            .registrars
            .get(&TypeId::of::<T>())
            .copied()
            .ok_or(RegistryError::RegistrarMissing(type_name::<T>()))?;
        Ok(registrar(self))
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    pub fn group(&self, name: &str) -> Option<&OptionGroup> {
        self.groups.get(name)
    }

    /// 按注册顺序遍历所有选项组
    pub fn groups(&self) -> impl Iterator<Item = (&str, &OptionGroup)> {
        self.groups.iter().map(|(name, group)| (name.as_str(), group))
    }

    // ========== 解析 ==========

    /// 解析命令行，`args` 的第一个元素是程序名
    ///
    /// 出错时不保存任何值
    pub fn parse_command_line<A, T>(&mut self, args: A, positional: &PositionalSpec) -> Result<()>
    where
        A: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let parsed = command_line::parse(&self.config.program_name, self.groups.values(), positional, args)?;
        self.store_parsed(parsed, Origin::CommandLine);
        Ok(())
    }

    /// 解析配置文件
    ///
    /// 出错时按 [`FileErrorPolicy`] 决定是否保存出错之前解析成功的部分，然后返回错误
    pub fn parse_config_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        log::info!("loading config file {}", path.display());

        let outcome = {
            let declarations = merged_declarations(self.groups.values());
            config_file::parse(path, &declarations, self.config.allow_unregistered)
        };
        let origin = Origin::ConfigFile(path.to_path_buf());
        match outcome.error {
            None => {
                self.store_parsed(outcome.parsed, origin);
                Ok(())
            }
            Some(err) => {
                match self.config.file_error_policy {
                    FileErrorPolicy::ApplyPartial => self.store_parsed(outcome.parsed, origin),
                    FileErrorPolicy::RejectAll => self.store_parsed(ParsedOptions::new(), origin),
                }
                Err(err)
            }
        }
    }

    /// 从带前缀的环境变量解析，例如前缀 `APP` 下 `printer.text` 对应 `APP_PRINTER_TEXT`
    pub fn parse_environment(&mut self, prefix: &str) -> Result<()> {
        let parsed = {
            let declarations = merged_declarations(self.groups.values());
            environment::parse(prefix, &declarations)?
        };
        self.store_parsed(parsed, Origin::Environment);
        Ok(())
    }

    /// 合并解析结果，然后通知所有有值的选项
    fn store_parsed(&mut self, parsed: ParsedOptions, origin: Origin) {
        let declarations = self.groups.values().flat_map(OptionGroup::declarations);
        let written = self.store.store(parsed, origin.clone(), declarations);
        log::debug!("stored {} option(s) from {:?}", written, origin);

        for decl in self.groups.values().flat_map(OptionGroup::declarations) {
            if let (Some(notifier), Some(value)) = (decl.notifier(), self.store.get(decl.name())) {
                notifier.call(value);
            }
        }
    }

    // ========== 读取 ==========

    /// 加载单个选项到 `prop`
    ///
    /// 返回值只表示选项是否存在（显式设置或有默认值）。
    /// 类型转换失败时记录警告，`prop` 保持不变，仍返回 true。
    pub fn load<V: DeserializeOwned>(&self, prop: &mut V, name: &str) -> bool {
        match self.lookup::<V>(name) {
            Lookup::Found(value) => {
                *prop = value;
                true
            }
            Lookup::Invalid(err) => {
                log::warn!("could not load property {}: {}", name, err);
                true
            }
            Lookup::Missing => false,
        }
    }

    /// 查找单个选项，分别报告是否存在与是否转换成功
    pub fn lookup<V: DeserializeOwned>(&self, name: &str) -> Lookup<V> {
        let Some(value) = self.store.get(name) else {
            return Lookup::Missing;
        };
        match value.as_type::<V>() {
            Ok(value) => Lookup::Found(value),
            Err(source) => Lookup::Invalid(RegistryError::Conversion {
                name: name.to_string(),
                target: type_name::<V>(),
                source,
            }),
        }
    }

    /// 严格读取：缺失或转换失败都返回错误
    pub fn get<V: DeserializeOwned>(&self, name: &str) -> Result<V> {
        match self.lookup(name) {
            Lookup::Found(value) => Ok(value),
            Lookup::Invalid(err) => Err(err),
            Lookup::Missing => Err(RegistryError::NotSet(name.to_string())),
        }
    }

    /// 聚合加载，由 `T` 的 [`Loadable`] 实现决定读取哪些选项
    pub fn load_into<T: Loadable>(&self, target: &mut T) -> bool {
        target.load_from(self)
    }

    /// 为类型 `T` 登记聚合加载函数，重复登记时覆盖
    pub fn add_loader<T, F>(&mut self, loader: F)
    where
        T: 'static,
        F: Fn(&mut T, &Registry) -> bool + 'static,
    {
        let loader: Loader = Box::new(move |target, registry| match target.downcast_mut::<T>() {
            Some(target) => loader(target, registry),
            None => false,
        });
        self.loaders.insert(TypeId::of::<T>(), loader);
    }

    /// 使用登记的加载函数聚合加载；没有登记时返回错误
    pub fn load_with<T: 'static>(&self, target: &mut T) -> Result<bool> {
        let loader = self
            .loaders
            .get(&TypeId::of::<T>())
            .ok_or(RegistryError::LoaderMissing(type_name::<T>()))?;
        Ok(loader(target as &mut dyn Any, self))
    }

    /// 选项是否有值（显式设置或默认值）
    pub fn is_set(&self, name: &str) -> bool {
        self.store.contains(name)
    }

    /// 选项是否由输入显式给出
    pub fn is_supplied(&self, name: &str) -> bool {
        self.store.is_explicit(name)
    }

    pub fn store(&self) -> &ParsedValueStore {
        &self.store
    }

    /// 由当前所有选项组构造的命令，可用于渲染帮助信息
    pub fn command(&self, positional: &PositionalSpec) -> clap::Command {
        command_line::build_command(&self.config.program_name, self.groups.values(), positional)
    }
}

/// 按注册顺序输出所有选项组
impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for group in self.groups.values() {
            writeln!(f, "{}", group)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("groups", &self.groups.keys().collect::<Vec<_>>())
            .field("store", &self.store)
            .field("registrars", &self.registrars.len())
            .field("loaders", &self.loaders.len())
            .finish()
    }
}
