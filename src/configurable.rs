//! 组件与注册表之间的约定
//!
//! - [`Configurable`]：组件向注册表提供自己的选项组
//! - [`Loadable`]：组件从注册表一次性加载自己的多个字段
//!
//! 不能实现这两个 trait 的类型，可以通过 [`Registry::add_registrar`] 和
//! [`Registry::add_loader`] 在启动时登记函数。
//!
//! [`Registry::add_registrar`]: crate::Registry::add_registrar
//! [`Registry::add_loader`]: crate::Registry::add_loader

use crate::error::RegistryError;
use crate::registry::Registry;

/// 可配置组件
///
/// 实现方负责构造选项声明、组成选项组并调用 [`Registry::register_group`]。
///
/// # 示例
/// ```
/// use optreg::{Configurable, OptionDecl, OptionGroup, Registry, ValueKind};
///
/// struct Server;
///
/// impl Configurable for Server {
///     fn register_options(registry: &mut Registry) -> bool {
///         let group = OptionGroup::new("Server options")
///             .add(OptionDecl::new("server.port", ValueKind::Unsigned).default_value(8080));
///         registry.register_group(group, "Server")
///     }
/// }
///
/// let mut registry = Registry::new();
/// assert!(registry.register_configurable::<Server>());
/// assert!(registry.is_registered("Server"));
/// ```
pub trait Configurable {
    fn register_options(registry: &mut Registry) -> bool;
}

/// 聚合加载
///
/// 返回值的含义由实现方决定；`#[derive(Loadable)]` 生成的实现尝试加载所有字段后总是返回 true。
pub trait Loadable {
    fn load_from(&mut self, registry: &Registry) -> bool;
}

/// 单个选项的查找结果
///
/// 区分“是否存在”和“是否转换成功”：
/// - `Missing`：存储中没有该选项
/// - `Found`：存在且转换成功
/// - `Invalid`：存在但无法转换为目标类型
#[derive(Debug)]
pub enum Lookup<V> {
    Missing,
    Found(V),
    Invalid(RegistryError),
}

impl<V> Lookup<V> {
    pub fn is_present(&self) -> bool {
        !matches!(self, Lookup::Missing)
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn into_option(self) -> Option<V> {
        match self {
            Lookup::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&RegistryError> {
        match self {
            Lookup::Invalid(err) => Some(err),
            _ => None,
        }
    }
}
