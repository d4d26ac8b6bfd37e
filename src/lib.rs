//! optreg - 组件化的选项注册表
//!
//! 互不知晓的组件各自声明带类型、默认值和说明的选项，汇总成一套命令行/配置文件语法，
//! 只解析一次输入，之后每个组件取回自己的类型化取值。
//!
//! ## 模块
//!
//! - **option**: 选项声明与选项组
//! - **value**: 选项值与原始字符串转换
//! - **store**: 解析结果存储与合并策略
//! - **source**: 命令行、配置文件、环境变量三种来源
//! - **registry**: 注册表，注册、解析与读取的入口
//! - **configurable**: 组件需要满足的约定
//!
//! ## 示例
//!
//! ```
//! use optreg::{Configurable, Loadable, OptionDecl, OptionGroup, PositionalSpec, Registry, ValueKind};
//!
//! #[derive(Default, Loadable)]
//! #[option(prefix = "printer")]
//! struct Printer {
//!     #[option]
//!     text: String,
//!     #[option]
//!     padding: usize,
//! }
//!
//! impl Configurable for Printer {
//!     fn register_options(registry: &mut Registry) -> bool {
//!         let group = OptionGroup::new("Printer options")
//!             .add(OptionDecl::new("printer.text", ValueKind::String).default_value("UNINITIALIZED"))
//!             .add(OptionDecl::new("printer.padding", ValueKind::Unsigned).default_value(0));
//!         registry.register_group(group, "Printer")
//!     }
//! }
//!
//! let mut registry = Registry::new();
//! registry.register_configurable::<Printer>();
//! registry
//!     .parse_command_line(["app", "--printer.text", "Hi", "--printer.padding", "3"], &PositionalSpec::new())
//!     .unwrap();
//!
//! let mut printer = Printer::default();
//! assert!(registry.load_into(&mut printer));
//! assert_eq!(printer.text, "Hi");
//! assert_eq!(printer.padding, 3);
//! ```

// 让派生宏生成的 `::optreg::` 路径在本 crate 内也可用
extern crate self as optreg;

pub mod config;
pub mod configurable;
pub mod error;
pub mod option;
pub mod positional;
pub mod registry;
pub mod store;
pub mod value;

mod source;

pub use config::{FileErrorPolicy, RegistryConfig};
pub use configurable::{Configurable, Loadable, Lookup};
pub use error::{RegistryError, Result};
pub use option::{OptionDecl, OptionGroup};
pub use positional::PositionalSpec;
pub use registry::{Registrar, Registry};
pub use source::environment::env_var_name;
pub use store::{Origin, ParsedValueStore, StoredValue};
pub use value::{ConfigValue, ValueKind};

// 派生宏与 trait 同名，分别位于宏和类型命名空间
pub use optreg_macros::Loadable;
