//! 选项来源
//!
//! 命令行、配置文件、环境变量三种来源都把原始输入转换为 [`ParsedOptions`]，
//! 再由注册表统一合并到存储中。
//!
//! [`ParsedOptions`]: crate::store::ParsedOptions

pub(crate) mod command_line;
pub(crate) mod config_file;
pub(crate) mod environment;

use indexmap::IndexMap;

use crate::option::{OptionDecl, OptionGroup};

/// 合并后的声明集合，按注册顺序排列
pub(crate) type Declarations<'a> = IndexMap<&'a str, &'a OptionDecl>;

/// 按注册顺序合并所有声明，同名时保留第一个
pub(crate) fn merged_declarations<'a, I>(groups: I) -> Declarations<'a>
where
    I: IntoIterator<Item = &'a OptionGroup>,
{
    let mut declarations = Declarations::new();
    for group in groups {
        for decl in group.declarations() {
            declarations.entry(decl.name()).or_insert(decl);
        }
    }
    declarations
}
