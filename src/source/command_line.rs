//! 命令行来源
//!
//! 由所有已注册的选项组构造 `clap::Command`，解析后把原始取值按声明的类型转换。

use clap::error::ErrorKind;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::collections::HashSet;
use std::ffi::OsString;

use super::merged_declarations;
use crate::error::{RegistryError, Result};
use crate::option::{OptionDecl, OptionGroup};
use crate::positional::PositionalSpec;
use crate::store::ParsedOptions;
use crate::value::ValueKind;

const POSITIONAL_ID: &str = "#positional";

/// 构造合并后的命令
///
/// 同名选项只保留第一次出现的声明
pub(crate) fn build_command<'a, I>(program: &str, groups: I, positional: &PositionalSpec) -> Command
where
    I: IntoIterator<Item = &'a OptionGroup>,
{
    let mut command = Command::new(program.to_string())
        .disable_help_flag(true)
        .disable_version_flag(true);

    let mut names = HashSet::new();
    let mut shorts = HashSet::new();
    for group in groups {
        command = command.next_help_heading(group.caption().to_string());
        for decl in group.declarations() {
            if !names.insert(decl.name().to_string()) {
                log::debug!("option {} already declared, skip group {}", decl.name(), group.caption());
                continue;
            }
            let short = decl.short_alias().filter(|c| shorts.insert(*c));
            command = command.arg(build_arg(decl, short));
        }
    }

    if !positional.is_empty() {
        command = command.arg(
            Arg::new(POSITIONAL_ID)
                .index(1)
                .num_args(1..)
                .action(ArgAction::Append)
                .value_parser(clap::value_parser!(String))
                .hide(true),
        );
    }
    command
}

fn build_arg(decl: &OptionDecl, short: Option<char>) -> Arg {
    let mut arg = Arg::new(decl.name().to_string())
        .long(decl.name().to_string())
        .help(decl.help_text().to_string());
    if let Some(c) = short {
        arg = arg.short(c);
    }

    match decl.kind() {
        ValueKind::Switch => arg.action(ArgAction::SetTrue),
        kind => {
            arg = arg
                .num_args(1)
                .value_parser(clap::value_parser!(String))
                .value_name(kind.placeholder().unwrap_or("arg"))
                .allow_negative_numbers(matches!(kind, ValueKind::Integer | ValueKind::Float));
            if decl.is_multiple() {
                arg.action(ArgAction::Append)
            } else {
                arg.action(ArgAction::Set)
            }
        }
    }
}

/// 解析命令行，返回显式给出的选项
///
/// `args` 的第一个元素是程序名
pub(crate) fn parse<'a, I, A, T>(
    program: &str,
    groups: I,
    positional: &PositionalSpec,
    args: A,
) -> Result<ParsedOptions>
where
    I: IntoIterator<Item = &'a OptionGroup> + Clone,
    A: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let declarations = merged_declarations(groups.clone());
    for (name, max_count) in positional.entries() {
        let decl = declarations
            .get(name.as_str())
            .ok_or_else(|| RegistryError::UnknownOption(name.clone()))?;
        // 单值选项只能占一个位置
        if !decl.is_multiple() && !matches!(max_count, Some(n) if *n <= 1) {
            return Err(RegistryError::PositionalCount {
                name: name.clone(),
                count: *max_count,
            });
        }
    }

    let mut command = build_command(program, groups, positional);
    let matches = command.try_get_matches_from_mut(args)?;

    let mut parsed = ParsedOptions::new();
    for decl in declarations.values() {
        if let Some(value) = matched_value(&matches, decl)? {
            parsed.push((decl.name().to_string(), value));
        }
    }

    if let Some(tokens) = matches.try_get_many::<String>(POSITIONAL_ID).ok().flatten() {
        let tokens: Vec<&str> = tokens.map(String::as_str).collect();
        for (name, raws) in distribute_positional(&mut command, positional, &tokens)? {
            // 命令行上已经用 --name 给出的选项优先
            if parsed.iter().any(|(n, _)| n == name) {
                continue;
            }
            if let Some(value) = declarations[name].collect_raw(raws)? {
                parsed.push((name.to_string(), value));
            }
        }
    }
    Ok(parsed)
}

fn matched_value(matches: &ArgMatches, decl: &OptionDecl) -> Result<Option<serde_json::Value>> {
    if matches.value_source(decl.name()) != Some(ValueSource::CommandLine) {
        return Ok(None);
    }
    if decl.kind() == ValueKind::Switch {
        return Ok(Some(serde_json::Value::Bool(true)));
    }
    match matches.get_many::<String>(decl.name()) {
        Some(raws) => decl.collect_raw(raws.map(String::as_str)),
        None => Ok(None),
    }
}

/// 把位置参数按描述分组到选项名
fn distribute_positional<'s, 't>(
    command: &mut Command,
    positional: &'s PositionalSpec,
    tokens: &[&'t str],
) -> Result<Vec<(&'s str, Vec<&'t str>)>> {
    let mut assigned: Vec<(&'s str, Vec<&'t str>)> = Vec::new();
    for (position, token) in tokens.iter().enumerate() {
        let name = positional.name_for_position(position).ok_or_else(|| {
            command.error(
                ErrorKind::TooManyValues,
                format!("unexpected positional argument '{}'", token),
            )
        })?;
        match assigned.last_mut() {
            Some((last, raws)) if *last == name => raws.push(*token),
            _ => assigned.push((name, vec![*token])),
        }
    }
    Ok(assigned)
}
