//! 注册表端到端测试：多个互不知晓的组件共享一个注册表

use anyhow::Result;
use optreg::*;
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

// ============================================================================
// 组件定义
// ============================================================================

/// 通过 Configurable 注册的组件
#[derive(Debug, Clone, PartialEq, Loadable)]
#[option(prefix = "printer")]
struct Printer {
    #[option]
    text: String,
    #[option]
    padding: i32,
}

impl Default for Printer {
    fn default() -> Self {
        Self {
            text: "UNINITIALIZED".to_string(),
            padding: 0,
        }
    }
}

impl Configurable for Printer {
    fn register_options(registry: &mut Registry) -> bool {
        let group = OptionGroup::new("Printer options")
            .add(
                OptionDecl::new("printer.text", ValueKind::String)
                    .default_value("UNINITIALIZED")
                    .help("text to print"),
            )
            .add(
                OptionDecl::new("printer.padding", ValueKind::Integer)
                    .default_value(0)
                    .help("padding to add before printing"),
            );
        registry.register_group(group, "Printer")
    }
}

/// 模拟第三方类型：不实现任何 trait，只通过登记表接入
struct Cache {
    capacity: u64,
    hosts: Vec<String>,
}

fn register_cache(registry: &mut Registry) -> bool {
    let group = OptionGroup::new("Cache options")
        .add(OptionDecl::new("cache.capacity", ValueKind::Unsigned).default_value(128))
        .add(OptionDecl::new("cache.hosts", ValueKind::String).multiple());
    registry.register_group(group, "Cache")
}

fn load_cache(cache: &mut Cache, registry: &Registry) -> bool {
    // 严格策略：所有字段都存在才算成功
    let capacity = registry.load(&mut cache.capacity, "cache.capacity");
    let hosts = registry.load(&mut cache.hosts, "cache.hosts");
    capacity && hosts
}

fn registry() -> Registry {
    let mut registry = Registry::new();
    assert!(registry.register_configurable::<Printer>());
    registry.add_registrar::<Cache>(register_cache);
    registry.add_loader::<Cache, _>(load_cache);
    assert!(registry.register_external::<Cache>().unwrap());
    registry
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

// ============================================================================
// 测试用例
// ============================================================================

#[test]
fn test_aggregate_load_defaults() -> Result<()> {
    let mut registry = registry();
    registry.parse_command_line(["app"], &PositionalSpec::new())?;

    let mut printer = Printer {
        text: String::new(),
        padding: -1,
    };
    assert!(registry.load_into(&mut printer));
    assert_eq!(printer, Printer::default());
    Ok(())
}

#[test]
fn test_aggregate_load_from_command_line() -> Result<()> {
    let mut registry = registry();
    registry.parse_command_line(
        ["app", "--printer.text", "Hi", "--printer.padding", "3"],
        &PositionalSpec::new(),
    )?;

    let mut printer = Printer::default();
    assert!(registry.load_into(&mut printer));
    assert_eq!(printer.text, "Hi");
    assert_eq!(printer.padding, 3);
    Ok(())
}

#[test]
fn test_registering_twice_keeps_first_group() {
    let mut registry = registry();
    let before = registry.group("Printer").cloned();

    assert!(!registry.register_configurable::<Printer>());
    assert!(!registry.register_external::<Cache>().unwrap());
    assert_eq!(registry.group("Printer").cloned(), before);
    assert_eq!(
        registry.groups().map(|(name, _)| name).collect::<Vec<_>>(),
        vec!["Printer", "Cache"]
    );
}

#[test]
fn test_loader_table_policy() -> Result<()> {
    let mut registry = registry();
    registry.parse_command_line(["app"], &PositionalSpec::new())?;

    let mut cache = Cache {
        capacity: 0,
        hosts: Vec::new(),
    };
    // cache.hosts 没有默认值也未给出
    assert!(!registry.load_with(&mut cache)?);
    assert_eq!(cache.capacity, 128);

    let mut registry = self::registry();
    registry.parse_command_line(
        ["app", "--cache.hosts", "a:1", "--cache.hosts", "b:2"],
        &PositionalSpec::new(),
    )?;
    assert!(registry.load_with(&mut cache)?);
    assert_eq!(cache.hosts, vec!["a:1", "b:2"]);
    Ok(())
}

#[test]
fn test_command_line_then_config_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = write_file(
        &temp_dir,
        "app.cfg",
        "[printer]\ntext = from file\npadding = 5\n\n[cache]\nhosts = x\nhosts = y\n",
    );

    let mut registry = registry();
    registry.parse_command_line(["app", "--printer.text", "from cli"], &PositionalSpec::new())?;
    registry.parse_config_file(&path)?;

    let mut printer = Printer::default();
    registry.load_into(&mut printer);
    assert_eq!(printer.text, "from cli");
    assert_eq!(printer.padding, 5);
    assert_eq!(registry.get::<Vec<String>>("cache.hosts")?, vec!["x", "y"]);
    assert_eq!(registry.store().origin("printer.text"), Some(&Origin::CommandLine));
    Ok(())
}

#[test]
fn test_config_file_syntax_error_after_valid_lines() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = write_file(
        &temp_dir,
        "broken.cfg",
        "printer.text = kept\nprinter.padding = 2\ncache.capacity = 64\nnot an assignment\ncache.hosts = lost\n",
    );

    let mut registry = registry();
    let result = registry.parse_config_file(&path);

    assert!(matches!(result, Err(RegistryError::ConfigSyntax { line: 4, .. })));
    assert!(registry.is_supplied("printer.text"));
    assert!(registry.is_supplied("printer.padding"));
    assert!(registry.is_supplied("cache.capacity"));
    assert!(!registry.is_set("cache.hosts"));
    assert_eq!(registry.get::<String>("printer.text")?, "kept");
    Ok(())
}

#[test]
fn test_toml_config_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = write_file(
        &temp_dir,
        "app.toml",
        "[printer]\ntext = \"toml\"\npadding = 1\n\n[cache]\ncapacity = 9\nhosts = [\"h1\"]\n",
    );

    let mut registry = registry();
    registry.parse_config_file(&path)?;

    let mut printer = Printer::default();
    registry.load_into(&mut printer);
    assert_eq!(printer, Printer { text: "toml".to_string(), padding: 1 });
    assert_eq!(registry.get::<u64>("cache.capacity")?, 9);
    Ok(())
}

#[test]
#[serial]
fn test_environment_between_command_line_and_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = write_file(&temp_dir, "app.cfg", "printer.text = file\nprinter.padding = 7\ncache.capacity = 1\n");

    std::env::set_var("OPTREG_IT_PRINTER_PADDING", "4");
    std::env::set_var("OPTREG_IT_CACHE_CAPACITY", "2");

    let mut registry = registry();
    let result = registry
        .parse_command_line(["app", "--cache.capacity", "3"], &PositionalSpec::new())
        .and_then(|_| registry.parse_environment("OPTREG_IT"))
        .and_then(|_| registry.parse_config_file(&path));

    std::env::remove_var("OPTREG_IT_PRINTER_PADDING");
    std::env::remove_var("OPTREG_IT_CACHE_CAPACITY");
    result?;

    assert_eq!(registry.get::<u64>("cache.capacity")?, 3);
    assert_eq!(registry.get::<i32>("printer.padding")?, 4);
    assert_eq!(registry.get::<String>("printer.text")?, "file");
    assert_eq!(registry.store().origin("printer.padding"), Some(&Origin::Environment));
    Ok(())
}

#[test]
fn test_positional_arguments_fill_options() -> Result<()> {
    let mut registry = registry();
    let positional = PositionalSpec::new().add("printer.text", Some(1)).add("cache.hosts", None);
    registry.parse_command_line(["app", "hello", "h1", "h2"], &positional)?;

    assert_eq!(registry.get::<String>("printer.text")?, "hello");
    assert_eq!(registry.get::<Vec<String>>("cache.hosts")?, vec!["h1", "h2"]);
    Ok(())
}

#[test]
fn test_overlapping_option_names_across_groups() -> Result<()> {
    let mut registry = registry();
    let shadow = OptionGroup::new("Shadow options")
        .add(OptionDecl::new("printer.text", ValueKind::String).default_value("shadow"));
    assert!(registry.register_group(shadow, "Shadow"));

    registry.parse_command_line(["app"], &PositionalSpec::new())?;
    // 先注册的声明生效
    assert_eq!(registry.get::<String>("printer.text")?, "UNINITIALIZED");
    Ok(())
}

#[test]
fn test_dump_is_pure() -> Result<()> {
    let mut registry = registry();
    let first = registry.to_string();
    let second = registry.to_string();
    assert_eq!(first, second);
    assert!(first.starts_with("Printer options:\n"));
    assert!(first.contains("Cache options:\n"));
    assert!(first.contains("--cache.hosts arg"));
    assert!(registry.store().is_empty());

    registry.parse_command_line(["app"], &PositionalSpec::new())?;
    assert_eq!(registry.to_string(), first);
    Ok(())
}
