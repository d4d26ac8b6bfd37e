// printer - demo of components sharing one option registry

mod general;
mod printer;

use anyhow::{Context, Result};
use optreg::{PositionalSpec, Registry, RegistryConfig};
use std::path::PathBuf;

use general::{General, DEFAULT_CONFIG};
use printer::{register_printer, Printer};

fn build_registry() -> Result<Registry> {
    let config = RegistryConfig {
        program_name: "printer".to_string(),
        ..RegistryConfig::default()
    };
    let mut registry = Registry::with_config(config);

    registry.register_configurable::<General>();
    registry.add_registrar::<Printer>(register_printer);
    registry.register_external::<Printer>()?;

    Ok(registry)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut registry = build_registry()?;

    registry
        .parse_command_line(std::env::args_os(), &PositionalSpec::new())
        .context("Failed to parse command line")?;

    if registry.get::<bool>("help")? {
        print!("{}", registry);
        return Ok(());
    }

    let mut prefix = String::new();
    if registry.load(&mut prefix, "env-prefix") {
        registry
            .parse_environment(&prefix)
            .with_context(|| format!("Failed to read environment with prefix {}", prefix))?;
    }

    let config_path = match registry.get::<String>("config") {
        Ok(path) => Some(PathBuf::from(path)),
        Err(_) => Some(PathBuf::from(DEFAULT_CONFIG)).filter(|path| path.exists()),
    };
    if let Some(path) = config_path {
        registry
            .parse_config_file(&path)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    }

    let mut printer = Printer::default();
    registry.load_into(&mut printer);
    printer.print();

    Ok(())
}
