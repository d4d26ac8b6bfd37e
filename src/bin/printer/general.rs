// Options owned by the binary itself

use optreg::{Configurable, OptionDecl, OptionGroup, Registry, ValueKind};

/// Config file read when `--config` is not given
pub const DEFAULT_CONFIG: &str = "printer.cfg";

pub struct General;

impl Configurable for General {
    fn register_options(registry: &mut Registry) -> bool {
        let group = OptionGroup::new("General options")
            .add(
                OptionDecl::new("help", ValueKind::Switch)
                    .short('h')
                    .help("print the registered options and exit"),
            )
            .add(
                OptionDecl::new("config", ValueKind::String)
                    .short('c')
                    .help("config file to read after the command line"),
            )
            .add(
                OptionDecl::new("env-prefix", ValueKind::String)
                    .help("also read options from environment variables with this prefix"),
            );
        registry.register_group(group, "General")
    }
}
