// Printer component, registered through the registrar table

use optreg::{Loadable, OptionDecl, OptionGroup, Registry, ValueKind};

pub const DEFAULT_TEXT: &str = "UNINITIALIZED";

/// Prints a line of text after some padding
#[derive(Debug, Clone, PartialEq, Loadable)]
#[option(prefix = "printer")]
pub struct Printer {
    #[option]
    text: String,
    #[option]
    padding: usize,
}

impl Default for Printer {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEXT.to_string(),
            padding: 0,
        }
    }
}

impl Printer {
    pub fn line(&self) -> String {
        format!("PRINTER: {}{}", " ".repeat(self.padding), self.text)
    }

    pub fn print(&self) {
        println!("{}", self.line());
    }
}

/// Registrar for [`Printer`]
pub fn register_printer(registry: &mut Registry) -> bool {
    let group = OptionGroup::new("Printer options")
        .add(
            OptionDecl::new("printer.text", ValueKind::String)
                .default_value(DEFAULT_TEXT)
                .help("text to print"),
        )
        .add(
            OptionDecl::new("printer.padding", ValueKind::Unsigned)
                .default_value(0)
                .help("padding to add before printing"),
        );
    registry.register_group(group, "Printer")
}
