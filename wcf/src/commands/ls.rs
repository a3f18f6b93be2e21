// wcf/src/commands/ls.rs

use comfy_table::{presets::UTF8_FULL, Table};
use wcf_core::domain::registry::ComponentRegistry;

pub fn connectors(registry: &ComponentRegistry) {
    print_single_column("Connectors", registry.list_connectors());
}

pub fn processors(registry: &ComponentRegistry) {
    print_single_column("Processors", registry.list_processors());
}

pub fn exporters(registry: &ComponentRegistry) {
    print_single_column("Exporters", registry.list_exporters());
}

pub fn rulesets(registry: &ComponentRegistry) {
    print_single_column("Rulesets", registry.list_rulesets());
}

fn print_single_column(header: &str, names: Vec<&str>) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![header]);
    if names.is_empty() {
        table.add_row(vec!["(none registered)"]);
    } else {
        for name in names {
            table.add_row(vec![name]);
        }
    }
    println!("{table}");
}
