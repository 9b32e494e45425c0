//! Rules command - print the active classification table.

use crate::cli::output::print_table;
use gisload::{ClassifyTable, LoadConfig};

pub fn run(json: bool, config: LoadConfig) -> anyhow::Result<()> {
    let table = ClassifyTable::from_rules(config.rules);

    if json {
        println!("{}", serde_json::to_string_pretty(table.rules())?);
        return Ok(());
    }

    let rows = table
        .rules()
        .iter()
        .map(|rule| vec![rule.file_name.clone(), rule.schema.clone()])
        .collect();
    print_table(&["File", "Schema"], rows);
    Ok(())
}
