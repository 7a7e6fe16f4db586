//! Configuration check command

use anyhow::{Context, Result};
use mcdwalk::WalkConfig;
use std::path::Path;

/// Handle the Check command
///
/// Loads and validates the configuration, then prints the layout tree.
pub fn handle(config_path: &Path) -> Result<()> {
    let config = WalkConfig::load(config_path)
        .with_context(|| format!("Invalid walk configuration {}", config_path.display()))?;

    println!("{}: OK", config_path.display());
    println!("  base address: {:#x}", config.base_address);
    println!(
        "  pointers: {} bytes, {:?} endian",
        config.pointer.width, config.pointer.endian
    );
    println!("  next record at: +{:#x}", config.next_offset);
    println!(
        "  limits: {} records, {} byte strings",
        config.max_records, config.max_string_len
    );
    if let Some(dump) = &config.dump {
        println!("  dump: {}", dump.display());
    }

    println!("\nFields:");
    print!("{}", config.schema.describe());

    if !config.bitflags.is_empty() {
        println!("\nBitflag tables:");
        for path in config.bitflags.paths() {
            let Some(flags) = config.bitflags.get(path) else {
                continue;
            };
            let names: Vec<String> = flags
                .entries()
                .iter()
                .map(|(mask, name)| format!("{}={:#x}", name, mask))
                .collect();
            println!("  {}: {}", path, names.join(", "));
        }
    }

    Ok(())
}
