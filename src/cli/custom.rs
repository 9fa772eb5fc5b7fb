//! Custom icon table commands

use clap::Subcommand;
use std::path::Path;
use std::process::ExitCode;

use crate::config::{merge_cli_overrides, CliOverrides};
use crate::resolver::FIRST_CUSTOM_SLOT;
use crate::table::{CustomIconEntry, CustomIconTable, PREFERRED_START_SLOT};

use super::{load_settings, EXIT_ERROR, EXIT_SUCCESS};

#[derive(Subcommand)]
pub enum CustomAction {
    /// List every custom icon
    List,
    /// Add a custom icon at a slot
    Add {
        /// Slot key (the game looks up icon number `slot - 1`)
        slot: u32,
        /// Asset id of the normal sprite
        normal: String,
        /// Display label
        label: String,
        /// Asset id of the shiny sprite
        #[arg(long)]
        shiny: Option<String>,
    },
    /// List unused slots in a range
    Gaps {
        /// First slot to check
        #[arg(long, default_value_t = FIRST_CUSTOM_SLOT)]
        start: u32,
        /// Last slot to check (default: highest used slot)
        #[arg(long)]
        end: Option<u32>,
    },
    /// Suggest the next slot to use
    Next {
        /// Preferred starting slot
        #[arg(long, default_value_t = PREFERRED_START_SLOT)]
        from: u32,
    },
}

/// Execute a custom table command
pub fn run_custom(config: Option<&Path>, action: CustomAction, table: Option<&Path>) -> ExitCode {
    let mut settings = match load_settings(config) {
        Ok(settings) => settings,
        Err(code) => return code,
    };
    merge_cli_overrides(&mut settings, &CliOverrides { table: table.map(Path::to_path_buf), ..Default::default() });
    let path = settings.table.path;

    let mut icons = match CustomIconTable::load_or_default(&path) {
        Ok(icons) => icons,
        Err(e) => {
            eprintln!("Error: {}: {}", path.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match action {
        CustomAction::List => {
            if icons.is_empty() {
                println!("No custom icons in {}", path.display());
                return ExitCode::from(EXIT_SUCCESS);
            }
            println!("{:<6} {:<8} {:<25} {:<10} Asset ID", "Slot", "Icon #", "Label", "Shiny");
            println!("{}", "-".repeat(70));
            for entry in icons.iter() {
                let shiny = if entry.shiny.is_some() { "yes" } else { "no" };
                println!(
                    "{:<6} {:<8} {:<25} {:<10} {}",
                    entry.slot_key,
                    entry.icon_number(),
                    entry.label,
                    shiny,
                    entry.normal
                );
            }
            println!();
            println!("Total: {} custom icons", icons.len());
            let gaps = icons.gap_ranges();
            if !gaps.is_empty() {
                let listed: Vec<String> = gaps
                    .iter()
                    .map(|(a, b)| if a == b { a.to_string() } else { format!("{}-{}", a, b) })
                    .collect();
                println!("Available slots (gaps): {}", listed.join(", "));
            }
            match icons.next_sequential_slot() {
                Some(slot) => println!("Next sequential slot: {}", slot),
                None => println!("Next sequential slot: none (slot {} is used)", u32::MAX),
            }
        }
        CustomAction::Add { slot, normal, label, shiny } => {
            let mut entry = CustomIconEntry::new(slot, normal, label);
            if let Some(shiny) = shiny {
                entry = entry.with_shiny(shiny);
            }
            let summary = entry.clone();

            if let Err(e) = icons.put(entry) {
                eprintln!("Error: {}", e);
                if let Some(next) = icons.next_available_from(slot) {
                    eprintln!("Next available slot: {}", next);
                }
                return ExitCode::from(EXIT_ERROR);
            }
            if let Err(e) = icons.save(&path) {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }

            let prefix = &settings.sheets.asset_prefix;
            println!("Added '{}' to {}", summary.label, path.display());
            println!("  Slot: {} (use as icon #{} in game)", summary.slot_key, summary.icon_number());
            println!("  Normal: {}{}", prefix, summary.normal);
            if let Some(shiny) = &summary.shiny {
                println!("  Shiny: {}{}", prefix, shiny);
            }
        }
        CustomAction::Gaps { start, end } => {
            let end = end.or(icons.highest_slot()).unwrap_or(FIRST_CUSTOM_SLOT - 1);
            let gaps = icons.list_gaps(start, end);
            if gaps.is_empty() {
                println!("No free slots between {} and {}", start, end);
            } else {
                for slot in gaps {
                    println!("{}", slot);
                }
            }
        }
        CustomAction::Next { from } => match icons.next_available_from(from) {
            Some(slot) => println!("{}", slot),
            None => {
                eprintln!("Error: No free slot at or after {}", from);
                return ExitCode::from(EXIT_ERROR);
            }
        },
    }

    ExitCode::from(EXIT_SUCCESS)
}
