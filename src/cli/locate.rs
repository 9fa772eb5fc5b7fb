//! Address lookup commands (locate, positions, lookup)

use std::path::Path;
use std::process::ExitCode;

use crate::config::{merge_cli_overrides, CliOverrides};
use crate::output::write_csv;
use crate::resolver::{positions, resolve, resolve_icon, AssetReference, IconPosition, Lookup, ResolveError};
use crate::table::CustomIconTable;

use super::{load_settings, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

fn resolve_exit(err: &ResolveError) -> ExitCode {
    eprintln!("Error: {}", err);
    match err {
        ResolveError::OutOfDomain(_) => ExitCode::from(EXIT_INVALID_ARGS),
        ResolveError::NotFound(_) => ExitCode::from(EXIT_ERROR),
    }
}

/// Execute the locate command
pub fn run_locate(config: Option<&Path>, icon: i64, name: Option<&str>, json: bool) -> ExitCode {
    let settings = match load_settings(config) {
        Ok(settings) => settings,
        Err(code) => return code,
    };

    let region = match resolve(icon) {
        Ok(region) => region,
        Err(e) => return resolve_exit(&e),
    };

    if json {
        let position = IconPosition::new(icon, &region, &settings.sheets);
        let value = serde_json::json!({
            "name": name,
            "region": region,
            "asset_id": position.asset_id,
        });
        println!("{}", value);
        return ExitCode::from(EXIT_SUCCESS);
    }

    match name {
        Some(name) => println!("{} (icon #{})", name, icon),
        None => println!("Icon #{}", icon),
    }
    println!("  Sheet:  {}", region.sheet);
    println!("  Cell:   column {}, row {}", region.column, region.row);
    if !region.is_egg() {
        println!("  Grid:   column {}, row {}", region.grid_column, region.grid_row);
    }
    let n = region.normal;
    println!("  Normal: x={} y={} {}x{}", n.x, n.y, n.width, n.height);
    if let Some(s) = region.shiny {
        println!("  Shiny:  x={} y={} {}x{}", s.x, s.y, s.width, s.height);
    }
    match settings.sheets.asset_for(region.sheet) {
        Some(asset) => println!("  Asset:  {}{}", settings.sheets.asset_prefix, asset),
        None => println!("  Asset:  (none configured for {})", region.sheet),
    }

    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the positions command
pub fn run_positions(config: Option<&Path>, start: i64, end: i64, output: Option<&Path>) -> ExitCode {
    if start > end {
        eprintln!("Error: start ({}) must not be greater than end ({})", start, end);
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let settings = match load_settings(config) {
        Ok(settings) => settings,
        Err(code) => return code,
    };

    let rows = match positions(start..=end, &settings.sheets) {
        Ok(rows) => rows,
        Err(e) => return resolve_exit(&e),
    };

    match output {
        Some(path) => {
            if let Err(e) = write_csv(path, &rows) {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
            println!("Wrote {} positions to {}", rows.len(), path.display());
        }
        None => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            for row in &rows {
                if let Err(e) = writer.serialize(row) {
                    eprintln!("Error: {}", e);
                    return ExitCode::from(EXIT_ERROR);
                }
            }
            if let Err(e) = writer.flush() {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }

    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the lookup command
pub fn run_lookup(
    config: Option<&Path>,
    icon: i64,
    shiny: bool,
    custom: bool,
    table: Option<&Path>,
    json: bool,
) -> ExitCode {
    let mut settings = match load_settings(config) {
        Ok(settings) => settings,
        Err(code) => return code,
    };
    merge_cli_overrides(&mut settings, &CliOverrides { table: table.map(Path::to_path_buf), ..Default::default() });

    let (lookup, icons) = if custom {
        match CustomIconTable::load_or_default(&settings.table.path) {
            Ok(icons) => (Lookup::Custom, icons),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        (Lookup::Geometric, CustomIconTable::new())
    };

    let reference = match resolve_icon(icon, shiny, lookup, &icons, &settings.sheets) {
        Ok(reference) => reference,
        Err(e) => return resolve_exit(&e),
    };

    if json {
        let value = serde_json::json!({
            "icon": icon,
            "shiny": shiny,
            "uri": reference.uri(&settings.sheets.asset_prefix),
            "reference": reference,
        });
        println!("{}", value);
        return ExitCode::from(EXIT_SUCCESS);
    }

    println!("{}", reference.uri(&settings.sheets.asset_prefix));
    match &reference {
        AssetReference::Sheet { sheet, rect, .. } => {
            println!("  {} rect x={} y={} {}x{}", sheet, rect.x, rect.y, rect.width, rect.height);
        }
        AssetReference::Custom { slot, label, .. } => {
            println!("  custom slot {} ({})", slot, label);
        }
    }

    ExitCode::from(EXIT_SUCCESS)
}
