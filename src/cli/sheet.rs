//! Sheet-level commands (validate, template)

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::matte::decode_file;
use crate::output::save_png;
use crate::template::render_template;
use crate::validate::{validate_sheet, SheetKind};

use super::{EXIT_ERROR, EXIT_SUCCESS};

/// Empty cells printed before the list is cut short
const EMPTY_CELLS_SHOWN: usize = 10;

/// Execute the validate command
pub fn run_validate(sheet: &Path, kind: SheetKind, json: bool) -> ExitCode {
    let image = match decode_file(sheet) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("Error: {}: {}", sheet.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let report = validate_sheet(&image, kind);

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        println!("Validating: {}", sheet.display());
        println!("Sheet type: {}", kind);
        println!("Size: {}x{} ({} columns x {} rows)", report.width, report.height, report.columns, report.rows);

        if report.empty_cells.is_empty() {
            println!("No empty cells detected");
        } else {
            println!("Found {} empty sprite cells:", report.empty_cells.len());
            for cell in report.empty_cells.iter().take(EMPTY_CELLS_SHOWN) {
                println!("  - {}", cell);
            }
            if report.empty_cells.len() > EMPTY_CELLS_SHOWN {
                println!("  ... and {} more", report.empty_cells.len() - EMPTY_CELLS_SHOWN);
            }
        }
        for warning in &report.warnings {
            println!("Warning: {}", warning);
        }
        for error in &report.errors {
            eprintln!("Error: {}", error);
        }
        if report.is_valid() {
            println!("Sheet is valid");
        }
    }

    if report.is_valid() {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}

/// Execute the template command
pub fn run_template(kind: SheetKind, rows: u32, output: Option<&Path>) -> ExitCode {
    let path = output.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(format!("{}_sheet_template.png", kind)));
    let image = render_template(kind, rows);

    if let Err(e) = save_png(&image, &path) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_ERROR);
    }

    println!("Created {} template: {} ({}x{}, {} rows)", kind, path.display(), image.width(), image.height(), rows);
    ExitCode::from(EXIT_SUCCESS)
}
