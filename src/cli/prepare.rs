//! Prepare command implementation

use std::path::Path;
use std::process::ExitCode;

use crate::batch::{prepare_file, run_batch, BatchSummary, PreparedIcon};
use crate::config::{merge_cli_overrides, CliOverrides};
use crate::matte::Resample;
use crate::output::prepared_output_path;

use super::{load_settings, parse_hex_color, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the prepare command
pub fn run_prepare(
    config: Option<&Path>,
    input: &Path,
    output: Option<&Path>,
    width: Option<u32>,
    height: Option<u32>,
    padding: Option<u32>,
    tolerance: Option<u8>,
    background: Option<&str>,
    no_optimize: bool,
    resample: Option<Resample>,
    json: bool,
) -> ExitCode {
    let background = match background.map(|text| (text, parse_hex_color(text))) {
        None => None,
        Some((_, Some(color))) => Some(color),
        Some((text, None)) => {
            eprintln!("Error: --background must be a hex color like FFFFFF, got '{}'", text);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let mut settings = match load_settings(config) {
        Ok(settings) => settings,
        Err(code) => return code,
    };
    let overrides = CliOverrides { width, height, padding, tolerance, background, no_optimize, resample, table: None };
    merge_cli_overrides(&mut settings, &overrides);

    let errors = settings.validate();
    if !errors.is_empty() {
        for error in errors {
            eprintln!("Error: {}", error);
        }
        return ExitCode::from(EXIT_INVALID_ARGS);
    }
    let prepare_config = &settings.prepare;

    if !input.exists() {
        eprintln!("Error: Input not found: {}", input.display());
        return ExitCode::from(EXIT_ERROR);
    }

    if input.is_dir() {
        let summary = match run_batch(input, output, prepare_config) {
            Ok(summary) => summary,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        };
        print_batch_summary(&summary, json);
        return if summary.is_success() { ExitCode::from(EXIT_SUCCESS) } else { ExitCode::from(EXIT_ERROR) };
    }

    let out_path = prepared_output_path(input, output);
    match prepare_file(input, &out_path, prepare_config) {
        Ok(icon) => {
            print_icon(&icon, json);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn icon_json(icon: &PreparedIcon) -> serde_json::Value {
    serde_json::json!({
        "input": icon.source.display().to_string(),
        "output": icon.output.display().to_string(),
        "bytes": icon.bytes,
        "report": icon.report,
    })
}

fn print_icon(icon: &PreparedIcon, json: bool) {
    if json {
        println!("{}", icon_json(icon));
        return;
    }

    let report = &icon.report;
    println!("{} -> {}", icon.source.display(), icon.output.display());
    println!(
        "  {}x{} {} -> {}x{} ({} bytes)",
        report.source_size.0, report.source_size.1, report.source_mode, report.output_size.0, report.output_size.1, icon.bytes
    );
    for fix in &report.fixes {
        println!("  fixed: {}", fix);
    }
    for warning in &report.warnings {
        println!("  warning: {}", warning);
    }
    for issue in &report.issues {
        println!("  issue: {}", issue);
    }
    if report.is_ready() {
        println!("  ready for upload");
    }
}

fn print_batch_summary(summary: &BatchSummary, json: bool) {
    if json {
        let value = serde_json::json!({
            "prepared": summary.prepared.iter().map(icon_json).collect::<Vec<_>>(),
            "failures": summary.failures.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
            "tracking_csv": summary.tracking_csv.as_ref().map(|p| p.display().to_string()),
            "preview": summary.preview.as_ref().map(|p| p.display().to_string()),
        });
        println!("{}", value);
        return;
    }

    for icon in &summary.prepared {
        print_icon(icon, false);
    }
    for failure in &summary.failures {
        eprintln!("Error: {}", failure);
    }
    println!();
    println!("Prepared {} of {} files", summary.prepared.len(), summary.prepared.len() + summary.failures.len());
    if let Some(csv) = &summary.tracking_csv {
        println!("Tracking CSV: {}", csv.display());
    }
    if let Some(preview) = &summary.preview {
        println!("Preview sheet: {}", preview.display());
    }
}
