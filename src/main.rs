//! iconsheet - Command-line tool for locating sheet icons and preparing custom ones

use std::process::ExitCode;

use iconsheet::cli;

fn main() -> ExitCode {
    cli::run()
}
