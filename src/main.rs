use clap::{Parser, Subcommand};

mod commands;
mod output;
mod tty;

use commands::{apply, scan};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "excise")]
#[command(version = VERSION)]
#[command(about = "Delete or replace line-delimited regions in source and markup files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a plan's regions to line ranges without editing
    Scan(scan::ScanArgs),
    /// Delete or replace a plan's regions (dry run unless --write)
    Apply(apply::ApplyArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let (json_result, exit_code) = commands::run_json(cli.command);
    let _ = output::print_json_result(&json_result);

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
