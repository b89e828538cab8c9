use clap::Args;
use serde::Serialize;

use excise::surgery::{self, ScanReport};

use super::CmdResult;

#[derive(Args)]
pub struct ScanArgs {
    /// File to scan
    pub file: String,

    /// Surgery plan: inline JSON, @path/to/plan.json, or - for stdin
    #[arg(short, long)]
    pub plan: String,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum ScanOutput {
    #[serde(rename = "scan")]
    Scan {
        #[serde(flatten)]
        report: ScanReport,
    },
}

pub fn run(args: ScanArgs) -> CmdResult<ScanOutput> {
    let plan = super::load_plan(&args.plan)?;
    let path = super::target_file(&args.file)?;

    let report = surgery::scan_file(&path, &plan)?;
    let exit_code = if report.regions_found == 0 { 1 } else { 0 };

    Ok((ScanOutput::Scan { report }, exit_code))
}
