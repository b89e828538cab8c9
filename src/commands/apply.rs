use clap::Args;
use serde::Serialize;

use excise::surgery::{self, SurgeryReport};

use super::CmdResult;

#[derive(Args)]
pub struct ApplyArgs {
    /// File to rewrite
    pub file: String,

    /// Surgery plan: inline JSON, @path/to/plan.json, or - for stdin
    #[arg(short, long)]
    pub plan: String,

    /// Apply changes to disk (default is dry-run)
    #[arg(long)]
    pub write: bool,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum ApplyOutput {
    #[serde(rename = "apply")]
    Apply {
        #[serde(flatten)]
        report: SurgeryReport,
    },
}

pub fn run(args: ApplyArgs) -> CmdResult<ApplyOutput> {
    let plan = super::load_plan(&args.plan)?;
    let path = super::target_file(&args.file)?;

    let report = surgery::apply_file(&path, &plan, args.write)?;
    let exit_code = if report.regions_found == 0 { 1 } else { 0 };

    Ok((ApplyOutput::Apply { report }, exit_code))
}
