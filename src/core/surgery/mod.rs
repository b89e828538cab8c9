//! Line-oriented region surgery.
//!
//! Locates structurally-delimited regions (method bodies, markup subtrees,
//! single statements) with line heuristics and rewrites the file with those
//! regions deleted or replaced. Works by:
//!
//! 1. Loading the file into a `LineDocument` (terminator style remembered)
//! 2. Compiling the plan's region specs
//! 3. Scanning each spec to resolved `[start, end)` ranges
//! 4. Applying every edit in one pass over the original numbering
//! 5. Re-scanning the output to confirm deleted constructs are gone
//! 6. Writing atomically, only when asked and only if every step succeeded

pub mod document;
pub mod editor;
pub mod matcher;
pub mod plan;
pub mod region;
pub mod scanner;

use std::path::Path;

use serde::Serialize;

pub use document::{LineDocument, LineEnding};
pub use editor::{apply_edits, build_ops, EditOp, EditStats};
pub use matcher::{LineMatcher, Matcher};
pub use plan::SurgeryPlan;
pub use region::{Action, CompiledRegion, EndCondition, EndRule, Multiplicity, RegionSpec};
pub use scanner::{scan_plan, scan_region, RegionScan, ResolvedRange};

use crate::error::{Error, Result};
use crate::utils::io;

/// One resolved range, in both human (1-based, inclusive) and index form.
#[derive(Debug, Clone, Serialize)]
pub struct RangeReport {
    pub start_line: usize,
    pub end_line: usize,
    pub start_index: usize,
    pub end_index: usize,
    pub lines: usize,
}

impl From<&ResolvedRange> for RangeReport {
    fn from(range: &ResolvedRange) -> Self {
        Self {
            start_line: range.start + 1,
            end_line: range.end,
            start_index: range.start,
            end_index: range.end,
            lines: range.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionReport {
    pub name: String,
    pub found: bool,
    pub ranges: Vec<RangeReport>,
    pub lines_removed: usize,
    pub lines_inserted: usize,
}

impl RegionReport {
    fn new(region: &CompiledRegion, scan: &RegionScan) -> Self {
        let per_range = match &region.action {
            Action::Delete => 0,
            Action::Replace(lines) => lines.len(),
        };
        Self {
            name: scan.name.clone(),
            found: scan.found(),
            ranges: scan.ranges.iter().map(RangeReport::from).collect(),
            lines_removed: scan.ranges.iter().map(ResolvedRange::len).sum(),
            lines_inserted: per_range * scan.ranges.len(),
        }
    }
}

/// Result of resolving a plan without editing.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub file: String,
    pub total_lines: usize,
    pub regions_found: usize,
    pub regions: Vec<RegionReport>,
}

/// Result of resolving, editing and (optionally) writing a file.
#[derive(Debug, Clone, Serialize)]
pub struct SurgeryReport {
    pub file: String,
    pub line_ending: LineEnding,
    pub original_lines: usize,
    pub new_lines: usize,
    pub delta: isize,
    pub lines_removed: usize,
    pub lines_inserted: usize,
    pub regions_found: usize,
    pub regions: Vec<RegionReport>,
    pub dry_run: bool,
    pub applied: bool,
}

/// An in-memory rewrite that passed verification.
#[derive(Debug, Clone)]
pub struct Rewrite {
    pub scans: Vec<RegionScan>,
    pub output: LineDocument,
    pub stats: EditStats,
}

/// Scan, edit and verify `doc`. Never touches the filesystem.
pub fn rewrite(doc: &LineDocument, regions: &[CompiledRegion]) -> Result<Rewrite> {
    let scans = scan_plan(&doc.lines, regions)?;
    let ops = build_ops(regions, &scans);
    let (lines, stats) = apply_edits(&doc.lines, &ops)?;
    verify_removed(&lines, regions, &scans)?;

    Ok(Rewrite {
        scans,
        output: doc.with_lines(lines),
        stats,
    })
}

/// Every deleted construct must be gone from the output.
pub fn verify_removed(
    output: &[String],
    regions: &[CompiledRegion],
    scans: &[RegionScan],
) -> Result<()> {
    for (region, scan) in regions.iter().zip(scans) {
        if !scan.found() || region.action != Action::Delete {
            continue;
        }
        if let Some(line) = region.start.find_from(output, 0) {
            return Err(Error::region_residual_match(&region.name, line));
        }
    }
    Ok(())
}

fn load(path: &Path, plan: &SurgeryPlan) -> Result<(LineDocument, Vec<CompiledRegion>)> {
    let regions = plan.compile()?;
    let content = io::read_file(path, &format!("read {}", path.display()))?;
    Ok((LineDocument::parse(&content), regions))
}

/// Resolve the plan against a file and report the ranges it would touch.
pub fn scan_file(path: &Path, plan: &SurgeryPlan) -> Result<ScanReport> {
    let (doc, regions) = load(path, plan)?;
    let scans = scan_plan(&doc.lines, &regions)?;

    let reports: Vec<RegionReport> = regions
        .iter()
        .zip(&scans)
        .map(|(region, scan)| RegionReport::new(region, scan))
        .collect();

    Ok(ScanReport {
        file: path.display().to_string(),
        total_lines: doc.len(),
        regions_found: reports.iter().filter(|r| r.found).count(),
        regions: reports,
    })
}

/// Apply the plan to a file. With `write == false` nothing is written.
///
/// The file is read once; it is only replaced (atomically) after every
/// region resolved, the edit applied and the output verified.
pub fn apply_file(path: &Path, plan: &SurgeryPlan, write: bool) -> Result<SurgeryReport> {
    let (doc, regions) = load(path, plan)?;
    let result = rewrite(&doc, &regions)?;

    let original_lines = doc.len();
    let new_lines = result.output.len();
    let changed = result.output != doc;

    let applied = if write && changed {
        io::write_file_atomic(
            path,
            &result.output.render(),
            &format!("write {}", path.display()),
        )?;
        true
    } else {
        false
    };

    let reports: Vec<RegionReport> = regions
        .iter()
        .zip(&result.scans)
        .map(|(region, scan)| RegionReport::new(region, scan))
        .collect();

    log_status!(
        "apply",
        "{}: {} -> {} lines ({:+}){}",
        path.display(),
        original_lines,
        new_lines,
        new_lines as isize - original_lines as isize,
        if write { "" } else { " [dry run]" }
    );

    Ok(SurgeryReport {
        file: path.display().to_string(),
        line_ending: doc.ending,
        original_lines,
        new_lines,
        delta: new_lines as isize - original_lines as isize,
        lines_removed: result.stats.removed,
        lines_inserted: result.stats.inserted,
        regions_found: reports.iter().filter(|r| r.found).count(),
        regions: reports,
        dry_run: !write,
        applied,
    })
}
