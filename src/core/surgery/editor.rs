//! Region editor: apply delete/replace operations in one pass.
//!
//! All ranges are expressed against the original numbering. The output is
//! built by walking the input once, so no index ever refers to a partially
//! edited sequence.

use serde::Serialize;

use super::region::{Action, CompiledRegion};
use super::scanner::{RegionScan, ResolvedRange};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct EditOp {
    pub range: ResolvedRange,
    pub action: Action,
}

impl EditOp {
    pub fn delete(range: ResolvedRange) -> Self {
        Self {
            range,
            action: Action::Delete,
        }
    }

    pub fn replace(range: ResolvedRange, lines: Vec<String>) -> Self {
        Self {
            range,
            action: Action::Replace(lines),
        }
    }

    pub fn inserted(&self) -> usize {
        match &self.action {
            Action::Delete => 0,
            Action::Replace(lines) => lines.len(),
        }
    }
}

/// Line counts for one applied edit set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditStats {
    pub removed: usize,
    pub inserted: usize,
}

/// Turn scan results into edit operations, pairing each range with its spec's action.
pub fn build_ops(regions: &[CompiledRegion], scans: &[RegionScan]) -> Vec<EditOp> {
    regions
        .iter()
        .zip(scans)
        .flat_map(|(region, scan)| {
            scan.ranges.iter().map(move |range| EditOp {
                range: range.clone(),
                action: region.action.clone(),
            })
        })
        .collect()
}

/// Check bounds and pairwise disjointness; returns ops sorted by start.
fn validate<'a>(lines: &[String], ops: &'a [EditOp]) -> Result<Vec<&'a EditOp>> {
    for op in ops {
        let r = &op.range;
        if r.start >= r.end || r.end > lines.len() {
            return Err(Error::region_invalid_boundary(
                &r.name,
                format!(
                    "Range [{}, {}) is empty or exceeds {} lines",
                    r.start,
                    r.end,
                    lines.len()
                ),
            ));
        }
    }

    let mut sorted: Vec<&EditOp> = ops.iter().collect();
    sorted.sort_by_key(|op| (op.range.start, op.range.end));

    for pair in sorted.windows(2) {
        let (a, b) = (&pair[0].range, &pair[1].range);
        if a.overlaps(b) {
            return Err(Error::region_overlapping_ranges(
                &a.name,
                (a.start, a.end),
                &b.name,
                (b.start, b.end),
            ));
        }
    }

    Ok(sorted)
}

/// Apply `ops` to `lines`, returning the rewritten sequence and its counts.
pub fn apply_edits(lines: &[String], ops: &[EditOp]) -> Result<(Vec<String>, EditStats)> {
    let sorted = validate(lines, ops)?;
    let mut stats = EditStats::default();
    let mut out = Vec::with_capacity(lines.len());
    let mut cursor = 0;

    for op in sorted {
        out.extend_from_slice(&lines[cursor..op.range.start]);
        if let Action::Replace(replacement) = &op.action {
            out.extend(replacement.iter().cloned());
        }
        stats.removed += op.range.len();
        stats.inserted += op.inserted();
        cursor = op.range.end;
    }
    out.extend_from_slice(&lines[cursor..]);

    Ok((out, stats))
}
