//! Boundary scanner: resolve each region spec to concrete line ranges.
//!
//! Pure over the input lines. A plan is scanned spec by spec in order; every
//! new range is checked against all ranges resolved for earlier specs.

use serde::Serialize;

use super::region::{CompiledRegion, Multiplicity};
use crate::error::{Error, ErrorCode, Result};

/// Half-open `[start, end)` interval of 0-based line indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRange {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

impl ResolvedRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    pub fn overlaps(&self, other: &ResolvedRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Ranges found for one spec. Empty when an optional construct is absent.
#[derive(Debug, Clone, Serialize)]
pub struct RegionScan {
    pub name: String,
    pub ranges: Vec<ResolvedRange>,
}

impl RegionScan {
    pub fn found(&self) -> bool {
        !self.ranges.is_empty()
    }
}

/// Resolve one region against `lines`.
///
/// Fails with `region.start_not_found` when the start cue never matches;
/// the caller decides whether that is fatal.
pub fn scan_region(lines: &[String], region: &CompiledRegion) -> Result<Vec<ResolvedRange>> {
    let mut ranges = Vec::new();
    let mut cursor = 0;

    while let Some(s) = region.start.find_from(lines, cursor) {
        let raw_end = region
            .end
            .find_end(lines, s)
            .ok_or_else(|| Error::region_end_not_found(&region.name, s, lines.len()))?;
        let end = shift_end(region, s, raw_end, lines.len())?;

        // The companion line only counts if no earlier range of this spec owns it.
        let start = match &region.preceding {
            Some(prev) if s > cursor && prev.is_match(&lines[s - 1]) => s - 1,
            _ => s,
        };

        ranges.push(ResolvedRange {
            name: region.name.clone(),
            start,
            end,
        });

        if region.multiplicity == Multiplicity::First {
            break;
        }
        cursor = end;
    }

    if ranges.is_empty() {
        return Err(Error::region_start_not_found(&region.name, lines.len()));
    }

    Ok(ranges)
}

fn shift_end(region: &CompiledRegion, start: usize, end: usize, total: usize) -> Result<usize> {
    let offset = region.end.offset();
    let shifted = end as isize + offset;
    if shifted <= start as isize || shifted > total as isize {
        return Err(Error::region_invalid_boundary(
            &region.name,
            format!(
                "End offset {} moves the end (line {}) outside the region opened at line {}",
                offset,
                end + 1,
                start + 1
            ),
        ));
    }
    Ok(shifted as usize)
}

/// Scan every region in plan order.
///
/// Optional regions that are absent yield an empty `RegionScan`; every
/// other failure aborts the whole scan.
pub fn scan_plan(lines: &[String], regions: &[CompiledRegion]) -> Result<Vec<RegionScan>> {
    let mut scans: Vec<RegionScan> = Vec::with_capacity(regions.len());

    for region in regions {
        let ranges = match scan_region(lines, region) {
            Ok(ranges) => ranges,
            Err(e) if e.code == ErrorCode::RegionStartNotFound && !region.required => {
                log_status!("scan", "{}: not present, skipping", region.name);
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        for range in &ranges {
            if let Some(prior) = scans
                .iter()
                .flat_map(|s| s.ranges.iter())
                .find(|prior| prior.overlaps(range))
            {
                return Err(Error::region_overlapping_ranges(
                    &prior.name,
                    (prior.start, prior.end),
                    &range.name,
                    (range.start, range.end),
                ));
            }
            log_status!(
                "scan",
                "{}: lines {}-{} ({} lines)",
                range.name,
                range.start + 1,
                range.end,
                range.len()
            );
        }

        scans.push(RegionScan {
            name: region.name.clone(),
            ranges,
        });
    }

    Ok(scans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surgery::matcher::LineMatcher;
    use crate::surgery::region::{EndRule, RegionSpec};

    fn lines(src: &str) -> Vec<String> {
        src.lines().map(|l| l.to_string()).collect()
    }

    fn compile(spec: RegionSpec) -> CompiledRegion {
        spec.compile(0).unwrap()
    }

    const CLASS: &str = "\
public class MainViewModel
{
    public MainViewModel(IService service)
    {
        // Wire up DigestContextMenu
        DigestContextMenu.ManifestRequested += OnDigest;
        Other.Changed += OnOther;
    }

    private async Task LoadReferrersAsync(string reference)
    {
        var items = await _client.ListAsync<Referrer>(reference);
        if (items.Count == 0)
        {
            return;
        }
    }

    private void Keep()
    {
    }
}";

    #[test]
    fn resolves_method_up_to_next_sibling() {
        let src = lines(CLASS);
        let region = compile(RegionSpec::method(
            "LoadReferrersAsync",
            "private async Task LoadReferrersAsync(",
            &["private ", "public "],
        ));
        let ranges = scan_region(&src, &region).unwrap();
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].start, 9);
        assert_eq!(ranges[0].end, 18);
        assert!(src[18].contains("private void Keep()"));
    }

    #[test]
    fn generic_call_and_nested_block_are_not_siblings() {
        let src = lines(CLASS);
        let region = compile(RegionSpec::method(
            "LoadReferrersAsync",
            "LoadReferrersAsync(string",
            &["private ", "public ", "protected ", "internal "],
        ));
        let range = &scan_region(&src, &region).unwrap()[0];
        // Body holds `ListAsync<Referrer>(` and a nested `if` block.
        assert_eq!((range.start, range.end), (9, 18));
    }

    #[test]
    fn generic_method_declaration_is_a_sibling() {
        let src = lines(
            "    private void Refresh()\n    {\n        var x = Get<int>();\n    }\n    private Task<T> Get<T>()\n    {\n    }",
        );
        let region = compile(RegionSpec::method(
            "Refresh",
            "private void Refresh()",
            &["private "],
        ));
        let range = &scan_region(&src, &region).unwrap()[0];
        assert_eq!((range.start, range.end), (0, 4));
        assert!(src[range.end].contains("private Task<T> Get<T>()"));
    }

    #[test]
    fn constructor_is_a_sibling_of_preceding_member() {
        let src = lines(
            "    private int _count;\n    public MainViewModel()\n    {\n    }",
        );
        let region = compile(RegionSpec::method("_count", "private int _count;", &["public ", "private "]));
        let range = &scan_region(&src, &region).unwrap()[0];
        assert_eq!((range.start, range.end), (0, 1));
    }

    #[test]
    fn single_line_with_preceding_comment() {
        let src = lines(CLASS);
        let region = compile(
            RegionSpec::new(
                "digest-subscription",
                LineMatcher::contains("DigestContextMenu.ManifestRequested +="),
                EndRule::SingleLine,
            )
            .with_preceding(LineMatcher::contains("// Wire up DigestContextMenu")),
        );
        let range = &scan_region(&src, &region).unwrap()[0];
        assert_eq!((range.start, range.end), (4, 6));
    }

    #[test]
    fn all_matches_resumes_after_previous_range() {
        let src = lines("// a\nx += 1;\n// b\nx += 2;\nkeep;\nx += 3;");
        let region = compile(
            RegionSpec::new("x", LineMatcher::contains("x +="), EndRule::SingleLine)
                .with_preceding(LineMatcher::starts_with("//"))
                .all_matches(),
        );
        let ranges = scan_region(&src, &region).unwrap();
        let spans: Vec<_> = ranges.iter().map(|r| (r.start, r.end)).collect();
        assert_eq!(spans, vec![(0, 2), (2, 4), (5, 6)]);
    }

    #[test]
    fn preceding_line_owned_by_previous_range_is_not_claimed() {
        let src = lines("x += 1;\nx += 2;");
        let region = compile(
            RegionSpec::new("x", LineMatcher::contains("x +="), EndRule::SingleLine)
                .with_preceding(LineMatcher::contains("x +="))
                .all_matches(),
        );
        let ranges = scan_region(&src, &region).unwrap();
        let spans: Vec<_> = ranges.iter().map(|r| (r.start, r.end)).collect();
        assert_eq!(spans, vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn end_of_input_is_not_a_terminator() {
        let src = lines("private void Last()\n{\n}\n");
        let region = compile(RegionSpec::method("Last", "private void Last()", &["private "]));
        let err = scan_region(&src, &region).unwrap_err();
        assert_eq!(err.code, ErrorCode::RegionEndNotFound);
        assert_eq!(err.details["region"], "Last");
        assert_eq!(err.details["startLine"], 1);
    }

    #[test]
    fn missing_start_reports_start_not_found() {
        let src = lines(CLASS);
        let region = compile(RegionSpec::method("Gone", "private void Gone()", &["private "]));
        let err = scan_region(&src, &region).unwrap_err();
        assert_eq!(err.code, ErrorCode::RegionStartNotFound);
    }

    #[test]
    fn negative_offset_ends_before_sentinel() {
        let src = lines("<!-- panel -->\n<Grid>\n</Grid>\n</Grid>\n<!-- Row 2 -->");
        let region = compile(RegionSpec::new(
            "panel",
            LineMatcher::contains("<!-- panel -->"),
            EndRule::Before {
                matcher: LineMatcher::contains("<!-- Row 2 -->"),
                offset: -1,
            },
        ));
        let range = &scan_region(&src, &region).unwrap()[0];
        assert_eq!((range.start, range.end), (0, 3));
    }

    #[test]
    fn offset_collapsing_region_is_invalid() {
        let src = lines("start\nend");
        let region = compile(RegionSpec::new(
            "tiny",
            LineMatcher::contains("start"),
            EndRule::Before {
                matcher: LineMatcher::contains("end"),
                offset: -1,
            },
        ));
        let err = scan_region(&src, &region).unwrap_err();
        assert_eq!(err.code, ErrorCode::RegionInvalidBoundary);
    }

    #[test]
    fn plan_skips_optional_absent_region() {
        let src = lines(CLASS);
        let regions = vec![
            compile(RegionSpec::method("Gone", "private void Gone()", &["private "]).optional()),
            compile(RegionSpec::method(
                "LoadReferrersAsync",
                "private async Task LoadReferrersAsync(",
                &["private "],
            )),
        ];
        let scans = scan_plan(&src, &regions).unwrap();
        assert!(!scans[0].found());
        assert!(scans[1].found());
    }

    #[test]
    fn plan_rejects_overlap_between_specs() {
        let src = lines(CLASS);
        let regions = vec![
            compile(RegionSpec::method(
                "LoadReferrersAsync",
                "private async Task LoadReferrersAsync(",
                &["private "],
            )),
            compile(RegionSpec::new(
                "inner-if",
                LineMatcher::contains("if (items.Count == 0)"),
                EndRule::SingleLine,
            )),
        ];
        let err = scan_plan(&src, &regions).unwrap_err();
        assert_eq!(err.code, ErrorCode::RegionOverlappingRanges);
        assert_eq!(err.details["first"], "LoadReferrersAsync");
        assert_eq!(err.details["second"], "inner-if");
    }

    #[test]
    fn scanning_is_deterministic() {
        let src = lines(CLASS);
        let region = compile(RegionSpec::method("Keep", "private void Keep()", &["}"]));
        assert_eq!(
            scan_region(&src, &region).unwrap(),
            scan_region(&src, &region).unwrap()
        );
    }
}
