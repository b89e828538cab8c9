use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigInvalidValue,

    ValidationInvalidArgument,
    ValidationInvalidJson,

    RegionStartNotFound,
    RegionEndNotFound,
    RegionOverlappingRanges,
    RegionInvalidBoundary,
    RegionResidualMatch,

    InternalIoError,
    InternalJsonError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigInvalidValue => "config.invalid_value",

            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",
            ErrorCode::ValidationInvalidJson => "validation.invalid_json",

            ErrorCode::RegionStartNotFound => "region.start_not_found",
            ErrorCode::RegionEndNotFound => "region.end_not_found",
            ErrorCode::RegionOverlappingRanges => "region.overlapping_ranges",
            ErrorCode::RegionInvalidBoundary => "region.invalid_boundary",
            ErrorCode::RegionResidualMatch => "region.residual_match",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidValueDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalJsonErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Where a boundary scan gave up. Line numbers are 1-based.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryDetails {
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_line: Option<usize>,
    pub total_lines: usize,
}

/// Two half-open ranges that claim the same lines (0-based indices).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapDetails {
    pub first: String,
    pub first_range: [usize; 2],
    pub second: String,
    pub second_range: [usize; 2],
}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
        }
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
    ) -> Self {
        let details = to_details(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.into(),
        });

        Self::new(
            ErrorCode::ValidationInvalidArgument,
            "Invalid argument",
            details,
        )
    }

    pub fn validation_invalid_json(
        err: serde_json::Error,
        context: Option<String>,
        excerpt: Option<String>,
    ) -> Self {
        let details = serde_json::json!({
            "error": err.to_string(),
            "context": context,
            "excerpt": excerpt,
        });

        Self::new(ErrorCode::ValidationInvalidJson, "Invalid JSON", details)
    }

    pub fn config_invalid_value(
        key: impl Into<String>,
        value: Option<String>,
        problem: impl Into<String>,
    ) -> Self {
        let details = to_details(ConfigInvalidValueDetails {
            key: key.into(),
            value,
            problem: problem.into(),
        });

        Self::new(
            ErrorCode::ConfigInvalidValue,
            "Invalid configuration value",
            details,
        )
    }

    pub fn region_start_not_found(region: impl Into<String>, total_lines: usize) -> Self {
        let region = region.into();
        let message = format!("Start of region '{}' not found", region);
        Self::new(
            ErrorCode::RegionStartNotFound,
            message,
            to_details(BoundaryDetails {
                region,
                start_line: None,
                total_lines,
            }),
        )
        .with_hint("Set \"required\": false on the region to treat a missing construct as a no-op")
    }

    /// `start` is the 0-based index of the line that opened the region.
    pub fn region_end_not_found(
        region: impl Into<String>,
        start: usize,
        total_lines: usize,
    ) -> Self {
        let region = region.into();
        let message = format!(
            "End of region '{}' (opened at line {}) not found before end of input",
            region,
            start + 1
        );
        Self::new(
            ErrorCode::RegionEndNotFound,
            message,
            to_details(BoundaryDetails {
                region,
                start_line: Some(start + 1),
                total_lines,
            }),
        )
        .with_hint("The file was left untouched; tighten or correct the region's end rule")
    }

    pub fn region_overlapping_ranges(
        first: impl Into<String>,
        first_range: (usize, usize),
        second: impl Into<String>,
        second_range: (usize, usize),
    ) -> Self {
        let first = first.into();
        let second = second.into();
        let message = format!(
            "Regions '{}' [{}, {}) and '{}' [{}, {}) overlap",
            first, first_range.0, first_range.1, second, second_range.0, second_range.1
        );
        Self::new(
            ErrorCode::RegionOverlappingRanges,
            message,
            to_details(OverlapDetails {
                first,
                first_range: [first_range.0, first_range.1],
                second,
                second_range: [second_range.0, second_range.1],
            }),
        )
    }

    pub fn region_invalid_boundary(
        region: impl Into<String>,
        problem: impl Into<String>,
    ) -> Self {
        let region = region.into();
        Self::new(
            ErrorCode::RegionInvalidBoundary,
            format!("Region '{}' resolved to an invalid range", region),
            serde_json::json!({ "region": region, "problem": problem.into() }),
        )
    }

    /// A deleted region's start cue still matches the rewritten output.
    pub fn region_residual_match(region: impl Into<String>, line: usize) -> Self {
        let region = region.into();
        Self::new(
            ErrorCode::RegionResidualMatch,
            format!(
                "Region '{}' still matches at line {} after removal",
                region,
                line + 1
            ),
            serde_json::json!({ "region": region, "line": line + 1 }),
        )
        .with_hint("Use \"multiplicity\": \"all\" if the construct occurs more than once")
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalIoErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalIoError, "IO error", details)
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalJsonErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalJsonError, "JSON error", details)
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }

    /// True for the boundary-detection failures raised by the scanner and editor.
    /// The CLI exits with 3 for these.
    pub fn is_boundary_failure(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::RegionStartNotFound
                | ErrorCode::RegionEndNotFound
                | ErrorCode::RegionOverlappingRanges
                | ErrorCode::RegionInvalidBoundary
                | ErrorCode::RegionResidualMatch
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_not_found_reports_one_based_line() {
        let err = Error::region_end_not_found("LoadReferrersAsync", 41, 120);
        assert_eq!(err.code.as_str(), "region.end_not_found");
        assert!(err.message.contains("line 42"));
        assert_eq!(err.details["startLine"], 42);
        assert_eq!(err.details["region"], "LoadReferrersAsync");
        assert!(!err.hints.is_empty());
    }

    #[test]
    fn overlap_names_both_regions() {
        let err = Error::region_overlapping_ranges("a", (2, 6), "b", (5, 9));
        assert!(err.message.contains("'a' [2, 6)"));
        assert!(err.message.contains("'b' [5, 9)"));
        assert_eq!(err.details["secondRange"][0], 5);
        assert!(err.is_boundary_failure());
    }

    #[test]
    fn io_errors_are_not_boundary_failures() {
        let err = Error::internal_io("denied", Some("read file".to_string()));
        assert!(!err.is_boundary_failure());
        assert_eq!(err.details["context"], "read file");
    }
}
