//! Region specifications: how one target construct is recognized.

use serde::{Deserialize, Serialize};

use super::matcher::{LineMatcher, Matcher};
use crate::error::{Error, Result};

/// Whether a spec stops at the first construct or removes every occurrence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Multiplicity {
    #[default]
    First,
    All,
}

/// What happens to each resolved range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    #[default]
    Delete,
    /// Substitute the range with these lines (no terminators).
    Replace(Vec<String>),
}

/// How the end of a region is found once its start line is known.
///
/// The end index is exclusive: the line that satisfies the rule is the
/// first line *not* in the region (except `balanced`, which ends after the
/// closing line, and `single_line`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum EndRule {
    /// First later line matching `matcher`, shifted by `offset` lines.
    Before {
        matcher: LineMatcher,
        #[serde(default, skip_serializing_if = "is_zero")]
        offset: isize,
    },
    /// Next sibling declaration: trimmed line starts with one of `prefixes`
    /// and does not mention `exclude` (defaults to the region name).
    Sibling {
        prefixes: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exclude: Option<String>,
    },
    /// Depth counting from the start line: ends after the line that closes
    /// the last open delimiter.
    Balanced { open: String, close: String },
    /// The region is the start line alone.
    SingleLine,
}

fn is_zero(v: &isize) -> bool {
    *v == 0
}

fn default_required() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegionSpec {
    pub name: String,
    pub start: LineMatcher,
    pub end: EndRule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub also_remove_preceding_if: Option<LineMatcher>,
    #[serde(default)]
    pub multiplicity: Multiplicity,
    /// When false, a missing construct is a no-op instead of an error.
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub action: Action,
}

impl RegionSpec {
    /// Delete the first construct starting at `start` and ending before `end`.
    pub fn new(name: impl Into<String>, start: LineMatcher, end: EndRule) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            also_remove_preceding_if: None,
            multiplicity: Multiplicity::First,
            required: true,
            action: Action::Delete,
        }
    }

    /// Method-body removal: starts at `signature`, ends at the next member
    /// declaration beginning with one of `prefixes` that does not re-mention `name`.
    pub fn method(name: &str, signature: &str, prefixes: &[&str]) -> Self {
        Self::new(
            name,
            LineMatcher::contains(signature),
            EndRule::Sibling {
                prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
                exclude: None,
            },
        )
    }

    pub fn with_preceding(mut self, matcher: LineMatcher) -> Self {
        self.also_remove_preceding_if = Some(matcher);
        self
    }

    pub fn all_matches(mut self) -> Self {
        self.multiplicity = Multiplicity::All;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn replace_with(mut self, lines: Vec<String>) -> Self {
        self.action = Action::Replace(lines);
        self
    }

    /// Compile matchers and validate the rule. `index` is the spec's plan position.
    pub fn compile(&self, index: usize) -> Result<CompiledRegion> {
        let key = |field: &str| format!("regions[{}].{}", index, field);

        if self.name.trim().is_empty() {
            return Err(Error::config_invalid_value(
                key("name"),
                None,
                "Region name must not be empty",
            ));
        }

        let end = match &self.end {
            EndRule::Before { matcher, offset } => EndCondition::Before {
                matcher: matcher.compile(&key("end.matcher"))?,
                offset: *offset,
            },
            EndRule::Sibling { prefixes, exclude } => {
                if prefixes.is_empty() || prefixes.iter().any(|p| p.trim().is_empty()) {
                    return Err(Error::config_invalid_value(
                        key("end.prefixes"),
                        None,
                        "Sibling rule needs non-empty declaration prefixes",
                    ));
                }
                if exclude.as_deref().is_some_and(|e| e.trim().is_empty()) {
                    return Err(Error::config_invalid_value(
                        key("end.exclude"),
                        exclude.clone(),
                        "Sibling exclude must not be empty; omit it to exclude the region name",
                    ));
                }
                EndCondition::Sibling {
                    prefixes: prefixes.clone(),
                    exclude: exclude.clone().unwrap_or_else(|| self.name.clone()),
                }
            }
            EndRule::Balanced { open, close } => {
                if open.is_empty() || close.is_empty() || open == close {
                    return Err(Error::config_invalid_value(
                        key("end"),
                        Some(format!("{} / {}", open, close)),
                        "Balanced rule needs distinct, non-empty open and close delimiters",
                    ));
                }
                EndCondition::Balanced {
                    open: open.clone(),
                    close: close.clone(),
                }
            }
            EndRule::SingleLine => EndCondition::SingleLine,
        };

        let preceding = self
            .also_remove_preceding_if
            .as_ref()
            .map(|m| m.compile(&key("also_remove_preceding_if")))
            .transpose()?;

        Ok(CompiledRegion {
            name: self.name.clone(),
            start: self.start.compile(&key("start"))?,
            end,
            preceding,
            multiplicity: self.multiplicity,
            required: self.required,
            action: self.action.clone(),
        })
    }
}

/// Evaluable end rule.
#[derive(Debug, Clone)]
pub enum EndCondition {
    Before { matcher: Matcher, offset: isize },
    Sibling { prefixes: Vec<String>, exclude: String },
    Balanced { open: String, close: String },
    SingleLine,
}

impl EndCondition {
    /// Exclusive end for a region opened at `start`, before any offset.
    pub fn find_end(&self, lines: &[String], start: usize) -> Option<usize> {
        match self {
            EndCondition::Before { matcher, .. } => matcher.find_from(lines, start + 1),
            EndCondition::Sibling { prefixes, exclude } => lines
                .iter()
                .enumerate()
                .skip(start + 1)
                .find(|(_, line)| is_sibling(line, prefixes, exclude))
                .map(|(i, _)| i),
            EndCondition::Balanced { open, close } => {
                let mut depth: isize = 0;
                let mut opened = false;
                for (i, line) in lines.iter().enumerate().skip(start) {
                    let opens = line.matches(open.as_str()).count() as isize;
                    let closes = line.matches(close.as_str()).count() as isize;
                    opened |= opens > 0;
                    depth += opens - closes;
                    if opened && depth <= 0 {
                        return Some(i + 1);
                    }
                }
                None
            }
            EndCondition::SingleLine => Some(start + 1),
        }
    }

    pub fn offset(&self) -> isize {
        match self {
            EndCondition::Before { offset, .. } => *offset,
            _ => 0,
        }
    }
}

fn is_sibling(line: &str, prefixes: &[String], exclude: &str) -> bool {
    let trimmed = line.trim_start();
    prefixes.iter().any(|p| trimmed.starts_with(p.as_str())) && !line.contains(exclude)
}

#[derive(Debug, Clone)]
pub struct CompiledRegion {
    pub name: String,
    pub start: Matcher,
    pub end: EndCondition,
    pub preceding: Option<Matcher>,
    pub multiplicity: Multiplicity,
    pub required: bool,
    pub action: Action,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &str) -> Vec<String> {
        src.lines().map(|l| l.to_string()).collect()
    }

    #[test]
    fn sibling_stops_at_next_declaration() {
        let src = lines(
            "    private async Task LoadAsync(string id)\n    {\n        await Task.Delay(1);\n    }\n    private void Next()",
        );
        let region = RegionSpec::method("LoadAsync", "private async Task LoadAsync(", &["private "])
            .compile(0)
            .unwrap();
        assert_eq!(region.end.find_end(&src, 0), Some(4));
    }

    #[test]
    fn sibling_skips_lines_that_mention_own_name() {
        let src = lines(
            "private void Foo()\n{\n}\nprivate void Foo(int x)\n{\n}\nprivate void Bar()",
        );
        let region = RegionSpec::method("Foo", "private void Foo()", &["private "])
            .compile(0)
            .unwrap();
        assert_eq!(region.end.find_end(&src, 0), Some(6));
    }

    #[test]
    fn balanced_counts_nested_blocks() {
        let src = lines("void A() {\n  if (x) {\n  }\n}\nvoid B() {}");
        let end = EndCondition::Balanced {
            open: "{".to_string(),
            close: "}".to_string(),
        };
        assert_eq!(end.find_end(&src, 0), Some(4));
        assert_eq!(end.find_end(&src, 4), Some(5));
    }

    #[test]
    fn balanced_waits_for_first_open() {
        let src = lines("void A()\n{\n}\n");
        let end = EndCondition::Balanced {
            open: "{".to_string(),
            close: "}".to_string(),
        };
        assert_eq!(end.find_end(&src, 0), Some(3));
    }

    #[test]
    fn spec_deserializes_with_defaults() {
        let spec: RegionSpec = serde_json::from_str(
            r#"{
                "name": "DeleteManifestAsync",
                "start": {"contains": "private async Task DeleteManifestAsync()"},
                "end": {"rule": "sibling", "prefixes": ["private "]}
            }"#,
        )
        .unwrap();
        assert_eq!(spec.multiplicity, Multiplicity::First);
        assert!(spec.required);
        assert_eq!(spec.action, Action::Delete);
    }

    #[test]
    fn replace_action_deserializes() {
        let spec: RegionSpec = serde_json::from_str(
            r#"{
                "name": "panel",
                "start": {"contains": "<!-- Right side -->"},
                "end": {"rule": "before", "matcher": {"contains": "Row 2"}, "offset": -1},
                "action": {"replace": ["<views:ArtifactView />"]}
            }"#,
        )
        .unwrap();
        assert_eq!(
            spec.action,
            Action::Replace(vec!["<views:ArtifactView />".to_string()])
        );
        let compiled = spec.compile(0).unwrap();
        assert_eq!(compiled.end.offset(), -1);
    }

    #[test]
    fn empty_sibling_prefixes_rejected() {
        let spec = RegionSpec::new(
            "x",
            LineMatcher::contains("x"),
            EndRule::Sibling {
                prefixes: vec![],
                exclude: None,
            },
        );
        let err = spec.compile(3).unwrap_err();
        assert_eq!(err.details["key"], "regions[3].end.prefixes");
    }

    #[test]
    fn empty_sibling_exclude_rejected() {
        let spec = RegionSpec::new(
            "M",
            LineMatcher::contains("private void M()"),
            EndRule::Sibling {
                prefixes: vec!["private ".to_string()],
                exclude: Some(String::new()),
            },
        );
        let err = spec.compile(0).unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_value");
        assert_eq!(err.details["key"], "regions[0].end.exclude");
    }

    #[test]
    fn misspelled_field_rejected() {
        let result: std::result::Result<RegionSpec, _> = serde_json::from_str(
            r#"{
                "name": "counter",
                "start": {"contains": "X += 1;"},
                "end": {"rule": "single_line"},
                "also_remove_preceeding_if": {"contains": "// c"}
            }"#,
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field `also_remove_preceeding_if`"));
    }
}
