//! Single-line predicates.
//!
//! `LineMatcher` is the serializable form that appears in plans;
//! `Matcher` is the compiled form the scanner evaluates (regexes are built
//! once per plan, never per line).

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineMatcher {
    /// Line contains the literal substring anywhere.
    Contains(String),
    /// Line, with leading whitespace trimmed, begins with the literal.
    StartsWith(String),
    /// Line matches the regular expression.
    Pattern(String),
    /// Line is empty or whitespace only.
    Blank,
    Any(Vec<LineMatcher>),
    All(Vec<LineMatcher>),
    Not(Box<LineMatcher>),
}

impl LineMatcher {
    pub fn contains(needle: impl Into<String>) -> Self {
        LineMatcher::Contains(needle.into())
    }

    pub fn starts_with(prefix: impl Into<String>) -> Self {
        LineMatcher::StartsWith(prefix.into())
    }

    pub fn pattern(pattern: impl Into<String>) -> Self {
        LineMatcher::Pattern(pattern.into())
    }

    /// Compile into an evaluable matcher. `field` names the plan key for errors.
    pub fn compile(&self, field: &str) -> Result<Matcher> {
        Ok(match self {
            LineMatcher::Contains(s) => {
                ensure_non_empty(field, s)?;
                Matcher::Contains(s.clone())
            }
            LineMatcher::StartsWith(s) => {
                ensure_non_empty(field, s)?;
                Matcher::StartsWith(s.clone())
            }
            LineMatcher::Pattern(p) => {
                let re = Regex::new(p).map_err(|e| {
                    Error::config_invalid_value(field, Some(p.clone()), e.to_string())
                })?;
                Matcher::Pattern(re)
            }
            LineMatcher::Blank => Matcher::Blank,
            LineMatcher::Any(items) => Matcher::Any(compile_all(field, items)?),
            LineMatcher::All(items) => Matcher::All(compile_all(field, items)?),
            LineMatcher::Not(inner) => Matcher::Not(Box::new(inner.compile(field)?)),
        })
    }
}

fn ensure_non_empty(field: &str, literal: &str) -> Result<()> {
    if literal.is_empty() {
        return Err(Error::config_invalid_value(
            field,
            None,
            "Literal matcher must not be empty (it would match every line)",
        ));
    }
    Ok(())
}

fn compile_all(field: &str, items: &[LineMatcher]) -> Result<Vec<Matcher>> {
    if items.is_empty() {
        return Err(Error::config_invalid_value(
            field,
            None,
            "Combinator needs at least one matcher",
        ));
    }
    items.iter().map(|m| m.compile(field)).collect()
}

#[derive(Debug, Clone)]
pub enum Matcher {
    Contains(String),
    StartsWith(String),
    Pattern(Regex),
    Blank,
    Any(Vec<Matcher>),
    All(Vec<Matcher>),
    Not(Box<Matcher>),
}

impl Matcher {
    pub fn is_match(&self, line: &str) -> bool {
        match self {
            Matcher::Contains(s) => line.contains(s.as_str()),
            Matcher::StartsWith(s) => line.trim_start().starts_with(s.as_str()),
            Matcher::Pattern(re) => re.is_match(line),
            Matcher::Blank => line.trim().is_empty(),
            Matcher::Any(items) => items.iter().any(|m| m.is_match(line)),
            Matcher::All(items) => items.iter().all(|m| m.is_match(line)),
            Matcher::Not(inner) => !inner.is_match(line),
        }
    }

    /// Index of the first line at or after `from` that matches.
    pub fn find_from(&self, lines: &[String], from: usize) -> Option<usize> {
        lines
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, line)| self.is_match(line))
            .map(|(i, _)| i)
    }
}
