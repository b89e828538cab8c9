//! Line-based view of a text file.
//!
//! Lines are stored without terminators. The document remembers which
//! terminator the file used and whether it ended with one, so rendering
//! reproduces a single consistent style and replacement blocks inherit it.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    Lf,
    Crlf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Crlf => "\r\n",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDocument {
    pub lines: Vec<String>,
    pub ending: LineEnding,
    pub trailing_newline: bool,
}

impl LineDocument {
    /// Split `content` into lines, picking the majority terminator.
    ///
    /// A file with no terminators at all is treated as LF.
    pub fn parse(content: &str) -> Self {
        let crlf = content.matches("\r\n").count();
        let lf = content.matches('\n').count() - crlf;
        let ending = if crlf > lf {
            LineEnding::Crlf
        } else {
            LineEnding::Lf
        };

        let trailing_newline = content.ends_with('\n');

        // Only a `\r` that precedes `\n` belongs to the terminator.
        let lines = content
            .split_inclusive('\n')
            .map(|line| {
                line.strip_suffix("\r\n")
                    .or_else(|| line.strip_suffix('\n'))
                    .unwrap_or(line)
                    .to_string()
            })
            .collect();

        Self {
            lines,
            ending,
            trailing_newline,
        }
    }

    /// Same terminator policy, new body.
    pub fn with_lines(&self, lines: Vec<String>) -> Self {
        Self {
            lines,
            ending: self.ending,
            trailing_newline: self.trailing_newline,
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn render(&self) -> String {
        if self.lines.is_empty() {
            return String::new();
        }
        let sep = self.ending.as_str();
        let mut out = self.lines.join(sep);
        if self.trailing_newline {
            out.push_str(sep);
        }
        out
    }
}
