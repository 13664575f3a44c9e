use regex::Regex;

use crate::error::ConfigError;

/// Case-insensitive substring search over a fixed keyword list.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    keywords: Vec<String>,
}

impl KeywordMatcher {
    /// Keywords are lower-cased; blank entries are dropped.
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        let keywords = keywords
            .iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    /// `text` must already be lower-cased.
    pub fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }
}

/// Class that `.` expands to: any character except a line terminator
/// (`\n`, `\r`, NEL, LINE SEPARATOR, PARAGRAPH SEPARATOR).
const ANY_BUT_LINE_TERMINATOR: &str = r"[^\n\r\x{85}\x{2028}\x{2029}]";

/// A regex that must match the whole input, not just a substring of it.
///
/// A bare `.` never matches a line terminator, so a `.*`-wrapped pattern
/// does not match text that spans several lines.
#[derive(Debug, Clone)]
pub struct FullMatchPattern {
    source: String,
    regex: Regex,
}

impl FullMatchPattern {
    pub fn new(name: &str, pattern: &str) -> Result<Self, ConfigError> {
        let anchored = format!("^(?:{})$", expand_dots(pattern));
        let regex = Regex::new(&anchored).map_err(|e| ConfigError::InvalidPattern {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// True when the entire `text` matches.
    pub fn is_full_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// The pattern as configured, before anchoring.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Rewrites every unescaped `.` outside a character class.
fn expand_dots(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    let mut class_depth = 0usize;

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push(c);
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            '[' => {
                class_depth += 1;
                out.push(c);
                // A `]` right after the opening bracket (or `[^`) is literal.
                if chars.peek() == Some(&'^') {
                    out.push('^');
                    chars.next();
                }
                if chars.peek() == Some(&']') {
                    out.push(']');
                    chars.next();
                }
            }
            ']' if class_depth > 0 => {
                class_depth -= 1;
                out.push(c);
            }
            '.' if class_depth == 0 => out.push_str(ANY_BUT_LINE_TERMINATOR),
            _ => out.push(c),
        }
    }

    out
}
