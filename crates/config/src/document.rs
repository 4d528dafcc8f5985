//! In-memory representation of one config document: an ordered sequence of
//! lines, preserving comments and blank lines exactly, with `KEY=VALUE`
//! entries addressable by key (§4.1, §6).

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Scalar(String),
    /// `name=(a b c)` syntax (§4.1).
    Array(Vec<String>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(s) => write!(f, "\"{s}\""),
            Value::Array(items) => write!(f, "({})", items.join(" ")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Blank,
    /// Full original line text, including the leading `#`.
    Comment(String),
    Entry { key: String, raw_value: String },
    /// Line that doesn't match `KEY=VALUE` and isn't blank or a comment.
    /// Preserved verbatim but ignored by `get`/`set`/`remove`, and still a
    /// valid anchor target.
    Other(String),
}

#[derive(Debug, Clone, Default)]
pub struct ConfigDocument {
    lines: Vec<Line>,
}

fn is_valid_key(s: &str) -> bool {
    !s.is_empty()
        && s.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if let Some(inner) = trimmed.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Value::Array(inner.split_whitespace().map(str::to_string).collect())
    } else if let Some(inner) = trimmed.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        Value::Scalar(inner.to_string())
    } else {
        Value::Scalar(trimmed.to_string())
    }
}

impl ConfigDocument {
    pub fn parse(text: &str) -> Self {
        let lines = text
            .lines()
            .map(|line| {
                let trimmed = line.trim_start();
                if trimmed.is_empty() {
                    Line::Blank
                } else if trimmed.starts_with('#') {
                    Line::Comment(line.to_string())
                } else if let Some((key, rest)) = line.split_once('=') {
                    let key = key.trim();
                    if is_valid_key(key) {
                        Line::Entry {
                            key: key.to_string(),
                            raw_value: rest.to_string(),
                        }
                    } else {
                        Line::Other(line.to_string())
                    }
                } else {
                    Line::Other(line.to_string())
                }
            })
            .collect();
        ConfigDocument { lines }
    }

    /// `get(doc, key)`: value is the verbatim RHS with surrounding double
    /// quotes stripped; `None` if absent. Comment lines are never matched.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.lines.iter().find_map(|line| match line {
            Line::Entry { key: k, raw_value } if k == key => Some(parse_value(raw_value)),
            _ => None,
        })
    }

    /// `set(doc, key, value, anchor?)`: idempotent upsert. Replaces in
    /// place if present; else inserts after the line whose exact text
    /// (including a leading `#` for comment anchors) matches `anchor`;
    /// else appends to EOF.
    pub fn set(&mut self, key: &str, value: Value, anchor: Option<&str>) {
        let raw_value = value.to_string();

        if let Some(pos) = self.lines.iter().position(|line| {
            matches!(line, Line::Entry { key: k, .. } if k == key)
        }) {
            self.lines[pos] = Line::Entry {
                key: key.to_string(),
                raw_value,
            };
            return;
        }

        let entry = Line::Entry {
            key: key.to_string(),
            raw_value,
        };

        if let Some(anchor) = anchor {
            if let Some(pos) = self.lines.iter().position(|line| match line {
                Line::Comment(text) | Line::Other(text) => text.trim() == anchor,
                _ => false,
            }) {
                self.lines.insert(pos + 1, entry);
                return;
            }
        }

        self.lines.push(entry);
    }

    /// `remove(doc, key)`: no-op if absent, else removes the single
    /// matching line.
    pub fn remove(&mut self, key: &str) {
        if let Some(pos) = self.lines.iter().position(|line| {
            matches!(line, Line::Entry { key: k, .. } if k == key)
        }) {
            self.lines.remove(pos);
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| match line {
            Line::Entry { key, .. } => Some(key.as_str()),
            _ => None,
        })
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                Line::Blank => {}
                Line::Comment(text) | Line::Other(text) => out.push_str(text),
                Line::Entry { key, raw_value } => {
                    out.push_str(key);
                    out.push('=');
                    out.push_str(raw_value);
                }
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
