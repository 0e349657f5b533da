// ABOUTME: Parser for key=value environment files.
// ABOUTME: Handles comments, export prefixes and quoted values without touching process env.

use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvFileError {
    #[error("line {line}: expected KEY=value, found {content:?}")]
    MissingSeparator { line: usize, content: String },

    #[error("line {line}: invalid variable name {key:?}")]
    InvalidKey { line: usize, key: String },

    #[error("line {line}: unterminated quoted value")]
    UnterminatedQuote { line: usize },

    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },
}

/// Variables read from an environment file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    vars: BTreeMap<String, String>,
}

impl EnvFile {
    pub fn load(path: &Path) -> Result<Self, EnvFileError> {
        let content = std::fs::read_to_string(path).map_err(|e| EnvFileError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, EnvFileError> {
        let mut vars = BTreeMap::new();

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line = line
                .strip_prefix("export ")
                .map(str::trim_start)
                .unwrap_or(line);
            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| EnvFileError::MissingSeparator {
                    line: line_no,
                    content: line.to_string(),
                })?;

            let key = key.trim();
            if !is_valid_key(key) {
                return Err(EnvFileError::InvalidKey {
                    line: line_no,
                    key: key.to_string(),
                });
            }

            let value = parse_value(value.trim(), line_no)?;
            vars.insert(key.to_string(), value);
        }

        Ok(Self { vars })
    }

    /// Look up a variable. Empty and whitespace-only values are treated as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// First non-empty value among `keys`.
    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|k| self.get(k))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvFile {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_value(value: &str, line: usize) -> Result<String, EnvFileError> {
    if let Some(rest) = value.strip_prefix('"') {
        let inner = rest
            .strip_suffix('"')
            .ok_or(EnvFileError::UnterminatedQuote { line })?;
        return Ok(unescape_double_quoted(inner));
    }

    if let Some(rest) = value.strip_prefix('\'') {
        let inner = rest
            .strip_suffix('\'')
            .ok_or(EnvFileError::UnterminatedQuote { line })?;
        return Ok(inner.to_string());
    }

    Ok(value.to_string())
}

fn unescape_double_quoted(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
