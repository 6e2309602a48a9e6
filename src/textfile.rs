//! Line-oriented config file mutation
//!
//! The hosts file, `.npmrc`, the Apache config, and `php.ini` are all plain
//! text files edited as collections of lines. `LineFile` loads a file into
//! memory, applies mutations, and writes the result back in one pass.
//! Presence checks are literal substring matches over single lines, so every
//! append is idempotent: repeating a mutation leaves the file unchanged.

use crate::ProvisionError;
use std::path::{Path, PathBuf};
use tokio::fs;

/// A text file held in memory as a list of lines
#[derive(Debug)]
pub struct LineFile {
    path: PathBuf,
    lines: Vec<String>,
    dirty: bool,
}

impl LineFile {
    /// Load a file, treating a missing file as empty
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, ProvisionError> {
        let path = path.into();
        let lines = match fs::read_to_string(&path).await {
            Ok(text) => text.lines().map(String::from).collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            lines,
            dirty: false,
        })
    }

    /// The file path this handle writes back to
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Whether any line contains the literal pattern
    pub fn contains(&self, pattern: &str) -> bool {
        self.lines.iter().any(|line| line.contains(pattern))
    }

    /// Whether any line equals `exact` after trimming
    pub fn contains_line(&self, exact: &str) -> bool {
        self.lines.iter().any(|line| line.trim() == exact.trim())
    }

    /// Append content at the end of the file; multi-line content is split
    pub fn append(&mut self, content: &str) {
        if content.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines.extend(content.lines().map(String::from));
        }
        self.dirty = true;
    }

    /// Append content only if no line contains the literal pattern.
    /// Returns true when the append happened.
    pub fn append_if_absent(&mut self, pattern: &str, content: &str) -> bool {
        if self.contains(pattern) {
            return false;
        }
        self.append(content);
        true
    }

    /// Replace every line whose trimmed content starts with `prefix` by the
    /// replacement line. Returns how many lines changed.
    pub fn replace_prefixed(&mut self, prefix: &str, replacement: &str) -> usize {
        let mut replaced = 0;
        for line in &mut self.lines {
            if line.trim_start().starts_with(prefix) && line.trim() != replacement {
                *line = replacement.to_string();
                replaced += 1;
            }
        }
        if replaced > 0 {
            self.dirty = true;
        }
        replaced
    }

    /// Strip a leading comment marker from the line carrying `directive`.
    /// Returns true when a line was uncommented.
    pub fn uncomment(&mut self, marker: char, directive: &str) -> bool {
        for line in &mut self.lines {
            let trimmed = line.trim_start();
            if let Some(rest) = trimmed.strip_prefix(marker) {
                if rest.trim_start() == directive {
                    *line = directive.to_string();
                    self.dirty = true;
                    return true;
                }
            }
        }
        false
    }

    /// Rewrite a `KEY=value` line in place if the key is present.
    /// Returns true when the key exists (changed or already equal).
    pub fn set_key(&mut self, key: &str, value: &str) -> bool {
        let needle = format!("{key}=");
        for line in &mut self.lines {
            if line.starts_with(&needle) {
                let desired = format!("{key}={value}");
                if *line != desired {
                    *line = desired;
                    self.dirty = true;
                }
                return true;
            }
        }
        false
    }

    /// Whether any mutation changed the in-memory content
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the lines back, creating parent directories as needed
    pub async fn save(&mut self) -> Result<(), ProvisionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let text = if self.lines.is_empty() {
            String::new()
        } else {
            let mut joined = self.lines.join("\n");
            joined.push('\n');
            joined
        };
        fs::write(&self.path, text).await?;
        self.dirty = false;
        Ok(())
    }
}
