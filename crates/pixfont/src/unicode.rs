//! Codepoint display names, read from `UnicodeData.txt`-style tables.
use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::error::Result;

/// Read-only `codepoint -> name` lookup, used only to label glyphs.
#[derive(Clone, Debug, Default)]
pub struct UnicodeNames {
    names: HashMap<u32, String>,
}

impl UnicodeNames {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse `codepoint;name;...` lines. Comments after `#`, range entries
    /// and lines without a valid hex codepoint or name are skipped.
    pub fn parse(text: &str) -> Self {
        let mut names = HashMap::new();
        for line in text.lines() {
            let data = line.split('#').next().unwrap_or_default();
            let mut fields = data.split(';');
            let (Some(codepoint), Some(name)) = (fields.next(), fields.next()) else {
                continue;
            };
            let codepoint = codepoint.trim();
            if codepoint.contains('.') {
                continue;
            }
            let Ok(codepoint) = u32::from_str_radix(codepoint, 16) else {
                continue;
            };
            names.insert(codepoint, name.trim().to_string());
        }
        debug!(entries = names.len(), "parsed unicode names");
        Self { names }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    pub fn get(&self, codepoint: u32) -> Option<&str> {
        self.names.get(&codepoint).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(u32, String)> for UnicodeNames {
    fn from_iter<I: IntoIterator<Item = (u32, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}
