//! Template substitution.
//!
//! A template is plain text with `{{ field }}` placeholders naming
//! [`StatsSummary`] fields in camelCase. There is no other syntax: anything
//! derived has to be computed before it gets here.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::RenderError;
use crate::stats::StatsSummary;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("placeholder pattern is valid")
});

#[derive(Debug, Clone)]
pub struct Template {
    path: PathBuf,
    source: String,
}

impl Template {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| RenderError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_source(path, source))
    }

    pub fn from_source(path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn render(&self, summary: &StatsSummary) -> Result<String, RenderError> {
        let fields = serde_json::to_value(summary)?;

        let mut out = String::with_capacity(self.source.len());
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(&self.source) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let value = fields
                .get(name.as_str())
                .ok_or_else(|| RenderError::UnknownField(name.as_str().to_string()))?;

            out.push_str(&self.source[last..whole.start()]);
            push_value(&mut out, value);
            last = whole.end();
        }
        out.push_str(&self.source[last..]);

        Ok(out)
    }
}

fn push_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push_str(s),
        other => out.push_str(&other.to_string()),
    }
}
