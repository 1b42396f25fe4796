use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid remove_exports config: {message:}")]
    InvalidJson { message: String },
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Syntax {
    #[serde(rename = "ecmascript")]
    #[default]
    Ecmascript,
    #[serde(rename = "typescript")]
    Typescript,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub syntax: Syntax,
    /// jsx for ecmascript, tsx for typescript
    pub jsx: bool,
    pub decorators: bool,
    /// keep comments attached to the surviving statements
    pub comments: bool,
    pub minify: bool,
    pub ascii_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            syntax: Syntax::Ecmascript,
            jsx: false,
            decorators: true,
            comments: false,
            minify: false,
            ascii_only: false,
        }
    }
}

impl Config {
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| {
            anyhow!(ConfigError::InvalidJson {
                message: e.to_string()
            })
        })
    }

    pub fn typescript() -> Self {
        Self {
            syntax: Syntax::Typescript,
            ..Default::default()
        }
    }

    pub(crate) fn file_name(&self) -> &'static str {
        match (self.syntax, self.jsx) {
            (Syntax::Ecmascript, false) => "input.js",
            (Syntax::Ecmascript, true) => "input.jsx",
            (Syntax::Typescript, false) => "input.ts",
            (Syntax::Typescript, true) => "input.tsx",
        }
    }
}
