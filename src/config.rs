//! Reasoner configuration, parsed from `verdict.toml`.
//!
//! ```toml
//! variants = ["dispensable", "specific"]
//! verbosity = "medium"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::mode::{Mode, Variant, Verbosity};

/// Options a reasoner is built from. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReasonerConfig {
    /// Enabled reasoning variants.
    pub variants: Vec<Variant>,
    /// Logging verbosity used when no `RUST_LOG` filter is set.
    pub verbosity: Verbosity,
}

impl ReasonerConfig {
    /// Parse a TOML document. `origin` only labels errors.
    pub fn from_toml(text: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text, &path.display().to_string())
    }

    pub fn mode(&self) -> Mode {
        Mode::with_variants(self.variants.iter().copied())
    }
}
