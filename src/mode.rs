//! Reasoning variants and verbosity.
//!
//! A [`Mode`] is the set of enabled [`Variant`]s. The reasoner only ever asks
//! whether a variant is enabled; the algorithm's shape never changes.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A policy that adjusts propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Dispensable items are ignored by their parents' predictions and are
    /// never expected.
    Dispensable,
    /// A specific part predicted present overrides unevidenced sibling parts.
    Specific,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::Dispensable, Variant::Specific];
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Variant::Dispensable => write!(f, "dispensable"),
            Variant::Specific => write!(f, "specific"),
        }
    }
}

impl std::str::FromStr for Variant {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dispensable" => Ok(Variant::Dispensable),
            "specific" => Ok(Variant::Specific),
            other => Err(ConfigError::UnknownVariant {
                name: other.to_string(),
            }),
        }
    }
}

/// The set of enabled variants. The default (empty) mode is plain reasoning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mode {
    variants: BTreeSet<Variant>,
}

impl Mode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variants<I>(variants: I) -> Self
    where
        I: IntoIterator<Item = Variant>,
    {
        Self {
            variants: variants.into_iter().collect(),
        }
    }

    pub fn contains(&self, variant: Variant) -> bool {
        self.variants.contains(&variant)
    }

    /// Enable the given variants, keeping the ones already enabled.
    pub fn add_variants<I>(&mut self, variants: I)
    where
        I: IntoIterator<Item = Variant>,
    {
        self.variants.extend(variants);
    }

    pub fn remove_variants<I>(&mut self, variants: I)
    where
        I: IntoIterator<Item = Variant>,
    {
        for v in variants {
            self.variants.remove(&v);
        }
    }

    /// Enabled variants, in a stable order.
    pub fn variants(&self) -> impl Iterator<Item = Variant> + '_ {
        self.variants.iter().copied()
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.variants.is_empty() {
            return write!(f, "normal");
        }
        let names: Vec<String> = self.variants.iter().map(Variant::to_string).collect();
        write!(f, "normal+{}", names.join("+"))
    }
}

/// How chatty reasoning runs are.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Quiet,
    #[default]
    Low,
    Medium,
    High,
}

impl Verbosity {
    /// `tracing` filter directive for this level.
    pub fn filter(self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Low => "info",
            Verbosity::Medium => "debug",
            Verbosity::High => "trace",
        }
    }
}

impl std::fmt::Display for Verbosity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verbosity::Quiet => write!(f, "quiet"),
            Verbosity::Low => write!(f, "low"),
            Verbosity::Medium => write!(f, "medium"),
            Verbosity::High => write!(f, "high"),
        }
    }
}
