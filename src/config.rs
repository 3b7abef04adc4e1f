//! Runtime configuration.
//!
//! Defaults live in the `Default` impls; a few knobs can be overridden
//! through environment variables.

use std::str::FromStr;

/// Environment variable overriding [`InspectorConfig::chunk_elements`].
pub const ENV_CHUNK_ELEMENTS: &str = "H5LENS_CHUNK_ELEMENTS";
/// Environment variable overriding [`InspectorConfig::preview_threshold`].
pub const ENV_PREVIEW_THRESHOLD: &str = "H5LENS_PREVIEW_THRESHOLD";
/// Environment variable overriding [`InspectorConfig::read_strategy`].
pub const ENV_READ_STRATEGY: &str = "H5LENS_READ_STRATEGY";

/// How dataset contents are pulled from the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadStrategy {
    /// Read bounded hyperslabs along the leading axis.
    #[default]
    Chunked,
    /// Read the whole dataset in one call.
    Whole,
}

impl FromStr for ReadStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chunked" => Ok(ReadStrategy::Chunked),
            "whole" => Ok(ReadStrategy::Whole),
            other => Err(format!("unknown read strategy '{}'", other)),
        }
    }
}

/// Configuration for dataset inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectorConfig {
    /// Upper bound on values read per chunk.
    pub chunk_elements: usize,
    /// Datasets with more values than this get a summarised preview.
    pub preview_threshold: usize,
    /// Values kept at each end of a summarised preview.
    pub edge_items: usize,
    /// Read strategy.
    pub read_strategy: ReadStrategy,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            chunk_elements: 1 << 20,
            preview_threshold: 1000,
            edge_items: 3,
            read_strategy: ReadStrategy::Chunked,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Inspector settings.
    pub inspector: InspectorConfig,
}

impl Config {
    /// Load defaults with overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load defaults with overrides from `lookup`.
    ///
    /// Values that fail to parse are ignored with a warning.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let inspector = &mut config.inspector;

        if let Some(n) = parse_var::<usize, _>(&lookup, ENV_CHUNK_ELEMENTS) {
            if n == 0 {
                tracing::warn!("Ignoring {}=0", ENV_CHUNK_ELEMENTS);
            } else {
                inspector.chunk_elements = n;
            }
        }
        if let Some(n) = parse_var(&lookup, ENV_PREVIEW_THRESHOLD) {
            inspector.preview_threshold = n;
        }
        if let Some(strategy) = parse_var(&lookup, ENV_READ_STRATEGY) {
            inspector.read_strategy = strategy;
        }

        config
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring {}={:?}: {}", key, raw, e);
            None
        },
    }
}
