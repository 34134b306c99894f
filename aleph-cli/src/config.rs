//! Aleph configuration loading from `.alephrc.toml`.
//!
//! Configuration is optional. A missing or unreadable file yields defaults;
//! command-line flags override anything set here.
//!
//! # Example Configuration
//!
//! ```toml
//! [endpoint]
//! url = "http://localhost:7878/query"
//! timeout_secs = 30
//!
//! [graph]
//! type_display = "nodes"
//! aggregate = false
//!
//! [output]
//! format = "table"
//! color = true
//! ```

use aleph_core::{BuilderConfig, TypeDisplayMode};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::constants::{CONFIG_FILE, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};

/// Root configuration structure loaded from `.alephrc.toml`.
#[derive(Debug, Deserialize, Default)]
pub struct AlephConfig {
    /// SPARQL endpoint settings.
    #[serde(default)]
    pub endpoint: EndpointSettings,

    /// Builder options.
    #[serde(default)]
    pub graph: GraphSettings,

    /// Output formatting preferences.
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Deserialize, Default)]
pub struct EndpointSettings {
    /// Query endpoint; updates go to the sibling `/update` path.
    #[serde(default)]
    pub url: Option<String>,

    /// Per-request timeout, in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct GraphSettings {
    /// `tags`, `nodes` or `hidden`.
    #[serde(default)]
    pub type_display: Option<TypeDisplayMode>,

    /// Emit one all-inclusive state instead of a timeline.
    #[serde(default)]
    pub aggregate: Option<bool>,
}

/// Output formatting preferences.
///
/// Distinct from the runtime `OutputConfig` in the output module, which
/// handles actual rendering.
#[derive(Debug, Deserialize, Default)]
pub struct OutputSettings {
    /// Valid values: `table`, `json`
    #[serde(default)]
    pub format: Option<String>,

    /// Defaults to `true` when stdout is a TTY.
    #[serde(default)]
    pub color: Option<bool>,
}

impl AlephConfig {
    /// Load configuration from `.alephrc.toml` in the given directory.
    ///
    /// Parse errors are logged as warnings and defaults are used.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse {}: {}", CONFIG_FILE, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", CONFIG_FILE, e);
                }
            }
        }
        Self::default()
    }

    pub fn endpoint_url(&self) -> &str {
        self.endpoint.url.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.endpoint.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Builder options from the file, with per-field overrides.
    pub fn builder_config(
        &self,
        type_display: Option<TypeDisplayMode>,
        aggregate: bool,
    ) -> BuilderConfig {
        BuilderConfig::new(
            type_display
                .or(self.graph.type_display)
                .unwrap_or_default(),
            aggregate || self.graph.aggregate.unwrap_or(false),
        )
    }

    /// Get the default output format, if configured.
    pub fn default_format(&self) -> Option<&str> {
        self.output.format.as_deref()
    }

    /// Returns the configured value, or `None` to use auto-detection.
    pub fn use_color(&self) -> Option<bool> {
        self.output.color
    }
}
