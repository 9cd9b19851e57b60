//! Facade configuration, persisted as TOML.
//!
//! ```toml
//! timeout_secs = 30
//! max_rows = 100000
//! default_endpoint = "monarch"
//!
//! [endpoints.monarch]
//! url = "https://solr.monarchinitiative.org/solr/golr/"
//!
//! [endpoints.go]
//! url = "http://golr.geneontology.org/solr/"
//! profile = "go-annotation"
//! closure = "regulates"
//!
//! [routes]
//! function = "go"
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::schema::{GoClosure, SchemaProfile};

/// Monarch Golr association index.
pub const MONARCH_GOLR_URL: &str = "https://solr.monarchinitiative.org/solr/golr/";
/// Gene Ontology annotation index.
pub const GO_GOLR_URL: &str = "http://golr.geneontology.org/solr/";

/// Name of a schema profile in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileName {
    #[default]
    Golr,
    GoAnnotation,
}

/// One search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Base URL of the Solr core, e.g. `http://host:8983/solr/golr/`.
    pub url: String,
    #[serde(default)]
    pub profile: ProfileName,
    /// Object closure used by the `go-annotation` profile.
    #[serde(default)]
    pub closure: GoClosure,
}

impl EndpointConfig {
    pub fn schema(&self) -> SchemaProfile {
        match self.profile {
            ProfileName::Golr => SchemaProfile::Golr,
            ProfileName::GoAnnotation => SchemaProfile::GoAnnotation {
                closure: self.closure,
            },
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GolrConfig {
    /// Per-request timeout in seconds. Requests never block longer.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Row count sent for unlimited (`rows < 0`) queries.
    #[serde(default = "default_max_rows")]
    pub max_rows: u64,
    #[serde(default = "default_facet_limit")]
    pub default_facet_limit: u32,
    #[serde(default = "default_facet_mincount")]
    pub default_facet_mincount: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Endpoint used when no route matches the object category.
    #[serde(default = "default_endpoint")]
    pub default_endpoint: String,
    #[serde(default = "default_endpoints")]
    pub endpoints: BTreeMap<String, EndpointConfig>,
    /// Object category to endpoint name.
    #[serde(default = "default_routes")]
    pub routes: BTreeMap<String, String>,
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_max_rows() -> u64 {
    100_000
}
fn default_facet_limit() -> u32 {
    25
}
fn default_facet_mincount() -> u32 {
    1
}
fn default_user_agent() -> String {
    format!("golr-assoc/{}", env!("CARGO_PKG_VERSION"))
}
fn default_endpoint() -> String {
    "monarch".into()
}
fn default_endpoints() -> BTreeMap<String, EndpointConfig> {
    BTreeMap::from([
        (
            "monarch".to_string(),
            EndpointConfig {
                url: MONARCH_GOLR_URL.into(),
                profile: ProfileName::Golr,
                closure: GoClosure::default(),
            },
        ),
        (
            "go".to_string(),
            EndpointConfig {
                url: GO_GOLR_URL.into(),
                profile: ProfileName::GoAnnotation,
                closure: GoClosure::Regulates,
            },
        ),
    ])
}
fn default_routes() -> BTreeMap<String, String> {
    BTreeMap::from([("function".to_string(), "go".to_string())])
}

impl Default for GolrConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_rows: default_max_rows(),
            default_facet_limit: default_facet_limit(),
            default_facet_mincount: default_facet_mincount(),
            user_agent: default_user_agent(),
            default_endpoint: default_endpoint(),
            endpoints: default_endpoints(),
            routes: default_routes(),
        }
    }
}

impl GolrConfig {
    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, "<inline>")
    }

    fn parse(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: GolrConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid {
            message: format!("failed to serialize config: {e}"),
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                message: "timeout_secs must be > 0".into(),
            });
        }
        if self.max_rows == 0 {
            return Err(ConfigError::Invalid {
                message: "max_rows must be > 0".into(),
            });
        }
        if self.default_facet_mincount == 0 {
            return Err(ConfigError::Invalid {
                message: "default_facet_mincount must be > 0".into(),
            });
        }
        if !self.endpoints.contains_key(&self.default_endpoint) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "default_endpoint \"{}\" has no [endpoints] entry",
                    self.default_endpoint
                ),
            });
        }
        for (category, target) in &self.routes {
            if !self.endpoints.contains_key(target) {
                return Err(ConfigError::Invalid {
                    message: format!("route \"{category}\" targets unknown endpoint \"{target}\""),
                });
            }
        }
        for (name, endpoint) in &self.endpoints {
            if !endpoint.url.starts_with("http://") && !endpoint.url.starts_with("https://") {
                return Err(ConfigError::Invalid {
                    message: format!(
                        "endpoint \"{name}\" url must start with http:// or https://, got \"{}\"",
                        endpoint.url
                    ),
                });
            }
        }
        Ok(())
    }
}
