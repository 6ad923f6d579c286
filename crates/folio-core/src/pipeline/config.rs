//! # Pipeline Configuration
//!
//! Serde-backed settings for one pipeline. The kernel only defines and
//! validates the structure; reading it from disk is left to the host.
//!
//! ```toml
//! [site]
//! name = "docs"
//! base_path = "/docs"
//!
//! [content]
//! layout = ["head", "nav", "body"]
//!
//! [modules]
//! disabled = ["analytics"]
//! ```

use crate::types::{FolioError, FolioResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Top-level pipeline settings. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Site identity.
    pub site: SiteConfig,
    /// Output assembly.
    pub content: ContentConfig,
    /// Module selection.
    pub modules: ModulesConfig,
}

impl PipelineConfig {
    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> FolioResult<()> {
        if self.site.name.trim().is_empty() {
            return Err(FolioError::Config("site.name must not be empty".to_string()));
        }
        if !self.site.base_path.starts_with('/') {
            return Err(FolioError::Config(format!(
                "site.base_path must start with '/', got {:?}",
                self.site.base_path
            )));
        }
        if self.content.layout.is_empty() {
            return Err(FolioError::Config(
                "content.layout must name at least one buffer".to_string(),
            ));
        }

        let mut seen = BTreeSet::new();
        for name in &self.content.layout {
            if name.trim().is_empty() {
                return Err(FolioError::Config(
                    "content.layout contains an empty buffer name".to_string(),
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(FolioError::Config(format!(
                    "content.layout lists buffer {name:?} twice"
                )));
            }
        }
        Ok(())
    }
}

/// Site identity, exposed to systems through the `Route` component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Display name of the site.
    pub name: String,
    /// Path prefix every request path is resolved under.
    pub base_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "folio".to_string(),
            base_path: "/".to_string(),
        }
    }
}

/// How content buffers are assembled into output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Buffers concatenated by the output stage, in this order.
    pub layout: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            layout: vec!["head".to_string(), "body".to_string()],
        }
    }
}

/// Module selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModulesConfig {
    /// Names of modules the module manager skips.
    pub disabled: Vec<String>,
}

// =============================================================================
// TESTS
// =============================================================================
