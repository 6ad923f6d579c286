//! # Configuration Loading
//!
//! Reads a [`PipelineConfig`] from a TOML file. A missing `--config` flag
//! means defaults; a given path that cannot be read or parsed is an error.

use folio_core::{FolioError, FolioResult, PipelineConfig};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Maximum configuration file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Resolve `path` to an existing regular file.
fn validate_file_path(path: &Path) -> FolioResult<PathBuf> {
    let canonical = path.canonicalize().map_err(|e| {
        FolioError::Config(format!("Invalid config path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(FolioError::Config(format!(
            "Config path '{}' is not a regular file",
            path.display()
        )));
    }

    let metadata = std::fs::metadata(&canonical)
        .map_err(|e| FolioError::Config(format!("Cannot read config metadata: {}", e)))?;
    if metadata.len() > MAX_CONFIG_FILE_SIZE {
        return Err(FolioError::Config(format!(
            "Config size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_CONFIG_FILE_SIZE
        )));
    }

    Ok(canonical)
}

/// Parse and validate a TOML document.
pub fn parse_config(source: &str) -> FolioResult<PipelineConfig> {
    let config: PipelineConfig = toml::from_str(source)
        .map_err(|e| FolioError::Config(format!("Invalid config: {}", e)))?;
    config.validate()?;
    Ok(config)
}

/// Load the configuration at `path`, or defaults when `path` is `None`.
pub fn load_config(path: Option<&Path>) -> FolioResult<PipelineConfig> {
    let Some(path) = path else {
        debug!("no config file given; using defaults");
        return Ok(PipelineConfig::default());
    };

    let canonical = validate_file_path(path)?;
    let source = std::fs::read_to_string(&canonical).map_err(|e| {
        FolioError::Config(format!("Cannot read config '{}': {}", path.display(), e))
    })?;
    let config = parse_config(&source)?;
    debug!(path = %canonical.display(), site = %config.site.name, "config loaded");
    Ok(config)
}

/// Serialize `config` back to TOML.
pub fn render_config(config: &PipelineConfig) -> FolioResult<String> {
    toml::to_string_pretty(config)
        .map_err(|e| FolioError::Config(format!("Cannot serialize config: {}", e)))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_use_defaults() {
        let config = parse_config("[site]\nname = \"docs\"\n").expect("config");
        assert_eq!(config.site.name, "docs");
        assert_eq!(config.site.base_path, "/");
        assert_eq!(config.content.layout, vec!["head", "body"]);
    }

    #[test]
    fn invalid_values_rejected() {
        assert!(matches!(
            parse_config("[content]\nlayout = []\n"),
            Err(FolioError::Config(_))
        ));
        assert!(matches!(
            parse_config("[site]\nname = 7\n"),
            Err(FolioError::Config(_))
        ));
    }

    #[test]
    fn rendered_config_parses_back() {
        let mut config = PipelineConfig::default();
        config.modules.disabled.push("forms".to_string());

        let text = render_config(&config).expect("render");
        assert_eq!(parse_config(&text).expect("parse"), config);
    }

    #[test]
    fn no_path_means_defaults() {
        assert_eq!(load_config(None), Ok(PipelineConfig::default()));
    }
}
