//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::document::{self, Format};
use crate::config::error::ConfigError;
use crate::config::schema::RootConfig;
use crate::config::validation::validate_document;

/// Knobs for a single load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Reject unknown keys instead of preserving them.
    pub strict: bool,
}

impl LoadOptions {
    pub fn strict() -> Self {
        Self { strict: true }
    }
}

/// Load and validate configuration from a TOML or JSON file.
pub fn load_config(path: &Path) -> Result<RootConfig, ConfigError> {
    load_config_with(path, LoadOptions::default())
}

/// Like [`load_config`], with explicit options.
pub fn load_config_with(path: &Path, options: LoadOptions) -> Result<RootConfig, ConfigError> {
    let format =
        Format::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), %format, "Read configuration source");
    load_config_str(&content, format, options)
}

/// Load and validate configuration from an in-memory document.
pub fn load_config_str(
    text: &str,
    format: Format,
    options: LoadOptions,
) -> Result<RootConfig, ConfigError> {
    let entries = document::parse(text, format).map_err(ConfigError::MalformedDocument)?;
    let config = validate_document(entries, options)?;

    tracing::info!(
        networks = config.networks().len(),
        compiler = %config.compiler().name(),
        compiler_version = %config.compiler().version(),
        extensions = config.extensions().len(),
        strict = options.strict,
        "Configuration loaded"
    );

    Ok(config)
}

impl RootConfig {
    /// Render back to the canonical TOML document.
    ///
    /// Fails if an opaque section holds a value TOML cannot express (`null`).
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Render back to the canonical JSON document.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Render in `format`.
    pub fn to_document(&self, format: Format) -> Result<String, ConfigError> {
        match format {
            Format::Toml => self.to_toml_string(),
            Format::Json => self.to_json_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::NetworkId;

    const TRUFFLE_STYLE: &str = r#"
        [networks.development]
        host = "127.0.0.1"
        port = 8545
        network_id = "5777"

        [networks.loc_prova_prova]
        network_id = "*"
        port = 8545
        host = "127.0.0.1"

        [mocha]

        [compilers.solc]
        version = "0.8.21"
    "#;

    #[test]
    fn test_truffle_style_document() {
        let config = load_config_str(TRUFFLE_STYLE, Format::Toml, LoadOptions::default()).unwrap();

        assert_eq!(config.networks().len(), 2);
        let dev = config.network("development").unwrap();
        assert_eq!(dev.port(), 8545);
        assert_eq!(dev.network_id(), &NetworkId::Id("5777".into()));
        assert!(config.network("loc_prova_prova").unwrap().network_id().is_wildcard());
        assert!(config.test_runner_options().is_empty());
        assert_eq!(config.compiler().name(), "solc");
        assert_eq!(config.compiler().version(), "0.8.21");
    }

    #[test]
    fn test_canonical_rendering() {
        let config = load_config_str(TRUFFLE_STYLE, Format::Toml, LoadOptions::default()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&config.to_json_string().unwrap()).unwrap();

        assert_eq!(json["networks"]["development"]["networkId"], "5777");
        assert_eq!(json["compiler"]["version"], "0.8.21");
        assert_eq!(json["testRunnerOptions"], serde_json::json!({}));
        assert!(json.get("compilers").is_none());
        assert!(json.get("mocha").is_none());
    }

    #[test]
    fn test_toml_cannot_render_null() {
        let config = load_config_str(
            r#"{"networks": {}, "compiler": {"version": "1"}, "x-extra": null}"#,
            Format::Json,
            LoadOptions::default(),
        )
        .unwrap();
        assert!(matches!(config.to_toml_string(), Err(ConfigError::Serialize(_))));
        assert!(config.to_json_string().is_ok());
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_config(Path::new("truffle-config.js")).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/toolchain.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_malformed_document() {
        let err = load_config_str("networks = ", Format::Toml, LoadOptions::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedDocument(_)));
    }
}
