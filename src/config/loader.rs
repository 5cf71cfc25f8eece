//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: RelayConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_minimal_config() {
        let path = std::env::temp_dir().join("image-relay-loader-minimal.toml");
        fs::write(
            &path,
            "[upstream]\nbase_url = \"http://127.0.0.1:9000\"\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.upstream.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.timeouts.upstream_secs, 30);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let path = std::env::temp_dir().join("image-relay-loader-broken.toml");
        fs::write(&path, "upstream = not toml").unwrap();

        assert!(matches!(
            load_config(&path),
            Err(ConfigError::Parse(_))
        ));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_semantic_errors_surface_as_validation() {
        let path = std::env::temp_dir().join("image-relay-loader-invalid.toml");
        fs::write(
            &path,
            "[upstream]\nbase_url = \"\"\n[timeouts]\nupstream_secs = 0\n",
        )
        .unwrap();

        match load_config(&path) {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected result: {other:?}"),
        }

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let path = std::env::temp_dir().join("image-relay-loader-does-not-exist.toml");
        assert!(matches!(load_config(&path), Err(ConfigError::Io(_))));
    }
}
