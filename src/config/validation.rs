//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits coherent)
//! - Check the upstream base URL parses and uses a supported scheme
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before the config is accepted into the system

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::RelayConfig;

/// A single semantic problem found in a config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyUpstreamBaseUrl,
    InvalidUpstreamBaseUrl { url: String, reason: String },
    UnsupportedUpstreamScheme { scheme: String },
    InvalidBindAddress { address: String },
    InvalidMetricsAddress { address: String },
    ZeroTimeout { field: &'static str },
    InvalidApiKey,
    ImageLimitExceedsBodyLimit,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyUpstreamBaseUrl => {
                write!(f, "upstream.base_url must not be empty")
            }
            ValidationError::InvalidUpstreamBaseUrl { url, reason } => {
                write!(f, "upstream.base_url {url:?} is not a valid URL: {reason}")
            }
            ValidationError::UnsupportedUpstreamScheme { scheme } => {
                write!(f, "upstream.base_url scheme {scheme:?} is not http or https")
            }
            ValidationError::InvalidBindAddress { address } => {
                write!(f, "listener.bind_address {address:?} is not a socket address")
            }
            ValidationError::InvalidMetricsAddress { address } => {
                write!(
                    f,
                    "observability.metrics_address {address:?} is not a socket address"
                )
            }
            ValidationError::ZeroTimeout { field } => {
                write!(f, "timeouts.{field} must be greater than zero")
            }
            ValidationError::InvalidApiKey => {
                write!(f, "upstream.api_key contains characters not valid in a header")
            }
            ValidationError::ImageLimitExceedsBodyLimit => {
                write!(f, "limits.max_image_bytes exceeds limits.max_body_bytes")
            }
        }
    }
}

/// Check everything serde cannot. Collects every problem found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.upstream.base_url.is_empty() {
        errors.push(ValidationError::EmptyUpstreamBaseUrl);
    } else {
        match Url::parse(&config.upstream.base_url) {
            Ok(url) if url.scheme() != "http" && url.scheme() != "https" => {
                errors.push(ValidationError::UnsupportedUpstreamScheme {
                    scheme: url.scheme().to_string(),
                });
            }
            Ok(_) => {}
            Err(e) => {
                errors.push(ValidationError::InvalidUpstreamBaseUrl {
                    url: config.upstream.base_url.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress {
            address: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress {
            address: config.observability.metrics_address.clone(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "request_secs",
        });
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "upstream_secs",
        });
    }

    if let Some(key) = &config.upstream.api_key {
        if key.is_empty() || !key.bytes().all(|b| (0x20..0x7f).contains(&b)) {
            errors.push(ValidationError::InvalidApiKey);
        }
    }

    if config.limits.max_image_bytes > config.limits.max_body_bytes {
        errors.push(ValidationError::ImageLimitExceedsBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&RelayConfig::default()).is_ok());
    }

    #[test]
    fn test_empty_base_url_is_rejected() {
        let mut config = RelayConfig::default();
        config.upstream.base_url = String::new();

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::EmptyUpstreamBaseUrl));
    }

    #[test]
    fn test_non_http_scheme_is_rejected() {
        let mut config = RelayConfig::default();
        config.upstream.base_url = "ftp://images.example.com".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(
            errors[0],
            ValidationError::UnsupportedUpstreamScheme { .. }
        ));
    }

    #[test]
    fn test_all_errors_are_collected() {
        let mut config = RelayConfig::default();
        config.upstream.base_url = String::new();
        config.listener.bind_address = "not-an-address".to_string();
        config.timeouts.request_secs = 0;
        config.timeouts.upstream_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_api_key_with_control_characters_is_rejected() {
        let mut config = RelayConfig::default();
        config.upstream.api_key = Some("line\nbreak".to_string());

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::InvalidApiKey));
    }

    #[test]
    fn test_image_limit_must_fit_in_body_limit() {
        let mut config = RelayConfig::default();
        config.limits.max_body_bytes = 1024;
        config.limits.max_image_bytes = 2048;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::ImageLimitExceedsBodyLimit));
    }
}
