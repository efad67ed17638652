//! Engine configuration and validation.
//!
//! # Design
//! - Defaults mirror the admin dashboard's development backend.
//! - Values arrive from the CLI (flags or environment); [`SyncConfig::validate`] is the single gate.

use std::time::Duration;

use url::Url;

use crate::error::ConfigError;
use crate::fallback::FallbackPolicy;

/// Default API base URL.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:9999/api/v1";
/// Default base URL for stored uploads.
pub const DEFAULT_UPLOAD_BASE_URL: &str = "http://localhost:9999/uploads";
/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Default page size for list views.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Base URL every API path is appended to.
    pub api_base_url: String,
    /// Base URL relative asset paths are resolved against.
    pub upload_base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Page size used when a view is first opened.
    pub default_page_size: u32,
    /// Empty/out-of-range page recovery policy.
    pub fallback: FallbackPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            upload_base_url: DEFAULT_UPLOAD_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            default_page_size: DEFAULT_PAGE_SIZE,
            fallback: FallbackPolicy::default(),
        }
    }
}

impl SyncConfig {
    /// Check every field, returning the first violation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for unparsable base URLs, a zero page size, a zero
    /// timeout, or a fallback policy without attempts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_base("api_base_url", &self.api_base_url)?;
        parse_base("upload_base_url", &self.upload_base_url)?;
        if self.default_page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.fallback.max_attempts == 0 {
            return Err(ConfigError::NoAttempts);
        }
        Ok(())
    }
}

pub(crate) fn parse_base(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|err| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
        reason: err.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl {
            field,
            value: value.to_string(),
            reason: "URL cannot carry a path".to_string(),
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(SyncConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_page_size_and_timeout() {
        let config = SyncConfig {
            default_page_size: 0,
            ..SyncConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroPageSize));

        let config = SyncConfig {
            timeout: Duration::ZERO,
            ..SyncConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeout));
    }

    #[test]
    fn rejects_unusable_urls() {
        let config = SyncConfig {
            api_base_url: "not a url".into(),
            ..SyncConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl {
                field: "api_base_url",
                ..
            })
        ));

        let config = SyncConfig {
            upload_base_url: "mailto:ops@example.com".into(),
            ..SyncConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl {
                field: "upload_base_url",
                ..
            })
        ));
    }

    #[test]
    fn rejects_policy_without_attempts() {
        let config = SyncConfig {
            fallback: FallbackPolicy {
                max_attempts: 0,
                ..FallbackPolicy::default()
            },
            ..SyncConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoAttempts));
    }
}
