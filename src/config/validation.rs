use crate::config::types::{
    ClassificationConfig, Config, HttpConfig, IdentityConfig, OutputConfig, SourceConfig,
    VerifyConfig,
};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Upper bound on concurrent reachability probes
pub const MAX_CONCURRENCY: usize = 64;

/// Prefixes reserved for generated catalog ids (`app-1`, `cert-2`, ...)
pub const GENERATED_ID_PREFIXES: &[&str] = &["app", "cert", "dns"];

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source_config(&config.source)?;
    validate_http_config(&config.http)?;
    validate_verify_config(&config.verify)?;
    validate_output_config(&config.output)?;
    validate_classification_config(&config.classification)?;
    validate_identities(&config.identities)?;
    Ok(())
}

/// Validates the source page URL
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_verify_config(config: &VerifyConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the classification rule lists
fn validate_classification_config(config: &ClassificationConfig) -> Result<(), ConfigError> {
    let lists = [
        ("profile-extensions", &config.profile_extensions),
        ("profile-keywords", &config.profile_keywords),
        ("certificate-extensions", &config.certificate_extensions),
        ("certificate-keywords", &config.certificate_keywords),
        ("app-extensions", &config.app_extensions),
        ("app-keywords", &config.app_keywords),
    ];

    for (name, entries) in lists {
        if entries.iter().any(|entry| entry.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "{} cannot contain empty entries",
                name
            )));
        }
    }

    // An application must be recognizable by at least its file type
    if config.app_extensions.is_empty() {
        return Err(ConfigError::Validation(
            "app-extensions must list at least one extension".to_string(),
        ));
    }

    Ok(())
}

/// Validates the identity table
///
/// Ids must be unique and must not look like generated fallback ids, otherwise
/// the catalog could end up with two entries sharing an id.
fn validate_identities(identities: &[IdentityConfig]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for identity in identities {
        if identity.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "identity id cannot be empty".to_string(),
            ));
        }

        if !identity
            .id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(ConfigError::Validation(format!(
                "identity id must contain only lowercase letters, digits and hyphens, got '{}'",
                identity.id
            )));
        }

        if is_generated_id(&identity.id) {
            return Err(ConfigError::Validation(format!(
                "identity id '{}' collides with generated ids",
                identity.id
            )));
        }

        if identity.keywords.is_empty() || identity.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "identity '{}' must have at least one non-empty keyword",
                identity.id
            )));
        }

        if !seen.insert(identity.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate identity id '{}'",
                identity.id
            )));
        }
    }

    Ok(())
}

/// Returns true if `id` has the shape `<generated-prefix>-<number>`
fn is_generated_id(id: &str) -> bool {
    GENERATED_ID_PREFIXES.iter().any(|prefix| {
        id.strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('-'))
            .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
    })
}
