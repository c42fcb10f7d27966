use serde::Deserialize;

/// Main configuration structure for Catalog-Sync
///
/// Every section has a default so an empty file describes the built-in policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub http: HttpConfig,
    pub verify: VerifyConfig,
    pub output: OutputConfig,
    pub classification: ClassificationConfig,
    pub scoring: ScoringConfig,
    pub descriptions: DescriptionConfig,
    #[serde(rename = "identity")]
    pub identities: Vec<IdentityConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            http: HttpConfig::default(),
            verify: VerifyConfig::default(),
            output: OutputConfig::default(),
            classification: ClassificationConfig::default(),
            scoring: ScoringConfig::default(),
            descriptions: DescriptionConfig::default(),
            identities: default_identities(),
        }
    }
}

/// The page the catalog is synchronized against
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base URL of the source page; relative links resolve against it
    #[serde(rename = "base-url")]
    pub base_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://khoindvn.io.vn/".to_string(),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User agent sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("catalog-sync/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 15,
            connect_timeout_secs: 10,
        }
    }
}

/// Reachability verification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Maximum number of probes in flight
    pub concurrency: usize,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self { concurrency: 8 }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the JSON catalog document
    pub path: String,

    /// Pretty-print the JSON document
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "data/statuses.json".to_string(),
            pretty: true,
        }
    }
}

/// Extension and keyword lists backing the classification rules
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    #[serde(rename = "profile-extensions")]
    pub profile_extensions: Vec<String>,

    #[serde(rename = "profile-keywords")]
    pub profile_keywords: Vec<String>,

    #[serde(rename = "certificate-extensions")]
    pub certificate_extensions: Vec<String>,

    #[serde(rename = "certificate-keywords")]
    pub certificate_keywords: Vec<String>,

    #[serde(rename = "app-extensions")]
    pub app_extensions: Vec<String>,

    /// Extra application keywords; identity keywords are always included
    #[serde(rename = "app-keywords")]
    pub app_keywords: Vec<String>,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            profile_extensions: strings(&[".mobileconfig"]),
            profile_keywords: strings(&["dns", "profile"]),
            certificate_extensions: strings(&[
                ".cer", ".crt", ".pem", ".der", ".p12", ".pfx", ".zip", ".rar", ".7z",
            ]),
            certificate_keywords: strings(&["cert"]),
            app_extensions: strings(&[".ipa"]),
            app_keywords: strings(&["ipa"]),
        }
    }
}

/// Weights and markers used to score application candidates
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Awarded when the URL path ends in an application extension
    #[serde(rename = "app-extension")]
    pub app_extension: i32,

    /// Awarded when the URL or anchor text matches the group identity
    #[serde(rename = "identity-match")]
    pub identity_match: i32,

    /// Awarded when the URL contains a download-type keyword
    #[serde(rename = "download-keyword")]
    pub download_keyword: i32,

    /// Awarded when the URL points at raw-content hosting
    #[serde(rename = "raw-host")]
    pub raw_host: i32,

    /// Applied (usually negative) when the path looks like docs/certs/DNS
    #[serde(rename = "misplaced-path")]
    pub misplaced_path: i32,

    #[serde(rename = "download-keywords")]
    pub download_keywords: Vec<String>,

    #[serde(rename = "raw-markers")]
    pub raw_markers: Vec<String>,

    #[serde(rename = "misplaced-markers")]
    pub misplaced_markers: Vec<String>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            app_extension: 100,
            identity_match: 30,
            download_keyword: 10,
            raw_host: 8,
            misplaced_path: -40,
            download_keywords: strings(&["download", "install", "release"]),
            raw_markers: strings(&["raw.githubusercontent.com", "/raw/"]),
            misplaced_markers: strings(&["doc", "cert", "dns", "guide", "wiki"]),
        }
    }
}

/// Description templates; `{host}` and `{text}` are substituted
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DescriptionConfig {
    pub tool: String,
    pub certificate: String,
}

impl Default for DescriptionConfig {
    fn default() -> Self {
        Self {
            tool: "Automatically found on {host}".to_string(),
            certificate: "Link from {host}".to_string(),
        }
    }
}

/// A known tool identity
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdentityConfig {
    /// Catalog id emitted for this tool (e.g., "ksign-bmw")
    pub id: String,

    /// Display name (e.g., "KSign BMW")
    pub name: String,

    /// Keywords that must all appear (case-insensitive) for a match
    pub keywords: Vec<String>,
}

impl IdentityConfig {
    fn new(id: &str, name: &str, keywords: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            keywords: strings(keywords),
        }
    }
}

/// Built-in identity table
pub fn default_identities() -> Vec<IdentityConfig> {
    vec![
        IdentityConfig::new("ksign-bmw", "KSign BMW", &["ksign", "bmw"]),
        IdentityConfig::new("ksign", "KSign", &["ksign"]),
        IdentityConfig::new("esign-vnj", "eSign VNJ", &["esign", "vnj"]),
        IdentityConfig::new("esign", "eSign", &["esign"]),
    ]
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
