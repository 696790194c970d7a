use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::cli::OutputFormat;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Language preferences for each retrieval strategy
    #[serde(default)]
    pub languages: LanguageConfig,

    /// Captioning service connection settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Client interfaces the fetcher may use
    #[serde(default)]
    pub capabilities: CapabilityConfig,

    /// Application settings
    #[serde(default)]
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageConfig {
    /// Languages for the fast direct lookup
    pub preferred: Vec<String>,

    /// Languages for the track-listing lookups
    pub listing: Vec<String>,

    /// Broad list for the last-resort lookup
    pub extended: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Root URL of the video platform
    pub base_url: String,

    pub user_agent: String,

    /// Sent as Accept-Language so track names come back in a stable language
    pub accept_language: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityConfig {
    pub direct_fetch: bool,
    pub list_transcripts: bool,
    pub instance_client: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default output format
    pub default_output_format: OutputFormat,

    /// Prefix text output lines with timestamps
    pub timestamps: bool,
}

const ENGLISH_VARIANTS: &[&str] = &["en", "en-US", "en-GB", "en-AU", "en-CA", "en-IN"];

const MAJOR_LANGUAGES: &[&str] = &[
    "hi", "hi-IN", "es", "fr", "de", "pt", "it", "ru", "ja", "ko", "zh-Hans", "zh-Hant",
];

fn codes<'a>(list: impl IntoIterator<Item = &'a &'a str>) -> Vec<String> {
    list.into_iter().map(|code| code.to_string()).collect()
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            preferred: codes(&ENGLISH_VARIANTS[..3]),
            listing: codes(ENGLISH_VARIANTS),
            extended: codes(ENGLISH_VARIANTS.iter().chain(MAJOR_LANGUAGES)),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.youtube.com/".to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36"
                .to_string(),
            accept_language: "en-US".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        Self {
            direct_fetch: true,
            list_transcripts: true,
            instance_client: true,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_output_format: OutputFormat::Text,
            timestamps: false,
        }
    }
}

impl Config {
    /// Load configuration from the given file, the default location, or create defaults
    pub async fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let config: Config = serde_yaml::from_str(&content)
                .context("Failed to parse config file")?;

            config.validate()?;
            Ok(config)
        } else {
            tracing::info!("Writing default configuration to {}", config_path.display());
            let config = Self::default();
            config.save(&config_path).await?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub async fn save(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs_err::create_dir_all(parent)?;
            }
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("tubescript.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("tubescript").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.languages.preferred.is_empty() {
            anyhow::bail!("languages.preferred must list at least one language code");
        }
        if self.languages.listing.is_empty() {
            anyhow::bail!("languages.listing must list at least one language code");
        }
        if self.languages.extended.is_empty() {
            anyhow::bail!("languages.extended must list at least one language code");
        }

        let base_url = Url::parse(&self.http.base_url)
            .with_context(|| format!("Invalid http.base_url: {}", self.http.base_url))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            anyhow::bail!("http.base_url must use HTTP or HTTPS protocol");
        }

        if self.http.timeout_secs == 0 {
            anyhow::bail!("http.timeout_secs must be greater than zero");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Preferred languages: {}", self.languages.preferred.join(", "));
        println!("  Listing languages: {}", self.languages.listing.join(", "));
        println!("  Extended languages: {}", self.languages.extended.join(", "));
        println!("  Base URL: {}", self.http.base_url);
        println!("  Timeout: {}s", self.http.timeout_secs);
        println!(
            "  Capabilities: direct={} listing={} instance={}",
            self.capabilities.direct_fetch, self.capabilities.list_transcripts, self.capabilities.instance_client
        );
        println!("  Default Format: {}", self.app.default_output_format);
    }
}
