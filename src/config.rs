//! Environment-driven configuration
//!
//! Everything has a sensible default except the provider API key, which is
//! deliberately left optional here: its absence is reported per-request so
//! the history endpoint stays usable on a box without credentials.

use std::path::PathBuf;

/// Default model the provider is asked to generate with
pub const DEFAULT_MODEL: &str = "claude-opus-4-20250514";

/// Default token ceiling for one generation
pub const DEFAULT_MAX_TOKENS: u32 = 8192;

/// Default provider endpoint base
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

#[derive(Debug, Clone)]
pub struct Config {
    /// Provider API key (ANTHROPIC_API_KEY). Checked at request time.
    pub anthropic_api_key: Option<String>,
    /// Provider endpoint base (ANTHROPIC_BASE_URL). Overridable for tests.
    pub anthropic_base_url: String,
    /// Model identifier sent with every generation request
    pub model: String,
    /// Token ceiling sent with every generation request
    pub max_tokens: u32,
    /// Root directory of the conversation store (REACTFORGE_DATA_DIR)
    pub data_dir: PathBuf,
}

impl Config {
    /// Load configuration from the environment. The data dir is CLI-owned
    /// (`--data-dir`, REACTFORGE_DATA_DIR via clap) and defaults here.
    pub fn from_env() -> Self {
        let max_tokens = std::env::var("REACTFORGE_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_TOKENS);

        Self {
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            anthropic_base_url: std::env::var("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            model: std::env::var("REACTFORGE_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            max_tokens,
            data_dir: default_data_dir(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            anthropic_api_key: None,
            anthropic_base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            data_dir: default_data_dir(),
        }
    }
}

/// Default store root: `~/.reactforge`
fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".reactforge")
}
