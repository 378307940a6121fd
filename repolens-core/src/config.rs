//! Configuration management

use crate::error::{ErrorContext, RepoLensError, RepoLensResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Hosting platform's hourly request quota for authenticated clients
pub const HOURLY_QUOTA: u32 = 5000;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoLensConfig {
    pub github: GitHubConfig,
    pub llm: LlmConfig,
    pub analysis: AnalysisConfig,
}

/// Hosting-platform client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_base_url: String,
    /// Base used to build `<base>/<owner>/<repo>.git` for the clone fallback
    pub clone_base_url: String,
    pub access_token: Option<String>,
    pub timeout_seconds: u64,
    pub user_agent: String,
    /// Remaining-quota threshold at or below which the client stops using the API
    pub low_water_mark: u32,
    pub min_request_interval_ms: u64,
    /// Longest the client will block waiting for a quota reset
    pub max_reset_wait_seconds: u64,
    pub clone_depth: u32,
    pub git_timeout_seconds: u64,
    pub readme_candidates: Vec<String>,
    /// Tried in order when decoding file content
    pub encodings: Vec<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.github.com".to_string(),
            clone_base_url: "https://github.com".to_string(),
            access_token: None,
            timeout_seconds: 30,
            user_agent: format!("repolens/{}", env!("CARGO_PKG_VERSION")),
            low_water_mark: 10,
            min_request_interval_ms: 100,
            max_reset_wait_seconds: 60,
            clone_depth: 1,
            git_timeout_seconds: 120,
            readme_candidates: vec![
                "README.md".to_string(),
                "README".to_string(),
                "readme.md".to_string(),
                "Readme.md".to_string(),
            ],
            encodings: vec![
                "utf-8".to_string(),
                "latin-1".to_string(),
                "windows-1252".to_string(),
            ],
        }
    }
}

/// Text-generation client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key: None,
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Cap on how many file contents are fetched per analysis
    pub max_files: Option<usize>,
}

impl RepoLensConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> RepoLensResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| RepoLensError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: RepoLensConfig = toml::from_str(&content).map_err(|e| RepoLensError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> RepoLensResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| RepoLensError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| RepoLensError::Config {
                message: format!("Failed to create config directory: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("config").with_operation("create_dir"),
            })?;
        }

        std::fs::write(path, content).map_err(|e| RepoLensError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Apply environment overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply environment-style overrides from an arbitrary lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = non_empty("GITHUB_TOKEN") {
            self.github.access_token = Some(token);
        }
        if let Some(key) = non_empty("GEMINI_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = non_empty("REPOLENS_GITHUB_API_URL") {
            self.github.api_base_url = url;
        }
        if let Some(model) = non_empty("REPOLENS_LLM_MODEL") {
            self.llm.model = model;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> RepoLensResult<()> {
        let invalid = |message: &str, field: &str, suggestion: &str| {
            Err(Box::new(RepoLensError::Config {
                message: message.to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_metadata("field", field)
                    .with_suggestion(suggestion),
            }))
        };

        if self.github.api_base_url.trim().is_empty() {
            return invalid(
                "GitHub API base URL must not be empty",
                "github.api_base_url",
                "Set github.api_base_url, e.g. https://api.github.com",
            );
        }
        if self.github.clone_base_url.trim().is_empty() {
            return invalid(
                "Clone base URL must not be empty",
                "github.clone_base_url",
                "Set github.clone_base_url, e.g. https://github.com",
            );
        }
        if self.llm.api_base_url.trim().is_empty() {
            return invalid(
                "LLM API base URL must not be empty",
                "llm.api_base_url",
                "Set llm.api_base_url",
            );
        }
        if self.github.timeout_seconds == 0 {
            return invalid(
                "GitHub timeout must be greater than 0",
                "github.timeout_seconds",
                "Set github.timeout_seconds to a positive value",
            );
        }
        if self.github.git_timeout_seconds == 0 {
            return invalid(
                "Git timeout must be greater than 0",
                "github.git_timeout_seconds",
                "Set github.git_timeout_seconds to a positive value",
            );
        }
        if self.llm.timeout_seconds == 0 {
            return invalid(
                "LLM timeout must be greater than 0",
                "llm.timeout_seconds",
                "Set llm.timeout_seconds to a positive value",
            );
        }
        if self.github.low_water_mark > HOURLY_QUOTA {
            return invalid(
                "Low-water mark exceeds the hourly request quota",
                "github.low_water_mark",
                "Use a low_water_mark below 5000",
            );
        }

        Ok(())
    }

    /// Candidate config file locations, most specific first
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("repolens").join("config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".repolens").join("config.toml"));
        }
        paths.push(PathBuf::from("repolens.toml"));
        paths
    }

    /// Load from an explicit path or the first existing default path, then apply env overrides
    pub fn load(explicit: Option<&Path>) -> RepoLensResult<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_paths().into_iter().find(|p| p.exists()) {
                Some(path) => Self::from_file(path)?,
                None => Self::default(),
            },
        };
        config.apply_env();
        Ok(config)
    }
}
