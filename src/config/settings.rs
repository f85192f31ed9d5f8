//! Application configuration settings
//!
//! Defines all configuration structures and loading logic

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server configuration
    pub server: ServerConfig,
    /// OpenAI API configuration
    pub openai: OpenAIConfig,
    /// Anthropic API configuration
    pub anthropic: AnthropicConfig,
    /// Identity service configuration
    pub identity: IdentityConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen host
    pub host: String,
    /// Listen port
    pub port: u16,
}

/// OpenAI API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    /// API key
    pub api_key: String,
    /// API base URL
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout: u64,
}

/// Anthropic API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    /// API key
    pub api_key: String,
    /// API base URL
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout: u64,
}

/// Identity service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Identity service base URL
    pub base_url: String,
    /// Service anon key sent alongside caller tokens
    pub anon_key: String,
    /// Request timeout in seconds
    pub timeout: u64,
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Allowed origins for CORS
    pub allowed_origins: Vec<String>,
    /// Whether CORS is enabled
    pub cors_enabled: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (text/json)
    pub format: String,
}

impl Settings {
    /// Create a new configuration instance from the environment
    pub fn new() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let settings = Self {
            server: ServerConfig {
                host: get_env_or_default("SERVER_HOST", "0.0.0.0"),
                port: get_env_or_default("SERVER_PORT", "8084")
                    .parse()
                    .context("Invalid port number")?,
            },
            openai: OpenAIConfig {
                api_key: std::env::var("OPENAI_API_KEY")
                    .context("OPENAI_API_KEY environment variable not set")?,
                base_url: get_env_or_default("OPENAI_BASE_URL", "https://api.openai.com/v1"),
                timeout: get_env_or_default("REQUEST_TIMEOUT", "30")
                    .parse()
                    .context("Invalid timeout value")?,
            },
            anthropic: AnthropicConfig {
                api_key: std::env::var("ANTHROPIC_API_KEY")
                    .context("ANTHROPIC_API_KEY environment variable not set")?,
                base_url: get_env_or_default("ANTHROPIC_BASE_URL", "https://api.anthropic.com"),
                timeout: get_env_or_default("REQUEST_TIMEOUT", "30")
                    .parse()
                    .context("Invalid timeout value")?,
            },
            identity: IdentityConfig {
                base_url: std::env::var("IDENTITY_URL")
                    .context("IDENTITY_URL environment variable not set")?,
                anon_key: std::env::var("IDENTITY_ANON_KEY")
                    .context("IDENTITY_ANON_KEY environment variable not set")?,
                timeout: get_env_or_default("IDENTITY_TIMEOUT", "10")
                    .parse()
                    .context("Invalid identity timeout value")?,
            },
            security: SecurityConfig {
                allowed_origins: get_env_or_default("ALLOWED_ORIGINS", "*")
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
                cors_enabled: get_env_or_default("CORS_ENABLED", "true")
                    .parse()
                    .context("Invalid CORS enabled flag")?,
            },
            logging: LoggingConfig {
                level: get_env_or_default("RUST_LOG", "info"),
                format: get_env_or_default("LOG_FORMAT", "text"),
            },
        };

        // Validate configuration
        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration validity
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Port number cannot be 0");
        }

        validate_api_key("OpenAI", &self.openai.api_key)?;
        validate_api_key("Anthropic", &self.anthropic.api_key)?;

        if !self.openai.base_url.starts_with("http") {
            anyhow::bail!("Invalid OpenAI base URL format, should start with 'http'");
        }

        if !self.anthropic.base_url.starts_with("http") {
            anyhow::bail!("Invalid Anthropic base URL format, should start with 'http'");
        }

        if !self.identity.base_url.starts_with("http") {
            anyhow::bail!("Invalid identity service URL format, should start with 'http'");
        }

        if self.identity.anon_key.is_empty() {
            anyhow::bail!("Identity anon key cannot be empty");
        }

        if self.openai.timeout == 0 || self.anthropic.timeout == 0 || self.identity.timeout == 0 {
            anyhow::bail!("Timeout values cannot be 0");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!("Invalid log level: {}", self.logging.level);
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.logging.format);
        }

        Ok(())
    }
}

/// Validate a vendor API key: non-empty, no whitespace, minimum length
fn validate_api_key(vendor: &str, api_key: &str) -> Result<()> {
    if api_key.is_empty() {
        anyhow::bail!("{} API key cannot be empty", vendor);
    }

    if api_key.contains(char::is_whitespace) {
        anyhow::bail!("{} API key cannot contain whitespace characters", vendor);
    }

    if api_key.len() < 8 {
        anyhow::bail!("{} API key must be at least 8 characters long", vendor);
    }

    Ok(())
}

/// Get environment variable or default value
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
