//! Configuration management
//!
//! YAML-based configuration with environment variable overrides, default
//! values for all settings, and validation at load time. Covers the HTTP
//! server, tenancy (base domain, host allow-list), the payment gateway, the
//! itinerary service, email delivery and logging.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub tenancy: TenancyConfig,
    #[serde(default)]
    pub payments: PaymentsConfig,
    #[serde(default)]
    pub itinerary: ItineraryConfig,
    /// SMTP configuration; when absent, email sends are logged as mocks
    #[serde(default)]
    pub email: Option<EmailConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// TLS/HTTPS configuration (if not set, server runs HTTP)
    #[serde(default)]
    pub tls: Option<TlsConfig>,
}

/// TLS/HTTPS configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to TLS certificate file (PEM format)
    pub cert_file: PathBuf,
    /// Path to TLS private key file (PEM format)
    pub key_file: PathBuf,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5071
}

fn default_workers() -> usize {
    num_cpus::get()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
            tls: None,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_database_url() -> String {
    "sqlite://./data/aire.db".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_connect_timeout() -> u64 {
    30
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

/// Session-token configuration.
///
/// Identity verification itself happens at the external provider; this
/// service only validates the signed session token it issues.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_token_expiry")]
    pub token_expiry_hours: u64,
    /// Where unauthenticated dashboard requests are redirected
    #[serde(default = "default_sign_in_url")]
    pub sign_in_url: String,
}

fn default_token_expiry() -> u64 {
    24
}

fn default_sign_in_url() -> String {
    "/sign-in".to_string()
}

/// Tenancy configuration: the base domain under which all partner
/// subdomains are issued, plus the host allow-list.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TenancyConfig {
    #[serde(default = "default_base_domain")]
    pub base_domain: String,
    /// Hosting-platform roots that are themselves multi-segment
    /// (e.g. `vercel.app`); exactly one leading label is stripped there
    #[serde(default)]
    pub platform_roots: Vec<String>,
    /// Extra allow-list entries beyond the derived base-domain patterns
    #[serde(default)]
    pub allowed_hosts: Vec<String>,
    /// Canonical application URL used for checkout redirect targets
    #[serde(default = "default_app_url")]
    pub app_url: String,
}

fn default_base_domain() -> String {
    "localhost:3000".to_string()
}

fn default_app_url() -> String {
    "http://localhost:3000".to_string()
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            base_domain: default_base_domain(),
            platform_roots: Vec::new(),
            allowed_hosts: Vec::new(),
            app_url: default_app_url(),
        }
    }
}

impl TenancyConfig {
    /// Full allow-list: configured extras plus exact and wildcard patterns
    /// for the base domain and every platform root.
    pub fn allowed_host_patterns(&self) -> Vec<String> {
        let mut patterns = self.allowed_hosts.clone();
        patterns.push(self.base_domain.clone());
        patterns.push(format!("*.{}", self.base_domain));
        for root in &self.platform_roots {
            patterns.push(root.clone());
            patterns.push(format!("*.{}", root));
        }
        patterns
    }
}

/// Payment gateway configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentsConfig {
    #[serde(default = "default_stripe_secret_key")]
    pub secret_key: String,
    /// Shared secret for webhook signature verification
    #[serde(default)]
    pub webhook_secret: String,
    #[serde(default = "default_stripe_api_base")]
    pub api_base: String,
    #[serde(default = "default_gateway_timeout")]
    pub timeout_secs: u64,
}

fn default_stripe_secret_key() -> String {
    "sk_test_placeholder".to_string()
}

fn default_stripe_api_base() -> String {
    "https://api.stripe.com".to_string()
}

fn default_gateway_timeout() -> u64 {
    20
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            secret_key: default_stripe_secret_key(),
            webhook_secret: String::new(),
            api_base: default_stripe_api_base(),
            timeout_secs: default_gateway_timeout(),
        }
    }
}

/// Itinerary generation service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ItineraryConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_itinerary_api_base")]
    pub api_base: String,
    #[serde(default = "default_itinerary_model")]
    pub model: String,
    /// Bound on the synchronous call inside the booking write path
    #[serde(default = "default_itinerary_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_itinerary_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_itinerary_model() -> String {
    "gemini-2.0-flash-exp".to_string()
}

fn default_itinerary_timeout() -> u64 {
    15
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_output_tokens() -> u32 {
    2048
}

impl Default for ItineraryConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: default_itinerary_api_base(),
            model: default_itinerary_model(),
            timeout_secs: default_itinerary_timeout(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

/// Email (SMTP) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_email_from")]
    pub from: String,
    /// Recipient for the dashboard test-email action
    #[serde(default = "default_test_recipient")]
    pub test_recipient: String,
    /// Minimum seconds between test emails per partner
    #[serde(default = "default_test_throttle")]
    pub test_throttle_secs: u64,
}

fn default_smtp_port() -> u16 {
    587
}

fn default_email_from() -> String {
    "AIRE Resorts <bookings@aire.example>".to_string()
}

fn default_test_recipient() -> String {
    "test@example.com".to_string()
}

fn default_test_throttle() -> u64 {
    60
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    /// Log output target (console or file)
    #[serde(default)]
    pub target: LogTarget,
    /// Directory for log files (used when target is "file")
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default = "default_log_prefix")]
    pub log_prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    #[default]
    Console,
    File,
    Both,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("/var/log/aire/marketplace")
}

fn default_log_prefix() -> String {
    "aire-marketplace".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            target: LogTarget::default(),
            log_dir: default_log_dir(),
            log_prefix: default_log_prefix(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig {
                jwt_secret: "change-me-in-production-minimum-32-characters-long".to_string(),
                token_expiry_hours: default_token_expiry(),
                sign_in_url: default_sign_in_url(),
            },
            tenancy: TenancyConfig::default(),
            payments: PaymentsConfig::default(),
            itinerary: ItineraryConfig::default(),
            email: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values
    /// 2. Configuration file (YAML)
    /// 3. Environment variables
    pub fn load() -> Result<Self> {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        // Check for config path override from environment
        let config_path = std::env::var("AIRE_CONFIG")
            .map(PathBuf::from)
            .ok()
            .or_else(Self::find_config_file);

        let mut config = if let Some(ref path) = config_path {
            if path.exists() {
                let contents = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {:?}", path))?;
                serde_norway::from_str(&contents)
                    .with_context(|| format!("Failed to parse config file: {:?}", path))?
            } else {
                AppConfig::default()
            }
        } else {
            AppConfig::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let paths = [
            PathBuf::from("config.yaml"),
            PathBuf::from("config/config.yaml"),
            PathBuf::from("/etc/aire-marketplace/config.yaml"),
            dirs::config_dir()
                .map(|p| p.join("aire-marketplace/config.yaml"))
                .unwrap_or_default(),
        ];

        paths.into_iter().find(|p| p.exists())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("AIRE_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("AIRE_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database.url = url;
        }

        if let Ok(secret) = std::env::var("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }

        if let Ok(base) = std::env::var("AIRE_BASE_DOMAIN") {
            self.tenancy.base_domain = base.to_ascii_lowercase();
        }
        if let Ok(url) = std::env::var("AIRE_APP_URL") {
            self.tenancy.app_url = url;
        }
        if let Ok(hosts) = std::env::var("AIRE_ALLOWED_HOSTS") {
            self.tenancy.allowed_hosts = hosts
                .split(',')
                .map(|h| h.trim().to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .collect();
        }

        if let Ok(key) = std::env::var("STRIPE_SECRET_KEY") {
            self.payments.secret_key = key;
        }
        if let Ok(secret) = std::env::var("STRIPE_WEBHOOK_SECRET") {
            self.payments.webhook_secret = secret;
        }

        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            self.itinerary.api_key = key;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("AIRE_LOG_FORMAT") {
            self.logging.format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "compact" => LogFormat::Compact,
                _ => LogFormat::Pretty,
            };
        }
        if let Ok(target) = std::env::var("AIRE_LOG_TARGET") {
            self.logging.target = match target.to_lowercase().as_str() {
                "file" => LogTarget::File,
                "both" => LogTarget::Both,
                _ => LogTarget::Console,
            };
        }
        if let Ok(dir) = std::env::var("AIRE_LOG_DIR") {
            self.logging.log_dir = PathBuf::from(dir);
        }
    }

    /// Validate the loaded configuration
    fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.len() < 32 {
            bail!("auth.jwt_secret must be at least 32 characters");
        }
        if self.tenancy.base_domain.trim().is_empty() {
            bail!("tenancy.base_domain must not be empty");
        }
        if self.tenancy.base_domain != self.tenancy.base_domain.to_ascii_lowercase() {
            bail!("tenancy.base_domain must be lowercase");
        }
        if self.database.url.trim().is_empty() {
            bail!("database.url must not be empty");
        }
        Ok(())
    }
}
