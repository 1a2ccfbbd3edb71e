use persistence::SupabaseConfig;
use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub supabase: SupabaseConfig,
    pub session: SessionConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Body limit for JSON requests. Multipart uploads use `storage.max_upload_bytes`.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

/// Session cookie settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// HMAC secret used to sign session tokens. At least 32 bytes.
    pub secret: String,

    #[serde(default = "default_session_ttl")]
    pub ttl_secs: i64,

    #[serde(default = "default_session_leeway")]
    pub leeway_secs: u64,

    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Send the cookie only over HTTPS.
    #[serde(default)]
    pub secure: bool,

    #[serde(default = "default_same_site")]
    pub same_site: String,

    /// Cookie domain; empty for host-only cookies.
    #[serde(default)]
    pub domain: String,
}

/// Storage buckets and upload limits.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_enrollment_bucket")]
    pub enrollment_bucket: String,

    #[serde(default = "default_materials_bucket")]
    pub materials_bucket: String,

    /// Maximum size of one uploaded file.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Maximum number of documents in one enrollment submission.
    #[serde(default = "default_max_documents")]
    pub max_documents: usize,

    #[serde(default = "default_signed_url_ttl")]
    pub signed_url_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Requests per minute per client on public write routes. 0 disables.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,

    #[serde(default)]
    pub hsts_enabled: bool,

    /// Key rate limits on the first `X-Forwarded-For` entry. Only enable
    /// behind a proxy that sets the header.
    #[serde(default)]
    pub trust_forwarded_for: bool,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_body_size() -> usize {
    1_048_576
}
fn default_session_ttl() -> i64 {
    shared::session::DEFAULT_SESSION_TTL_SECS
}
fn default_session_leeway() -> u64 {
    shared::session::DEFAULT_LEEWAY_SECS
}
fn default_cookie_name() -> String {
    "session".to_string()
}
fn default_same_site() -> String {
    "Lax".to_string()
}
fn default_enrollment_bucket() -> String {
    "inscripciones".to_string()
}
fn default_materials_bucket() -> String {
    "materiales".to_string()
}
fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}
fn default_max_documents() -> usize {
    10
}
fn default_signed_url_ttl() -> u64 {
    3600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_rate_limit() -> u32 {
    20
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with SP__ prefix
    ///
    /// Supabase settings left empty are then taken from the conventional
    /// variables `NEXT_PUBLIC_SUPABASE_URL`/`SUPABASE_URL`,
    /// `SUPABASE_ANON_KEY` and `SUPABASE_SERVICE_ROLE_KEY`.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("SP").separator("__"))
            .build()?;

        let mut cfg: Self = config.try_deserialize()?;
        cfg.apply_supabase_fallbacks(|name| std::env::var(name).ok());
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// This method creates a config entirely from defaults and overrides,
    /// without relying on config files.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30
            max_body_size = 1048576

            [supabase]
            url = ""
            anon_key = ""
            service_role_key = ""
            timeout_secs = 10

            [session]
            secret = ""
            ttl_secs = 604800
            cookie_name = "session"
            secure = false
            same_site = "Lax"
            domain = ""

            [storage]
            enrollment_bucket = "inscripciones"
            materials_bucket = "materiales"
            max_upload_bytes = 10485760
            signed_url_ttl_secs = 3600

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []
            rate_limit_per_minute = 20
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Fills empty Supabase settings from the conventional variable names.
    pub fn apply_supabase_fallbacks<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |names: &[&str]| {
            names
                .iter()
                .filter_map(|n| lookup(n))
                .find(|v| !v.trim().is_empty())
        };
        if self.supabase.url.trim().is_empty() {
            if let Some(url) = first(&["NEXT_PUBLIC_SUPABASE_URL", "SUPABASE_URL"]) {
                self.supabase.url = url;
            }
        }
        if self.supabase.anon_key.trim().is_empty() {
            if let Some(key) = first(&["SUPABASE_ANON_KEY", "NEXT_PUBLIC_SUPABASE_ANON_KEY"]) {
                self.supabase.anon_key = key;
            }
        }
        if self.supabase.service_role_key.trim().is_empty() {
            if let Some(key) = first(&["SUPABASE_SERVICE_ROLE_KEY"]) {
                self.supabase.service_role_key = key;
            }
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.supabase.url.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "SP__SUPABASE__URL or SUPABASE_URL must be set".to_string(),
            ));
        }
        if self.supabase.anon_key.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "SP__SUPABASE__ANON_KEY or SUPABASE_ANON_KEY must be set".to_string(),
            ));
        }
        if self.supabase.service_role_key.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "SP__SUPABASE__SERVICE_ROLE_KEY or SUPABASE_SERVICE_ROLE_KEY must be set"
                    .to_string(),
            ));
        }

        if self.session.secret.len() < shared::session::MIN_SECRET_LEN {
            return Err(ConfigValidationError::InvalidValue(format!(
                "session.secret must be at least {} bytes",
                shared::session::MIN_SECRET_LEN
            )));
        }
        if self.session.ttl_secs <= 0 {
            return Err(ConfigValidationError::InvalidValue(
                "session.ttl_secs must be positive".to_string(),
            ));
        }
        if !matches!(
            self.session.same_site.to_ascii_lowercase().as_str(),
            "lax" | "strict" | "none"
        ) {
            return Err(ConfigValidationError::InvalidValue(
                "session.same_site must be Lax, Strict or None".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.storage.max_upload_bytes == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "storage.max_upload_bytes cannot be 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}
