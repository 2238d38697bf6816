use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use axum::http::HeaderValue;
use folio_core::{parse_duration, Authenticator, CoreResult, Credential, RateLimiter};
use serde::Deserialize;
use tower_http::cors::AllowOrigin;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub tls: TlsConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_jwt_expiry")]
    pub jwt_expiry: String,
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    #[serde(default)]
    pub admin_password_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_contact_limit")]
    pub contact: LimitConfig,
    #[serde(default = "default_login_limit")]
    pub login: LimitConfig,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval: String,
    /// Use the first `X-Forwarded-For` hop as the client key. Only enable
    /// behind a proxy that overwrites the header.
    #[serde(default)]
    pub trust_forwarded_for: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitConfig {
    pub limit: usize,
    pub window: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TlsConfig {
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

/// Outgoing mail for contact notifications. Mail is only sent when both
/// `username` and `password` are set; otherwise submissions are just logged.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    #[serde(default = "default_smtp_host")]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_expiry: default_jwt_expiry(),
            admin_username: default_admin_username(),
            admin_password_hash: String::new(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            contact: default_contact_limit(),
            login: default_login_limit(),
            sweep_interval: default_sweep_interval(),
            trust_forwarded_for: false,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self { allowed_origins: default_allowed_origins() }
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            auth: AuthConfig::default(),
            rate_limit: RateLimitConfig::default(),
            cors: CorsConfig::default(),
            tls: TlsConfig::default(),
            smtp: SmtpConfig::default(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}
fn default_jwt_expiry() -> String { "24h".to_string() }
fn default_admin_username() -> String { "admin".to_string() }
fn default_sweep_interval() -> String { "60s".to_string() }
fn default_smtp_host() -> String { "smtp.gmail.com".to_string() }
fn default_smtp_port() -> u16 { 587 }

fn default_contact_limit() -> LimitConfig {
    LimitConfig { limit: 10, window: "1m".to_string() }
}

fn default_login_limit() -> LimitConfig {
    LimitConfig { limit: 5, window: "1m".to_string() }
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:3000".to_string(),
    ]
}

impl LimitConfig {
    pub fn build(&self) -> CoreResult<RateLimiter> {
        RateLimiter::new(self.limit, parse_duration(&self.window)?)
    }
}

impl AuthConfig {
    pub fn build(&self) -> CoreResult<Authenticator> {
        let ttl = parse_duration(&self.jwt_expiry)?;
        Authenticator::new(
            Credential {
                subject: self.admin_username.clone(),
                password_hash: self.admin_password_hash.clone(),
            },
            &self.jwt_secret,
            ttl,
        )
    }
}

impl RateLimitConfig {
    pub fn sweep_interval(&self) -> CoreResult<Duration> {
        parse_duration(&self.sweep_interval)
    }
}

impl CorsConfig {
    /// Exact origins as header values. `*` is not an origin and is rejected.
    pub fn header_values(&self) -> anyhow::Result<Vec<HeaderValue>> {
        self.allowed_origins
            .iter()
            .map(|origin| {
                if origin == "*" {
                    anyhow::bail!("Wildcard origin \"*\" cannot be mixed with explicit origins");
                }
                origin
                    .parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid allowed origin {origin:?}: {e}"))
            })
            .collect()
    }

    /// A lone `*` allows any origin; anything else is an exact list.
    pub fn allow_origin(&self) -> anyhow::Result<AllowOrigin> {
        if self.allowed_origins.len() == 1 && self.allowed_origins[0] == "*" {
            tracing::warn!("CORS allows any origin");
            return Ok(AllowOrigin::any());
        }
        Ok(AllowOrigin::list(self.header_values()?))
    }
}

impl SmtpConfig {
    pub fn is_configured(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl ServerConfig {
    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads `FOLIO_CONFIG` (if set) and applies environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = std::env::var("FOLIO_CONFIG").map(PathBuf::from).ok();

        let mut config = if let Some(path) = config_path {
            let contents = std::fs::read_to_string(&path)?;
            Self::from_toml(&contents)?
        } else {
            ServerConfig::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.log_summary();
        Ok(config)
    }

    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(addr) = var("FOLIO_BIND_ADDR") {
            self.bind_addr = addr.parse()?;
        }
        if let Some(secret) = var("FOLIO_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(expiry) = var("FOLIO_JWT_EXPIRY") {
            self.auth.jwt_expiry = expiry;
        }
        if let Some(username) = var("FOLIO_ADMIN_USERNAME") {
            self.auth.admin_username = username;
        }
        if let Some(hash) = var("FOLIO_ADMIN_PASSWORD_HASH") {
            self.auth.admin_password_hash = hash;
        }
        if let Some(origins) = var("FOLIO_ALLOWED_ORIGINS") {
            self.cors.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(val) = var("FOLIO_TRUST_FORWARDED_FOR") {
            self.rate_limit.trust_forwarded_for = matches!(val.as_str(), "1" | "true" | "yes");
        }
        if let Some(cert) = var("FOLIO_TLS_CERT") {
            self.tls.cert_path = Some(cert);
        }
        if let Some(key) = var("FOLIO_TLS_KEY") {
            self.tls.key_path = Some(key);
        }
        if let Some(host) = var("FOLIO_SMTP_HOST") {
            self.smtp.host = host;
        }
        if let Some(port) = var("FOLIO_SMTP_PORT") {
            self.smtp.port = port.parse()?;
        }
        if let Some(username) = var("FOLIO_SMTP_USERNAME") {
            self.smtp.username = username;
        }
        if let Some(password) = var("FOLIO_SMTP_PASSWORD") {
            self.smtp.password = password;
        }
        Ok(())
    }

    fn log_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Bind address: {}", self.bind_addr);
        tracing::info!("  Token expiry: {}", self.auth.jwt_expiry);
        tracing::info!("  Admin user: {}", self.auth.admin_username);
        tracing::info!(
            "  Contact limit: {} per {}",
            self.rate_limit.contact.limit,
            self.rate_limit.contact.window
        );
        tracing::info!(
            "  Login limit: {} per {}",
            self.rate_limit.login.limit,
            self.rate_limit.login.window
        );
        tracing::info!("  Allowed origins: {}", self.cors.allowed_origins.join(","));
        if self.smtp.is_configured() {
            tracing::info!("  Contact notifications: {}:{}", self.smtp.host, self.smtp.port);
        } else {
            tracing::info!("  Contact notifications: log only");
        }
    }
}
