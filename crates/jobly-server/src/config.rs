//! Server configuration.
//!
//! Values come from an optional TOML file, then environment variables, then
//! command-line flags (applied by `main`). String values in the file may
//! reference environment variables as `${VAR}`.
//!
//! ```toml
//! [server]
//! port = 3001
//!
//! [database]
//! url = "${DATABASE_URL}"
//! max_connections = 8
//!
//! [auth]
//! secret = "${SECRET_KEY}"
//! token_ttl_secs = 3600
//!
//! [log]
//! filter = "info,jobly.sql=debug"
//! json = true
//! ```

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::path::Path;

/// Secret used when none is configured. Refused in production.
pub const DEV_SECRET: &str = "test";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `production` hides internal error details from responses.
    pub environment: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            environment: "development".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: usize,
    pub migrate_on_start: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/jobly".to_string(),
            max_connections: 16,
            migrate_on_start: false,
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    pub secret: String,
    pub token_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: DEV_SECRET.to_string(),
            token_ttl_secs: 24 * 60 * 60,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub filter: String,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info,jobly_server=debug,tower_http=debug".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load from `path` (if any) and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let lookup = |name: &str| std::env::var(name).ok();
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                Self::from_toml_str(&raw, lookup)
                    .with_context(|| format!("invalid config file {}", path.display()))?
            }
            None => Self::default(),
        };
        config.apply_env(lookup)?;
        Ok(config)
    }

    /// Parse a TOML document, expanding `${VAR}` references with `lookup`.
    pub fn from_toml_str(raw: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let expanded = expand_env_vars(raw, &lookup)?;
        Ok(toml::from_str(&expanded)?)
    }

    /// Override file values with `DATABASE_URL`, `SECRET_KEY`, `PORT`,
    /// `LOG_FORMAT` and `ENVIRONMENT`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(secret) = lookup("SECRET_KEY") {
            self.auth.secret = secret;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("PORT is not a valid port: {port}"))?;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.log.json = format.eq_ignore_ascii_case("json");
        }
        if let Some(environment) = lookup("ENVIRONMENT") {
            self.server.environment = environment;
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.environment.eq_ignore_ascii_case("production")
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.auth.secret.is_empty() {
            bail!("auth.secret must not be empty");
        }
        if self.is_production() && self.auth.secret == DEV_SECRET {
            bail!("set SECRET_KEY before running in production");
        }
        if self.auth.token_ttl_secs == 0 {
            bail!("auth.token_ttl_secs must be positive");
        }
        if self.database.max_connections == 0 {
            bail!("database.max_connections must be positive");
        }
        Ok(())
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.auth.secret == DEV_SECRET
    }
}

fn expand_env_vars(input: &str, lookup: &impl Fn(&str) -> Option<String>) -> Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or_else(|| anyhow!("unterminated ${{...}} in config"))?;
        let name = &after[..end];
        if name.is_empty() {
            bail!("empty ${{}} in config");
        }
        let value = lookup(name)
            .ok_or_else(|| anyhow!("environment variable {name} is not set"))?;
        out.push_str(&value);
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}
