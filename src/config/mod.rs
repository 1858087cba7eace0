// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Configuration module for the RouterOS client
//!
//! Connection options and login credentials, loadable from environment
//! variables and JSON.

use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;


/// Default configuration values
pub mod defaults {
    /// Factory-default RouterOS address
    pub const HOST: &str = "192.168.88.1";
    pub const API_PORT: u16 = 8728;
    pub const API_TLS_PORT: u16 = 8729;
    pub const TIMEOUT_MS: u64 = 30_000;
    pub const USERNAME: &str = "admin";
    pub const PASSWORD: &str = "";
}

/// Environment variable names used by the loaders
pub mod env_vars {
    pub const CLIENT_CONFIG: &str = "ROUTEROS_CLIENT_CONFIG";
    pub const HOST: &str = "ROUTEROS_HOST";
    pub const PORT: &str = "ROUTEROS_PORT";
    pub const SSL: &str = "ROUTEROS_SSL";
    pub const TIMEOUT_MS: &str = "ROUTEROS_TIMEOUT_MS";
    pub const USERNAME: &str = "ROUTEROS_USERNAME";
    pub const PASSWORD: &str = "ROUTEROS_PASSWORD";
}

fn default_timeout_ms() -> u64 {
    defaults::TIMEOUT_MS
}

/// Connection options for a single router
///
/// The port defaults by scheme: 8728 for plain TCP, 8729 when `ssl` is
/// set. RouterOS ships self-signed certificates, so the TLS path performs
/// no CA validation.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientOptions {
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub ssl: bool,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl ClientOptions {
    /// Creates options for `host` with scheme defaults everywhere else
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            ssl: false,
            timeout_ms: defaults::TIMEOUT_MS,
        }
    }

    /// The configured port, or the default for the chosen scheme
    #[must_use]
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(if self.ssl {
            defaults::API_TLS_PORT
        } else {
            defaults::API_PORT
        })
    }

    /// Connect timeout as a [`Duration`]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validates the options
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("Router host cannot be empty".to_string());
        }
        if self.port == Some(0) {
            return Err(format!("Invalid port 0 for router '{}'", self.host));
        }
        if self.timeout_ms == 0 {
            return Err(format!("Timeout cannot be zero for router '{}'", self.host));
        }
        Ok(())
    }

    /// Loads options from environment variables.
    ///
    /// `ROUTEROS_CLIENT_CONFIG` may hold the whole options object as JSON;
    /// otherwise the individual `ROUTEROS_*` variables are read, falling
    /// back to the factory defaults.
    #[must_use]
    pub fn from_env() -> Self {
        if let Ok(config_json) = std::env::var(env_vars::CLIENT_CONFIG) {
            match serde_json::from_str(&config_json) {
                Ok(options) => return options,
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse {}: {}. Falling back to individual variables.",
                        env_vars::CLIENT_CONFIG,
                        e
                    );
                }
            }
        }

        let host =
            std::env::var(env_vars::HOST).unwrap_or_else(|_| defaults::HOST.to_string());
        let port = std::env::var(env_vars::PORT)
            .ok()
            .and_then(|v| v.parse().ok());
        let ssl = std::env::var(env_vars::SSL)
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let timeout_ms = std::env::var(env_vars::TIMEOUT_MS)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults::TIMEOUT_MS);

        Self {
            host,
            port,
            ssl,
            timeout_ms,
        }
    }
}

/// Login credentials for the RouterOS API
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        let password: String = password.into();
        Self {
            username: username.into(),
            password: SecretString::new(password.into_boxed_str()),
        }
    }

    /// Validates the credentials
    pub fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() {
            return Err("Username cannot be empty".to_string());
        }
        Ok(())
    }

    /// Loads credentials from `ROUTEROS_USERNAME` / `ROUTEROS_PASSWORD`
    #[must_use]
    pub fn from_env() -> Self {
        let username = std::env::var(env_vars::USERNAME)
            .unwrap_or_else(|_| defaults::USERNAME.to_string());
        let password = std::env::var(env_vars::PASSWORD)
            .unwrap_or_else(|_| defaults::PASSWORD.to_string());
        Self {
            username,
            password: SecretString::new(password.into_boxed_str()),
        }
    }
}
