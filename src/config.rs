//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;

/// Onboarding service configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address the HTTP server binds to.
    pub bind: String,
    /// HTTP port.
    pub port: u16,
    /// Backend endpoint that receives finished onboarding records.
    /// `None` means submissions are accepted locally.
    pub submit_url: Option<String>,
    /// Request timeout for the submission backend.
    pub submit_timeout: Duration,
    /// Route the user is sent to once onboarding completes.
    pub dashboard_route: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8080,
            submit_url: None,
            submit_timeout: Duration::from_secs(10),
            dashboard_route: "/dashboard".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bind = lookup("ONBOARD_BIND").unwrap_or(defaults.bind);

        let port = match lookup("ONBOARD_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                key: "ONBOARD_PORT".to_string(),
                message: format!("{raw:?} is not a port number ({e})"),
            })?,
            None => defaults.port,
        };

        let submit_url = lookup("ONBOARD_SUBMIT_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        if let Some(ref url) = submit_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidValue {
                    key: "ONBOARD_SUBMIT_URL".to_string(),
                    message: format!("{url:?} must be an http(s) URL"),
                });
            }
        }

        let submit_timeout = match lookup("ONBOARD_SUBMIT_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                    key: "ONBOARD_SUBMIT_TIMEOUT_SECS".to_string(),
                    message: format!("{raw:?} is not a number of seconds ({e})"),
                })?;
                Duration::from_secs(secs)
            }
            None => defaults.submit_timeout,
        };

        let dashboard_route = lookup("ONBOARD_DASHBOARD_ROUTE").unwrap_or(defaults.dashboard_route);

        Ok(Self {
            bind,
            port,
            submit_url,
            submit_timeout,
            dashboard_route,
        })
    }

    /// `bind:port` string for the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
