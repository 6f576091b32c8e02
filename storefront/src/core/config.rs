//! Storefront configuration

use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;

use crate::hours::{EngineOptions, Locale};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Storefront configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL; the in-memory store is used when absent
    pub database_url: Option<String>,
    /// Pool size for the PostgreSQL store
    pub database_max_connections: u32,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// Restaurant time zone
    pub timezone: Tz,
    pub schedule_cache_ttl: Duration,
    /// Unconditional refresh period of the background refresher
    pub schedule_refresh_interval: Duration,
    /// Tolerance for order times slightly in the past
    pub order_past_grace: Duration,
    pub display_locale: Locale,
    /// Bearer token for admin routes
    pub admin_token: String,
    pub log_level: Option<String>,
    pub log_json: bool,
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from any name → value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BoxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let environment = var("ENVIRONMENT").unwrap_or_else(|| "development".into());

        Ok(Self {
            database_url: var("DATABASE_URL"),
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", var("DATABASE_MAX_CONNECTIONS"), 5),
            http_port: parse_or("HTTP_PORT", var("HTTP_PORT"), 8080),
            timezone: parse_or("TIMEZONE", var("TIMEZONE"), chrono_tz::Europe::Rome),
            schedule_cache_ttl: Duration::from_secs(parse_or(
                "SCHEDULE_CACHE_TTL_SECS",
                var("SCHEDULE_CACHE_TTL_SECS"),
                300,
            )),
            schedule_refresh_interval: Duration::from_secs(
                parse_or::<u64>(
                    "SCHEDULE_REFRESH_INTERVAL_SECS",
                    var("SCHEDULE_REFRESH_INTERVAL_SECS"),
                    300,
                )
                .max(1),
            ),
            order_past_grace: Duration::from_secs(parse_or(
                "ORDER_PAST_GRACE_SECS",
                var("ORDER_PAST_GRACE_SECS"),
                60,
            )),
            display_locale: parse_or("DISPLAY_LOCALE", var("DISPLAY_LOCALE"), Locale::En),
            admin_token: Self::require_secret("ADMIN_TOKEN", var("ADMIN_TOKEN"), &environment)?,
            log_level: var("LOG_LEVEL"),
            log_json: var("LOG_JSON")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            log_dir: var("LOG_DIR"),
            environment,
        })
    }

    /// Secret that must be set outside development
    fn require_secret(name: &str, value: Option<String>, environment: &str) -> Result<String, BoxError> {
        match value {
            Some(v) => Ok(v),
            None if environment == "development" => Ok(format!("dev-{name}-not-for-production")),
            None => Err(format!("{name} must be set in {environment} environment").into()),
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            cache_ttl: to_chrono(self.schedule_cache_ttl),
            timezone: self.timezone,
            order_grace: to_chrono(self.order_past_grace),
            locale: self.display_locale,
        }
    }
}

/// Parse a value, warning and falling back to `default` when malformed
fn parse_or<T>(name: &str, value: Option<String>, default: T) -> T
where
    T: FromStr,
{
    match value {
        None => default,
        Some(raw) => match raw.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(var = name, value = %raw, "Invalid configuration value, using default");
                default
            }
        },
    }
}

fn to_chrono(d: Duration) -> chrono::Duration {
    chrono::Duration::from_std(d).unwrap_or(chrono::Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, BoxError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert!(config.database_url.is_none());
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.environment, "development");
        assert_eq!(config.timezone, chrono_tz::Europe::Rome);
        assert_eq!(config.schedule_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.schedule_refresh_interval, Duration::from_secs(300));
        assert_eq!(config.order_past_grace, Duration::from_secs(60));
        assert_eq!(config.display_locale, Locale::En);
        assert!(!config.log_json);
        assert!(config.is_development());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/pizzeria"),
            ("HTTP_PORT", "9000"),
            ("TIMEZONE", "Europe/Madrid"),
            ("SCHEDULE_CACHE_TTL_SECS", "30"),
            ("DISPLAY_LOCALE", "it"),
            ("LOG_JSON", "true"),
        ])
        .unwrap();
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/pizzeria"));
        assert_eq!(config.http_port, 9000);
        assert_eq!(config.timezone, chrono_tz::Europe::Madrid);
        assert_eq!(config.engine_options().cache_ttl, chrono::Duration::seconds(30));
        assert_eq!(config.display_locale, Locale::It);
        assert!(config.log_json);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = load(&[
            ("HTTP_PORT", "eighty"),
            ("TIMEZONE", "Mars/Olympus"),
            ("DISPLAY_LOCALE", "klingon"),
            ("SCHEDULE_REFRESH_INTERVAL_SECS", "0"),
        ])
        .unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.timezone, chrono_tz::Europe::Rome);
        assert_eq!(config.display_locale, Locale::En);
        assert_eq!(config.schedule_refresh_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_admin_token_required_outside_development() {
        assert!(load(&[("ENVIRONMENT", "production")]).is_err());

        let config = load(&[("ENVIRONMENT", "production"), ("ADMIN_TOKEN", "s3cret")]).unwrap();
        assert_eq!(config.admin_token, "s3cret");
        assert!(!config.is_development());
    }
}
