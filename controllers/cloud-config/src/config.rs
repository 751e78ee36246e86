//! Controller configuration from environment variables

use crate::error::ControllerError;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_CONCURRENCY: u16 = 3;
const DEFAULT_DEBOUNCE_SECONDS: u64 = 5;
const DEFAULT_BACKOFF_MIN_SECONDS: u64 = 30;
const DEFAULT_BACKOFF_MAX_SECONDS: u64 = 600;
const DEFAULT_METRICS_ADDR: &str = "0.0.0.0:8080";

/// Runtime settings of the controller
#[derive(Debug, Clone)]
pub struct Config {
    /// Only Clusters matching this label selector are reconciled
    pub label_selector: Option<String>,
    pub concurrency: u16,
    pub debounce: Duration,
    pub backoff_min_seconds: u64,
    pub backoff_max_seconds: u64,
    /// Listen address of the probe and metrics server
    pub metrics_addr: SocketAddr,
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ControllerError> {
        let label_selector = lookup("WATCH_LABEL_SELECTOR").filter(|s| !s.trim().is_empty());
        let concurrency = parse_or(&lookup, "RECONCILE_CONCURRENCY", DEFAULT_CONCURRENCY)?;
        let debounce = parse_or(&lookup, "RECONCILE_DEBOUNCE_SECONDS", DEFAULT_DEBOUNCE_SECONDS)?;
        let backoff_min_seconds =
            parse_or(&lookup, "BACKOFF_MIN_SECONDS", DEFAULT_BACKOFF_MIN_SECONDS)?;
        let backoff_max_seconds =
            parse_or(&lookup, "BACKOFF_MAX_SECONDS", DEFAULT_BACKOFF_MAX_SECONDS)?;
        let metrics_addr = match lookup("METRICS_ADDR") {
            Some(addr) => parse("METRICS_ADDR", &addr)?,
            None => parse("METRICS_ADDR", DEFAULT_METRICS_ADDR)?,
        };

        if concurrency == 0 {
            return Err(ControllerError::InvalidConfig(
                "RECONCILE_CONCURRENCY must be at least 1".to_string(),
            ));
        }
        if backoff_min_seconds == 0 || backoff_min_seconds > backoff_max_seconds {
            return Err(ControllerError::InvalidConfig(format!(
                "BACKOFF_MIN_SECONDS ({}) must be between 1 and BACKOFF_MAX_SECONDS ({})",
                backoff_min_seconds, backoff_max_seconds
            )));
        }

        Ok(Self {
            label_selector,
            concurrency,
            debounce: Duration::from_secs(debounce),
            backoff_min_seconds,
            backoff_max_seconds,
            metrics_addr,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ControllerError>
where
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(value) => parse(key, &value),
        None => Ok(default),
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, ControllerError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| {
        ControllerError::InvalidConfig(format!("{}={:?}: {}", key, value, e))
    })
}
