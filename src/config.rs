//! Capacities and runtime settings.
//!
//! Capacities are compile time: each bounded structure takes its size as a
//! const generic, and the constants below are the defaults used on the
//! device. Everything that may change per deployment (API hosts and
//! credentials, timing) lives in [`Config`], read from the firmware's JSON
//! settings document.
//!
//! ```rust
//! use libatmoscan::config::Config;
//!
//! let config = Config::from_json(r#"{"place_user":"demo","retry_interval_ms":30000}"#).unwrap();
//! assert_eq!(config.place_user.as_str(), "demo");
//! assert_eq!(config.retry_interval_ms, 30_000);
//! assert_eq!(config.step_interval_ms, 1_000); // defaulted
//! ```

use heapless::String;
use serde::Deserialize;

use crate::network::application::http::RetryPolicy;

/// Tracked entities the traffic table can hold. One slot is kept free, so
/// at most `MAX_ENTITIES - 1` records are committed.
pub const MAX_ENTITIES: usize = 20;
/// Trail groups buffered per entity while its trail array streams in.
pub const TRAIL_SCRATCH: usize = 20;
/// Points kept in each entity's finished trail.
pub const TRAIL_LEN: usize = 10;
/// Chart columns (samples) kept by the rolling chart.
pub const CHART_DEPTH: usize = 195;
/// Messages kept by the error log.
pub const ERROR_LOG_DEPTH: usize = 18;
/// WiFi access points sent with a fix request.
pub const MAX_ACCESS_POINTS: usize = 8;

/// Host names and credentials are stored inline with this capacity.
pub const SETTING_LEN: usize = 64;

/// Errors raised while loading [`Config`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// The settings document is not valid JSON or has a mistyped field.
    Malformed,
    /// A string setting does not fit in [`SETTING_LEN`] bytes.
    TooLong,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Malformed => defmt::write!(f, "Malformed"),
            Error::TooLong => defmt::write!(f, "TooLong"),
        }
    }
}

/// Runtime settings of the ingestion layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub user_agent: String<SETTING_LEN>,
    /// Traffic feed host (`host:port`).
    pub traffic_host: String<SETTING_LEN>,
    /// WiFi geolocation host.
    pub fix_host: String<SETTING_LEN>,
    pub timezone_host: String<SETTING_LEN>,
    pub place_host: String<SETTING_LEN>,
    /// API key of the timezone service.
    pub timezone_key: String<SETTING_LEN>,
    /// Account name of the place-name service.
    pub place_user: String<SETTING_LEN>,
    /// Busy-wait applied while waiting for response bytes.
    pub retry: RetryPolicy,
    /// Re-tick delay after a successful acquisition step.
    pub step_interval_ms: u32,
    /// Re-tick delay after a failed acquisition step.
    pub retry_interval_ms: u32,
}

fn setting(value: &str) -> String<SETTING_LEN> {
    let mut out = String::new();
    crate::json::set_truncated(&mut out, value);
    out
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: setting("ATMOSCAN"),
            traffic_host: setting("public-api.adsbexchange.com:80"),
            fix_host: setting("api.mylnikov.org:80"),
            timezone_host: setting("api.timezonedb.com:80"),
            place_host: setting("api.geonames.org:80"),
            timezone_key: String::new(),
            place_user: String::new(),
            retry: RetryPolicy::default(),
            step_interval_ms: 1_000,
            retry_interval_ms: 15_000,
        }
    }
}

impl Config {
    /// Parses a settings document; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        match serde_json_core::from_str::<Config>(json) {
            Ok((config, _)) => Ok(config),
            Err(serde_json_core::de::Error::CustomError) => Err(Error::TooLong),
            Err(_) => Err(Error::Malformed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_device() {
        let config = Config::default();
        assert_eq!(config.retry.attempts, 10);
        assert_eq!(config.retry.interval_ms, 1_000);
        assert_eq!(config.step_interval_ms, 1_000);
        assert_eq!(config.retry_interval_ms, 15_000);
        assert_eq!(config.fix_host.as_str(), "api.mylnikov.org:80");
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config =
            Config::from_json(r#"{"timezone_key":"K3Y","retry":{"attempts":3,"interval_ms":250}}"#)
                .unwrap();
        assert_eq!(config.timezone_key.as_str(), "K3Y");
        assert_eq!(config.retry, RetryPolicy { attempts: 3, interval_ms: 250 });
        assert_eq!(config.place_host.as_str(), "api.geonames.org:80");
    }

    #[test]
    fn test_rejects_malformed_document() {
        assert_eq!(Config::from_json(r#"{"step_interval_ms":"soon"}"#), Err(Error::Malformed));
        assert_eq!(Config::from_json("{"), Err(Error::Malformed));
    }
}
