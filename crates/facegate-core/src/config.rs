//! Device configuration.
//!
//! All settings are fixed at build time: [`DeviceConfig::default`] assembles
//! them from [`constants`](crate::constants), and the binary hands each
//! section to the component that needs it. There are no global handles.
//!
//! ```
//! use facegate_core::DeviceConfig;
//! use std::time::Duration;
//!
//! let config = DeviceConfig::default();
//! config.validate().unwrap();
//!
//! assert_eq!(config.timing.unlock_duration, Duration::from_secs(5));
//! assert_eq!(config.network.connect_attempts, 20);
//! ```

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{Error, Result};
use crate::types::{Credentials, PinNumber};

/// GPIO assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinConfig {
    /// Manual trigger input (active-low, pulled up).
    pub trigger: PinNumber,

    /// Lock actuator output (HIGH = unlocked).
    pub lock: PinNumber,

    /// Success indicator output (active-high).
    pub success_led: PinNumber,

    /// Failure indicator output (active-high).
    pub failure_led: PinNumber,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            trigger: PinNumber::from_constant(DEFAULT_TRIGGER_PIN),
            lock: PinNumber::from_constant(DEFAULT_LOCK_PIN),
            success_led: PinNumber::from_constant(DEFAULT_SUCCESS_LED_PIN),
            failure_led: PinNumber::from_constant(DEFAULT_FAILURE_LED_PIN),
        }
    }
}

impl PinConfig {
    fn validate(&self) -> Result<()> {
        let pins = [self.trigger, self.lock, self.success_led, self.failure_led];
        let unique: HashSet<_> = pins.iter().collect();
        if unique.len() != pins.len() {
            return Err(Error::config(format!(
                "Pin assignments must be distinct: trigger={}, lock={}, success={}, failure={}",
                self.trigger, self.lock, self.success_led, self.failure_led
            )));
        }
        Ok(())
    }
}

/// Sampling and actuation timings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Settle delay between the two confirming trigger samples.
    pub debounce: Duration,

    /// Delay between idle trigger polls.
    pub poll_interval: Duration,

    /// Delay between samples while waiting for release.
    pub release_poll: Duration,

    /// Time the lock stays open after a positive verdict.
    pub unlock_duration: Duration,

    /// Time the failure indicator stays lit after a denial.
    pub denial_duration: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            release_poll: Duration::from_millis(DEFAULT_RELEASE_POLL_MS),
            unlock_duration: Duration::from_millis(DEFAULT_UNLOCK_DURATION_MS),
            denial_duration: Duration::from_millis(DEFAULT_DENIAL_DURATION_MS),
        }
    }
}

impl TimingConfig {
    fn validate(&self) -> Result<()> {
        let named = [
            ("debounce", self.debounce),
            ("poll_interval", self.poll_interval),
            ("release_poll", self.release_poll),
            ("unlock_duration", self.unlock_duration),
            ("denial_duration", self.denial_duration),
        ];
        for (name, value) in named {
            if value.is_zero() {
                return Err(Error::config(format!("{name} must be greater than zero")));
            }
        }
        Ok(())
    }
}

/// Network link settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Credentials handed to the link on connect.
    pub credentials: Credentials,

    /// Interface watched by the host link (e.g. `wlan0`).
    pub interface: String,

    /// Interval between status polls while connecting.
    pub connect_interval: Duration,

    /// Number of status polls before giving up.
    pub connect_attempts: u32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            credentials: Credentials::new("YOUR_WIFI_SSID", "YOUR_WIFI_PASSWORD"),
            interface: DEFAULT_INTERFACE.to_string(),
            connect_interval: Duration::from_millis(DEFAULT_CONNECT_INTERVAL_MS),
            connect_attempts: DEFAULT_CONNECT_ATTEMPTS,
        }
    }
}

impl NetworkConfig {
    /// Upper bound on how long one `connect` call may wait.
    #[must_use]
    pub fn connect_budget(&self) -> Duration {
        self.connect_interval * self.connect_attempts
    }

    fn validate(&self) -> Result<()> {
        if self.connect_attempts == 0 {
            return Err(Error::config("connect_attempts must be at least 1"));
        }
        if self.connect_interval.is_zero() {
            return Err(Error::config("connect_interval must be greater than zero"));
        }
        if self.interface.trim().is_empty() {
            return Err(Error::MissingConfig("network.interface".to_string()));
        }
        Ok(())
    }
}

/// Recognition service endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Recognition endpoint (POST).
    pub recognize_url: String,

    /// Health endpoint (GET).
    pub health_url: String,

    /// Deadline for one exchange, connect to last body byte.
    pub request_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            recognize_url: DEFAULT_RECOGNIZE_URL.to_string(),
            health_url: DEFAULT_HEALTH_URL.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

impl ServiceConfig {
    fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("recognize_url", &self.recognize_url),
            ("health_url", &self.health_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::config(format!(
                    "{name} must be an http(s) URL, got {url:?}"
                )));
            }
        }
        if self.request_timeout.is_zero() {
            return Err(Error::config("request_timeout must be greater than zero"));
        }
        Ok(())
    }
}

/// Complete controller configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub pins: PinConfig,
    pub timing: TimingConfig,
    pub network: NetworkConfig,
    pub service: ServiceConfig,
}

impl DeviceConfig {
    /// Check every section for values the controller cannot run with.
    ///
    /// # Errors
    /// Returns `Error::Config` or `Error::MissingConfig` describing the first
    /// offending setting.
    pub fn validate(&self) -> Result<()> {
        self.pins.validate()?;
        self.timing.validate()?;
        self.network.validate()?;
        self.service.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(DeviceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_pins() {
        let pins = PinConfig::default();
        assert_eq!(pins.trigger.as_u8(), 13);
        assert_eq!(pins.lock.as_u8(), 12);
        assert_eq!(pins.success_led.as_u8(), 14);
        assert_eq!(pins.failure_led.as_u8(), 15);
    }

    #[test]
    fn test_duplicate_pins_rejected() {
        let mut config = DeviceConfig::default();
        config.pins.success_led = config.pins.lock;

        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_unlock_duration_rejected() {
        let mut config = DeviceConfig::default();
        config.timing.unlock_duration = Duration::ZERO;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("unlock_duration"));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let mut config = DeviceConfig::default();
        config.network.connect_attempts = 0;

        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_interface_rejected() {
        let mut config = DeviceConfig::default();
        config.network.interface = "  ".to_string();

        assert_eq!(
            config.validate(),
            Err(Error::MissingConfig("network.interface".to_string()))
        );
    }

    #[test]
    fn test_non_http_url_rejected() {
        let mut config = DeviceConfig::default();
        config.service.recognize_url = "ftp://example.com/recognize".to_string();

        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_connect_budget() {
        let network = NetworkConfig::default();
        assert_eq!(network.connect_budget(), Duration::from_secs(10));
    }
}
