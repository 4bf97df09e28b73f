//! Build-time defaults for the access controller.
//!
//! Every timing, pin assignment and endpoint the controller uses has a
//! default here. The values are collected into a
//! [`DeviceConfig`](crate::config::DeviceConfig) at startup and passed
//! explicitly into each component; nothing reads these constants at runtime
//! behind the caller's back.
//!
//! # Usage
//!
//! ```
//! use facegate_core::constants::*;
//! use std::time::Duration;
//!
//! let debounce = Duration::from_millis(DEFAULT_DEBOUNCE_MS);
//! assert_eq!(debounce.as_millis(), 50);
//!
//! // The connect loop never waits longer than attempts × interval.
//! let worst_case = DEFAULT_CONNECT_ATTEMPTS as u64 * DEFAULT_CONNECT_INTERVAL_MS;
//! assert_eq!(worst_case, 10_000);
//! ```

// ============================================================================
// Trigger Sampling
// ============================================================================

/// Settle delay between the two trigger samples that confirm a press.
///
/// A press only counts when the trigger reads asserted, then reads asserted
/// again after this delay.
pub const DEFAULT_DEBOUNCE_MS: u64 = 50;

/// Delay between trigger polls while the controller is idle.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Delay between samples while waiting for the trigger to be released.
pub const DEFAULT_RELEASE_POLL_MS: u64 = 10;

// ============================================================================
// Actuation
// ============================================================================

/// How long the lock stays open after a positive verdict (milliseconds).
pub const DEFAULT_UNLOCK_DURATION_MS: u64 = 5_000;

/// How long the failure indicator stays lit after a denial (milliseconds).
pub const DEFAULT_DENIAL_DURATION_MS: u64 = 2_000;

// ============================================================================
// Connectivity
// ============================================================================

/// Interval between link status polls while connecting (milliseconds).
pub const DEFAULT_CONNECT_INTERVAL_MS: u64 = 500;

/// Maximum number of link status polls before giving up.
pub const DEFAULT_CONNECT_ATTEMPTS: u32 = 20;

/// Network interface watched by the host link.
pub const DEFAULT_INTERFACE: &str = "wlan0";

// ============================================================================
// Recognition Service
// ============================================================================

/// Recognition endpoint on the local network.
pub const DEFAULT_RECOGNIZE_URL: &str = "http://192.168.1.100:5000/recognize";

/// Health endpoint exposed by the same service.
pub const DEFAULT_HEALTH_URL: &str = "http://192.168.1.100:5000/health";

/// Deadline for one recognition exchange (milliseconds).
///
/// Covers connect, send and the full response body. Exceeding it is reported
/// as a transport failure.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// JSON field carrying the encoded image in a recognition request.
pub const IMAGE_FIELD: &str = "image";

/// Content type of recognition requests.
pub const CONTENT_TYPE_JSON: &str = "application/json";

// ============================================================================
// Pin Assignments
// ============================================================================

/// Lock actuator output (HIGH = unlocked).
pub const DEFAULT_LOCK_PIN: u8 = 12;

/// Manual trigger input (active-low, pulled up).
pub const DEFAULT_TRIGGER_PIN: u8 = 13;

/// Green indicator output (active-high).
pub const DEFAULT_SUCCESS_LED_PIN: u8 = 14;

/// Red indicator output (active-high).
pub const DEFAULT_FAILURE_LED_PIN: u8 = 15;

/// Highest GPIO number accepted by the configuration.
pub const MAX_PIN_NUMBER: u8 = 63;

// ============================================================================
// Recognition Result
// ============================================================================

/// Lowest valid confidence reported by the service.
pub const MIN_CONFIDENCE: f32 = 0.0;

/// Highest valid confidence reported by the service.
pub const MAX_CONFIDENCE: f32 = 1.0;
