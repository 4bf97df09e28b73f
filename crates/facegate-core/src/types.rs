use crate::{
    Result,
    constants::{MAX_CONFIDENCE, MAX_PIN_NUMBER, MIN_CONFIDENCE},
    error::Error,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// GPIO line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PinNumber(u8);

impl PinNumber {
    /// Create a new pin number with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidPin` if the number exceeds `MAX_PIN_NUMBER`.
    pub fn new(pin: u8) -> Result<Self> {
        if pin > MAX_PIN_NUMBER {
            return Err(Error::InvalidPin(format!(
                "Pin must be 0-{MAX_PIN_NUMBER}, got {pin}"
            )));
        }
        Ok(PinNumber(pin))
    }

    /// Create a pin number from a compile-time constant (for internal use).
    ///
    /// Caller must ensure the pin is in range 0-`MAX_PIN_NUMBER`.
    pub(crate) const fn from_constant(pin: u8) -> Self {
        assert!(pin <= MAX_PIN_NUMBER, "Pin out of range");
        PinNumber(pin)
    }

    #[must_use]
    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for PinNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}

/// Position of the lock actuator.
///
/// The actuator is a single output: HIGH drives the latch open, LOW holds it
/// closed. `Locked` is the default and the state every failure resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    #[default]
    Locked,
    Unlocked,
}

impl LockState {
    /// Output level that realizes this state on the actuator pin.
    #[must_use]
    pub fn output_level(&self) -> bool {
        matches!(self, LockState::Unlocked)
    }
}

impl fmt::Display for LockState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LockState::Locked => write!(f, "Locked"),
            LockState::Unlocked => write!(f, "Unlocked"),
        }
    }
}

/// Indicator light channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    /// Green light, lit while the lock is open.
    Success,
    /// Red light, lit while a denial is displayed.
    Failure,
}

impl Indicator {
    /// The opposite channel.
    #[must_use]
    pub fn other(&self) -> Self {
        match self {
            Indicator::Success => Indicator::Failure,
            Indicator::Failure => Indicator::Success,
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Indicator::Success => write!(f, "success"),
            Indicator::Failure => write!(f, "failure"),
        }
    }
}

/// Network link lifecycle as tracked by the connectivity manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            ConnectivityState::Disconnected => "Disconnected",
            ConnectivityState::Connecting => "Connecting",
            ConnectivityState::Connected => "Connected",
        };
        write!(f, "{s}")
    }
}

/// Network credentials handed to the link when connecting.
///
/// # Security
/// The passphrase never appears in `Debug` output, so credentials can be
/// logged as part of a configuration dump.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub ssid: String,
    pub passphrase: String,
}

impl Credentials {
    pub fn new(ssid: impl Into<String>, passphrase: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            passphrase: passphrase.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("ssid", &self.ssid)
            .field("passphrase", &"<redacted>")
            .finish()
    }
}

/// Opaque image bytes produced by the capture provider.
///
/// An empty payload means no capture was available. It is still sent to the
/// service and can never authenticate anyone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImagePayload(Bytes);

impl ImagePayload {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self(data.into())
    }

    /// Payload for "no capture available".
    #[must_use]
    pub fn empty() -> Self {
        Self(Bytes::new())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for ImagePayload {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&'static [u8]> for ImagePayload {
    fn from(data: &'static [u8]) -> Self {
        Self::new(Bytes::from_static(data))
    }
}

/// Verdict of one recognition exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    /// Whether the service matched the image to a known subject.
    pub authenticated: bool,

    /// Matched subject, if the service named one.
    pub subject_name: Option<String>,

    /// Match confidence in `[0, 1]`.
    pub confidence: f32,

    /// Diagnostic text from the service (e.g. "No face detected").
    pub message: Option<String>,
}

impl RecognitionResult {
    /// Create a result, validating the confidence range.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfidence` if `confidence` is NaN or outside `[0, 1]`.
    pub fn new(
        authenticated: bool,
        subject_name: Option<String>,
        confidence: f32,
    ) -> Result<Self> {
        if !(MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&confidence) {
            return Err(Error::InvalidConfidence(format!(
                "Confidence must be {MIN_CONFIDENCE}-{MAX_CONFIDENCE}, got {confidence}"
            )));
        }
        Ok(Self {
            authenticated,
            subject_name,
            confidence,
            message: None,
        })
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Subject name for log lines.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject_name.as_deref().unwrap_or("Unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0)]
    #[case(13)]
    #[case(MAX_PIN_NUMBER)]
    fn test_pin_number_valid(#[case] pin: u8) {
        assert_eq!(PinNumber::new(pin).unwrap().as_u8(), pin);
    }

    #[test]
    fn test_pin_number_out_of_range() {
        assert!(matches!(
            PinNumber::new(MAX_PIN_NUMBER + 1),
            Err(Error::InvalidPin(_))
        ));
    }

    #[test]
    fn test_pin_number_display() {
        assert_eq!(PinNumber::new(12).unwrap().to_string(), "GPIO12");
    }

    #[test]
    fn test_lock_state_defaults_to_locked() {
        assert_eq!(LockState::default(), LockState::Locked);
    }

    #[test]
    fn test_lock_state_output_level() {
        assert!(LockState::Unlocked.output_level());
        assert!(!LockState::Locked.output_level());
    }

    #[test]
    fn test_indicator_other() {
        assert_eq!(Indicator::Success.other(), Indicator::Failure);
        assert_eq!(Indicator::Failure.other(), Indicator::Success);
    }

    #[test]
    fn test_connectivity_state_default() {
        assert_eq!(ConnectivityState::default(), ConnectivityState::Disconnected);
    }

    #[test]
    fn test_credentials_debug_redacts_passphrase() {
        let credentials = Credentials::new("office", "hunter2");
        let debug = format!("{credentials:?}");

        assert!(debug.contains("office"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_image_payload_empty() {
        let payload = ImagePayload::empty();
        assert!(payload.is_empty());
        assert_eq!(payload.len(), 0);
        assert_eq!(payload, ImagePayload::default());
    }

    #[test]
    fn test_image_payload_from_vec() {
        let payload = ImagePayload::from(vec![0xFF, 0xD8, 0xFF]);
        assert_eq!(payload.as_bytes(), &[0xFF, 0xD8, 0xFF]);
    }

    #[rstest]
    #[case(0.0)]
    #[case(0.97)]
    #[case(1.0)]
    fn test_recognition_result_valid_confidence(#[case] confidence: f32) {
        let result = RecognitionResult::new(true, Some("alice".into()), confidence).unwrap();
        assert_eq!(result.confidence, confidence);
        assert_eq!(result.subject(), "alice");
    }

    #[rstest]
    #[case(-0.1)]
    #[case(1.5)]
    #[case(f32::NAN)]
    fn test_recognition_result_invalid_confidence(#[case] confidence: f32) {
        assert!(matches!(
            RecognitionResult::new(true, None, confidence),
            Err(Error::InvalidConfidence(_))
        ));
    }

    #[test]
    fn test_recognition_result_unknown_subject() {
        let result = RecognitionResult::new(false, None, 0.0)
            .unwrap()
            .with_message("No face detected");
        assert_eq!(result.subject(), "Unknown");
        assert_eq!(result.message.as_deref(), Some("No face detected"));
    }

    #[test]
    fn test_lock_state_serialization() {
        let json = serde_json::to_string(&LockState::Unlocked).unwrap();
        assert_eq!(json, "\"unlocked\"");
    }
}
