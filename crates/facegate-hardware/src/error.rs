//! Error types for peripheral operations.
//!
//! Pin reads and writes against real hardware can fail (a sysfs line that was
//! never exported, a permission problem, a vanished device). These errors stop
//! at the [`PeripheralInterface`](crate::peripherals::PeripheralInterface)
//! boundary, which logs them and degrades to the safe interpretation.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during peripheral operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Pin has not been exported or has been released.
    #[error("Pin unavailable: {pin}")]
    Unavailable { pin: String },

    /// Value read from the pin could not be interpreted.
    #[error("Invalid pin value: {message}")]
    InvalidValue { message: String },

    /// Pin setup failed.
    #[error("Initialization failed: {message}")]
    InitializationFailed { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new unavailable pin error.
    pub fn unavailable(pin: impl Into<String>) -> Self {
        Self::Unavailable { pin: pin.into() }
    }

    /// Create a new invalid value error.
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidValue {
            message: message.into(),
        }
    }

    /// Create a new initialization failed error.
    pub fn initialization_failed(message: impl Into<String>) -> Self {
        Self::InitializationFailed {
            message: message.into(),
        }
    }
}
