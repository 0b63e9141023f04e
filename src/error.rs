//! Error types for stepper-coils.
//!
//! Configuration errors are raised once, while building a motor. Motor errors
//! are raised at the call site of a stepping operation.

use core::fmt;

use crate::motion::StepStyle;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all stepper-coils operations.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Motor operation error
    Motor(MotorError),
}

/// Configuration-related errors.
///
/// These are fatal to motor creation and never retried.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Invalid microstep count (must be even and at least 2; the curve
    /// table holds at most 256)
    InvalidMicrosteps(u16),
    /// Steps per revolution must be positive
    InvalidStepsPerRevolution(u16),
    /// A PWM channel runs below 1500 Hz and its frequency cannot be changed
    PwmFrequencyTooLow {
        /// Coil slot in drive order
        coil: u8,
        /// Frequency reported by the channel
        frequency_hz: u32,
    },
    /// A PWM channel's duty range differs from the requested resolution
    DutyResolutionMismatch {
        /// Coil slot in drive order
        coil: u8,
        /// Duty maximum required by the resolution
        required: u16,
        /// Duty maximum offered by the channel
        available: u16,
    },
    /// The configured duty resolution differs from the coils'
    ResolutionMismatch {
        /// Duty maximum from the motor configuration
        configured: u16,
        /// Duty maximum reported by the coils
        coils: u16,
    },
    /// Microstepping was requested on digital coils
    MicrostepsRequirePwm,
    /// PWM coils were given without a microstep count
    PwmRequiresMicrosteps,
    /// A required builder field was not provided
    MissingField(&'static str),
    /// Motor name not found in configuration
    MotorNotFound(heapless::String<32>),
    /// The same pin is assigned to two coils
    DuplicatePin(u8),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Motor operation errors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorError {
    /// Pin or PWM channel write failed
    PinError,
    /// Style cannot be used in the motor's drive mode
    UnsupportedStyle(StepStyle),
    /// Raw style value does not name a style
    InvalidStyle(u8),
    /// Speed must be finite and positive
    InvalidSpeed(f32),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Motor(e) => write!(f, "Motor error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidMicrosteps(v) => {
                write!(
                    f,
                    "Invalid microsteps: {}. Must be even and at least 2; curve table capacity is 256",
                    v
                )
            }
            ConfigError::InvalidStepsPerRevolution(v) => {
                write!(f, "Invalid steps per revolution: {}. Must be > 0", v)
            }
            ConfigError::PwmFrequencyTooLow { coil, frequency_hz } => write!(
                f,
                "PWM coil {} runs at {} Hz; outputs must be at least 1500 Hz or allow variable frequency",
                coil, frequency_hz
            ),
            ConfigError::DutyResolutionMismatch {
                coil,
                required,
                available,
            } => write!(
                f,
                "PWM coil {} has duty maximum {}, resolution needs exactly {}",
                coil, available, required
            ),
            ConfigError::ResolutionMismatch { configured, coils } => write!(
                f,
                "Configured duty maximum {} does not match coil duty maximum {}",
                configured, coils
            ),
            ConfigError::MicrostepsRequirePwm => {
                write!(f, "Microstepping requires PWM coil outputs")
            }
            ConfigError::PwmRequiresMicrosteps => {
                write!(f, "PWM coil outputs require a microstep count")
            }
            ConfigError::MissingField(field) => write!(f, "{} is required", field),
            ConfigError::MotorNotFound(name) => write!(f, "Motor '{}' not found", name),
            ConfigError::DuplicatePin(pin) => write!(f, "Pin {} assigned to more than one coil", pin),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorError::PinError => write!(f, "Coil output write failed"),
            MotorError::UnsupportedStyle(style) => {
                write!(f, "Step style {:?} is not supported in this drive mode", style)
            }
            MotorError::InvalidStyle(v) => write!(f, "Unknown step style value: {}", v),
            MotorError::InvalidSpeed(v) => write!(f, "Invalid speed: {}. Must be > 0", v),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<MotorError> for Error {
    fn from(e: MotorError) -> Self {
        Error::Motor(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for MotorError {}
