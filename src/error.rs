use std::fmt;

/// Result type for tiling operations
pub type Result<T> = std::result::Result<T, TilingError>;

/// Main error type for the tiling crate
#[derive(Debug, Clone, PartialEq)]
pub enum TilingError {
    /// Invalid parameter value
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// A derived constant would not be an exact quotient
    Divisibility {
        derived: String,
        dividend: usize,
        divisor: usize,
    },

    /// Malformed header text
    Parse {
        line: usize,
        reason: String,
    },

    /// A required define is absent from a header
    MissingDefine(String),

    /// A derived define disagrees with the value implied by the literal knobs
    InconsistentDefine {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// Kernel number outside 1..=10
    UnknownKernel(u8),

    /// Work-group would exceed the device limit
    WorkGroupLimit {
        size: usize,
        max: usize,
    },

    /// Bad environment override
    Environment {
        var: String,
        reason: String,
    },

    /// OpenCL errors
    Gpu(String),

    /// IO errors (file operations)
    IoError(String),

    /// Serialization/deserialization errors
    SerializationError(String),
}

impl fmt::Display for TilingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TilingError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter '{}': {}", name, reason)
            }
            TilingError::Divisibility { derived, dividend, divisor } => {
                write!(f, "{} is not exact: {} is not divisible by {}", derived, dividend, divisor)
            }
            TilingError::Parse { line, reason } => write!(f, "Parse error on line {}: {}", line, reason),
            TilingError::MissingDefine(name) => write!(f, "Missing #define for {}", name),
            TilingError::InconsistentDefine { name, expected, actual } => {
                write!(f, "Inconsistent {}: expected {}, got {}", name, expected, actual)
            }
            TilingError::UnknownKernel(number) => {
                write!(f, "Unknown kernel {}: must be in 1..=10", number)
            }
            TilingError::WorkGroupLimit { size, max } => {
                write!(f, "Work-group size {} exceeds device limit {}", size, max)
            }
            TilingError::Environment { var, reason } => {
                write!(f, "Environment variable {}: {}", var, reason)
            }
            TilingError::Gpu(msg) => write!(f, "GPU error: {}", msg),
            TilingError::IoError(msg) => write!(f, "IO error: {}", msg),
            TilingError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for TilingError {}

// Conversion from std::io::Error
impl From<std::io::Error> for TilingError {
    fn from(err: std::io::Error) -> Self {
        TilingError::IoError(err.to_string())
    }
}

// Conversion from bincode::Error
impl From<bincode::Error> for TilingError {
    fn from(err: bincode::Error) -> Self {
        TilingError::SerializationError(err.to_string())
    }
}

impl From<serde_json::Error> for TilingError {
    fn from(err: serde_json::Error) -> Self {
        TilingError::SerializationError(err.to_string())
    }
}

// Helper functions for common error patterns
impl TilingError {
    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        TilingError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn parse<S: Into<String>>(line: usize, reason: S) -> Self {
        TilingError::Parse {
            line,
            reason: reason.into(),
        }
    }
}
