//! Error handling for the gpu_statusbar application

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("System error: {message}")]
    System { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: toml::de::Error,
    },

    #[error("Font loading error: {message}")]
    Font { message: String },
}

/// Sensor failures. These never leave the poll loop: the affected segment
/// renders a placeholder and the next tick tries again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SensorError {
    /// No compatible device, or the driver/tool is missing.
    #[error("sensor unavailable: {message}")]
    Unavailable { message: String },

    /// Transient query error or unparseable output.
    #[error("sensor read failed: {message}")]
    ReadFailure { message: String },
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, AppError>;

/// Helper functions for creating specific error types
impl AppError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn font<S: Into<String>>(message: S) -> Self {
        Self::Font {
            message: message.into(),
        }
    }
}

impl SensorError {
    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn read_failure<S: Into<String>>(message: S) -> Self {
        Self::ReadFailure {
            message: message.into(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Convert common error types
impl From<font_kit::error::SelectionError> for AppError {
    fn from(err: font_kit::error::SelectionError) -> Self {
        Self::font(format!("Font selection failed: {}", err))
    }
}

impl From<font_kit::error::FontLoadingError> for AppError {
    fn from(err: font_kit::error::FontLoadingError) -> Self {
        Self::font(format!("Font loading failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_error_messages() {
        let err = SensorError::unavailable("nvidia-smi not found");
        assert!(err.is_unavailable());
        assert_eq!(err.to_string(), "sensor unavailable: nvidia-smi not found");

        let err = SensorError::read_failure("bad output");
        assert!(!err.is_unavailable());
        assert_eq!(err.to_string(), "sensor read failed: bad output");
    }

    #[test]
    fn parse_errors_convert_into_app_error() {
        let err: AppError = toml::from_str::<toml::Table>("= nope").unwrap_err().into();
        assert!(matches!(err, AppError::Serialization { .. }));

        let err: AppError = font_kit::error::SelectionError::NotFound.into();
        assert!(matches!(err, AppError::Font { .. }));
        assert!(err.to_string().starts_with("Font loading error: Font selection failed"));
    }
}
