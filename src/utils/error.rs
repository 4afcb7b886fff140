use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Cannot cast {value} to {expected} for property '{property}'")]
    InvalidCast {
        property: String,
        expected: String,
        value: String,
    },

    #[error("Deserialization error: {message}")]
    Deserialization { message: String },

    #[error("Schema error: {message}")]
    Schema { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Cast,
    Blob,
    Schema,
    Config,
    System,
}

impl ModelError {
    pub fn invalid_cast(
        property: impl Into<String>,
        expected: impl ToString,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidCast {
            property: property.into(),
            expected: expected.to_string(),
            value: value.into(),
        }
    }

    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::Deserialization {
            message: message.into(),
        }
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidCast { .. } => ErrorCategory::Cast,
            Self::Deserialization { .. } => ErrorCategory::Blob,
            Self::Schema { .. } => ErrorCategory::Schema,
            Self::ConfigError { .. } | Self::ConfigValidationError { .. } => ErrorCategory::Config,
            Self::Io(_) | Self::Serialization(_) => ErrorCategory::System,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Cast => "Check that the input value matches the declared property type",
            ErrorCategory::Blob => "Re-create the blob with the current version of model-cast",
            ErrorCategory::Schema => "Check the model definitions for duplicate or unknown names",
            ErrorCategory::Config => "Check the schema file and command line arguments",
            ErrorCategory::System => "Check file paths and permissions",
        }
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
