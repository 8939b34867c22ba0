use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image codec error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("SVG error: {0}")]
    SvgError(#[from] usvg::Error),

    #[error("Tile not found: {path}")]
    MissingTileError { path: String },

    #[error("Render error: {message}")]
    RenderError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Codec,
    Configuration,
    Processing,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 程序退出碼
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl GalleryError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GalleryError::IoError(_) => ErrorCategory::System,
            GalleryError::MissingTileError { .. } => ErrorCategory::Input,
            GalleryError::ImageError(_)
            | GalleryError::SerializationError(_)
            | GalleryError::SvgError(_) => ErrorCategory::Codec,
            GalleryError::MissingConfigError { .. }
            | GalleryError::InvalidConfigValueError { .. }
            | GalleryError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            GalleryError::RenderError { .. }
            | GalleryError::ProcessingError { .. }
            | GalleryError::ValidationError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Codec | ErrorCategory::Processing => {
                ErrorSeverity::High
            }
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            GalleryError::IoError(e) if e.kind() == std::io::ErrorKind::NotFound => {
                "Check that the input path exists and is readable".to_string()
            }
            GalleryError::IoError(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                "Check file permissions on the input and output directories".to_string()
            }
            GalleryError::IoError(_) => "Check disk space and file system health".to_string(),
            GalleryError::MissingTileError { .. } => {
                "Make sure the tile pyramid was generated for the requested --factor".to_string()
            }
            GalleryError::ImageError(_) => {
                "Make sure every tile is a valid JPEG image".to_string()
            }
            GalleryError::SerializationError(_) => {
                "Make sure the log file is a JSON object of query records".to_string()
            }
            GalleryError::SvgError(_) | GalleryError::RenderError { .. } => {
                "Try a different chart size; report the issue if it persists".to_string()
            }
            GalleryError::ConfigValidationError { .. } => {
                "Check the configuration file syntax".to_string()
            }
            GalleryError::MissingConfigError { field } => {
                format!("Add the '{}' setting to the configuration", field)
            }
            GalleryError::InvalidConfigValueError { field, .. } => {
                format!("Correct the value of '{}'", field)
            }
            GalleryError::ProcessingError { .. } | GalleryError::ValidationError { .. } => {
                "Inspect the input data for malformed records".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            GalleryError::IoError(e) => format!("Could not access a file: {}", e),
            GalleryError::MissingTileError { path } => {
                format!("Tile '{}' is missing from the pyramid", path)
            }
            GalleryError::ImageError(e) => format!("Could not process an image: {}", e),
            GalleryError::SerializationError(e) => format!("The log file is not valid: {}", e),
            GalleryError::InvalidConfigValueError {
                field,
                value,
                reason,
            } => format!("Option '{}' has an invalid value '{}': {}", field, value, reason),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GalleryError>;
