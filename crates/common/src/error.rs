//! Error types shared across Newsframe crates.

use std::path::PathBuf;

/// Top-level error type for Newsframe operations.
///
/// The first five variants are the rendering core's failure conditions.
/// Each is raised at the point of detection and is terminal for the
/// request that triggered it.
#[derive(Debug, thiserror::Error)]
pub enum NewsframeError {
    #[error("Layout error: {message}")]
    Layout { message: String },

    #[error("Invalid ROI: {message}")]
    InvalidRoi { message: String },

    #[error("Unsupported direction: {direction}")]
    UnsupportedDirection { direction: String },

    #[error("Degenerate image: {message}")]
    DegenerateImage { message: String },

    #[error("Encoding error: {message}")]
    Encoding { message: String },

    #[error("Font error: {message}")]
    Font { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using NewsframeError.
pub type NewsframeResult<T> = Result<T, NewsframeError>;

impl NewsframeError {
    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout {
            message: msg.into(),
        }
    }

    pub fn invalid_roi(msg: impl Into<String>) -> Self {
        Self::InvalidRoi {
            message: msg.into(),
        }
    }

    pub fn unsupported_direction(direction: impl Into<String>) -> Self {
        Self::UnsupportedDirection {
            direction: direction.into(),
        }
    }

    pub fn degenerate_image(msg: impl Into<String>) -> Self {
        Self::DegenerateImage {
            message: msg.into(),
        }
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding {
            message: msg.into(),
        }
    }

    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    /// Short machine-readable name of the failure condition.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Layout { .. } => "layout",
            Self::InvalidRoi { .. } => "invalid_roi",
            Self::UnsupportedDirection { .. } => "unsupported_direction",
            Self::DegenerateImage { .. } => "degenerate_image",
            Self::Encoding { .. } => "encoding",
            Self::Font { .. } => "font",
            Self::Config { .. } => "config",
            Self::FileNotFound { .. } => "file_not_found",
            Self::Unsupported { .. } => "unsupported",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
            Self::Other(_) => "other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_message() {
        let err = NewsframeError::layout("highlight \"foo\" not found");
        assert_eq!(err.to_string(), "Layout error: highlight \"foo\" not found");
        assert_eq!(err.kind(), "layout");
    }

    #[test]
    fn test_unsupported_direction_names_token() {
        let err = NewsframeError::unsupported_direction("sideways");
        assert_eq!(err.to_string(), "Unsupported direction: sideways");
    }

    #[test]
    fn test_io_error_converts() {
        fn fails() -> NewsframeResult<()> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))?
        }
        assert_eq!(fails().unwrap_err().kind(), "io");
    }
}
