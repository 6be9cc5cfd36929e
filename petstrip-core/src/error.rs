//! Error types for petstrip-core

use thiserror::Error;

/// Main error type for the petstrip-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Caller supplied nothing usable (no file, empty bytes, HEIC/HEIF container)
    #[error("input error: {0}")]
    Input(String),

    /// Image bytes could not be decoded into a raster
    #[error("decode error: {0}")]
    Decode(String),

    /// Reading the image source failed
    #[error("read error: {0}")]
    Read(#[source] std::io::Error),

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Confirmation requested with nothing awaiting it
    #[error("no analysis result is awaiting confirmation")]
    NoPendingResult,
}

impl Error {
    /// Message suitable for showing to the pet owner.
    pub fn user_message(&self) -> String {
        match self {
            Error::Input(msg) => msg.clone(),
            Error::Decode(_) => {
                "The photo could not be read. Please try a JPEG or PNG image.".to_string()
            }
            Error::Read(_) => "The file could not be opened. Please try again.".to_string(),
            Error::NoPendingResult => "Analyze a photo before saving a result.".to_string(),
            other => format!("Something went wrong: {}", other),
        }
    }
}

/// Result type alias for petstrip-core
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_message_passes_through() {
        let err = Error::Input("Please choose a photo first.".to_string());
        assert_eq!(err.user_message(), "Please choose a photo first.");
    }

    #[test]
    fn test_decode_message_hides_details() {
        let err = Error::Decode("invalid PNG signature".to_string());
        assert!(!err.user_message().contains("PNG signature"));
    }
}
