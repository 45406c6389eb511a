//! Error types for the schematic converter.

use thiserror::Error;

/// Result type alias using ConverterError.
pub type Result<T> = std::result::Result<T, ConverterError>;

/// Main error type for schematic conversion.
#[derive(Error, Debug)]
pub enum ConverterError {
    /// The tag tree does not have the shape of a structure schematic.
    #[error("Malformed schematic: {0}")]
    MalformedSchematic(String),

    /// Failed to parse the NBT tag tree.
    #[error("NBT parse error: {0}")]
    Parse(#[from] fastnbt::error::Error),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse JSON data.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Block registry data could not be loaded.
    #[error("Registry error: {0}")]
    Registry(String),

    /// Failed to export the scene.
    #[error("Export error: {0}")]
    Export(String),
}

impl ConverterError {
    /// Shorthand for a [`ConverterError::MalformedSchematic`].
    pub fn malformed(msg: impl Into<String>) -> Self {
        ConverterError::MalformedSchematic(msg.into())
    }

    /// Whether this error is a structural problem with the input schematic,
    /// as opposed to a failure in parsing, I/O or export.
    pub fn is_malformed(&self) -> bool {
        matches!(self, ConverterError::MalformedSchematic(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_classification() {
        let err = ConverterError::malformed("missing palette");
        assert!(err.is_malformed());
        assert_eq!(err.to_string(), "Malformed schematic: missing palette");

        let err = ConverterError::Export("boom".to_string());
        assert!(!err.is_malformed());
    }
}
