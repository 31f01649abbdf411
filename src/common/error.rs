use std::fmt::{Display, Formatter};

use thiserror::Error;

// Validation
//------------------------------------------------------------------------------

/// Request field a validation message is attached to.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Field {
    StartNumber,
    Quantity,
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::StartNumber => "startNumber",
            Self::Quantity => "quantity",
        };
        f.write_str(name)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

/// Field level messages for a rejected request. Never empty.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
#[error("invalid generation request ({} field error(s))", .0.len())]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub(crate) fn new(errs: Vec<FieldError>) -> Self {
        debug_assert!(!errs.is_empty(), "Validation errors must not be empty");
        Self(errs)
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.iter().find(|e| e.field == field).map(|e| e.message.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Encoding
//------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("matrix encoding failed: {0}")]
    Matrix(#[from] qrcode::types::QrError),

    #[error("linear encoding failed: {0}")]
    Linear(String),

    #[error("raster serialization failed: {0}")]
    Raster(#[from] image::ImageError),
}

pub type EncodeResult<T> = Result<T, EncodeError>;

/// Diagnostic kept on a failed run.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
#[error("failed to encode code #{sequence_id} ({code_text:?}): {reason}")]
pub struct RunFailure {
    pub sequence_id: u32,
    pub code_text: String,
    pub reason: String,
}

// Image payload
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum PayloadError {
    #[error("missing `data:image/<type>;base64,` prefix")]
    MissingPrefix,

    #[error("invalid base64 data: {0}")]
    Base64(#[from] base64::DecodeError),
}

// Export
//------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("code #{sequence_id} has a malformed image payload: {source}")]
    MalformedImage { sequence_id: u32, source: PayloadError },

    #[error("spreadsheet writer failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("failed to save export: {0}")]
    Io(#[from] std::io::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

// Scan
//------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to load image: {0}")]
    Image(#[from] image::ImageError),

    #[error("no QR code or barcode detected in the image")]
    NotFound,
}

pub type ScanResult<T> = Result<T, ScanError>;

// Compose
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum InputError {
    #[error("Please enter some text")]
    EmptyText,

    #[error("Please enter a valid URL")]
    InvalidUrl,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Please enter a valid phone number")]
    InvalidPhone,

    #[error("Please enter a Wi-Fi network name")]
    EmptyNetwork,
}

#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum StyleError {
    #[error("Width must be between {min} and {max} pixels.")]
    Width { min: u32, max: u32, got: u32 },

    #[error("invalid color {0:?}, expected #RRGGBB")]
    Color(String),
}

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Style(#[from] StyleError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

// Config
//------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

// Crate error
//------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Run(#[from] RunFailure),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod error_tests {
    use super::{Field, FieldError, ValidationErrors};

    #[test]
    fn test_validation_errors_lookup() {
        let errs = ValidationErrors::new(vec![
            FieldError { field: Field::Quantity, message: "Maximum quantity is 1000.".into() },
        ]);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs.get(Field::Quantity), Some("Maximum quantity is 1000."));
        assert_eq!(errs.get(Field::StartNumber), None);
        assert_eq!(errs.to_string(), "invalid generation request (1 field error(s))");
        assert_eq!(errs.errors()[0].to_string(), "quantity: Maximum quantity is 1000.");
    }
}
