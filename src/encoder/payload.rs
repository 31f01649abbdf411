use std::borrow::Cow;
use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine};
use image::{ImageFormat, RgbImage};

use crate::common::{EncodeResult, PayloadError};

pub const PNG_MIME: &str = "image/png";

// Image payload
//------------------------------------------------------------------------------

/// Encoded raster of a code, either as raw bytes or as a self describing
/// `data:` URI. Decoded to bytes once, at the export boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePayload {
    Raw { bytes: Vec<u8>, mime: String },
    DataUri(String),
}

impl ImagePayload {
    pub fn png(bytes: Vec<u8>) -> Self {
        Self::Raw { bytes, mime: PNG_MIME.to_string() }
    }

    pub fn png_data_uri(bytes: &[u8]) -> Self {
        Self::DataUri(format!("data:{PNG_MIME};base64,{}", STANDARD.encode(bytes)))
    }

    pub fn mime(&self) -> Result<&str, PayloadError> {
        match self {
            Self::Raw { mime, .. } => Ok(mime),
            Self::DataUri(uri) => split_data_uri(uri).map(|(mime, _)| mime),
        }
    }

    pub fn to_bytes(&self) -> Result<Cow<'_, [u8]>, PayloadError> {
        match self {
            Self::Raw { bytes, .. } => Ok(Cow::Borrowed(bytes)),
            Self::DataUri(uri) => {
                let (_, data) = split_data_uri(uri)?;
                Ok(Cow::Owned(STANDARD.decode(data)?))
            }
        }
    }

    pub fn to_data_uri(&self) -> String {
        match self {
            Self::Raw { bytes, mime } => format!("data:{mime};base64,{}", STANDARD.encode(bytes)),
            Self::DataUri(uri) => uri.clone(),
        }
    }
}

/// Splits `data:image/<kind>;base64,<data>` into its mime type and data.
fn split_data_uri(uri: &str) -> Result<(&str, &str), PayloadError> {
    let rest = uri.strip_prefix("data:").ok_or(PayloadError::MissingPrefix)?;
    let (mime, data) = rest.split_once(";base64,").ok_or(PayloadError::MissingPrefix)?;
    let kind = mime.strip_prefix("image/").ok_or(PayloadError::MissingPrefix)?;
    if kind.is_empty() || !kind.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(PayloadError::MissingPrefix);
    }
    Ok((mime, data))
}

pub(crate) fn encode_png(img: &RgbImage) -> EncodeResult<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}
