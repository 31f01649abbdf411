use std::fmt::{Display, Formatter};
use std::str::FromStr;

use image::Rgb;
use serde::{Deserialize, Serialize};

use super::error::StyleError;

// Format
//------------------------------------------------------------------------------

/// Symbology of a generated code.
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Two-dimensional matrix code (QR).
    #[default]
    Matrix,
    /// One-dimensional linear barcode (Code 128).
    Linear,
}

impl Format {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Matrix => "qrcode",
            Self::Linear => "barcode",
        }
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// Method
//------------------------------------------------------------------------------

/// How code identities are produced for the positions of a run.
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Prefix followed by a zero padded counter.
    #[default]
    Serial,
    /// Prefix followed by a random alphanumeric suffix. Suffixes may collide.
    Random,
}

// Color
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub [u8; 3]);

impl Color {
    pub const BLACK: Self = Self([0, 0, 0]);
    pub const WHITE: Self = Self([255, 255, 255]);

    pub fn rgb(&self) -> Rgb<u8> {
        Rgb(self.0)
    }
}

impl FromStr for Color {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || StyleError::Color(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }

        let mut clr = [0u8; 3];
        for (i, c) in clr.iter_mut().enumerate() {
            *c = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| err())?;
        }
        Ok(Self(clr))
    }
}

impl TryFrom<String> for Color {
    type Error = StyleError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}
