pub mod linear;
pub mod matrix;
mod payload;

pub use payload::{ImagePayload, PNG_MIME};

use std::sync::Arc;

use image::{imageops, RgbImage};
use serde::{Deserialize, Serialize};

use crate::common::{Color, EncodeResult, Format};

// Encoder
//------------------------------------------------------------------------------

/// Turns a code text into a renderable image.
pub trait Encoder {
    fn encode(&self, text: &str, format: Format) -> EncodeResult<ImagePayload>;
}

impl<E: Encoder + ?Sized> Encoder for &E {
    fn encode(&self, text: &str, format: Format) -> EncodeResult<ImagePayload> {
        (**self).encode(text, format)
    }
}

impl<E: Encoder + ?Sized> Encoder for Arc<E> {
    fn encode(&self, text: &str, format: Format) -> EncodeResult<ImagePayload> {
        (**self).encode(text, format)
    }
}

// Render options
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Side of one QR module in pixels.
    pub module_px: u32,
    /// QR quiet zone in modules.
    pub quiet_zone: u32,
    /// Width of the narrowest barcode bar in pixels.
    pub bar_px: u32,
    /// Barcode bar height in pixels.
    pub bar_height: u32,
    pub foreground: Color,
    pub background: Color,
    /// Rescales the final raster to this width, keeping its aspect ratio.
    pub target_width: Option<u32>,
    /// Emit `data:` URIs instead of raw PNG bytes.
    pub data_uri: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            module_px: 4,
            quiet_zone: 4,
            bar_px: 2,
            bar_height: 100,
            foreground: Color::BLACK,
            background: Color::WHITE,
            target_width: None,
            data_uri: false,
        }
    }
}

// Code encoder
//------------------------------------------------------------------------------

/// PNG encoder backed by `qrcode` for matrix codes and `barcoders` for
/// Code 128 linear codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeEncoder {
    opts: RenderOptions,
}

impl CodeEncoder {
    pub fn new(opts: RenderOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.opts
    }

    pub fn render(&self, text: &str, format: Format) -> EncodeResult<RgbImage> {
        let img = match format {
            Format::Matrix => matrix::render(text, &self.opts)?,
            Format::Linear => linear::render(text, &self.opts)?,
        };

        match self.opts.target_width {
            Some(w) if w > 0 && w != img.width() => {
                let h = (u64::from(img.height()) * u64::from(w) / u64::from(img.width())).max(1);
                Ok(imageops::resize(&img, w, h as u32, imageops::FilterType::Nearest))
            }
            _ => Ok(img),
        }
    }
}

impl Encoder for CodeEncoder {
    fn encode(&self, text: &str, format: Format) -> EncodeResult<ImagePayload> {
        let img = self.render(text, format)?;
        let png = payload::encode_png(&img)?;
        if self.opts.data_uri {
            Ok(ImagePayload::png_data_uri(&png))
        } else {
            Ok(ImagePayload::png(png))
        }
    }
}
