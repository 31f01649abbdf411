use encoding_rs::SHIFT_JIS;
use image::{DynamicImage, GrayImage};
use rxing::BarcodeFormat;
use tracing::debug;

use crate::common::{Format, ScanError, ScanResult};

/// Decoded content of a scanned image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scan {
    pub text: String,
    pub format: Format,
}

// Scanner
//------------------------------------------------------------------------------

/// Decodes the first readable code of an encoded image (PNG, JPEG, GIF).
pub fn scan_bytes(bytes: &[u8]) -> ScanResult<Scan> {
    let img = image::load_from_memory(bytes)?;
    scan_image(&img)
}

/// QR symbols are tried first, then Code 128 barcodes.
pub fn scan_image(img: &DynamicImage) -> ScanResult<Scan> {
    let gray = img.to_luma8();
    if let Some(text) = scan_matrix(&gray) {
        return Ok(Scan { text, format: Format::Matrix });
    }
    if let Some(text) = scan_linear(gray) {
        return Ok(Scan { text, format: Format::Linear });
    }
    Err(ScanError::NotFound)
}

fn scan_matrix(gray: &GrayImage) -> Option<String> {
    let (w, h) = gray.dimensions();
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(w as usize, h as usize, |x, y| {
        gray.get_pixel(x as u32, y as u32)[0]
    });

    let grids = prepared.detect_grids();
    debug!(grids = grids.len(), width = w, height = h, "Located candidate grids");

    for (i, grid) in grids.iter().enumerate() {
        let mut raw = Vec::new();
        match grid.decode_to(&mut raw) {
            Ok(meta) => {
                debug!(grid = i, version = meta.version.0, "Grid decoded");
                return Some(decode_text(&raw));
            }
            Err(e) => debug!(grid = i, error = ?e, "Grid not decodable"),
        }
    }
    None
}

fn scan_linear(gray: GrayImage) -> Option<String> {
    let (w, h) = gray.dimensions();
    match rxing::helpers::detect_in_luma(gray.into_raw(), w, h, Some(BarcodeFormat::CODE_128)) {
        Ok(res) => {
            debug!(width = w, height = h, "Barcode decoded");
            Some(res.getText().to_string())
        }
        Err(e) => {
            debug!(error = %e, "No barcode decoded");
            None
        }
    }
}

/// QR byte segments are UTF-8 in practice; Shift_JIS is the standard's Kanji
/// charset and the fallback for anything else.
fn decode_text(raw: &[u8]) -> String {
    match std::str::from_utf8(raw) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (text, _, _) = SHIFT_JIS.decode(raw);
            text.into_owned()
        }
    }
}
