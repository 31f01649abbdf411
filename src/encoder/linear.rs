use barcoders::sym::code128::Code128;
use image::RgbImage;
use imageproc::{drawing::draw_filled_rect_mut, rect::Rect};

use super::RenderOptions;
use crate::common::{EncodeError, EncodeResult};

/// Selects Code 128 character set B, which covers printable ASCII.
const CHARSET_B: char = 'Ɓ';

/// Quiet zone on each side of the bars, in modules.
pub const LINEAR_QUIET_ZONE: u32 = 10;

// Linear render
//------------------------------------------------------------------------------

/// Renders `text` as a Code 128 barcode.
pub fn render(text: &str, opts: &RenderOptions) -> EncodeResult<RgbImage> {
    let modules = encode_modules(text)?;

    let bar_sz = opts.bar_px.max(1);
    let qz_sz = LINEAR_QUIET_ZONE * bar_sz;
    let width = qz_sz + modules.len() as u32 * bar_sz + qz_sz;
    let height = qz_sz + opts.bar_height.max(1) + qz_sz;

    let mut canvas = RgbImage::from_pixel(width, height, opts.background.rgb());
    let fg = opts.foreground.rgb();

    // Adjacent dark modules are merged into a single bar
    let mut i = 0;
    while i < modules.len() {
        if modules[i] == 0 {
            i += 1;
            continue;
        }
        let start = i;
        while i < modules.len() && modules[i] == 1 {
            i += 1;
        }
        let x = (qz_sz + start as u32 * bar_sz) as i32;
        let bar = Rect::at(x, qz_sz as i32).of_size((i - start) as u32 * bar_sz, opts.bar_height.max(1));
        draw_filled_rect_mut(&mut canvas, bar, fg);
    }

    Ok(canvas)
}

/// Module sequence of the barcode, `1` for a dark module.
pub fn encode_modules(text: &str) -> EncodeResult<Vec<u8>> {
    if text.is_empty() {
        return Err(EncodeError::Linear("Empty data".to_string()));
    }
    let barcode = Code128::new(format!("{CHARSET_B}{text}"))
        .map_err(|e| EncodeError::Linear(format!("{e:?} in {text:?}")))?;
    Ok(barcode.encode())
}
