use image::RgbImage;
use imageproc::{drawing::draw_filled_rect_mut, rect::Rect};
use qrcode::{EcLevel, QrCode};

use super::RenderOptions;
use crate::common::EncodeResult;

// Matrix render
//------------------------------------------------------------------------------

/// Renders `text` as a QR symbol surrounded by its quiet zone.
pub fn render(text: &str, opts: &RenderOptions) -> EncodeResult<RgbImage> {
    let code = QrCode::with_error_correction_level(text.as_bytes(), EcLevel::M)?;
    let w = code.width() as u32;

    let mod_sz = opts.module_px.max(1);
    let qz_sz = opts.quiet_zone * mod_sz;
    let qr_sz = w * mod_sz;
    let total_sz = qz_sz + qr_sz + qz_sz;

    let mut canvas = RgbImage::from_pixel(total_sz, total_sz, opts.background.rgb());
    let fg = opts.foreground.rgb();
    for (i, clr) in code.to_colors().into_iter().enumerate() {
        if clr != qrcode::Color::Dark {
            continue;
        }
        let r = i as u32 / w;
        let c = i as u32 % w;
        let x = (qz_sz + c * mod_sz) as i32;
        let y = (qz_sz + r * mod_sz) as i32;
        draw_filled_rect_mut(&mut canvas, Rect::at(x, y).of_size(mod_sz, mod_sz), fg);
    }

    Ok(canvas)
}
