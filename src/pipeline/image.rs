//! Uploaded image handling: decode, normalise to PNG, fit into a box.
//!
//! Uploads may be JPEG or PNG with any colour type. Each one is decoded,
//! re-encoded as PNG and decoded again into RGBA so every image reaches
//! pdfium in the same lossless form with its alpha channel intact.

use crate::error::PaperworkError;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use tracing::debug;

/// Decode an uploaded image and normalise it to RGBA via a PNG round trip.
///
/// `slot` names the image in error messages ("logo", "header").
pub fn normalise_upload(bytes: &[u8], slot: &'static str) -> Result<DynamicImage, PaperworkError> {
    let decode_err = |source| PaperworkError::ImageDecode { slot, source };

    let decoded = image::load_from_memory(bytes).map_err(decode_err)?;

    let mut png = Vec::new();
    decoded
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(decode_err)?;
    debug!(
        "Normalised {} image {}x{} → {} bytes PNG",
        slot,
        decoded.width(),
        decoded.height(),
        png.len()
    );

    let rgba = image::load_from_memory_with_format(&png, ImageFormat::Png).map_err(decode_err)?;
    Ok(DynamicImage::ImageRgba8(rgba.to_rgba8()))
}

/// Largest `(width, height)` with the image's aspect ratio inside the box.
pub fn fit_within(image_w: u32, image_h: u32, box_w: f32, box_h: f32) -> (f32, f32) {
    if image_w == 0 || image_h == 0 {
        return (0.0, 0.0);
    }
    let scale = (box_w / image_w as f32).min(box_h / image_h as f32);
    (image_w as f32 * scale, image_h as f32 * scale)
}
