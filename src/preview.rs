//! Embedded preview generation for history entries.
//!
//! Each history entry carries a small self-contained preview so the history
//! view can show what was checked without keeping the original file around.
//! The preview is a bounded-edge thumbnail re-encoded as a PNG data URL;
//! anything that goes wrong degrades to no preview, never to a failed check.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::ImageFormat;
use std::io::Cursor;

/// Default bound for the preview's longer edge, in pixels.
pub const DEFAULT_PREVIEW_EDGE: u32 = 96;

/// Downscale the image to fit `max_edge` and encode it as a
/// `data:image/png;base64,` URL.
///
/// Returns `None` when the bytes don't decode as an image — the caller
/// records the entry without a preview.
pub fn preview_data_url(bytes: &[u8], max_edge: u32) -> Option<String> {
    if max_edge == 0 {
        return None;
    }
    let image = image::load_from_memory(bytes).ok()?;
    let thumbnail = image.thumbnail(max_edge, max_edge);

    let mut encoded = Vec::new();
    thumbnail
        .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
        .ok()?;
    Some(format!("data:image/png;base64,{}", STANDARD.encode(&encoded)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            image::Rgb([120, 40, 200]),
        ));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn preview_is_a_png_data_url() {
        let url = preview_data_url(&png_bytes(200, 100), 32).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));

        // The payload must round-trip back into a bounded image.
        let payload = url.strip_prefix("data:image/png;base64,").unwrap();
        let decoded = STANDARD.decode(payload).unwrap();
        let thumb = image::load_from_memory(&decoded).unwrap();
        assert!(thumb.width() <= 32 && thumb.height() <= 32);
    }

    #[test]
    fn preview_preserves_aspect_ratio() {
        let url = preview_data_url(&png_bytes(200, 100), 64).unwrap();
        let payload = url.strip_prefix("data:image/png;base64,").unwrap();
        let thumb = image::load_from_memory(&STANDARD.decode(payload).unwrap()).unwrap();
        assert_eq!(thumb.width(), 64);
        assert_eq!(thumb.height(), 32);
    }

    #[test]
    fn undecodable_bytes_degrade_to_none() {
        assert_eq!(preview_data_url(b"definitely not an image", 64), None);
    }

    #[test]
    fn zero_edge_degrades_to_none() {
        assert_eq!(preview_data_url(&png_bytes(10, 10), 0), None);
    }
}
