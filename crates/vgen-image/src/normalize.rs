//! Resize/crop/pad and JPEG re-encoding.

use image::imageops::FilterType;
use image::{codecs::jpeg::JpegEncoder, Rgb, RgbImage};
use tracing::{debug, warn};

use vgen_models::{Dimensions, FitMode};

use crate::error::{ImageError, ImageResult};

/// Byte ceiling the provider accepts for a reference attachment.
pub const MAX_REFERENCE_BYTES: usize = 15 * 1024 * 1024;

/// First-pass JPEG quality.
const BASE_QUALITY: u8 = 90;

/// Quality for the single oversized retry.
const RETRY_QUALITY: u8 = 60;

/// A reference image ready for multipart attachment.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    /// JPEG bytes at exactly the target dimensions
    pub bytes: Vec<u8>,
    /// Multipart field filename, derived from the resolved dimensions
    pub filename: String,
    pub dimensions: Dimensions,
    pub content_type: &'static str,
}

/// Normalize raw image bytes to exactly `target` pixels.
///
/// `cover` crops to fill the frame; `contain` letterboxes onto a black
/// canvas. Output is baseline JPEG. If the first encoding exceeds
/// [`MAX_REFERENCE_BYTES`] one lower-quality pass is attempted; a still
/// oversized second pass is returned as-is.
pub fn normalize_reference(
    bytes: &[u8],
    target: Dimensions,
    fit: FitMode,
) -> ImageResult<NormalizedImage> {
    let decoded = image::load_from_memory(bytes)?;
    debug!(
        input_w = decoded.width(),
        input_h = decoded.height(),
        target = %target,
        fit = fit.as_str(),
        "normalizing reference image"
    );

    let canvas: RgbImage = match fit {
        FitMode::Cover => decoded
            .resize_to_fill(target.width, target.height, FilterType::Lanczos3)
            .to_rgb8(),
        FitMode::Contain => {
            let fitted = decoded
                .resize(target.width, target.height, FilterType::Lanczos3)
                .to_rgb8();
            let mut canvas =
                RgbImage::from_pixel(target.width, target.height, Rgb([0u8, 0u8, 0u8]));
            let x = (target.width - fitted.width()) / 2;
            let y = (target.height - fitted.height()) / 2;
            image::imageops::overlay(&mut canvas, &fitted, x as i64, y as i64);
            canvas
        }
    };

    let bytes = encode_with_ceiling(&canvas, MAX_REFERENCE_BYTES)?;

    Ok(NormalizedImage {
        bytes,
        filename: format!("reference_{}x{}.jpg", target.width, target.height),
        dimensions: target,
        content_type: "image/jpeg",
    })
}

/// JPEG-encode with one quality-reduction retry above `ceiling`.
fn encode_with_ceiling(img: &RgbImage, ceiling: usize) -> ImageResult<Vec<u8>> {
    let first = encode_jpeg(img, BASE_QUALITY)?;
    if first.len() <= ceiling {
        return Ok(first);
    }

    let second = encode_jpeg(img, RETRY_QUALITY)?;
    if second.len() > ceiling {
        warn!(
            bytes = second.len(),
            ceiling, "reference still oversized after quality retry, sending anyway"
        );
    }
    Ok(second)
}

fn encode_jpeg(img: &RgbImage, quality: u8) -> ImageResult<Vec<u8>> {
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
    encoder
        .encode_image(img)
        .map_err(|e| ImageError::encode(e.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;

    /// High-entropy test image so JPEG output has nontrivial size.
    fn noise_image(w: u32, h: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(w, h, |x, y| {
            let v = (x.wrapping_mul(31).wrapping_add(y.wrapping_mul(17))) as u8;
            Rgb([v, v.wrapping_mul(7), v.wrapping_add(x as u8)])
        });
        let mut out = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn test_cover_exact_dimensions() {
        let input = noise_image(4000, 3000);
        let out =
            normalize_reference(&input, Dimensions::new(720, 1280), FitMode::Cover).unwrap();
        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!(decoded.width(), 720);
        assert_eq!(decoded.height(), 1280);
        assert!(out.bytes.len() <= MAX_REFERENCE_BYTES);
    }

    #[test]
    fn test_contain_exact_dimensions() {
        let input = noise_image(100, 400);
        let out =
            normalize_reference(&input, Dimensions::new(1280, 720), FitMode::Contain).unwrap();
        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!(decoded.width(), 1280);
        assert_eq!(decoded.height(), 720);
    }

    #[test]
    fn test_contain_letterboxes_black() {
        let input = noise_image(100, 100);
        let out =
            normalize_reference(&input, Dimensions::new(400, 100), FitMode::Contain).unwrap();
        let decoded = image::load_from_memory(&out.bytes).unwrap().to_rgb8();
        // Far left column lies in the padding band.
        let px = decoded.get_pixel(2, 50);
        assert!(px.0.iter().all(|c| *c < 24), "expected near-black padding, got {:?}", px);
    }

    #[test]
    fn test_filename_pattern() {
        let input = noise_image(64, 64);
        let out =
            normalize_reference(&input, Dimensions::new(1280, 720), FitMode::Cover).unwrap();
        assert_eq!(out.filename, "reference_1280x720.jpg");
        assert_eq!(out.content_type, "image/jpeg");
    }

    #[test]
    fn test_ceiling_triggers_single_retry() {
        let img = RgbImage::from_fn(256, 256, |x, y| {
            Rgb([(x * 7 % 251) as u8, (y * 13 % 251) as u8, ((x + y) % 251) as u8])
        });
        let base = encode_jpeg(&img, BASE_QUALITY).unwrap();
        let retry = encode_jpeg(&img, RETRY_QUALITY).unwrap();
        assert!(retry.len() < base.len());

        // Ceiling between the two sizes: the retry output is returned.
        let mid = (base.len() + retry.len()) / 2;
        let out = encode_with_ceiling(&img, mid).unwrap();
        assert_eq!(out.len(), retry.len());

        // Ceiling below both: still returns the retry result rather than failing.
        let out = encode_with_ceiling(&img, 10).unwrap();
        assert_eq!(out.len(), retry.len());
    }

    #[test]
    fn test_decode_failure() {
        let err = normalize_reference(b"not an image", Dimensions::new(64, 64), FitMode::Cover)
            .unwrap_err();
        assert!(matches!(err, ImageError::Decode(_)));
    }
}
