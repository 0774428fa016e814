//! Display-sized previews of picked and received images
//!
//! Images are down-sampled by a power-of-two factor so the preview stays
//! close to [`PREVIEW_MAX_DIMENSION`] without being smaller than it. This is
//! purely a display concern; the transfer itself never looks at the bytes.

use std::fmt;
use std::path::Path;

use image::{DynamicImage, ImageReader, RgbaImage};
use image::imageops::FilterType;

use crate::PREVIEW_MAX_DIMENSION;

/// Error type for preview generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewError {
    /// The file could not be read
    Io(String),
    /// The bytes are not a decodable image
    Decode(String),
}

impl fmt::Display for PreviewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read image: {}", e),
            Self::Decode(e) => write!(f, "failed to decode image: {}", e),
        }
    }
}

impl std::error::Error for PreviewError {}

/// A down-sampled image ready for display
#[derive(Debug, Clone)]
pub struct Preview {
    /// Preview width in pixels
    pub width: u32,
    /// Preview height in pixels
    pub height: u32,
    /// Width of the decoded source image
    pub source_width: u32,
    /// Height of the decoded source image
    pub source_height: u32,
    /// Power-of-two factor the source was divided by
    pub sample_size: u32,
    /// Preview pixels
    pub image: RgbaImage,
}

/// Compute the down-sampling factor for an image of `width` x `height`
///
/// Returns 1 when the image already fits within `max` in both dimensions.
/// Otherwise returns the largest power of two that keeps half of each
/// dimension, divided by the factor, above `max`.
pub fn sample_size(width: u32, height: u32, max: u32) -> u32 {
    let mut sample = 1;

    if height > max || width > max {
        let half_height = height / 2;
        let half_width = width / 2;

        while half_height / sample > max && half_width / sample > max {
            sample *= 2;
        }
    }

    sample
}

/// Decode an image file and down-sample it for display
///
/// The format is sniffed from the first bytes, so a payload that is not an
/// image is rejected without reading the rest of it. Runs synchronously; use
/// [`load_preview_async`] from async code.
pub fn load_preview(path: &Path) -> Result<Preview, PreviewError> {
    let reader = ImageReader::open(path)
        .and_then(ImageReader::with_guessed_format)
        .map_err(|e| PreviewError::Io(e.to_string()))?;
    let decoded = reader
        .decode()
        .map_err(|e| PreviewError::Decode(e.to_string()))?;
    Ok(downsample(decoded))
}

/// Shrink a decoded image by its power-of-two sample size
fn downsample(decoded: DynamicImage) -> Preview {
    let source_width = decoded.width();
    let source_height = decoded.height();
    let sample = sample_size(source_width, source_height, PREVIEW_MAX_DIMENSION);

    let image = if sample == 1 {
        decoded.to_rgba8()
    } else {
        let width = (source_width / sample).max(1);
        let height = (source_height / sample).max(1);
        decoded
            .resize_exact(width, height, FilterType::Triangle)
            .to_rgba8()
    };

    Preview {
        width: image.width(),
        height: image.height(),
        source_width,
        source_height,
        sample_size: sample,
        image,
    }
}

/// Build a preview on tokio's blocking pool
pub async fn load_preview_async(path: &Path) -> Result<Preview, PreviewError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || load_preview(&path))
        .await
        .map_err(|e| PreviewError::Io(format!("preview task failed: {e}")))?
}
