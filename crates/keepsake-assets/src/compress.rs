//! Size-bounded image re-encoding and data URI encoding.

use std::io::Cursor;

use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader, Rgb, RgbImage};
use keepsake_types::Blob;
use tracing::debug;

use crate::error::{AssetError, AssetResult};

/// Media type of every compressed output.
pub const JPEG_MIME: &str = "image/jpeg";

/// JPEG qualities tried at each size, best first.
const QUALITY_STEPS: [u8; 6] = [90, 80, 70, 60, 50, 40];

/// Images are never halved below this many pixels on their longer side.
const MIN_DIMENSION: u32 = 16;

/// Upper bounds a compressed image must satisfy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageConstraints {
    pub max_bytes: usize,
    pub max_dimension: u32,
}

impl ImageConstraints {
    /// Gallery photos: 1 MiB, 1920 px.
    pub const GALLERY: Self = Self {
        max_bytes: 1024 * 1024,
        max_dimension: 1920,
    };

    /// Images embedded into document text fields: 512 KiB, 1000 px.
    pub const INLINE: Self = Self {
        max_bytes: 512 * 1024,
        max_dimension: 1000,
    };
}

/// Decode `input`, bound its dimensions and re-encode it as JPEG until it
/// fits `constraints`.
///
/// Quality is lowered first; once the lowest quality still does not fit the
/// image is halved and the qualities are tried again.
pub fn compress(input: &[u8], constraints: ImageConstraints) -> AssetResult<Blob> {
    if input.is_empty() {
        return Err(AssetError::Empty);
    }

    let image = decode(input)?;
    let (width, height) = image.dimensions();
    let mut rgb = flatten(fit_within(image, constraints.max_dimension));
    let mut smallest = usize::MAX;

    loop {
        for quality in QUALITY_STEPS {
            let encoded = encode_jpeg(&rgb, quality)?;
            if encoded.len() <= constraints.max_bytes {
                debug!(
                    from = %format!("{width}x{height}"),
                    to = %format!("{}x{}", rgb.width(), rgb.height()),
                    quality,
                    bytes = encoded.len(),
                    "compressed image"
                );
                return Ok(Blob::new(JPEG_MIME, encoded));
            }
            smallest = smallest.min(encoded.len());
        }

        if rgb.width().max(rgb.height()) / 2 < MIN_DIMENSION {
            return Err(AssetError::TooLarge {
                max_bytes: constraints.max_bytes,
                smallest,
            });
        }
        let (w, h) = ((rgb.width() / 2).max(1), (rgb.height() / 2).max(1));
        rgb = image::imageops::resize(&rgb, w, h, FilterType::Triangle);
    }
}

/// [`compress`] on the blocking thread pool.
pub async fn compress_async(input: Vec<u8>, constraints: ImageConstraints) -> AssetResult<Blob> {
    tokio::task::spawn_blocking(move || compress(&input, constraints))
        .await
        .map_err(|e| AssetError::Task(e.to_string()))?
}

/// Encode a blob as a `data:` URI.
pub fn to_data_uri(blob: &Blob) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(&blob.data);
    format!("data:{};base64,{}", blob.mime, encoded)
}

/// Compress an image for embedding in a text field and return it as a
/// self-contained data URI.
pub async fn upload_inline_image(input: Vec<u8>) -> AssetResult<String> {
    let blob = compress_async(input, ImageConstraints::INLINE).await?;
    Ok(to_data_uri(&blob))
}

fn decode(input: &[u8]) -> AssetResult<DynamicImage> {
    ImageReader::new(Cursor::new(input))
        .with_guessed_format()
        .map_err(|e| AssetError::Decode(e.to_string()))?
        .decode()
        .map_err(|e| AssetError::Decode(e.to_string()))
}

/// Downscale so neither side exceeds `max_dimension`, keeping aspect ratio.
fn fit_within(image: DynamicImage, max_dimension: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    if width <= max_dimension && height <= max_dimension {
        return image;
    }
    image.resize(max_dimension, max_dimension, FilterType::Lanczos3)
}

/// Drop the alpha channel, compositing translucent pixels over white.
fn flatten(image: DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let over_white = |c: u8| ((c as u32 * a as u32 + 255 * (255 - a as u32)) / 255) as u8;
        Rgb([over_white(r), over_white(g), over_white(b)])
    })
}

fn encode_jpeg(image: &RgbImage, quality: u8) -> AssetResult<Vec<u8>> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(image)
        .map_err(|e| AssetError::Encode(e.to_string()))?;
    Ok(out)
}
