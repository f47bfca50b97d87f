use std::io::Cursor;

use image::{codecs::png::PngDecoder, ImageDecoder, ImageFormat};

use crate::art_style::ArtStyle;
use crate::error::ResolveError;

/// Downloaded artwork whose orientation fits the requested style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Normalized extension without the dot, `webp` stays `webp`.
    pub extension: String,
    pub animated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
    pub animated: bool,
}

/// Reads the size of the image and checks it against the style.
///
/// Returns `Ok(None)` for images with the wrong orientation, those count as
/// not found. Only container headers are read, pixel data is never decoded.
pub fn validate(
    bytes: Vec<u8>,
    content_type: Option<&str>,
    url: &str,
    style: ArtStyle,
) -> Result<Option<ValidatedImage>, ResolveError> {
    let size = image_size(&bytes, content_type)?;
    if !style.accepts(size.width, size.height) {
        tracing::debug!(
            width = size.width,
            height = size.height,
            %style,
            "Rejecting image with the wrong aspect ratio"
        );
        return Ok(None);
    }
    Ok(Some(ValidatedImage {
        bytes,
        width: size.width,
        height: size.height,
        extension: normalize_extension(content_type, url),
        animated: size.animated,
    }))
}

pub fn image_size(bytes: &[u8], content_type: Option<&str>) -> Result<ImageSize, ResolveError> {
    if content_type.map(|c| c.contains("webp")).unwrap_or(false) {
        return webp_size(bytes).ok_or_else(|| {
            ResolveError::Image(image::ImageError::Decoding(
                image::error::DecodingError::new(
                    image::error::ImageFormatHint::Exact(ImageFormat::WebP),
                    "invalid webp header",
                ),
            ))
        });
    }
    if image::guess_format(bytes).ok() == Some(ImageFormat::Png) {
        return Ok(png_size(bytes)?);
    }
    let (width, height) = image::io::Reader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?
        .into_dimensions()?;
    Ok(ImageSize {
        width,
        height,
        animated: false,
    })
}

fn u24_le(bytes: &[u8]) -> u32 {
    u32::from(bytes[0]) | u32::from(bytes[1]) << 8 | u32::from(bytes[2]) << 16
}

/// RIFF/WEBP header, lossy, lossless and extended (animated) layouts.
pub fn webp_size(bytes: &[u8]) -> Option<ImageSize> {
    if bytes.len() < 30 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WEBP" {
        return None;
    }
    let chunk = &bytes[12..16];
    let data = &bytes[20..];
    match chunk {
        b"VP8 " => {
            // frame tag, then the 9d 01 2a start code
            if data[3..6] != [0x9d, 0x01, 0x2a] {
                return None;
            }
            let width = u16::from_le_bytes([data[6], data[7]]) & 0x3fff;
            let height = u16::from_le_bytes([data[8], data[9]]) & 0x3fff;
            Some(ImageSize {
                width: width.into(),
                height: height.into(),
                animated: false,
            })
        }
        b"VP8L" => {
            if data[0] != 0x2f {
                return None;
            }
            let bits = u32::from_le_bytes([data[1], data[2], data[3], data[4]]);
            Some(ImageSize {
                width: (bits & 0x3fff) + 1,
                height: ((bits >> 14) & 0x3fff) + 1,
                animated: false,
            })
        }
        b"VP8X" => Some(ImageSize {
            width: u24_le(&data[4..7]) + 1,
            height: u24_le(&data[7..10]) + 1,
            animated: data[0] & 0x02 != 0,
        }),
        _ => None,
    }
}

/// PNG dimensions from the header chunks. Animated when an `acTL` chunk
/// comes before the image data.
pub fn png_size(bytes: &[u8]) -> image::ImageResult<ImageSize> {
    let decoder = PngDecoder::new(Cursor::new(bytes))?;
    let (width, height) = decoder.dimensions();
    Ok(ImageSize {
        width,
        height,
        animated: decoder.is_apng(),
    })
}

/// Extension from the content type, then the url, then `jpg`. Steam is
/// forgiving on image extensions.
pub fn normalize_extension(content_type: Option<&str>, url: &str) -> String {
    let from_content_type = content_type
        .and_then(|c| c.split(';').next())
        .and_then(|c| c.split_once('/'))
        .map(|(_, subtype)| subtype.trim().to_lowercase())
        .filter(|subtype| !subtype.is_empty());
    let extension = from_content_type
        .or_else(|| url_extension(url))
        .unwrap_or_else(|| "jpg".to_string());
    match extension.as_str() {
        // the Steam library ignores .jpeg
        "jpeg" => "jpg".to_string(),
        // SteamGridDB storage answers with octet-stream for pngs
        "octet-stream" => "png".to_string(),
        _ => extension,
    }
}

fn url_extension(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let last_segment = parsed.path_segments()?.last()?.to_string();
    let (_, extension) = last_segment.rsplit_once('.')?;
    if extension.is_empty() {
        None
    } else {
        Some(extension.to_lowercase())
    }
}
