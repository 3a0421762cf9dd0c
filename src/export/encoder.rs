//! Image encoder abstraction
//!
//! One [`ImageEncoder`] per output format, created through
//! [`EncoderFactory`]. Quality only affects JPEG; the other formats are
//! lossless here.

use super::error::ExportError;
use super::format::OutputFormat;
use image::{ColorType, DynamicImage};
use std::io::Cursor;

/// Quality settings for image encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderQuality {
    /// Quality value (1-100, where 100 is best quality)
    pub quality: u8,
}

impl Default for EncoderQuality {
    fn default() -> Self {
        Self { quality: 95 }
    }
}

impl EncoderQuality {
    /// Create quality settings with specified quality level
    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }
}

/// Result of encoding an image
#[derive(Debug)]
pub struct EncodedImage {
    /// The encoded image data
    pub data: Vec<u8>,
    /// The output format
    pub format: OutputFormat,
    /// MIME type of `data`
    pub content_type: &'static str,
}

impl EncodedImage {
    pub fn new(data: Vec<u8>, format: OutputFormat) -> Self {
        let content_type = format.content_type();
        Self {
            data,
            format,
            content_type,
        }
    }
}

/// Trait for image encoders
pub trait ImageEncoder: Send + Sync {
    /// The output format this encoder produces
    fn format(&self) -> OutputFormat;

    /// Encode an image to the target format
    fn encode(
        &self,
        image: &DynamicImage,
        quality: EncoderQuality,
    ) -> Result<EncodedImage, ExportError>;

    /// Check if this encoder keeps the alpha channel
    fn supports_transparency(&self) -> bool;
}

/// Raw pixels in the layout an encoder should receive: RGBA when the image
/// has alpha and the format keeps it, RGB otherwise.
fn pixels_for(image: &DynamicImage, keep_alpha: bool) -> (Vec<u8>, ColorType) {
    if keep_alpha && image.color().has_alpha() {
        (image.to_rgba8().into_raw(), ColorType::Rgba8)
    } else {
        (image.to_rgb8().into_raw(), ColorType::Rgb8)
    }
}

/// JPEG encoder using the image crate
pub struct JpegEncoder;

impl ImageEncoder for JpegEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Jpeg
    }

    fn encode(
        &self,
        image: &DynamicImage,
        quality: EncoderQuality,
    ) -> Result<EncodedImage, ExportError> {
        use image::codecs::jpeg::JpegEncoder as ImageJpegEncoder;
        use image::ImageEncoder as _;

        // JPEG doesn't support alpha
        let (data, color) = pixels_for(image, false);

        let mut output = Cursor::new(Vec::new());
        let encoder = ImageJpegEncoder::new_with_quality(&mut output, quality.quality);

        encoder
            .write_image(&data, image.width(), image.height(), color)
            .map_err(|e| ExportError::encode_failed("jpeg", e.to_string()))?;

        Ok(EncodedImage::new(output.into_inner(), OutputFormat::Jpeg))
    }

    fn supports_transparency(&self) -> bool {
        false
    }
}

/// PNG encoder using the image crate
pub struct PngEncoder;

impl ImageEncoder for PngEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Png
    }

    fn encode(
        &self,
        image: &DynamicImage,
        _quality: EncoderQuality,
    ) -> Result<EncodedImage, ExportError> {
        use image::codecs::png::PngEncoder as ImagePngEncoder;
        use image::ImageEncoder as _;

        let (data, color) = pixels_for(image, true);

        let mut output = Cursor::new(Vec::new());
        let encoder = ImagePngEncoder::new(&mut output);

        encoder
            .write_image(&data, image.width(), image.height(), color)
            .map_err(|e| ExportError::encode_failed("png", e.to_string()))?;

        Ok(EncodedImage::new(output.into_inner(), OutputFormat::Png))
    }

    fn supports_transparency(&self) -> bool {
        true
    }
}

/// WebP encoder using the image crate
///
/// Note: The `image` crate only supports lossless WebP encoding.
pub struct WebPEncoder;

impl ImageEncoder for WebPEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::WebP
    }

    fn encode(
        &self,
        image: &DynamicImage,
        _quality: EncoderQuality,
    ) -> Result<EncodedImage, ExportError> {
        use image::codecs::webp::WebPEncoder as ImageWebPEncoder;
        use image::ImageEncoder as _;

        let (data, color) = pixels_for(image, true);

        let mut output = Cursor::new(Vec::new());
        let encoder = ImageWebPEncoder::new_lossless(&mut output);

        encoder
            .write_image(&data, image.width(), image.height(), color)
            .map_err(|e| ExportError::encode_failed("webp", e.to_string()))?;

        Ok(EncodedImage::new(output.into_inner(), OutputFormat::WebP))
    }

    fn supports_transparency(&self) -> bool {
        true
    }
}

/// BMP encoder using the image crate
pub struct BmpEncoder;

impl ImageEncoder for BmpEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Bmp
    }

    fn encode(
        &self,
        image: &DynamicImage,
        _quality: EncoderQuality,
    ) -> Result<EncodedImage, ExportError> {
        use image::codecs::bmp::BmpEncoder as ImageBmpEncoder;
        use image::ImageEncoder as _;

        let (data, color) = pixels_for(image, true);

        let mut output = Cursor::new(Vec::new());
        let encoder = ImageBmpEncoder::new(&mut output);

        encoder
            .write_image(&data, image.width(), image.height(), color)
            .map_err(|e| ExportError::encode_failed("bmp", e.to_string()))?;

        Ok(EncodedImage::new(output.into_inner(), OutputFormat::Bmp))
    }

    fn supports_transparency(&self) -> bool {
        true
    }
}

/// GIF encoder using the image crate (single frame, palette quantized)
pub struct GifEncoder;

impl ImageEncoder for GifEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Gif
    }

    fn encode(
        &self,
        image: &DynamicImage,
        _quality: EncoderQuality,
    ) -> Result<EncodedImage, ExportError> {
        use image::codecs::gif::GifEncoder as ImageGifEncoder;

        let rgba = image.to_rgba8();

        let mut output = Vec::new();
        {
            // The GIF trailer is written when the encoder drops
            let mut encoder = ImageGifEncoder::new(&mut output);
            encoder
                .encode(rgba.as_raw(), rgba.width(), rgba.height(), ColorType::Rgba8)
                .map_err(|e| ExportError::encode_failed("gif", e.to_string()))?;
        }

        Ok(EncodedImage::new(output, OutputFormat::Gif))
    }

    fn supports_transparency(&self) -> bool {
        true
    }
}

/// TIFF encoder using the image crate (uncompressed)
pub struct TiffEncoder;

impl ImageEncoder for TiffEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Tiff
    }

    fn encode(
        &self,
        image: &DynamicImage,
        _quality: EncoderQuality,
    ) -> Result<EncodedImage, ExportError> {
        use image::codecs::tiff::TiffEncoder as ImageTiffEncoder;
        use image::ImageEncoder as _;

        let (data, color) = pixels_for(image, true);

        // The TIFF writer seeks back to patch offsets
        let mut output = Cursor::new(Vec::new());
        ImageTiffEncoder::new(&mut output)
            .write_image(&data, image.width(), image.height(), color)
            .map_err(|e| ExportError::encode_failed("tiff", e.to_string()))?;

        Ok(EncodedImage::new(output.into_inner(), OutputFormat::Tiff))
    }

    fn supports_transparency(&self) -> bool {
        true
    }
}

/// Factory for creating encoders based on output format
pub struct EncoderFactory;

impl EncoderFactory {
    /// Create an encoder for the specified output format
    pub fn create(format: OutputFormat) -> Box<dyn ImageEncoder> {
        match format {
            OutputFormat::Jpeg => Box::new(JpegEncoder),
            OutputFormat::Png => Box::new(PngEncoder),
            OutputFormat::WebP => Box::new(WebPEncoder),
            OutputFormat::Bmp => Box::new(BmpEncoder),
            OutputFormat::Gif => Box::new(GifEncoder),
            OutputFormat::Tiff => Box::new(TiffEncoder),
        }
    }
}
