//! Text extraction from base64-encoded images.
//!
//! Input may be a bare base64 payload or a full data URL
//! (`data:image/png;base64,...`). Recognition itself sits behind
//! [`TextRecognizer`]; the production implementation is [`TesseractCli`].

pub mod tesseract;

pub use tesseract::TesseractCli;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::DynamicImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Unable to decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Text recognition failed: {0}")]
    Recognition(String),
}

#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

/// Drops everything up to and including the first comma, if there is one.
pub fn strip_data_url(input: &str) -> &str {
    match input.split_once(',') {
        Some((_, payload)) => payload,
        None => input,
    }
}

pub fn decode_image(image_base64: &str) -> Result<DynamicImage, OcrError> {
    let bytes = STANDARD.decode(strip_data_url(image_base64).trim())?;
    Ok(image::load_from_memory(&bytes)?)
}

/// Decodes the payload and returns the recognizer's raw output.
pub async fn extract_text(
    recognizer: &dyn TextRecognizer,
    image_base64: &str,
) -> Result<String, OcrError> {
    let image = decode_image(image_base64)?;
    tracing::debug!("Decoded {}x{} image for OCR", image.width(), image.height());
    recognizer.recognize(&image).await
}

#[cfg(test)]
pub(crate) fn png_base64(width: u32, height: u32) -> String {
    let image = DynamicImage::ImageRgb8(image::RgbImage::new(width, height));
    let mut buf = std::io::Cursor::new(Vec::new());
    image.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    STANDARD.encode(buf.into_inner())
}
