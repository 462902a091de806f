// src/services/image_processor.rs
use image::{GenericImageView, ImageFormat as ImgFormat};

use crate::errors::StudioError;
use crate::models::InlineImage;

pub const MAX_INPUT_DIMENSION: u32 = 4096;
pub const MAX_REFERENCE_DIMENSION: u32 = 2048;

/// Turns uploaded files into inline reference images.
pub struct ImageProcessor {
    max_size: u32,
}

impl Default for ImageProcessor {
    fn default() -> Self {
        Self::new(MAX_REFERENCE_DIMENSION)
    }
}

impl ImageProcessor {
    pub fn new(max_size: u32) -> Self {
        Self { max_size }
    }

    pub fn validate_image(&self, data: &[u8]) -> Result<(u32, u32), StudioError> {
        let img = image::load_from_memory(data)
            .map_err(|e| StudioError::ImageProcessing(format!("Invalid image format: {}", e)))?;

        let (width, height) = img.dimensions();

        if width > MAX_INPUT_DIMENSION || height > MAX_INPUT_DIMENSION {
            return Err(StudioError::ImageProcessing(format!(
                "Image dimensions exceed {0}x{0}",
                MAX_INPUT_DIMENSION
            )));
        }

        Ok((width, height))
    }

    /// Validates raw file bytes and produces a self-describing inline image,
    /// downscaled to PNG when either side is over the limit.
    pub fn prepare_reference(&self, data: &[u8]) -> Result<InlineImage, StudioError> {
        if data.is_empty() {
            return Err(StudioError::ImageProcessing("Empty image upload".to_string()));
        }

        let (width, height) = self.validate_image(data)?;
        if width <= self.max_size && height <= self.max_size {
            let format = image::guess_format(data).map_err(|e| {
                StudioError::ImageProcessing(format!("Unknown image format: {}", e))
            })?;
            return Ok(InlineImage::new(format.to_mime_type(), data.to_vec()));
        }

        let resized = self.resize(data)?;
        Ok(InlineImage::new(ImgFormat::Png.to_mime_type(), resized))
    }

    fn resize(&self, data: &[u8]) -> Result<Vec<u8>, StudioError> {
        let img = image::load_from_memory(data)
            .map_err(|e| StudioError::ImageProcessing(format!("Failed to load image: {}", e)))?;

        let (width, height) = img.dimensions();
        let ratio = (self.max_size as f32 / width.max(height) as f32).min(1.0);
        let new_width = ((width as f32 * ratio) as u32).max(1);
        let new_height = ((height as f32 * ratio) as u32).max(1);

        let resized = img.resize(new_width, new_height, image::imageops::FilterType::Lanczos3);

        let mut output = Vec::new();
        resized
            .write_to(&mut std::io::Cursor::new(&mut output), ImgFormat::Png)
            .map_err(|e| {
                StudioError::ImageProcessing(format!("Failed to encode resized image: {}", e))
            })?;

        Ok(output)
    }
}
