//! Core types for foreground/background separation

use crate::{
    config::{OutputFormat, Quality},
    error::{Result, SeparationError},
};
use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// An RGB color triple used for background estimates and distance comparisons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    /// Euclidean distance between two colors in RGB space
    #[must_use]
    pub fn distance(&self, other: Rgb) -> f32 {
        let dr = f32::from(self.0[0]) - f32::from(other.0[0]);
        let dg = f32::from(self.0[1]) - f32::from(other.0[1]);
        let db = f32::from(self.0[2]) - f32::from(other.0[2]);
        (dr * dr + dg * dg + db * db).sqrt()
    }
}

/// Immutable view over interleaved RGBA pixel data
///
/// Every transform in the pipeline reads one of these and allocates a fresh
/// output; no component mutates a buffer it did not allocate itself.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a buffer from raw interleaved RGBA bytes
    ///
    /// # Errors
    /// Returns `InvalidInput` for zero dimensions or a data length that does
    /// not equal `width * height * 4`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SeparationError::invalid_input(format!(
                "buffer dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(SeparationError::invalid_input(format!(
                "buffer data length {} does not match {}x{} RGBA ({} bytes)",
                data.len(),
                width,
                height,
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Create a buffer from a decoded image
    ///
    /// # Errors
    /// Returns `InvalidInput` for zero-dimension images.
    pub fn from_image(image: &DynamicImage) -> Result<Self> {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_raw(width, height, rgba.into_raw())
    }

    /// Buffer width in pixels
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Buffer height in pixels
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Buffer dimensions as (width, height)
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw interleaved RGBA bytes
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Byte offset of the pixel at (x, y)
    #[inline]
    #[must_use]
    pub fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// RGB channels of the pixel at (x, y)
    #[inline]
    #[must_use]
    pub fn rgb(&self, x: u32, y: u32) -> Rgb {
        let idx = self.offset(x, y);
        Rgb([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }

    /// Alpha channel of the pixel at (x, y)
    #[inline]
    #[must_use]
    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        self.data[self.offset(x, y) + 3]
    }

    /// Convert back into an `image` crate RGBA buffer
    ///
    /// # Errors
    /// Returns `Processing` if the container cannot be rebuilt (cannot happen
    /// for a buffer constructed through `from_raw`).
    pub fn to_rgba_image(&self) -> Result<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.data.clone()).ok_or_else(|| {
            SeparationError::processing("failed to rebuild RGBA image from pixel buffer")
        })
    }
}

/// Binary coverage mask: one `{0,1}` value per pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    data: Vec<u8>,
    dimensions: (u32, u32),
}

impl BinaryMask {
    /// Create a mask from raw `{0,1}` values
    #[must_use]
    pub fn new(data: Vec<u8>, dimensions: (u32, u32)) -> Self {
        debug_assert_eq!(
            data.len(),
            dimensions.0 as usize * dimensions.1 as usize,
            "mask data length must match dimensions"
        );
        Self { data, dimensions }
    }

    /// Mask dimensions as (width, height)
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    /// Raw mask values
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Value at (x, y)
    #[inline]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.data[y as usize * self.dimensions.0 as usize + x as usize]
    }

    /// Foreground/background pixel statistics
    #[must_use]
    pub fn statistics(&self) -> MaskStatistics {
        let total_pixels = self.data.len();
        let foreground_pixels = self.data.iter().filter(|&&v| v != 0).count();
        let background_pixels = total_pixels - foreground_pixels;

        MaskStatistics {
            total_pixels,
            foreground_pixels,
            background_pixels,
            foreground_ratio: foreground_pixels as f32 / total_pixels as f32,
            background_ratio: background_pixels as f32 / total_pixels as f32,
        }
    }
}

/// Soft coverage mask: one `[0,1]` value per pixel
#[derive(Debug, Clone, PartialEq)]
pub struct SoftMask {
    data: Vec<f32>,
    dimensions: (u32, u32),
}

impl SoftMask {
    /// Create a mask from raw `[0,1]` values
    #[must_use]
    pub fn new(data: Vec<f32>, dimensions: (u32, u32)) -> Self {
        debug_assert_eq!(
            data.len(),
            dimensions.0 as usize * dimensions.1 as usize,
            "mask data length must match dimensions"
        );
        Self { data, dimensions }
    }

    /// Promote a binary mask to the soft representation
    #[must_use]
    pub fn from_binary(mask: &BinaryMask) -> Self {
        let data = mask.data().iter().map(|&v| f32::from(v)).collect();
        Self::new(data, mask.dimensions())
    }

    /// Mask dimensions as (width, height)
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    /// Raw mask values
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Value at (x, y)
    #[inline]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[y as usize * self.dimensions.0 as usize + x as usize]
    }

    /// Scale values to the 0-255 alpha range
    #[must_use]
    pub fn to_alpha_bytes(&self) -> Vec<u8> {
        self.data
            .iter()
            .map(|&v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect()
    }

    /// Convert to a grayscale image (for mask export)
    ///
    /// # Errors
    /// Returns `Processing` if the container cannot be built.
    pub fn to_image(&self) -> Result<image::GrayImage> {
        let (width, height) = self.dimensions;
        image::GrayImage::from_raw(width, height, self.to_alpha_bytes())
            .ok_or_else(|| SeparationError::processing("failed to build image from mask data"))
    }

    /// Save the mask as a grayscale PNG
    ///
    /// # Errors
    /// Returns `Image`/`Io` errors from the encoder.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.to_image()?
            .save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}

/// Staged mask representation threaded through the pipeline
///
/// The binary stage feeds classification and morphology; feathering promotes
/// the mask to the soft stage. Dimensions always equal the buffer the mask
/// was derived from.
#[derive(Debug, Clone)]
pub enum Mask {
    /// Hard `{0,1}` coverage
    Binary(BinaryMask),
    /// Soft `[0,1]` coverage
    Soft(SoftMask),
}

impl Mask {
    /// Mask dimensions as (width, height)
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Binary(m) => m.dimensions(),
            Self::Soft(m) => m.dimensions(),
        }
    }

    /// Collapse to the soft representation
    #[must_use]
    pub fn into_soft(self) -> SoftMask {
        match self {
            Self::Binary(m) => SoftMask::from_binary(&m),
            Self::Soft(m) => m,
        }
    }
}

/// Statistics about a coverage mask
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskStatistics {
    pub total_pixels: usize,
    pub foreground_pixels: usize,
    pub background_pixels: usize,
    pub foreground_ratio: f32,
    pub background_ratio: f32,
}

/// Which path produced the raw coverage mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaskSource {
    /// Externally supplied segmentation provider
    Provider,
    /// Local estimator + edge detector + classifier
    Heuristic,
}

/// Timing breakdown for a separation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingTimings {
    /// Downscale cap and buffer conversion
    pub preprocessing_ms: u64,

    /// Raw mask acquisition (provider call or heuristic classification)
    pub mask_acquisition_ms: u64,

    /// Morphological closing
    pub morphology_ms: u64,

    /// Gaussian feathering
    pub feathering_ms: u64,

    /// Alpha merge and transition-band blur
    pub compositing_ms: u64,

    /// Total end-to-end time
    pub total_ms: u64,
}

impl ProcessingTimings {
    /// One-line summary for display
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Total: {}ms | Preprocess: {}ms | Mask: {}ms | Morphology: {}ms | Feather: {}ms | Composite: {}ms",
            self.total_ms,
            self.preprocessing_ms,
            self.mask_acquisition_ms,
            self.morphology_ms,
            self.feathering_ms,
            self.compositing_ms
        )
    }
}

/// Metadata about a separation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingMetadata {
    /// Timing breakdown
    pub timings: ProcessingTimings,

    /// Quality profile used
    pub quality: Quality,

    /// Which path produced the mask
    pub mask_source: MaskSource,

    /// Dimensions actually processed (post-cap)
    pub working_dimensions: (u32, u32),

    /// Downscale ratio applied before processing (1.0 = uncapped)
    pub scale: f32,
}

/// Result of a separation operation
#[derive(Debug, Clone)]
pub struct SeparationResult {
    /// The composited image with alpha channel populated
    pub image: RgbaImage,

    /// The final soft mask used for compositing
    pub mask: SoftMask,

    /// Input dimensions before the max-edge cap
    pub original_dimensions: (u32, u32),

    /// Processing metadata
    pub metadata: ProcessingMetadata,
}

impl SeparationResult {
    /// Output dimensions (the working resolution)
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Timing breakdown for this run
    #[must_use]
    pub fn timings(&self) -> &ProcessingTimings {
        &self.metadata.timings
    }

    /// Image as raw RGBA bytes
    #[must_use]
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.image.as_raw().clone()
    }

    /// Encode in the requested output format
    ///
    /// # Errors
    /// Returns `Image` errors from the encoder.
    pub fn to_bytes(&self, format: OutputFormat) -> Result<Vec<u8>> {
        match format {
            OutputFormat::Png => {
                let mut buffer = Vec::new();
                let mut cursor = std::io::Cursor::new(&mut buffer);
                self.image.write_to(&mut cursor, image::ImageFormat::Png)?;
                Ok(buffer)
            },
            OutputFormat::Rgba8 => Ok(self.to_rgba_bytes()),
        }
    }

    /// Save the result as PNG with alpha channel
    ///
    /// # Errors
    /// Returns `Image`/`Io` errors from the encoder.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.image.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_buffer_validation() {
        assert!(matches!(
            PixelBuffer::from_raw(0, 4, vec![]),
            Err(SeparationError::InvalidInput(_))
        ));
        assert!(matches!(
            PixelBuffer::from_raw(2, 2, vec![0; 15]),
            Err(SeparationError::InvalidInput(_))
        ));
        let buffer = PixelBuffer::from_raw(2, 2, vec![0; 16]).unwrap();
        assert_eq!(buffer.dimensions(), (2, 2));
    }

    #[test]
    fn test_pixel_buffer_accessors() {
        let mut data = vec![0u8; 2 * 2 * 4];
        // pixel (1, 0) = (10, 20, 30, 40)
        data[4..8].copy_from_slice(&[10, 20, 30, 40]);
        let buffer = PixelBuffer::from_raw(2, 2, data).unwrap();
        assert_eq!(buffer.rgb(1, 0), Rgb([10, 20, 30]));
        assert_eq!(buffer.alpha(1, 0), 40);
        assert_eq!(buffer.rgb(0, 1), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_color_distance() {
        assert_eq!(Rgb([0, 0, 0]).distance(Rgb([0, 0, 0])), 0.0);
        let d = Rgb([255, 255, 255]).distance(Rgb([255, 0, 0]));
        assert!((d - (2.0f32 * 255.0 * 255.0).sqrt()).abs() < 1e-3);
    }

    #[test]
    fn test_mask_statistics() {
        let mask = BinaryMask::new(vec![1, 1, 0, 0], (2, 2));
        let stats = mask.statistics();
        assert_eq!(stats.total_pixels, 4);
        assert_eq!(stats.foreground_pixels, 2);
        assert_eq!(stats.background_pixels, 2);
        assert_eq!(stats.foreground_ratio, 0.5);
    }

    #[test]
    fn test_soft_mask_round_trip() {
        let binary = BinaryMask::new(vec![1, 0, 0, 1], (2, 2));
        let soft = SoftMask::from_binary(&binary);
        assert_eq!(soft.data(), &[1.0, 0.0, 0.0, 1.0]);
        assert_eq!(soft.to_alpha_bytes(), vec![255, 0, 0, 255]);
    }

    #[test]
    fn test_mask_into_soft() {
        let mask = Mask::Binary(BinaryMask::new(vec![1, 0], (2, 1)));
        assert_eq!(mask.dimensions(), (2, 1));
        let soft = mask.into_soft();
        assert_eq!(soft.data(), &[1.0, 0.0]);
    }
}
