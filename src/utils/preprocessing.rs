//! Shared image preprocessing utilities

use crate::{error::Result, types::PixelBuffer};

/// A buffer bounded by the max-edge cap, with the applied downscale ratio
#[derive(Debug, Clone)]
pub struct EdgeCapped {
    /// The working-resolution buffer
    pub buffer: PixelBuffer,
    /// Downscale ratio applied (1.0 when the input was within the cap)
    pub scale: f32,
}

/// Bound worst-case memory and time by capping the longest image edge
///
/// Inputs whose longest edge exceeds `max_edge` are downscaled
/// proportionally with a Triangle filter; the ratio is returned so callers
/// can interpret outputs at the working resolution. Re-upscaling to the
/// original resolution is the caller's responsibility.
///
/// # Errors
/// Returns `Processing` if the downscaled buffer cannot be rebuilt.
pub fn apply_edge_cap(buffer: &PixelBuffer, max_edge: u32) -> Result<EdgeCapped> {
    let (width, height) = buffer.dimensions();
    let max_edge_f = max_edge as f32;
    let ratio = (max_edge_f / width as f32)
        .min(max_edge_f / height as f32)
        .min(1.0);

    if ratio >= 1.0 {
        return Ok(EdgeCapped {
            buffer: buffer.clone(),
            scale: 1.0,
        });
    }

    let new_width = ((width as f32 * ratio).round() as u32).max(1);
    let new_height = ((height as f32 * ratio).round() as u32).max(1);

    log::debug!(
        "downscaling {}x{} to {}x{} (ratio {:.4})",
        width,
        height,
        new_width,
        new_height,
        ratio
    );

    let rgba = buffer.to_rgba_image()?;
    let resized = image::imageops::resize(
        &rgba,
        new_width,
        new_height,
        image::imageops::FilterType::Triangle,
    );

    Ok(EdgeCapped {
        buffer: PixelBuffer::from_raw(new_width, new_height, resized.into_raw())?,
        scale: ratio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::from_raw(width, height, vec![128; (width * height * 4) as usize]).unwrap()
    }

    #[test]
    fn test_within_cap_is_untouched() {
        let input = buffer(64, 48);
        let capped = apply_edge_cap(&input, 64).unwrap();
        assert_eq!(capped.scale, 1.0);
        assert_eq!(capped.buffer.dimensions(), (64, 48));
    }

    #[test]
    fn test_oversized_input_is_downscaled_proportionally() {
        let input = buffer(64, 32);
        let capped = apply_edge_cap(&input, 16).unwrap();
        assert_eq!(capped.scale, 0.25);
        assert_eq!(capped.buffer.dimensions(), (16, 8));
    }

    #[test]
    fn test_ratio_tracks_longest_edge() {
        let input = buffer(10, 40);
        let capped = apply_edge_cap(&input, 20).unwrap();
        assert_eq!(capped.scale, 0.5);
        assert_eq!(capped.buffer.dimensions(), (5, 20));
    }
}
