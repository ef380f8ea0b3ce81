//! Alpha-channel compositing

use crate::{
    error::{Result, SeparationError},
    feather::GaussianKernel,
    types::{Mask, PixelBuffer},
};

/// Merges source color channels with a coverage mask into an output buffer
///
/// RGB channels are copied verbatim; the alpha channel comes from the mask.
/// A binary mask yields hard 0/255 alpha; a soft mask yields its values
/// scaled to 0-255. An optional post-process blur low-passes the feathered
/// transition band.
pub struct Compositor;

impl Compositor {
    /// Composite the buffer with the mask
    ///
    /// `blur_amount > 0` applies a Gaussian blur of radius
    /// `ceil(blur_amount)` over the alpha channel. Blurred values are only
    /// written to pixels with partial incoming alpha, so fully-opaque and
    /// fully-transparent regions are exact fixed points and a strictly
    /// binary mask composites idempotently.
    ///
    /// # Errors
    /// Returns `Processing` when mask and buffer dimensions differ.
    pub fn composite(buffer: &PixelBuffer, mask: &Mask, blur_amount: f32) -> Result<PixelBuffer> {
        if mask.dimensions() != buffer.dimensions() {
            return Err(SeparationError::processing(format!(
                "mask dimensions {:?} do not match buffer {:?}",
                mask.dimensions(),
                buffer.dimensions()
            )));
        }

        let (width, height) = buffer.dimensions();
        let mut alpha = Self::mask_to_alpha(mask);

        if blur_amount > 0.0 {
            alpha = Self::blur_transition_band(&alpha, (width, height), blur_amount);
        }

        let src = buffer.data();
        let mut out = Vec::with_capacity(src.len());
        for (pixel, &a) in src.chunks_exact(4).zip(alpha.iter()) {
            out.extend_from_slice(&[pixel[0], pixel[1], pixel[2], a]);
        }

        PixelBuffer::from_raw(width, height, out)
    }

    fn mask_to_alpha(mask: &Mask) -> Vec<u8> {
        match mask {
            Mask::Binary(m) => m.data().iter().map(|&v| if v != 0 { 255 } else { 0 }).collect(),
            Mask::Soft(m) => m.to_alpha_bytes(),
        }
    }

    /// Gaussian low-pass over the alpha transition band
    ///
    /// Window coordinates clamp at the image edge. Pixels at exactly 0 or
    /// 255 keep their value.
    fn blur_transition_band(alpha: &[u8], dimensions: (u32, u32), blur_amount: f32) -> Vec<u8> {
        let (width, height) = dimensions;
        let w = width as usize;
        let radius = blur_amount.ceil() as u32;
        let side = 2 * radius + 1;
        let kernel = GaussianKernel::new(side, radius as f32 / 2.0);
        let half = radius as i64;

        let mut out = alpha.to_vec();
        for y in 0..height as i64 {
            for x in 0..width as i64 {
                let current = alpha[y as usize * w + x as usize];
                if current == 0 || current == 255 {
                    continue;
                }

                let mut sum = 0.0f32;
                for ky in 0..side as i64 {
                    for kx in 0..side as i64 {
                        let sy = (y + ky - half).clamp(0, i64::from(height) - 1) as usize;
                        let sx = (x + kx - half).clamp(0, i64::from(width) - 1) as usize;
                        sum += f32::from(alpha[sy * w + sx])
                            * kernel.weight(kx as usize, ky as usize);
                    }
                }

                out[y as usize * w + x as usize] = sum.round().clamp(0.0, 255.0) as u8;
            }
        }

        out
    }
}
