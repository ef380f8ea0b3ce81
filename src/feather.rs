//! Gaussian feathering of binary masks

use crate::types::{BinaryMask, Mask, SoftMask};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Normalized 2-D Gaussian kernel
///
/// Weights sum to 1 by construction. By convention sigma is half the
/// requested radius.
#[derive(Debug, Clone)]
pub struct GaussianKernel {
    weights: Vec<f32>,
    side: usize,
}

impl GaussianKernel {
    /// Build a normalized kernel of the given side length
    ///
    /// `side` is clamped to at least 1; `sigma` to a small positive floor so
    /// degenerate requests still produce a valid kernel.
    #[must_use]
    pub fn new(side: u32, sigma: f32) -> Self {
        let side = side.max(1) as usize;
        let sigma = sigma.max(0.1);
        let center = (side / 2) as f32;
        let mut weights = Vec::with_capacity(side * side);
        let mut sum = 0.0f32;

        for y in 0..side {
            for x in 0..side {
                let dx = x as f32 - center;
                let dy = y as f32 - center;
                let value = (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp();
                weights.push(value);
                sum += value;
            }
        }

        for w in &mut weights {
            *w /= sum;
        }

        Self { weights, side }
    }

    /// Kernel side length
    #[must_use]
    pub fn side(&self) -> usize {
        self.side
    }

    /// Weight at kernel coordinates (kx, ky)
    #[inline]
    #[must_use]
    pub fn weight(&self, kx: usize, ky: usize) -> f32 {
        self.weights[ky * self.side + kx]
    }
}

/// Converts a binary mask into a soft alpha mask by Gaussian-weighted
/// smoothing
///
/// Produces soft transition bands at silhouette edges proportional to the
/// local mask gradient.
pub struct FeatherFilter;

impl FeatherFilter {
    /// Feather the mask with a kernel of side `radius`, sigma `radius / 2`
    ///
    /// `radius == 0` skips feathering; the mask remains strictly binary. The
    /// border band of width `radius / 2` carries the input values unchanged.
    #[must_use]
    pub fn feather(mask: &BinaryMask, radius: u32) -> Mask {
        if radius == 0 {
            return Mask::Binary(mask.clone());
        }

        let (width, height) = mask.dimensions();
        let w = width as usize;
        let kernel = GaussianKernel::new(radius, radius as f32 / 2.0);
        let half = radius / 2;

        // Border band keeps the input values
        let mut out: Vec<f32> = mask.data().iter().map(|&v| f32::from(v)).collect();

        if width > 2 * half && height > 2 * half {
            let fill_row = |y: u32, row: &mut [f32]| {
                if y < half || y >= height - half {
                    return;
                }
                for x in half..width - half {
                    let mut sum = 0.0f32;
                    let mut weight_sum = 0.0f32;

                    for ky in 0..kernel.side() {
                        for kx in 0..kernel.side() {
                            let sy = y + ky as u32 - half;
                            let sx = x + kx as u32 - half;
                            let weight = kernel.weight(kx, ky);
                            sum += f32::from(mask.get(sx, sy)) * weight;
                            weight_sum += weight;
                        }
                    }

                    row[x as usize] = (sum / weight_sum).min(1.0);
                }
            };

            #[cfg(feature = "rayon")]
            out.par_chunks_mut(w)
                .enumerate()
                .for_each(|(y, row)| fill_row(y as u32, row));

            #[cfg(not(feature = "rayon"))]
            out.chunks_mut(w)
                .enumerate()
                .for_each(|(y, row)| fill_row(y as u32, row));
        }

        Mask::Soft(SoftMask::new(out, (width, height)))
    }
}
