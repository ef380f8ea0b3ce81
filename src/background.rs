//! Dominant background color estimation

use crate::types::{PixelBuffer, Rgb};

/// Number of sample pairs taken from the top and bottom margins
const SAMPLE_PAIRS: u32 = 20;

/// Estimates the dominant background color from the image margins
///
/// Assumes subjects are framed centrally, so the top and bottom margins are
/// dominated by background. Constant-time and allocation-free.
pub struct BackgroundEstimator;

impl BackgroundEstimator {
    /// Approximate the dominant background color
    ///
    /// Takes [`SAMPLE_PAIRS`] sample pairs at deterministic, evenly spaced
    /// column strata. Each pair reads one pixel from the outermost rows of
    /// the top strip (alternating rows 0 and 1) and one from the mirrored
    /// bottom position. Row indices are clamped so buffers shorter than the
    /// strip still sample in bounds. Returns the arithmetic per-channel mean
    /// rounded to the nearest integer.
    #[must_use]
    pub fn estimate(buffer: &PixelBuffer) -> Rgb {
        let (width, height) = buffer.dimensions();
        let mut sums = [0u32; 3];
        let mut count = 0u32;

        for i in 0..SAMPLE_PAIRS {
            // Stratum center of the i-th of 20 equal column bands
            let x = ((u64::from(2 * i + 1) * u64::from(width)
                / u64::from(2 * SAMPLE_PAIRS)) as u32)
                .min(width - 1);
            let top_y = (i % 2).min(height - 1);
            let bottom_y = height - 1 - top_y;

            for y in [top_y, bottom_y] {
                let Rgb([r, g, b]) = buffer.rgb(x, y);
                sums[0] += u32::from(r);
                sums[1] += u32::from(g);
                sums[2] += u32::from(b);
                count += 1;
            }
        }

        let mean = |sum: u32| ((f64::from(sum) / f64::from(count)).round()) as u8;
        Rgb([mean(sums[0]), mean(sums[1]), mean(sums[2])])
    }
}
