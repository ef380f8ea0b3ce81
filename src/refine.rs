//! Local-neighborhood mask refinement

use crate::types::{BinaryMask, PixelBuffer, SoftMask};

/// Ambiguous alpha band subject to edge-consistency correction (exclusive)
const AMBIGUOUS_LOW: f32 = 50.0;
const AMBIGUOUS_HIGH: f32 = 205.0;

/// Deviation from the neighborhood average that marks a suspect pixel
const DEVIATION_THRESHOLD: f32 = 50.0;

/// Background similarity above which a suspect pixel is reassigned
const SIMILARITY_THRESHOLD: f32 = 0.7;

/// Cardinal probe distance in pixels for photometric context sampling
const PROBE_DISTANCE: u32 = 5;

/// Neighbor-vote smoothing and edge-consistency correction
///
/// Two independent strategies: `smooth` denoises a binary mask by majority
/// vote before further cleanup; `correct_edges` repairs isolated
/// misclassified pixels in a soft mask using local photometric context
/// instead of blanket smoothing.
pub struct MaskRefiner;

impl MaskRefiner {
    /// Two-pass neighbor-vote smoothing
    ///
    /// Each interior pixel snaps to the majority of its 8-neighborhood: the
    /// neighborhood average on the 0-255 scale is compared against 127, so
    /// the 4-of-8 tie (127.5) snaps to foreground. The second pass reads the
    /// first pass's output. Border pixels are copied through.
    #[must_use]
    pub fn smooth(mask: &BinaryMask) -> BinaryMask {
        let (width, height) = mask.dimensions();
        let w = width as usize;
        let mut current = mask.clone();

        if width < 3 || height < 3 {
            return current;
        }

        for _ in 0..2 {
            let mut out = current.data().to_vec();
            for y in 1..height - 1 {
                for x in 1..width - 1 {
                    let mut sum = 0u32;
                    for ky in y - 1..=y + 1 {
                        for kx in x - 1..=x + 1 {
                            if ky != y || kx != x {
                                sum += u32::from(current.get(kx, ky));
                            }
                        }
                    }
                    let avg = sum as f32 * 255.0 / 8.0;
                    out[y as usize * w + x as usize] = u8::from(avg > 127.0);
                }
            }
            current = BinaryMask::new(out, (width, height));
        }

        current
    }

    /// Edge-consistency correction over the ambiguous alpha band
    ///
    /// Alpha values in (50, 205) on the 0-255 scale that deviate from their
    /// 8-neighborhood average by more than 50 are reassigned by photometric
    /// context: the source color is compared against colors sampled
    /// `PROBE_DISTANCE` pixels away in the four cardinal directions, and the
    /// pixel becomes background when the normalized similarity exceeds 0.7,
    /// foreground otherwise.
    #[must_use]
    pub fn correct_edges(buffer: &PixelBuffer, mask: &SoftMask) -> SoftMask {
        let (width, height) = mask.dimensions();
        debug_assert_eq!(buffer.dimensions(), mask.dimensions());
        let w = width as usize;
        let mut out = mask.data().to_vec();

        if width < 3 || height < 3 {
            return SoftMask::new(out, (width, height));
        }

        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let alpha = mask.get(x, y) * 255.0;
                if alpha <= AMBIGUOUS_LOW || alpha >= AMBIGUOUS_HIGH {
                    continue;
                }

                let mut sum = 0.0f32;
                for ky in y - 1..=y + 1 {
                    for kx in x - 1..=x + 1 {
                        if ky != y || kx != x {
                            sum += mask.get(kx, ky) * 255.0;
                        }
                    }
                }
                let avg = sum / 8.0;

                if (alpha - avg).abs() > DEVIATION_THRESHOLD {
                    let similarity = Self::background_similarity(buffer, x, y);
                    out[y as usize * w + x as usize] =
                        if similarity > SIMILARITY_THRESHOLD { 0.0 } else { 1.0 };
                }
            }
        }

        SoftMask::new(out, (width, height))
    }

    /// Normalized color distance between a pixel and its cardinal context
    ///
    /// Averages the distance to colors sampled `PROBE_DISTANCE` pixels up,
    /// down, left, and right (clamped at the image edge), scaled by 1/100 and
    /// capped at 1.0. High values mean the pixel stands out from its
    /// surroundings the way an isolated misclassified edge pixel does.
    #[must_use]
    pub fn background_similarity(buffer: &PixelBuffer, x: u32, y: u32) -> f32 {
        let (width, height) = buffer.dimensions();
        let current = buffer.rgb(x, y);

        let top = buffer.rgb(x, y.saturating_sub(PROBE_DISTANCE));
        let bottom = buffer.rgb(x, (y + PROBE_DISTANCE).min(height - 1));
        let left = buffer.rgb(x.saturating_sub(PROBE_DISTANCE), y);
        let right = buffer.rgb((x + PROBE_DISTANCE).min(width - 1), y);

        let avg_diff = (current.distance(top)
            + current.distance(bottom)
            + current.distance(left)
            + current.distance(right))
            / 4.0;

        (avg_diff / 100.0).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PixelBuffer;

    fn mask_from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> u8) -> BinaryMask {
        let mut data = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        BinaryMask::new(data, (width, height))
    }

    fn buffer_from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 3]) -> PixelBuffer {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let [r, g, b] = f(x, y);
                data.extend_from_slice(&[r, g, b, 255]);
            }
        }
        PixelBuffer::from_raw(width, height, data).unwrap()
    }

    #[test]
    fn test_smooth_removes_isolated_noise() {
        let mask = mask_from_fn(9, 9, |x, y| u8::from(x == 4 && y == 4));
        let smoothed = MaskRefiner::smooth(&mask);
        assert!(smoothed.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_smooth_fills_isolated_hole() {
        let mask = mask_from_fn(9, 9, |x, y| {
            u8::from((1..8).contains(&x) && (1..8).contains(&y) && !(x == 4 && y == 4))
        });
        let smoothed = MaskRefiner::smooth(&mask);
        assert_eq!(smoothed.get(4, 4), 1);
    }

    #[test]
    fn test_smooth_four_of_eight_snaps_to_foreground() {
        // Every interior checkerboard pixel sees exactly 4 set neighbors
        // (the 127.5 tie) and must snap to foreground
        let mask = mask_from_fn(9, 9, |x, y| u8::from((x + y) % 2 == 0));
        let smoothed = MaskRefiner::smooth(&mask);
        for y in 1..8 {
            for x in 1..8 {
                assert_eq!(smoothed.get(x, y), 1);
            }
        }
    }

    #[test]
    fn test_smooth_preserves_tiny_masks() {
        let mask = mask_from_fn(2, 2, |x, _| x as u8);
        assert_eq!(MaskRefiner::smooth(&mask), mask);
    }

    #[test]
    fn test_correct_edges_drops_pixel_that_stands_out() {
        // The pixel color differs strongly from its probed context, so the
        // ambiguous alpha spike is reassigned background
        let buffer = buffer_from_fn(12, 12, |x, y| {
            if x == 6 && y == 6 {
                [250, 10, 10]
            } else {
                [10, 10, 10]
            }
        });
        let mut data = vec![0.0f32; 144];
        data[6 * 12 + 6] = 0.5; // ambiguous, deviating from an empty neighborhood
        let mask = SoftMask::new(data, (12, 12));

        let corrected = MaskRefiner::correct_edges(&buffer, &mask);
        assert_eq!(corrected.get(6, 6), 0.0);
    }

    #[test]
    fn test_correct_edges_keeps_pixel_matching_context() {
        // Uniform image: the suspect pixel matches its context, so it is
        // reassigned foreground
        let buffer = buffer_from_fn(12, 12, |_, _| [120, 120, 120]);
        let mut data = vec![0.0f32; 144];
        data[6 * 12 + 6] = 0.5;
        let mask = SoftMask::new(data, (12, 12));

        let corrected = MaskRefiner::correct_edges(&buffer, &mask);
        assert_eq!(corrected.get(6, 6), 1.0);
    }

    #[test]
    fn test_correct_edges_ignores_settled_alpha() {
        let buffer = buffer_from_fn(8, 8, |_, _| [50, 50, 50]);
        let mask = SoftMask::new(vec![1.0; 64], (8, 8));
        let corrected = MaskRefiner::correct_edges(&buffer, &mask);
        assert_eq!(corrected.data(), mask.data());
    }
}
