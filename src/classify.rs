//! Foreground pixel classification

use crate::{
    edges::GradientMap,
    types::{BinaryMask, PixelBuffer, Rgb},
};

/// Color distance above which a pixel counts as foreground
const COLOR_DIFF_THRESHOLD: f32 = 50.0;

/// Gradient magnitude above which a pixel counts as foreground
const EDGE_THRESHOLD: u8 = 40;

/// Center-bias factor above which a pixel counts as foreground
const CENTER_THRESHOLD: f32 = 0.7;

/// Normalization constant for the radial distance from the image center
const CENTER_NORM: f32 = 0.7;

/// Combines color distance, edge strength, and a radial center bias into a
/// binary coverage mask
///
/// The three signals are OR-combined: any single strong signal is sufficient
/// evidence of subject membership. This trades false positives for recall so
/// the later cleanup stages start from an over- rather than under-segmented
/// mask.
pub struct ForegroundClassifier;

impl ForegroundClassifier {
    /// Classify every pixel as foreground (1) or background (0)
    #[must_use]
    pub fn classify(buffer: &PixelBuffer, background: Rgb, gradient: &GradientMap) -> BinaryMask {
        let (width, height) = buffer.dimensions();
        let w = width as f32;
        let h = height as f32;
        let mut data = Vec::with_capacity(width as usize * height as usize);

        for y in 0..height {
            for x in 0..width {
                let color_diff = buffer.rgb(x, y).distance(background);
                let edge_value = gradient.get(x, y);

                let dx = x as f32 / w - 0.5;
                let dy = y as f32 / h - 0.5;
                let center_factor = 1.0 - (dx * dx + dy * dy).sqrt() / CENTER_NORM;

                let foreground = color_diff > COLOR_DIFF_THRESHOLD
                    || edge_value > EDGE_THRESHOLD
                    || center_factor > CENTER_THRESHOLD;

                data.push(u8::from(foreground));
            }
        }

        BinaryMask::new(data, (width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edges::EdgeDetector;
    use crate::types::PixelBuffer;

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
    fn test_uniform_image_keeps_only_center_disc() {
        let buffer = buffer_from_fn(40, 40, |_, _| [128, 128, 128]);
        let gradient = EdgeDetector::detect(&buffer);
        let mask = ForegroundClassifier::classify(&buffer, Rgb([128, 128, 128]), &gradient);

        // No color contrast, no edges: only the radial center bias fires
        assert_eq!(mask.get(0, 0), 0);
        assert_eq!(mask.get(39, 39), 0);
        assert_eq!(mask.get(20, 20), 1);
        // Radius of the biased disc: distance/0.7 < 0.3 => within 0.21 of center
        assert_eq!(mask.get(20, 28), 1); // 0.2 normalized distance
        assert_eq!(mask.get(20, 30), 0); // 0.25 normalized distance
    }

    #[test]
    fn test_color_contrast_marks_foreground() {
        let buffer = buffer_from_fn(20, 20, |x, y| {
            if (4..16).contains(&x) && (4..16).contains(&y) {
                [255, 0, 0]
            } else {
                [255, 255, 255]
            }
        });
        let gradient = EdgeDetector::detect(&buffer);
        let mask = ForegroundClassifier::classify(&buffer, Rgb([255, 255, 255]), &gradient);

        assert_eq!(mask.get(10, 10), 1);
        assert_eq!(mask.get(0, 0), 0);
        assert_eq!(mask.get(19, 0), 0);
    }

    #[test]
    fn test_edge_strength_marks_foreground() {
        // Two grays 40 apart: color distance ~69 from midpoint is above the
        // color threshold, so estimate background as the left gray and rely on
        // the gradient response at the boundary
        let buffer = buffer_from_fn(20, 20, |x, _| if x < 10 { [100; 3] } else { [130; 3] });
        let gradient = EdgeDetector::detect(&buffer);
        let mask = ForegroundClassifier::classify(&buffer, Rgb([100, 100, 100]), &gradient);

        // Color distance of the right half is sqrt(3)*30 ~ 52 > 50, so the
        // right half is foreground by color; the boundary columns fire on the
        // gradient regardless
        assert_eq!(mask.get(9, 2), 1);
        assert_eq!(mask.get(10, 2), 1);
        assert_eq!(mask.get(2, 2), 0);
    }
}
