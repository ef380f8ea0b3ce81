//! Sobel gradient-magnitude edge detection

use crate::types::PixelBuffer;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Per-pixel gradient magnitudes (0-255)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradientMap {
    data: Vec<u8>,
    dimensions: (u32, u32),
}

impl GradientMap {
    fn new(data: Vec<u8>, dimensions: (u32, u32)) -> Self {
        Self { data, dimensions }
    }

    /// Map dimensions as (width, height)
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    /// Raw magnitudes
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Magnitude at (x, y)
    #[inline]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.data[y as usize * self.dimensions.0 as usize + x as usize]
    }
}

const SOBEL_GX: [[f32; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_GY: [[f32; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Computes a gradient-magnitude map via the Sobel kernel pair
///
/// Pure function of the input pixels. Border pixels (first/last row and
/// column) stay at zero magnitude; no wraparound or replication.
pub struct EdgeDetector;

impl EdgeDetector {
    /// Detect edges in the buffer
    #[must_use]
    pub fn detect(buffer: &PixelBuffer) -> GradientMap {
        let (width, height) = buffer.dimensions();
        let w = width as usize;
        let mut out = vec![0u8; w * height as usize];

        if width >= 3 && height >= 3 {
            #[cfg(feature = "rayon")]
            out.par_chunks_mut(w)
                .enumerate()
                .for_each(|(y, row)| Self::fill_row(buffer, y as u32, row));

            #[cfg(not(feature = "rayon"))]
            out.chunks_mut(w)
                .enumerate()
                .for_each(|(y, row)| Self::fill_row(buffer, y as u32, row));
        }

        GradientMap::new(out, (width, height))
    }

    #[inline]
    fn luminance(buffer: &PixelBuffer, x: u32, y: u32) -> f32 {
        let rgb = buffer.rgb(x, y);
        0.299 * f32::from(rgb.0[0]) + 0.587 * f32::from(rgb.0[1]) + 0.114 * f32::from(rgb.0[2])
    }

    fn fill_row(buffer: &PixelBuffer, y: u32, row: &mut [u8]) {
        let (width, height) = buffer.dimensions();
        if y == 0 || y == height - 1 {
            return;
        }

        for x in 1..width - 1 {
            let mut gx = 0.0f32;
            let mut gy = 0.0f32;

            for ky in 0..3u32 {
                for kx in 0..3u32 {
                    let gray = Self::luminance(buffer, x + kx - 1, y + ky - 1);
                    gx += gray * SOBEL_GX[ky as usize][kx as usize];
                    gy += gray * SOBEL_GY[ky as usize][kx as usize];
                }
            }

            let magnitude = (gx * gx + gy * gy).sqrt().min(255.0);
            row[x as usize] = magnitude as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn test_uniform_image_has_zero_gradient() {
        let buffer = buffer_from_fn(16, 16, |_, _| [90, 90, 90]);
        let map = EdgeDetector::detect(&buffer);
        assert!(map.data().iter().all(|&m| m == 0));
    }

    #[test]
    fn test_vertical_edge_response_at_boundary() {
        // Left half black, right half white; edge between columns 7 and 8
        let buffer = buffer_from_fn(16, 16, |x, _| if x < 8 { [0, 0, 0] } else { [255; 3] });
        let map = EdgeDetector::detect(&buffer);

        // Strong response in the columns touching the transition
        assert!(map.get(7, 8) > 200);
        assert!(map.get(8, 8) > 200);
        // Flat regions away from the edge stay silent
        assert_eq!(map.get(3, 8), 0);
        assert_eq!(map.get(12, 8), 0);
    }

    #[test]
    fn test_borders_stay_zero() {
        let buffer = buffer_from_fn(8, 8, |x, y| [(x * 31) as u8, (y * 31) as u8, 128]);
        let map = EdgeDetector::detect(&buffer);
        for x in 0..8 {
            assert_eq!(map.get(x, 0), 0);
            assert_eq!(map.get(x, 7), 0);
        }
        for y in 0..8 {
            assert_eq!(map.get(0, y), 0);
            assert_eq!(map.get(7, y), 0);
        }
    }

    #[test]
    fn test_tiny_buffer_is_all_zero() {
        let buffer = buffer_from_fn(2, 2, |_, _| [255, 0, 0]);
        let map = EdgeDetector::detect(&buffer);
        assert!(map.data().iter().all(|&m| m == 0));
    }
}
