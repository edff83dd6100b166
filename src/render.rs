//! Rasterization of a finished module matrix: scaled monochrome pixel
//! grids, in-memory BGR bitmaps for the decoder, and PNG files through
//! the `image` crate.

use std::path::Path;

use image::{GrayImage, Luma};

use crate::models::{BitMatrix, ModuleMatrix};

/// Default edge length of one module in pixels
pub const DEFAULT_MODULE_PX: usize = 4;
/// Default quiet zone width in modules
pub const DEFAULT_QUIET_ZONE: usize = 4;

/// Rasterize to a boolean pixel grid, true = black
pub fn to_bit_grid(matrix: &ModuleMatrix, module_px: usize, quiet_zone: usize) -> BitMatrix {
    let size = matrix.size();
    let px = (size + 2 * quiet_zone) * module_px;
    let mut grid = BitMatrix::new(px, px);

    for row in 0..size {
        for col in 0..size {
            if !matrix.is_dark(row as i32, col as i32) {
                continue;
            }
            let y0 = (row + quiet_zone) * module_px;
            let x0 = (col + quiet_zone) * module_px;
            for y in y0..y0 + module_px {
                for x in x0..x0 + module_px {
                    grid.set(x, y, true);
                }
            }
        }
    }
    grid
}

/// Rasterize to a 24bpp BGR pixel buffer; returns (bytes, width, height)
/// with stride = 3 * width
pub fn to_bgr_bytes(
    matrix: &ModuleMatrix,
    module_px: usize,
    quiet_zone: usize,
) -> (Vec<u8>, usize, usize) {
    let grid = to_bit_grid(matrix, module_px, quiet_zone);
    let (width, height) = (grid.width(), grid.height());
    let mut bytes = vec![0u8; width * height * 3];
    for y in 0..height {
        for x in 0..width {
            let value = if grid.get(x, y) { 0x00 } else { 0xFF };
            let idx = (y * width + x) * 3;
            bytes[idx] = value;
            bytes[idx + 1] = value;
            bytes[idx + 2] = value;
        }
    }
    (bytes, width, height)
}

/// Rasterize to an 8-bit grayscale image
pub fn to_gray_image(matrix: &ModuleMatrix, module_px: usize, quiet_zone: usize) -> GrayImage {
    let grid = to_bit_grid(matrix, module_px, quiet_zone);
    let (width, height) = (grid.width() as u32, grid.height() as u32);
    GrayImage::from_fn(width, height, |x, y| {
        if grid.get(x as usize, y as usize) {
            Luma([0u8])
        } else {
            Luma([255u8])
        }
    })
}

/// Write the symbol as a monochrome PNG file
pub fn save_png(
    matrix: &ModuleMatrix,
    path: impl AsRef<Path>,
    module_px: usize,
    quiet_zone: usize,
) -> image::ImageResult<()> {
    to_gray_image(matrix, module_px, quiet_zone).save(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_matrix() -> ModuleMatrix {
        let mut m = ModuleMatrix::new(3);
        m.set_dark(0, 0, true);
        m.set_dark(1, 1, true);
        m.set_dark(2, 2, true);
        m
    }

    #[test]
    fn test_grid_dimensions() {
        let grid = to_bit_grid(&sample_matrix(), 4, 4);
        assert_eq!(grid.width(), (3 + 8) * 4);
        assert_eq!(grid.height(), 44);
    }

    #[test]
    fn test_quiet_zone_is_white() {
        let grid = to_bit_grid(&sample_matrix(), 2, 2);
        for i in 0..grid.width() {
            assert!(!grid.get(i, 0));
            assert!(!grid.get(0, i));
        }
    }

    #[test]
    fn test_module_scaling() {
        let grid = to_bit_grid(&sample_matrix(), 3, 1);
        // Module (0,0) occupies pixels [3..6) in both axes.
        assert!(grid.get(3, 3));
        assert!(grid.get(5, 5));
        assert!(!grid.get(6, 3));
        // Module (1,1) is dark too.
        assert!(grid.get(7, 7));
    }

    #[test]
    fn test_bgr_buffer_values() {
        let (bytes, width, height) = to_bgr_bytes(&sample_matrix(), 1, 0);
        assert_eq!((width, height), (3, 3));
        assert_eq!(bytes.len(), 27);
        // (0,0) black, (1,0) white.
        assert_eq!(&bytes[0..3], &[0, 0, 0]);
        assert_eq!(&bytes[3..6], &[255, 255, 255]);
    }
}
