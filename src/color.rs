use crate::arrays::Array2D;
use crate::common::RgbaView;
use crate::error::Error;
use crate::grid::{Direction, Grid};
use multiversion::multiversion;
use rayon::prelude::*;
use tables::UNIT_TBL;

pub(crate) mod tables {
    use static_init::dynamic;
    /// `v / 255` for every 8-bit channel value, rounded once from `f64`.
    #[dynamic(65535)]
    pub static UNIT_TBL: [f32; 256] = core::array::from_fn(|i| (i as f64 / 255.0) as f32);
}

/// Normalized RGB color of every pixel, channels in `[0, 1]`.
///
/// Built once from the source image, smoothed once with [`ColorField::smooth`] and then
/// only read.
#[derive(Debug)]
pub struct ColorField {
    pub field: Array2D<[f32; 3]>,
}

impl ColorField {
    /// Normalizes packed RGBA8 samples. Alpha is ignored.
    pub fn from_rgba8(image: &RgbaView) -> Result<Self, Error> {
        let width = image.width();
        let mut field: Array2D<[f32; 3]> = Array2D::try_zeroed(width, image.height())?;
        field
            .data
            .par_chunks_mut(width)
            .zip(image.data().par_chunks(width * 4))
            .for_each(|(row_out, row_in)| {
                for (out, px) in row_out.iter_mut().zip(row_in.chunks_exact(4)) {
                    *out = unsafe {
                        [
                            UNIT_TBL[px[0] as usize],
                            UNIT_TBL[px[1] as usize],
                            UNIT_TBL[px[2] as usize],
                        ]
                    };
                }
            });
        Ok(Self { field })
    }

    pub fn from_field(field: Array2D<[f32; 3]>) -> Self {
        Self { field }
    }

    #[inline(always)]
    pub fn grid(&self) -> Grid {
        self.field.grid()
    }

    #[inline(always)]
    pub fn get_pixel(&self, x: usize, y: usize) -> [f32; 3] {
        self.field[(x, y)]
    }

    /// Replaces every pixel with the mean of itself and its existing 8-connected neighbors.
    ///
    /// The divisor is the number of pixels actually averaged (4 in corners, 6 on edges,
    /// 9 inside). Every output pixel is computed from the unsmoothed field.
    pub fn smooth(&mut self) -> Result<(), Error> {
        let grid = self.field.checked_grid()?;
        let mut smoothed: Array2D<[f32; 3]> = Array2D::try_zeroed(grid.width, grid.height)?;
        let field = &self.field;
        smoothed
            .data
            .par_chunks_mut(grid.width)
            .enumerate()
            .for_each(|(y, row_out)| smooth_row(field, y, row_out));
        self.field = smoothed;
        Ok(())
    }

    /// Renders the field back to RGBA8 with opaque alpha.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.field
            .data
            .iter()
            .flat_map(|c| {
                [
                    (c[0] * 255.0) as u8,
                    (c[1] * 255.0) as u8,
                    (c[2] * 255.0) as u8,
                    0xFF,
                ]
            })
            .collect()
    }
}

/// Sums the pixel itself first, then its neighbors in [`Direction::ALL`] order.
#[multiversion(targets = "simd")]
fn smooth_row(field: &Array2D<[f32; 3]>, y: usize, row_out: &mut [[f32; 3]]) {
    let grid = field.grid();
    for (x, out) in row_out.iter_mut().enumerate() {
        let mut acc = field[(x, y)];
        let mut n_pixels = 1u32;
        for direction in Direction::ALL {
            if let Some(neighbor) = grid.neighbor(x, y, direction) {
                let px = field[neighbor];
                acc[0] += px[0];
                acc[1] += px[1];
                acc[2] += px[2];
                n_pixels += 1;
            }
        }
        let n = n_pixels as f32;
        *out = [acc[0] / n, acc[1] / n, acc[2] / n];
    }
}
