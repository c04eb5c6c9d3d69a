use crate::arrays::Array2D;
use crate::common::RgbaView;
use crate::error::Error;
use crate::grid::Grid;
use crate::seed::StrengthField;

/// Binary foreground/background decision for every pixel.
#[derive(Debug)]
pub struct Mask {
    pub foreground: Array2D<bool>,
}

impl Mask {
    /// A pixel is foreground only when its settled strength is strictly positive.
    /// Undetermined pixels (strength 0) are background.
    pub fn from_strength(strength: &StrengthField) -> Result<Self, Error> {
        let grid = strength.checked_grid()?;
        let mut foreground: Array2D<bool> = Array2D::try_zeroed(grid.width, grid.height)?;
        for (out, value) in foreground.data.iter_mut().zip(strength.data.iter()) {
            *out = *value > 0.0;
        }
        Ok(Self { foreground })
    }

    #[inline(always)]
    pub fn grid(&self) -> Grid {
        self.foreground.grid()
    }

    #[inline(always)]
    pub fn is_foreground(&self, x: usize, y: usize) -> bool {
        self.foreground[(x, y)]
    }

    pub fn foreground_count(&self) -> usize {
        self.foreground.data.iter().filter(|f| **f).count()
    }

    /// Copies RGB from `source` and sets alpha to 0xFF for foreground, 0x00 otherwise.
    pub fn apply_to_rgba8(&self, source: &RgbaView) -> Result<Vec<u8>, Error> {
        let grid = self.grid();
        if source.grid() != grid {
            return Err(Error::DimensionMismatch {
                image: (source.width(), source.height()),
                overlay: (grid.width, grid.height),
            });
        }
        let mut output = source.data().to_vec();
        for (px, foreground) in output.chunks_exact_mut(4).zip(self.foreground.data.iter()) {
            px[3] = if *foreground { 0xFF } else { 0x00 };
        }
        Ok(output)
    }
}

/// Paints the overlay over the source wherever the overlay alpha exceeds
/// `opacity_threshold`, for checking where the seeds are.
pub fn composite_overlay(
    source: &RgbaView,
    overlay: &RgbaView,
    opacity_threshold: u8,
) -> Result<Vec<u8>, Error> {
    if source.grid() != overlay.grid() {
        return Err(Error::DimensionMismatch {
            image: (source.width(), source.height()),
            overlay: (overlay.width(), overlay.height()),
        });
    }
    let mut output = source.data().to_vec();
    for (px, over) in output
        .chunks_exact_mut(4)
        .zip(overlay.data().chunks_exact(4))
    {
        if over[3] > opacity_threshold {
            px[..3].copy_from_slice(&over[..3]);
        }
    }
    Ok(output)
}
