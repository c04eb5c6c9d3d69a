use crate::arrays::Array2D;
use crate::color::ColorField;
use crate::error::Error;
use crate::grid::{Direction, Grid};
use multiversion::multiversion;
use rayon::prelude::*;

/// Largest possible distance between two colors in the unit cube, `sqrt(3)`.
pub const MAX_COLOR_DISTANCE: f32 = 1.732_050_8;

/// For every pixel, the weight with which each of its 8 neighbors can attack it.
///
/// Slots are indexed by [`Direction::slot`]. Slots of neighbors outside of the grid stay
/// `0.0` and are never read by the automaton. Weights are not clamped, a dissimilar
/// neighbor may get a negative weight.
#[derive(Debug)]
pub struct AffinityField {
    pub weights: Array2D<[f32; 8]>,
}

/// `1 - |a - b| / sqrt(3)`
#[inline(always)]
pub fn color_affinity(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    let d0 = a[0] - b[0];
    let d1 = a[1] - b[1];
    let d2 = a[2] - b[2];
    let c = (d0 * d0 + d1 * d1 + d2 * d2).sqrt();
    1.0 - c / MAX_COLOR_DISTANCE
}

impl AffinityField {
    pub fn compute(colors: &ColorField) -> Result<Self, Error> {
        let grid = colors.field.checked_grid()?;
        let mut weights: Array2D<[f32; 8]> = Array2D::try_zeroed(grid.width, grid.height)?;
        weights
            .data
            .par_chunks_mut(grid.width)
            .enumerate()
            .for_each(|(y, row)| compute_row(colors, y, row));
        Ok(Self { weights })
    }

    /// Same weight in every existing direction, for driving the automaton directly.
    pub fn uniform(grid: Grid, weight: f32) -> Result<Self, Error> {
        let mut weights: Array2D<[f32; 8]> = Array2D::try_zeroed(grid.width, grid.height)?;
        for y in 0..grid.height {
            for (x, cell) in weights.get_row_mut(y).iter_mut().enumerate() {
                for direction in Direction::ALL {
                    if grid.neighbor(x, y, direction).is_some() {
                        cell[direction.slot()] = weight;
                    }
                }
            }
        }
        Ok(Self { weights })
    }

    #[inline(always)]
    pub fn grid(&self) -> Grid {
        self.weights.grid()
    }

    #[inline(always)]
    pub fn get(&self, x: usize, y: usize, direction: Direction) -> f32 {
        self.weights[(x, y)][direction.slot()]
    }
}

#[multiversion(targets = "simd")]
fn compute_row(colors: &ColorField, y: usize, row: &mut [[f32; 8]]) {
    let grid = colors.grid();
    let field = &colors.field;
    for (x, cell) in row.iter_mut().enumerate() {
        let center = field[(x, y)];
        for direction in Direction::ALL {
            if let Some(neighbor) = grid.neighbor(x, y, direction) {
                cell[direction.slot()] = color_affinity(&center, &field[neighbor]);
            }
        }
    }
}
