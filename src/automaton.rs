use crate::affinity::AffinityField;
use crate::arrays::Array2D;
use crate::common::{split_length_to_ranges, Config};
use crate::error::Error;
use crate::grid::{Direction, Grid};
use crate::seed::StrengthField;
use assume::assume;
use log::{info, trace};
use multiversion::multiversion;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// How the automaton stopped.
///
/// Reaching the iteration ceiling is not an error, the state is used as it is.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Outcome {
    /// Number of executed steps, including the final step that changed nothing.
    pub iterations: u32,
    /// False when `max_iterations` was reached while cells were still changing.
    pub converged: bool,
}

/// GrowCut cellular automaton over a double-buffered strength field.
///
/// Every step reads only the current buffer and writes only the other one, then the
/// buffers are swapped. Cells are never observed half-updated.
pub struct Automaton<'a> {
    affinity: &'a AffinityField,
    buffers: [StrengthField; 2],
    current: usize,
    workers: usize,
    max_iterations: u32,
}

impl<'a> Automaton<'a> {
    pub fn new(
        affinity: &'a AffinityField,
        seeds: StrengthField,
        config: &Config,
    ) -> Result<Self, Error> {
        let grid = affinity.weights.checked_grid()?;
        if seeds.checked_grid()? != grid {
            return Err(Error::DimensionMismatch {
                image: (grid.width, grid.height),
                overlay: (seeds.width, seeds.height),
            });
        }
        let next: StrengthField = Array2D::try_zeroed(grid.width, grid.height)?;
        Ok(Self {
            affinity,
            buffers: [seeds, next],
            current: 0,
            workers: config.workers(),
            max_iterations: config.max_iterations,
        })
    }

    /// State after the last finished step.
    pub fn strength(&self) -> &StrengthField {
        &self.buffers[self.current]
    }

    pub fn into_strength(self) -> StrengthField {
        let [a, b] = self.buffers;
        if self.current == 0 {
            a
        } else {
            b
        }
    }

    /// Does one synchronous update of the whole grid. Returns true when no cell changed.
    pub fn step(&mut self) -> bool {
        let [a, b] = &mut self.buffers;
        let (input, output) = if self.current == 0 {
            (&*a, b)
        } else {
            (&*b, a)
        };
        let converged = step(input, output, self.affinity, self.workers);
        self.current ^= 1;
        converged
    }

    /// Steps until a step changes nothing or `max_iterations` steps were done.
    pub fn run(&mut self) -> Outcome {
        let start = Instant::now();
        let mut outcome = Outcome {
            iterations: 0,
            converged: false,
        };
        while outcome.iterations < self.max_iterations {
            outcome.converged = self.step();
            outcome.iterations += 1;
            trace!(
                "step {} converged={}",
                outcome.iterations,
                outcome.converged
            );
            if outcome.converged {
                break;
            }
        }
        info!(
            "automaton stopped after {} steps (converged: {}) in {:?}",
            outcome.iterations,
            outcome.converged,
            start.elapsed()
        );
        outcome
    }
}

/// One GrowCut step from `input` into `output`.
///
/// The output is split into the top row, the middle rows and the bottom row. Middle rows
/// are divided into `workers` row-bands, each band updates its rows including their first
/// and last cell. The top and bottom rows are one extra task. No two tasks write the same
/// cell and nobody writes `input`, so the scope end is the only synchronization.
pub fn step(
    input: &StrengthField,
    output: &mut StrengthField,
    affinity: &AffinityField,
    workers: usize,
) -> bool {
    let grid = input.grid();
    debug_assert_eq!(grid, output.grid());
    debug_assert_eq!(grid, affinity.grid());
    if grid.is_empty() {
        return true;
    }
    let width = grid.width;
    let offsets = grid.neighbor_index_offsets();
    let bands = split_length_to_ranges(grid.height.saturating_sub(2), workers);

    let (top, rest) = output.data.split_at_mut(width);
    let (middle, bottom) = rest.split_at_mut(width * grid.height.saturating_sub(2));

    if workers == 1 {
        let mut converged = update_border_row(input, affinity, 0, top);
        converged &= update_band(input, affinity, &offsets, 1, middle);
        if !bottom.is_empty() {
            converged &= update_border_row(input, affinity, grid.height - 1, bottom);
        }
        return converged;
    }

    let converged = AtomicBool::new(true);
    rayon::scope(|s| {
        let converged = &converged;
        let offsets = &offsets;
        let mut middle = middle;
        for band in bands {
            let (chunk, tail) = std::mem::take(&mut middle).split_at_mut(band.len() * width);
            middle = tail;
            s.spawn(move |_| {
                let band_converged = update_band(input, affinity, offsets, band.start + 1, chunk);
                converged.fetch_and(band_converged, Ordering::Relaxed);
            });
        }
        s.spawn(move |_| {
            let mut border_converged = update_border_row(input, affinity, 0, top);
            if !bottom.is_empty() {
                border_converged &=
                    update_border_row(input, affinity, grid.height - 1, bottom);
            }
            converged.fetch_and(border_converged, Ordering::Relaxed);
        });
    });
    converged.into_inner()
}

/// Updates consecutive middle rows starting at row `first_row`.
fn update_band(
    input: &StrengthField,
    affinity: &AffinityField,
    offsets: &[isize; 8],
    first_row: usize,
    band: &mut [f32],
) -> bool {
    let width = input.width;
    let mut converged = true;
    for (row_offset, row) in band.chunks_exact_mut(width).enumerate() {
        let y = first_row + row_offset;
        debug_assert!(width <= 2 || input.grid().is_interior(1, y));
        converged &= update_border_cell(input, affinity, 0, y, &mut row[0]);
        if width > 2 {
            converged &= update_interior_span(
                input.as_slice(),
                affinity.weights.as_slice(),
                offsets,
                input.get_index(1, y),
                &mut row[1..width - 1],
            );
        }
        if width > 1 {
            converged &= update_border_cell(input, affinity, width - 1, y, &mut row[width - 1]);
        }
    }
    converged
}

fn update_border_row(
    input: &StrengthField,
    affinity: &AffinityField,
    y: usize,
    row: &mut [f32],
) -> bool {
    let mut converged = true;
    for (x, out) in row.iter_mut().enumerate() {
        converged &= update_border_cell(input, affinity, x, y, out);
    }
    converged
}

/// Update rule with a bounds check for every direction.
#[inline(always)]
fn update_border_cell(
    input: &StrengthField,
    affinity: &AffinityField,
    x: usize,
    y: usize,
    out: &mut f32,
) -> bool {
    let grid: Grid = input.grid();
    let weights = &affinity.weights[(x, y)];
    let mut value = input[(x, y)];
    let mut converged = true;
    for direction in Direction::ALL {
        if let Some(neighbor) = grid.neighbor(x, y, direction) {
            let candidate = weights[direction.slot()] * input[neighbor];
            if candidate.abs() > value.abs() {
                value = candidate;
                converged = false;
            }
        }
    }
    *out = value;
    converged
}

/// Update rule for a run of interior cells starting at flat index `first_index`. All 8
/// neighbors of these cells exist, so no bounds are checked.
#[multiversion(targets = "simd")]
fn update_interior_span(
    input: &[f32],
    weights: &[[f32; 8]],
    offsets: &[isize; 8],
    first_index: usize,
    out: &mut [f32],
) -> bool {
    let mut converged = true;
    for (i, out_value) in out.iter_mut().enumerate() {
        let index = first_index + i;
        assume!(unsafe: index < input.len());
        assume!(unsafe: index < weights.len());
        let cell = &weights[index];
        let mut value = input[index];
        for (slot, offset) in offsets.iter().enumerate() {
            let neighbor = index.wrapping_add_signed(*offset);
            assume!(unsafe: neighbor < input.len());
            let candidate = cell[slot] * input[neighbor];
            if candidate.abs() > value.abs() {
                value = candidate;
                converged = false;
            }
        }
        *out_value = value;
    }
    converged
}
