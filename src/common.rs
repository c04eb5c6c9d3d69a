use crate::error::Error;
use crate::grid::Grid;
use crate::seed::SeedConfig;
use rayon::current_num_threads;
use std::ops::Range;

/// Iteration ceiling of the automaton. The update rule is not guaranteed to converge for
/// every input, so this is a soft limit, not an error.
pub const MAX_ITERATIONS: u32 = 2000;

/// Changes between parallelization schemas of the automaton step.
///
/// Both produce bit-identical results, every step is a pure function of the previous
/// buffer.
#[derive(Clone, PartialEq, Debug, Copy)]
pub enum ThreadingStrategy {
    /// No threading - the same interior/border partition processed in order. Used for
    /// correctness checks and very small images.
    SingleThread,
    /// Interior rows are split into equally sized bands, one rayon task per band, plus one
    /// task for the top and bottom rows.
    ///
    /// This is the default.
    RowBased,
}

/// Main config for the processing.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum number of automaton steps. Processing stops earlier when a full step
    /// changes no cell.
    pub max_iterations: u32,
    pub threading_strategy: ThreadingStrategy,
    /// Number of interior row-bands for `ThreadingStrategy::RowBased`. `None` uses
    /// `rayon::current_num_threads()`.
    pub num_workers: Option<usize>,
    /// How overlay pixels are turned into seeds.
    pub seed: SeedConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_iterations: MAX_ITERATIONS,
            threading_strategy: ThreadingStrategy::RowBased,
            num_workers: None,
            seed: SeedConfig::default(),
        }
    }
}

impl Config {
    /// Number of row-bands the interior is split into.
    pub fn workers(&self) -> usize {
        match self.threading_strategy {
            ThreadingStrategy::SingleThread => 1,
            ThreadingStrategy::RowBased => self
                .num_workers
                .unwrap_or_else(current_num_threads)
                .max(1),
        }
    }
}

/// Borrowed packed RGBA8 image (4 bytes per pixel, row-major, no padding).
///
/// Only [`RgbaView::new`] creates one, so every view is non-empty and its buffer length
/// matches its size.
#[derive(Clone, Copy, Debug)]
pub struct RgbaView<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
}

impl<'a> RgbaView<'a> {
    /// Checks size and buffer length. Nothing is allocated.
    pub fn new(data: &'a [u8], width: usize, height: usize) -> Result<Self, Error> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyImage { width, height });
        }
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or(Error::TooLarge { width, height })?;
        if data.len() != expected {
            return Err(Error::BufferLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn grid(&self) -> Grid {
        Grid::new(self.width, self.height)
    }

    #[inline(always)]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    #[inline(always)]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline(always)]
    pub fn height(&self) -> usize {
        self.height
    }
}

pub(crate) fn split_length_to_ranges(length: usize, splits: usize) -> Vec<Range<usize>> {
    let splits = splits.clamp(1, length.max(1));
    let chunk_size = length / splits;
    let rem = length % splits;
    (0..splits)
        .scan((rem, 0usize), |(r, acc), _split| {
            let mut size = chunk_size;
            if *r > 0 {
                *r -= 1;
                size += 1;
            }
            let out = (*acc, *acc + size);
            *acc += size;
            Some(out.0..out.1)
        })
        .collect()
}
