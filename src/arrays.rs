use crate::error::Error;
use crate::grid::Grid;
use aligned_vec::{AVec, ConstAlign};
use bytemuck::Zeroable;
use std::ops::{Index, IndexMut};

const ALIGN: usize = 64;

/// Dense per-pixel storage addressed by [`Grid::index`].
#[derive(Debug)]
pub struct Array2D<T> {
    pub data: AVec<T, ConstAlign<ALIGN>>,
    pub width: usize,
    pub height: usize,
}

impl<T> Array2D<T> {
    pub fn from_slice(data: &[T], width: usize, height: usize) -> Result<Self, Error>
    where
        T: Clone,
    {
        if data.len() != width * height {
            return Err(Error::BufferLength {
                expected: width * height,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data: AVec::from_slice(ALIGN, data),
        })
    }

    pub fn from_fill(value: T, width: usize, height: usize) -> Self
    where
        T: Clone + Copy,
    {
        let data: AVec<T, ConstAlign<ALIGN>> =
            AVec::from_iter(ALIGN, (0..width * height).map(|_| value));
        Self {
            width,
            height,
            data,
        }
    }

    /// Allocates a zero-filled array, reporting allocation failure instead of aborting.
    pub fn try_zeroed(width: usize, height: usize) -> Result<Self, Error>
    where
        T: Zeroable,
    {
        Ok(Self {
            width,
            height,
            data: avec_try_zeroed(width, height)?,
        })
    }

    #[inline(always)]
    pub fn grid(&self) -> Grid {
        Grid::new(self.width, self.height)
    }

    /// Grid of a non-empty array whose buffer holds exactly one element per pixel.
    pub fn checked_grid(&self) -> Result<Grid, Error> {
        let (width, height) = (self.width, self.height);
        let expected = width
            .checked_mul(height)
            .ok_or(Error::TooLarge { width, height })?;
        if expected == 0 {
            return Err(Error::EmptyImage { width, height });
        }
        if self.data.len() != expected {
            return Err(Error::BufferLength {
                expected,
                actual: self.data.len(),
            });
        }
        Ok(Grid::new(width, height))
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline(always)]
    pub fn get_row(&self, row: usize) -> &[T] {
        debug_assert!(row < self.height);
        &self.data[(self.width * row)..(self.width * row + self.width)]
    }

    pub fn get_row_mut(&mut self, row: usize) -> &mut [T] {
        debug_assert!(row < self.height);
        &mut self.data[(self.width * row)..(self.width * row + self.width)]
    }

    #[inline(always)]
    pub fn get_index(&self, x: usize, y: usize) -> usize {
        debug_assert!(
            self.width > x,
            "Index ({x}, {y}) is out of bounds ({}, {})",
            self.width,
            self.height
        );
        debug_assert!(
            self.height > y,
            "Index ({x}, {y}) is out of bounds ({}, {})",
            self.width,
            self.height
        );
        self.width * y + x
    }
}

impl<T> Index<(usize, usize)> for Array2D<T> {
    type Output = T;
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        &self.data[self.get_index(x, y)]
    }
}

impl<T> IndexMut<(usize, usize)> for Array2D<T> {
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut Self::Output {
        let idx = self.get_index(x, y);
        &mut self.data[idx]
    }
}

fn avec_try_zeroed<T: Zeroable>(
    width: usize,
    height: usize,
) -> Result<AVec<T, ConstAlign<ALIGN>>, Error> {
    let too_large = Error::TooLarge { width, height };
    let size = width.checked_mul(height).ok_or(too_large.clone())?;
    let size_bytes = size
        .checked_mul(std::mem::size_of::<T>())
        .ok_or(too_large.clone())?;
    if size_bytes == 0 {
        return Ok(AVec::new(ALIGN));
    }
    if size_bytes > isize::MAX as usize - (ALIGN - 1) {
        return Err(too_large);
    }
    let layout = std::alloc::Layout::from_size_align(size_bytes, ALIGN)
        .map_err(|_| Error::TooLarge { width, height })?;
    // Zeroable guarantees the all-zero bit pattern is a valid T.
    let ptr = unsafe { std::alloc::alloc_zeroed(layout) };
    if ptr.is_null() {
        return Err(Error::AllocationFailed { bytes: size_bytes });
    }
    Ok(unsafe { AVec::from_raw_parts(ptr as *mut T, ALIGN, size, size) })
}

#[cfg(test)]
mod tests {
    use super::Array2D;
    use crate::error::Error;

    #[test]
    fn array2d_zeroed_test() {
        let arr: Array2D<[f32; 8]> = Array2D::try_zeroed(33, 17).unwrap();
        assert_eq!(arr.data.len(), 33 * 17);
        assert!(arr.data.iter().all(|cell| cell.iter().all(|v| *v == 0.0)));
        assert_eq!(arr.data.as_ptr() as usize % 64, 0);
    }

    #[test]
    fn array2d_zeroed_overflow_test() {
        let arr = Array2D::<f32>::try_zeroed(usize::MAX / 2, 3);
        assert_eq!(
            arr.unwrap_err(),
            Error::TooLarge {
                width: usize::MAX / 2,
                height: 3
            }
        );
        let arr = Array2D::<[f32; 8]>::try_zeroed(1 << 31, 1 << 30);
        assert!(matches!(arr, Err(Error::TooLarge { .. })));
    }

    #[test]
    fn array2d_from_slice_length_test() {
        let arr = Array2D::from_slice(&[1u8, 2, 3], 2, 2);
        assert_eq!(
            arr.unwrap_err(),
            Error::BufferLength {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn array2d_rows_test() {
        let mut arr = Array2D::from_fill(0u16, 4, 3);
        arr.get_row_mut(1).copy_from_slice(&[1, 2, 3, 4]);
        arr[(3, 2)] = 9;
        assert_eq!(arr.get_row(0), &[0, 0, 0, 0]);
        assert_eq!(arr.get_row(1), &[1, 2, 3, 4]);
        assert_eq!(arr[(2, 1)], 3);
        assert_eq!(arr.data[arr.get_index(3, 2)], 9);
        assert_eq!(arr.grid().len(), 12);
    }

    #[test]
    fn array2d_checked_grid_test() {
        let arr = Array2D::from_fill(0u8, 3, 2);
        assert_eq!(arr.checked_grid().unwrap().len(), 6);

        let empty = Array2D::<u8>::from_slice(&[], 0, 3).unwrap();
        assert_eq!(
            empty.checked_grid().unwrap_err(),
            Error::EmptyImage {
                width: 0,
                height: 3
            }
        );

        let mut short = Array2D::from_fill(0u8, 3, 2);
        short.height = 3;
        assert_eq!(
            short.checked_grid().unwrap_err(),
            Error::BufferLength {
                expected: 9,
                actual: 6
            }
        );
    }
}
