/// One of the 8 compass neighbors of a pixel.
///
/// The discriminant is the slot of the direction in an affinity cell. The order is a
/// row-major scan of the 3x3 window without its centre, and the automaton evaluates
/// attackers in exactly this order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Direction {
    NorthWest = 0,
    North = 1,
    NorthEast = 2,
    West = 3,
    East = 4,
    SouthWest = 5,
    South = 6,
    SouthEast = 7,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::NorthWest,
        Direction::North,
        Direction::NorthEast,
        Direction::West,
        Direction::East,
        Direction::SouthWest,
        Direction::South,
        Direction::SouthEast,
    ];

    /// `(dx, dy)` with y growing downwards.
    #[inline(always)]
    pub const fn offset(self) -> (isize, isize) {
        match self {
            Direction::NorthWest => (-1, -1),
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::West => (-1, 0),
            Direction::East => (1, 0),
            Direction::SouthWest => (-1, 1),
            Direction::South => (0, 1),
            Direction::SouthEast => (1, 1),
        }
    }

    #[inline(always)]
    pub const fn slot(self) -> usize {
        self as usize
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::NorthWest => Direction::SouthEast,
            Direction::North => Direction::South,
            Direction::NorthEast => Direction::SouthWest,
            Direction::West => Direction::East,
            Direction::East => Direction::West,
            Direction::SouthWest => Direction::NorthEast,
            Direction::South => Direction::North,
            Direction::SouthEast => Direction::NorthWest,
        }
    }
}

/// Geometry of a `width` x `height` raster. Owns no pixel data.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
}

impl Grid {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.width * self.height
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline(always)]
    pub const fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    #[inline(always)]
    pub fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(
            self.contains(x, y),
            "Index ({x}, {y}) is out of bounds ({}, {})",
            self.width,
            self.height
        );
        self.width * y + x
    }

    pub fn checked_index(&self, x: usize, y: usize) -> Option<usize> {
        self.contains(x, y).then(|| self.width * y + x)
    }

    /// Coordinates of the neighbor of `(x, y)` in `direction`, `None` when it falls
    /// outside of the grid.
    #[inline(always)]
    pub fn neighbor(&self, x: usize, y: usize, direction: Direction) -> Option<(usize, usize)> {
        let (dx, dy) = direction.offset();
        let nx = x.checked_add_signed(dx)?;
        let ny = y.checked_add_signed(dy)?;
        self.contains(nx, ny).then_some((nx, ny))
    }

    /// True when all 8 neighbors of `(x, y)` exist.
    #[inline(always)]
    pub fn is_interior(&self, x: usize, y: usize) -> bool {
        x > 0 && y > 0 && x + 1 < self.width && y + 1 < self.height
    }

    /// Flat index offsets of the 8 neighbors, valid only for interior pixels.
    pub fn neighbor_index_offsets(&self) -> [isize; 8] {
        Direction::ALL.map(|d| {
            let (dx, dy) = d.offset();
            dx + dy * self.width as isize
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Direction, Grid};

    #[test]
    fn index_is_row_major_test() {
        let grid = Grid::new(5, 3);
        assert_eq!(grid.index(0, 0), 0);
        assert_eq!(grid.index(4, 0), 4);
        assert_eq!(grid.index(0, 1), 5);
        assert_eq!(grid.index(4, 2), 14);
    }

    #[test]
    fn checked_index_rejects_out_of_bounds_test() {
        let grid = Grid::new(5, 3);
        assert_eq!(grid.checked_index(5, 0), None);
        assert_eq!(grid.checked_index(0, 3), None);
        assert_eq!(grid.checked_index(4, 2), Some(14));
    }

    #[test]
    fn corner_has_three_neighbors_test() {
        let grid = Grid::new(4, 4);
        let existing: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|d| grid.neighbor(0, 0, *d).is_some())
            .collect();
        assert_eq!(
            existing,
            vec![Direction::East, Direction::South, Direction::SouthEast]
        );
        assert_eq!(grid.neighbor(3, 3, Direction::NorthWest), Some((2, 2)));
        assert_eq!(grid.neighbor(3, 3, Direction::East), None);
    }

    #[test]
    fn single_pixel_has_no_neighbors_test() {
        let grid = Grid::new(1, 1);
        assert!(Direction::ALL
            .into_iter()
            .all(|d| grid.neighbor(0, 0, d).is_none()));
        assert!(!grid.is_interior(0, 0));
    }

    #[test]
    fn strip_has_only_horizontal_neighbors_test() {
        let grid = Grid::new(6, 1);
        for x in 0..6 {
            for d in Direction::ALL {
                let exists = grid.neighbor(x, 0, d).is_some();
                let expected = match d {
                    Direction::West => x > 0,
                    Direction::East => x < 5,
                    _ => false,
                };
                assert_eq!(exists, expected, "x={x} {d:?}");
            }
        }
    }

    #[test]
    fn offsets_match_neighbor_lookup_test() {
        let grid = Grid::new(7, 5);
        let offsets = grid.neighbor_index_offsets();
        let (x, y) = (3, 2);
        let index = grid.index(x, y);
        for d in Direction::ALL {
            let (nx, ny) = grid.neighbor(x, y, d).unwrap();
            assert_eq!(
                index.wrapping_add_signed(offsets[d.slot()]),
                grid.index(nx, ny)
            );
            assert_eq!(grid.neighbor(nx, ny, d.opposite()), Some((x, y)));
        }
    }
}
