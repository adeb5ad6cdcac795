use serde::{Deserialize, Serialize};

/// Neighbor offsets in search order: down, up, right, left.
///
/// `x` is the row and `y` the column, so "down" walks along the row.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 4] = [
    (0, 1),  // Down
    (0, -1), // Up
    (1, 0),  // Right
    (-1, 0), // Left
];

/// A board coordinate. May lie outside the board; bounds are checked by the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to `other`.
    pub fn distance(self, other: Coord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The four orthogonal neighbors in [`NEIGHBOR_OFFSETS`] order, unchecked.
    pub fn neighbors(self) -> impl Iterator<Item = Coord> {
        NEIGHBOR_OFFSETS
            .iter()
            .map(move |&(dx, dy)| Coord::new(self.x + dx, self.y + dy))
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Row-major index of `coord` on a `size × size` grid, or `None` when outside.
pub fn grid_index(coord: Coord, size: u32) -> Option<usize> {
    let size = size as i64;
    let (x, y) = (coord.x as i64, coord.y as i64);
    if x < 0 || y < 0 || x >= size || y >= size {
        return None;
    }
    Some((x * size + y) as usize)
}

/// Inverse of [`grid_index`].
pub fn grid_coord(index: usize, size: u32) -> Coord {
    let size = size as usize;
    Coord::new((index / size) as i32, (index % size) as i32)
}
