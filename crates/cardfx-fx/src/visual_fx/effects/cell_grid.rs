#![forbid(unsafe_code)]

//! Cellular automaton behind the fire border.
//!
//! Cells hold an index into a color ramp: 0 is the hottest color and
//! `ramp_len - 1` is cold. Each step ignites the ring (and the cell under the
//! pointer), then lets every other cell pull heat from a randomly chosen
//! neighbor, biased toward the cell below so flames rise.
//!
//! Neighbor links are plain indices into the row-major cell vector, computed
//! once per rebuild.

use cardfx_core::{Point, Xorshift};

/// Neighbor direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Top,
    Right,
    Bottom,
    Left,
}

impl Direction {
    #[inline]
    const fn slot(self) -> usize {
        match self {
            Self::Top => 0,
            Self::Right => 1,
            Self::Bottom => 2,
            Self::Left => 3,
        }
    }
}

/// Weighted direction table: bottom x10, left x2, right x2, top x1.
pub const SPREAD_FROM: [Direction; 15] = [
    Direction::Bottom,
    Direction::Bottom,
    Direction::Bottom,
    Direction::Bottom,
    Direction::Bottom,
    Direction::Bottom,
    Direction::Bottom,
    Direction::Bottom,
    Direction::Bottom,
    Direction::Bottom,
    Direction::Left,
    Direction::Left,
    Direction::Right,
    Direction::Right,
    Direction::Top,
];

/// Inclusive jitter added when heat is pulled from a hotter neighbor.
const JITTER: (i32, i32) = (-1, 4);

/// Where heat is injected on a step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Ignition {
    /// Device pixels above the card inside the grid. Side columns ignite
    /// from `floor(top_overflow / cell_h)` down, and that row ignites too.
    pub top_overflow: f64,
    /// Pointer position in device pixels.
    pub pointer: Option<Point>,
}

/// Grid of ramp indices with precomputed neighbor links.
#[derive(Debug, Clone)]
pub struct CellGrid {
    cols: usize,
    rows: usize,
    cell_w: f64,
    cell_h: f64,
    ramp_len: usize,
    idx: Vec<usize>,
    links: Vec<[Option<usize>; 4]>,
    /// Cells ignited on the current step.
    lit: Vec<bool>,
}

#[inline]
fn cells_along(extent: f64, cell: f64) -> usize {
    if !(extent.is_finite() && cell.is_finite()) || extent <= 0.0 || cell <= 0.0 {
        return 0;
    }
    (extent / cell).ceil() as usize
}

impl CellGrid {
    /// Grid covering `width x height` with `cell_w x cell_h` cells, all cold.
    ///
    /// Zero or non-finite sizes produce an empty grid.
    #[must_use]
    pub fn new(width: f64, height: f64, cell_w: f64, cell_h: f64, ramp_len: usize) -> Self {
        let cols = cells_along(width, cell_w);
        let rows = cells_along(height, cell_h);
        let (cols, rows) = if cols == 0 || rows == 0 { (0, 0) } else { (cols, rows) };
        let ramp_len = ramp_len.max(1);
        let count = cols * rows;

        let mut links = Vec::with_capacity(count);
        for row in 0..rows {
            for col in 0..cols {
                let at = |c: usize, r: usize| r * cols + c;
                links.push([
                    (row > 0).then(|| at(col, row - 1)),
                    (col + 1 < cols).then(|| at(col + 1, row)),
                    (row + 1 < rows).then(|| at(col, row + 1)),
                    (col > 0).then(|| at(col - 1, row)),
                ]);
            }
        }

        tracing::debug!(cols, rows, cell_w, cell_h, "cell grid rebuilt");
        Self {
            cols,
            rows,
            cell_w,
            cell_h,
            ramp_len,
            idx: vec![ramp_len - 1; count],
            links,
            lit: vec![false; count],
        }
    }

    #[inline]
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    #[must_use]
    pub const fn cell_size(&self) -> (f64, f64) {
        (self.cell_w, self.cell_h)
    }

    #[inline]
    #[must_use]
    pub const fn ramp_len(&self) -> usize {
        self.ramp_len
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.idx.is_empty()
    }

    /// Ramp index at `(col, row)`.
    #[must_use]
    pub fn get(&self, col: usize, row: usize) -> Option<usize> {
        (col < self.cols && row < self.rows).then(|| self.idx[row * self.cols + col])
    }

    /// Row-major ramp indices.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.idx
    }

    /// Linear index of the neighbor of cell `cell` in `dir`.
    #[must_use]
    pub fn neighbor(&self, cell: usize, dir: Direction) -> Option<usize> {
        self.links.get(cell).and_then(|l| l[dir.slot()])
    }

    /// Cell containing device-pixel point `p`.
    #[must_use]
    pub fn cell_at(&self, p: Point) -> Option<(usize, usize)> {
        if self.is_empty() || !p.is_finite() || p.x < 0.0 || p.y < 0.0 {
            return None;
        }
        let col = (p.x / self.cell_w).floor() as usize;
        let row = (p.y / self.cell_h).floor() as usize;
        (col < self.cols && row < self.rows).then_some((col, row))
    }

    /// Top-left corner of cell `(col, row)` in device pixels.
    #[must_use]
    pub fn origin(&self, col: usize, row: usize) -> Point {
        Point::new(col as f64 * self.cell_w, row as f64 * self.cell_h)
    }

    /// Reset every cell to cold.
    pub fn extinguish(&mut self) {
        let cold = self.ramp_len - 1;
        self.idx.iter_mut().for_each(|v| *v = cold);
    }

    fn ignite(&mut self, ignition: &Ignition) {
        self.lit.iter_mut().for_each(|l| *l = false);
        if self.is_empty() {
            return;
        }
        let cols = self.cols;
        let rows = self.rows;
        let start_row = if ignition.top_overflow > 0.0 && ignition.top_overflow.is_finite() {
            (ignition.top_overflow / self.cell_h).floor() as usize
        } else {
            0
        };
        let pointer_cell = ignition.pointer.and_then(|p| self.cell_at(p));

        let mut light = |col: usize, row: usize| {
            let i = row * cols + col;
            self.lit[i] = true;
            self.idx[i] = 0;
        };

        for col in 0..cols {
            light(col, rows - 1);
            if start_row < rows {
                light(col, start_row);
            }
        }
        for row in start_row..rows {
            light(0, row);
            light(cols - 1, row);
        }
        if let Some((col, row)) = pointer_cell {
            light(col, row);
        }
    }

    fn propagate(&mut self, rng: &mut Xorshift) {
        let cold = self.ramp_len - 1;
        for i in 0..self.idx.len() {
            if self.lit[i] {
                continue;
            }
            let dir = SPREAD_FROM[rng.below(SPREAD_FROM.len())];
            let here = self.idx[i];
            let next = match self.links[i][dir.slot()] {
                Some(n) if self.idx[n] < here => {
                    let j = rng.range_i32(JITTER.0, JITTER.1);
                    self.idx[n] as i64 + i64::from(j)
                }
                _ => here as i64 + 1,
            };
            self.idx[i] = next.clamp(0, cold as i64) as usize;
        }
    }

    /// Run one ignition + propagation step.
    pub fn step(&mut self, ignition: &Ignition, rng: &mut Xorshift) {
        self.ignite(ignition);
        self.propagate(rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_round_up() {
        let grid = CellGrid::new(100.0, 100.0, 8.0, 8.0, 24);
        assert_eq!((grid.cols(), grid.rows()), (13, 13));
        assert_eq!(grid.indices().len(), 169);
        assert!(grid.indices().iter().all(|&i| i == 23));
    }

    #[test]
    fn spread_table_weights() {
        let count = |d| SPREAD_FROM.iter().filter(|&&x| x == d).count();
        assert_eq!(count(Direction::Bottom), 10);
        assert_eq!(count(Direction::Left), 2);
        assert_eq!(count(Direction::Right), 2);
        assert_eq!(count(Direction::Top), 1);
    }

    #[test]
    fn neighbor_links() {
        let grid = CellGrid::new(30.0, 20.0, 10.0, 10.0, 4);
        // 3 x 2; cell 0 is top-left.
        assert_eq!(grid.neighbor(0, Direction::Top), None);
        assert_eq!(grid.neighbor(0, Direction::Left), None);
        assert_eq!(grid.neighbor(0, Direction::Right), Some(1));
        assert_eq!(grid.neighbor(0, Direction::Bottom), Some(3));
        assert_eq!(grid.neighbor(5, Direction::Top), Some(2));
        assert_eq!(grid.neighbor(5, Direction::Right), None);
        assert_eq!(grid.neighbor(99, Direction::Top), None);
    }

    #[test]
    fn bottom_row_ignites_after_one_step() {
        let mut grid = CellGrid::new(100.0, 100.0, 8.0, 8.0, 24);
        let mut rng = Xorshift::new(1);
        grid.step(&Ignition::default(), &mut rng);
        for col in 0..grid.cols() {
            assert_eq!(grid.get(col, grid.rows() - 1), Some(0));
        }
    }

    #[test]
    fn side_columns_respect_top_overflow() {
        let mut grid = CellGrid::new(80.0, 80.0, 8.0, 8.0, 24);
        let mut rng = Xorshift::new(2);
        let ignition = Ignition {
            top_overflow: 24.0,
            pointer: None,
        };
        grid.step(&ignition, &mut rng);
        // start_row = 3: rows 3.. are lit on both sides, plus all of row 3.
        for row in 3..grid.rows() {
            assert_eq!(grid.get(0, row), Some(0));
            assert_eq!(grid.get(grid.cols() - 1, row), Some(0));
        }
        for col in 0..grid.cols() {
            assert_eq!(grid.get(col, 3), Some(0));
        }
        // Above the overflow line nothing is hot after a single step from cold.
        assert!(grid.get(0, 0).unwrap_or(0) > 0);
    }

    #[test]
    fn pointer_cell_ignites() {
        let mut grid = CellGrid::new(160.0, 160.0, 8.0, 8.0, 24);
        let mut rng = Xorshift::new(3);
        let ignition = Ignition {
            top_overflow: 0.0,
            pointer: Some(Point::new(83.0, 41.0)),
        };
        grid.step(&ignition, &mut rng);
        assert_eq!(grid.get(10, 5), Some(0));
    }

    #[test]
    fn pointer_outside_grid_is_ignored() {
        let grid = CellGrid::new(16.0, 16.0, 8.0, 8.0, 24);
        assert_eq!(grid.cell_at(Point::new(-1.0, 4.0)), None);
        assert_eq!(grid.cell_at(Point::new(16.0, 4.0)), None);
        assert_eq!(grid.cell_at(Point::new(f64::NAN, 4.0)), None);
        assert_eq!(grid.cell_at(Point::new(15.9, 15.9)), Some((1, 1)));
    }

    #[test]
    fn indices_stay_in_range() {
        let mut grid = CellGrid::new(120.0, 90.0, 8.0, 8.0, 24);
        let mut rng = Xorshift::new(4);
        let ignition = Ignition {
            top_overflow: 16.0,
            pointer: Some(Point::new(60.0, 45.0)),
        };
        for _ in 0..200 {
            grid.step(&ignition, &mut rng);
            assert!(grid.indices().iter().all(|&i| i < 24));
        }
    }

    #[test]
    fn heat_rises_from_bottom() {
        let mut grid = CellGrid::new(64.0, 64.0, 8.0, 8.0, 24);
        let mut rng = Xorshift::new(5);
        for _ in 0..30 {
            grid.step(&Ignition::default(), &mut rng);
        }
        // The row just above the burning bottom row is warmer than cold.
        let row = grid.rows() - 2;
        let warm = (1..grid.cols() - 1).filter(|&c| grid.get(c, row) < Some(23)).count();
        assert!(warm > 0);
    }

    #[test]
    fn empty_sizes() {
        for (w, h) in [(0.0, 10.0), (10.0, 0.0), (f64::NAN, 10.0), (-5.0, 5.0)] {
            let mut grid = CellGrid::new(w, h, 8.0, 8.0, 24);
            assert!(grid.is_empty());
            grid.step(&Ignition::default(), &mut Xorshift::new(1));
        }
        assert!(CellGrid::new(10.0, 10.0, 0.0, 8.0, 24).is_empty());
    }

    #[test]
    fn extinguish_resets() {
        let mut grid = CellGrid::new(32.0, 32.0, 8.0, 8.0, 6);
        grid.step(&Ignition::default(), &mut Xorshift::new(9));
        grid.extinguish();
        assert!(grid.indices().iter().all(|&i| i == 5));
    }
}
