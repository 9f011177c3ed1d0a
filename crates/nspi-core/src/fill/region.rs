use std::collections::BTreeMap;

use crate::raster::CloudMask;

/// Inclusive neighborhood bounds in global image coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub up_row: usize,
    pub down_row: usize,
    pub left_col: usize,
    pub right_col: usize,
}

impl Window {
    /// Expand a bounding box `(min_row, max_row, min_col, max_col)` by
    /// `margin` on every side, clamped to a `rows` x `cols` image.
    pub fn around(
        bbox: (usize, usize, usize, usize),
        margin: usize,
        rows: usize,
        cols: usize,
    ) -> Self {
        let (min_row, max_row, min_col, max_col) = bbox;
        Self {
            up_row: min_row.saturating_sub(margin),
            down_row: max_row.saturating_add(margin).min(rows.saturating_sub(1)),
            left_col: min_col.saturating_sub(margin),
            right_col: max_col.saturating_add(margin).min(cols.saturating_sub(1)),
        }
    }

    pub fn rows(&self) -> usize {
        self.down_row - self.up_row + 1
    }

    pub fn cols(&self) -> usize {
        self.right_col - self.left_col + 1
    }

    /// Window-local reference point `(rows / 2, cols / 2)`.
    pub fn center(&self) -> (f64, f64) {
        (self.rows() as f64 / 2.0, self.cols() as f64 / 2.0)
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.up_row..=self.down_row).contains(&row)
            && (self.left_col..=self.right_col).contains(&col)
    }

    /// Global to window-local coordinates. The cell must lie in the window.
    pub fn to_local(&self, row: usize, col: usize) -> (usize, usize) {
        debug_assert!(self.contains(row, col));
        (row - self.up_row, col - self.left_col)
    }

    pub fn to_global(&self, local_row: usize, local_col: usize) -> (usize, usize) {
        (local_row + self.up_row, local_col + self.left_col)
    }

    /// Global coordinates of every window cell, column by column.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (self.left_col..=self.right_col)
            .flat_map(move |col| (self.up_row..=self.down_row).map(move |row| (row, col)))
    }
}

/// One cloud region and its neighborhood.
#[derive(Clone, Debug)]
pub struct Region {
    /// Mask code shared by every cell of the region.
    pub code: i32,
    /// Global (row, col) of each region cell, column by column.
    pub cells: Vec<(usize, usize)>,
    /// Tight bounding box: (min_row, max_row, min_col, max_col).
    pub bbox: (usize, usize, usize, usize),
    /// Bounding box expanded by the neighborhood margin.
    pub window: Window,
}

/// Find every cloud region in the mask, ordered by ascending code.
pub fn locate_regions(mask: &CloudMask, cloud_nbh: usize) -> Vec<Region> {
    let (rows, cols) = mask.dims();
    let mut cells_by_code = BTreeMap::<i32, Vec<(usize, usize)>>::new();

    for col in 0..cols {
        for row in 0..rows {
            let code = mask.data[[row, col]];
            if code >= 1 {
                cells_by_code.entry(code).or_default().push((row, col));
            }
        }
    }

    cells_by_code
        .into_iter()
        .filter_map(|(code, cells)| build_region(code, cells, cloud_nbh, rows, cols))
        .collect()
}

/// Locate a single region by code. Returns `None` if no cell carries it.
pub fn locate_region(mask: &CloudMask, code: i32, cloud_nbh: usize) -> Option<Region> {
    let (rows, cols) = mask.dims();
    let mut cells = Vec::new();
    for col in 0..cols {
        for row in 0..rows {
            if mask.data[[row, col]] == code {
                cells.push((row, col));
            }
        }
    }
    build_region(code, cells, cloud_nbh, rows, cols)
}

fn build_region(
    code: i32,
    cells: Vec<(usize, usize)>,
    cloud_nbh: usize,
    rows: usize,
    cols: usize,
) -> Option<Region> {
    let &(first_row, first_col) = cells.first()?;
    let mut bbox = (first_row, first_row, first_col, first_col);
    for &(row, col) in &cells[1..] {
        bbox.0 = bbox.0.min(row);
        bbox.1 = bbox.1.max(row);
        bbox.2 = bbox.2.min(col);
        bbox.3 = bbox.3.max(col);
    }

    Some(Region {
        code,
        cells,
        bbox,
        window: Window::around(bbox, cloud_nbh, rows, cols),
    })
}
