use ndarray::Array2;

use crate::consts::{MASK_CLEAR, MASK_INVALID};
use crate::error::{NspiError, Result};
use crate::raster::CloudMask;

/// Turn a binary cloud raster into a region-coded [`CloudMask`].
///
/// Cloud cells are grouped into 4-connected components with two-pass
/// union-find labeling. Components are numbered 1, 2, ... in raster-scan
/// order of their first cell. Cells flagged in `invalid` become `-1`,
/// overriding any cloud flag, and split the components they cross.
pub fn label_regions(cloud: &Array2<bool>, invalid: Option<&Array2<bool>>) -> Result<CloudMask> {
    let (h, w) = cloud.dim();
    if let Some(inv) = invalid {
        if inv.dim() != (h, w) {
            return Err(NspiError::ShapeMismatch(format!(
                "invalid raster is {}x{} but cloud raster is {}x{}",
                inv.nrows(),
                inv.ncols(),
                h,
                w
            )));
        }
    }

    let is_invalid = |row: usize, col: usize| invalid.is_some_and(|inv| inv[[row, col]]);
    let is_cloud = |row: usize, col: usize| cloud[[row, col]] && !is_invalid(row, col);

    let mut labels = Array2::<u32>::zeros((h, w));
    let mut next_label: u32 = 1;
    // Index 0 unused; provisional labels start at 1.
    let mut parent: Vec<u32> = vec![0];

    // Pass 1: provisional labels from the upper and left neighbors.
    for row in 0..h {
        for col in 0..w {
            if !is_cloud(row, col) {
                continue;
            }

            let up = if row > 0 { labels[[row - 1, col]] } else { 0 };
            let left = if col > 0 { labels[[row, col - 1]] } else { 0 };

            labels[[row, col]] = match (up > 0, left > 0) {
                (false, false) => {
                    parent.push(next_label);
                    next_label += 1;
                    next_label - 1
                }
                (true, false) => up,
                (false, true) => left,
                (true, true) => {
                    if up != left {
                        union(&mut parent, up, left);
                    }
                    up.min(left)
                }
            };
        }
    }

    // Pass 2: resolve roots and renumber densely in scan order.
    let mut code_of_root = vec![0i32; next_label as usize];
    let mut next_code = 1i32;
    let mut codes = Array2::<i32>::from_elem((h, w), MASK_CLEAR);

    for row in 0..h {
        for col in 0..w {
            if is_invalid(row, col) {
                codes[[row, col]] = MASK_INVALID;
                continue;
            }
            let lbl = labels[[row, col]];
            if lbl == 0 {
                continue;
            }
            let root = find(&parent, lbl) as usize;
            if code_of_root[root] == 0 {
                code_of_root[root] = next_code;
                next_code += 1;
            }
            codes[[row, col]] = code_of_root[root];
        }
    }

    Ok(CloudMask::new(codes))
}

fn find(parent: &[u32], mut x: u32) -> u32 {
    while parent[x as usize] != x {
        x = parent[x as usize];
    }
    x
}

fn union(parent: &mut [u32], a: u32, b: u32) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        let (small, big) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[big as usize] = small;
    }
}
