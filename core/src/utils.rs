use crate::error::{NlmError, Result};
use crate::grid::Grid;

// Stretch a continuous landscape linearly onto [0, 1]
// A flat grid (max == min) becomes all zeros; NaN cells are left as they are.
pub fn rescale(grid: &mut Grid<f64>) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for &val in grid.as_slice() {
        if val.is_nan() {
            continue;
        }
        min = min.min(val);
        max = max.max(val);
    }
    if min > max {
        return; // empty or all NaN
    }

    let range = max - min;
    for val in grid.cells_mut() {
        if range > 0.0 {
            *val = (*val - min) / range;
        } else if !val.is_nan() {
            *val = 0.0;
        }
    }
}

// Top-left `cols × rows` window of a grid
pub fn crop<T: Copy>(grid: &Grid<T>, cols: usize, rows: usize) -> Result<Grid<T>> {
    if cols == 0 || rows == 0 || cols > grid.cols() || rows > grid.rows() {
        return Err(NlmError::InvalidDimension {
            rows,
            cols,
            reason: "crop window must be non-empty and fit inside the grid",
        });
    }
    let data = grid
        .row_slices()
        .take(rows)
        .flat_map(|row| row[..cols].iter().copied())
        .collect();
    Grid::from_vec(cols, rows, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescale_spans_unit_interval() {
        let mut g = Grid::from_vec(2, 2, vec![-3.0, 1.0, 5.0, 0.0]).unwrap();
        rescale(&mut g);
        assert_eq!(g.as_slice(), &[0.0, 0.5, 1.0, 0.375]);
    }

    #[test]
    fn rescale_flat_grid_is_zero() {
        let mut g = Grid::filled(3, 3, 4.2);
        rescale(&mut g);
        assert!(g.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn rescale_skips_nan() {
        let mut g = Grid::from_vec(3, 1, vec![2.0, f64::NAN, 4.0]).unwrap();
        rescale(&mut g);
        assert_eq!(g[(0, 0)], 0.0);
        assert!(g[(1, 0)].is_nan());
        assert_eq!(g[(2, 0)], 1.0);
    }

    #[test]
    fn crop_takes_top_left_window() {
        let g = Grid::from_vec(3, 3, (0u32..9).collect()).unwrap();
        let c = crop(&g, 2, 2).unwrap();
        assert_eq!((c.cols(), c.rows()), (2, 2));
        assert_eq!(c.as_slice(), &[0, 1, 3, 4]);

        let wide = crop(&g, 3, 1).unwrap();
        assert_eq!(wide.as_slice(), &[0, 1, 2]);
    }

    #[test]
    fn crop_rejects_oversized_window() {
        let g: Grid<f64> = Grid::square(3);
        assert!(matches!(crop(&g, 4, 1), Err(NlmError::InvalidDimension { .. })));
        assert!(matches!(crop(&g, 0, 1), Err(NlmError::InvalidDimension { .. })));
    }
}
