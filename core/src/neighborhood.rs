use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::LandscapeGenerator;
use crate::error::{NlmError, Result};
use crate::grid::Grid;
use crate::random::RandomStream;

// Label of a cell that no category has claimed yet
pub const EMPTY: u32 = 0;

// Cells that count as touching a candidate cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Neighborhood {
    // von Neumann: up, down, left, right
    #[default]
    Four,
    // Moore: the four above plus the diagonals
    Eight,
}

impl TryFrom<u8> for Neighborhood {
    type Error = NlmError;

    fn try_from(size: u8) -> Result<Self> {
        match size {
            4 => Ok(Neighborhood::Four),
            8 => Ok(Neighborhood::Eight),
            other => Err(NlmError::invalid_parameter(
                "neighborhood",
                other,
                "must be 4 or 8",
            )),
        }
    }
}

impl From<Neighborhood> for u8 {
    fn from(n: Neighborhood) -> u8 {
        match n {
            Neighborhood::Four => 4,
            Neighborhood::Eight => 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeighborhoodParams {
    pub rows: usize,
    pub cols: usize,
    // Pre-labelled cells; `None` starts from an empty raster
    pub initial: Option<Grid<u32>>,
    pub category_count: usize,
    // Entry i is the number of cells to give label i + 1
    pub cells_per_category: Vec<usize>,
    pub neighborhood: Neighborhood,
    pub p_neighbor: f64, // acceptance probability next to a labelled cell
    pub p_empty: f64,    // acceptance probability anywhere else
}

impl Default for NeighborhoodParams {
    fn default() -> Self {
        Self {
            rows: 50,
            cols: 50,
            initial: None,
            category_count: 3,
            cells_per_category: vec![500, 500, 500],
            neighborhood: Neighborhood::Four,
            p_neighbor: 0.6,
            p_empty: 0.2,
        }
    }
}

// Probabilistic neighbourhood growth.
//
// Empty cells are visited in random order and claimed for the current
// category with a higher probability when they already touch a labelled
// cell, which grows clumped patches. Categories are filled from the highest
// label down; pre-labelled cells are never overwritten. The raster wraps at
// its edges when looking for neighbours.
#[derive(Debug, Clone)]
pub struct NeighborhoodGrowth {
    initial: Grid<u32>,
    cells_per_category: Vec<usize>,
    neighborhood: Neighborhood,
    p_neighbor: f64,
    p_empty: f64,
}

impl NeighborhoodGrowth {
    pub fn new(params: NeighborhoodParams) -> Result<Self> {
        let NeighborhoodParams {
            rows,
            cols,
            initial,
            category_count,
            cells_per_category,
            neighborhood,
            p_neighbor,
            p_empty,
        } = params;

        if rows == 0 || cols == 0 {
            return Err(NlmError::InvalidDimension {
                rows,
                cols,
                reason: "rows and cols must be at least 1",
            });
        }
        let initial = match initial {
            Some(grid) if grid.cols() != cols || grid.rows() != rows => {
                return Err(NlmError::InvalidDimension {
                    rows: grid.rows(),
                    cols: grid.cols(),
                    reason: "initial grid does not match rows x cols",
                });
            }
            Some(grid) => grid,
            None => Grid::new(cols, rows),
        };
        if category_count == 0 {
            return Err(NlmError::invalid_parameter(
                "category_count",
                category_count,
                "need at least one category",
            ));
        }
        // labels 1..=category_count must fit the u32 cells
        if u32::try_from(category_count).is_err() {
            return Err(NlmError::invalid_parameter(
                "category_count",
                category_count,
                "labels must fit in u32",
            ));
        }
        if cells_per_category.len() != category_count {
            return Err(NlmError::ConfigMismatch {
                name: "cells_per_category",
                got: cells_per_category.len(),
                expected: category_count.to_string(),
            });
        }
        for (name, p) in [("p_neighbor", p_neighbor), ("p_empty", p_empty)] {
            if !(p > 0.0 && p <= 1.0) {
                return Err(NlmError::invalid_parameter(name, p, "must lie in (0, 1]"));
            }
        }
        let requested: usize = cells_per_category.iter().sum();
        let empty = initial.as_slice().iter().filter(|&&v| v == EMPTY).count();
        if requested > empty {
            return Err(NlmError::invalid_parameter(
                "cells_per_category",
                requested,
                "more cells requested than the grid has empty cells",
            ));
        }

        Ok(Self {
            initial,
            cells_per_category,
            neighborhood,
            p_neighbor,
            p_empty,
        })
    }

    // True when a wrapped neighbour of (col, row) already carries a label
    fn touches_label(&self, grid: &Grid<u32>, col: usize, row: usize) -> bool {
        let (cols, rows) = (grid.cols(), grid.rows());
        let up = (row + rows - 1) % rows;
        let down = (row + 1) % rows;
        let left = (col + cols - 1) % cols;
        let right = (col + 1) % cols;

        let labelled = |c: usize, r: usize| grid[(c, r)] != EMPTY;
        let orthogonal =
            labelled(col, up) || labelled(left, row) || labelled(right, row) || labelled(col, down);
        if orthogonal {
            return true;
        }
        self.neighborhood == Neighborhood::Eight
            && (labelled(left, up) || labelled(right, up) || labelled(left, down) || labelled(right, down))
    }
}

impl LandscapeGenerator for NeighborhoodGrowth {
    type Cell = u32;

    fn generate_with(&self, stream: &mut RandomStream) -> Result<Grid<u32>> {
        let mut grid = self.initial.clone();
        let mut candidates: Vec<(usize, usize)> = (0..grid.cols())
            .flat_map(|col| (0..grid.rows()).map(move |row| (col, row)))
            .filter(|&(col, row)| grid[(col, row)] == EMPTY)
            .collect();
        stream.shuffle(&mut candidates);

        let mut attempts = 0u64;
        for (i, &wanted) in self.cells_per_category.iter().enumerate().rev() {
            let label = u32::try_from(i + 1).map_err(|_| {
                NlmError::invalid_parameter("category_count", i + 1, "labels must fit in u32")
            })?;
            let mut remaining = wanted;

            while remaining > 0 {
                let Some(&(col, row)) = candidates.last() else {
                    break;
                };
                let p = if self.touches_label(&grid, col, row) {
                    self.p_neighbor
                } else {
                    self.p_empty
                };
                attempts += 1;

                if stream.uniform01() < p {
                    grid[(col, row)] = label;
                    candidates.pop();
                    remaining -= 1;
                } else {
                    let back = candidates.len() - 1;
                    if back > 0 {
                        let j = stream.gen_range(0..back);
                        candidates.swap(j, back);
                    }
                }
            }
        }

        debug!(attempts, "neighbourhood growth finished");
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(rows: usize, cols: usize, cells: Vec<usize>) -> NeighborhoodParams {
        NeighborhoodParams {
            rows,
            cols,
            initial: None,
            category_count: cells.len(),
            cells_per_category: cells,
            neighborhood: Neighborhood::Four,
            p_neighbor: 0.7,
            p_empty: 0.1,
        }
    }

    fn count(grid: &Grid<u32>, label: u32) -> usize {
        grid.as_slice().iter().filter(|&&v| v == label).count()
    }

    #[test]
    fn neigh_assigns_requested_counts() {
        let g = NeighborhoodGrowth::new(params(20, 30, vec![100, 150, 50]))
            .unwrap()
            .generate_seeded(8)
            .unwrap();
        assert_eq!((g.cols(), g.rows()), (30, 20));
        assert_eq!(count(&g, 1), 100);
        assert_eq!(count(&g, 2), 150);
        assert_eq!(count(&g, 3), 50);
        assert_eq!(count(&g, EMPTY), 600 - 300);
    }

    #[test]
    fn neigh_fills_whole_grid() {
        let mut p = params(10, 10, vec![40, 60]);
        p.neighborhood = Neighborhood::Eight;
        let g = NeighborhoodGrowth::new(p).unwrap().generate_seeded(2).unwrap();
        assert_eq!(count(&g, EMPTY), 0);
        assert_eq!(count(&g, 1), 40);
    }

    #[test]
    fn neigh_keeps_prelabelled_cells() {
        let mut initial = Grid::new(8, 8);
        initial.set(3, 3, 9).unwrap();
        initial.set(0, 7, 9).unwrap();
        let mut p = params(8, 8, vec![62]);
        p.initial = Some(initial);
        let g = NeighborhoodGrowth::new(p).unwrap().generate_seeded(4).unwrap();
        assert_eq!(g.get(3, 3), Ok(9));
        assert_eq!(g.get(0, 7), Ok(9));
        assert_eq!(count(&g, 1), 62);
    }

    #[test]
    fn neigh_determinism() {
        let growth = NeighborhoodGrowth::new(params(15, 15, vec![40, 40])).unwrap();
        assert_eq!(growth.generate_seeded(6).unwrap(), growth.generate_seeded(6).unwrap());
    }

    #[test]
    fn neigh_adjacency_wraps() {
        let growth = NeighborhoodGrowth::new(params(4, 4, vec![1])).unwrap();
        let mut g = Grid::new(4, 4);
        g[(3, 0)] = 1;
        // (0, 0) touches (3, 0) through the left edge
        assert!(growth.touches_label(&g, 0, 0));
        // (0, 1) only touches it diagonally
        assert!(!growth.touches_label(&g, 0, 1));

        let mut p = params(4, 4, vec![1]);
        p.neighborhood = Neighborhood::Eight;
        let moore = NeighborhoodGrowth::new(p).unwrap();
        assert!(moore.touches_label(&g, 0, 1));
    }

    #[test]
    fn neigh_rejects_bad_config() {
        let mut p = params(5, 5, vec![3, 3]);
        p.category_count = 3;
        assert!(matches!(
            NeighborhoodGrowth::new(p),
            Err(NlmError::ConfigMismatch { name: "cells_per_category", got: 2, .. })
        ));

        let mut p = params(5, 5, vec![3]);
        p.p_empty = 0.0;
        assert!(matches!(
            NeighborhoodGrowth::new(p),
            Err(NlmError::InvalidParameter { name: "p_empty", .. })
        ));

        assert!(matches!(
            NeighborhoodGrowth::new(params(5, 5, vec![20, 6])),
            Err(NlmError::InvalidParameter { name: "cells_per_category", .. })
        ));

        let mut p = params(5, 5, vec![3]);
        p.initial = Some(Grid::new(4, 5));
        assert!(matches!(
            NeighborhoodGrowth::new(p),
            Err(NlmError::InvalidDimension { .. })
        ));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn neigh_rejects_labels_beyond_u32() {
        let mut p = params(5, 5, vec![1]);
        p.category_count = u32::MAX as usize + 1;
        assert!(matches!(
            NeighborhoodGrowth::new(p),
            Err(NlmError::InvalidParameter { name: "category_count", .. })
        ));
    }

    #[test]
    fn neighborhood_size_from_number() {
        assert_eq!(Neighborhood::try_from(4u8), Ok(Neighborhood::Four));
        assert_eq!(Neighborhood::try_from(8u8), Ok(Neighborhood::Eight));
        assert!(Neighborhood::try_from(6u8).is_err());
        let n: Neighborhood = serde_json::from_str("8").unwrap();
        assert_eq!(n, Neighborhood::Eight);
        assert!(serde_json::from_str::<Neighborhood>("5").is_err());
    }
}
