use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::LandscapeGenerator;
use crate::error::{NlmError, Result};
use crate::grid::Grid;
use crate::random::RandomStream;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterParams {
    pub cols: usize,
    pub rows: usize,
    pub min_length: usize, // shortest rectangle side, in cells
    pub max_length: usize, // longest rectangle side, in cells
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            cols: 100,
            rows: 100,
            min_length: 2,
            max_length: 8,
        }
    }
}

// Random rectangular cluster landscape.
// Rectangles of random extent and random value are dropped onto a
// `cols × rows` raster (wrapping at the edges) until every cell is covered.
// Unlike the midpoint generator the output keeps the requested shape.
#[derive(Debug, Clone)]
pub struct RandomRectangularCluster {
    params: ClusterParams,
}

impl RandomRectangularCluster {
    pub fn new(params: ClusterParams) -> Result<Self> {
        if params.cols == 0 || params.rows == 0 {
            return Err(NlmError::InvalidDimension {
                rows: params.rows,
                cols: params.cols,
                reason: "rows and cols must be at least 1",
            });
        }
        if params.min_length == 0 {
            return Err(NlmError::invalid_parameter(
                "min_length",
                params.min_length,
                "rectangles need at least one cell per side",
            ));
        }
        if params.min_length > params.max_length {
            return Err(NlmError::invalid_parameter(
                "max_length",
                params.max_length,
                "must not be smaller than min_length",
            ));
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> &ClusterParams {
        &self.params
    }
}

impl LandscapeGenerator for RandomRectangularCluster {
    type Cell = f64;

    fn generate_with(&self, stream: &mut RandomStream) -> Result<Grid<f64>> {
        let ClusterParams {
            cols,
            rows,
            min_length,
            max_length,
        } = self.params;

        let mut grid = Grid::new(cols, rows);
        let mut covered = vec![false; cols * rows];
        let mut uncovered = cols * rows;
        let mut rectangles = 0usize;

        while uncovered > 0 {
            let row_pos = stream.gen_range(0..rows);
            let col_pos = stream.gen_range(0..cols);
            let row_extent = stream.gen_range(min_length..=max_length);
            let col_extent = stream.gen_range(min_length..=max_length);
            let value = stream.uniform01();

            // a side longer than the raster wraps onto cells it already painted
            let row_span = row_extent.min(rows);
            let col_span = col_extent.min(cols);
            for row in (row_pos..row_pos + row_span).map(|r| r % rows) {
                for col in (col_pos..col_pos + col_span).map(|c| c % cols) {
                    grid[(col, row)] = value;
                    let i = row * cols + col;
                    if !covered[i] {
                        covered[i] = true;
                        uncovered -= 1;
                    }
                }
            }
            rectangles += 1;
        }

        debug!(cols, rows, rectangles, "random rectangular cluster");
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::{ClusterParams, RandomRectangularCluster};
    use crate::{LandscapeGenerator, NlmError};

    fn params(cols: usize, rows: usize, min_length: usize, max_length: usize) -> ClusterParams {
        ClusterParams {
            cols,
            rows,
            min_length,
            max_length,
        }
    }

    #[test]
    fn cluster_keeps_requested_shape() {
        let g = RandomRectangularCluster::new(params(30, 20, 2, 5))
            .unwrap()
            .generate_seeded(1)
            .unwrap();
        assert_eq!(g.cols(), 30);
        assert_eq!(g.rows(), 20);
    }

    #[test]
    fn cluster_values_in_unit_interval() {
        let g = RandomRectangularCluster::new(params(25, 25, 1, 4))
            .unwrap()
            .generate_seeded(9)
            .unwrap();
        assert!(g.as_slice().iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn cluster_forms_patches() {
        // with rectangles at least 3 wide, far fewer distinct values than cells
        let g = RandomRectangularCluster::new(params(40, 40, 3, 6))
            .unwrap()
            .generate_seeded(5)
            .unwrap();
        let mut distinct: Vec<u64> = g.as_slice().iter().map(|v| v.to_bits()).collect();
        distinct.sort_unstable();
        distinct.dedup();
        assert!(distinct.len() < g.len() / 4);
    }

    #[test]
    fn cluster_determinism() {
        let cluster = RandomRectangularCluster::new(params(16, 12, 2, 4)).unwrap();
        assert_eq!(cluster.generate_seeded(3).unwrap(), cluster.generate_seeded(3).unwrap());
        assert_ne!(cluster.generate_seeded(3).unwrap(), cluster.generate_seeded(4).unwrap());
    }

    #[test]
    fn cluster_sides_longer_than_raster() {
        // every rectangle wraps over the whole raster; must still finish quickly
        let g = RandomRectangularCluster::new(params(6, 4, 1, 100_000_000))
            .unwrap()
            .generate_seeded(12)
            .unwrap();
        assert!(g.as_slice().iter().all(|v| (0.0..1.0).contains(v)));

        // extents at the top of the integer range must not overflow
        let g = RandomRectangularCluster::new(params(5, 3, usize::MAX, usize::MAX))
            .unwrap()
            .generate_seeded(12)
            .unwrap();
        let first = g[(0, 0)];
        assert!(g.as_slice().iter().all(|&v| v == first));
    }

    #[test]
    fn cluster_rejects_bad_lengths() {
        assert!(matches!(
            RandomRectangularCluster::new(params(10, 10, 0, 3)),
            Err(NlmError::InvalidParameter { name: "min_length", .. })
        ));
        assert!(matches!(
            RandomRectangularCluster::new(params(10, 10, 5, 3)),
            Err(NlmError::InvalidParameter { name: "max_length", .. })
        ));
        assert!(matches!(
            RandomRectangularCluster::new(params(0, 10, 1, 3)),
            Err(NlmError::InvalidDimension { .. })
        ));
    }
}
