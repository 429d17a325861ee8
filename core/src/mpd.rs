use rand_distr::Normal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::LandscapeGenerator;
use crate::error::{NlmError, Result};
use crate::grid::Grid;
use crate::random::{RandomStream, gaussian};
use crate::roughness::{RoughnessSchedule, side_lengths, step_count};

// How the square step treats neighbours that fall off the raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryPolicy {
    // Missing neighbours are replaced by the point's own value
    #[default]
    Clamp,
    // Indices wrap modulo the raster size (torus)
    Wrap,
}

impl BoundaryPolicy {
    pub fn from_torus(torus: bool) -> Self {
        if torus {
            BoundaryPolicy::Wrap
        } else {
            BoundaryPolicy::Clamp
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MpdParams {
    pub rows: usize,
    pub cols: usize,
    pub rand_dev: f64, // standard deviation of the coarsest level
    pub roughness: Vec<f64>, // one persistence factor, or one multiplier per level
    pub torus: bool,
}

impl Default for MpdParams {
    fn default() -> Self {
        Self {
            rows: 129,
            cols: 129,
            rand_dev: 1.0,
            roughness: vec![0.5],
            torus: false,
        }
    }
}

// Side of the square raster: the smallest odd number >= max(rows, cols)
pub fn raster_size(rows: usize, cols: usize) -> Result<usize> {
    if rows == 0 || cols == 0 {
        return Err(NlmError::InvalidDimension {
            rows,
            cols,
            reason: "rows and cols must be at least 1",
        });
    }
    let size = rows.max(cols) | 1;
    if size < 3 {
        return Err(NlmError::InvalidDimension {
            rows,
            cols,
            reason: "raster must be at least 3x3 to refine",
        });
    }
    Ok(size)
}

// Midpoint displacement (diamond-square) generator.
//
// Construction validates everything and fixes the raster size and both
// per-level schedules; `generate_with` then only seeds and refines.
// The result is always `size × size`, even when rows != cols.
#[derive(Debug, Clone)]
pub struct MidpointDisplacement {
    size: usize,
    policy: BoundaryPolicy,
    side_lengths: Vec<usize>,
    schedule: RoughnessSchedule,
    noise: Vec<Normal<f64>>, // zero-mean displacement per level
}

impl MidpointDisplacement {
    pub fn new(params: &MpdParams) -> Result<Self> {
        let size = raster_size(params.rows, params.cols)?;
        let steps = step_count(size);
        let schedule = RoughnessSchedule::new(params.rand_dev, &params.roughness, steps)?;
        let noise = schedule
            .amplitudes()
            .iter()
            .map(|&amplitude| gaussian(0.0, amplitude))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            size,
            policy: BoundaryPolicy::from_torus(params.torus),
            side_lengths: side_lengths(steps),
            schedule,
            noise,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn steps(&self) -> usize {
        self.side_lengths.len()
    }

    pub fn side_lengths(&self) -> &[usize] {
        &self.side_lengths
    }

    pub fn schedule(&self) -> &RoughnessSchedule {
        &self.schedule
    }

    pub fn policy(&self) -> BoundaryPolicy {
        self.policy
    }

    // Seed the corners and refine level by level, coarsest first
    pub fn run(&self, stream: &mut RandomStream) -> Grid<f64> {
        let mut grid = Grid::square(self.size);
        seed_corners(&mut grid, stream);

        let levels = self.side_lengths.iter().zip(&self.noise);
        for (level, (&side, noise)) in levels.enumerate() {
            debug!(level, side, amplitude = noise.std_dev(), "midpoint displacement level");
            diamond_step(&mut grid, side, noise, stream);
            square_step(&mut grid, side, noise, self.policy, stream);
        }
        grid
    }
}

impl LandscapeGenerator for MidpointDisplacement {
    type Cell = f64;

    fn generate_with(&self, stream: &mut RandomStream) -> Result<Grid<f64>> {
        Ok(self.run(stream))
    }
}

// One-shot entry point: validate, seed a fresh stream, generate
pub fn generate(
    rows: usize,
    cols: usize,
    rand_dev: f64,
    roughness: &[f64],
    seed: u64,
    torus: bool,
) -> Result<Grid<f64>> {
    let params = MpdParams {
        rows,
        cols,
        rand_dev,
        roughness: roughness.to_vec(),
        torus,
    };
    MidpointDisplacement::new(&params)?.generate_seeded(seed)
}

// The four true corners take the first four uniform draws, in this order
fn seed_corners(grid: &mut Grid<f64>, stream: &mut RandomStream) {
    let last = grid.cols() - 1;
    for (col, row) in [(0, 0), (0, last), (last, 0), (last, last)] {
        grid[(col, row)] = stream.uniform01();
    }
}

// `idx + delta` when it stays inside [0, size)
#[inline]
fn shifted(idx: usize, delta: isize, size: usize) -> Option<usize> {
    idx.checked_add_signed(delta).filter(|&i| i < size)
}

// Centre of every `side × side` square: mean of its diagonal corners plus noise
fn diamond_step(grid: &mut Grid<f64>, side: usize, noise: &Normal<f64>, stream: &mut RandomStream) {
    debug_assert!(side >= 2 && side % 2 == 0);
    let half = side / 2;
    let size = grid.cols();

    for col in (half..size).step_by(side) {
        for row in (half..size).step_by(side) {
            grid[(col, row)] = diamond(grid, col, row, half) + stream.sample(noise);
        }
    }
}

fn diamond(grid: &Grid<f64>, col: usize, row: usize, half: usize) -> f64 {
    let size = grid.cols();
    let own = grid[(col, row)];
    let h = half as isize;
    let corner = |dc: isize, dr: isize| match (shifted(col, dc, size), shifted(row, dr, size)) {
        (Some(c), Some(r)) => grid[(c, r)],
        _ => own,
    };
    0.25 * (corner(-h, -h) + corner(-h, h) + corner(h, -h) + corner(h, h))
}

// Edge midpoints on the checkerboard between diamond centres
fn square_step(
    grid: &mut Grid<f64>,
    side: usize,
    noise: &Normal<f64>,
    policy: BoundaryPolicy,
    stream: &mut RandomStream,
) {
    let half = side / 2;
    let size = grid.cols();

    for (pass, col) in (0..size).step_by(half).enumerate() {
        let row_start = if pass % 2 == 0 { half } else { 0 };
        for row in (row_start..size).step_by(side) {
            grid[(col, row)] = square(grid, col, row, half, policy) + stream.sample(noise);
        }
    }
}

fn square(grid: &Grid<f64>, col: usize, row: usize, half: usize, policy: BoundaryPolicy) -> f64 {
    let size = grid.cols();
    let own = grid[(col, row)];
    let h = half as isize;
    let neighbour = |dc: isize, dr: isize| match policy {
        BoundaryPolicy::Clamp => match (shifted(col, dc, size), shifted(row, dr, size)) {
            (Some(c), Some(r)) => grid[(c, r)],
            _ => own,
        },
        BoundaryPolicy::Wrap => {
            let c = (col as isize + dc).rem_euclid(size as isize) as usize;
            let r = (row as isize + dr).rem_euclid(size as isize) as usize;
            grid[(c, r)]
        }
    };
    0.25 * (neighbour(-h, 0) + neighbour(0, h) + neighbour(h, 0) + neighbour(0, -h))
}
