use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::LandscapeGenerator;
use crate::error::{NlmError, Result};
use crate::grid::Grid;
use crate::random::RandomStream;

// Hurst exponent, either shared by every cell or given per cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Hurst {
    Uniform(f64),
    PerCell(Grid<f64>),
}

impl Default for Hurst {
    fn default() -> Self {
        Hurst::Uniform(0.5)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FbmParams {
    pub x: Vec<f64>, // column coordinates
    pub y: Vec<f64>, // row coordinates
    pub hurst: Hurst,
    pub terms: usize, // spectral terms to accumulate
}

impl Default for FbmParams {
    fn default() -> Self {
        let axis: Vec<f64> = (0..64).map(|i| i as f64 / 64.0).collect();
        Self {
            x: axis.clone(),
            y: axis,
            hurst: Hurst::default(),
            terms: 500,
        }
    }
}

// Fractional Brownian surface built as a sum of random-phase waves.
//
// Each term draws a direction, a phase and the next arrival of a unit-rate
// Poisson process R; its wave is damped by R^((1+H)/2), so rougher
// (low-H) cells keep more high-frequency energy. Output is `x.len()`
// columns by `y.len()` rows.
#[derive(Debug, Clone)]
pub struct FractionalBrownianSurface {
    x: Vec<f64>,
    y: Vec<f64>,
    hurst: Grid<f64>,
    terms: usize,
}

impl FractionalBrownianSurface {
    pub fn new(params: FbmParams) -> Result<Self> {
        let FbmParams { x, y, hurst, terms } = params;
        if x.is_empty() || y.is_empty() {
            return Err(NlmError::InvalidDimension {
                rows: y.len(),
                cols: x.len(),
                reason: "need at least one x and one y coordinate",
            });
        }
        if let Some(bad) = x.iter().chain(&y).find(|v| !v.is_finite()) {
            return Err(NlmError::invalid_parameter("coordinates", bad, "must be finite"));
        }
        if terms == 0 {
            return Err(NlmError::invalid_parameter("terms", terms, "need at least one term"));
        }

        let hurst = match hurst {
            Hurst::Uniform(h) => Grid::filled(x.len(), y.len(), h),
            Hurst::PerCell(grid) if grid.cols() != x.len() || grid.rows() != y.len() => {
                return Err(NlmError::InvalidDimension {
                    rows: grid.rows(),
                    cols: grid.cols(),
                    reason: "hurst grid must be x.len() columns by y.len() rows",
                });
            }
            Hurst::PerCell(grid) => grid,
        };
        if let Some(bad) = hurst.as_slice().iter().find(|h| !(**h > 0.0 && **h < 1.0)) {
            return Err(NlmError::invalid_parameter("hurst", bad, "must lie in (0, 1)"));
        }

        Ok(Self { x, y, hurst, terms })
    }
}

impl LandscapeGenerator for FractionalBrownianSurface {
    type Cell = f64;

    fn generate_with(&self, stream: &mut RandomStream) -> Result<Grid<f64>> {
        let mut surface: Grid<f64> = Grid::new(self.x.len(), self.y.len());
        let mut arrival = 0.0_f64;

        for _ in 0..self.terms {
            let direction = TAU * stream.uniform01();
            let phase = TAU * stream.uniform01();
            arrival -= (1.0 - stream.uniform01()).ln();

            let radius = (arrival / PI).sqrt();
            let (sin_dir, cos_dir) = direction.sin_cos();
            let (sin_phase, cos_phase) = phase.sin_cos();

            for (col, &x) in self.x.iter().enumerate() {
                for (row, &y) in self.y.iter().enumerate() {
                    let t = radius * (x * cos_dir + y * sin_dir);
                    let wave = (t.cos() - 1.0) * cos_phase + t.sin() * sin_phase;
                    let h = self.hurst[(col, row)];
                    surface[(col, row)] += wave / arrival.powf((1.0 + h) / 2.0);
                }
            }
        }

        for (value, &h) in surface.cells_mut().zip(self.hurst.as_slice()) {
            *value *= 2.0 * PI.powf(0.5 * (1.0 + h));
        }

        debug!(terms = self.terms, cols = self.x.len(), rows = self.y.len(), "fbm surface");
        Ok(surface)
    }
}
