use serde::{Deserialize, Serialize};

use crate::LandscapeGenerator;
use crate::cluster::{ClusterParams, RandomRectangularCluster};
use crate::error::Result;
use crate::fbm::{FbmParams, FractionalBrownianSurface};
use crate::grid::Grid;
use crate::mpd::{MidpointDisplacement, MpdParams};
use crate::neighborhood::{NeighborhoodGrowth, NeighborhoodParams};

// Any one landscape model with its parameters, e.g.
// {"model": "mpd", "rows": 65, "cols": 65, "roughness": [0.6]}
// Missing fields fall back to each model's defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum GeneratorConfig {
    Mpd(MpdParams),
    RandomCluster(ClusterParams),
    Neighborhood(NeighborhoodParams),
    Fbm(FbmParams),
}

// Generated raster: heights for the continuous models, labels for
// neighbourhood growth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "grid", rename_all = "lowercase")]
pub enum Landscape {
    Continuous(Grid<f64>),
    Categorical(Grid<u32>),
}

impl GeneratorConfig {
    pub fn model_name(&self) -> &'static str {
        match self {
            GeneratorConfig::Mpd(_) => "mpd",
            GeneratorConfig::RandomCluster(_) => "random_cluster",
            GeneratorConfig::Neighborhood(_) => "neighborhood",
            GeneratorConfig::Fbm(_) => "fbm",
        }
    }

    // Validate the parameters and run the model on a fresh seeded stream
    pub fn generate(&self, seed: u64) -> Result<Landscape> {
        let landscape = match self {
            GeneratorConfig::Mpd(p) => {
                Landscape::Continuous(MidpointDisplacement::new(p)?.generate_seeded(seed)?)
            }
            GeneratorConfig::RandomCluster(p) => Landscape::Continuous(
                RandomRectangularCluster::new(p.clone())?.generate_seeded(seed)?,
            ),
            GeneratorConfig::Neighborhood(p) => Landscape::Categorical(
                NeighborhoodGrowth::new(p.clone())?.generate_seeded(seed)?,
            ),
            GeneratorConfig::Fbm(p) => Landscape::Continuous(
                FractionalBrownianSurface::new(p.clone())?.generate_seeded(seed)?,
            ),
        };
        Ok(landscape)
    }
}

impl Landscape {
    pub fn cols(&self) -> usize {
        match self {
            Landscape::Continuous(g) => g.cols(),
            Landscape::Categorical(g) => g.cols(),
        }
    }

    pub fn rows(&self) -> usize {
        match self {
            Landscape::Continuous(g) => g.rows(),
            Landscape::Categorical(g) => g.rows(),
        }
    }

    // Cell values as text, one Vec per row, top to bottom
    pub fn text_rows(&self) -> Vec<Vec<String>> {
        match self {
            Landscape::Continuous(g) => to_text(g),
            Landscape::Categorical(g) => to_text(g),
        }
    }
}

fn to_text<T: ToString>(grid: &Grid<T>) -> Vec<Vec<String>> {
    grid.row_slices()
        .map(|row| row.iter().map(T::to_string).collect())
        .collect()
}
