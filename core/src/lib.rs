// core holds the neutral landscape generators and the raster they fill
pub mod cluster;
pub mod config;
pub mod error;
pub mod fbm;
pub mod grid;
pub mod mpd;
pub mod neighborhood;
pub mod random;
pub mod roughness;
pub mod utils;

pub use cluster::{ClusterParams, RandomRectangularCluster};
pub use config::{GeneratorConfig, Landscape};
pub use error::{NlmError, Result};
pub use fbm::{FbmParams, FractionalBrownianSurface, Hurst};
pub use grid::Grid;
pub use mpd::{BoundaryPolicy, MidpointDisplacement, MpdParams};
pub use neighborhood::{Neighborhood, NeighborhoodGrowth, NeighborhoodParams};
pub use random::RandomStream;
pub use roughness::RoughnessSchedule;
pub use utils::{crop, rescale};

// A validated landscape model that fills a raster from a random stream.
// Construction checks every parameter, so `generate_with` only fails for
// errors that depend on the draws themselves.
pub trait LandscapeGenerator {
    type Cell;

    // Draw from a caller-owned stream; independent streams may run on
    // separate threads since nothing here is shared.
    fn generate_with(&self, stream: &mut RandomStream) -> Result<Grid<Self::Cell>>;

    // Fresh stream seeded with `seed`; same seed, same grid.
    fn generate_seeded(&self, seed: u64) -> Result<Grid<Self::Cell>> {
        let mut stream = RandomStream::new(seed);
        self.generate_with(&mut stream)
    }
}
