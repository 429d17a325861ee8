use nlm_core::{GeneratorConfig, Landscape, NeighborhoodParams};
use nlm_storage::LandscapeStore;
use nlm_storage::models::LandscapeDoc;

#[tokio::main]
async fn main() -> mongodb::error::Result<()> {
    // Grow a 64x64 three-class landscape
    let seed = 2025;
    let config = GeneratorConfig::Neighborhood(NeighborhoodParams {
        rows: 64,
        cols: 64,
        category_count: 3,
        cells_per_category: vec![1200, 1200, 1200],
        ..NeighborhoodParams::default()
    });
    let landscape = match config.generate(seed) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("generation failed: {e}");
            return Ok(());
        }
    };

    let store = LandscapeStore::init("mongodb://localhost:27017", "nlm", "landscapes").await?;

    // Insert & read back
    store
        .create(LandscapeDoc::new("neigh-demo", seed, config, landscape))
        .await?;
    match store.read_by_seed(seed).await? {
        Some(LandscapeDoc {
            landscape: Landscape::Categorical(grid),
            ..
        }) => println!("Round-trip success: label at (32, 32) = {}", grid[(32, 32)]),
        Some(_) => println!("Unexpected landscape kind"),
        None => println!("Document not found!"),
    }

    // Clean up
    store.delete_by_seed(seed).await?;

    Ok(())
}
