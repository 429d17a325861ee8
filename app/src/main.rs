use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use nlm_core::{
    ClusterParams, FbmParams, GeneratorConfig, Grid, Hurst, Landscape, MpdParams, Neighborhood,
    NeighborhoodParams, rescale,
};
use nlm_storage::LandscapeStore;
use nlm_storage::models::LandscapeDoc;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

const DB_NAME: &str = "nlm";
const COLLECTION: &str = "landscapes";

#[derive(Parser)]
#[command(name = "nlm")]
#[command(author, version, about = "Neutral landscape model generator", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Random seed; the same seed and parameters give the same landscape
    #[arg(long, global = true, default_value = "1")]
    seed: u64,

    /// Output file (stdout when omitted)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Stretch continuous landscapes onto [0, 1]
    #[arg(long, global = true)]
    rescale: bool,

    /// MongoDB URI to store the landscape in
    #[arg(long, global = true)]
    store: Option<String>,

    /// Name for the stored landscape (defaults to the model name)
    #[arg(long, global = true)]
    name: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Midpoint displacement (diamond-square) surface
    Mpd {
        #[arg(long, default_value = "129")]
        rows: usize,
        #[arg(long, default_value = "129")]
        cols: usize,
        /// Standard deviation of the coarsest level
        #[arg(long, default_value = "1.0")]
        rand_dev: f64,
        /// One persistence factor, or one multiplier per level (comma separated)
        #[arg(long, value_delimiter = ',', default_value = "0.5")]
        roughness: Vec<f64>,
        /// Wrap the edges (torus)
        #[arg(long)]
        torus: bool,
    },

    /// Random rectangular cluster
    Cluster {
        #[arg(long, default_value = "100")]
        rows: usize,
        #[arg(long, default_value = "100")]
        cols: usize,
        #[arg(long, default_value = "2")]
        min_length: usize,
        #[arg(long, default_value = "8")]
        max_length: usize,
    },

    /// Categorical neighbourhood growth
    Neigh {
        #[arg(long, default_value = "50")]
        rows: usize,
        #[arg(long, default_value = "50")]
        cols: usize,
        /// Cells to assign per category, label 1 first (comma separated)
        #[arg(long, value_delimiter = ',', default_value = "500,500,500")]
        cells: Vec<usize>,
        /// 4 (von Neumann) or 8 (Moore)
        #[arg(long, default_value = "4")]
        neighborhood: u8,
        #[arg(long, default_value = "0.6")]
        p_neighbor: f64,
        #[arg(long, default_value = "0.2")]
        p_empty: f64,
        /// JSON grid of pre-labelled cells
        #[arg(long)]
        initial: Option<PathBuf>,
    },

    /// Fractional Brownian surface on a regular unit-spaced axis
    Fbm {
        #[arg(long, default_value = "64")]
        rows: usize,
        #[arg(long, default_value = "64")]
        cols: usize,
        #[arg(long, default_value = "0.5")]
        hurst: f64,
        #[arg(long, default_value = "500")]
        terms: usize,
    },

    /// Generate from a JSON configuration file
    Run {
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    let config = build_config(cli.command)?;
    let start = Instant::now();
    let landscape = config
        .generate(cli.seed)
        .with_context(|| format!("{} generation failed", config.model_name()))?;
    info!(
        model = config.model_name(),
        seed = cli.seed,
        "{} x {} landscape in {:.2} ms",
        landscape.cols(),
        landscape.rows(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    // only the written copy is rescaled; the store keeps what config + seed reproduce
    let written = output_view(&landscape, cli.rescale);
    write_landscape(&written, cli.format, cli.output.as_ref())?;

    if let Some(uri) = cli.store {
        let name = cli
            .name
            .unwrap_or_else(|| config.model_name().to_string());
        if name.trim().is_empty() {
            bail!("--name must not be empty");
        }
        let doc = LandscapeDoc::new(name, cli.seed, config, landscape);
        store_landscape(&uri, doc)?;
    }

    Ok(())
}

fn output_view(landscape: &Landscape, rescaled: bool) -> Landscape {
    let mut view = landscape.clone();
    if rescaled {
        match &mut view {
            Landscape::Continuous(grid) => rescale(grid),
            Landscape::Categorical(_) => warn!("--rescale ignored for categorical landscapes"),
        }
    }
    view
}

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")
}

fn build_config(command: Commands) -> Result<GeneratorConfig> {
    let config = match command {
        Commands::Mpd {
            rows,
            cols,
            rand_dev,
            roughness,
            torus,
        } => GeneratorConfig::Mpd(MpdParams {
            rows,
            cols,
            rand_dev,
            roughness,
            torus,
        }),

        Commands::Cluster {
            rows,
            cols,
            min_length,
            max_length,
        } => GeneratorConfig::RandomCluster(ClusterParams {
            cols,
            rows,
            min_length,
            max_length,
        }),

        Commands::Neigh {
            rows,
            cols,
            cells,
            neighborhood,
            p_neighbor,
            p_empty,
            initial,
        } => {
            let initial = match initial {
                Some(path) => Some(read_json::<Grid<u32>>(&path)?),
                None => None,
            };
            GeneratorConfig::Neighborhood(NeighborhoodParams {
                rows,
                cols,
                initial,
                category_count: cells.len(),
                cells_per_category: cells,
                neighborhood: Neighborhood::try_from(neighborhood)?,
                p_neighbor,
                p_empty,
            })
        }

        Commands::Fbm {
            rows,
            cols,
            hurst,
            terms,
        } => {
            // unit square along the longer side, equal spacing on both axes
            let step = 1.0 / rows.max(cols).max(1) as f64;
            GeneratorConfig::Fbm(FbmParams {
                x: (0..cols).map(|i| i as f64 * step).collect(),
                y: (0..rows).map(|i| i as f64 * step).collect(),
                hurst: Hurst::Uniform(hurst),
                terms,
            })
        }

        Commands::Run { config } => read_json(&config)?,
    };
    Ok(config)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

fn write_landscape(
    landscape: &Landscape,
    format: OutputFormat,
    path: Option<&PathBuf>,
) -> Result<()> {
    let mut out: Box<dyn Write> = match path {
        Some(p) => Box::new(io::BufWriter::new(
            fs::File::create(p).with_context(|| format!("Failed to create {}", p.display()))?,
        )),
        None => Box::new(io::BufWriter::new(io::stdout().lock())),
    };

    match format {
        OutputFormat::Csv => {
            for row in landscape.text_rows() {
                writeln!(out, "{}", row.join(","))?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut out, landscape).context("Failed to write JSON")?;
            writeln!(out)?;
        }
    }
    out.flush().context("Failed to write output")?;

    if let Some(p) = path {
        info!("Saved {}", p.display());
    }
    Ok(())
}

fn store_landscape(uri: &str, doc: LandscapeDoc) -> Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    let name = doc.name.clone();
    rt.block_on(async {
        let store = LandscapeStore::init(uri, DB_NAME, COLLECTION)
            .await
            .context("DB init error")?;
        store.create(doc).await.context("DB error")?;
        anyhow::Ok(())
    })?;

    info!(name = %name, "Saved to MongoDB");
    Ok(())
}
