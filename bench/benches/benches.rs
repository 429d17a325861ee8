use nlm_core::{
    ClusterParams, FbmParams, LandscapeGenerator, MidpointDisplacement, MpdParams,
    FractionalBrownianSurface, NeighborhoodGrowth, NeighborhoodParams, RandomRectangularCluster,
    rescale,
};
use criterion::{Criterion, criterion_group, criterion_main};

const SIZE: usize = 257;
const SEED: u64 = 2025;

fn mpd_params(torus: bool) -> MpdParams {
    MpdParams {
        rows: SIZE,
        cols: SIZE,
        rand_dev: 1.0,
        roughness: vec![0.5],
        torus,
    }
}

fn bench_mpd_clamp(c: &mut Criterion) {
    let generator = MidpointDisplacement::new(&mpd_params(false)).unwrap();
    c.bench_function("MPD 257x257 clamp + rescale", |b| {
        b.iter(|| {
            let mut grid = generator.generate_seeded(SEED).unwrap();
            rescale(&mut grid);
        })
    });
}

fn bench_mpd_wrap(c: &mut Criterion) {
    let generator = MidpointDisplacement::new(&mpd_params(true)).unwrap();
    c.bench_function("MPD 257x257 torus + rescale", |b| {
        b.iter(|| {
            let mut grid = generator.generate_seeded(SEED).unwrap();
            rescale(&mut grid);
        })
    });
}

fn bench_random_cluster(c: &mut Criterion) {
    let generator = RandomRectangularCluster::new(ClusterParams {
        cols: SIZE,
        rows: SIZE,
        min_length: 2,
        max_length: 10,
    })
    .unwrap();
    c.bench_function("Random rectangular cluster 257x257", |b| {
        b.iter(|| generator.generate_seeded(SEED).unwrap())
    });
}

fn bench_neighborhood(c: &mut Criterion) {
    let third = SIZE * SIZE / 3;
    let generator = NeighborhoodGrowth::new(NeighborhoodParams {
        rows: SIZE,
        cols: SIZE,
        initial: None,
        category_count: 3,
        cells_per_category: vec![third; 3],
        p_neighbor: 0.8,
        p_empty: 0.1,
        ..NeighborhoodParams::default()
    })
    .unwrap();
    c.bench_function("Neighbourhood growth 257x257, 3 categories", |b| {
        b.iter(|| generator.generate_seeded(SEED).unwrap())
    });
}

fn bench_fbm(c: &mut Criterion) {
    let axis: Vec<f64> = (0..65).map(|i| i as f64 / 64.0).collect();
    let generator = FractionalBrownianSurface::new(FbmParams {
        x: axis.clone(),
        y: axis,
        terms: 200,
        ..FbmParams::default()
    })
    .unwrap();
    c.bench_function("fBm 65x65, 200 terms", |b| {
        b.iter(|| generator.generate_seeded(SEED).unwrap())
    });
}

criterion_group!(
    landscape_benchmarks,
    bench_mpd_clamp,
    bench_mpd_wrap,
    bench_random_cluster,
    bench_neighborhood,
    bench_fbm
);
criterion_main!(landscape_benchmarks);
