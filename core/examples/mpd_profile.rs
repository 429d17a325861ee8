use nlm_core::{LandscapeGenerator, MidpointDisplacement, MpdParams, rescale};

// Print the level schedule of a 257x257 surface and a coarse ASCII preview
fn main() {
    let params = MpdParams {
        rows: 257,
        cols: 257,
        rand_dev: 1.0,
        roughness: vec![0.6],
        torus: true,
    };
    let generator = match MidpointDisplacement::new(&params) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("invalid parameters: {e}");
            return;
        }
    };

    println!("raster {0}x{0}, {1} levels", generator.size(), generator.steps());
    let levels = generator
        .side_lengths()
        .iter()
        .zip(generator.schedule().amplitudes());
    for (side, amplitude) in levels {
        println!("  side {side:>4}  amplitude {amplitude:.5}");
    }

    let mut grid = match generator.generate_seeded(2025) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("generation failed: {e}");
            return;
        }
    };
    rescale(&mut grid);

    // every 8th cell mapped onto a short ramp
    let ramp = [' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];
    for row in grid.row_slices().step_by(8) {
        let line: String = row
            .iter()
            .step_by(4)
            .map(|v| ramp[((v * (ramp.len() - 1) as f64).round() as usize).min(ramp.len() - 1)])
            .collect();
        println!("{line}");
    }
}
