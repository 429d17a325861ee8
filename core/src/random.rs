use rand::distributions::uniform::{SampleRange, SampleUniform};
use rand::distributions::{Distribution, Standard};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;
use rand_pcg::Pcg64Mcg;

use crate::error::{NlmError, Result};

// Seeded source of uniform, integer and Gaussian draws for one generation call.
//
// The bit generator is PCG-64 (MCG variant) seeded through
// `SeedableRng::seed_from_u64`. Uniforms carry 53 random bits in [0, 1);
// Gaussians come from `rand_distr::Normal`.
//
// A stream is never shared between generations: callers running in
// parallel build one stream per call.
#[derive(Debug)]
pub struct RandomStream {
    rng: Pcg64Mcg,
}

impl RandomStream {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    // Uniform draw in [0, 1)
    #[inline]
    pub fn uniform01(&mut self) -> f64 {
        self.rng.sample(Standard)
    }

    // Gaussian draw; `stddev` must be finite and not negative
    pub fn normal(&mut self, mean: f64, stddev: f64) -> Result<f64> {
        Ok(self.sample(gaussian(mean, stddev)?))
    }

    // Draw from any distribution, e.g. a `Normal` built once per level
    #[inline]
    pub fn sample<T, D: Distribution<T>>(&mut self, dist: D) -> T {
        self.rng.sample(dist)
    }

    // Uniform integer in `range` (`lo..hi` or `lo..=hi`); panics when empty
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: SampleUniform,
        R: SampleRange<T>,
    {
        self.rng.gen_range(range)
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

// Validated Gaussian with the given mean and standard deviation
pub fn gaussian(mean: f64, stddev: f64) -> Result<Normal<f64>> {
    if !(stddev.is_finite() && stddev >= 0.0) {
        return Err(NlmError::invalid_parameter(
            "stddev",
            stddev,
            "must be finite and not negative",
        ));
    }
    Normal::new(mean, stddev)
        .map_err(|_| NlmError::invalid_parameter("mean", mean, "must be finite"))
}

#[cfg(test)]
mod tests {
    use super::{RandomStream, gaussian};
    use crate::NlmError;

    #[test]
    fn stream_determinism() {
        let mut a = RandomStream::new(1234);
        let mut b = RandomStream::new(1234);
        for _ in 0..100 {
            assert_eq!(a.uniform01().to_bits(), b.uniform01().to_bits());
            assert_eq!(
                a.normal(0.0, 2.0).unwrap().to_bits(),
                b.normal(0.0, 2.0).unwrap().to_bits()
            );
        }
    }

    #[test]
    fn stream_seeds_differ() {
        let mut a = RandomStream::new(1);
        let mut b = RandomStream::new(2);
        let xs: Vec<f64> = (0..8).map(|_| a.uniform01()).collect();
        let ys: Vec<f64> = (0..8).map(|_| b.uniform01()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn uniform_in_unit_interval() {
        let mut s = RandomStream::new(0);
        for _ in 0..10_000 {
            let u = s.uniform01();
            assert!((0.0..1.0).contains(&u));
        }
    }

    #[test]
    fn normal_matches_prebuilt_distribution() {
        let mut a = RandomStream::new(99);
        let mut b = RandomStream::new(99);
        let dist = gaussian(0.5, 1.5).unwrap();
        for _ in 0..50 {
            assert_eq!(a.normal(0.5, 1.5).unwrap().to_bits(), b.sample(dist).to_bits());
        }
    }

    #[test]
    fn normal_moments_roughly_match() {
        let mut s = RandomStream::new(7);
        let n = 20_000;
        let draws: Vec<f64> = (0..n).map(|_| s.normal(3.0, 0.5).unwrap()).collect();
        let mean = draws.iter().sum::<f64>() / n as f64;
        let var = draws.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n as f64;
        assert!((mean - 3.0).abs() < 0.02, "mean {mean}");
        assert!((var.sqrt() - 0.5).abs() < 0.02, "sd {}", var.sqrt());
    }

    #[test]
    fn normal_with_zero_spread_is_mean() {
        let mut s = RandomStream::new(5);
        assert_eq!(s.normal(1.25, 0.0), Ok(1.25));
    }

    #[test]
    fn normal_rejects_bad_spread() {
        let mut s = RandomStream::new(5);
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                s.normal(0.0, bad),
                Err(NlmError::InvalidParameter { name: "stddev", .. })
            ));
        }
    }

    #[test]
    fn integer_ranges_stay_in_bounds() {
        let mut s = RandomStream::new(11);
        for _ in 0..1000 {
            assert!(s.gen_range(0..7usize) < 7);
            let r = s.gen_range(3..=5usize);
            assert!((3..=5).contains(&r));
        }
        assert_eq!(s.gen_range(0..1usize), 0);
        // full-width inclusive range must not overflow
        let _ = s.gen_range(usize::MAX - 1..=usize::MAX);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut s = RandomStream::new(3);
        let mut v: Vec<usize> = (0..50).collect();
        s.shuffle(&mut v);
        assert_ne!(v, (0..50).collect::<Vec<_>>());
        let mut sorted = v.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }
}
