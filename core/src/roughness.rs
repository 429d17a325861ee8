use crate::error::{NlmError, Result};

// Number of refinement levels for a raster of odd side `size`: ceil(log2(size - 1)).
// Returns 0 for sizes below 3, which have no level to refine.
pub fn step_count(size: usize) -> usize {
    if size < 3 {
        return 0;
    }
    // ceil(log2(m)) for m >= 2 is the bit length of m - 1
    (usize::BITS - (size - 2).leading_zeros()) as usize
}

// Side lengths per level, coarsest first: 2^steps, 2^(steps-1), ..., 2
pub fn side_lengths(steps: usize) -> Vec<usize> {
    (1..=steps).rev().map(|e| 1usize << e).collect()
}

// Noise amplitude for every refinement level
#[derive(Debug, Clone, PartialEq)]
pub struct RoughnessSchedule {
    amplitudes: Vec<f64>,
}

impl RoughnessSchedule {
    // `roughness` holds either one persistence factor (geometric decay from
    // `rand_dev`) or one explicit multiplier per level.
    pub fn new(rand_dev: f64, roughness: &[f64], steps: usize) -> Result<Self> {
        if !(rand_dev.is_finite() && rand_dev > 0.0) {
            return Err(NlmError::invalid_parameter(
                "rand_dev",
                rand_dev,
                "must be a positive finite number",
            ));
        }
        if let Some(bad) = roughness.iter().find(|r| !(r.is_finite() && **r > 0.0)) {
            return Err(NlmError::invalid_parameter(
                "roughness",
                bad,
                "every entry must be a positive finite number",
            ));
        }

        let amplitudes: Vec<f64> = match roughness {
            [persistence] => std::iter::successors(Some(rand_dev), |prev| Some(prev * persistence))
                .take(steps)
                .collect(),
            per_level if per_level.len() == steps => {
                per_level.iter().map(|r| r * rand_dev).collect()
            }
            other => {
                return Err(NlmError::ConfigMismatch {
                    name: "roughness",
                    got: other.len(),
                    expected: format!("1 or {steps}"),
                });
            }
        };
        if let Some(bad) = amplitudes.iter().find(|a| !a.is_finite()) {
            return Err(NlmError::invalid_parameter(
                "roughness",
                bad,
                "level amplitude overflows",
            ));
        }

        Ok(Self { amplitudes })
    }

    pub fn amplitudes(&self) -> &[f64] {
        &self.amplitudes
    }

    pub fn len(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }
}
