//! Position weights for ordered ingredient lists

/// Default per-position decay; keeps the first few ingredients dominant
pub const DEFAULT_DECAY: f64 = 0.85;

/// Endless sequence of weights `1.0, d, d^2, ...`, built by repeated multiplication
#[derive(Debug, Clone)]
pub struct PositionWeights {
    current: f64,
    decay: f64,
}

impl PositionWeights {
    pub fn new(decay: f64) -> Self {
        debug_assert!(decay > 0.0 && decay < 1.0, "decay must lie in (0, 1)");
        Self { current: 1.0, decay }
    }
}

impl Default for PositionWeights {
    fn default() -> Self {
        Self::new(DEFAULT_DECAY)
    }
}

impl Iterator for PositionWeights {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let weight = self.current;
        self.current *= self.decay;
        Some(weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_decay_strictly() {
        let weights: Vec<f64> = PositionWeights::default().take(10).collect();
        assert_eq!(weights[0], 1.0);
        assert!((weights[1] - 0.85).abs() < 1e-12);
        assert!(weights.windows(2).all(|w| w[1] < w[0]));
        assert!((weights[9] - 0.85f64.powi(9)).abs() < 1e-9);
    }
}
