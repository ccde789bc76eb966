/// Fixed blend weights for the six signals. They sum to 1.00, so a blend of
/// in-range signals stays in `[0, 1]` before clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalWeights {
    pub text: f64,
    pub audio: f64,
    pub visual: f64,
    pub behavior: f64,
    pub cross_age: f64,
    pub novelty: f64,
}

impl SignalWeights {
    pub const DEFAULT: SignalWeights = SignalWeights {
        text: 0.22,
        audio: 0.10,
        visual: 0.18,
        behavior: 0.28,
        cross_age: 0.12,
        novelty: 0.10,
    };

    pub fn total(&self) -> f64 {
        self.text + self.audio + self.visual + self.behavior + self.cross_age + self.novelty
    }
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// Completeness penalties
pub const MISSING_AUDIENCE_PENALTY: f64 = 0.18;
pub const MISSING_REGION_PENALTY: f64 = 0.05;

/// Cross-age signal multiplier when the under-18 share is unknown.
pub const UNTRUSTED_CROSS_AGE_FACTOR: f64 = 0.7;

// Confidence blend
pub const AGREEMENT_WEIGHT: f64 = 0.55;
pub const COMPLETENESS_WEIGHT: f64 = 0.45;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one() {
        assert!((SignalWeights::DEFAULT.total() - 1.0).abs() < 1e-12);
        assert!((AGREEMENT_WEIGHT + COMPLETENESS_WEIGHT - 1.0).abs() < 1e-12);
    }

    #[test]
    fn penalties_cap_at_twenty_three_points() {
        assert!((MISSING_AUDIENCE_PENALTY + MISSING_REGION_PENALTY - 0.23).abs() < 1e-12);
    }
}
