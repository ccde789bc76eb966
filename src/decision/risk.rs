use serde::{Deserialize, Serialize};

use super::signals::{RawRecord, SignalInputs};
use super::tiers::{ConfidenceBand, RiskTier};
use super::weights::{
    SignalWeights, AGREEMENT_WEIGHT, COMPLETENESS_WEIGHT, MISSING_AUDIENCE_PENALTY,
    MISSING_REGION_PENALTY, UNTRUSTED_CROSS_AGE_FACTOR,
};
use crate::error::DecisionError;

/// Score, tiering and confidence for one session, with the per-signal
/// contributions kept for explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskOutput {
    pub risk_score: f64,
    pub risk_tier: RiskTier,
    pub confidence_band: ConfidenceBand,
    pub abstain_flag: bool,
    pub component_text: f64,
    pub component_audio: f64,
    pub component_visual: f64,
    pub component_behavior: f64,
    pub component_cross_age: f64,
    pub component_novelty: f64,
    pub completeness_penalty: f64,
    pub agreement_score: f64,
}

impl RiskOutput {
    /// Unclamped blend; equals `risk_score` for in-range signals.
    pub fn component_sum(&self) -> f64 {
        self.component_text
            + self.component_audio
            + self.component_visual
            + self.component_behavior
            + self.component_cross_age
            + self.component_novelty
    }
}

/// Medium or high risk that the scorer does not trust enough to automate.
pub fn abstains(risk_tier: RiskTier, confidence_band: ConfidenceBand) -> bool {
    risk_tier.is_elevated() && confidence_band == ConfidenceBand::Low
}

pub fn completeness_penalty(inputs: &SignalInputs) -> f64 {
    let mut penalty = 0.0;
    if !inputs.has_audience_mix() {
        penalty += MISSING_AUDIENCE_PENALTY;
    }
    if !inputs.has_known_region() {
        penalty += MISSING_REGION_PENALTY;
    }
    penalty
}

/// Fails with `InvalidInput` when a signal is NaN or infinite.
pub fn score(inputs: &SignalInputs) -> Result<RiskOutput, DecisionError> {
    inputs.validate()?;
    let weights = SignalWeights::DEFAULT;
    let completeness_penalty = completeness_penalty(inputs);

    let cross_age = if inputs.has_audience_mix() {
        inputs.cross_age_interaction_rate
    } else {
        inputs.cross_age_interaction_rate * UNTRUSTED_CROSS_AGE_FACTOR
    };

    let component_text = weights.text * inputs.text;
    let component_audio = weights.audio * inputs.audio;
    let component_visual = weights.visual * inputs.visual;
    let component_behavior = weights.behavior * inputs.behavior;
    let component_cross_age = weights.cross_age * cross_age;
    let component_novelty = weights.novelty * inputs.novelty;

    let risk_score = bound01(
        component_text
            + component_audio
            + component_visual
            + component_behavior
            + component_cross_age
            + component_novelty,
    );

    // spread is measured on the discounted cross-age value
    let spread = population_stdev(&[
        inputs.text,
        inputs.audio,
        inputs.visual,
        inputs.behavior,
        inputs.novelty,
        cross_age,
    ]);
    let agreement_score = bound01(1.0 - spread);

    let confidence = bound01(
        AGREEMENT_WEIGHT * agreement_score + COMPLETENESS_WEIGHT * (1.0 - completeness_penalty),
    );
    let confidence_band = ConfidenceBand::from_raw(confidence);
    let risk_tier = RiskTier::from_score(risk_score);

    Ok(RiskOutput {
        risk_score,
        risk_tier,
        confidence_band,
        abstain_flag: abstains(risk_tier, confidence_band),
        component_text,
        component_audio,
        component_visual,
        component_behavior,
        component_cross_age,
        component_novelty,
        completeness_penalty,
        agreement_score,
    })
}

pub fn score_record(record: &RawRecord) -> Result<RiskOutput, DecisionError> {
    score(&SignalInputs::from_record(record)?)
}

fn bound01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

fn population_stdev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::signals::ContentFormat;

    fn inputs(signal: f64) -> SignalInputs {
        SignalInputs {
            text: signal,
            audio: signal,
            visual: signal,
            behavior: signal,
            novelty: signal,
            cross_age_interaction_rate: signal,
            aud_u18_share: Some(0.2),
            creator_region: Some("US".into()),
            content_format: ContentFormat::ShortVideo,
        }
    }

    #[test]
    fn stdev_is_population_stdev() {
        assert_eq!(population_stdev(&[]), 0.0);
        assert_eq!(population_stdev(&[0.4, 0.4, 0.4]), 0.0);
        assert!((population_stdev(&[0.0, 1.0]) - 0.5).abs() < 1e-12);
        assert!((population_stdev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn bound01_clamps_both_ends() {
        assert_eq!(bound01(-0.2), 0.0);
        assert_eq!(bound01(1.7), 1.0);
        assert_eq!(bound01(0.3), 0.3);
    }

    #[test]
    fn penalty_increments_are_independent() {
        let mut case = inputs(0.5);
        assert_eq!(completeness_penalty(&case), 0.0);

        case.creator_region = Some("unknown".into());
        assert!((completeness_penalty(&case) - 0.05).abs() < 1e-12);

        case.creator_region = Some("US".into());
        case.aud_u18_share = None;
        assert!((completeness_penalty(&case) - 0.18).abs() < 1e-12);

        case.creator_region = None;
        assert!((completeness_penalty(&case) - 0.23).abs() < 1e-12);
    }

    #[test]
    fn missing_audience_discounts_cross_age() {
        let mut case = inputs(0.0);
        case.cross_age_interaction_rate = 1.0;
        let trusted = score(&case).unwrap();
        assert!((trusted.component_cross_age - 0.12).abs() < 1e-12);

        case.aud_u18_share = None;
        let discounted = score(&case).unwrap();
        assert!((discounted.component_cross_age - 0.12 * 0.7).abs() < 1e-12);
        assert!(discounted.risk_score < trusted.risk_score);
    }

    #[test]
    fn uniform_signals_agree_fully() {
        let out = score(&inputs(0.3)).unwrap();
        assert!((out.agreement_score - 1.0).abs() < 1e-12);
        assert_eq!(out.confidence_band, ConfidenceBand::High);
        assert!((out.risk_score - 0.3).abs() < 1e-12);
        assert_eq!(out.risk_tier, RiskTier::Low);
    }

    #[test]
    fn components_follow_weights() {
        let out = score(&inputs(1.0)).unwrap();
        assert!((out.component_text - 0.22).abs() < 1e-12);
        assert!((out.component_audio - 0.10).abs() < 1e-12);
        assert!((out.component_visual - 0.18).abs() < 1e-12);
        assert!((out.component_behavior - 0.28).abs() < 1e-12);
        assert!((out.component_cross_age - 0.12).abs() < 1e-12);
        assert!((out.component_novelty - 0.10).abs() < 1e-12);
        assert!((out.component_sum() - out.risk_score).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_signals_are_clamped_not_rejected() {
        let mut case = inputs(1.0);
        case.behavior = 3.0;
        let out = score(&case).unwrap();
        assert_eq!(out.risk_score, 1.0);
        assert!(out.component_sum() > 1.0);

        let out = score(&inputs(-0.5)).unwrap();
        assert_eq!(out.risk_score, 0.0);
        assert_eq!(out.risk_tier, RiskTier::Low);
    }

    #[test]
    fn abstention_needs_elevated_risk_and_low_confidence() {
        assert!(abstains(RiskTier::Med, ConfidenceBand::Low));
        assert!(abstains(RiskTier::High, ConfidenceBand::Low));
        assert!(!abstains(RiskTier::Low, ConfidenceBand::Low));
        assert!(!abstains(RiskTier::High, ConfidenceBand::Med));
        assert!(!abstains(RiskTier::Med, ConfidenceBand::High));
    }

    #[test]
    fn non_finite_signals_are_rejected() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut case = inputs(0.9);
            case.text = bad;
            let err = score(&case).unwrap_err();
            assert_eq!(err.field(), "text_signal");

            let mut case = inputs(0.9);
            case.cross_age_interaction_rate = bad;
            assert!(matches!(
                score(&case),
                Err(DecisionError::InvalidInput { .. })
            ));
        }
    }

    #[test]
    fn score_record_propagates_missing_field() {
        let err = score_record(&RawRecord::new()).unwrap_err();
        assert_eq!(err, DecisionError::missing("text_signal"));
    }
}
