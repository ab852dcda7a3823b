//! Confidence scoring.
//!
//! `confidence = extraction × 0.40 + source × 0.25 + clarity × 0.25 + 0.10`,
//! rounded to two decimals.

use crate::types::{Clarity, ExtractionTier};

/// Baseline source weight for scraped web sources.
pub const DEFAULT_SOURCE_WEIGHT: f64 = 0.85;

/// Weight used for labels that are not recognised.
const UNKNOWN_WEIGHT: f64 = 0.4;

/// Weight of an extraction tier.
#[must_use]
pub fn extraction_weight(tier: ExtractionTier) -> f64 {
    match tier {
        ExtractionTier::Primary => 1.0,
        ExtractionTier::Fallback => 0.7,
        ExtractionTier::Llm => 0.4,
        ExtractionTier::Failed => 0.1,
    }
}

/// Weight of a clarity level.
#[must_use]
pub fn clarity_weight(clarity: Clarity) -> f64 {
    match clarity {
        Clarity::Clear => 1.0,
        Clarity::Inferred => 0.7,
        Clarity::Ambiguous => 0.4,
    }
}

/// Tier weight looked up by label; unrecognised labels score 0.4.
#[must_use]
pub fn extraction_weight_for(label: &str) -> f64 {
    label
        .parse::<ExtractionTier>()
        .map_or(UNKNOWN_WEIGHT, extraction_weight)
}

/// Clarity weight looked up by label; unrecognised labels score 0.4.
#[must_use]
pub fn clarity_weight_for(label: &str) -> f64 {
    label.parse::<Clarity>().map_or(UNKNOWN_WEIGHT, clarity_weight)
}

/// Combine weights into a confidence score.
#[must_use]
pub fn combine(extraction: f64, source_weight: f64, clarity: f64) -> f64 {
    let raw = extraction * 0.40 + source_weight.clamp(0.0, 1.0) * 0.25 + clarity * 0.25 + 0.10;
    (raw * 100.0).round() / 100.0
}

/// Confidence for a result produced by `tier` with the given clarity.
#[must_use]
pub fn compute_confidence(tier: ExtractionTier, source_weight: f64, clarity: Clarity) -> f64 {
    combine(extraction_weight(tier), source_weight, clarity_weight(clarity))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIERS: [ExtractionTier; 4] = [
        ExtractionTier::Primary,
        ExtractionTier::Fallback,
        ExtractionTier::Llm,
        ExtractionTier::Failed,
    ];
    const CLARITIES: [Clarity; 3] = [Clarity::Clear, Clarity::Inferred, Clarity::Ambiguous];

    #[test]
    fn test_all_combinations_match_formula() {
        let expected = [
            // clear, inferred, ambiguous
            [0.96, 0.89, 0.81],  // primary
            [0.84, 0.77, 0.69],  // fallback
            [0.72, 0.65, 0.57],  // llm
            [0.60, 0.53, 0.45],  // failed
        ];
        for (i, tier) in TIERS.into_iter().enumerate() {
            for (j, clarity) in CLARITIES.into_iter().enumerate() {
                let score = compute_confidence(tier, DEFAULT_SOURCE_WEIGHT, clarity);
                assert!(
                    (score - expected[i][j]).abs() < 1e-9,
                    "{tier}/{clarity}: got {score}, want {}",
                    expected[i][j]
                );
                assert!((0.0..=1.0).contains(&score));
                assert!(((score * 100.0).round() - score * 100.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_api_weight_raises_score() {
        let web = compute_confidence(ExtractionTier::Primary, 0.85, Clarity::Clear);
        let api = compute_confidence(ExtractionTier::Primary, 0.95, Clarity::Clear);
        assert!(api > web);
        assert!((api - 0.99).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_labels_default() {
        assert!((extraction_weight_for("guess") - 0.4).abs() < f64::EPSILON);
        assert!((clarity_weight_for("") - 0.4).abs() < f64::EPSILON);
        assert!((extraction_weight_for("fallback") - 0.7).abs() < f64::EPSILON);
        assert!((clarity_weight_for("Clear") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_source_weight_is_clamped() {
        let score = combine(1.0, 7.0, 1.0);
        assert!(score <= 1.0);
    }
}
