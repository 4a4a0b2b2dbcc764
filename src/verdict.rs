//! Score normalization and verdict tiers

use crate::scoring::ScoreAccumulator;
use crate::types::{ScoreResult, Verdict};

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

/// Default multiplier for positive scores that found nothing good
pub const FILLER_DAMPENING: f64 = 0.3;

impl Verdict {
    /// Map a clamped score to its tier, highest band first
    pub fn from_score(score: f64) -> Verdict {
        if score >= 80.0 {
            Verdict::ApexFuel
        } else if score >= 60.0 {
            Verdict::SolidChoice
        } else if score >= 40.0 {
            Verdict::Mediocre
        } else {
            Verdict::Trash
        }
    }
}

/// Round to one decimal, half to even on the exact binary value.
///
/// `x * 10.0` can itself round onto a `.5`, so the exact residual of the
/// multiplication decides which side of the midpoint `x` really lies on.
pub fn round_one_decimal(x: f64) -> f64 {
    let scaled = x * 10.0;
    let residual = x.mul_add(10.0, -scaled);
    let floor = scaled.floor();

    let rounded = if scaled - floor == 0.5 {
        if residual > 0.0 {
            floor + 1.0
        } else if residual < 0.0 || floor % 2.0 == 0.0 {
            floor
        } else {
            floor + 1.0
        }
    } else {
        scaled.round()
    };

    rounded / 10.0
}

/// Finalize with the default dampening factor
pub fn finalize(acc: ScoreAccumulator) -> ScoreResult {
    finalize_with(acc, FILLER_DAMPENING)
}

/// Dampen good-free results, clamp, pick a verdict and round
pub fn finalize_with(mut acc: ScoreAccumulator, filler_dampening: f64) -> ScoreResult {
    let raw = acc.running_score;
    let mut score = raw;

    if acc.good.is_empty() && score > 0.0 {
        score *= filler_dampening;
    }

    let clamped = score.clamp(MIN_SCORE, MAX_SCORE);
    let verdict = Verdict::from_score(clamped);
    let final_score = round_one_decimal(clamped);

    acc.log.push(format!(
        "Raw score {:.1}, final {:.1}: {}",
        raw, final_score, verdict
    ));

    ScoreResult {
        final_score,
        verdict,
        good_ingredients: acc.good,
        bad_ingredients: acc.bad,
        warnings: acc.warnings,
        analysis_log: acc.log,
    }
}
