//! Scoring engine: one left-to-right pass over a classified, weighted ingredient list

use crate::classifier::{display_name, Classifier};
use crate::types::*;
use crate::verdict;
use crate::weighting::{PositionWeights, DEFAULT_DECAY};
use std::sync::OnceLock;
use tracing::debug;

/// Numeric knobs of the heuristic
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringParams {
    pub decay: f64,
    pub protein_cap: f64,
    pub bloat_threshold: u8,
    pub bloat_penalty: f64,
    pub cut_impact_base: f64,
    pub cut_impact_floor: f64, // per-item CUT penalties at or below this are skipped
    pub bulk_bonus_base: f64,
    pub bulk_bloat_ceiling: u8, // BULK carbs need bloat below this to earn a bonus
    pub leading_penalty: f64,
    pub low_quality_penalty: f64,
    pub filler_dampening: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            decay: DEFAULT_DECAY,
            protein_cap: 40.0,
            bloat_threshold: 5,
            bloat_penalty: 15.0,
            cut_impact_base: 20.0,
            cut_impact_floor: 5.0,
            bulk_bonus_base: 5.0,
            bulk_bloat_ceiling: 3,
            leading_penalty: 30.0,
            low_quality_penalty: 1.0,
            filler_dampening: 0.3,
        }
    }
}

/// Running state of a scoring pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreAccumulator {
    pub running_score: f64,
    pub good: Vec<String>,
    pub bad: Vec<String>,
    pub warnings: Vec<String>,
    pub log: Vec<String>,
}

impl ScoreAccumulator {
    /// True when any good/bad entry contains `name` as a substring.
    ///
    /// Deliberately a plain text scan: a short name can match a longer
    /// ingredient's entry and be treated as already recorded.
    pub fn already_recorded(&self, name: &str) -> bool {
        self.good
            .iter()
            .chain(self.bad.iter())
            .any(|entry| entry.contains(name))
    }
}

/// Ingredient scoring engine (stateless between calls, cheap to share via Arc)
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    classifier: Classifier,
    params: ScoringParams,
}

impl ScoringEngine {
    pub fn new(classifier: Classifier, params: ScoringParams) -> Self {
        Self { classifier, params }
    }

    /// Engine over a custom rule table with default parameters
    pub fn with_classifier(classifier: Classifier) -> Self {
        Self::new(classifier, ScoringParams::default())
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn params(&self) -> &ScoringParams {
        &self.params
    }

    /// Classify and weight every ingredient, in list order
    pub fn classify_all<S: AsRef<str>>(&self, ingredients: &[S]) -> Vec<ClassifiedIngredient> {
        ingredients
            .iter()
            .zip(PositionWeights::new(self.params.decay))
            .map(|(raw, weight)| {
                let raw = raw.as_ref();
                ClassifiedIngredient {
                    raw_name: raw.to_string(),
                    display_name: display_name(raw),
                    profile: self.classifier.classify(raw),
                    position_weight: weight,
                }
            })
            .collect()
    }

    /// Run the rule pass without finalizing
    pub fn accumulate<S: AsRef<str>>(&self, ingredients: &[S], mode: Mode) -> ScoreAccumulator {
        let mut acc = ScoreAccumulator::default();
        acc.log.push(format!(
            "🔎 Analyzing {} ingredients in {} mode.",
            ingredients.len(),
            mode
        ));

        for (index, item) in self.classify_all(ingredients).iter().enumerate() {
            let before = acc.running_score;

            self.apply_protein(&mut acc, item);
            self.apply_bloat(&mut acc, item);
            self.apply_mode(&mut acc, item, mode);
            self.apply_leading(&mut acc, item, mode, index);
            self.apply_catch_all(&mut acc, item);

            acc.log.push(format!(
                "#{} {}: {} (bio {}, bloat {}) at weight {:.2}, {:+.1}",
                index + 1,
                item.display_name,
                item.profile.category,
                item.profile.bioavailability,
                item.profile.bloat_risk,
                item.position_weight,
                acc.running_score - before
            ));
        }

        debug!(
            "Scored {} ingredients in {} mode: raw={:.2}, good={}, bad={}",
            ingredients.len(),
            mode,
            acc.running_score,
            acc.good.len(),
            acc.bad.len()
        );

        acc
    }

    /// Score an ordered ingredient list
    pub fn score<S: AsRef<str>>(&self, ingredients: &[S], mode: Mode) -> ScoreResult {
        let acc = self.accumulate(ingredients, mode);
        verdict::finalize_with(acc, self.params.filler_dampening)
    }

    fn apply_protein(&self, acc: &mut ScoreAccumulator, item: &ClassifiedIngredient) {
        if item.profile.category != Category::Protein {
            return;
        }
        let points = (f64::from(item.profile.bioavailability) * item.position_weight)
            .min(self.params.protein_cap);
        acc.running_score += points;
        acc.good.push(format!(
            "{} (+{:.1})",
            item.display_name,
            verdict::round_one_decimal(points)
        ));
    }

    fn apply_bloat(&self, acc: &mut ScoreAccumulator, item: &ClassifiedIngredient) {
        if item.profile.bloat_risk < self.params.bloat_threshold {
            return;
        }
        acc.running_score -= self.params.bloat_penalty;
        acc.bad.push(format!("{} (Bloat Risk)", item.display_name));
        acc.warnings.push(format!("⚠️ High Bloat: {}", item.display_name));
    }

    fn apply_mode(&self, acc: &mut ScoreAccumulator, item: &ClassifiedIngredient, mode: Mode) {
        let category = item.profile.category;
        match mode {
            Mode::Cut => {
                if !category.is_sugar_or_carb() {
                    return;
                }
                let impact = self.params.cut_impact_base * item.position_weight;
                if impact > self.params.cut_impact_floor {
                    acc.running_score -= impact;
                    acc.bad.push(format!("{} (Carb)", item.display_name));
                }
            }
            Mode::Bulk => {
                if category == Category::Carb
                    && item.profile.bloat_risk < self.params.bulk_bloat_ceiling
                {
                    acc.running_score += self.params.bulk_bonus_base * item.position_weight;
                    acc.good.push(format!("{} (Fuel)", item.display_name));
                }
            }
        }
    }

    fn apply_leading(
        &self,
        acc: &mut ScoreAccumulator,
        item: &ClassifiedIngredient,
        mode: Mode,
        index: usize,
    ) {
        // Index 0 is the only position carrying weight 1.0
        if index == 0 && mode == Mode::Cut && item.profile.category.is_sugar_or_carb() {
            acc.running_score -= self.params.leading_penalty;
            acc.warnings
                .push("❌ Primary ingredient is Sugar/Carb".to_string());
        }
    }

    fn apply_catch_all(&self, acc: &mut ScoreAccumulator, item: &ClassifiedIngredient) {
        if acc.already_recorded(&item.display_name) || !item.profile.category.is_concern() {
            return;
        }
        acc.bad
            .push(format!("{} (Low Quality/Empty)", item.display_name));
        acc.running_score -= self.params.low_quality_penalty;
    }
}

/// Process-wide engine over the built-in table
pub fn default_engine() -> &'static ScoringEngine {
    static ENGINE: OnceLock<ScoringEngine> = OnceLock::new();
    ENGINE.get_or_init(ScoringEngine::default)
}

/// Score with the built-in table and default parameters
pub fn score<S: AsRef<str>>(ingredients: &[S], mode: Mode) -> ScoreResult {
    default_engine().score(ingredients, mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_recorded_is_substring_scan() {
        let acc = ScoreAccumulator {
            bad: vec!["Palm Oil Fraction (Low Quality/Empty)".to_string()],
            ..Default::default()
        };
        assert!(acc.already_recorded("Palm Oil"));
        assert!(acc.already_recorded("Oil"));
        assert!(!acc.already_recorded("Sugar"));
    }

    #[test]
    fn test_classify_all_weights_every_item() {
        let engine = ScoringEngine::default();
        let items = engine.classify_all(&["Water", "en:whey-protein", "Water"]);

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].profile.category, Category::Other);
        assert_eq!(items[1].display_name, "whey protein");
        assert_eq!(items[1].raw_name, "en:whey-protein");
        assert!((items[1].position_weight - 0.85).abs() < 1e-12);
        // Unmatched ingredients still consume a position
        assert!((items[2].position_weight - 0.85 * 0.85).abs() < 1e-12);
    }

    #[test]
    fn test_protein_points_are_capped() {
        let acc = ScoringEngine::default().accumulate(&["Whey"], Mode::Bulk);
        assert_eq!(acc.running_score, 40.0);
        assert_eq!(acc.good, vec!["Whey (+40.0)".to_string()]);
    }

    #[test]
    fn test_cut_penalty_fades_with_position() {
        // 20 * 0.85^9 drops below the floor, so the tenth sugar skips the CUT penalty
        let mut list = vec!["Water"; 9];
        list.push("Sugar");
        let acc = ScoringEngine::default().accumulate(&list, Mode::Cut);

        assert_eq!(acc.bad, vec!["Sugar (Low Quality/Empty)".to_string()]);
        assert_eq!(acc.running_score, -1.0);
        assert!(acc.warnings.is_empty());
    }

    #[test]
    fn test_log_has_one_line_per_ingredient() {
        let acc = ScoringEngine::default().accumulate(&["Oats", "Water"], Mode::Bulk);
        assert_eq!(acc.log.len(), 3);
        assert_eq!(acc.log[0], "🔎 Analyzing 2 ingredients in BULK mode.");
        assert!(acc.log[1].starts_with("#1 Oats: Carb"));
    }
}
