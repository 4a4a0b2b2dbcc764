//! Keyword classifier for ingredient names
//!
//! Rules are scanned linearly in priority order and the first keyword found
//! inside the normalized name wins. Narrow terms ("whey") sit ahead of broad
//! ones ("protein"), so the table must never be reordered or turned into a map.

use crate::error::{ApexError, ApexResult};
use crate::types::{Category, ClassificationRule, IngredientProfile};
use std::borrow::Cow;
use std::path::Path;

/// Built-in rule table, highest priority first
pub static DEFAULT_RULES: &[ClassificationRule] = &[
    // High quality proteins
    ClassificationRule::new("whey", Category::Protein, 100, 2),
    ClassificationRule::new("casein", Category::Protein, 90, 2),
    ClassificationRule::new("egg white", Category::Protein, 100, 1),
    ClassificationRule::new("beef", Category::Protein, 90, 0),
    // Plant and lower quality proteins
    ClassificationRule::new("soy", Category::Protein, 70, 3),
    ClassificationRule::new("pea", Category::Protein, 75, 4),
    ClassificationRule::new("hemp", Category::Protein, 60, 2),
    ClassificationRule::new("collagen", Category::Protein, 30, 0),
    ClassificationRule::new("gluten", Category::Protein, 25, 8),
    // Carbs and sugars
    ClassificationRule::new("sugar", Category::Carb, 0, 2),
    ClassificationRule::new("syrup", Category::Carb, 0, 3),
    ClassificationRule::new("dextrose", Category::Carb, 0, 1),
    ClassificationRule::new("maltodextrin", Category::Carb, 0, 4),
    ClassificationRule::new("oat", Category::Carb, 0, 1),
    ClassificationRule::new("flour", Category::Carb, 0, 2),
    // Sugar alcohols and fats
    ClassificationRule::new("maltitol", Category::Sweetener, 0, 9),
    ClassificationRule::new("sorbitol", Category::Sweetener, 0, 8),
    ClassificationRule::new("xylitol", Category::Sweetener, 0, 7),
    ClassificationRule::new("palm oil", Category::Fat, 0, 2),
    ClassificationRule::new("vegetable oil", Category::Fat, 0, 4),
    // Generic fallbacks
    ClassificationRule::new("protein", Category::Protein, 60, 2),
    ClassificationRule::new("gum", Category::Additive, 0, 5),
];

/// Strip a two-letter language tag such as `en:` from the front of a name
pub fn strip_language_tag(name: &str) -> &str {
    let bytes = name.as_bytes();
    if bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1].is_ascii_alphabetic()
        && bytes[2] == b':'
    {
        name[3..].trim_start()
    } else {
        name
    }
}

/// Name as it appears in reports: trimmed, untagged, hyphens as spaces, case kept
pub fn display_name(raw: &str) -> String {
    strip_language_tag(raw.trim())
        .replace('-', " ")
        .trim()
        .to_string()
}

/// Name as matched against keywords
pub fn normalize_name(raw: &str) -> String {
    display_name(raw).to_lowercase()
}

/// Immutable, ordered keyword classifier
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<ClassificationRule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Classifier {
    /// Classifier over the built-in table
    pub fn builtin() -> Self {
        Self {
            rules: DEFAULT_RULES.to_vec(),
        }
    }

    /// Classifier over a custom table, kept in the given order
    pub fn with_rules(rules: Vec<ClassificationRule>) -> ApexResult<Self> {
        if rules.is_empty() {
            return Err(ApexError::RuleTable("rule table is empty".to_string()));
        }

        let mut validated = Vec::with_capacity(rules.len());
        for (idx, rule) in rules.into_iter().enumerate() {
            let keyword = rule.keyword.trim().to_lowercase();
            if keyword.is_empty() {
                return Err(ApexError::RuleTable(format!("rule #{} has an empty keyword", idx)));
            }
            if rule.bioavailability > 100 {
                return Err(ApexError::RuleTable(format!(
                    "rule '{}' has bioavailability {} (max 100)",
                    keyword, rule.bioavailability
                )));
            }
            if rule.bloat_risk > 10 {
                return Err(ApexError::RuleTable(format!(
                    "rule '{}' has bloat risk {} (max 10)",
                    keyword, rule.bloat_risk
                )));
            }
            validated.push(ClassificationRule {
                keyword: Cow::Owned(keyword),
                ..rule
            });
        }

        Ok(Self { rules: validated })
    }

    /// Parse a JSON array of rules (priority order) as produced by the curation tooling
    pub fn from_json(json: &str) -> ApexResult<Self> {
        let rules: Vec<ClassificationRule> = serde_json::from_str(json)?;
        Self::with_rules(rules)
    }

    /// Load a rule table from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> ApexResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            ApexError::RuleTable(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// First rule whose keyword occurs in the normalized name
    pub fn matching_rule(&self, name: &str) -> Option<&ClassificationRule> {
        let normalized = normalize_name(name);
        self.rules
            .iter()
            .find(|rule| normalized.contains(rule.keyword.as_ref()))
    }

    /// Classify a free-text ingredient name. Unmatched names fall back to `Other`.
    pub fn classify(&self, name: &str) -> IngredientProfile {
        self.matching_rule(name)
            .map(ClassificationRule::profile)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        assert_eq!(normalize_name("  en:Whey-Protein-Isolate "), "whey protein isolate");
        assert_eq!(normalize_name("FR:sucre"), "sucre");
        assert_eq!(display_name("en:egg-white"), "egg white");
        // Only a two-letter prefix counts as a language tag
        assert_eq!(normalize_name("vitamin:b12"), "vitamin:b12");
    }

    #[test]
    fn test_rule_priority() {
        let classifier = Classifier::builtin();

        let whey = classifier.classify("Whey Protein Concentrate");
        assert_eq!(whey.category, Category::Protein);
        assert_eq!(whey.bioavailability, 100);

        let generic = classifier.classify("Rice Protein");
        assert_eq!(generic.bioavailability, 60);

        assert_eq!(classifier.classify("Maltodextrin").bloat_risk, 4);
        // "sugar" precedes the sugar alcohols
        assert_eq!(classifier.classify("Sugar-free maltitol").category, Category::Carb);
    }

    #[test]
    fn test_default_fallback() {
        let classifier = Classifier::builtin();
        assert_eq!(classifier.classify("Water"), IngredientProfile::default());
        assert_eq!(classifier.classify(""), IngredientProfile::default());
        assert!(classifier.matching_rule("Natural Flavor").is_none());
    }

    #[test]
    fn test_from_json_keeps_order() {
        let json = r#"[
            {"keyword": "Lecithin", "category": "Additive", "bioavailability": 0, "bloat_risk": 1},
            {"keyword": "protein", "category": "Protein", "bioavailability": 60, "bloat_risk": 2}
        ]"#;
        let classifier = Classifier::from_json(json).unwrap();
        assert_eq!(classifier.rules()[0].keyword, "lecithin");
        assert_eq!(classifier.classify("Soy Lecithin").category, Category::Additive);
        assert_eq!(classifier.classify("Pea Protein").category, Category::Protein);
    }

    #[test]
    fn test_from_json_rejects_bad_rules() {
        let too_bloated = r#"[{"keyword": "gum", "category": "Additive", "bioavailability": 0, "bloat_risk": 11}]"#;
        assert!(matches!(
            Classifier::from_json(too_bloated),
            Err(ApexError::RuleTable(_))
        ));

        let empty_keyword = r#"[{"keyword": "  ", "category": "Fat", "bioavailability": 0, "bloat_risk": 0}]"#;
        assert!(Classifier::from_json(empty_keyword).is_err());

        assert!(Classifier::from_json("[]").is_err());
        assert!(matches!(Classifier::from_json("{"), Err(ApexError::Decode(_))));
    }
}
