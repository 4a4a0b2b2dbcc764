//! Core type definitions for ingredient scoring

use serde::{Deserialize, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;

/// Semantic category assigned to an ingredient by the classifier
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Category {
    Protein,
    Carb,
    Fat,
    Sweetener,
    Additive,
    Other,
}

impl Category {
    /// Categories that land in the "low quality" bucket when nothing else flagged them
    pub fn is_concern(self) -> bool {
        matches!(
            self,
            Category::Fat | Category::Sweetener | Category::Additive | Category::Carb
        )
    }

    /// Categories penalized in CUT mode
    pub fn is_sugar_or_carb(self) -> bool {
        matches!(self, Category::Carb | Category::Sweetener)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Protein => "Protein",
            Category::Carb => "Carb",
            Category::Fat => "Fat",
            Category::Sweetener => "Sweetener",
            Category::Additive => "Additive",
            Category::Other => "Other",
        };
        f.write_str(s)
    }
}

/// Usage context that decides which contextual rules apply
#[derive(Debug, Clone, Copy, Default, Hash, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Bulk,
    Cut,
}

impl Mode {
    /// Strict, case-insensitive parse. Returns `None` for anything but BULK/CUT.
    pub fn parse(raw: &str) -> Option<Mode> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "BULK" => Some(Mode::Bulk),
            "CUT" => Some(Mode::Cut),
            _ => None,
        }
    }

    /// Parse a mode from an optional request field, falling back to BULK
    pub fn parse_lossy(raw: Option<&str>) -> Mode {
        match raw {
            None => Mode::Bulk,
            Some(value) => Mode::parse(value).unwrap_or_else(|| {
                tracing::warn!("Unrecognized mode '{}', falling back to BULK", value);
                Mode::Bulk
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Bulk => "BULK",
            Mode::Cut => "CUT",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discrete quality tier derived from the clamped final score.
/// Serializes as its display label.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Verdict {
    ApexFuel,
    SolidChoice,
    Mediocre,
    Trash,
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Verdict::ApexFuel => "🏆 Apex Fuel",
            Verdict::SolidChoice => "✅ Solid Choice",
            Verdict::Mediocre => "⚠️ Mediocre",
            Verdict::Trash => "❌ Trash",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Verdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One entry of the prioritized keyword table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRule {
    pub keyword: Cow<'static, str>,
    pub category: Category,
    pub bioavailability: u8, // 0-100
    pub bloat_risk: u8,      // 0-10
}

impl ClassificationRule {
    pub const fn new(
        keyword: &'static str,
        category: Category,
        bioavailability: u8,
        bloat_risk: u8,
    ) -> Self {
        Self {
            keyword: Cow::Borrowed(keyword),
            category,
            bioavailability,
            bloat_risk,
        }
    }

    pub fn profile(&self) -> IngredientProfile {
        IngredientProfile {
            category: self.category,
            bioavailability: self.bioavailability,
            bloat_risk: self.bloat_risk,
        }
    }
}

/// Classification output for a single ingredient name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngredientProfile {
    pub category: Category,
    pub bioavailability: u8,
    pub bloat_risk: u8,
}

impl Default for IngredientProfile {
    fn default() -> Self {
        Self {
            category: Category::Other,
            bioavailability: 0,
            bloat_risk: 0,
        }
    }
}

/// Ingredient after classification and weighting (lives for one scoring call)
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedIngredient {
    pub raw_name: String,
    pub display_name: String,
    pub profile: IngredientProfile,
    pub position_weight: f64,
}

/// Final, immutable scoring result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub final_score: f64,
    pub verdict: Verdict,
    pub good_ingredients: Vec<String>,
    pub bad_ingredients: Vec<String>,
    pub warnings: Vec<String>,
    pub analysis_log: Vec<String>,
}

/// Product details as returned by an external lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub product_name: String,
    pub brand: String,
    pub image_url: String,
    pub ingredients: Vec<String>,  // cleaned tags, in label order
    pub ingredients_text: String,  // raw label text
}

impl ProductInfo {
    /// Ingredient sequence to score: the cleaned tags, or the raw text split on commas
    pub fn ingredient_list(&self) -> Vec<String> {
        if !self.ingredients.is_empty() {
            return self.ingredients.clone();
        }

        self.ingredients_text
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Cached product row, keyed by barcode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub barcode: String,
    pub name: String,
    pub brand: String,
    pub image_url: String,
    pub ingredients_text: String, // comma-joined ingredient list
    pub apex_score: f64,
    pub last_updated: chrono::DateTime<chrono::Utc>,
}

/// Where a product response was served from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductOrigin {
    Cache,
    Live,
}

/// Response of a barcode lookup
#[derive(Debug, Clone, Serialize)]
pub struct ProductResponse {
    #[serde(flatten)]
    pub record: ProductRecord,
    pub source: ProductOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ScoreResult>,
}
