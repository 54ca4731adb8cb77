//! Typed props records, one per directive kind.
//!
//! Field names serialize in camelCase, matching what the generator emits and
//! what the renderer consumes.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use strum::Display;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BadgeVariant {
    #[default]
    Success,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RowStatus {
    Good,
    Bad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VerdictStatus {
    Safe,
    Caution,
    Avoid,
}

/// Bodies an evidence source may be attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Authority {
    #[serde(rename = "WHO")]
    #[strum(serialize = "WHO")]
    Who,
    #[serde(rename = "FDA")]
    #[strum(serialize = "FDA")]
    Fda,
    #[serde(rename = "ICMR")]
    #[strum(serialize = "ICMR")]
    Icmr,
    #[serde(rename = "NIH")]
    #[strum(serialize = "NIH")]
    Nih,
    #[serde(rename = "Peer-Reviewed")]
    #[strum(serialize = "Peer-Reviewed")]
    PeerReviewed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskWarning {
    pub title: String,
    pub severity: Severity,
    pub reasoning: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositiveBadge {
    pub message: String,
    #[serde(default)]
    pub variant: BadgeVariant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientTable {
    pub items: Vec<IngredientRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientRow {
    pub label: String,
    pub value: String,
    pub status: RowStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScienceExplainer {
    pub title: String,
    // Generators commonly spell it "explaination".
    #[serde(alias = "explaination")]
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternativeSuggestions {
    pub suggestions: Vec<AlternativeSuggestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternativeSuggestion {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingMeter {
    /// NOVA group, 1 (unprocessed) to 4 (ultra-processed).
    #[serde(deserialize_with = "whole_number")]
    pub level: u8,
    pub title: String,
    pub description: String,
}

/// Accepts any JSON number with no fractional part, so `4` and `4.0` agree.
#[allow(clippy::float_cmp, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let raw = f64::deserialize(deserializer)?;
    if raw.fract() != 0.0 || !(0.0..=f64::from(u8::MAX)).contains(&raw) {
        return Err(D::Error::custom(format!("expected a whole number, got {raw}")));
    }
    Ok(raw as u8)
}

/// Macro split in percent plus total energy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroDistribution {
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
    pub calories: f64,
}

impl MacroDistribution {
    /// Sum of the three macros; a zero total counts as 1.
    fn macro_total(&self) -> f64 {
        let total = self.carbs + self.protein + self.fat;
        if total.abs() < f64::EPSILON { 1.0 } else { total }
    }

    /// Carbohydrates make up strictly more than `percent` of the macro total.
    ///
    /// Compared by cross-multiplying so a split sitting exactly on the
    /// threshold never crosses it through division rounding.
    pub fn carbs_share_exceeds(&self, percent: f64) -> bool {
        self.carbs * 100.0 > percent * self.macro_total()
    }

    /// Protein makes up strictly less than `percent` of the macro total.
    pub fn protein_share_below(&self, percent: f64) -> bool {
        self.protein * 100.0 < percent * self.macro_total()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpQuestions {
    pub questions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub nutrient: String,
    pub current_value: String,
    pub comparison_text: String,
    pub sentiment: Sentiment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickVerdict {
    pub status: VerdictStatus,
    pub title: String,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nuance_tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DosAndDonts {
    pub condition: String,
    pub recommended: Vec<DietaryItem>,
    pub avoid: Vec<DietaryItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietaryItem {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodologySteps {
    pub title: String,
    pub steps: Vec<MethodStep>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodStep {
    pub action: String,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionScore {
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceSources {
    pub sources: Vec<EvidenceSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceSource {
    pub title: String,
    pub authority: Authority,
    pub description: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongTermImpact {
    #[serde(default = "default_impact_title")]
    pub title: String,
    pub impacts: Vec<Impact>,
    pub timeframe: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Impact {
    pub effect: String,
    pub explanation: String,
    pub severity: Severity,
}

pub(crate) fn default_impact_title() -> String {
    "Long-Term Health Impact".into()
}
