use serde::{Deserialize, Serialize};
use strum::Display;

/// Closed catalog of directive kinds a generator may emit.
///
/// Each kind has two spellings: a kebab-case tag used in logs and accepted on
/// input, and the component name the generator is told to emit and the
/// renderer keys its widget table on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DirectiveKind {
    RiskWarning,
    PositiveBadge,
    IngredientTable,
    ScienceExplainer,
    AlternativeSuggestions,
    ProcessingMeter,
    MacroDistribution,
    FollowUpQuestions,
    Comparison,
    QuickVerdict,
    DosAndDonts,
    MethodologySteps,
    NutritionScore,
    EvidenceSources,
    LongTermImpact,
}

impl DirectiveKind {
    pub const ALL: [Self; 15] = [
        Self::RiskWarning,
        Self::PositiveBadge,
        Self::IngredientTable,
        Self::ScienceExplainer,
        Self::AlternativeSuggestions,
        Self::ProcessingMeter,
        Self::MacroDistribution,
        Self::FollowUpQuestions,
        Self::Comparison,
        Self::QuickVerdict,
        Self::DosAndDonts,
        Self::MethodologySteps,
        Self::NutritionScore,
        Self::EvidenceSources,
        Self::LongTermImpact,
    ];

    /// Wire name of the widget this kind renders as.
    pub const fn component_name(self) -> &'static str {
        match self {
            Self::RiskWarning => "WarningCard",
            Self::PositiveBadge => "HealthBadge",
            Self::IngredientTable => "IngredientTable",
            Self::ScienceExplainer => "ScienceExplainer",
            Self::AlternativeSuggestions => "AlternativeSuggestionCard",
            Self::ProcessingMeter => "ProcessingMeter",
            Self::MacroDistribution => "MacroDistribution",
            Self::FollowUpQuestions => "SmartFollowUp",
            Self::Comparison => "ComparisonCard",
            Self::QuickVerdict => "QuickVerdict",
            Self::DosAndDonts => "DosAndDontsGrid",
            Self::MethodologySteps => "MethodologyStepper",
            Self::NutritionScore => "NutritionScore",
            Self::EvidenceSources => "EvidenceSources",
            Self::LongTermImpact => "LongTermImpactCard",
        }
    }

    /// Resolve either spelling. Component names match exactly, tags match
    /// case-insensitively. Anything else is outside the catalog.
    pub fn lookup(name: &str) -> Option<Self> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return None;
        }
        Self::ALL.into_iter().find(|kind| {
            kind.component_name() == trimmed || kind.to_string().eq_ignore_ascii_case(trimmed)
        })
    }

    /// Props fields that carry nested collections and may arrive as
    /// JSON-encoded strings.
    pub const fn nested_collection_fields(self) -> &'static [&'static str] {
        match self {
            Self::IngredientTable => &["items"],
            Self::AlternativeSuggestions => &["suggestions"],
            Self::DosAndDonts => &["recommended", "avoid"],
            Self::MethodologySteps => &["steps"],
            Self::EvidenceSources => &["sources"],
            Self::LongTermImpact => &["impacts"],
            _ => &[],
        }
    }
}
