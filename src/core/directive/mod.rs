mod kind;
mod props;
mod sequence;

pub use kind::DirectiveKind;
pub use props::{
    AlternativeSuggestion, AlternativeSuggestions, Authority, BadgeVariant, Comparison,
    DietaryItem, DosAndDonts, EvidenceSource, EvidenceSources, FollowUpQuestions, Impact,
    IngredientRow, IngredientTable, LongTermImpact, MacroDistribution, MethodStep,
    MethodologySteps, NutritionScore, PositiveBadge, ProcessingMeter, QuickVerdict, RiskWarning,
    RowStatus, ScienceExplainer, Sentiment, Severity, VerdictStatus,
};
pub use sequence::DirectiveSequence;

pub(crate) use props::default_impact_title;

use serde::{Deserialize, Serialize};

/// One validated `{component, props}` unit.
///
/// Values of this type only come out of the validator or the synthesis
/// stage, so holding a `Directive` means its props satisfy the kind's
/// contract. Deserializing one directly skips those checks and is meant for
/// reloading sequences that were already finalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "component", content = "props")]
pub enum Directive {
    #[serde(rename = "WarningCard")]
    RiskWarning(RiskWarning),
    #[serde(rename = "HealthBadge")]
    PositiveBadge(PositiveBadge),
    #[serde(rename = "IngredientTable")]
    IngredientTable(IngredientTable),
    #[serde(rename = "ScienceExplainer")]
    ScienceExplainer(ScienceExplainer),
    #[serde(rename = "AlternativeSuggestionCard")]
    AlternativeSuggestions(AlternativeSuggestions),
    #[serde(rename = "ProcessingMeter")]
    ProcessingMeter(ProcessingMeter),
    #[serde(rename = "MacroDistribution")]
    MacroDistribution(MacroDistribution),
    #[serde(rename = "SmartFollowUp")]
    FollowUpQuestions(FollowUpQuestions),
    #[serde(rename = "ComparisonCard")]
    Comparison(Comparison),
    #[serde(rename = "QuickVerdict")]
    QuickVerdict(QuickVerdict),
    #[serde(rename = "DosAndDontsGrid")]
    DosAndDonts(DosAndDonts),
    #[serde(rename = "MethodologyStepper")]
    MethodologySteps(MethodologySteps),
    #[serde(rename = "NutritionScore")]
    NutritionScore(NutritionScore),
    #[serde(rename = "EvidenceSources")]
    EvidenceSources(EvidenceSources),
    #[serde(rename = "LongTermImpactCard")]
    LongTermImpact(LongTermImpact),
}

impl Directive {
    pub const fn kind(&self) -> DirectiveKind {
        match self {
            Self::RiskWarning(_) => DirectiveKind::RiskWarning,
            Self::PositiveBadge(_) => DirectiveKind::PositiveBadge,
            Self::IngredientTable(_) => DirectiveKind::IngredientTable,
            Self::ScienceExplainer(_) => DirectiveKind::ScienceExplainer,
            Self::AlternativeSuggestions(_) => DirectiveKind::AlternativeSuggestions,
            Self::ProcessingMeter(_) => DirectiveKind::ProcessingMeter,
            Self::MacroDistribution(_) => DirectiveKind::MacroDistribution,
            Self::FollowUpQuestions(_) => DirectiveKind::FollowUpQuestions,
            Self::Comparison(_) => DirectiveKind::Comparison,
            Self::QuickVerdict(_) => DirectiveKind::QuickVerdict,
            Self::DosAndDonts(_) => DirectiveKind::DosAndDonts,
            Self::MethodologySteps(_) => DirectiveKind::MethodologySteps,
            Self::NutritionScore(_) => DirectiveKind::NutritionScore,
            Self::EvidenceSources(_) => DirectiveKind::EvidenceSources,
            Self::LongTermImpact(_) => DirectiveKind::LongTermImpact,
        }
    }

    pub fn is(&self, kind: DirectiveKind) -> bool {
        self.kind() == kind
    }
}
