//! Schema contract handed to the generator as its system prompt.
//!
//! Rendered from the same `DirectiveKind` catalog the validator dispatches
//! on, so kind names and enum values cannot drift between the two.

use std::fmt::Write;

use crate::core::directive::DirectiveKind;
use crate::core::pipeline::validate::MIN_EXPLANATION_CHARS;

const PREAMBLE: &str = "\
You are an AI-native food copilot. Help users make instant health decisions without cognitive load.

INSTRUCTIONS:
1. Analyze the food image and the user context (e.g. \"I am diabetic\").
2. Decide which UI components best explain the situation.
3. Follow the props definition of each component below strictly.
4. Always prioritize reasoning over raw data. Explain why.";

const OUTPUT_RULES: &str = "\
OUTPUT RULES:
- Return ONLY a JSON object with a \"uiComponents\" array.
- Each entry is {\"component\": <name>, \"props\": {...}} using a component name listed below.
- Do not invent new component types. Do not output flat JSON.
- Nested lists must be JSON arrays of objects, never strings.
- Only show the components that are necessary.";

const ORDERING_RULES: &str = "\
ORDERING:
- If there is a danger, return WarningCard first.
- AlternativeSuggestionCard goes immediately after WarningCard.
- EvidenceSources goes immediately after ScienceExplainer, followed by LongTermImpactCard.";

fn use_case(kind: DirectiveKind) -> &'static str {
    match kind {
        DirectiveKind::RiskWarning => {
            "Allergens, conflicts with the user's stated diet, or objectively unhealthy attributes."
        }
        DirectiveKind::PositiveBadge => {
            "Quick positive confirmation when the food aligns with the user's goals. Never alongside a warning."
        }
        DirectiveKind::IngredientTable => {
            "The most impactful nutrients or additives, not every ingredient."
        }
        DirectiveKind::ScienceExplainer => {
            "Educate about complex chemical names or metabolic effects of processing, as one plain paragraph."
        }
        DirectiveKind::AlternativeSuggestions => {
            "1-3 healthier alternatives, only when the verdict is negative."
        }
        DirectiveKind::ProcessingMeter => "NOVA processing classification of the food.",
        DirectiveKind::MacroDistribution => "Visual ratio of carbs, protein and fat in percent.",
        DirectiveKind::FollowUpQuestions => "Anticipate the user's next questions.",
        DirectiveKind::Comparison => "Make an abstract number concrete with a familiar comparison.",
        DirectiveKind::QuickVerdict => "Answer a binary question such as \"Can I eat this?\".",
        DirectiveKind::DosAndDonts => "Foods to prefer and avoid for a condition.",
        DirectiveKind::MethodologySteps => "Explain a process step by step.",
        DirectiveKind::NutritionScore => "Overall 0-100 healthiness rating with a short verdict.",
        DirectiveKind::EvidenceSources => {
            "Authority-backed sources whenever scientific or medical claims are made."
        }
        DirectiveKind::LongTermImpact => "Effects of regular consumption over time.",
    }
}

fn props_shape(kind: DirectiveKind) -> String {
    match kind {
        DirectiveKind::RiskWarning => {
            "{ title: string, severity: 'low' | 'medium' | 'high', reasoning: string, source: string }".into()
        }
        DirectiveKind::PositiveBadge => "{ message: string, variant?: 'success' | 'info' }".into(),
        DirectiveKind::IngredientTable => {
            "{ items: [{ label: string, value: string, status: 'good' | 'bad' }] }".into()
        }
        DirectiveKind::ScienceExplainer => format!(
            "{{ title: string, explanation: string (single paragraph, at least {MIN_EXPLANATION_CHARS} characters) }}"
        ),
        DirectiveKind::AlternativeSuggestions => {
            "{ suggestions: [{ title: string, reason?: string, link?: string }] }".into()
        }
        DirectiveKind::ProcessingMeter => {
            "{ level: 1 | 2 | 3 | 4, title: string, description: string }".into()
        }
        DirectiveKind::MacroDistribution => {
            "{ carbs: number, protein: number, fat: number, calories: number }".into()
        }
        DirectiveKind::FollowUpQuestions => "{ questions: string[] }".into(),
        DirectiveKind::Comparison => {
            "{ nutrient: string, currentValue: string, comparisonText: string, sentiment: 'positive' | 'negative' | 'neutral' }".into()
        }
        DirectiveKind::QuickVerdict => {
            "{ status: 'safe' | 'caution' | 'avoid', title: string, explanation: string, nuanceTag?: string }".into()
        }
        DirectiveKind::DosAndDonts => {
            "{ condition: string, recommended: [{ name: string, reason: string }], avoid: [{ name: string, reason: string }] }".into()
        }
        DirectiveKind::MethodologySteps => {
            "{ title: string, steps: [{ action: string, detail: string, tip?: string }] }".into()
        }
        DirectiveKind::NutritionScore => {
            "{ score: number (0-100), subtitle?: string, feedback?: string }".into()
        }
        DirectiveKind::EvidenceSources => {
            "{ sources: [{ title: string, authority: 'WHO' | 'FDA' | 'ICMR' | 'NIH' | 'Peer-Reviewed', description: string, confidence: number (70-100), url?: string }] }".into()
        }
        DirectiveKind::LongTermImpact => format!(
            "{{ title?: string, impacts: [{{ effect: string, explanation: string (at least {MIN_EXPLANATION_CHARS} characters), severity: 'low' | 'medium' | 'high' }}], timeframe: string }}"
        ),
    }
}

/// Build the generator's system prompt from the directive catalog.
pub fn build_system_prompt() -> String {
    let mut prompt = String::with_capacity(4096);
    prompt.push_str(PREAMBLE);
    prompt.push_str("\n\n");
    prompt.push_str(OUTPUT_RULES);
    prompt.push_str("\n\nCOMPONENTS:\n");
    for (i, kind) in DirectiveKind::ALL.into_iter().enumerate() {
        let _ = writeln!(
            prompt,
            "{}. {}: {}\n   Props: {}",
            i + 1,
            kind.component_name(),
            use_case(kind),
            props_shape(kind)
        );
    }
    prompt.push('\n');
    prompt.push_str(ORDERING_RULES);
    prompt
}
