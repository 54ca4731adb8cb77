//! Per-kind contract checks. Fail-closed: a directive that violates its
//! contract is dropped whole and never reaches the renderer.

use std::ops::RangeInclusive;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};
use thiserror::Error;

use super::normalize::NormalizedDirective;
use crate::core::directive::{
    AlternativeSuggestion, AlternativeSuggestions, DietaryItem, Directive, DirectiveKind, DosAndDonts,
    EvidenceSource, EvidenceSources, FollowUpQuestions, Impact, IngredientRow, IngredientTable,
    LongTermImpact, MacroDistribution, MethodStep, MethodologySteps, NutritionScore,
    PositiveBadge, ProcessingMeter, QuickVerdict, RiskWarning, ScienceExplainer,
    default_impact_title,
};

pub const MIN_EXPLANATION_CHARS: usize = 30;
pub const CONFIDENCE_RANGE: RangeInclusive<f64> = 70.0..=100.0;
const PERCENT_RANGE: RangeInclusive<f64> = 0.0..=100.0;
const NOVA_LEVELS: RangeInclusive<u8> = 1..=4;

/// What to do with a malformed row inside a list-valued prop.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RowPolicy {
    /// Any bad row rejects the whole directive.
    #[default]
    RejectDirective,
    /// Bad rows are removed; the directive survives if any row remains.
    FilterRows,
}

/// Why a candidate directive was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("unknown directive kind `{0}`")]
    UnknownKind(String),

    #[error("props do not match the contract: {0}")]
    Malformed(String),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` has the wrong shape: {detail}")]
    InvalidField { field: &'static str, detail: String },

    #[error("field `{0}` must not be empty")]
    Empty(&'static str),

    #[error("field `{field}` must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("field `{0}` is out of range")]
    OutOfRange(&'static str),

    #[error("field `{0}` must be a single paragraph")]
    NotParagraph(&'static str),

    #[error("row {index} of `{field}`: {reason}")]
    Row {
        field: &'static str,
        index: usize,
        reason: Box<ContractViolation>,
    },
}

impl ContractViolation {
    /// Stable machine-readable code for logs and metrics.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownKind(_) => "unknown_kind",
            Self::Malformed(_) => "malformed",
            Self::MissingField(_) => "missing_field",
            Self::InvalidField { .. } => "invalid_field",
            Self::Empty(_) => "empty",
            Self::TooShort { .. } => "too_short",
            Self::OutOfRange(_) => "out_of_range",
            Self::NotParagraph(_) => "not_paragraph",
            Self::Row { .. } => "invalid_row",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Index of the candidate in the generator's output.
    pub position: usize,
    pub component: String,
    pub violation: ContractViolation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilteredRows {
    pub kind: DirectiveKind,
    pub field: &'static str,
    pub dropped: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub accepted: Vec<Directive>,
    pub rejected: Vec<Rejection>,
    pub filtered: Vec<FilteredRows>,
}

/// Keep the candidates whose kind is in the catalog and whose props satisfy
/// that kind's contract, in their original order.
pub fn validate(candidates: Vec<NormalizedDirective>, policy: RowPolicy) -> ValidationReport {
    let mut report = ValidationReport::default();
    for (position, candidate) in candidates.into_iter().enumerate() {
        let mut rows = RowContext {
            policy,
            filtered: Vec::new(),
        };
        let outcome = match DirectiveKind::lookup(&candidate.component) {
            Some(kind) => validate_props(kind, &candidate.props, &mut rows),
            None => Err(ContractViolation::UnknownKind(candidate.component.clone())),
        };
        match outcome {
            Ok(directive) => {
                let kind = directive.kind();
                report
                    .filtered
                    .extend(rows.filtered.into_iter().map(|(field, dropped)| FilteredRows {
                        kind,
                        field,
                        dropped,
                    }));
                report.accepted.push(directive);
            }
            Err(violation) => report.rejected.push(Rejection {
                position,
                component: candidate.component,
                violation,
            }),
        }
    }
    report
}

/// Validate one props record against a kind's contract.
pub fn validate_directive(
    kind: DirectiveKind,
    props: &Map<String, Value>,
    policy: RowPolicy,
) -> Result<Directive, ContractViolation> {
    let mut rows = RowContext {
        policy,
        filtered: Vec::new(),
    };
    validate_props(kind, props, &mut rows)
}

struct RowContext {
    policy: RowPolicy,
    filtered: Vec<(&'static str, usize)>,
}

fn validate_props(
    kind: DirectiveKind,
    props: &Map<String, Value>,
    rows: &mut RowContext,
) -> Result<Directive, ContractViolation> {
    match kind {
        DirectiveKind::RiskWarning => risk_warning(props).map(Directive::RiskWarning),
        DirectiveKind::PositiveBadge => positive_badge(props).map(Directive::PositiveBadge),
        DirectiveKind::IngredientTable => {
            ingredient_table(props, rows).map(Directive::IngredientTable)
        }
        DirectiveKind::ScienceExplainer => {
            science_explainer(props).map(Directive::ScienceExplainer)
        }
        DirectiveKind::AlternativeSuggestions => {
            alternative_suggestions(props, rows).map(Directive::AlternativeSuggestions)
        }
        DirectiveKind::ProcessingMeter => processing_meter(props).map(Directive::ProcessingMeter),
        DirectiveKind::MacroDistribution => {
            macro_distribution(props).map(Directive::MacroDistribution)
        }
        DirectiveKind::FollowUpQuestions => {
            follow_up_questions(props).map(Directive::FollowUpQuestions)
        }
        DirectiveKind::Comparison => decode(props).map(Directive::Comparison),
        DirectiveKind::QuickVerdict => quick_verdict(props).map(Directive::QuickVerdict),
        DirectiveKind::DosAndDonts => dos_and_donts(props, rows).map(Directive::DosAndDonts),
        DirectiveKind::MethodologySteps => {
            methodology_steps(props, rows).map(Directive::MethodologySteps)
        }
        DirectiveKind::NutritionScore => nutrition_score(props).map(Directive::NutritionScore),
        DirectiveKind::EvidenceSources => {
            evidence_sources(props, rows).map(Directive::EvidenceSources)
        }
        DirectiveKind::LongTermImpact => {
            long_term_impact(props, rows).map(Directive::LongTermImpact)
        }
    }
}

// ── Contracts ────────────────────────────────────────────────────────────────

fn risk_warning(props: &Map<String, Value>) -> Result<RiskWarning, ContractViolation> {
    let warning: RiskWarning = decode(props)?;
    non_empty("title", &warning.title)?;
    non_empty("reasoning", &warning.reasoning)?;
    Ok(warning)
}

fn positive_badge(props: &Map<String, Value>) -> Result<PositiveBadge, ContractViolation> {
    let badge: PositiveBadge = decode(props)?;
    non_empty("message", &badge.message)?;
    Ok(badge)
}

fn ingredient_table(
    props: &Map<String, Value>,
    rows: &mut RowContext,
) -> Result<IngredientTable, ContractViolation> {
    let items = rows.collect(props, "items", false, |row: &IngredientRow| {
        non_empty("label", &row.label)
    })?;
    Ok(IngredientTable { items })
}

fn science_explainer(props: &Map<String, Value>) -> Result<ScienceExplainer, ContractViolation> {
    // With both spellings present, `explanation` wins over the misspelling.
    let explainer: ScienceExplainer = if props.contains_key("explanation") {
        let mut props = props.clone();
        props.remove("explaination");
        decode(&props)?
    } else {
        decode(props)?
    };
    non_empty("title", &explainer.title)?;
    min_chars("explanation", &explainer.explanation, MIN_EXPLANATION_CHARS)?;
    single_paragraph("explanation", &explainer.explanation)?;
    Ok(explainer)
}

fn alternative_suggestions(
    props: &Map<String, Value>,
    rows: &mut RowContext,
) -> Result<AlternativeSuggestions, ContractViolation> {
    let suggestions = rows.collect(props, "suggestions", false, |s: &AlternativeSuggestion| {
        non_empty("title", &s.title)
    })?;
    Ok(AlternativeSuggestions { suggestions })
}

fn processing_meter(props: &Map<String, Value>) -> Result<ProcessingMeter, ContractViolation> {
    let meter: ProcessingMeter = decode(props)?;
    if !NOVA_LEVELS.contains(&meter.level) {
        return Err(ContractViolation::OutOfRange("level"));
    }
    non_empty("title", &meter.title)?;
    Ok(meter)
}

fn macro_distribution(props: &Map<String, Value>) -> Result<MacroDistribution, ContractViolation> {
    let macros: MacroDistribution = decode(props)?;
    in_range("carbs", macros.carbs, &PERCENT_RANGE)?;
    in_range("protein", macros.protein, &PERCENT_RANGE)?;
    in_range("fat", macros.fat, &PERCENT_RANGE)?;
    if !macros.calories.is_finite() || macros.calories < 0.0 {
        return Err(ContractViolation::OutOfRange("calories"));
    }
    Ok(macros)
}

fn follow_up_questions(
    props: &Map<String, Value>,
) -> Result<FollowUpQuestions, ContractViolation> {
    let follow_up: FollowUpQuestions = decode(props)?;
    if follow_up.questions.is_empty() {
        return Err(ContractViolation::Empty("questions"));
    }
    for question in &follow_up.questions {
        non_empty("questions", question)?;
    }
    Ok(follow_up)
}

fn quick_verdict(props: &Map<String, Value>) -> Result<QuickVerdict, ContractViolation> {
    let verdict: QuickVerdict = decode(props)?;
    non_empty("title", &verdict.title)?;
    non_empty("explanation", &verdict.explanation)?;
    Ok(verdict)
}

fn dos_and_donts(
    props: &Map<String, Value>,
    rows: &mut RowContext,
) -> Result<DosAndDonts, ContractViolation> {
    let condition: String = field(props, "condition")?;
    non_empty("condition", &condition)?;
    let named = |item: &DietaryItem| non_empty("name", &item.name);
    let recommended = rows.collect(props, "recommended", true, named)?;
    let avoid = rows.collect(props, "avoid", true, named)?;
    if recommended.is_empty() && avoid.is_empty() {
        return Err(ContractViolation::Empty("recommended"));
    }
    Ok(DosAndDonts {
        condition,
        recommended,
        avoid,
    })
}

fn methodology_steps(
    props: &Map<String, Value>,
    rows: &mut RowContext,
) -> Result<MethodologySteps, ContractViolation> {
    let title: String = field(props, "title")?;
    non_empty("title", &title)?;
    let steps = rows.collect(props, "steps", false, |step: &MethodStep| {
        non_empty("action", &step.action)?;
        non_empty("detail", &step.detail)
    })?;
    Ok(MethodologySteps { title, steps })
}

fn nutrition_score(props: &Map<String, Value>) -> Result<NutritionScore, ContractViolation> {
    let score: NutritionScore = decode(props)?;
    in_range("score", score.score, &PERCENT_RANGE)?;
    Ok(score)
}

fn evidence_sources(
    props: &Map<String, Value>,
    rows: &mut RowContext,
) -> Result<EvidenceSources, ContractViolation> {
    let sources = rows.collect(props, "sources", false, |source: &EvidenceSource| {
        non_empty("title", &source.title)?;
        non_empty("description", &source.description)?;
        in_range("confidence", source.confidence, &CONFIDENCE_RANGE)
    })?;
    Ok(EvidenceSources { sources })
}

fn long_term_impact(
    props: &Map<String, Value>,
    rows: &mut RowContext,
) -> Result<LongTermImpact, ContractViolation> {
    let title = optional_field::<String>(props, "title")?
        .unwrap_or_else(default_impact_title);
    let timeframe: String = field(props, "timeframe")?;
    let impacts = rows.collect(props, "impacts", false, |impact: &Impact| {
        non_empty("effect", &impact.effect)?;
        min_chars("explanation", &impact.explanation, MIN_EXPLANATION_CHARS)
    })?;
    Ok(LongTermImpact {
        title,
        impacts,
        timeframe,
    })
}

// ── Field helpers ────────────────────────────────────────────────────────────

fn decode<T: DeserializeOwned>(props: &Map<String, Value>) -> Result<T, ContractViolation> {
    serde_json::from_value(Value::Object(props.clone()))
        .map_err(|e| ContractViolation::Malformed(e.to_string()))
}

fn field<T: DeserializeOwned>(
    props: &Map<String, Value>,
    name: &'static str,
) -> Result<T, ContractViolation> {
    optional_field(props, name)?.ok_or(ContractViolation::MissingField(name))
}

fn optional_field<T: DeserializeOwned>(
    props: &Map<String, Value>,
    name: &'static str,
) -> Result<Option<T>, ContractViolation> {
    match props.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| ContractViolation::InvalidField {
                field: name,
                detail: e.to_string(),
            }),
    }
}

fn non_empty(field: &'static str, text: &str) -> Result<(), ContractViolation> {
    if text.trim().is_empty() {
        Err(ContractViolation::Empty(field))
    } else {
        Ok(())
    }
}

fn min_chars(field: &'static str, text: &str, min: usize) -> Result<(), ContractViolation> {
    if text.trim().chars().count() < min {
        Err(ContractViolation::TooShort { field, min })
    } else {
        Ok(())
    }
}

fn in_range(
    field: &'static str,
    value: f64,
    range: &RangeInclusive<f64>,
) -> Result<(), ContractViolation> {
    if value.is_finite() && range.contains(&value) {
        Ok(())
    } else {
        Err(ContractViolation::OutOfRange(field))
    }
}

/// Rejects text broken into paragraphs or laid out as a bulleted/numbered list.
fn single_paragraph(field: &'static str, text: &str) -> Result<(), ContractViolation> {
    let lines: Vec<&str> = text.trim().lines().map(str::trim).collect();
    let has_break = lines.iter().any(|line| line.is_empty());
    let list_lines = lines.iter().filter(|line| is_list_marker(line)).count();
    if has_break || list_lines >= 2 {
        Err(ContractViolation::NotParagraph(field))
    } else {
        Ok(())
    }
}

fn is_list_marker(line: &str) -> bool {
    if line.starts_with("- ") || line.starts_with("* ") || line.starts_with("• ") {
        return true;
    }
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && matches!(line[digits..].chars().next(), Some('.' | ')'))
}

impl RowContext {
    /// Decode and check each row of a list-valued prop under the row policy.
    fn collect<T, F>(
        &mut self,
        props: &Map<String, Value>,
        field: &'static str,
        allow_empty: bool,
        check: F,
    ) -> Result<Vec<T>, ContractViolation>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> Result<(), ContractViolation>,
    {
        let raw = match props.get(field) {
            None | Some(Value::Null) => return Err(ContractViolation::MissingField(field)),
            Some(Value::Array(raw)) => raw,
            Some(_) => {
                return Err(ContractViolation::InvalidField {
                    field,
                    detail: "expected a list".into(),
                });
            }
        };

        let mut kept = Vec::with_capacity(raw.len());
        let mut dropped = 0;
        for (index, value) in raw.iter().enumerate() {
            let row = serde_json::from_value::<T>(value.clone())
                .map_err(|e| ContractViolation::Malformed(e.to_string()))
                .and_then(|row| check(&row).map(|()| row));
            match (row, self.policy) {
                (Ok(row), _) => kept.push(row),
                (Err(_), RowPolicy::FilterRows) => dropped += 1,
                (Err(reason), RowPolicy::RejectDirective) => {
                    return Err(ContractViolation::Row {
                        field,
                        index,
                        reason: Box::new(reason),
                    });
                }
            }
        }

        if dropped > 0 {
            self.filtered.push((field, dropped));
        }
        if kept.is_empty() && !(allow_empty && raw.is_empty()) {
            return Err(ContractViolation::Empty(field));
        }
        Ok(kept)
    }
}
