//! Cross-directive risk policy.
//!
//! Issue detection is a single ordered rule table evaluated once per
//! directive. The policy then guarantees that an active risk is always
//! announced by exactly one warning, never sits next to a positive badge,
//! and always comes with something the user can do about it.

use std::fmt;

use serde::Serialize;

use crate::core::directive::{
    AlternativeSuggestion, AlternativeSuggestions, Directive, DirectiveKind, RiskWarning,
    RowStatus, Sentiment, Severity,
};

pub const SYNTHESIZED_WARNING_TITLE: &str = "Potential Health Concerns";
pub const AUTO_CHECK_SOURCE: &str = "Auto-checker";
pub const CARB_RATIO_LIMIT: f64 = 55.0;
const REASONING_ISSUES: usize = 3;
const MAX_REMEDIES: usize = 3;

/// Internal risk-signal tag. Never rendered on its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Issue(String);

impl Issue {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn mentions(&self, needle: &str) -> bool {
        self.0.to_lowercase().contains(needle)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Issues in first-detection order, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IssueSet(Vec<Issue>);

impl IssueSet {
    pub fn insert(&mut self, issue: Issue) -> bool {
        if self.0.contains(&issue) {
            return false;
        }
        self.0.push(issue);
        true
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Issue> {
        self.0.iter()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|issue| issue.as_str() == tag)
    }
}

impl Extend<Issue> for IssueSet {
    fn extend<T: IntoIterator<Item = Issue>>(&mut self, iter: T) {
        for issue in iter {
            self.insert(issue);
        }
    }
}

impl<'a> IntoIterator for &'a IssueSet {
    type Item = &'a Issue;
    type IntoIter = std::slice::Iter<'a, Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ── Rule table ───────────────────────────────────────────────────────────────

/// One predicate from a directive to the issues it raises.
pub struct IssueRule {
    pub id: &'static str,
    detect: fn(&Directive) -> Vec<Issue>,
}

impl IssueRule {
    pub fn detect(&self, directive: &Directive) -> Vec<Issue> {
        (self.detect)(directive)
    }
}

pub const ISSUE_RULES: &[IssueRule] = &[
    IssueRule {
        id: "bad_ingredients",
        detect: bad_ingredients,
    },
    IssueRule {
        id: "carb_ratio",
        detect: carb_ratio,
    },
    IssueRule {
        id: "ultra_processed",
        detect: ultra_processed,
    },
    IssueRule {
        id: "negative_comparison",
        detect: negative_comparison,
    },
    IssueRule {
        id: "sodium",
        detect: sodium,
    },
];

fn bad_ingredients(directive: &Directive) -> Vec<Issue> {
    let Directive::IngredientTable(table) = directive else {
        return Vec::new();
    };
    table
        .items
        .iter()
        .filter(|row| row.status == RowStatus::Bad)
        .map(|row| Issue::new(row.label.trim()))
        .collect()
}

fn carb_ratio(directive: &Directive) -> Vec<Issue> {
    match directive {
        Directive::MacroDistribution(macros) if macros.carbs_share_exceeds(CARB_RATIO_LIMIT) => {
            vec![Issue::new("High carbohydrate ratio")]
        }
        _ => Vec::new(),
    }
}

fn ultra_processed(directive: &Directive) -> Vec<Issue> {
    match directive {
        Directive::ProcessingMeter(meter) if meter.level >= 4 => {
            vec![Issue::new(format!("Ultra-processed (NOVA {})", meter.level))]
        }
        _ => Vec::new(),
    }
}

fn negative_comparison(directive: &Directive) -> Vec<Issue> {
    match directive {
        Directive::Comparison(cmp) if cmp.sentiment == Sentiment::Negative => {
            let nutrient = cmp.nutrient.trim();
            let tag = if nutrient.is_empty() {
                "Unfavorable comparison"
            } else {
                nutrient
            };
            vec![Issue::new(tag)]
        }
        _ => Vec::new(),
    }
}

fn sodium(directive: &Directive) -> Vec<Issue> {
    let Directive::IngredientTable(table) = directive else {
        return Vec::new();
    };
    let salty = table.items.iter().any(|row| {
        let label = row.label.to_lowercase();
        label.contains("sodium") || label.contains("salt")
    });
    if salty {
        vec![Issue::new("High sodium")]
    } else {
        Vec::new()
    }
}

/// Run every rule over every directive, in sequence order then table order.
pub fn detect_issues(directives: &[Directive]) -> IssueSet {
    let mut issues = IssueSet::default();
    for directive in directives {
        for rule in ISSUE_RULES {
            issues.extend(rule.detect(directive));
        }
    }
    issues
}

// ── Remediation table ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remedy {
    pub title: &'static str,
    pub reason: &'static str,
}

impl Remedy {
    fn suggestion(self) -> AlternativeSuggestion {
        AlternativeSuggestion {
            title: self.title.to_string(),
            reason: Some(self.reason.to_string()),
            link: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemediationCategory {
    Carbohydrate,
    Sodium,
    Processing,
}

impl RemediationCategory {
    pub const ALL: [Self; 3] = [Self::Carbohydrate, Self::Sodium, Self::Processing];

    const fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Carbohydrate => &["carb"],
            Self::Sodium => &["sodium", "salt"],
            Self::Processing => &["ultra-processed", "nova 4"],
        }
    }

    pub const fn remedies(self) -> &'static [Remedy] {
        match self {
            Self::Carbohydrate => &[
                Remedy {
                    title: "Whole-grain or vegetable noodles",
                    reason: "Lower refined carbs and higher fiber",
                },
                Remedy {
                    title: "Spiralized zucchini or shirataki noodles",
                    reason: "Very low-carb noodle alternatives",
                },
                Remedy {
                    title: "Half-portion of noodles + extra veggies",
                    reason: "Reduce carbs while keeping volume",
                },
            ],
            Self::Sodium => &[
                Remedy {
                    title: "Make a low-sodium sauce",
                    reason: "Reduces overall sodium while preserving flavor",
                },
                Remedy {
                    title: "Use fresh herbs and citrus instead of salt",
                    reason: "Boosts flavor without sodium",
                },
            ],
            Self::Processing => &[
                Remedy {
                    title: "Homemade stir-fry with fresh ingredients",
                    reason: "Minimizes ultra-processed components",
                },
                Remedy {
                    title: "Use minimally processed proteins (tofu, chicken breast)",
                    reason: "Lower additives and preservatives",
                },
            ],
        }
    }

    pub fn matches(self, issues: &IssueSet) -> bool {
        issues
            .iter()
            .any(|issue| self.keywords().iter().any(|kw| issue.mentions(kw)))
    }
}

pub const GENERIC_REMEDIES: &[Remedy] = &[
    Remedy {
        title: "Grilled lean protein option",
        reason: "Lower in saturated fat and calories",
    },
    Remedy {
        title: "Increase vegetables or side salad",
        reason: "Adds fiber and micronutrients",
    },
    Remedy {
        title: "Swap sugary drinks for water or herbal tea",
        reason: "Reduces added sugars and calories",
    },
];

/// Pick up to three remedies, taking one from each matched category per
/// round so that every matched category is represented.
pub fn remedies_for(issues: &IssueSet) -> Vec<Remedy> {
    let matched: Vec<&[Remedy]> = RemediationCategory::ALL
        .into_iter()
        .filter(|category| category.matches(issues))
        .map(RemediationCategory::remedies)
        .collect();
    if matched.is_empty() {
        return GENERIC_REMEDIES.to_vec();
    }

    let rounds = matched.iter().map(|r| r.len()).max().unwrap_or(0);
    (0..rounds)
        .flat_map(|round| matched.iter().filter_map(move |r| r.get(round).copied()))
        .take(MAX_REMEDIES)
        .collect()
}

// ── Policy ───────────────────────────────────────────────────────────────────

/// What the policy changed, for observability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SynthesisActions {
    pub warning_synthesized: bool,
    /// Number of generator warnings folded into the first one.
    pub warnings_merged: usize,
    pub badges_suppressed: usize,
    /// Suggestions in the synthesized remediation directive, zero when none was added.
    pub remediation_suggestions: usize,
}

#[derive(Debug, Clone)]
pub struct Synthesis {
    pub sequence: Vec<Directive>,
    pub issues: IssueSet,
    pub actions: SynthesisActions,
}

/// Apply the risk policy to a validated sequence.
pub fn synthesize(directives: Vec<Directive>) -> Synthesis {
    let mut actions = SynthesisActions::default();
    let (mut sequence, merged) = merge_warnings(directives);
    actions.warnings_merged = merged;

    let issues = detect_issues(&sequence);
    let mut has_warning = sequence.iter().any(|d| d.is(DirectiveKind::RiskWarning));

    if !has_warning && !issues.is_empty() {
        sequence.insert(0, Directive::RiskWarning(synthesized_warning(&issues)));
        actions.warning_synthesized = true;
        has_warning = true;
    }

    if has_warning {
        let before = sequence.len();
        sequence.retain(|d| !d.is(DirectiveKind::PositiveBadge));
        actions.badges_suppressed = before - sequence.len();

        if !sequence.iter().any(|d| d.is(DirectiveKind::AlternativeSuggestions)) {
            let suggestions: Vec<AlternativeSuggestion> = remedies_for(&issues)
                .into_iter()
                .map(Remedy::suggestion)
                .collect();
            actions.remediation_suggestions = suggestions.len();
            let at = sequence
                .iter()
                .position(|d| d.is(DirectiveKind::RiskWarning))
                .map_or(0, |i| i + 1);
            sequence.insert(
                at,
                Directive::AlternativeSuggestions(AlternativeSuggestions { suggestions }),
            );
        }
    }

    Synthesis {
        sequence,
        issues,
        actions,
    }
}

fn synthesized_warning(issues: &IssueSet) -> RiskWarning {
    let listed: Vec<&str> = issues
        .iter()
        .take(REASONING_ISSUES)
        .map(Issue::as_str)
        .collect();
    RiskWarning {
        title: SYNTHESIZED_WARNING_TITLE.to_string(),
        severity: Severity::High,
        reasoning: format!("Detected potential concerns: {}.", listed.join(", ")),
        source: AUTO_CHECK_SOURCE.to_string(),
    }
}

/// Fold every risk warning into the first one, in place. Returns the
/// sequence and how many warnings were folded away.
pub fn merge_warnings(directives: Vec<Directive>) -> (Vec<Directive>, usize) {
    let mut merged: Option<(usize, RiskWarning)> = None;
    let mut rest = Vec::with_capacity(directives.len());
    let mut folded = 0;

    for directive in directives {
        match directive {
            Directive::RiskWarning(warning) => match merged.as_mut() {
                None => {
                    merged = Some((rest.len(), warning));
                }
                Some((_, first)) => {
                    fold_warning(first, warning);
                    folded += 1;
                }
            },
            other => rest.push(other),
        }
    }

    if let Some((at, warning)) = merged {
        rest.insert(at, Directive::RiskWarning(warning));
    }
    (rest, folded)
}

fn fold_warning(into: &mut RiskWarning, other: RiskWarning) {
    into.severity = into.severity.max(other.severity);

    let reasoning = other.reasoning.trim();
    if !reasoning.is_empty() {
        if !into.reasoning.is_empty() {
            into.reasoning.push(' ');
        }
        into.reasoning.push_str(reasoning);
    }

    let source = other.source.trim();
    let known = into.source.split("; ").any(|s| s == source);
    if !source.is_empty() && !known {
        if !into.source.is_empty() {
            into.source.push_str("; ");
        }
        into.source.push_str(source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::directive::{
        Comparison, IngredientRow, IngredientTable, MacroDistribution, PositiveBadge,
        ProcessingMeter,
    };

    fn table(rows: &[(&str, RowStatus)]) -> Directive {
        Directive::IngredientTable(IngredientTable {
            items: rows
                .iter()
                .map(|(label, status)| IngredientRow {
                    label: (*label).to_string(),
                    value: "1g".into(),
                    status: *status,
                })
                .collect(),
        })
    }

    fn macros(carbs: f64, protein: f64, fat: f64) -> Directive {
        Directive::MacroDistribution(MacroDistribution {
            carbs,
            protein,
            fat,
            calories: 400.0,
        })
    }

    fn meter(level: u8) -> Directive {
        Directive::ProcessingMeter(ProcessingMeter {
            level,
            title: "NOVA Group".into(),
            description: "Processing level".into(),
        })
    }

    fn badge() -> Directive {
        Directive::PositiveBadge(PositiveBadge {
            message: "Keto Friendly".into(),
            variant: Default::default(),
        })
    }

    fn warning(title: &str, severity: Severity, reasoning: &str, source: &str) -> Directive {
        Directive::RiskWarning(RiskWarning {
            title: title.into(),
            severity,
            reasoning: reasoning.into(),
            source: source.into(),
        })
    }

    fn comparison(nutrient: &str, sentiment: Sentiment) -> Directive {
        Directive::Comparison(Comparison {
            nutrient: nutrient.into(),
            current_value: "24g".into(),
            comparison_text: "6 sugar cubes".into(),
            sentiment,
        })
    }

    fn tags(issues: &IssueSet) -> Vec<&str> {
        issues.iter().map(Issue::as_str).collect()
    }

    #[test]
    fn rules_run_in_table_order_per_directive() {
        let issues = detect_issues(&[
            table(&[("Sodium", RowStatus::Bad), ("Sugar", RowStatus::Good)]),
            macros(70.0, 10.0, 20.0),
            meter(4),
            comparison("Sugar", Sentiment::Negative),
        ]);
        assert_eq!(
            tags(&issues),
            vec![
                "Sodium",
                "High sodium",
                "High carbohydrate ratio",
                "Ultra-processed (NOVA 4)",
                "Sugar"
            ]
        );
    }

    #[test]
    fn issues_are_deduplicated() {
        let issues = detect_issues(&[
            table(&[("Salt", RowStatus::Bad)]),
            table(&[("Salt", RowStatus::Bad), ("Sea salt", RowStatus::Good)]),
        ]);
        assert_eq!(tags(&issues), vec!["Salt", "High sodium"]);
    }

    #[test]
    fn thresholds() {
        assert!(detect_issues(&[macros(55.0, 25.0, 20.0)]).is_empty());
        assert!(detect_issues(&[macros(0.0, 0.0, 0.0)]).is_empty());
        assert!(detect_issues(&[meter(3)]).is_empty());
        assert!(detect_issues(&[comparison("Fibre", Sentiment::Positive)]).is_empty());
        assert_eq!(
            tags(&detect_issues(&[comparison("  ", Sentiment::Negative)])),
            vec!["Unfavorable comparison"]
        );
    }

    #[test]
    fn synthesizes_warning_and_remediation() {
        let out = synthesize(vec![macros(70.0, 10.0, 20.0)]);
        assert!(out.actions.warning_synthesized);
        assert_eq!(out.sequence.len(), 3);
        let Directive::RiskWarning(w) = &out.sequence[0] else {
            panic!("warning must lead");
        };
        assert_eq!(w.title, SYNTHESIZED_WARNING_TITLE);
        assert_eq!(w.severity, Severity::High);
        assert_eq!(w.source, AUTO_CHECK_SOURCE);
        assert_eq!(
            w.reasoning,
            "Detected potential concerns: High carbohydrate ratio."
        );
        let Directive::AlternativeSuggestions(alts) = &out.sequence[1] else {
            panic!("remediation must follow the warning");
        };
        assert_eq!(alts.suggestions.len(), 3);
        assert_eq!(alts.suggestions[0].title, "Whole-grain or vegetable noodles");
    }

    #[test]
    fn reasoning_lists_only_three_issues() {
        let out = synthesize(vec![table(&[
            ("Sugar", RowStatus::Bad),
            ("Palm oil", RowStatus::Bad),
            ("Maltodextrin", RowStatus::Bad),
            ("Sodium", RowStatus::Bad),
        ])]);
        let Directive::RiskWarning(w) = &out.sequence[0] else {
            panic!("warning must lead");
        };
        assert_eq!(
            w.reasoning,
            "Detected potential concerns: Sugar, Palm oil, Maltodextrin."
        );
    }

    #[test]
    fn badges_never_survive_a_warning() {
        let out = synthesize(vec![
            table(&[("Sodium", RowStatus::Bad)]),
            badge(),
            badge(),
        ]);
        assert_eq!(out.actions.badges_suppressed, 2);
        assert!(!out.sequence.iter().any(|d| d.is(DirectiveKind::PositiveBadge)));

        let generator_warning = synthesize(vec![
            badge(),
            warning("Fried", Severity::Medium, "Deep fried.", "FDA"),
        ]);
        assert!(!generator_warning.actions.warning_synthesized);
        assert_eq!(generator_warning.actions.badges_suppressed, 1);
    }

    #[test]
    fn existing_alternatives_are_kept() {
        let alts = Directive::AlternativeSuggestions(AlternativeSuggestions {
            suggestions: vec![AlternativeSuggestion {
                title: "Baked chips".into(),
                reason: None,
                link: None,
            }],
        });
        let out = synthesize(vec![meter(4), alts.clone()]);
        assert_eq!(out.actions.remediation_suggestions, 0);
        assert_eq!(out.sequence.iter().filter(|d| **d == alts).count(), 1);
        assert_eq!(out.sequence.len(), 3);
    }

    #[test]
    fn clean_sequences_pass_through() {
        let input = vec![badge(), macros(40.0, 30.0, 30.0)];
        let out = synthesize(input.clone());
        assert_eq!(out.sequence, input);
        assert_eq!(out.actions, SynthesisActions::default());
    }

    #[test]
    fn warnings_merge_into_the_first() {
        let (merged, folded) = merge_warnings(vec![
            badge(),
            warning("Sugar", Severity::Low, "Lots of sugar.", "WHO"),
            meter(2),
            warning("Fat", Severity::High, "Lots of fat.", "FDA"),
            warning("Salt", Severity::Medium, "Salty.", "WHO"),
        ]);
        assert_eq!(folded, 2);
        assert_eq!(merged.len(), 3);
        assert_eq!(
            merged[1],
            warning(
                "Sugar",
                Severity::High,
                "Lots of sugar. Lots of fat. Salty.",
                "WHO; FDA"
            )
        );
    }

    #[test]
    fn remediation_round_robins_matched_categories() {
        let mut issues = IssueSet::default();
        issues.insert(Issue::new("High carbohydrate ratio"));
        issues.insert(Issue::new("High sodium"));
        let titles: Vec<&str> = remedies_for(&issues).iter().map(|r| r.title).collect();
        assert_eq!(
            titles,
            vec![
                "Whole-grain or vegetable noodles",
                "Make a low-sodium sauce",
                "Spiralized zucchini or shirataki noodles"
            ]
        );

        let mut processed = IssueSet::default();
        processed.insert(Issue::new("Ultra-processed (NOVA 4)"));
        assert_eq!(remedies_for(&processed).len(), 2);
    }

    #[test]
    fn unmatched_issues_fall_back_to_generic_swaps() {
        let out = synthesize(vec![comparison("Sugar", Sentiment::Negative)]);
        let Directive::AlternativeSuggestions(alts) = &out.sequence[1] else {
            panic!("remediation must follow the warning");
        };
        let titles: Vec<&str> = alts.suggestions.iter().map(|s| s.title.as_str()).collect();
        let generic: Vec<&str> = GENERIC_REMEDIES.iter().map(|r| r.title).collect();
        assert_eq!(titles, generic);
    }

    #[test]
    fn synthesis_is_stable_on_its_own_output() {
        let first = synthesize(vec![table(&[("Sodium", RowStatus::Bad)]), badge()]);
        let second = synthesize(first.sequence.clone());
        assert_eq!(second.sequence, first.sequence);
        assert_eq!(second.actions, SynthesisActions::default());
    }
}
