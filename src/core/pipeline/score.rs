//! Display score derived from a finalized sequence. Never persisted; always
//! recomputed from the directives it describes.

use serde::{Deserialize, Serialize};

use super::risk::detect_issues;
use crate::core::directive::{Directive, DirectiveKind, RowStatus, Sentiment};

const START: i32 = 100;
const HIGH_CARB_SHARE: f64 = 60.0;
const LOW_PROTEIN_SHARE: f64 = 10.0;
const BAD_ROW_PENALTY: i32 = 8;
const BAD_ROWS_CAP: i32 = 30;
/// Ceiling applied whenever the sequence carries a risk.
pub const AT_RISK_CEILING: u8 = 49;
const MAX_RATIONALE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: u8,
    pub rationale: Vec<String>,
}

struct Ledger {
    total: i32,
    rationale: Vec<String>,
}

impl Ledger {
    fn deduct(&mut self, points: i32, reason: impl Into<String>) {
        self.total -= points;
        if self.rationale.len() < MAX_RATIONALE {
            self.rationale.push(reason.into());
        }
    }
}

/// Score a finalized sequence.
pub fn score(directives: &[Directive]) -> ScoreResult {
    let mut ledger = Ledger {
        total: START,
        rationale: Vec::new(),
    };

    for directive in directives {
        match directive {
            Directive::MacroDistribution(macros) => {
                if macros.carbs_share_exceeds(HIGH_CARB_SHARE) {
                    ledger.deduct(20, "High carbohydrate ratio; consider lower-carb alternatives.");
                }
                if macros.protein_share_below(LOW_PROTEIN_SHARE) {
                    ledger.deduct(10, "Low protein; add a lean protein source.");
                }
            }
            Directive::ProcessingMeter(meter) if meter.level >= 4 => {
                ledger.deduct(30, "Ultra-processed ingredients detected; limit frequency.");
            }
            Directive::ProcessingMeter(meter) if meter.level == 3 => {
                ledger.deduct(10, "Moderately processed; prefer fresher alternatives when possible.");
            }
            Directive::IngredientTable(table) => {
                let bad: Vec<&str> = table
                    .items
                    .iter()
                    .filter(|row| row.status == RowStatus::Bad)
                    .map(|row| row.label.trim())
                    .collect();
                if !bad.is_empty() {
                    let count = i32::try_from(bad.len()).unwrap_or(i32::MAX);
                    let points = count.saturating_mul(BAD_ROW_PENALTY).min(BAD_ROWS_CAP);
                    let named = bad[..bad.len().min(3)].join(", ");
                    ledger.deduct(points, format!("Contains concerning ingredients: {named}."));
                }
            }
            Directive::RiskWarning(warning) => {
                ledger.deduct(15, warning.reasoning.clone());
            }
            Directive::Comparison(cmp) if cmp.sentiment == Sentiment::Negative => {
                let nutrient = match cmp.nutrient.trim() {
                    "" => "a key nutrient",
                    named => named,
                };
                ledger.deduct(8, format!("Compared unfavorably for {nutrient}."));
            }
            _ => {}
        }
    }

    let clamped = u8::try_from(ledger.total.clamp(0, 100)).unwrap_or(0);
    let at_risk = directives.iter().any(|d| d.is(DirectiveKind::RiskWarning))
        || !detect_issues(directives).is_empty();
    let score = if at_risk {
        clamped.min(AT_RISK_CEILING)
    } else {
        clamped
    };

    ScoreResult {
        score,
        rationale: ledger.rationale,
    }
}
