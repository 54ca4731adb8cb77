//! Post-generation directive pipeline.
//!
//! `normalize -> validate -> synthesize -> order`, then an optional score.
//! Every stage is total over its input: nothing here returns an error, and
//! the renderer only ever receives directives that satisfy their contract.

pub mod normalize;
pub mod order;
pub mod risk;
pub mod score;
pub mod validate;

pub use normalize::{NormalizedDirective, normalize, normalize_with};
pub use order::order;
pub use risk::{Issue, IssueSet, Synthesis, SynthesisActions, detect_issues, synthesize};
pub use score::{ScoreResult, score};
pub use validate::{ContractViolation, Rejection, RowPolicy, ValidationReport, validate};

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value;

use crate::config::PipelineConfig;
use crate::core::directive::{DirectiveKind, DirectiveSequence};
use crate::observability::{NoopObserver, Observer, ObserverEvent, ObserverMetric};

/// Result of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct FinalizedTurn {
    #[serde(flatten)]
    pub sequence: DirectiveSequence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreResult>,
    #[serde(skip)]
    pub issues: IssueSet,
    #[serde(skip)]
    pub rejected: Vec<Rejection>,
}

impl FinalizedTurn {
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| self.sequence.to_value())
    }
}

/// Configured pipeline. Stateless between runs, so one instance can be shared
/// across sessions behind an `Arc`.
pub struct Pipeline {
    config: PipelineConfig,
    observer: Arc<dyn Observer>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, observer: Arc<dyn Observer>) -> Self {
        Self { config, observer }
    }

    pub fn with_defaults() -> Self {
        Self::new(PipelineConfig::default(), Arc::new(NoopObserver))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Turn a raw generator candidate into a finalized, renderable turn.
    pub fn finalize(&self, candidate: &Value) -> FinalizedTurn {
        let started = Instant::now();

        let normalized = normalize_with(candidate, self.config.row_policy);
        for candidate in &normalized {
            let Some(kind) = DirectiveKind::lookup(&candidate.component) else {
                continue;
            };
            for field in &candidate.dropped_fields {
                self.observer.record_event(&ObserverEvent::FieldDropped {
                    kind,
                    field: (*field).to_string(),
                });
            }
        }

        let report = validate(normalized, self.config.row_policy);
        self.record_validation(&report);

        let Synthesis {
            sequence,
            issues,
            actions,
        } = synthesize(report.accepted);
        self.record_synthesis(&issues, actions);

        let sequence = DirectiveSequence::new(order(sequence));
        let score = self
            .config
            .include_score
            .then(|| score(sequence.as_slice()));

        let duration = started.elapsed();
        self.observer
            .record_metric(&ObserverMetric::PipelineLatency(duration));
        self.observer.record_event(&ObserverEvent::TurnFinalized {
            directives: sequence.len(),
            score: score.as_ref().map(|s| s.score),
            duration,
        });

        FinalizedTurn {
            sequence,
            score,
            issues,
            rejected: report.rejected,
        }
    }

    fn record_validation(&self, report: &ValidationReport) {
        for rejection in &report.rejected {
            self.observer.record_event(&ObserverEvent::DirectiveRejected {
                component: rejection.component.clone(),
                code: rejection.violation.code(),
                reason: rejection.violation.to_string(),
            });
        }
        for filtered in &report.filtered {
            self.observer.record_event(&ObserverEvent::RowsFiltered {
                kind: filtered.kind,
                field: filtered.field,
                dropped: filtered.dropped,
            });
        }
        self.observer.record_metric(&ObserverMetric::DirectivesAccepted(
            report.accepted.len() as u64,
        ));
        self.observer.record_metric(&ObserverMetric::DirectivesRejected(
            report.rejected.len() as u64,
        ));
    }

    fn record_synthesis(&self, issues: &IssueSet, actions: SynthesisActions) {
        self.observer
            .record_metric(&ObserverMetric::IssuesDetected(issues.len() as u64));
        if actions.warnings_merged > 0 {
            self.observer.record_event(&ObserverEvent::WarningsMerged {
                count: actions.warnings_merged,
            });
        }
        if actions.warning_synthesized {
            self.observer.record_event(&ObserverEvent::RiskSynthesized {
                issues: issues.len(),
            });
        }
        if actions.badges_suppressed > 0 {
            self.observer.record_event(&ObserverEvent::BadgesSuppressed {
                count: actions.badges_suppressed,
            });
        }
        if actions.remediation_suggestions > 0 {
            self.observer
                .record_event(&ObserverEvent::RemediationSynthesized {
                    suggestions: actions.remediation_suggestions,
                });
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Run the pipeline with default settings and no observer.
pub fn finalize(candidate: &Value) -> DirectiveSequence {
    Pipeline::with_defaults().finalize(candidate).sequence
}
