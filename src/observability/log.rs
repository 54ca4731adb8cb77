use super::traits::{Observer, ObserverEvent, ObserverMetric};
use tracing::{debug, info, warn};

/// Log-based observer; forwards everything to `tracing`
pub struct LogObserver;

impl LogObserver {
    pub fn new() -> Self {
        Self
    }
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Observer for LogObserver {
    fn record_event(&self, event: &ObserverEvent) {
        match event {
            ObserverEvent::FieldDropped { kind, field } => {
                debug!(kind = %kind, field = %field, "pipeline.field_dropped");
            }
            ObserverEvent::DirectiveRejected {
                component,
                code,
                reason,
            } => {
                debug!(component = %component, code, reason = %reason, "pipeline.directive_rejected");
            }
            ObserverEvent::RowsFiltered {
                kind,
                field,
                dropped,
            } => {
                debug!(kind = %kind, field, dropped, "pipeline.rows_filtered");
            }
            ObserverEvent::RiskSynthesized { issues } => {
                info!(issues, "pipeline.risk_synthesized");
            }
            ObserverEvent::WarningsMerged { count } => {
                info!(count, "pipeline.warnings_merged");
            }
            ObserverEvent::BadgesSuppressed { count } => {
                info!(count, "pipeline.badges_suppressed");
            }
            ObserverEvent::RemediationSynthesized { suggestions } => {
                info!(suggestions, "pipeline.remediation_synthesized");
            }
            ObserverEvent::TurnFinalized {
                directives,
                score,
                duration,
            } => {
                info!(
                    directives,
                    score = ?score,
                    duration_ms = millis(*duration),
                    "pipeline.turn_finalized"
                );
            }
            ObserverEvent::UpstreamFailure { message } => {
                warn!(error = %message, "generator.upstream_failure");
            }
        }
    }

    fn record_metric(&self, metric: &ObserverMetric) {
        match metric {
            ObserverMetric::DirectivesAccepted(n) => {
                debug!(count = n, "metric.directives_accepted");
            }
            ObserverMetric::DirectivesRejected(n) => {
                debug!(count = n, "metric.directives_rejected");
            }
            ObserverMetric::IssuesDetected(n) => {
                debug!(count = n, "metric.issues_detected");
            }
            ObserverMetric::PipelineLatency(d) => {
                debug!(latency_ms = millis(*d), "metric.pipeline_latency");
            }
        }
    }

    fn name(&self) -> &str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::directive::DirectiveKind;
    use std::time::Duration;

    #[test]
    fn log_observer_name() {
        assert_eq!(LogObserver::new().name(), "log");
    }

    #[test]
    fn log_observer_all_events_no_panic() {
        let obs = LogObserver::new();
        obs.record_event(&ObserverEvent::FieldDropped {
            kind: DirectiveKind::EvidenceSources,
            field: "sources".into(),
        });
        obs.record_event(&ObserverEvent::DirectiveRejected {
            component: "productCard".into(),
            code: "unknown_kind",
            reason: "unknown directive kind `productCard`".into(),
        });
        obs.record_event(&ObserverEvent::RowsFiltered {
            kind: DirectiveKind::IngredientTable,
            field: "items",
            dropped: 2,
        });
        obs.record_event(&ObserverEvent::RiskSynthesized { issues: 2 });
        obs.record_event(&ObserverEvent::WarningsMerged { count: 2 });
        obs.record_event(&ObserverEvent::BadgesSuppressed { count: 1 });
        obs.record_event(&ObserverEvent::RemediationSynthesized { suggestions: 3 });
        obs.record_event(&ObserverEvent::TurnFinalized {
            directives: 4,
            score: None,
            duration: Duration::ZERO,
        });
        obs.record_event(&ObserverEvent::UpstreamFailure {
            message: "502".into(),
        });
    }

    #[test]
    fn log_observer_all_metrics_no_panic() {
        let obs = LogObserver::new();
        obs.record_metric(&ObserverMetric::DirectivesAccepted(0));
        obs.record_metric(&ObserverMetric::DirectivesRejected(u64::MAX));
        obs.record_metric(&ObserverMetric::IssuesDetected(3));
        obs.record_metric(&ObserverMetric::PipelineLatency(Duration::from_secs(1)));
    }
}
