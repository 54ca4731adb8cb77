use std::time::Duration;

use crate::core::directive::DirectiveKind;

/// Events the observer can record
#[derive(Debug, Clone)]
pub enum ObserverEvent {
    /// A nested collection field arrived as unparsable text and was removed.
    FieldDropped {
        kind: DirectiveKind,
        field: String,
    },
    /// A candidate directive failed its contract or named an unknown kind.
    DirectiveRejected {
        component: String,
        code: &'static str,
        reason: String,
    },
    RowsFiltered {
        kind: DirectiveKind,
        field: &'static str,
        dropped: usize,
    },
    RiskSynthesized {
        issues: usize,
    },
    WarningsMerged {
        count: usize,
    },
    BadgesSuppressed {
        count: usize,
    },
    RemediationSynthesized {
        suggestions: usize,
    },
    TurnFinalized {
        directives: usize,
        score: Option<u8>,
        duration: Duration,
    },
    UpstreamFailure {
        message: String,
    },
}

/// Numeric metrics
#[derive(Debug, Clone)]
pub enum ObserverMetric {
    DirectivesAccepted(u64),
    DirectivesRejected(u64),
    IssuesDetected(u64),
    PipelineLatency(Duration),
}

/// Core observability trait, implemented per backend
pub trait Observer: Send + Sync {
    /// Record a discrete event
    fn record_event(&self, event: &ObserverEvent);

    /// Record a numeric metric
    fn record_metric(&self, metric: &ObserverMetric);

    /// Flush any buffered data (no-op for most backends)
    fn flush(&self) {}

    /// Human-readable name of this observer
    fn name(&self) -> &str;
}
