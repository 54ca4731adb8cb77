//! Final layout of a finalized sequence. Pure rearrangement: the output is
//! a permutation of the input.

use crate::core::directive::{Directive, DirectiveKind};

/// Lay out a sequence for rendering.
///
/// The risk warning leads, followed by any remediation. The first science
/// explainer pulls every evidence-sources directive and then every
/// long-term-impact directive in right behind it. Everything else keeps the
/// order it arrived in.
pub fn order(directives: Vec<Directive>) -> Vec<Directive> {
    let has_warning = directives.iter().any(|d| d.is(DirectiveKind::RiskWarning));
    let has_explainer = directives
        .iter()
        .any(|d| d.is(DirectiveKind::ScienceExplainer));

    let mut head = Vec::new();
    let mut remediation = Vec::new();
    let mut evidence = Vec::new();
    let mut impacts = Vec::new();
    let mut body = Vec::with_capacity(directives.len());

    for directive in directives {
        match directive.kind() {
            DirectiveKind::RiskWarning => head.push(directive),
            DirectiveKind::AlternativeSuggestions if has_warning => remediation.push(directive),
            DirectiveKind::EvidenceSources if has_explainer => evidence.push(directive),
            DirectiveKind::LongTermImpact if has_explainer => impacts.push(directive),
            _ => body.push(directive),
        }
    }

    if let Some(at) = body
        .iter()
        .position(|d| d.is(DirectiveKind::ScienceExplainer))
    {
        body.splice(at + 1..at + 1, evidence.into_iter().chain(impacts));
    }

    head.extend(remediation);
    head.extend(body);
    head
}
