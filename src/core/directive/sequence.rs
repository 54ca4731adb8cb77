use serde::{Deserialize, Serialize};

use super::{Directive, DirectiveKind};

/// Ordered directives; order is rendering order.
///
/// Serializes in the same `{"uiComponents": [...]}` envelope the generator
/// uses, so a finalized sequence can be fed back through the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectiveSequence {
    #[serde(rename = "uiComponents", default)]
    directives: Vec<Directive>,
}

impl DirectiveSequence {
    pub fn new(directives: Vec<Directive>) -> Self {
        Self { directives }
    }

    pub fn as_slice(&self) -> &[Directive] {
        &self.directives
    }

    pub fn into_vec(self) -> Vec<Directive> {
        self.directives
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Directive> {
        self.directives.iter()
    }

    pub fn count(&self, kind: DirectiveKind) -> usize {
        self.directives.iter().filter(|d| d.is(kind)).count()
    }

    pub fn contains(&self, kind: DirectiveKind) -> bool {
        self.directives.iter().any(|d| d.is(kind))
    }

    pub fn kinds(&self) -> Vec<DirectiveKind> {
        self.directives.iter().map(Directive::kind).collect()
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({ "uiComponents": [] }))
    }
}

impl From<Vec<Directive>> for DirectiveSequence {
    fn from(directives: Vec<Directive>) -> Self {
        Self::new(directives)
    }
}

impl<'a> IntoIterator for &'a DirectiveSequence {
    type Item = &'a Directive;
    type IntoIter = std::slice::Iter<'a, Directive>;

    fn into_iter(self) -> Self::IntoIter {
        self.directives.iter()
    }
}
