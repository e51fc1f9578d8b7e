use std::collections::BTreeSet;

use super::record::AnnotationRecord;
use super::vocabulary::{CategoryFlag, Feature, Plurality, SemanticClass, Vagueness};

/// A subset selector over annotation records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    Vagueness(Vagueness),
    Feature(Feature),
    Class(SemanticClass),
    Plurality(Plurality),
}

impl Criterion {
    pub fn label(&self) -> &str {
        match self {
            Criterion::Vagueness(v) => v.column(),
            Criterion::Feature(f) => f.column(),
            Criterion::Class(c) => c.label(),
            Criterion::Plurality(p) => p.as_str(),
        }
    }

    pub fn matches(&self, record: &AnnotationRecord) -> bool {
        match self {
            Criterion::Vagueness(v) => record.has_vagueness(*v),
            Criterion::Feature(f) => record.has_feature(*f),
            Criterion::Class(c) => record.semantic_class == c.label(),
            Criterion::Plurality(p) => record.plurality == *p,
        }
    }

    /// The three vague dimensions
    pub fn vague_types() -> Vec<Criterion> {
        Vagueness::VAGUE.iter().map(|&v| Criterion::Vagueness(v)).collect()
    }

    pub fn features() -> Vec<Criterion> {
        Feature::all().into_iter().map(Criterion::Feature).collect()
    }

    pub fn classes() -> Vec<Criterion> {
        SemanticClass::ALL.iter().map(|&c| Criterion::Class(c)).collect()
    }

    pub fn pluralities() -> Vec<Criterion> {
        Plurality::KNOWN.into_iter().map(Criterion::Plurality).collect()
    }
}

/// The merged table loaded in memory, read-only
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<AnnotationRecord>,
}

impl Dataset {
    pub fn new(records: Vec<AnnotationRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records matching a criterion
    pub fn select<'a>(&'a self, criterion: &'a Criterion) -> impl Iterator<Item = &'a AnnotationRecord> {
        self.records.iter().filter(move |r| criterion.matches(r))
    }

    pub fn count(&self, criterion: &Criterion) -> usize {
        self.select(criterion).count()
    }

    /// Records matching both criteria
    pub fn count_both(&self, outer: &Criterion, inner: &Criterion) -> usize {
        self.select(outer).filter(|r| inner.matches(r)).count()
    }

    pub fn count_where<P>(&self, predicate: P) -> usize
    where
        P: Fn(&AnnotationRecord) -> bool,
    {
        self.records.iter().filter(|r| predicate(r)).count()
    }

    /// Distinct plurality labels, sorted
    pub fn plurality_values(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.plurality.as_str().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct semantic class labels, sorted
    pub fn semantic_class_values(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.semantic_class.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
