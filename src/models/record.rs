use std::collections::BTreeSet;

use super::vocabulary::{
    CategoryFlag, Feature, Manifestation, Modifier, Plurality, Vagueness, COLUMN_COUNT,
};

/// Decode a raw category cell into its flags
///
/// Every keyword contained in the cell sets its flag, then flags whose
/// suppressor was also found are removed.
pub fn decode_flags<F: CategoryFlag>(cell: &str) -> BTreeSet<F> {
    let found: BTreeSet<F> = F::ALL
        .iter()
        .copied()
        .filter(|flag| cell.contains(flag.keyword()))
        .collect();

    found
        .iter()
        .copied()
        .filter(|flag| flag.suppressor().is_none_or(|s| !found.contains(&s)))
        .collect()
}

/// One annotated noun phrase, a single row of the merged table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRecord {
    /// The noun phrase text, lowercased
    pub expression: String,
    pub plurality: Plurality,
    /// Semantic class label as annotated
    pub semantic_class: String,
    pub manifestation: BTreeSet<Manifestation>,
    pub modifiers: BTreeSet<Modifier>,
    pub vagueness: BTreeSet<Vagueness>,
}

impl AnnotationRecord {
    /// Build a record from the six raw annotation cells
    pub fn from_cells(
        expression: &str,
        plurality: &str,
        semantic_class: &str,
        manifestation: &str,
        modifiers: &str,
        vagueness: &str,
    ) -> Self {
        Self {
            expression: expression.trim().to_string(),
            plurality: Plurality::parse(plurality.trim()),
            semantic_class: semantic_class.trim().to_string(),
            manifestation: decode_flags(manifestation),
            modifiers: decode_flags(modifiers),
            vagueness: decode_flags(vagueness),
        }
    }

    pub fn has_manifestation(&self, flag: Manifestation) -> bool {
        self.manifestation.contains(&flag)
    }

    pub fn has_modifier(&self, flag: Modifier) -> bool {
        self.modifiers.contains(&flag)
    }

    pub fn has_vagueness(&self, flag: Vagueness) -> bool {
        self.vagueness.contains(&flag)
    }

    pub fn has_feature(&self, feature: Feature) -> bool {
        match feature {
            Feature::Manifestation(m) => self.has_manifestation(m),
            Feature::Modifier(m) => self.has_modifier(m),
        }
    }

    /// Number of vague dimensions (degree, portions, subjective) set
    pub fn vague_dimension_count(&self) -> usize {
        self.vagueness.iter().filter(|v| v.is_vague()).count()
    }

    pub fn is_vague(&self) -> bool {
        self.vague_dimension_count() > 0
    }

    /// Vague along at least two dimensions at once
    pub fn is_multi_vague(&self) -> bool {
        self.vague_dimension_count() >= 2
    }

    /// `not_vague` annotated together with a vague dimension
    pub fn has_inconsistent_vagueness(&self) -> bool {
        self.has_vagueness(Vagueness::NotVague) && self.is_vague()
    }

    /// Serialize as merged-table fields, flags as `1`/`0`
    pub fn to_fields(&self) -> Vec<String> {
        let mut fields = Vec::with_capacity(COLUMN_COUNT);
        fields.push(self.expression.clone());
        fields.push(self.plurality.to_string());
        fields.push(self.semantic_class.clone());
        fields.extend(flag_fields(&self.manifestation));
        fields.extend(flag_fields(&self.modifiers));
        fields.extend(flag_fields(&self.vagueness));
        fields
    }

    /// Rebuild a record from merged-table fields
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self, String> {
        if fields.len() != COLUMN_COUNT {
            return Err(format!(
                "expected {} fields, found {}",
                COLUMN_COUNT,
                fields.len()
            ));
        }

        let manifestation_end = 3 + Manifestation::ALL.len();
        let modifiers_end = manifestation_end + Modifier::ALL.len();

        Ok(Self {
            expression: fields[0].as_ref().to_string(),
            plurality: Plurality::parse(fields[1].as_ref()),
            semantic_class: fields[2].as_ref().to_string(),
            manifestation: parse_flag_fields(&fields[3..manifestation_end])?,
            modifiers: parse_flag_fields(&fields[manifestation_end..modifiers_end])?,
            vagueness: parse_flag_fields(&fields[modifiers_end..])?,
        })
    }
}

fn flag_fields<F: CategoryFlag>(set: &BTreeSet<F>) -> impl Iterator<Item = String> + '_ {
    F::ALL
        .iter()
        .map(move |flag| (if set.contains(flag) { "1" } else { "0" }).to_string())
}

fn parse_flag_fields<F: CategoryFlag, S: AsRef<str>>(fields: &[S]) -> Result<BTreeSet<F>, String> {
    let mut set = BTreeSet::new();
    for (flag, field) in F::ALL.iter().zip(fields) {
        match field.as_ref() {
            "1" => {
                set.insert(*flag);
            }
            "0" => {}
            other => {
                return Err(format!(
                    "column {} holds {:?}, expected 0 or 1",
                    flag.column(),
                    other
                ));
            }
        }
    }
    Ok(set)
}
