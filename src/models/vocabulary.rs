use std::fmt;

/// A flag vocabulary decoded from a free-text annotation cell.
///
/// Each flag is detected by keyword containment. A flag whose `suppressor`
/// is also detected in the same cell is dropped, which is how overlapping
/// keywords such as `named` / `contains_named` are disambiguated.
pub trait CategoryFlag: Copy + Ord + Sized + 'static {
    /// Every flag in merged-table column order
    const ALL: &'static [Self];

    /// Keyword searched for in the raw cell
    fn keyword(self) -> &'static str;

    /// Column name in the merged table
    fn column(self) -> &'static str;

    /// The more specific flag that hides this one when both are present
    fn suppressor(self) -> Option<Self> {
        None
    }
}

/// Grammatical manifestation of the noun phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Manifestation {
    Named,
    Undetermined,
    Determined,
    Numbered,
    Anaphora,
    QualifiedAnaphora,
    MassNoun,
    ContainsNamed,
}

impl CategoryFlag for Manifestation {
    const ALL: &'static [Self] = &[
        Self::Named,
        Self::Undetermined,
        Self::Determined,
        Self::Numbered,
        Self::Anaphora,
        Self::QualifiedAnaphora,
        Self::MassNoun,
        Self::ContainsNamed,
    ];

    fn keyword(self) -> &'static str {
        match self {
            Self::Named => "named",
            Self::Undetermined => "undetermined",
            Self::Determined => "determined",
            Self::Numbered => "numbered",
            Self::Anaphora => "anaphora",
            Self::QualifiedAnaphora => "qualified_anaphora",
            Self::MassNoun => "mass_noun",
            Self::ContainsNamed => "contains_named",
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Named => "manifestation_named",
            Self::Undetermined => "manifestation_undetermined",
            Self::Determined => "manifestation_determined",
            Self::Numbered => "manifestation_numbered",
            Self::Anaphora => "manifestation_anaphora",
            Self::QualifiedAnaphora => "manifestation_qualified_anaphora",
            Self::MassNoun => "manifestation_mass_noun",
            Self::ContainsNamed => "manifestation_contains_named",
        }
    }

    fn suppressor(self) -> Option<Self> {
        match self {
            Self::Named => Some(Self::ContainsNamed),
            Self::Anaphora => Some(Self::QualifiedAnaphora),
            Self::Determined => Some(Self::Undetermined),
            _ => None,
        }
    }
}

/// Syntactic modifier attached to the head noun
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modifier {
    Adjective,
    Preposition,
    Noun,
}

impl CategoryFlag for Modifier {
    const ALL: &'static [Self] = &[Self::Adjective, Self::Preposition, Self::Noun];

    fn keyword(self) -> &'static str {
        match self {
            Self::Adjective => "adjective",
            Self::Preposition => "preposition",
            Self::Noun => "noun",
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Adjective => "modifiers_adjective",
            Self::Preposition => "modifiers_preposition",
            Self::Noun => "modifiers_noun",
        }
    }
}

/// Vagueness dimension of the noun phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Vagueness {
    Degree,
    Portions,
    Subjective,
    NotVague,
}

impl Vagueness {
    /// The three dimensions that make a noun phrase vague
    pub const VAGUE: [Vagueness; 3] = [Self::Degree, Self::Portions, Self::Subjective];

    pub fn is_vague(self) -> bool {
        self != Self::NotVague
    }
}

impl CategoryFlag for Vagueness {
    const ALL: &'static [Self] = &[
        Self::Degree,
        Self::Portions,
        Self::Subjective,
        Self::NotVague,
    ];

    fn keyword(self) -> &'static str {
        match self {
            Self::Degree => "degree",
            Self::Portions => "portions",
            Self::Subjective => "subjective",
            Self::NotVague => "not_vague",
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Degree => "vagueness_degree",
            Self::Portions => "vagueness_portions",
            Self::Subjective => "vagueness_subjective",
            Self::NotVague => "vagueness_not_vague",
        }
    }
}

/// A modifier or manifestation flag, the feature axis of the reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Manifestation(Manifestation),
    Modifier(Modifier),
}

impl Feature {
    /// Manifestations then modifiers, in merged-table column order
    pub fn all() -> Vec<Feature> {
        Manifestation::ALL
            .iter()
            .map(|&m| Feature::Manifestation(m))
            .chain(Modifier::ALL.iter().map(|&m| Feature::Modifier(m)))
            .collect()
    }

    pub fn column(self) -> &'static str {
        match self {
            Feature::Manifestation(m) => m.column(),
            Feature::Modifier(m) => m.column(),
        }
    }
}

/// Free-text columns that precede the flag columns
pub const TEXT_COLUMNS: [&str; 3] = ["expression", "plurality", "semantic_class"];

/// Total number of columns in the merged table
pub const COLUMN_COUNT: usize = 18;

/// Merged-table header: text columns then every flag column
pub fn header() -> Vec<&'static str> {
    TEXT_COLUMNS
        .iter()
        .copied()
        .chain(Manifestation::ALL.iter().map(|m| m.column()))
        .chain(Modifier::ALL.iter().map(|m| m.column()))
        .chain(Vagueness::ALL.iter().map(|v| v.column()))
        .collect()
}

/// Whether the noun phrase denotes a single instance or a whole class
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Plurality {
    Instance,
    Class,
    /// Any label outside the vocabulary, kept verbatim
    Unknown(String),
}

impl Plurality {
    pub const KNOWN: [Plurality; 2] = [Plurality::Instance, Plurality::Class];

    pub fn parse(raw: &str) -> Self {
        match raw {
            "instance" => Plurality::Instance,
            "class" => Plurality::Class,
            other => Plurality::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Plurality::Instance => "instance",
            Plurality::Class => "class",
            Plurality::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for Plurality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic class labels used by the class reports, in report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticClass {
    CreativeWork,
    BiochemEntity,
    Action,
    Organization,
    Person,
    Place,
    Taxon,
    Intangible,
    MedicalEntity,
    Event,
    Product,
}

impl SemanticClass {
    pub const ALL: [SemanticClass; 11] = [
        Self::CreativeWork,
        Self::BiochemEntity,
        Self::Action,
        Self::Organization,
        Self::Person,
        Self::Place,
        Self::Taxon,
        Self::Intangible,
        Self::MedicalEntity,
        Self::Event,
        Self::Product,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::CreativeWork => "creativework",
            Self::BiochemEntity => "biochementity",
            Self::Action => "action",
            Self::Organization => "organization",
            Self::Person => "person",
            Self::Place => "place",
            Self::Taxon => "taxon",
            Self::Intangible => "intangible",
            Self::MedicalEntity => "medicalentity",
            Self::Event => "event",
            Self::Product => "product",
        }
    }
}
