use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of reviewers every paper is expected to receive.
pub const REVIEWERS_PER_PAPER: usize = 2;

/// Stable identifier of a submitted paper.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaperId(pub String);

impl PaperId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaperId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PaperId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Stable identifier of a reviewer in the directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewerId(pub String);

impl ReviewerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReviewerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReviewerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Research method a paper was classified under.
///
/// `Unclassified` covers missing or unrecognized labels; it is eligible for
/// every reviewer so noisy upstream classification never starves a paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MethodClass {
    Quantitative,
    Qualitative,
    Mixed,
    Conceptual,
    #[default]
    Unclassified,
}

impl MethodClass {
    pub fn from_label(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "quantitative" | "quant" => Self::Quantitative,
            "qualitative" | "qual" => Self::Qualitative,
            "mixed" | "mixed methods" | "mixed-methods" => Self::Mixed,
            "conceptual" | "theoretical" | "theory" => Self::Conceptual,
            _ => Self::Unclassified,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Quantitative => "Quantitative",
            Self::Qualitative => "Qualitative",
            Self::Mixed => "Mixed",
            Self::Conceptual => "Conceptual",
            Self::Unclassified => "",
        }
    }

    pub const fn ordered() -> [Self; 5] {
        [
            Self::Quantitative,
            Self::Qualitative,
            Self::Mixed,
            Self::Conceptual,
            Self::Unclassified,
        ]
    }
}

impl From<String> for MethodClass {
    fn from(value: String) -> Self {
        Self::from_label(&value)
    }
}

impl From<MethodClass> for String {
    fn from(value: MethodClass) -> Self {
        value.label().to_string()
    }
}

/// Methods a reviewer declared they can assess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReviewerCapability {
    Quantitative,
    Qualitative,
    Mixed,
    ConceptualAny,
}

impl ReviewerCapability {
    /// Parses free-text directory labels such as `"Quant/Mixed"`.
    ///
    /// Any label mentioning mixed methods wins, and blank or unknown labels
    /// fall back to `Mixed`, matching how directory entries without a method
    /// have always been treated.
    pub fn from_label(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase();
        if normalized.is_empty() || normalized.contains("mixed") || normalized == "any" {
            Self::Mixed
        } else if normalized.contains("quant") {
            Self::Quantitative
        } else if normalized.contains("qual") {
            Self::Qualitative
        } else if normalized.contains("conceptual") || normalized.contains("theor") {
            Self::ConceptualAny
        } else {
            Self::Mixed
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Quantitative => "Quantitative",
            Self::Qualitative => "Qualitative",
            Self::Mixed => "Mixed",
            Self::ConceptualAny => "Conceptual",
        }
    }
}

impl Default for ReviewerCapability {
    fn default() -> Self {
        Self::Mixed
    }
}

impl From<String> for ReviewerCapability {
    fn from(value: String) -> Self {
        Self::from_label(&value)
    }
}

impl From<ReviewerCapability> for String {
    fn from(value: ReviewerCapability) -> Self {
        value.label().to_string()
    }
}

/// Maximum concurrent caseload for a reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capacity {
    Unlimited,
    Limited(u32),
}

impl Capacity {
    /// Directory values use zero for "no limit".
    pub const fn from_declared(max_papers: u32) -> Self {
        if max_papers == 0 {
            Self::Unlimited
        } else {
            Self::Limited(max_papers)
        }
    }

    pub const fn limit(self) -> Option<u32> {
        match self {
            Self::Unlimited => None,
            Self::Limited(limit) => Some(limit),
        }
    }

    pub const fn admits(self, load: u32) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Limited(limit) => load < limit,
        }
    }

    pub fn label(self) -> String {
        match self {
            Self::Unlimited => "∞".to_string(),
            Self::Limited(limit) => limit.to_string(),
        }
    }
}

/// Paper as handed to the allocator; immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub id: PaperId,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub method: MethodClass,
}

/// Reviewer directory entry after capacity resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reviewer {
    pub id: ReviewerId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub capability: ReviewerCapability,
    pub capacity: Capacity,
    #[serde(default)]
    pub expertise: Vec<String>,
}

impl Reviewer {
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            self.id.as_str()
        } else {
            &self.name
        }
    }
}

/// Relevance value on the closed 0–100 scale.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelevanceScore(f32);

impl RelevanceScore {
    pub const MIN: Self = Self(0.0);
    pub const MAX: Self = Self(100.0);

    /// Clamps into range; non-finite input collapses to the floor.
    pub fn new(value: f32) -> Self {
        if value.is_finite() {
            Self(value.clamp(Self::MIN.0, Self::MAX.0))
        } else {
            Self::MIN
        }
    }

    pub const fn value(self) -> f32 {
        self.0
    }
}

impl fmt::Display for RelevanceScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{:.0}", self.0)
        } else {
            write!(f, "{:.2}", self.0)
        }
    }
}

/// How an assignment came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentOrigin {
    /// Committed before this run and carried in through the ledger seed.
    Seeded,
    /// Picked from the scored candidate ranking.
    Ranked,
    /// Picked by the least-loaded fallback scan.
    Fallback,
}

impl AssignmentOrigin {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Seeded => "seeded",
            Self::Ranked => "ranked",
            Self::Fallback => "fallback",
        }
    }
}

/// Committed (paper, reviewer) pairing with the score it was chosen at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub paper_id: PaperId,
    pub reviewer_id: ReviewerId,
    pub score: RelevanceScore,
    pub origin: AssignmentOrigin,
}
