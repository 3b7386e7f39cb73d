use tracing::debug;

use super::domain::{MethodClass, Paper};

const QUANTITATIVE_CUES: &[&str] = &[
    "regression",
    "econometric",
    "statistical",
    "empirical",
    "quantitative",
    "panel data",
    "survey",
    "sample",
    "dataset",
    "variables",
    "coefficient",
    "significant",
    "hypothesis",
];

const QUALITATIVE_CUES: &[&str] = &[
    "case study",
    "interview",
    "ethnograph",
    "qualitative",
    "grounded theory",
    "narrative",
    "interpretive",
    "phenomeno",
];

/// Cue-word counts found in a paper's title, abstract, and keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MethodCues {
    pub quantitative: usize,
    pub qualitative: usize,
}

impl MethodCues {
    pub fn scan(paper: &Paper) -> Self {
        let text = format!(
            "{} {} {}",
            paper.title,
            paper.abstract_text,
            paper.keywords.join(", ")
        )
        .to_lowercase();

        let count = |cues: &[&str]| cues.iter().filter(|cue| text.contains(*cue)).count();
        Self {
            quantitative: count(QUANTITATIVE_CUES),
            qualitative: count(QUALITATIVE_CUES),
        }
    }

    pub fn method(self) -> MethodClass {
        let Self {
            quantitative,
            qualitative,
        } = self;
        if quantitative > 2 && quantitative > qualitative {
            MethodClass::Quantitative
        } else if qualitative > 1 && qualitative > quantitative {
            MethodClass::Qualitative
        } else if quantitative > 0 && qualitative > 0 {
            MethodClass::Mixed
        } else {
            MethodClass::Conceptual
        }
    }
}

pub fn classify(paper: &Paper) -> MethodClass {
    MethodCues::scan(paper).method()
}

/// Labels every unclassified paper in place; returns how many were labelled.
pub fn classify_missing(papers: &mut [Paper]) -> usize {
    let mut labelled = 0;
    for paper in papers
        .iter_mut()
        .filter(|paper| paper.method == MethodClass::Unclassified)
    {
        let cues = MethodCues::scan(paper);
        paper.method = cues.method();
        debug!(
            paper_id = %paper.id,
            quantitative = cues.quantitative,
            qualitative = cues.qualitative,
            method = paper.method.label(),
            "classified paper method"
        );
        labelled += 1;
    }
    labelled
}
