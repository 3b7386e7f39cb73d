use super::domain::{MethodClass, ReviewerCapability};

/// Compatibility matrix between a paper's method and a reviewer's capability.
///
/// Mixed-capability reviewers cover everything. Quantitative and qualitative
/// papers need a reviewer of the same family (or mixed). Mixed, conceptual,
/// and unclassified papers accept anyone.
pub fn is_eligible(method: MethodClass, capability: ReviewerCapability) -> bool {
    if capability == ReviewerCapability::Mixed {
        return true;
    }

    match method {
        MethodClass::Quantitative => capability == ReviewerCapability::Quantitative,
        MethodClass::Qualitative => capability == ReviewerCapability::Qualitative,
        MethodClass::Mixed | MethodClass::Conceptual | MethodClass::Unclassified => true,
    }
}
