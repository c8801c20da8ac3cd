use crate::error::SpamlensError;
use crate::evidence::Evidence;
use crate::knowledge::{KnowledgeBase, Label, EPSILON};

/// Exact posterior P(spam | evidence) for the star-shaped structure: every
/// evidence variable depends only on the root label, so the posterior is a
/// direct Bayes combination. Not valid for structures with edges among
/// evidence variables.
///
/// Scores accumulate in log-space and are normalized with log-sum-exp so
/// long products of small likelihoods cannot underflow.
pub fn posterior_spam(kb: &KnowledgeBase, evidence: &Evidence) -> Result<f64, SpamlensError> {
    // Every evidence entry must be part of the declared structure.
    for (name, _) in evidence.entries() {
        kb.cpt(name)?;
    }

    let prior = kb.prior();
    let mut log_ham = (1.0 - prior).max(EPSILON).ln();
    let mut log_spam = prior.max(EPSILON).ln();

    // Every declared variable must be observed exactly once; the fixed
    // evidence schema guarantees "at most once", this loop checks coverage.
    for (name, _cardinality) in kb.variables() {
        let state = evidence
            .state_of(name)
            .ok_or_else(|| SpamlensError::IncompleteEvidence(name.to_string()))?;
        let cpt = kb.cpt(name)?;
        log_ham += cpt.probability(state, Label::Ham)?.ln();
        log_spam += cpt.probability(state, Label::Spam)?.ln();
    }

    let max = log_ham.max(log_spam);
    let ham = (log_ham - max).exp();
    let spam = (log_spam - max).exp();
    Ok(spam / (ham + spam))
}

/// Threshold comparison, kept outside the engine so decision policy and
/// probability computation stay independently testable.
pub fn decide(posterior: f64, threshold: f64) -> bool {
    posterior >= threshold
}
