use crate::error::SpamlensError;
use crate::evidence::Evidence;
use crate::knowledge::{KnowledgeBase, Label};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Contribution of one observed variable to the decision.
///
/// `log10_lr > 0` pushes toward spam, `< 0` toward legitimacy; the
/// magnitude is the strength of the evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationRecord {
    pub variable: String,
    pub state: u8,
    pub likelihood_ratio: f64,
    pub log10_lr: f64,
}

/// One record per observed variable, sorted by |log10 LR| descending so the
/// strongest evidence comes first. The sort is stable; ties keep the
/// evidence record's declaration order.
///
/// Explains, never decides: the threshold comparison lives elsewhere.
pub fn explain(
    kb: &KnowledgeBase,
    evidence: &Evidence,
) -> Result<Vec<ExplanationRecord>, SpamlensError> {
    let mut records = Vec::with_capacity(evidence.entries().len());
    for (name, state) in evidence.entries() {
        let cpt = kb.cpt(name)?;
        let p_ham = cpt.probability(state, Label::Ham)?;
        let p_spam = cpt.probability(state, Label::Spam)?;
        let lr = p_spam / p_ham;
        records.push(ExplanationRecord {
            variable: name.to_string(),
            state,
            likelihood_ratio: lr,
            log10_lr: lr.log10(),
        });
    }
    records.sort_by(|a, b| {
        b.log10_lr
            .abs()
            .partial_cmp(&a.log10_lr.abs())
            .unwrap_or(Ordering::Equal)
    });
    Ok(records)
}
