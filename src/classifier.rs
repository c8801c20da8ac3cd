use crate::config::Config;
use crate::error::SpamlensError;
use crate::evidence::{EmailInput, Evidence, EvidenceExtractor};
use crate::explain::{self, ExplanationRecord};
use crate::inference;
use crate::knowledge::KnowledgeBase;
use serde::{Deserialize, Serialize};

/// Full classification result for one email; the only data the hosting
/// layer persists or renders (typically serialized to JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub probability: f64,
    pub is_spam: bool,
    pub explanation: Vec<ExplanationRecord>,
    pub evidence: Evidence,
}

/// Facade composing extraction, inference, explanation, and the threshold
/// decision. Immutable after construction; classification is a pure,
/// CPU-bound call, so one instance serves any number of threads.
pub struct SpamClassifier {
    kb: KnowledgeBase,
    extractor: EvidenceExtractor,
    threshold: f64,
}

impl SpamClassifier {
    /// The knowledge base is built by the process entry point and handed in
    /// here; there is no hidden global instance.
    pub fn new(kb: KnowledgeBase, config: &Config) -> anyhow::Result<Self> {
        config.validate()?;
        kb.validate()?;
        let extractor = EvidenceExtractor::new(&kb)?;
        Ok(SpamClassifier {
            kb,
            extractor,
            threshold: config.spam_threshold,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn classify(&self, email: &EmailInput) -> Result<Verdict, SpamlensError> {
        let evidence = self.extractor.extract(email);
        let probability = inference::posterior_spam(&self.kb, &evidence)?;
        let explanation = explain::explain(&self.kb, &evidence)?;
        let is_spam = inference::decide(probability, self.threshold);
        log::debug!(
            "classified email: p(spam)={probability:.4} threshold={} -> {}",
            self.threshold,
            if is_spam { "spam" } else { "ham" }
        );
        Ok(Verdict {
            probability,
            is_spam,
            explanation,
            evidence,
        })
    }

    /// Batch entry point; same field shapes as the single-email call.
    pub fn classify_batch(
        &self,
        emails: &[EmailInput],
    ) -> Result<Vec<Verdict>, SpamlensError> {
        emails.iter().map(|e| self.classify(e)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> SpamClassifier {
        SpamClassifier::new(KnowledgeBase::default(), &Config::default()).unwrap()
    }

    fn email(subject: &str, body: &str, sender: &str) -> EmailInput {
        EmailInput {
            subject: Some(subject.to_string()),
            body: Some(body.to_string()),
            sender: Some(sender.to_string()),
        }
    }

    #[test]
    fn obvious_spam_scenario_is_flagged() {
        let c = classifier();
        let verdict = c
            .classify(&email(
                "URGENT: claim your FREE prize now!!!",
                "click http://bit.ly/xyz to claim",
                "promo@mailblast.com",
            ))
            .unwrap();
        assert_eq!(verdict.evidence.has_spam_keyword, 1);
        assert_eq!(verdict.evidence.has_short_url, 1);
        assert_eq!(verdict.evidence.many_exclamations, 1);
        assert_eq!(verdict.evidence.sender_unknown, 1);
        assert_eq!(verdict.evidence.free_domain, 0);
        assert!(verdict.probability > 0.55);
        assert!(verdict.is_spam);
    }

    #[test]
    fn known_contact_scenario_is_ham() {
        let c = classifier();
        let verdict = c
            .classify(&email(
                "Lecture notes for next week",
                "Hi, attached are the notes.",
                "profesor@universidad.edu",
            ))
            .unwrap();
        assert_eq!(verdict.evidence.has_spam_keyword, 0);
        assert_eq!(verdict.evidence.link_count, 0);
        assert_eq!(verdict.evidence.sender_unknown, 0);
        assert!(verdict.probability < 0.1);
        assert!(!verdict.is_spam);
    }

    #[test]
    fn empty_email_classifies_without_error() {
        let c = classifier();
        let verdict = c.classify(&EmailInput::default()).unwrap();
        assert_eq!(
            verdict.evidence,
            Evidence {
                sender_unknown: 1,
                ..Default::default()
            }
        );
        assert!((0.0..=1.0).contains(&verdict.probability));
    }

    #[test]
    fn classify_is_bit_identical_across_calls() {
        let c = classifier();
        let input = email(
            "URGENT: claim your FREE prize now!!!",
            "click http://bit.ly/xyz to claim",
            "promo@mailblast.com",
        );
        let a = c.classify(&input).unwrap();
        let b = c.classify(&input).unwrap();
        assert_eq!(a.probability.to_bits(), b.probability.to_bits());
        let order_a: Vec<&str> = a.explanation.iter().map(|r| r.variable.as_str()).collect();
        let order_b: Vec<&str> = b.explanation.iter().map(|r| r.variable.as_str()).collect();
        assert_eq!(order_a, order_b);
    }

    #[test]
    fn batch_matches_individual_results() {
        let c = classifier();
        let inputs = vec![
            email("hello", "see you tomorrow", "amigo@email.com"),
            email(
                "GANA dinero YA!!!",
                "transferencia inmediata, contacta por whatsapp",
                "x@gmail.com",
            ),
        ];
        let batch = c.classify_batch(&inputs).unwrap();
        assert_eq!(batch.len(), 2);
        for (input, verdict) in inputs.iter().zip(&batch) {
            let single = c.classify(input).unwrap();
            assert_eq!(single.probability.to_bits(), verdict.probability.to_bits());
            assert_eq!(single.is_spam, verdict.is_spam);
        }
        assert!(!batch[0].is_spam);
        assert!(batch[1].is_spam);
    }

    #[test]
    fn verdict_serializes_to_json() {
        let c = classifier();
        let verdict = c
            .classify(&email("hi", "short note", "amigo@email.com"))
            .unwrap();
        let json = serde_json::to_string(&verdict).unwrap();
        assert!(json.contains("\"probability\""));
        assert!(json.contains("\"explanation\""));
        let back: Verdict = serde_json::from_str(&json).unwrap();
        assert_eq!(back.is_spam, verdict.is_spam);
    }

    #[test]
    fn custom_threshold_changes_decision() {
        let kb = KnowledgeBase::default();
        let strict = Config {
            spam_threshold: 0.00001,
            ..Default::default()
        };
        let c = SpamClassifier::new(kb, &strict).unwrap();
        let verdict = c
            .classify(&email("hello", "see you tomorrow", "amigo@email.com"))
            .unwrap();
        // Even a clean email exceeds an absurdly low threshold.
        assert!(verdict.is_spam);
    }
}
