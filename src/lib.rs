pub mod classifier;
pub mod config;
pub mod error;
pub mod evidence;
pub mod explain;
pub mod inference;
pub mod knowledge;

pub use classifier::{SpamClassifier, Verdict};
pub use config::Config;
pub use error::SpamlensError;
pub use evidence::{EmailInput, Evidence, EvidenceExtractor};
pub use explain::ExplanationRecord;
pub use inference::{decide, posterior_spam};
pub use knowledge::{KnowledgeBase, Label, VariableCpt, EPSILON};

/// Build a classifier from a loaded config: the knowledge base comes from
/// the configured YAML artifact when one is set, otherwise the built-in
/// canonical table. The caller owns the result and passes it wherever
/// classification happens; there is no global instance.
pub fn build_classifier(config: &Config) -> anyhow::Result<SpamClassifier> {
    let kb = match &config.knowledge_base {
        Some(path) => {
            log::info!("loading knowledge base from {path}");
            KnowledgeBase::from_file(path)?
        }
        None => KnowledgeBase::default(),
    };
    SpamClassifier::new(kb, config)
}
