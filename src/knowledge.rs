use crate::error::SpamlensError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Floor applied to every probability before it enters a ratio or a log.
/// The shipped tables never contain zeros, but operator-supplied tables are
/// only required to keep entries in (0,1].
pub const EPSILON: f64 = 1e-9;

/// The two states of the unobserved root label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Ham,
    Spam,
}

/// Conditional probability table for one evidence variable.
///
/// `rows[state]` holds `[P(state | ham), P(state | spam)]`; each column sums
/// to 1 across states. Cardinality is 2 for every variable except
/// `link_count`, which buckets 0 / 1 / 2-or-more URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableCpt {
    pub name: String,
    pub rows: Vec<[f64; 2]>,
}

impl VariableCpt {
    pub fn cardinality(&self) -> usize {
        self.rows.len()
    }

    /// Floored conditional probability of an observed state, or
    /// `StateOutOfRange` when the table has no row for it.
    pub fn probability(&self, state: u8, label: Label) -> Result<f64, SpamlensError> {
        let row = self
            .rows
            .get(state as usize)
            .ok_or_else(|| SpamlensError::StateOutOfRange {
                variable: self.name.clone(),
                state,
                cardinality: self.rows.len(),
            })?;
        let p = match label {
            Label::Ham => row[0],
            Label::Spam => row[1],
        };
        Ok(p.max(EPSILON))
    }
}

/// All tunable knowledge of the classifier: the prior, the per-variable
/// probability tables, and the lexical resources the extractor matches
/// against. Built once at startup and never mutated; re-tuning means
/// loading a replacement instance from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBase {
    /// P(IsSpam = spam). P(ham) is the complement.
    pub prior_spam: f64,
    /// One table per evidence variable, in declaration order.
    pub cpts: Vec<VariableCpt>,
    /// Keywords matched as case-insensitive substrings of subject+body.
    pub spam_keywords: Vec<String>,
    /// Regex fragments naming URL-shortener domains.
    pub short_url_patterns: Vec<String>,
    /// Regexes for phone numbers and messaging-app handles.
    pub phone_patterns: Vec<String>,
    /// Regexes for cryptocurrency terms.
    pub crypto_patterns: Vec<String>,
    /// Single regex for currency symbols and money-related keywords.
    pub money_pattern: String,
    /// Whitelisted sender addresses (normalized, lower-case).
    pub known_contacts: HashSet<String>,
    /// Domains of free email providers.
    pub free_email_domains: HashSet<String>,
}

impl KnowledgeBase {
    pub fn prior(&self) -> f64 {
        self.prior_spam
    }

    /// Table lookup by variable name.
    pub fn cpt(&self, name: &str) -> Result<&VariableCpt, SpamlensError> {
        self.cpts
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| SpamlensError::UnknownVariable(name.to_string()))
    }

    /// Declared variables as `(name, cardinality)` in declaration order.
    pub fn variables(&self) -> impl Iterator<Item = (&str, usize)> {
        self.cpts.iter().map(|c| (c.name.as_str(), c.rows.len()))
    }

    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let kb: KnowledgeBase = serde_yaml::from_str(&content)?;
        kb.validate()?;
        Ok(kb)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Probabilistic sanity checks, run on every load. Schema agreement with
    /// the compiled evidence record is checked at classification time
    /// instead, so a divergent table fails fast on first use.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.prior_spam > 0.0 && self.prior_spam < 1.0) {
            anyhow::bail!("prior_spam must be in (0,1), got {}", self.prior_spam);
        }
        for cpt in &self.cpts {
            let k = cpt.rows.len();
            if k != 2 && k != 3 {
                anyhow::bail!("variable {} has cardinality {k}, expected 2 or 3", cpt.name);
            }
            for (state, row) in cpt.rows.iter().enumerate() {
                for p in row {
                    if !(*p > 0.0 && *p <= 1.0) {
                        anyhow::bail!(
                            "variable {} state {state} has probability {p} outside (0,1]",
                            cpt.name
                        );
                    }
                }
            }
            for col in 0..2 {
                let sum: f64 = cpt.rows.iter().map(|r| r[col]).sum();
                if (sum - 1.0).abs() > 1e-6 {
                    anyhow::bail!(
                        "variable {} column {col} sums to {sum}, expected 1.0",
                        cpt.name
                    );
                }
            }
        }
        Ok(())
    }
}

impl Default for KnowledgeBase {
    /// The canonical expert-authored table: prior 0.47, strong keyword rule,
    /// link count as the only three-state variable. Provenance is recorded
    /// in DESIGN.md; operators swap in a different table via YAML.
    fn default() -> Self {
        fn cpt(name: &str, rows: &[[f64; 2]]) -> VariableCpt {
            VariableCpt {
                name: name.to_string(),
                rows: rows.to_vec(),
            }
        }
        KnowledgeBase {
            prior_spam: 0.47,
            cpts: vec![
                // rows[state] = [P(state|ham), P(state|spam)]
                cpt("has_spam_keyword", &[[0.99, 0.10], [0.01, 0.90]]),
                cpt("link_count", &[[0.70, 0.20], [0.25, 0.30], [0.05, 0.50]]),
                cpt("has_short_url", &[[0.98, 0.80], [0.02, 0.20]]),
                cpt("many_exclamations", &[[0.95, 0.75], [0.05, 0.25]]),
                cpt("has_money_symbol", &[[0.97, 0.30], [0.03, 0.70]]),
                cpt("caps_excess", &[[0.98, 0.70], [0.02, 0.30]]),
                cpt("long_subject", &[[0.90, 0.80], [0.10, 0.20]]),
                cpt("sender_unknown", &[[0.60, 0.05], [0.40, 0.95]]),
                cpt("free_domain", &[[0.75, 0.45], [0.25, 0.55]]),
                cpt("has_phone_or_messaging", &[[0.97, 0.60], [0.03, 0.40]]),
                cpt("has_crypto_terms", &[[0.99, 0.50], [0.01, 0.50]]),
            ],
            spam_keywords: [
                // marketing and offers
                "oferta", "gratis", "premio", "descuento", "gana", "click", "clic",
                "promoción", "bono", "cupón",
                // urgency and fear
                "urgente", "urgent", "limitado", "actividad sospechosa", "suspendida",
                "bloqueada", "verificación", "verifique",
                // finance and crypto
                "dinero", "transferencia", "ganador", "lotería", "préstamo", "herencia",
                "ingresos pasivos", "bitcoin", "cripto", "nft", "airdrop", "wallet",
                "mercado", "valores",
                // brand phishing
                "paypal", "amazon", "netflix", "apple", "desbloquear",
                // adult content
                "adultos", "citas", "solteros", "perfil", "mensaje", "tímido", "xxx", "natural",
                "tamaño", "aument",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            short_url_patterns: [
                r"bit\.ly", r"tinyurl", r"t\.co", r"goo\.gl", r"ow\.ly", r"is\.gd",
                r"cutt\.ly",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            phone_patterns: [
                r"\b\+?\d{7,}\b",
                r"\b\+?\d{2,3}[-\s]?\d{3}[-\s]?\d{3,4}[-\s]?\d{3,4}\b",
                r"\b(whatsapp|wa\.me|whats\.app)\b",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            crypto_patterns: [r"\b(bitcoin|btc|eth(ereum)?|usdt?|wallet|metamask)\b"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            money_pattern: r"[€$]|payment|transfer|price|precio|transferencia|pago|oferta"
                .to_string(),
            known_contacts: ["amigo@email.com", "profesor@universidad.edu"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            free_email_domains: [
                "gmail.com", "yahoo.com", "hotmail.com", "outlook.com", "aol.com",
                "proton.me",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}
