use crate::knowledge::KnowledgeBase;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

/// Raw email fields as handed over by the web layer. Absent fields are
/// treated as empty strings, never as an error.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct EmailInput {
    pub subject: Option<String>,
    pub body: Option<String>,
    pub sender: Option<String>,
}

/// Observed evidence for one email, one field per declared variable.
///
/// A fixed-schema record instead of a name/state map: the extractor cannot
/// under-produce, and coverage of the compiled schema is checked at compile
/// time. All fields are binary except `link_count` (0, 1, or 2-or-more).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub has_spam_keyword: u8,
    pub link_count: u8,
    pub has_short_url: u8,
    pub many_exclamations: u8,
    pub has_money_symbol: u8,
    pub caps_excess: u8,
    pub long_subject: u8,
    pub sender_unknown: u8,
    pub free_domain: u8,
    pub has_phone_or_messaging: u8,
    pub has_crypto_terms: u8,
}

impl Evidence {
    /// `(variable, state)` pairs in declaration order. This order is also
    /// the tie-break for explanation sorting.
    pub fn entries(&self) -> [(&'static str, u8); 11] {
        [
            ("has_spam_keyword", self.has_spam_keyword),
            ("link_count", self.link_count),
            ("has_short_url", self.has_short_url),
            ("many_exclamations", self.many_exclamations),
            ("has_money_symbol", self.has_money_symbol),
            ("caps_excess", self.caps_excess),
            ("long_subject", self.long_subject),
            ("sender_unknown", self.sender_unknown),
            ("free_domain", self.free_domain),
            ("has_phone_or_messaging", self.has_phone_or_messaging),
            ("has_crypto_terms", self.has_crypto_terms),
        ]
    }

    pub fn state_of(&self, name: &str) -> Option<u8> {
        self.entries()
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, s)| *s)
    }
}

/// Deterministic mapping from raw email fields to an evidence record.
/// All patterns are compiled once from the knowledge base's lexical
/// resources; extraction itself is pure and side-effect free.
pub struct EvidenceExtractor {
    spam_keywords: Vec<String>,
    known_contacts: HashSet<String>,
    free_email_domains: HashSet<String>,
    url_re: Regex,
    email_re: Regex,
    money_re: Regex,
    short_url_res: Vec<Regex>,
    phone_res: Vec<Regex>,
    crypto_res: Vec<Regex>,
}

impl EvidenceExtractor {
    pub fn new(kb: &KnowledgeBase) -> anyhow::Result<Self> {
        let compile_all = |patterns: &[String]| -> anyhow::Result<Vec<Regex>> {
            patterns.iter().map(|p| Ok(Regex::new(p)?)).collect()
        };
        Ok(EvidenceExtractor {
            spam_keywords: kb
                .spam_keywords
                .iter()
                .map(|w| w.to_lowercase())
                .collect(),
            known_contacts: kb
                .known_contacts
                .iter()
                .map(|c| c.to_lowercase())
                .collect(),
            free_email_domains: kb
                .free_email_domains
                .iter()
                .map(|d| d.to_lowercase())
                .collect(),
            url_re: Regex::new(r#"https?://[^\s'"<>)+]+"#)?,
            email_re: Regex::new(r"[\w.-]+@[\w.-]+\.\w+")?,
            money_re: Regex::new(&kb.money_pattern)?,
            short_url_res: compile_all(&kb.short_url_patterns)?,
            phone_res: compile_all(&kb.phone_patterns)?,
            crypto_res: compile_all(&kb.crypto_patterns)?,
        })
    }

    /// Extract the first `user@domain` token from a sender header and
    /// lower-case it; falls back to the trimmed, lower-cased raw value.
    pub fn normalize_sender(&self, sender: &str) -> String {
        match self.email_re.find(sender) {
            Some(m) => m.as_str().to_lowercase(),
            None => sender.trim().to_lowercase(),
        }
    }

    pub fn extract(&self, email: &EmailInput) -> Evidence {
        let subject = email.subject.as_deref().unwrap_or("");
        let body = email.body.as_deref().unwrap_or("");
        let sender = email.sender.as_deref().unwrap_or("");

        let low_body = body.to_lowercase();
        let combined_low = format!("{subject} {body}").to_lowercase();

        let has_spam_keyword = self
            .spam_keywords
            .iter()
            .any(|w| combined_low.contains(w.as_str()));

        // Only well-formed http(s) URLs count toward the link bucket.
        let combined = format!("{body} {subject}");
        let urls: Vec<&str> = self
            .url_re
            .find_iter(&combined)
            .map(|m| m.as_str())
            .filter(|u| Url::parse(u).is_ok())
            .collect();
        let link_count = match urls.len() {
            0 => 0u8,
            1 => 1,
            _ => 2,
        };
        let joined_urls = urls.join(" ").to_lowercase();
        let has_short_url = !urls.is_empty()
            && self.short_url_res.iter().any(|re| re.is_match(&joined_urls));

        let many_exclamations =
            body.matches('!').count() + subject.matches('!').count() >= 3;

        let has_money_symbol = self.money_re.is_match(&low_body);

        // Uppercase ratio over the subject only; short subjects are exempt
        // so greetings like "HI!" are not penalized.
        let letters = subject.chars().filter(|c| c.is_alphabetic()).count();
        let uppers = subject.chars().filter(|c| c.is_uppercase()).count();
        let caps_ratio = if letters > 0 {
            uppers as f64 / letters as f64
        } else {
            0.0
        };
        let subject_len = subject.chars().count();
        let caps_excess = caps_ratio > 0.6 && subject_len >= 6;

        let long_subject = subject_len > 60;

        let from_email = self.normalize_sender(sender);
        let domain = from_email.rsplit_once('@').map(|(_, d)| d).unwrap_or("");
        let sender_unknown = !self.known_contacts.contains(&from_email);
        let free_domain = self.free_email_domains.contains(domain);

        let has_phone_or_messaging =
            self.phone_res.iter().any(|re| re.is_match(&low_body));
        let has_crypto_terms =
            self.crypto_res.iter().any(|re| re.is_match(&low_body));

        Evidence {
            has_spam_keyword: has_spam_keyword as u8,
            link_count,
            has_short_url: has_short_url as u8,
            many_exclamations: many_exclamations as u8,
            has_money_symbol: has_money_symbol as u8,
            caps_excess: caps_excess as u8,
            long_subject: long_subject as u8,
            sender_unknown: sender_unknown as u8,
            free_domain: free_domain as u8,
            has_phone_or_messaging: has_phone_or_messaging as u8,
            has_crypto_terms: has_crypto_terms as u8,
        }
    }
}
