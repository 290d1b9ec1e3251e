//! PII detection and redaction (component A).
//!
//! Rules are evaluated in order; a rule with a validator discards any match
//! the validator rejects. Replacement happens right-to-left so earlier match
//! offsets stay valid while later ones are substituted.

use crate::error::{MindopsError, MindopsResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RedactionMatch {
    pub label: String,
    pub value: String,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionResult {
    pub original: String,
    pub redacted: String,
    pub matches: Vec<RedactionMatch>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrubReport {
    pub total_fields: usize,
    pub total_redactions: usize,
    pub by_label: HashMap<String, usize>,
}

type Validator = fn(&str) -> bool;

#[derive(Clone)]
pub struct PatternRule {
    pub label: &'static str,
    pub regex: &'static Lazy<Regex>,
    pub validator: Option<Validator>,
}

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}").unwrap());
static SSN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap());
static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:\+?1[-.\s]?)?(?:\(\d{3}\)|\d{3})[-.\s]?\d{3}[-.\s]?\d{4}\b").unwrap()
});
static IPV4_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").unwrap());
static CREDIT_CARD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:\d[ -]*?){13,19}\b").unwrap());
static API_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:AKIA|ASIA)[0-9A-Z]{16}\b").unwrap());

fn luhn_valid(candidate: &str) -> bool {
    let digits: Vec<u32> = candidate.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() < 13 {
        return false;
    }
    let parity = digits.len() % 2;
    let mut checksum = 0u32;
    for (idx, digit) in digits.iter().enumerate() {
        let mut d = *digit;
        if idx % 2 == parity {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        checksum += d;
    }
    checksum % 10 == 0
}

fn is_ipv4(candidate: &str) -> bool {
    let parts: Vec<&str> = candidate.split('.').collect();
    if parts.len() != 4 {
        return false;
    }
    parts.iter().all(|part| match part.parse::<i64>() {
        Ok(v) => (0..=255).contains(&v),
        Err(_) => false,
    })
}

pub fn default_rules() -> Vec<PatternRule> {
    vec![
        PatternRule {
            label: "email",
            regex: &EMAIL_RE,
            validator: None,
        },
        PatternRule {
            label: "ssn",
            regex: &SSN_RE,
            validator: None,
        },
        PatternRule {
            label: "phone",
            regex: &PHONE_RE,
            validator: None,
        },
        PatternRule {
            label: "ipv4",
            regex: &IPV4_RE,
            validator: Some(is_ipv4),
        },
        PatternRule {
            label: "credit_card",
            regex: &CREDIT_CARD_RE,
            validator: Some(luhn_valid),
        },
        PatternRule {
            label: "api_key",
            regex: &API_KEY_RE,
            validator: None,
        },
    ]
}

#[derive(Debug, Clone)]
pub struct ScrubberConfig {
    pub redaction_token: String,
    pub enabled_labels: Option<Vec<String>>,
}

impl Default for ScrubberConfig {
    fn default() -> Self {
        Self {
            redaction_token: "[REDACTED]".to_string(),
            enabled_labels: None,
        }
    }
}

pub struct PiiScrubber {
    config: ScrubberConfig,
    rules: Vec<PatternRule>,
}

impl Default for PiiScrubber {
    fn default() -> Self {
        Self::new(ScrubberConfig::default(), default_rules())
            .expect("default scrubber config has no enabled_labels to validate")
    }
}

impl PiiScrubber {
    /// Rejects a config whose `enabled_labels` names a label no rule in
    /// `rules` defines, so a typo'd label silently disables scrubbing
    /// instead of failing at construction.
    pub fn new(config: ScrubberConfig, rules: Vec<PatternRule>) -> MindopsResult<Self> {
        if let Some(labels) = &config.enabled_labels {
            let known: Vec<&str> = rules.iter().map(|rule| rule.label).collect();
            for label in labels {
                if !known.contains(&label.as_str()) {
                    return Err(MindopsError::InputInvalid(format!("unknown PII label: {label}")));
                }
            }
        }
        Ok(Self { config, rules })
    }

    fn active_rules(&self) -> Vec<&PatternRule> {
        match &self.config.enabled_labels {
            None => self.rules.iter().collect(),
            Some(labels) => self
                .rules
                .iter()
                .filter(|rule| labels.iter().any(|l| l == rule.label))
                .collect(),
        }
    }

    pub fn scrub_text(&self, text: &str) -> RedactionResult {
        let mut matches = Vec::new();
        for rule in self.active_rules() {
            for m in rule.regex.find_iter(text) {
                let value = m.as_str();
                if let Some(validator) = rule.validator {
                    if !validator(value) {
                        continue;
                    }
                }
                matches.push(RedactionMatch {
                    label: rule.label.to_string(),
                    value: value.to_string(),
                    start: m.start(),
                    end: m.end(),
                });
            }
        }

        let mut ordered = matches.clone();
        ordered.sort_by(|a, b| b.start.cmp(&a.start));
        let mut redacted = text.to_string();
        for m in &ordered {
            redacted.replace_range(m.start..m.end, &self.config.redaction_token);
        }

        RedactionResult {
            original: text.to_string(),
            redacted,
            matches,
        }
    }

    pub fn scrub_object(&self, value: &Value) -> (Value, ScrubReport, Vec<RedactionMatch>) {
        let mut total_fields = 0usize;
        let mut redactions = Vec::new();
        let scrubbed = self.scrub_value(value, &mut total_fields, &mut redactions);
        let report = build_report(total_fields, &redactions);
        (scrubbed, report, redactions)
    }

    fn scrub_value(
        &self,
        value: &Value,
        total_fields: &mut usize,
        redactions: &mut Vec<RedactionMatch>,
    ) -> Value {
        match value {
            Value::String(s) => {
                *total_fields += 1;
                let result = self.scrub_text(s);
                redactions.extend(result.matches);
                Value::String(result.redacted)
            }
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.scrub_value(item, total_fields, redactions))
                    .collect(),
            ),
            Value::Object(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (key, val) in map {
                    out.insert(key.clone(), self.scrub_value(val, total_fields, redactions));
                }
                Value::Object(out)
            }
            other => other.clone(),
        }
    }

    pub fn scrub_records(&self, records: &[Value]) -> (Vec<Value>, ScrubReport) {
        let mut total_fields = 0usize;
        let mut redactions = Vec::new();
        let results = records
            .iter()
            .map(|record| {
                let (scrubbed, report, matches) = self.scrub_object(record);
                total_fields += report.total_fields;
                redactions.extend(matches);
                scrubbed
            })
            .collect();
        let report = build_report(total_fields, &redactions);
        (results, report)
    }
}

fn build_report(total_fields: usize, redactions: &[RedactionMatch]) -> ScrubReport {
    let mut by_label: HashMap<String, usize> = HashMap::new();
    for m in redactions {
        *by_label.entry(m.label.clone()).or_insert(0) += 1;
    }
    ScrubReport {
        total_fields,
        total_redactions: redactions.len(),
        by_label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrub_text_redacts_default_rule_set() {
        let scrubber = PiiScrubber::default();
        let text = "Email alice@example.com SSN 123-45-6789 IP 192.168.0.1 CC 4111-1111-1111-1111";
        let result = scrubber.scrub_text(text);

        let mut labels: Vec<&str> = result.matches.iter().map(|m| m.label.as_str()).collect();
        labels.sort();
        assert_eq!(labels, vec!["credit_card", "email", "ipv4", "ssn"]);

        let second_pass = scrubber.scrub_text(&result.redacted);
        assert!(second_pass.matches.is_empty());
    }

    #[test]
    fn ipv4_rejects_out_of_range_octets() {
        let scrubber = PiiScrubber::default();
        let result = scrubber.scrub_text("host 999.999.999.999 is unreachable");
        assert!(result.matches.iter().all(|m| m.label != "ipv4"));
    }

    #[test]
    fn credit_card_rejects_failed_luhn() {
        let scrubber = PiiScrubber::default();
        let result = scrubber.scrub_text("card 4111-1111-1111-1112 declined");
        assert!(result.matches.iter().all(|m| m.label != "credit_card"));
    }

    #[test]
    fn enabled_labels_narrow_active_rules() {
        let config = ScrubberConfig {
            redaction_token: "[REDACTED]".to_string(),
            enabled_labels: Some(vec!["email".to_string()]),
        };
        let scrubber = PiiScrubber::new(config, default_rules()).unwrap();
        let result = scrubber.scrub_text("alice@example.com and 192.168.0.1");
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].label, "email");
    }

    #[test]
    fn unknown_enabled_label_is_rejected() {
        let config = ScrubberConfig {
            redaction_token: "[REDACTED]".to_string(),
            enabled_labels: Some(vec!["email".to_string(), "bitcoin_address".to_string()]),
        };
        let err = PiiScrubber::new(config, default_rules()).unwrap_err();
        assert!(matches!(err, MindopsError::InputInvalid(_)));
    }

    #[test]
    fn scrub_object_recurses_through_structure() {
        let scrubber = PiiScrubber::default();
        let payload = serde_json::json!({
            "user": {"email": "bob@example.com"},
            "notes": ["call 555-123-4567", "no pii here"],
        });
        let (scrubbed, report, _) = scrubber.scrub_object(&payload);
        assert_eq!(report.total_fields, 3);
        assert!(report.total_redactions >= 2);
        assert_eq!(scrubbed["user"]["email"], "[REDACTED]");
    }
}
