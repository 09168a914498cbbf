//! Masking pipeline

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::{Category, MaskRule, PatternCatalog};
use crate::record::{RECORD_BLOCK, redact_record_with};
use crate::url::obfuscate_counting;

/// Number of rewrites made for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redaction {
    pub category: Category,
    pub count: usize,
}

/// A match that was left unmasked because its replacement failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Degradation {
    pub category: Category,
    /// Byte offset of the match in the span the failing stage received:
    /// the URL-obfuscated text for records, the swept segment or record value
    /// for catalog rules
    pub offset: usize,
    pub reason: String,
}

/// Masked text together with what happened on the way
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaskReport {
    pub text: String,
    pub redactions: Vec<Redaction>,
    pub degraded: Vec<Degradation>,
}

impl MaskReport {
    pub fn count(&self, category: Category) -> usize {
        self.redactions
            .iter()
            .filter(|r| r.category == category)
            .map(|r| r.count)
            .sum()
    }

    pub fn total(&self) -> usize {
        self.redactions.iter().map(|r| r.count).sum()
    }

    fn record(&mut self, category: Category, count: usize) {
        if count == 0 {
            return;
        }
        match self.redactions.iter_mut().find(|r| r.category == category) {
            Some(existing) => existing.count += count,
            None => self.redactions.push(Redaction { category, count }),
        }
    }
}

/// Applies URL obfuscation, record redaction and the pattern catalog.
///
/// Cheap to clone; the catalog is shared.
#[derive(Debug, Clone)]
pub struct MaskingEngine {
    catalog: Arc<PatternCatalog>,
}

impl MaskingEngine {
    pub fn new() -> Self {
        Self::with_catalog(PatternCatalog::standard())
    }

    pub fn with_catalog(catalog: Arc<PatternCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    /// Mask sensitive data in `text`. Never fails.
    pub fn mask(&self, text: &str) -> String {
        self.mask_with_report(text).text
    }

    /// Mask sensitive data in `text` and report every rewrite and failure
    pub fn mask_with_report(&self, text: &str) -> MaskReport {
        let mut report = MaskReport::default();

        let (text, urls) = obfuscate_counting(text);
        report.record(Category::Url, urls);

        let text = self.redact_records(&text, &mut report);

        for degradation in &report.degraded {
            warn!(
                category = %degradation.category,
                offset = degradation.offset,
                reason = %degradation.reason,
                "left match unmasked"
            );
        }
        debug!(redactions = report.total(), degraded = report.degraded.len(), "masked text");

        report.text = text;
        report
    }

    /// Redact every record block and sweep the text around it. Values inside
    /// a parsed record are swept one by one, never the serialized JSON.
    fn redact_records(&self, text: &str, report: &mut MaskReport) -> String {
        let mut out = String::with_capacity(text.len());
        let mut records = 0;
        let mut last = 0;

        for block in RECORD_BLOCK.find_iter(text) {
            out.push_str(&self.sweep(&text[last..block.start()], report));

            match redact_record_with(block.as_str(), |value| self.sweep(value, report)) {
                Ok(rewrite) => {
                    records += rewrite.fields;
                    out.push_str(&rewrite.text);
                }
                Err(e) => {
                    report.degraded.push(Degradation {
                        category: Category::Record,
                        offset: block.start(),
                        reason: e.to_string(),
                    });
                    out.push_str(&self.sweep(block.as_str(), report));
                }
            }
            last = block.end();
        }
        out.push_str(&self.sweep(&text[last..], report));

        report.record(Category::Record, records);
        out
    }

    /// Run every catalog rule over `text`, in order
    fn sweep(&self, text: &str, report: &mut MaskReport) -> String {
        let mut text = text.to_string();
        for rule in self.catalog.rules() {
            if text.is_empty() {
                break;
            }
            text = apply_rule(rule, &text, report);
        }
        text
    }
}

impl Default for MaskingEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewrite every accepted match of `rule`. A match whose replacement
/// fails keeps its source text; the rest of the sweep continues.
fn apply_rule(rule: &MaskRule, text: &str, report: &mut MaskReport) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut count = 0;

    for caps in rule.detector.captures_iter(text) {
        let Some(m) = caps.get(0) else {
            continue;
        };
        if !rule.accepts(text, m.start(), m.end()) {
            continue;
        }

        match rule.policy.render(&caps) {
            Ok(replacement) => {
                out.push_str(&text[last..m.start()]);
                out.push_str(&replacement);
                last = m.end();
                count += 1;
            }
            Err(e) => report.degraded.push(Degradation {
                category: rule.category,
                offset: m.start(),
                reason: e.to_string(),
            }),
        }
    }

    out.push_str(&text[last..]);
    report.record(rule.category, count);
    out
}
