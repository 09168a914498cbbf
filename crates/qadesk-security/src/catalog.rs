//! Ordered registry of redaction rules
//!
//! Rules run one category at a time and each sees the output of the rules
//! before it. Narrow shapes come before broad ones: card numbers (13-16
//! digits) and mobile numbers (10 digits) must be consumed before the
//! account-number rule (9-18 digits) can see them.

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::MaskError;

/// Single character used when a masked value keeps its length
pub const MASK_CHAR: char = '*';
pub const CARD_PREFIX: &str = "************";
pub const CVV_MASK: &str = "***";
pub const SSN_MASK: &str = "***-**-****";
pub const SECRET_MASK: &str = "********";
pub const DOB_PLACEHOLDER: &str = "DD/MM/YYYY";
pub const TRANSACTION_ID_PLACEHOLDER: &str = "TXN-XXXX";
pub const USER_ID_PLACEHOLDER: &str = "USER-XXXX";
pub const CUSTOMER_ID_PLACEHOLDER: &str = "CUST-XXXX";
pub const ADDRESS_PLACEHOLDER: &str = "[ADDRESS REDACTED]";

/// Kind of sensitive data a redaction covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// URL obfuscation stage
    Url,
    /// Structured-record stage
    Record,
    CardNumber,
    Cvv,
    Ssn,
    Credential,
    Email,
    Mobile,
    DateOfBirth,
    TransactionId,
    Address,
    UserId,
    CustomerId,
    AccountNumber,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Record => "record",
            Self::CardNumber => "card_number",
            Self::Cvv => "cvv",
            Self::Ssn => "ssn",
            Self::Credential => "credential",
            Self::Email => "email",
            Self::Mobile => "mobile",
            Self::DateOfBirth => "date_of_birth",
            Self::TransactionId => "transaction_id",
            Self::Address => "address",
            Self::UserId => "user_id",
            Self::CustomerId => "customer_id",
            Self::AccountNumber => "account_number",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a detected match is rewritten
#[derive(Clone, Copy)]
pub enum ReplacementPolicy {
    /// The whole match becomes a fixed string
    Fixed(&'static str),
    /// Only the last `visible` digits survive. Hidden digits become
    /// `prefix`, or one [`MASK_CHAR`] each when there is no prefix.
    PartialRevealSuffix {
        visible: usize,
        prefix: Option<&'static str>,
    },
    /// `key = value` forms keep key and separator, the value becomes the
    /// placeholder (quotes around the value are kept)
    StructuralRewrite(&'static str),
    /// Replacement computed from the captures
    Callback(fn(&Captures<'_>) -> Result<String, MaskError>),
}

impl ReplacementPolicy {
    pub fn render(&self, caps: &Captures<'_>) -> Result<String, MaskError> {
        match self {
            Self::Fixed(replacement) => Ok((*replacement).to_string()),
            Self::PartialRevealSuffix { visible, prefix } => {
                reveal_suffix(&caps[0], *visible, *prefix)
            }
            Self::StructuralRewrite(placeholder) => rewrite_field(caps, placeholder),
            Self::Callback(transform) => transform(caps),
        }
    }
}

impl fmt::Debug for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(replacement) => f.debug_tuple("Fixed").field(replacement).finish(),
            Self::PartialRevealSuffix { visible, prefix } => f
                .debug_struct("PartialRevealSuffix")
                .field("visible", visible)
                .field("prefix", prefix)
                .finish(),
            Self::StructuralRewrite(placeholder) => {
                f.debug_tuple("StructuralRewrite").field(placeholder).finish()
            }
            Self::Callback(_) => f.write_str("Callback"),
        }
    }
}

fn reveal_suffix(matched: &str, visible: usize, prefix: Option<&str>) -> Result<String, MaskError> {
    let digits: Vec<char> = matched.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < visible {
        return Err(MaskError::TooFewDigits {
            found: digits.len(),
            visible,
        });
    }

    let hidden = digits.len() - visible;
    let mut out = match prefix {
        Some(prefix) => prefix.to_string(),
        None => MASK_CHAR.to_string().repeat(hidden),
    };
    out.extend(&digits[hidden..]);
    Ok(out)
}

fn rewrite_field(caps: &Captures<'_>, placeholder: &str) -> Result<String, MaskError> {
    let open = caps.name("open").map_or("", |m| m.as_str());
    let close = caps.name("close").map_or("", |m| m.as_str());
    if open != close {
        return Err(MaskError::UnbalancedQuote);
    }

    let value = if caps.name("dq").is_some() {
        format!("\"{placeholder}\"")
    } else if caps.name("sq").is_some() {
        format!("'{placeholder}'")
    } else {
        let bare = caps.name("bare").map_or("", |m| m.as_str());
        if bare.starts_with(['"', '\'']) {
            return Err(MaskError::UnbalancedQuote);
        }
        placeholder.to_string()
    };

    Ok(format!("{open}{}{close}{}{value}", &caps["key"], &caps["sep"]))
}

fn mask_email(caps: &Captures<'_>) -> Result<String, MaskError> {
    Ok(format!("{}****@{}", &caps["first"], &caps["domain"]))
}

/// Detector for `key = value` / `"key": "value"` forms over the given keys
fn field_detector(keys: &str) -> Regex {
    Regex::new(&format!(
        r#"(?i)(?P<open>["']?)\b(?P<key>{keys})\b(?P<close>["']?)(?P<sep>[ \t]*[:=][ \t]*)(?:"(?P<dq>[^"\n]*)"|'(?P<sq>[^'\n]*)'|(?P<bare>[^\s,;}}]+))"#
    ))
    .unwrap()
}

/// One redaction rule
#[derive(Debug, Clone)]
pub struct MaskRule {
    pub category: Category,
    pub detector: Regex,
    pub policy: ReplacementPolicy,
    /// Skip matches glued to `-`, `/`, `*`, `+`, or to a digit across `.`/`,`,
    /// so fragments of dates, SSNs and earlier masks are left alone
    pub standalone: bool,
}

impl MaskRule {
    pub fn new(category: Category, detector: Regex, policy: ReplacementPolicy) -> Self {
        Self {
            category,
            detector,
            policy,
            standalone: false,
        }
    }

    pub fn standalone(mut self) -> Self {
        self.standalone = true;
        self
    }

    /// Whether the match at `start..end` of `text` may be rewritten
    pub fn accepts(&self, text: &str, start: usize, end: usize) -> bool {
        if !self.standalone {
            return true;
        }

        let mut before = text[..start].chars().rev();
        let mut after = text[end..].chars();
        !joins(before.next(), before.next()) && !joins(after.next(), after.next())
    }
}

/// `adjacent` touches the match, `beyond` is the character past it
fn joins(adjacent: Option<char>, beyond: Option<char>) -> bool {
    match adjacent {
        Some('-' | '/' | '*' | '+') => true,
        Some('.' | ',') => beyond.is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

static STANDARD: LazyLock<Arc<PatternCatalog>> = LazyLock::new(|| {
    use Category::*;
    use ReplacementPolicy::*;

    let rules = vec![
        MaskRule::new(
            CardNumber,
            Regex::new(r"\b(?:\d[ -]?){12,15}\d\b").unwrap(),
            PartialRevealSuffix {
                visible: 4,
                prefix: Some(CARD_PREFIX),
            },
        ),
        MaskRule::new(Cvv, Regex::new(r"\b\d{3,4}\b").unwrap(), Fixed(CVV_MASK)).standalone(),
        MaskRule::new(Ssn, Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap(), Fixed(SSN_MASK)),
        MaskRule::new(
            Credential,
            field_detector(r"password|passwd|pwd|passcode|access[_-]?token|token|api[_-]?key|secret|pin|otp"),
            StructuralRewrite(SECRET_MASK),
        ),
        MaskRule::new(
            Email,
            Regex::new(
                r"\b(?P<first>[A-Za-z0-9])[A-Za-z0-9._%+-]*@(?P<domain>[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,})\b",
            )
            .unwrap(),
            Callback(mask_email),
        ),
        MaskRule::new(
            Mobile,
            Regex::new(r"\b\d{10}\b").unwrap(),
            PartialRevealSuffix {
                visible: 4,
                prefix: None,
            },
        ),
        MaskRule::new(
            DateOfBirth,
            Regex::new(r"\b\d{2}[/-]\d{2}[/-]\d{4}\b").unwrap(),
            Fixed(DOB_PLACEHOLDER),
        ),
        MaskRule::new(
            TransactionId,
            field_detector(r"transaction[_ -]?id|txn[_ -]?id"),
            StructuralRewrite(TRANSACTION_ID_PLACEHOLDER),
        ),
        // The house number may already carry the cvv mask
        MaskRule::new(
            Address,
            Regex::new(
                r"(?:\b\d{1,5}|\*{3})\s+(?:[A-Z][A-Za-z]*\s+){0,3}(?:Street|St|Road|Rd|Avenue|Ave|Lane|Ln|Boulevard|Blvd|Drive|Dr|Way|Court|Ct|Marg|Nagar)\.?,\s*[A-Z][A-Za-z]+(?:\s+[A-Z][A-Za-z]+)*",
            )
            .unwrap(),
            Fixed(ADDRESS_PLACEHOLDER),
        ),
        MaskRule::new(
            UserId,
            field_detector(r"user[_ -]?id"),
            StructuralRewrite(USER_ID_PLACEHOLDER),
        ),
        MaskRule::new(
            CustomerId,
            field_detector(r"customer[_ -]?id|cust[_ -]?id"),
            StructuralRewrite(CUSTOMER_ID_PLACEHOLDER),
        ),
        MaskRule::new(
            AccountNumber,
            Regex::new(r"\b\d{9,18}\b").unwrap(),
            PartialRevealSuffix {
                visible: 4,
                prefix: None,
            },
        ),
    ];

    Arc::new(PatternCatalog::new(rules))
});

/// The ordered list of rules the category sweep applies
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    rules: Vec<MaskRule>,
}

impl PatternCatalog {
    pub fn new(rules: Vec<MaskRule>) -> Self {
        Self { rules }
    }

    /// The built-in catalog, compiled once per process
    pub fn standard() -> Arc<PatternCatalog> {
        Arc::clone(&STANDARD)
    }

    pub fn rules(&self) -> &[MaskRule] {
        &self.rules
    }

    pub fn categories(&self) -> Vec<Category> {
        self.rules.iter().map(|rule| rule.category).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
