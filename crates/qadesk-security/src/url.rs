//! URL obfuscation

use std::sync::LazyLock;

use regex::Regex;

/// Character every alphanumeric URL character is rewritten to
pub const OBFUSCATION_CHAR: char = 'x';

static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[A-Za-z0-9./]+").unwrap());

/// Rewrite every URL so its letters and digits become [`OBFUSCATION_CHAR`].
///
/// Separators (`:`, `/`, `.`) are kept, so the URL keeps its shape.
pub fn obfuscate_urls(text: &str) -> String {
    obfuscate_counting(text).0
}

pub(crate) fn obfuscate_counting(text: &str) -> (String, usize) {
    let mut count = 0;
    let result = URL_REGEX.replace_all(text, |caps: &regex::Captures<'_>| {
        count += 1;
        obfuscate(&caps[0])
    });
    (result.into_owned(), count)
}

fn obfuscate(url: &str) -> String {
    url.chars()
        .map(|c| if c.is_ascii_alphanumeric() { OBFUSCATION_CHAR } else { c })
        .collect()
}
