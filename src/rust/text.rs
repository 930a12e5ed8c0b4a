//! Text normalization shared by training and prediction.
//!
//! Both [`crate::EmotionClassifier::load_corpus`] and
//! [`crate::EmotionClassifier::predict`] go through [`normalize`]; any
//! divergence between the two paths silently degrades accuracy.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DIGITS: Regex = Regex::new(r"\d+").unwrap();
    static ref NON_WORD: Regex = Regex::new(r"[\W_]+").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Normalizes raw text into the token string fed to the vectorizer.
///
/// Lowercases, replaces digit runs and runs of non-word characters
/// (underscore included) with a single space, then collapses whitespace
/// and trims. Total and idempotent.
///
/// # Example
/// ```
/// use cartas_emociones::text::normalize;
///
/// assert_eq!(normalize("¡Te AMO 100%, de verdad!"), "te amo de verdad");
/// assert_eq!(normalize("?!..."), "");
/// ```
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let no_digits = DIGITS.replace_all(&lowered, " ");
    let words_only = NON_WORD.replace_all(&no_digits, " ");
    WHITESPACE.replace_all(&words_only, " ").trim().to_string()
}

/// Normalizes an optional field; a missing value normalizes to `""`.
pub fn normalize_field(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}
