use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Accent-fold a name for comparison and prefix search.
///
/// NFKD-decomposes and drops combining marks, so "Québec" and "Quebec"
/// compare equal. Case is preserved; the search queries are already
/// case-insensitive.
pub fn remove_accents(input: &str) -> String {
    input.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}
