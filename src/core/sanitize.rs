//! Punctuation-token removal.

/// Tokens treated as punctuation markers rather than words: sentence-final
/// period, question mark, and the dash used as a disfluency marker.
pub const PUNCTUATION_MARKERS: [&str; 3] = [".", "?", "-"];

/// True when the token is a bare punctuation marker.
pub fn is_punctuation(word: &str) -> bool
{
    PUNCTUATION_MARKERS.contains(&word)
}

/// Remove punctuation-marker tokens, preserving order. No other
/// transformation: case, numerals, and compound words are left untouched.
pub fn sanitize(words: &[String]) -> Vec<String>
{
    words
        .iter()
        .filter(|w| !is_punctuation(w))
        .cloned()
        .collect()
}
