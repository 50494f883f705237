/// Words dropped from memo tokens.
pub const STOP_WORDS: [&str; 9] = ["the", "of", "and", "to", "in", "is", "for", "from", "a"];

fn is_kept_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | ' ')
}

/// Split a memo into keyword tokens.
///
/// Lower-cases, keeps only `[a-z0-9_ -]`, splits on whitespace, and drops
/// stop words. Applying it again to the joined output changes nothing.
pub fn tokenize(memo: &str) -> Vec<String> {
    let cleaned: String = memo
        .to_lowercase()
        .chars()
        .filter(|c| is_kept_char(*c))
        .collect();

    cleaned
        .split_whitespace()
        .filter(|token| !STOP_WORDS.contains(token))
        .map(str::to_string)
        .collect()
}
