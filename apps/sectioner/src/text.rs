//! Text helpers shared by the classifiers and the presence matcher.
//!
//! Everything here operates on already-lowercased input unless the function
//! name says otherwise (`fold` is the entry point that lowercases).

use std::sync::LazyLock;

use regex::Regex;

/// Suffixes accepted after a keyword so that "troubleshoot" matches
/// "troubleshooting" and "fiber" matches "fibers".
const INFLECTIONS: &[&str] = &["s", "es", "d", "ed", "ing", "er", "ers"];

static WORD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}][\p{L}\p{N}+#]*").expect("valid word regex"));

/// Lowercases, trims, collapses inner whitespace and strips trailing
/// heading punctuation ("Experience:" → "experience").
pub fn fold(s: &str) -> String {
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_end_matches([':', '-', '.', '|'])
        .trim()
        .to_lowercase()
}

/// Whole-phrase containment: `phrase` must start and end on word boundaries.
pub fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    find_term(haystack, phrase, false)
}

/// Keyword containment: like `contains_phrase`, but a short inflectional
/// suffix may follow the keyword.
pub fn contains_term(haystack: &str, term: &str) -> bool {
    find_term(haystack, term, true)
}

fn find_term(haystack: &str, term: &str, allow_inflection: bool) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return false;
    }
    haystack.match_indices(term).any(|(start, _)| {
        let starts_word = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        if !starts_word {
            return false;
        }
        let suffix: String = haystack[start + term.len()..]
            .chars()
            .take_while(|c| c.is_alphanumeric())
            .collect();
        suffix.is_empty() || (allow_inflection && INFLECTIONS.contains(&suffix.as_str()))
    })
}

/// Lowercased word tokens. `+` and `#` stay attached so "c++" and "c#"
/// survive as tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD_REGEX
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Character-level Levenshtein distance.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Edit-distance similarity ratio in [0, 1]: `1 - distance / longer_len`.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}
