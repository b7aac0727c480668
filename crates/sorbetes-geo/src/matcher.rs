//! Exact and fuzzy matching of free-text input against a gazetteer.

use crate::gazetteer::{Gazetteer, GazetteerSet};
use crate::normalize::normalize;

/// A fuzzy candidate is accepted only when its similarity strictly exceeds
/// this bound. 0.70 exactly does NOT match.
pub const FUZZY_THRESHOLD: f64 = 0.70;

/// Lower bar used when collecting "did you mean" suggestions.
pub const SUGGESTION_THRESHOLD: f64 = 0.50;

/// Suggestions are capped at this many distinct canonical names.
pub const MAX_SUGGESTIONS: usize = 3;

/// Shown when nothing clears even the suggestion bar.
pub const NO_SUGGESTION_FALLBACK: &str = "no similar location found";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Fuzzy,
    None,
}

impl MatchKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MatchKind::Exact => "exact",
            MatchKind::Fuzzy => "fuzzy",
            MatchKind::None => "none",
        }
    }
}

/// Outcome of matching one input string against one gazetteer.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub kind: MatchKind,
    /// Canonical display name; present for `Exact` and `Fuzzy`.
    pub canonical: Option<String>,
    /// Similarity in [0, 1]; present for `Fuzzy` only.
    pub score: Option<f64>,
    /// Ranked canonical suggestions; populated for `None`.
    pub suggestions: Vec<String>,
}

impl MatchResult {
    #[must_use]
    pub fn is_match(&self) -> bool {
        !matches!(self.kind, MatchKind::None)
    }
}

/// Matches city and province input against injected gazetteers.
///
/// Holds immutable data only, so a single instance is safely shared across
/// any number of concurrent resolution calls.
#[derive(Debug, Clone)]
pub struct Matcher {
    cities: Gazetteer,
    provinces: Gazetteer,
}

impl Matcher {
    #[must_use]
    pub fn new(cities: Gazetteer, provinces: Gazetteer) -> Self {
        Self { cities, provinces }
    }

    #[must_use]
    pub fn from_set(set: GazetteerSet) -> Self {
        Self::new(set.cities, set.provinces)
    }

    #[must_use]
    pub fn match_city(&self, input: &str) -> MatchResult {
        match_against(&self.cities, input)
    }

    #[must_use]
    pub fn match_province(&self, input: &str) -> MatchResult {
        match_against(&self.provinces, input)
    }
}

fn match_against(gazetteer: &Gazetteer, input: &str) -> MatchResult {
    let needle = normalize(input);

    // Empty input never matches, and must not score 1.0 against an empty
    // variant in the fuzzy pass.
    if needle.is_empty() {
        return MatchResult {
            kind: MatchKind::None,
            canonical: None,
            score: None,
            suggestions: vec![NO_SUGGESTION_FALLBACK.to_string()],
        };
    }

    // Exact pass: scan every variant in declaration order. First hit wins,
    // which keeps overlapping variant sets deterministic.
    for entry in gazetteer.entries() {
        if entry.variants.iter().any(|v| *v == needle) {
            return MatchResult {
                kind: MatchKind::Exact,
                canonical: Some(entry.canonical.clone()),
                score: None,
                suggestions: Vec::new(),
            };
        }
    }

    // Fuzzy pass: single best-scoring (entry, variant) pair, strict-greater
    // updates so equal scores keep the earlier entry.
    let mut best: Option<(f64, &str)> = None;
    for entry in gazetteer.entries() {
        for variant in &entry.variants {
            let score = similarity(&needle, variant);
            if best.is_none_or(|(top, _)| score > top) {
                best = Some((score, entry.canonical.as_str()));
            }
        }
    }

    if let Some((score, canonical)) = best {
        if score > FUZZY_THRESHOLD {
            return MatchResult {
                kind: MatchKind::Fuzzy,
                canonical: Some(canonical.to_string()),
                score: Some(score),
                suggestions: vec![canonical.to_string()],
            };
        }
    }

    MatchResult {
        kind: MatchKind::None,
        canonical: None,
        score: None,
        suggestions: suggestions_for(gazetteer, &needle),
    }
}

/// Collect up to [`MAX_SUGGESTIONS`] distinct canonical names scoring above
/// [`SUGGESTION_THRESHOLD`], ordered by descending score with gazetteer
/// declaration order breaking ties.
fn suggestions_for(gazetteer: &Gazetteer, needle: &str) -> Vec<String> {
    let mut scored: Vec<(f64, &str)> = Vec::new();
    for entry in gazetteer.entries() {
        let best = entry
            .variants
            .iter()
            .map(|v| similarity(needle, v))
            .fold(0.0_f64, f64::max);
        if best > SUGGESTION_THRESHOLD {
            scored.push((best, entry.canonical.as_str()));
        }
    }

    // Stable sort preserves declaration order among equal scores.
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    if scored.is_empty() {
        return vec![NO_SUGGESTION_FALLBACK.to_string()];
    }

    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, canonical)| canonical.to_string())
        .collect()
}

/// Similarity between two strings: `(max_len - levenshtein) / max_len`.
///
/// 1.0 means equal, 0.0 means nothing in common. Both strings are expected
/// to be normalized already.
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    let a_len = a.chars().count();
    let b_len = b.chars().count();
    let max_len = a_len.max(b_len);
    if max_len == 0 {
        return 1.0;
    }
    let distance = levenshtein(a, b);
    #[allow(clippy::cast_precision_loss)]
    {
        (max_len - distance) as f64 / max_len as f64
    }
}

/// Classic Levenshtein distance (insert/delete/substitute, unit costs) over
/// whole strings, two-row DP.
#[must_use]
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    let mut prev_row: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr_row = vec![0; b_chars.len() + 1];

    for (i, a_ch) in a_chars.iter().enumerate() {
        curr_row[0] = i + 1;
        for (j, b_ch) in b_chars.iter().enumerate() {
            let cost = usize::from(a_ch != b_ch);
            curr_row[j + 1] = (prev_row[j + 1] + 1)
                .min(curr_row[j] + 1)
                .min(prev_row[j] + cost);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_chars.len()]
}
