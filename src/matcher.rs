//! Text presence matching over recognized text.
//!
//! OCR output is noisy: characters get merged, split or dropped. Matching
//! therefore lower-cases both sides and, in [`MatchMode::Partial`], falls back
//! to counting how many needle words appear anywhere in the haystack. Words
//! are matched by substring containment, so `"monitor"` is found inside
//! `"monitoring"`.

use serde::{Deserialize, Serialize};

/// How a needle is compared against recognized text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Normalized strings must be equal
    Exact,
    /// Substring containment, then word-ratio fallback
    Partial,
}

/// Decide whether `needle` is present in `haystack`.
///
/// `tolerance` is the minimum fraction of needle words that must be found
/// for a partial match and is clamped to `[0, 1]`. It is ignored in
/// [`MatchMode::Exact`].
pub fn matches(haystack: &str, needle: &str, mode: MatchMode, tolerance: f64) -> bool {
    let haystack = haystack.to_lowercase();
    let needle = needle.to_lowercase();

    match mode {
        MatchMode::Exact => haystack == needle,
        MatchMode::Partial => {
            if haystack.contains(&needle) {
                return true;
            }
            word_ratio(&haystack, &needle) >= tolerance.clamp(0.0, 1.0)
        }
    }
}

/// Fraction of whitespace-separated needle words found in the haystack.
///
/// A needle with no words yields `1.0`.
pub fn match_ratio(haystack: &str, needle: &str) -> f64 {
    word_ratio(&haystack.to_lowercase(), &needle.to_lowercase())
}

/// Both inputs must already be lower-cased.
fn word_ratio(haystack: &str, needle: &str) -> f64 {
    let words: Vec<&str> = needle.split_whitespace().collect();
    if words.is_empty() {
        return 1.0;
    }
    let found = words.iter().filter(|word| haystack.contains(**word)).count();
    found as f64 / words.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_is_case_insensitive() {
        assert!(matches("Dashboard", "dashboard", MatchMode::Exact, 1.0));
        assert!(!matches("Dashboard ", "dashboard", MatchMode::Exact, 1.0));
    }

    #[test]
    fn test_partial_substring() {
        assert!(matches(
            "Welcome to the Dashboard area",
            "Dashboard",
            MatchMode::Partial,
            0.8
        ));
    }

    #[test]
    fn test_partial_word_ratio_non_contiguous() {
        let haystack = "quality monitoring dashboard for data";
        let needle = "data quality monitor";
        assert_eq!(match_ratio(haystack, needle), 1.0);
        assert!(matches(haystack, needle, MatchMode::Partial, 0.8));
    }

    #[test]
    fn test_partial_below_tolerance() {
        // 1 of 3 words present
        let haystack = "metrics overview";
        let needle = "quality rule metrics";
        assert!(!matches(haystack, needle, MatchMode::Partial, 0.8));
        assert!(matches(haystack, needle, MatchMode::Partial, 0.3));
    }

    #[test]
    fn test_word_substring_is_permissive() {
        // "rule" hides inside "rulebook", which still counts
        assert!(matches("open the rulebook", "rule set open", MatchMode::Partial, 0.6));
    }

    #[test]
    fn test_empty_needle_is_vacuous() {
        assert!(matches("anything", "   ", MatchMode::Partial, 1.0));
        assert_eq!(match_ratio("anything", ""), 1.0);
    }

    #[test]
    fn test_tolerance_monotonicity() {
        let haystack = "training job list status running";
        let needles = ["training jobs queue", "job status", "model registry", "list"];
        let tolerances = [0.0, 0.2, 0.34, 0.5, 0.67, 0.8, 1.0];

        for needle in needles {
            for (i, t1) in tolerances.iter().enumerate() {
                if matches(haystack, needle, MatchMode::Partial, *t1) {
                    for t2 in &tolerances[..=i] {
                        assert!(
                            matches(haystack, needle, MatchMode::Partial, *t2),
                            "{needle:?} matched at {t1} but not at {t2}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_tolerance_is_clamped() {
        assert!(matches("alpha", "alpha beta", MatchMode::Partial, -1.0));
        assert!(!matches("alpha", "alpha beta", MatchMode::Partial, 7.0));
    }
}
