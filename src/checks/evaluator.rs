//! Check evaluation against one recognition result.
//!
//! Every function here is pure. When recognition failed, the evidence-free
//! checks pass with a note about the failure so a flaky OCR service does not
//! fail the suite. The success-message check is the exception: claiming an
//! operation succeeded needs evidence, so it fails.

use super::keywords::{DEFAULT_ERROR_KEYWORDS, DEFAULT_SUCCESS_KEYWORDS};
use super::types::{CheckKind, CheckOutcome, CheckSpec, TextRequirement};
use crate::matcher::{self, MatchMode};
use crate::recognition::RecognitionResult;

/// Characters of recognized text kept on each outcome
const SNAPSHOT_CHARS: usize = 200;

/// Run every configured check, in order
pub fn evaluate(result: &RecognitionResult, checks: &[CheckSpec]) -> Vec<CheckOutcome> {
    checks.iter().map(|check| evaluate_one(result, check)).collect()
}

pub fn evaluate_one(result: &RecognitionResult, check: &CheckSpec) -> CheckOutcome {
    match check {
        CheckSpec::Title {
            expected,
            tolerance,
        } => check_title(result, expected, *tolerance),
        CheckSpec::RequiredTexts {
            texts,
            requirement,
            tolerance,
        } => check_required_texts(result, texts, *requirement, *tolerance),
        CheckSpec::ForbiddenTexts { custom } => check_no_errors(result, custom),
        CheckSpec::SuccessMessage { keywords } => check_success_message(result, keywords),
        CheckSpec::TableMinRows { min_rows } => check_table_rows(result, *min_rows),
    }
}

pub fn check_title(result: &RecognitionResult, expected: &str, tolerance: f64) -> CheckOutcome {
    if result.is_failed() {
        return fail_open(result, CheckKind::Title);
    }
    let passed = matcher::matches(&result.raw_text, expected, MatchMode::Partial, tolerance);
    let message = if passed {
        format!("Title '{}' found", expected)
    } else {
        format!(
            "Title '{}' not found (word match {:.0}%)",
            expected,
            matcher::match_ratio(&result.raw_text, expected) * 100.0
        )
    };
    outcome(result, CheckKind::Title, passed, message)
}

pub fn check_required_texts(
    result: &RecognitionResult,
    texts: &[String],
    requirement: TextRequirement,
    tolerance: f64,
) -> CheckOutcome {
    if result.is_failed() {
        return fail_open(result, CheckKind::RequiredTexts);
    }

    let (found, missing): (Vec<&String>, Vec<&String>) = texts
        .iter()
        .partition(|text| matcher::matches(&result.raw_text, text, MatchMode::Partial, tolerance));

    let passed = match requirement {
        TextRequirement::All => missing.is_empty(),
        TextRequirement::Any => texts.is_empty() || !found.is_empty(),
    };

    let message = if missing.is_empty() {
        format!("All {} expected texts found", texts.len())
    } else if passed {
        format!(
            "{}/{} expected texts found, missing: {}",
            found.len(),
            texts.len(),
            join_quoted(&missing)
        )
    } else {
        format!("Expected texts not found: {}", join_quoted(&missing))
    };
    outcome(result, CheckKind::RequiredTexts, passed, message)
}

pub fn check_no_errors(result: &RecognitionResult, custom: &[String]) -> CheckOutcome {
    if result.is_failed() {
        return fail_open(result, CheckKind::ForbiddenTexts);
    }

    let text = result.raw_text.to_lowercase();
    let mut keywords: Vec<String> = DEFAULT_ERROR_KEYWORDS.iter().map(|k| k.to_string()).collect();
    for keyword in custom {
        let keyword = keyword.trim().to_lowercase();
        if !keyword.is_empty() && !keywords.contains(&keyword) {
            keywords.push(keyword);
        }
    }

    let found: Vec<&String> = keywords.iter().filter(|k| text.contains(k.as_str())).collect();
    let passed = found.is_empty();
    let message = if passed {
        "No error text found".to_string()
    } else {
        format!("Error text found: {}", join_quoted(&found))
    };
    outcome(result, CheckKind::ForbiddenTexts, passed, message)
}

pub fn check_success_message(result: &RecognitionResult, keywords: &[String]) -> CheckOutcome {
    if result.is_failed() {
        return CheckOutcome {
            kind: CheckKind::SuccessMessage,
            passed: false,
            message: format!(
                "Cannot confirm success, recognition failed: {}",
                result.failure_reason()
            ),
            recognized_text_snapshot: None,
        };
    }

    let mut wanted: Vec<String> = keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();
    if wanted.is_empty() {
        wanted = DEFAULT_SUCCESS_KEYWORDS.iter().map(|k| k.to_string()).collect();
    }

    let text = result.raw_text.to_lowercase();
    let hit = wanted.iter().find(|k| text.contains(k.as_str()));
    let (passed, message) = match hit {
        Some(keyword) => (true, format!("Success message found: '{}'", keyword)),
        None => (
            false,
            format!("No success message found (looked for {})", join_quoted(&wanted)),
        ),
    };
    outcome(result, CheckKind::SuccessMessage, passed, message)
}

pub fn check_table_rows(result: &RecognitionResult, min_rows: usize) -> CheckOutcome {
    if result.is_failed() {
        return fail_open(result, CheckKind::TableMinRows);
    }

    let rows = result.total_table_rows();
    let passed = !result.tables.is_empty() && rows >= min_rows;
    let message = if result.tables.is_empty() {
        "No table recognized".to_string()
    } else if passed {
        format!("{} table(s) with {} rows (minimum {})", result.tables.len(), rows, min_rows)
    } else {
        format!("Only {} table rows recognized, expected at least {}", rows, min_rows)
    };
    outcome(result, CheckKind::TableMinRows, passed, message)
}

fn fail_open(result: &RecognitionResult, kind: CheckKind) -> CheckOutcome {
    CheckOutcome {
        kind,
        passed: true,
        message: format!(
            "Recognition failed ({}), {} check skipped",
            result.failure_reason(),
            kind
        ),
        recognized_text_snapshot: None,
    }
}

fn outcome(result: &RecognitionResult, kind: CheckKind, passed: bool, message: String) -> CheckOutcome {
    CheckOutcome {
        kind,
        passed,
        message,
        recognized_text_snapshot: Some(result.raw_text.chars().take(SNAPSHOT_CHARS).collect()),
    }
}

fn join_quoted<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|s| format!("'{}'", s.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}
