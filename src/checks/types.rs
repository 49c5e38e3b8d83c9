use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_TOLERANCE;

/// The fixed catalog of page checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckKind {
    Title,
    RequiredTexts,
    ForbiddenTexts,
    SuccessMessage,
    TableMinRows,
}

impl CheckKind {
    pub fn label(self) -> &'static str {
        match self {
            CheckKind::Title => "title",
            CheckKind::RequiredTexts => "requiredTexts",
            CheckKind::ForbiddenTexts => "forbiddenTexts",
            CheckKind::SuccessMessage => "successMessage",
            CheckKind::TableMinRows => "tableMinRows",
        }
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// How the individual matches of a multi-text check are combined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextRequirement {
    /// Every text must be found
    All,
    /// One found text is enough
    #[default]
    Any,
}

/// Result of one check against one recognition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub kind: CheckKind,
    pub passed: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recognized_text_snapshot: Option<String>,
}

/// A configured check, lowered from a page specification
///
/// Only checks a page actually configures are ever constructed, so an
/// absent setting can never turn into a failing check.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckSpec {
    Title {
        expected: String,
        tolerance: f64,
    },
    RequiredTexts {
        texts: Vec<String>,
        requirement: TextRequirement,
        tolerance: f64,
    },
    ForbiddenTexts {
        /// Checked in addition to the default error keywords
        custom: Vec<String>,
    },
    SuccessMessage {
        /// Empty means the default success keywords
        keywords: Vec<String>,
    },
    TableMinRows {
        min_rows: usize,
    },
}

impl CheckSpec {
    pub fn title(expected: impl Into<String>) -> Self {
        CheckSpec::Title {
            expected: expected.into(),
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    pub fn kind(&self) -> CheckKind {
        match self {
            CheckSpec::Title { .. } => CheckKind::Title,
            CheckSpec::RequiredTexts { .. } => CheckKind::RequiredTexts,
            CheckSpec::ForbiddenTexts { .. } => CheckKind::ForbiddenTexts,
            CheckSpec::SuccessMessage { .. } => CheckKind::SuccessMessage,
            CheckSpec::TableMinRows { .. } => CheckKind::TableMinRows,
        }
    }
}
