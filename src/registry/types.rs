use serde::{Deserialize, Serialize};

use crate::checks::{CheckSpec, TextRequirement};

/// Declarative description of one page to validate
///
/// Every expectation is optional; a missing one means the matching check
/// is not run at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSpec {
    /// Human readable page name
    pub name: String,

    /// Route of the page, relative to the application base URL
    pub route: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_texts: Option<Vec<String>>,

    /// Extra error keywords; presence (even empty) enables the error check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forbidden_texts: Option<Vec<String>>,

    /// Success keywords; empty uses the default success keywords
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_texts: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect_table: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_table_rows: Option<usize>,

    /// How `expected_texts` are combined, defaults to any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_requirement: Option<TextRequirement>,
}

impl PageSpec {
    pub fn new(name: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            route: route.into(),
            ..Default::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.expected_title = Some(title.into());
        self
    }

    pub fn texts(mut self, texts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.expected_texts = Some(texts.into_iter().map(Into::into).collect());
        self
    }

    pub fn require(mut self, requirement: TextRequirement) -> Self {
        self.text_requirement = Some(requirement);
        self
    }

    pub fn forbid(mut self, keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.forbidden_texts = Some(keywords.into_iter().map(Into::into).collect());
        self
    }

    pub fn success(mut self, keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.success_texts = Some(keywords.into_iter().map(Into::into).collect());
        self
    }

    pub fn table(mut self, min_rows: usize) -> Self {
        self.expect_table = Some(true);
        self.min_table_rows = Some(min_rows);
        self
    }

    /// Lower the configured expectations into checks, in catalog order.
    ///
    /// `tolerance` applies to the title and expected-text matches.
    pub fn checks(&self, tolerance: f64) -> Vec<CheckSpec> {
        let mut checks = Vec::new();

        if let Some(expected) = self.expected_title.as_deref().filter(|t| !t.trim().is_empty()) {
            checks.push(CheckSpec::Title {
                expected: expected.to_string(),
                tolerance,
            });
        }

        if let Some(texts) = self.expected_texts.as_ref().filter(|t| !t.is_empty()) {
            checks.push(CheckSpec::RequiredTexts {
                texts: texts.clone(),
                requirement: self.text_requirement.unwrap_or_default(),
                tolerance,
            });
        }

        if let Some(custom) = &self.forbidden_texts {
            checks.push(CheckSpec::ForbiddenTexts {
                custom: custom.clone(),
            });
        }

        if let Some(keywords) = &self.success_texts {
            checks.push(CheckSpec::SuccessMessage {
                keywords: keywords.clone(),
            });
        }

        // An explicit `expectTable: false` wins over a stray row minimum
        let wants_table = match self.expect_table {
            Some(expect) => expect,
            None => self.min_table_rows.is_some(),
        };
        if wants_table {
            checks.push(CheckSpec::TableMinRows {
                min_rows: self.min_table_rows.unwrap_or(1),
            });
        }

        checks
    }
}

/// A functional module and its pages, in run order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleSpec {
    pub name: String,
    #[serde(default)]
    pub pages: Vec<PageSpec>,
}

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Failed to read registry {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse registry: {0}")]
    Parse(#[from] serde_json::Error),
}
