//! Ordered, module-grouped registry of pages to validate.
//!
//! Registries are usually kept as JSON next to the application:
//!
//! ```json
//! {
//!   "modules": [
//!     {
//!       "name": "datasets",
//!       "pages": [
//!         { "name": "Dataset list", "route": "/datasets",
//!           "expectedTitle": "Datasets", "forbiddenTexts": [],
//!           "expectTable": true, "minTableRows": 1 }
//!       ]
//!     }
//!   ]
//! }
//! ```

pub mod types;

use serde::{Deserialize, Serialize};
use std::path::Path;

pub use types::{ModuleSpec, PageSpec, RegistryError, RegistryResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub modules: Vec<ModuleSpec>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a registry from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> RegistryResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> RegistryResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Append a module; pages run in the order given
    pub fn with_module(
        mut self,
        name: impl Into<String>,
        pages: impl IntoIterator<Item = PageSpec>,
    ) -> Self {
        self.modules.push(ModuleSpec {
            name: name.into(),
            pages: pages.into_iter().collect(),
        });
        self
    }

    /// Every page with its module name, in run order
    pub fn pages(&self) -> impl Iterator<Item = (&str, &PageSpec)> {
        self.modules
            .iter()
            .flat_map(|m| m.pages.iter().map(move |p| (m.name.as_str(), p)))
    }

    pub fn len(&self) -> usize {
        self.modules.iter().map(|m| m.pages.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{CheckKind, CheckSpec, TextRequirement};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_json_camel_case() {
        let registry = Registry::from_json(
            r#"{
                "modules": [
                    {"name": "quality", "pages": [
                        {"name": "Rules", "route": "/quality/rules",
                         "expectedTitle": "Quality Rules",
                         "expectedTexts": ["Rule name", "Status"],
                         "expectTable": true, "minTableRows": 2}
                    ]},
                    {"name": "empty"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(registry.len(), 1);
        let (module, page) = registry.pages().next().unwrap();
        assert_eq!(module, "quality");
        assert_eq!(page.expected_title.as_deref(), Some("Quality Rules"));
        assert_eq!(page.min_table_rows, Some(2));
        assert_eq!(page.forbidden_texts, None);
    }

    #[test]
    fn test_pages_keep_registry_order() {
        let registry = Registry::new()
            .with_module("datasets", [PageSpec::new("a", "/datasets"), PageSpec::new("b", "/datasets/new")])
            .with_module("metrics", [PageSpec::new("c", "/metrics")]);

        let names: Vec<(&str, &str)> = registry.pages().map(|(m, p)| (m, p.name.as_str())).collect();
        assert_eq!(names, vec![("datasets", "a"), ("datasets", "b"), ("metrics", "c")]);
    }

    #[test]
    fn test_missing_expectations_configure_nothing() {
        assert!(PageSpec::new("home", "/").checks(0.8).is_empty());
    }

    #[test]
    fn test_checks_lowering() {
        let page = PageSpec::new("jobs", "/training/jobs")
            .title("Training Jobs")
            .texts(["Job name", "Status"])
            .forbid(["quota exceeded"])
            .success(Vec::<String>::new())
            .table(3);

        let checks = page.checks(0.7);
        assert_eq!(
            checks,
            vec![
                CheckSpec::Title { expected: "Training Jobs".into(), tolerance: 0.7 },
                CheckSpec::RequiredTexts {
                    texts: vec!["Job name".into(), "Status".into()],
                    requirement: TextRequirement::Any,
                    tolerance: 0.7,
                },
                CheckSpec::ForbiddenTexts { custom: vec!["quota exceeded".into()] },
                CheckSpec::SuccessMessage { keywords: vec![] },
                CheckSpec::TableMinRows { min_rows: 3 },
            ]
        );
    }

    #[test]
    fn test_table_flags() {
        let mut page = PageSpec::new("t", "/t");
        page.expect_table = Some(true);
        assert_eq!(page.checks(0.8), vec![CheckSpec::TableMinRows { min_rows: 1 }]);

        page.expect_table = Some(false);
        page.min_table_rows = Some(5);
        assert!(page.checks(0.8).is_empty());

        page.expect_table = None;
        assert_eq!(page.checks(0.8)[0].kind(), CheckKind::TableMinRows);
    }

    #[test]
    fn test_blank_title_and_empty_texts_are_skipped() {
        let page = PageSpec::new("p", "/p").title("  ").texts(Vec::<String>::new());
        assert!(page.checks(0.8).is_empty());
    }

    #[test]
    fn test_from_file_missing() {
        let err = Registry::from_file("/nonexistent/registry.json").unwrap_err();
        assert!(matches!(err, RegistryError::Read { .. }));
    }
}
