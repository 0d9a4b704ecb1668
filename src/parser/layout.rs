use scraper::Selector;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid {name} selector {selector:?}: {reason}")]
pub struct LayoutError {
    pub name: &'static str,
    pub selector: String,
    pub reason: String,
}

/// Record fields that are read positionally from the shared info selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoField {
    Code,
    EntryType,
    Location,
    Company,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoMapping {
    pub field: InfoField,
    pub index: usize,
}

/// Where each field lives on a job ad detail page.
///
/// The info block is positional: the n-th text of `info_selector` is the
/// field mapped to index n. A layout change on the site is an edit to
/// `info_fields`, not to the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionLayout {
    pub title_selector: String,
    pub info_selector: String,
    pub info_fields: Vec<InfoMapping>,
    pub tasks_selector: String,
    pub requirements_selector: String,
}

impl Default for ExtractionLayout {
    fn default() -> Self {
        Self {
            title_selector: "h1.margin-bottom-gutter".into(),
            info_selector: "span.jobad-base-info-content".into(),
            info_fields: vec![
                InfoMapping { field: InfoField::Code, index: 0 },
                InfoMapping { field: InfoField::EntryType, index: 1 },
                InfoMapping { field: InfoField::Location, index: 2 },
                InfoMapping { field: InfoField::Company, index: 3 },
            ],
            tasks_selector: "#aria-panel-task > div > ul > li > span".into(),
            requirements_selector: "#aria-panel-your-profile > div > ul > li > span".into(),
        }
    }
}

/// Layout with its selectors parsed once, shared by every page extraction.
#[derive(Debug, Clone)]
pub struct CompiledLayout {
    pub title: Selector,
    pub info: Selector,
    pub info_fields: Vec<InfoMapping>,
    pub tasks: Selector,
    pub requirements: Selector,
}

impl ExtractionLayout {
    pub fn compile(&self) -> Result<CompiledLayout, LayoutError> {
        Ok(CompiledLayout {
            title: parse_selector("title", &self.title_selector)?,
            info: parse_selector("info", &self.info_selector)?,
            info_fields: self.info_fields.clone(),
            tasks: parse_selector("tasks", &self.tasks_selector)?,
            requirements: parse_selector("requirements", &self.requirements_selector)?,
        })
    }
}

fn parse_selector(name: &'static str, selector: &str) -> Result<Selector, LayoutError> {
    Selector::parse(selector).map_err(|e| LayoutError {
        name,
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_compiles() {
        let compiled = ExtractionLayout::default().compile().unwrap();
        assert_eq!(compiled.info_fields.len(), 4);
    }

    #[test]
    fn bad_selector_names_the_field() {
        let layout = ExtractionLayout {
            tasks_selector: "div[".into(),
            ..Default::default()
        };
        let err = layout.compile().unwrap_err();
        assert_eq!(err.name, "tasks");
        assert_eq!(err.selector, "div[");
    }

    #[test]
    fn info_fields_deserialize_from_snake_case() {
        let layout: ExtractionLayout = serde_json::from_str(
            r#"{ "info_fields": [ { "field": "location", "index": 0 }, { "field": "code", "index": 2 } ] }"#,
        )
        .unwrap();
        assert_eq!(layout.info_fields[0].field, InfoField::Location);
        assert_eq!(layout.info_fields[1].index, 2);
        assert_eq!(layout.title_selector, "h1.margin-bottom-gutter");
    }
}
