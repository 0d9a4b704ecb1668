use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use itertools::Itertools;
use regex::{Captures, Regex};

use crate::record::JobRecord;
use crate::store::ArtifactError;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap());

/// HTML template with `{{ name }}` placeholders.
///
/// Values go in verbatim. Unknown names render as nothing.
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
}

impl Template {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        std::fs::read_to_string(path)
            .map(Self::new)
            .map_err(|source| ArtifactError::Io {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn render(&self, context: &HashMap<&str, String>) -> String {
        PLACEHOLDER_RE
            .replace_all(&self.source, |caps: &Captures| {
                context.get(&caps[1]).cloned().unwrap_or_default()
            })
            .into_owned()
    }
}

fn list_markup(items: &[String]) -> String {
    items.iter().map(|item| format!("<li>{}</li>", item)).join("\n")
}

/// Template context for one record.
pub fn context(record: &JobRecord) -> HashMap<&'static str, String> {
    let text = |field: &Option<String>| field.clone().unwrap_or_default();
    HashMap::from([
        ("title", text(&record.title)),
        ("code", text(&record.code)),
        ("entry_type", text(&record.entry_type)),
        ("location", text(&record.location)),
        ("company", text(&record.company)),
        ("tasks", list_markup(&record.tasks)),
        ("requirements", list_markup(&record.requirements)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_all_seven_fields() {
        let template = Template::new(
            "<h1>{{ title }}</h1><p>{{code}} | {{ entry_type }} | {{ location }} | {{ company }}</p>\
             <ul>{{ tasks }}</ul><ul>{{ requirements }}</ul>",
        );
        let record = JobRecord {
            title: Some("Data Engineer".into()),
            code: Some("Job Nr. 045".into()),
            entry_type: Some("Berufserfahrene".into()),
            location: Some("Berlin".into()),
            company: Some("Example AG".into()),
            tasks: vec!["ETL".into(), "Reporting".into()],
            requirements: vec!["SQL".into()],
        };

        let html = template.render(&context(&record));
        assert_eq!(
            html,
            "<h1>Data Engineer</h1><p>Job Nr. 045 | Berufserfahrene | Berlin | Example AG</p>\
             <ul><li>ETL</li>\n<li>Reporting</li></ul><ul><li>SQL</li></ul>"
        );
    }

    #[test]
    fn absent_and_unknown_values_render_empty() {
        let template = Template::new("[{{ location }}][{{ salary }}][{{ tasks }}]");
        let html = template.render(&context(&JobRecord::default()));
        assert_eq!(html, "[][][]");
    }

    #[test]
    fn values_are_not_escaped() {
        let template = Template::new("{{ title }}");
        let record = JobRecord {
            title: Some("R&D <Lead>".into()),
            ..Default::default()
        };
        assert_eq!(template.render(&context(&record)), "R&D <Lead>");
    }
}
