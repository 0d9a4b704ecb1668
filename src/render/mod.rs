pub mod pdf;
pub mod template;

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::record::{CodeDerivationError, JobRecord};
use crate::store::{self, ArtifactError};
use pdf::{PdfEngine, PdfError};
use template::Template;

/// What to do with a record that cannot be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OnInvalidRecord {
    /// Log it and carry on with the next record.
    #[default]
    Skip,
    /// Stop the stage at the first bad record.
    Abort,
}

/// Named template plus its style sheet, both inside `dir`.
#[derive(Debug, Clone)]
pub struct TemplateRef {
    pub dir: PathBuf,
    pub name: String,
    pub stylesheet: String,
}

impl TemplateRef {
    pub fn template_path(&self) -> PathBuf {
        self.dir.join(&self.name)
    }

    pub fn stylesheet_path(&self) -> PathBuf {
        self.dir.join(&self.stylesheet)
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot load template: {0}")]
    Template(ArtifactError),
    #[error("cannot prepare output directory: {0}")]
    OutputDir(ArtifactError),
    #[error("cannot name document for {label:?}: {source}")]
    Code {
        label: String,
        source: CodeDerivationError,
    },
    #[error("rendering {file} failed: {source}")]
    Pdf { file: String, source: PdfError },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub rendered: usize,
    pub skipped: usize,
}

/// Render one record to `<output_dir>/<derived code>.pdf`, replacing any
/// file of that name.
pub fn render_record(
    record: &JobRecord,
    template: &Template,
    stylesheet: Option<&str>,
    engine: &dyn PdfEngine,
    output_dir: &Path,
) -> Result<PathBuf, RenderError> {
    let code = record.derived_code().map_err(|source| RenderError::Code {
        label: record.label().to_string(),
        source,
    })?;
    let file = format!("{}.pdf", code);
    let output = output_dir.join(&file);

    let html = template.render(&template::context(record));
    engine
        .render(&html, stylesheet, &output)
        .map_err(|source| RenderError::Pdf { file, source })?;
    Ok(output)
}

/// Render every record, one document each, in input order.
pub fn render(
    records: &[JobRecord],
    template_ref: &TemplateRef,
    output_dir: &Path,
    engine: &dyn PdfEngine,
    policy: OnInvalidRecord,
) -> Result<RenderStats, RenderError> {
    let template = Template::load(&template_ref.template_path()).map_err(RenderError::Template)?;

    let stylesheet_path = template_ref.stylesheet_path();
    let stylesheet = match std::fs::read_to_string(&stylesheet_path) {
        Ok(css) => Some(css),
        Err(e) => {
            warn!("No style sheet at {:?} ({}), rendering unstyled", stylesheet_path, e);
            None
        }
    };

    store::ensure_dir(output_dir).map_err(RenderError::OutputDir)?;

    let mut stats = RenderStats::default();
    for record in records {
        info!("Generating PDF for job {}", record.label());
        match render_record(record, &template, stylesheet.as_deref(), engine, output_dir) {
            Ok(path) => {
                info!("PDF for job {} written to {:?}", record.label(), path);
                stats.rendered += 1;
            }
            Err(e) if policy == OnInvalidRecord::Skip => {
                warn!("Skipping job {}: {}", record.label(), e);
                stats.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(stats)
}
