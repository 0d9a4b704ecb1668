//! HTML to PDF conversion through an external `wkhtmltopdf` binary.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("failed to start {binary:?}: {source}")]
    Spawn {
        binary: PathBuf,
        source: std::io::Error,
    },
    #[error("I/O error talking to the PDF engine: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF engine exited with {code:?}: {stderr}")]
    Exit { code: Option<i32>, stderr: String },
}

/// Turns one HTML document into a PDF file.
pub trait PdfEngine {
    fn render(&self, html: &str, stylesheet: Option<&str>, output: &Path) -> Result<(), PdfError>;
}

/// Insert `css` as a `<style>` block at the end of `<head>`, or at the top
/// when the document has no head.
pub fn inline_stylesheet(html: &str, css: &str) -> String {
    let style = format!("<style>{}</style>", css);
    match html.find("</head>") {
        Some(pos) => {
            let mut out = String::with_capacity(html.len() + style.len());
            out.push_str(&html[..pos]);
            out.push_str(&style);
            out.push_str(&html[pos..]);
            out
        }
        None => format!("{}{}", style, html),
    }
}

#[derive(Debug, Clone)]
pub struct WkHtmlToPdf {
    binary: PathBuf,
}

impl WkHtmlToPdf {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl PdfEngine for WkHtmlToPdf {
    fn render(&self, html: &str, stylesheet: Option<&str>, output: &Path) -> Result<(), PdfError> {
        let document = match stylesheet {
            Some(css) => inline_stylesheet(html, css),
            None => html.to_string(),
        };

        let mut child = Command::new(&self.binary)
            .args(["--quiet", "-"])
            .arg(output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| PdfError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(document.as_bytes())?;
        }

        let result = child.wait_with_output()?;
        if !result.status.success() {
            return Err(PdfError::Exit {
                code: result.status.code(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }
        debug!(output = ?output, "pdf written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::scratch_dir;

    #[test]
    fn style_goes_into_head() {
        let html = "<html><head><title>x</title></head><body></body></html>";
        assert_eq!(
            inline_stylesheet(html, "h1{color:red}"),
            "<html><head><title>x</title><style>h1{color:red}</style></head><body></body></html>"
        );
    }

    #[test]
    fn style_is_prepended_without_head() {
        assert_eq!(inline_stylesheet("<p>hi</p>", "p{}"), "<style>p{}</style><p>hi</p>");
    }

    #[test]
    fn missing_binary_is_a_spawn_error() {
        let dir = scratch_dir("pdf_missing_binary");
        let engine = WkHtmlToPdf::new(dir.join("no-such-wkhtmltopdf"));
        let err = engine.render("<p></p>", None, &dir.join("1.pdf")).unwrap_err();
        assert!(matches!(err, PdfError::Spawn { .. }));
    }
}
