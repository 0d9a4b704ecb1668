//! Stage runners: each reads its input artifact, does its work and writes
//! its output artifact, printing a status line at the boundaries.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::crawler::{self, CrawlStats};
use crate::filter::{self, FilterCriteria};
use crate::render::{self, pdf::PdfEngine, OnInvalidRecord, RenderStats};
use crate::settings::{RunPaths, Settings};
use crate::store;

/// Fetch, filter and save job ids. A failed search fails the stage and
/// leaves any existing id file untouched.
pub async fn run_ids(settings: &Settings, filter_config: &Path, output: &Path) -> Result<usize> {
    let criteria = FilterCriteria::load(filter_config).context("Failed to load filter criteria")?;
    let client = crawler::build_client(settings.request_timeout())?;

    println!("Fetching job data from API...");
    let ids = filter::try_select_ids(&client, &settings.api_url, &criteria)
        .await
        .context("Could not fetch job ids")?;

    store::write_ids(output, &ids)?;
    println!("Saved {} job IDs to '{}'", ids.len(), output.display());
    Ok(ids.len())
}

pub async fn run_crawl(settings: &Settings, input: &Path, output: &Path) -> Result<CrawlStats> {
    let ids = store::read_ids(input)?;
    if ids.is_empty() {
        println!("No job IDs in '{}'. Run 'ids' first.", input.display());
    }

    let layout = Arc::new(settings.layout.compile()?);
    let client = crawler::build_client(settings.request_timeout())?;

    println!("Crawling {} job ads...", ids.len());
    let outcome = crawler::crawl(
        &client,
        &settings.detail_base_url,
        layout,
        &ids,
        settings.crawl_concurrency,
    )
    .await
    .context("Crawl failed")?;

    store::write_records(output, &outcome.records)?;
    println!(
        "Done: {} crawled ({} ok, {} errors). Saved to '{}'",
        outcome.stats.total,
        outcome.stats.ok,
        outcome.stats.errors,
        output.display()
    );
    Ok(outcome.stats)
}

pub fn run_render(
    settings: &Settings,
    input: &Path,
    output_dir: &Path,
    engine: &dyn PdfEngine,
    policy: OnInvalidRecord,
) -> Result<RenderStats> {
    println!("Loading job data from '{}'", input.display());
    let records = store::read_records(input)?;
    println!("Loaded {} jobs", records.len());

    let stats = render::render(&records, &settings.template_ref(), output_dir, engine, policy)?;
    println!(
        "Rendered {} PDFs to '{}' ({} skipped)",
        stats.rendered,
        output_dir.display(),
        stats.skipped
    );
    Ok(stats)
}

/// All three stages in order. Rendering is skipped when `engine` is `None`.
pub async fn run_all(
    settings: &Settings,
    paths: &RunPaths,
    engine: Option<&dyn PdfEngine>,
    policy: OnInvalidRecord,
) -> Result<()> {
    println!("Run directory: {}\n", paths.dir.display());

    println!("Stage 1: job ids");
    let count = run_ids(settings, &paths.filter_config, &paths.ids).await?;
    if count == 0 {
        println!("No job ads match the filter; nothing to crawl.");
        return Ok(());
    }

    println!("\nStage 2: crawl");
    run_crawl(settings, &paths.ids, &paths.records).await?;

    let Some(engine) = engine else {
        return Ok(());
    };
    println!("\nStage 3: render");
    run_render(settings, &paths.records, &paths.pdf_dir, engine, policy)?;
    Ok(())
}
