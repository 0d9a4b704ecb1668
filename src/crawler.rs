use std::sync::Arc;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::parser::{self, layout::CompiledLayout};
use crate::record::{CandidateId, JobRecord};

const USER_AGENT: &str = concat!("jobads-scraper/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("fetching job {id} failed: {source}")]
    Fetch {
        id: CandidateId,
        source: reqwest::Error,
    },
    #[error("job {id} answered HTTP {status}")]
    Status {
        id: CandidateId,
        status: reqwest::StatusCode,
    },
    #[error("all {total} detail page fetches failed")]
    AllFailed { total: usize },
}

/// Crawl stats returned after completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlStats {
    pub total: usize,
    pub ok: usize,
    pub errors: usize,
}

#[derive(Debug)]
pub struct CrawlOutcome {
    /// Records in input id order; failed ids leave no entry.
    pub records: Vec<JobRecord>,
    pub stats: CrawlStats,
}

pub fn build_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}

pub fn detail_url(base_url: &str, id: CandidateId) -> String {
    format!("{}{}", base_url, id)
}

/// Fetch one detail page and extract its record.
pub async fn extract(
    client: &reqwest::Client,
    base_url: &str,
    layout: &CompiledLayout,
    id: CandidateId,
) -> Result<JobRecord, CrawlError> {
    let url = detail_url(base_url, id);
    let start = Instant::now();

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|source| CrawlError::Fetch { id, source })?;
    let status = response.status();
    if !status.is_success() {
        return Err(CrawlError::Status { id, status });
    }
    let html = response
        .text()
        .await
        .map_err(|source| CrawlError::Fetch { id, source })?;

    debug!(id, latency_ms = start.elapsed().as_millis() as u64, "fetched {}", url);
    Ok(parser::parse_job_page(&html, layout))
}

/// Fetch and extract every id with at most `concurrency` requests in flight.
///
/// A failed id is logged and skipped. The whole crawl fails only when
/// every id of a non-empty input failed.
pub async fn crawl(
    client: &reqwest::Client,
    base_url: &str,
    layout: Arc<CompiledLayout>,
    ids: &[CandidateId],
    concurrency: usize,
) -> Result<CrawlOutcome, CrawlError> {
    let total = ids.len();
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let base_url: Arc<str> = Arc::from(base_url);

    let pb = ProgressBar::new(total as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")
    {
        pb.set_style(style.progress_chars("=> "));
    }

    // Channel: workers send (position, result), the loop below collates
    let (tx, mut rx) =
        tokio::sync::mpsc::channel::<(usize, Result<JobRecord, CrawlError>)>(concurrency.max(1) * 2);

    for (position, &id) in ids.iter().enumerate() {
        let client = client.clone();
        let layout = Arc::clone(&layout);
        let base_url = Arc::clone(&base_url);
        let sem = Arc::clone(&semaphore);
        let tx = tx.clone();

        tokio::spawn(async move {
            let Ok(_permit) = sem.acquire().await else {
                return;
            };
            let result = extract(&client, &base_url, &layout, id).await;
            let _ = tx.send((position, result)).await;
        });
    }

    // Drop our copy of tx so rx closes when all spawned tasks finish
    drop(tx);

    let mut slots: Vec<Option<JobRecord>> = vec![None; total];
    let mut errors = 0usize;

    while let Some((position, result)) = rx.recv().await {
        match result {
            Ok(record) => slots[position] = Some(record),
            Err(e) => {
                warn!("{}", e);
                errors += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let records: Vec<JobRecord> = slots.into_iter().flatten().collect();
    let stats = CrawlStats {
        total,
        ok: records.len(),
        errors,
    };
    info!("Crawled {} pages ({} ok, {} errors)", stats.total, stats.ok, stats.errors);

    if total > 0 && stats.ok == 0 {
        return Err(CrawlError::AllFailed { total });
    }
    Ok(CrawlOutcome { records, stats })
}
