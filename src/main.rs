use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use jobads_scraper::pipeline;
use jobads_scraper::render::pdf::{PdfEngine, WkHtmlToPdf};
use jobads_scraper::render::OnInvalidRecord;
use jobads_scraper::settings::Settings;

#[derive(Parser)]
#[command(name = "scrape-jobads", about = "Filter, crawl and render job ads")]
struct Cli {
    /// Settings file (default: ./jobads.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Project root all relative paths are resolved against
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct RunArgs {
    /// Run directory name under the data dir (default: <YYYYMMDD>-dev-jobs)
    #[arg(short, long)]
    version: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Query the search API and save matching job ids
    Ids {
        #[command(flatten)]
        run: RunArgs,
        /// Filter criteria JSON (default: <run dir>/filter_config.json)
        #[arg(long)]
        filter_config: Option<PathBuf>,
        /// Id array output (default: <run dir>/job_ids.npy)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Crawl the detail page of every saved id
    Crawl {
        #[command(flatten)]
        run: RunArgs,
        /// Id array input (default: <run dir>/job_ids.npy)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Job records output (default: <run dir>/jobs.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render one PDF per crawled job record
    Render {
        #[command(flatten)]
        run: RunArgs,
        /// Job records input (default: <run dir>/jobs.json)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// PDF directory (default: <run dir>/pdfs)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// What to do with records that cannot be rendered
        #[arg(long, value_enum)]
        on_invalid: Option<OnInvalidRecord>,
    },
    /// Ids, crawl and render in one go
    Run {
        #[command(flatten)]
        run: RunArgs,
        /// Stop after crawling
        #[arg(long)]
        skip_render: bool,
        /// What to do with records that cannot be rendered
        #[arg(long, value_enum)]
        on_invalid: Option<OnInvalidRecord>,
    },
}

fn init_tracing(settings: &Settings) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.log_level.as_str().into()),
        )
        .try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let t0 = Instant::now();
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    if let Some(root) = cli.root {
        settings.project_root = root;
    }
    init_tracing(&settings);

    let result = match cli.command {
        Commands::Ids {
            run,
            filter_config,
            output,
        } => {
            let paths = settings.run_paths(run.version.as_deref());
            let config = filter_config.unwrap_or_else(|| paths.filter_config.clone());
            let output = output.unwrap_or_else(|| paths.ids.clone());
            pipeline::run_ids(&settings, &config, &output).await.map(|_| ())
        }
        Commands::Crawl { run, input, output } => {
            let paths = settings.run_paths(run.version.as_deref());
            let input = input.unwrap_or_else(|| paths.ids.clone());
            let output = output.unwrap_or_else(|| paths.records.clone());
            pipeline::run_crawl(&settings, &input, &output).await.map(|_| ())
        }
        Commands::Render {
            run,
            input,
            output_dir,
            on_invalid,
        } => {
            let paths = settings.run_paths(run.version.as_deref());
            let input = input.unwrap_or_else(|| paths.records.clone());
            let output_dir = output_dir.unwrap_or_else(|| paths.pdf_dir.clone());
            let engine = WkHtmlToPdf::new(&settings.wkhtmltopdf);
            let policy = on_invalid.unwrap_or(settings.on_invalid);
            pipeline::run_render(&settings, &input, &output_dir, &engine, policy).map(|_| ())
        }
        Commands::Run {
            run,
            skip_render,
            on_invalid,
        } => {
            let paths = settings.run_paths(run.version.as_deref());
            let engine = WkHtmlToPdf::new(&settings.wkhtmltopdf);
            let engine = (!skip_render).then_some(&engine as &dyn PdfEngine);
            let policy = on_invalid.unwrap_or(settings.on_invalid);
            pipeline::run_all(&settings, &paths, engine, policy).await
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
