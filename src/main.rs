use booru_scrape::{ApiConfig, Config, HomeConfigProvider, ScrapeConfig, Scraper};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Mirror post metadata from a Danbooru-style board", long_about = None)]
struct Args {
    /// First post ID to scrape
    start: i64,

    /// Exclusive upper post ID (equal to start scrapes that single post)
    stop: i64,

    /// Number of concurrent workers
    #[arg(short, long, default_value_t = 10)]
    workers: usize,

    /// Directory receiving the post files
    #[arg(short, long, default_value = ".")]
    save_dir: PathBuf,

    /// Only store metadata, do not download files
    #[arg(long)]
    no_files: bool,

    /// Directory holding database.json and auth.json (default: ~/.config/scrapedbooru)
    #[arg(short, long)]
    config_dir: Option<PathBuf>,

    /// API base URL
    #[arg(short, long, default_value = "https://danbooru.donmai.us")]
    endpoint: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Scrape aborted");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> booru_scrape::Result<()> {
    let provider = match args.config_dir {
        Some(dir) => HomeConfigProvider::with_dir(dir),
        None => HomeConfigProvider::new()?,
    };

    let api = ApiConfig {
        endpoint: args.endpoint,
        timeout: Duration::from_secs(args.timeout),
        ..Default::default()
    };
    let scrape = ScrapeConfig {
        workers: args.workers,
        save_dir: (!args.no_files).then_some(args.save_dir),
    };
    let config = Config::load(&provider, api, scrape)?;

    info!(
        config_dir = %provider.dir().display(),
        database = %config.database.path.display(),
        "Configuration loaded"
    );

    let scraper = Scraper::new(&config).await?;
    match scraper.save_dir() {
        Some(dir) => info!(save_dir = %dir.display(), "Saving post files"),
        None => info!("File downloads disabled"),
    }
    let summary = scraper.scrape_range(args.start, args.stop).await?;

    info!(
        posts = summary.stats.posts_saved,
        files = summary.stats.files_saved,
        failed_batches = summary.stats.failed_batches,
        "Done in {:.1}s",
        summary.elapsed.as_secs_f64()
    );

    scraper.close().await;
    Ok(())
}
