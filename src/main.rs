mod aggregate;
mod config;
mod error;
mod fetcher;
mod hierarchy;
mod log;
mod model;
mod output;
mod parser;
mod reconcile;
#[cfg(test)]
mod testing;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use url::Url;

use crate::aggregate::Aggregator;
use crate::config::Settings;
use crate::error::ValidationError;
use crate::fetcher::{HttpFetcher, PageFetcher};
use crate::hierarchy::HierarchyWalker;
use crate::log::{LogSink, TracingSink};

#[derive(Parser)]
#[command(
    name = "volby_scraper",
    about = "Flatten volby.cz election results into one CSV row per unit"
)]
struct Cli {
    /// Report page to start from, e.g.
    /// 'https://volby.cz/pls/ps2017nss/ps32?xjazyk=CZ&xkraj=12&xnumnuts=7103'
    #[arg(value_parser = parse_entry_url)]
    main_url: Url,

    /// Output file, must end with .csv
    #[arg(value_parser = parse_output_filename)]
    output_filename: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn parse_entry_url(raw: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(raw).map_err(|_| ValidationError::InvalidUrl(raw.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::UnsupportedScheme(url.scheme().to_string()));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ValidationError::InvalidUrl(raw.to_string()));
    }
    Ok(url)
}

fn parse_output_filename(raw: &str) -> Result<PathBuf, ValidationError> {
    let path = PathBuf::from(raw);
    let stem_ok = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.len() > ".csv".len() && n.ends_with(".csv"));
    if !stem_ok {
        return Err(ValidationError::InvalidFilename(raw.to_string()));
    }
    Ok(path)
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

struct RunSummary {
    units: usize,
    rows: usize,
    skipped: usize,
    parties: usize,
}

/// Resolve the hierarchy, read every result page and write the table.
///
/// Nothing is written unless every page could be fetched.
async fn run<F: PageFetcher>(
    fetcher: &F,
    base: &Url,
    entry: &Url,
    output: &Path,
    log: &dyn LogSink,
    progress: ProgressBar,
) -> Result<RunSummary> {
    let units = HierarchyWalker::new(fetcher, base, log).resolve(entry).await?;
    let unit_count = units.len();

    let aggregation = Aggregator::new(fetcher, log)
        .with_progress(progress)
        .collect(units)
        .await?;

    let dataset = reconcile::reconcile(&aggregation.records);
    output::save_csv(&dataset, output)?;
    log.info(
        "output_written",
        &[
            ("path", &output.display()),
            ("rows", &dataset.rows.len()),
            ("parties", &dataset.parties.len()),
        ],
    );

    Ok(RunSummary {
        units: unit_count,
        rows: dataset.rows.len(),
        skipped: aggregation.skipped,
        parties: dataset.parties.len(),
    })
}

fn progress_bar() -> Result<ProgressBar> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );
    Ok(pb)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let t0 = Instant::now();
    let settings = Settings::load()?;
    info!(settings_loaded = ?settings, msg = "Starting volby scraper");

    let base = settings.base_url()?;
    let sink = TracingSink;
    let fetcher = HttpFetcher::new(&settings.user_agent, settings.timeout(), &sink)?;

    let summary = run(
        &fetcher,
        &base,
        &cli.main_url,
        &cli.output_filename,
        &sink,
        progress_bar()?,
    )
    .await?;

    println!(
        "Wrote {} rows ({} parties) to {}; {} units found, {} skipped, in {:.1}s",
        summary.rows,
        summary.parties,
        cli.output_filename.display(),
        summary.units,
        summary.skipped,
        t0.elapsed().as_secs_f64()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::log::CaptureSink;
    use crate::testing::{base_url, page_url, StaticFetcher};

    const ENTRY: &str = "ps32?xjazyk=CZ&xkraj=12&xnumnuts=7103";
    const LISTING: &str = "ps34?xjazyk=CZ&xkraj=12&xobec=003&xnumnuts=7103";

    fn out_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("volby_scraper_run_{}_{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir.join("out.csv")
    }

    #[test]
    fn accepts_http_urls_only() {
        assert!(parse_entry_url("https://volby.cz/pls/ps2017nss/ps32?xjazyk=CZ&xkraj=12&xnumnuts=7103").is_ok());
        assert_eq!(
            parse_entry_url("volby.cz/ps32"),
            Err(ValidationError::InvalidUrl("volby.cz/ps32".into()))
        );
        assert_eq!(
            parse_entry_url("ftp://volby.cz/ps32"),
            Err(ValidationError::UnsupportedScheme("ftp".into()))
        );
    }

    #[test]
    fn output_must_be_csv() {
        assert!(parse_output_filename("vysledky.csv").is_ok());
        assert!(parse_output_filename("out/vysledky.csv").is_ok());
        assert!(parse_output_filename("vysledky.tsv").is_err());
        assert!(parse_output_filename(".csv").is_err());
    }

    #[test]
    fn cli_rejects_bad_arguments_before_running() {
        assert!(Cli::try_parse_from(["volby_scraper", "not a url", "out.csv"]).is_err());
        assert!(Cli::try_parse_from(["volby_scraper", "https://volby.cz/x", "out.txt"]).is_err());
        let cli = Cli::try_parse_from(["volby_scraper", "https://volby.cz/x", "out.csv", "--json-logs"]).unwrap();
        assert!(cli.json_logs);
    }

    #[tokio::test]
    async fn two_unit_scenario_end_to_end() {
        let fetcher = StaticFetcher::new()
            .fixture(ENTRY, "overview_direct")
            .fixture("ps311?xjazyk=CZ&xkraj=12&xobec=001&xvyber=7103", "results_001")
            .fixture("ps311?xjazyk=CZ&xkraj=12&xobec=002&xvyber=7103", "results_002");
        let log = CaptureSink::default();
        let path = out_path("two_units");

        let summary = run(&fetcher, &base_url(), &page_url(ENTRY), &path, &log, ProgressBar::hidden())
            .await
            .unwrap();

        assert_eq!((summary.units, summary.rows, summary.skipped), (2, 2, 0));
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            vec![
                "code,name,registered,envelopes,valid,Party A,Party B",
                "001,Alfa,1000,600,590,300,290",
                "002,Nová Ves,800,500,480,250,",
            ]
        );
    }

    #[tokio::test]
    async fn listing_units_are_fetched_through_the_intermediate_page() {
        let okrsek = |n: u32| format!("ps311?xjazyk=CZ&xkraj=12&xobec=003&xokrsek={n}&xvyber=7103");
        let fetcher = StaticFetcher::new()
            .fixture(ENTRY, "overview_mixed")
            .fixture(LISTING, "listing")
            .fixture("ps311?xjazyk=CZ&xkraj=12&xobec=001&xvyber=7103", "results_001")
            .fixture(&okrsek(1), "results_002")
            .fixture(&okrsek(2), "results_missing_registered")
            .fixture(&okrsek(3), "results_001");
        let log = CaptureSink::default();
        let path = out_path("listing");

        let summary = run(&fetcher, &base_url(), &page_url(ENTRY), &path, &log, ProgressBar::hidden())
            .await
            .unwrap();

        assert_eq!((summary.units, summary.rows, summary.skipped), (4, 3, 1));
        let text = fs::read_to_string(&path).unwrap();
        let codes: Vec<&str> = text
            .lines()
            .skip(1)
            .map(|l| l.split(',').next().unwrap())
            .collect();
        assert_eq!(codes, vec!["001", "003-1", "003-3"]);
        assert_eq!(log.named("unit_skipped")[0].field("code"), Some("003-2"));
    }

    #[tokio::test]
    async fn fatal_fetch_leaves_no_output() {
        let fetcher = StaticFetcher::new()
            .fixture(ENTRY, "overview_direct")
            .fixture("ps311?xjazyk=CZ&xkraj=12&xobec=001&xvyber=7103", "results_001");
        let log = CaptureSink::default();
        let path = out_path("fatal");
        let _ = fs::remove_file(&path);

        let result = run(&fetcher, &base_url(), &page_url(ENTRY), &path, &log, ProgressBar::hidden()).await;

        assert!(result.is_err());
        assert!(!path.exists());
    }
}
