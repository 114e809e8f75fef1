use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};
use van_search::config::{LoggingSettings, Settings};
use van_search::services::{append_columns_csv, persist_ward_map, read_csv_columns};
use van_search::{FixedDelay, PersonSearch, SearchCriterion, VanClient, WardCollector, WardMatcher};

#[derive(Parser, Debug)]
#[command(name = "van-search", version, about = "Voter directory ward lookups and name matching")]
struct Cli {
    /// Config file to use instead of config/default + config/local
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Map every person in a zip code to their ward and save wardbyzip<ZIP>.json
    WardByZip { zip: String },
    /// Print one person's ward
    Ward { van_id: String },
    /// Match a CSV of first name, last name[, ward] columns against the directory
    Search {
        input: PathBuf,
        /// Disambiguate by the ward column (and the configured city)
        #[arg(long, default_value_t = false)]
        by_ward: bool,
        /// Matched VanIds are appended here; unmatched row indices go to <stem>_unmatched.csv
        #[arg(long, default_value = "matched.csv")]
        output: PathBuf,
    },
}

type BoxError = Box<dyn std::error::Error>;

fn init_logging(logging: &LoggingSettings) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match logging.format.as_str() {
        "pretty" => subscriber.pretty().init(),
        "json" => subscriber.json().init(),
        _ => subscriber.init(),
    }
}

fn unmatched_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "matched".to_string());
    output.with_file_name(format!("{}_unmatched.csv", stem))
}

async fn run(command: Commands, settings: Settings) -> Result<(), BoxError> {
    let client = VanClient::new(&settings.api, settings.retry.clone())?;
    let wards = WardMatcher::new(settings.search.ward_district_index);

    info!(
        base_url = %client.base_url(),
        ward_district_index = wards.district_index(),
        "Directory client initialized"
    );

    match command {
        Commands::WardByZip { zip } => {
            let throttle = FixedDelay::from_millis(settings.search.page_delay_ms);
            let collector = WardCollector::new(
                &client,
                &throttle,
                wards,
                settings.search.page_size,
                settings.search.max_pages,
            );

            let result = collector.collect_by_zip(&zip).await?;
            if !result.is_complete() {
                warn!(zip = %zip, stop = ?result.stop, "Saving partial ward mapping");
            }
            if !result.skipped.is_empty() {
                warn!(zip = %zip, skipped = result.skipped.len(), "Some people had no readable ward");
            }
            let path = persist_ward_map(&settings.output.directory, &zip, &result.wards)?;

            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "zip": result.zip,
                    "people": result.wards.len(),
                    "skipped": result.skipped,
                    "pagesFetched": result.pages_fetched,
                    "expectedPages": result.expected_pages,
                    "stop": result.stop,
                    "path": path,
                }))?
            );
        }
        Commands::Ward { van_id } => {
            let throttle = FixedDelay::from_millis(settings.search.search_delay_ms);
            let search = PersonSearch::new(&client, &throttle, wards);
            println!("{}", search.get_ward(&van_id).await?);
        }
        Commands::Search { input, by_ward, output } => {
            let columns = read_csv_columns(&input)?;
            let criteria = SearchCriterion::from_columns(&columns)?;
            info!(input = %input.display(), criteria = criteria.len(), by_ward, "Loaded search criteria");

            let throttle = FixedDelay::from_millis(settings.search.search_delay_ms);
            let search = PersonSearch::new(&client, &throttle, wards)
                .with_city(settings.search.default_city.clone());

            let result = if by_ward {
                search.search_by_name_and_ward(&criteria).await?
            } else {
                search.search_by_name(&criteria).await?
            };

            append_columns_csv(&[result.matched.clone()], &output)?;
            append_columns_csv(&[result.unmatched.clone()], unmatched_path(&output))?;

            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };

    let logging = settings
        .as_ref()
        .map(|s| s.logging.clone())
        .unwrap_or_default();
    init_logging(&logging);

    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Configuration loaded successfully");

    match run(cli.command, settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
