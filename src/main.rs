mod config;
mod data;
mod error;
mod prompt;
mod report;
mod stats;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};

use config::CityRegistry;
use data::loader::load_and_filter;
use error::BikeshareError;
use prompt::{Prompter, DIVIDER};

#[derive(Parser, Debug)]
#[command(
    name = "bikeshare",
    version,
    about = "Explore U.S. bike share trip data by city, month and day"
)]
struct Cli {
    /// Directory holding chicago.csv, new_york_city.csv and washington.csv
    #[arg(long, env = "BIKESHARE_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    /// JSON file mapping city names to data files, replacing the bundled cities
    #[arg(long)]
    cities: Option<PathBuf>,

    /// Number of leading rows shown after loading
    #[arg(long, default_value_t = 5)]
    preview_rows: usize,
}

/// How one pass through the session ended.
enum Outcome {
    Again,
    Done,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = ctrlc::set_handler(|| {
        println!("\n");
        farewell();
        std::process::exit(0);
    }) {
        log::warn!("Could not install Ctrl-C handler: {e}");
    }

    let registry = match build_registry(&cli) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::from(2);
        }
    };

    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());

    loop {
        match run_once(&mut prompter, &registry, cli.preview_rows) {
            Ok(Outcome::Again) => continue,
            Ok(Outcome::Done) => {
                println!("✅ Analysis complete. Goodbye!");
                return ExitCode::SUCCESS;
            }
            Err(e) if is_input_closed(&e) => {
                println!("\n");
                farewell();
                return ExitCode::SUCCESS;
            }
            Err(e) => {
                println!("{e:#}");
                println!("❌ Something funky happened. Try again?");
                return ExitCode::FAILURE;
            }
        }
    }
}

fn build_registry(cli: &Cli) -> Result<CityRegistry> {
    let registry = match &cli.cities {
        Some(path) => CityRegistry::from_json_file(path)
            .with_context(|| format!("loading city registry {}", path.display()))?,
        None => CityRegistry::bundled(&cli.data_dir),
    };
    debug!(
        "Cities: {}",
        registry.city_names().collect::<Vec<_>>().join(", ")
    );
    Ok(registry)
}

/// Prompt, load, report, then ask whether to go again.
fn run_once<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    registry: &CityRegistry,
    preview_rows: usize,
) -> Result<Outcome> {
    let choice = prompter.collect_filters(registry)?;
    info!(
        "Selected city={} month={} day={}",
        choice.city, choice.month, choice.day
    );

    prompter.say(DIVIDER)?;
    prompter.say("Loading data...")?;
    prompter.say(DIVIDER)?;

    let dataset = load_and_filter(registry, &choice.city, &choice.filter())
        .with_context(|| format!("loading trips for {}", choice.city))?;

    prompter.say(&report::size_line(&dataset))?;
    prompter.say(&report::render_preview(&dataset, preview_rows)?)?;

    stats::run_all(dataset);

    if prompter.ask_restart()? {
        Ok(Outcome::Again)
    } else {
        Ok(Outcome::Done)
    }
}

fn is_input_closed(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<BikeshareError>(),
        Some(BikeshareError::InputClosed)
    )
}

fn farewell() {
    println!("{DIVIDER}");
    println!("👋 Goodbye!");
    println!("{DIVIDER}");
}
