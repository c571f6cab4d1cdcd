//! Write synthetic trip files for the bundled cities.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Write synthetic bike share trip files for the bundled cities")]
struct Args {
    /// Directory the CSV files are written to
    #[arg(default_value = ".")]
    out_dir: PathBuf,

    /// Trips generated per city
    #[arg(default_value_t = 1000)]
    trips: usize,
}

/// SplitMix64: one word of state, deterministic for a given seed.
struct TripRng(u64);

impl TripRng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Uniform integer in `0..n`.
    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len() as u64) as usize]
    }
}

struct CitySpec {
    file: &'static str,
    stations: &'static [&'static str],
    /// Washington publishes no gender / birth year columns.
    demographics: bool,
}

const CITIES: [CitySpec; 3] = [
    CitySpec {
        file: "chicago.csv",
        stations: &[
            "Clark St & Elm St",
            "Streeter Dr & Grand Ave",
            "Lake Shore Dr & Monroe St",
            "Canal St & Adams St",
        ],
        demographics: true,
    },
    CitySpec {
        file: "new_york_city.csv",
        stations: &[
            "Pershing Square North",
            "E 17 St & Broadway",
            "W 21 St & 6 Ave",
            "Broadway & E 22 St",
        ],
        demographics: true,
    },
    CitySpec {
        file: "washington.csv",
        stations: &[
            "Jefferson Dr & 14th St SW",
            "Lincoln Memorial",
            "Massachusetts Ave & Dupont Circle NW",
            "Columbus Circle / Union Station",
        ],
        demographics: false,
    },
];

const USER_TYPES: [&str; 2] = ["Subscriber", "Customer"];
const GENDERS: [&str; 3] = ["Male", "Female", ""];

fn random_start(rng: &mut TripRng, year_start: NaiveDateTime) -> NaiveDateTime {
    // First half of the year, to the second.
    let span = 181 * 24 * 3600;
    year_start + Duration::seconds(rng.below(span) as i64)
}

fn write_city(dir: &Path, city: &CitySpec, trips: usize, rng: &mut TripRng) -> Result<()> {
    let path = dir.join(city.file);
    let mut writer =
        csv::Writer::from_path(&path).with_context(|| format!("creating {}", path.display()))?;

    let mut header = vec![
        "",
        "Start Time",
        "End Time",
        "Trip Duration",
        "Start Station",
        "End Station",
        "User Type",
    ];
    if city.demographics {
        header.extend(["Gender", "Birth Year"]);
    }
    writer.write_record(&header)?;

    let year_start = NaiveDate::from_ymd_opt(2017, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("invalid base date")?;

    for id in 0..trips {
        let start = random_start(rng, year_start);
        let duration = 60 + rng.below(90 * 60) as i64;
        let end = start + Duration::seconds(duration);

        let mut row = vec![
            id.to_string(),
            start.format("%Y-%m-%d %H:%M:%S").to_string(),
            end.format("%Y-%m-%d %H:%M:%S").to_string(),
            duration.to_string(),
            rng.pick(city.stations).to_string(),
            rng.pick(city.stations).to_string(),
            rng.pick(&USER_TYPES).to_string(),
        ];
        // A few rows with a missing end time, like the real exports.
        if rng.below(200) == 0 {
            row[2].clear();
        }
        if city.demographics {
            row.push(rng.pick(&GENDERS).to_string());
            row.push((1940 + rng.below(60)).to_string());
        }
        writer.write_record(&row)?;
    }

    writer.flush()?;
    println!("Wrote {trips} trips to {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    let mut rng = TripRng(42);
    for city in &CITIES {
        write_city(&args.out_dir, city, args.trips, &mut rng)?;
    }
    Ok(())
}
